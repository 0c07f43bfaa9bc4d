use crate::error::ForwarderError;
use crate::packet::{Data, GpPkt, Interest, Nack};

/// 尚未通过签名校验的入站报文，喂给 [`KeyChain::verify`]。
#[derive(Clone, Debug)]
pub enum UnverifiedPacket {
    Interest(Interest),
    Data(Data),
    Nack(Nack),
    GpPkt(GpPkt),
}

/// 签名校验的外部协作者——转发核心本身不做签名数学，只调用这个 trait。
pub trait KeyChain: Send + Sync {
    /// 启动期一次性初始化（加载密钥材料等）。失败是致命的——调用方应当
    /// 放弃启动，而不是继续以一个半初始化的 KeyChain 运行。默认无操作。
    fn init(&self) -> Result<(), ForwarderError> {
        Ok(())
    }

    fn verify(&self, packet: &UnverifiedPacket) -> Result<(), ForwarderError>;
}

/// 永远校验通过的桩实现：仅用于测试，或 `validator.need_validate = false`
/// 的部署——这不是安全特性，只是一个开发期占位符。
#[derive(Debug, Default, Clone, Copy)]
pub struct NullKeyChain;

impl KeyChain for NullKeyChain {
    fn verify(&self, _packet: &UnverifiedPacket) -> Result<(), ForwarderError> {
        Ok(())
    }
}
