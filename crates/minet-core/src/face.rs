use crate::packet::{Data, GpPkt, Interest, Nack};

/// 双向报文通道的抽象，身份即其 `id`。
///
/// # 教案式说明
/// - **意图 (Why)**：转发核心不关心字节如何变成报文——TCP/QUIC/进程内信道都
///   是合法的 `LogicFace` 实现；核心只依赖这四个发送动作与一个稳定 id。
/// - **契约 (What)**：实现者必须保证 `id()` 在该 face 的整个生命周期内不变，
///   因为 PIT 的 in/out-record 以 face id 为键。
/// - **架构位置 (Where)**：由宿主进程在建立连接时构造，注入到
///   `Forwarder`/`PIT`/`Strategy` 的调用点，核心从不持有具体传输类型。
pub trait LogicFace: Send + Sync {
    fn id(&self) -> u64;
    fn send_interest(&self, interest: &Interest);
    fn send_data(&self, data: &Data);
    fn send_nack(&self, nack: &Nack);
    fn send_gppkt(&self, packet: &GpPkt);
}
