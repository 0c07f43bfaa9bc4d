//! PacketQueue：从校验器到转发器的阻塞 FIFO。
//!
//! # 教案式说明
//! - **契约 (What)**：多生产者（校验器的每个 worker）/ 单消费者（转发器
//!   循环）。消费端需要一个能区分"队列为空"与"已超时"的有界等待读取。
//! - **执行 (How)**：`std::sync::mpsc::sync_channel` 已经是多生产者单消费者、
//!   线程安全、满时阻塞写入方；`recv_timeout` 天然提供"≤1ms 非阻塞读"所需的
//!   超时语义，不需要再包一层自制的条件变量。

use std::sync::mpsc::{sync_channel, Receiver, RecvTimeoutError, SyncSender};
use std::time::Duration;

use minet_core::{Data, GpPkt, Interest, Nack};

/// 已通过校验、等待转发器分派的报文，连同它到达的 face。
#[derive(Debug, Clone)]
pub struct IncomingPacketData {
    pub face: u64,
    pub packet: MinPacket,
}

/// 报文的具体类型。解码/分类首标识符属于 LogicFace 传输层的职责（Non-goal），
/// 这里直接接收已经分类好的值。
#[derive(Debug, Clone)]
pub enum MinPacket {
    Interest(Interest),
    Data(Data),
    Nack(Nack),
    GpPkt(GpPkt),
}

/// 读取到期结果：区分"拿到了报文"与"超时、队列里暂时没有东西"。
pub enum ReadResult {
    Packet(IncomingPacketData),
    Timeout,
    Disconnected,
}

pub struct PacketQueueSender {
    inner: SyncSender<IncomingPacketData>,
}

impl Clone for PacketQueueSender {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl PacketQueueSender {
    /// 写入一个已验证的报文；队列满时阻塞直至有空位（背压信号沿调用栈
    /// 向上传导给校验器 worker）。
    pub fn write(&self, item: IncomingPacketData) -> Result<(), IncomingPacketData> {
        self.inner.send(item).map_err(|err| err.0)
    }
}

pub struct PacketQueueReceiver {
    inner: Receiver<IncomingPacketData>,
}

impl PacketQueueReceiver {
    /// 最多等待 `timeout` 读取一条报文；用于转发器循环里"≤1ms 非阻塞读"。
    pub fn read_until(&self, timeout: Duration) -> ReadResult {
        match self.inner.recv_timeout(timeout) {
            Ok(packet) => ReadResult::Packet(packet),
            Err(RecvTimeoutError::Timeout) => ReadResult::Timeout,
            Err(RecvTimeoutError::Disconnected) => ReadResult::Disconnected,
        }
    }
}

/// 构造一对绑定容量的发送/接收端。
#[must_use]
pub fn packet_queue(capacity: usize) -> (PacketQueueSender, PacketQueueReceiver) {
    let (tx, rx) = sync_channel(capacity.max(1));
    (PacketQueueSender { inner: tx }, PacketQueueReceiver { inner: rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use minet_core::Name;

    #[test]
    fn read_until_times_out_when_empty() {
        let (_tx, rx) = packet_queue(4);
        match rx.read_until(Duration::from_millis(1)) {
            ReadResult::Timeout => {}
            _ => panic!("expected timeout"),
        }
    }

    #[test]
    fn write_then_read_round_trips() {
        let (tx, rx) = packet_queue(4);
        let packet = IncomingPacketData {
            face: 1,
            packet: MinPacket::Interest(Interest::new(Name::parse("/a").unwrap(), 1, 3)),
        };
        tx.write(packet).unwrap();
        match rx.read_until(Duration::from_millis(10)) {
            ReadResult::Packet(p) => assert_eq!(p.face, 1),
            _ => panic!("expected a packet"),
        }
    }
}
