//! PacketValidator：有界并发的签名校验 worker 池。
//!
//! # 教案式说明
//! - **契约 (What)**：`need_validate = false` 时报文直通队列；否则每个报文
//!   的校验在一个独立任务上并行执行，校验通过才进入 [`PacketQueue`]。
//! - **并发约束 (How)**：用 `tokio::sync::Semaphore` 限制同时在途的校验任务
//!   数为配置的 `worker_capacity`——permit 获取失败即视为"任务提交失败"
//!   （背压信号），记录日志后丢弃，不阻塞调用方。
//! - **顺序保证**：验证是并行的，验证完成后进入队列的顺序不保证与到达顺序
//!   一致；PIT/策略已经被设计为能容忍乱序。

use std::sync::Arc;

use minet_core::{ForwarderError, KeyChain, UnverifiedPacket};

use crate::queue::{IncomingPacketData, MinPacket, PacketQueueSender};

fn into_min_packet(packet: UnverifiedPacket) -> MinPacket {
    match packet {
        UnverifiedPacket::Interest(i) => MinPacket::Interest(i),
        UnverifiedPacket::Data(d) => MinPacket::Data(d),
        UnverifiedPacket::Nack(n) => MinPacket::Nack(n),
        UnverifiedPacket::GpPkt(g) => MinPacket::GpPkt(g),
    }
}

pub struct PacketValidator {
    key_chain: Arc<dyn KeyChain>,
    need_validate: bool,
    semaphore: Arc<tokio::sync::Semaphore>,
    queue_tx: PacketQueueSender,
}

impl PacketValidator {
    /// 初始化校验器；`key_chain.init()` 失败是致命错误，由调用方决定如何
    /// 终止启动。
    pub fn new(
        key_chain: Arc<dyn KeyChain>,
        need_validate: bool,
        worker_capacity: usize,
        queue_tx: PacketQueueSender,
    ) -> Result<Self, ForwarderError> {
        key_chain.init()?;
        Ok(Self {
            key_chain,
            need_validate,
            semaphore: Arc::new(tokio::sync::Semaphore::new(worker_capacity.max(1))),
            queue_tx,
        })
    }

    /// 提交一个待校验（或直通）的入站报文。
    pub fn submit(&self, face: u64, packet: UnverifiedPacket) {
        if !self.need_validate {
            let min_packet = into_min_packet(packet);
            if self.queue_tx.write(IncomingPacketData { face, packet: min_packet }).is_err() {
                tracing::error!(face, "packet queue closed, dropping pass-through packet");
            }
            return;
        }

        let semaphore = Arc::clone(&self.semaphore);
        let key_chain = Arc::clone(&self.key_chain);
        let queue_tx = self.queue_tx.clone();

        tokio::spawn(async move {
            let permit = match semaphore.try_acquire_owned() {
                Ok(permit) => permit,
                Err(_) => {
                    tracing::warn!(face, "validator submission failed: worker pool saturated");
                    return;
                }
            };

            match key_chain.verify(&packet) {
                Ok(()) => {
                    let min_packet = into_min_packet(packet);
                    if queue_tx.write(IncomingPacketData { face, packet: min_packet }).is_err() {
                        tracing::error!(face, "packet queue closed, dropping verified packet");
                    }
                }
                Err(err) => tracing::debug!(face, error = %err, "packet failed verification, dropped"),
            }

            drop(permit);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::{packet_queue, ReadResult};
    use minet_core::{Interest, Name, NullKeyChain};
    use std::time::Duration;

    #[tokio::test]
    async fn pass_through_when_validation_disabled() {
        let (tx, rx) = packet_queue(4);
        let validator = PacketValidator::new(Arc::new(NullKeyChain), false, 4, tx).unwrap();
        validator.submit(1, UnverifiedPacket::Interest(Interest::new(Name::parse("/a").unwrap(), 1, 3)));

        match rx.read_until(Duration::from_millis(50)) {
            ReadResult::Packet(p) => assert_eq!(p.face, 1),
            _ => panic!("expected pass-through packet"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn validated_packet_reaches_queue() {
        let (tx, rx) = packet_queue(4);
        let validator = PacketValidator::new(Arc::new(NullKeyChain), true, 2, tx).unwrap();
        validator.submit(1, UnverifiedPacket::Interest(Interest::new(Name::parse("/a").unwrap(), 1, 3)));

        match rx.read_until(Duration::from_millis(200)) {
            ReadResult::Packet(p) => assert_eq!(p.face, 1),
            _ => panic!("expected verified packet to reach the queue"),
        }
    }
}
