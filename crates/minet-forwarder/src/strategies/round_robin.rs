//! RoundRobin: 像 BestRoute 一样选下一跳，但在命中的下一跳集合里按配置的
//! 轮询时间片轮换，而不是总是选成本最低的那个。

use std::time::{Duration, Instant};

use parking_lot::Mutex;

use minet_core::{Data, GpPkt, Interest, Nack, NackReason};

use crate::core::fib::NextHop;
use crate::core::pit::PitEntry;
use crate::core::strategy::{PipelineContext, Strategy};

struct RotationState {
    index: usize,
    round_started_at: Instant,
}

/// 轮询策略，按 `round_time` 时间片推进到下一个候选 face。
pub struct RoundRobin {
    round_time: Duration,
    state: Mutex<RotationState>,
}

impl RoundRobin {
    #[must_use]
    pub fn new(round_time: Duration) -> Self {
        Self {
            round_time,
            state: Mutex::new(RotationState { index: 0, round_started_at: Instant::now() }),
        }
    }

    /// 从排除入口 face 之后的候选集合里取出本轮应当使用的下一跳；若当前
    /// 时间片已经用完，推进到下一个候选并重置计时。
    fn next_hop(&self, hops: &[NextHop], exclude: u64) -> Option<NextHop> {
        let candidates: Vec<NextHop> = hops.iter().filter(|h| h.face_id != exclude).copied().collect();
        if candidates.is_empty() {
            return None;
        }
        let mut state = self.state.lock();
        if state.round_started_at.elapsed() >= self.round_time {
            state.index = (state.index + 1) % candidates.len();
            state.round_started_at = Instant::now();
        }
        let idx = state.index % candidates.len();
        Some(candidates[idx])
    }
}

impl Strategy for RoundRobin {
    fn after_receive_interest(&self, ctx: &PipelineContext<'_>, entry: &mut PitEntry, interest: &Interest, ingress: u64) {
        let Some(hops) = ctx.fib.longest_prefix(&interest.name) else {
            tracing::debug!(name = %interest.name, "round-robin: no FIB entry, Nack(NoRoute)");
            ctx.outgoing_nack(entry, ingress, NackReason::NoRoute);
            return;
        };
        match self.next_hop(&hops, ingress) {
            Some(hop) => ctx.outgoing_interest(entry, interest, hop.face_id),
            None => {
                tracing::debug!(name = %interest.name, "round-robin: no usable nexthop excluding ingress, Nack(NoRoute)");
                ctx.outgoing_nack(entry, ingress, NackReason::NoRoute);
            }
        }
    }

    fn after_content_store_hit(&self, ctx: &PipelineContext<'_>, _entry: &mut PitEntry, data: &Data, ingress: u64) {
        ctx.outgoing_data(data, ingress);
    }

    fn after_receive_data(&self, ctx: &PipelineContext<'_>, entry: &mut PitEntry, data: &Data, _ingress: u64) {
        let faces: Vec<u64> = entry.in_records.keys().copied().collect();
        for face in faces {
            ctx.outgoing_data(data, face);
        }
    }

    fn after_receive_nack(&self, _ctx: &PipelineContext<'_>, entry: &mut PitEntry, nack: &Nack, ingress: u64) {
        tracing::debug!(name = %entry.name, ingress, reason = ?nack.reason, "round-robin: nack observed, no retry policy configured");
    }

    fn after_receive_gppkt(&self, ctx: &PipelineContext<'_>, packet: &GpPkt, ingress: u64) {
        let Some(hops) = ctx.fib.longest_prefix(&packet.dst_identifier) else {
            return;
        };
        if let Some(hop) = self.next_hop(&hops, ingress) {
            ctx.outgoing_gppkt(packet, hop.face_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotates_after_round_time_elapses() {
        let rr = RoundRobin::new(Duration::from_millis(0));
        let hops = vec![NextHop { face_id: 1, cost: 1 }, NextHop { face_id: 2, cost: 1 }];

        let first = rr.next_hop(&hops, 99).unwrap();
        std::thread::sleep(Duration::from_millis(1));
        let second = rr.next_hop(&hops, 99).unwrap();
        assert_ne!(first.face_id, second.face_id);
    }

    #[test]
    fn excludes_ingress_face() {
        let rr = RoundRobin::new(Duration::from_secs(60));
        let hops = vec![NextHop { face_id: 1, cost: 1 }];
        assert!(rr.next_hop(&hops, 1).is_none());
    }
}
