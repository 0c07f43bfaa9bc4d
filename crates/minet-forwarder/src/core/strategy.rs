//! Strategy：决定"收到 Interest/Data/Nack/GPPkt 之后往哪转"的可插拔
//! 策略接口，与执行出站管线的能力句柄。

use std::time::{Duration, Instant};

use minet_core::{Data, GpPkt, Interest, Nack, NackReason};

use super::faces::FaceRegistry;
use super::fib::Fib;
use super::pit::{OutRecord, PitEntry};
use super::plugin::PluginManager;

/// 策略在被调用的那一刻可以使用的能力集合：FIB 只读查询，以及触发出站管线
/// 的方法。策略不持有 Forwarder 的所有权，只持有这个在调用栈上构造的借用
/// 句柄——设计注记里"非拥有句柄，而不是拥有 Forwarder 的反向引用"的具体
/// 落地方式。
pub struct PipelineContext<'a> {
    pub fib: &'a Fib,
    pub faces: &'a FaceRegistry,
    pub plugin: &'a dyn PluginManager,
}

impl<'a> PipelineContext<'a> {
    /// Outgoing Interest 管线。
    pub fn outgoing_interest(&self, entry: &mut PitEntry, interest: &Interest, egress: u64) {
        if self.plugin.before_outgoing_interest(egress, interest).is_abort() {
            tracing::debug!(egress, name = %interest.name, "outgoing interest aborted by plugin");
            return;
        }
        let expire_time = Instant::now() + Duration::from_millis(interest.effective_lifetime_ms() as u64);
        entry.out_records.insert(
            egress,
            OutRecord {
                face: egress,
                last_nonce: interest.nonce,
                expire_time,
                nack_header: None,
            },
        );
        match self.faces.get(egress) {
            Some(face) => face.send_interest(interest),
            None => tracing::warn!(egress, name = %interest.name, "no registered face for egress"),
        }
    }

    /// Outgoing Data 管线。不持有 PIT：Data 去程不修改 PITEntry。
    pub fn outgoing_data(&self, data: &Data, egress: u64) {
        if self.plugin.before_outgoing_data(egress, data).is_abort() {
            tracing::debug!(egress, name = %data.name, "outgoing data aborted by plugin");
            return;
        }
        match self.faces.get(egress) {
            Some(face) => face.send_data(data),
            None => tracing::warn!(egress, name = %data.name, "no registered face for egress"),
        }
    }

    /// Outgoing Nack 管线。
    pub fn outgoing_nack(&self, entry: &mut PitEntry, egress: u64, reason: NackReason) {
        if self.plugin.before_outgoing_nack(egress, reason).is_abort() {
            tracing::debug!(egress, "outgoing nack aborted by plugin");
            return;
        }
        let Some(in_record) = entry.in_records.get(&egress) else {
            tracing::debug!(egress, "outgoing nack dropped: no downstream nonce to echo");
            return;
        };
        let nack = Nack { interest: in_record.last_interest.clone(), reason };
        match self.faces.get(egress) {
            Some(face) => face.send_nack(&nack),
            None => tracing::warn!(egress, "no registered face for egress"),
        }
        entry.in_records.remove(&egress);
    }

    /// Outgoing GPPkt 管线。推送模式，无 PIT 参与。
    pub fn outgoing_gppkt(&self, packet: &GpPkt, egress: u64) {
        if self.plugin.before_outgoing_gppkt(egress, packet).is_abort() {
            tracing::debug!(egress, "outgoing gppkt aborted by plugin");
            return;
        }
        match self.faces.get(egress) {
            Some(face) => face.send_gppkt(packet),
            None => tracing::warn!(egress, "no registered face for egress"),
        }
    }
}

/// 可插拔转发策略。
pub trait Strategy: Send + Sync {
    fn after_receive_interest(&self, ctx: &PipelineContext<'_>, entry: &mut PitEntry, interest: &Interest, ingress: u64);

    fn after_content_store_hit(&self, ctx: &PipelineContext<'_>, entry: &mut PitEntry, data: &Data, ingress: u64);

    fn after_receive_data(&self, ctx: &PipelineContext<'_>, entry: &mut PitEntry, data: &Data, ingress: u64);

    fn after_receive_nack(&self, ctx: &PipelineContext<'_>, entry: &mut PitEntry, nack: &Nack, ingress: u64);

    fn after_receive_gppkt(&self, ctx: &PipelineContext<'_>, packet: &GpPkt, ingress: u64);
}

/// 帮助策略从 FIB 命中结果中挑出一个"不是入口 face"的下一跳，BestRoute 与
/// RoundRobin 都要做这一步，提出来避免重复。
pub(crate) fn pick_excluding(hops: &[super::fib::NextHop], exclude: u64) -> Option<super::fib::NextHop> {
    hops.iter().filter(|h| h.face_id != exclude).min_by_key(|h| h.cost).copied()
}
