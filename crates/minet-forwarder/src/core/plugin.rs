//! PluginManager：每条管线执行的第一步都要咨询的前置钩子链。
//!
//! 设计注记把"返回非零整数即中止"翻译成一个小枚举而不是整数约定——`Abort`
//! 比"看看返回的是不是 0"更难被调用方意外无视。

use minet_core::{Data, GpPkt, Interest, Nack, NackReason};

use super::pit::PitEntry;

/// 钩子的执行结果：`Continue` 表示管线应当继续；`Abort` 表示在不做任何状态
/// 变更的前提下立即终止当前管线调用。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookOutcome {
    Continue,
    Abort,
}

impl HookOutcome {
    #[must_use]
    pub fn is_abort(self) -> bool {
        matches!(self, HookOutcome::Abort)
    }
}

/// 每条管线入口处调用的前置钩子集合。
///
/// 所有方法都带默认实现（放行），实现者只需覆盖关心的钩子——这与大多数
/// Rust trait 给可选回调提供默认实现的惯例一致，避免每个插件都要把十三个
/// 管线钩子抄一遍空实现。
pub trait PluginManager: Send + Sync {
    fn before_incoming_interest(&self, _ingress: u64, _interest: &Interest) -> HookOutcome {
        HookOutcome::Continue
    }
    fn before_interest_loop(&self, _ingress: u64, _interest: &Interest) -> HookOutcome {
        HookOutcome::Continue
    }
    fn before_content_store_miss(&self, _ingress: u64, _entry: &PitEntry) -> HookOutcome {
        HookOutcome::Continue
    }
    fn before_content_store_hit(&self, _ingress: u64, _entry: &PitEntry) -> HookOutcome {
        HookOutcome::Continue
    }
    fn before_outgoing_interest(&self, _egress: u64, _interest: &Interest) -> HookOutcome {
        HookOutcome::Continue
    }
    fn before_interest_finalize(&self, _entry: &PitEntry) -> HookOutcome {
        HookOutcome::Continue
    }
    fn before_incoming_data(&self, _ingress: u64, _data: &Data) -> HookOutcome {
        HookOutcome::Continue
    }
    fn before_data_unsolicited(&self, _ingress: u64, _data: &Data) -> HookOutcome {
        HookOutcome::Continue
    }
    fn before_outgoing_data(&self, _egress: u64, _data: &Data) -> HookOutcome {
        HookOutcome::Continue
    }
    fn before_incoming_nack(&self, _ingress: u64, _nack: &Nack) -> HookOutcome {
        HookOutcome::Continue
    }
    /// Outgoing Nack 的钩子在 Nack 报文实际构造之前触发，因此这里只拿得到
    /// 原因码，拿不到完整的 [`Nack`] 值。
    fn before_outgoing_nack(&self, _egress: u64, _reason: NackReason) -> HookOutcome {
        HookOutcome::Continue
    }
    fn before_incoming_gppkt(&self, _ingress: u64, _packet: &GpPkt) -> HookOutcome {
        HookOutcome::Continue
    }
    fn before_outgoing_gppkt(&self, _egress: u64, _packet: &GpPkt) -> HookOutcome {
        HookOutcome::Continue
    }
}

/// 放行一切的空实现，用于测试与未配置插件的部署。
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPluginManager;

impl PluginManager for NullPluginManager {}
