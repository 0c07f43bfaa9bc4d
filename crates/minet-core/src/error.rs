//! 转发引擎错误域。
//!
//! 形态取自交换机核心的错误枚举：细粒度变体、携带可读上下文的拥有字符串、
//! 通过 `category()` 暴露一个不依赖消息文本解析的稳定分类，供调用方/测试
//! `match`。与那个来源不同的是这里没有分层的 Core/Domain/Impl 错误链——单一
//! 转发引擎不需要跨多个协议域传播错误，因此只保留一层。

use crate::name::Name;

/// 转发管线中一个报文被丢弃的原因分类。
///
/// 不携带上下文，只用于日志指标打标与测试断言（"这次确实是因为成环被丢的吗"），
/// 细节留给 [`ForwarderError`] 本身的字段。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DropReason {
    Loop,
    Malformed,
    NoStrategy,
    Stale,
    Unsolicited,
    Crashed,
    Validator,
}

/// 转发引擎的错误域。
#[derive(Clone, Debug, thiserror::Error, PartialEq)]
pub enum ForwarderError {
    /// 首标识符解析失败，或报文体与标签类型不匹配。
    #[error("malformed packet on face {face_id}: {detail}")]
    MalformedPacket { face_id: u64, detail: String },

    /// 某个名称前缀在 StrategyTable 中没有命中任何策略。
    #[error("no strategy matches name `{name}`")]
    NoStrategy { name: Name },

    /// KeyChain 初始化失败；按设计这是致命错误，调用方应当终止启动。
    #[error("keychain initialization failed: {detail}")]
    KeyChainInitFailed { detail: String },

    /// 报文校验任务提交失败（校验器背压）。
    #[error("validator submission failed on face {face_id}: {detail}")]
    ValidatorSubmissionFailed { face_id: u64, detail: String },

    /// 转发管线内部发生 panic，已被外层守卫捕获。
    #[error("forwarder pipeline panicked: {detail}")]
    PipelinePanicked { detail: String },

    /// 无法归类的内部错误；应当在后续迭代中持续拆分为更具体的变体。
    #[error("internal forwarder failure: {detail}")]
    Internal { detail: String },
}

impl ForwarderError {
    #[must_use]
    pub fn category(&self) -> DropReason {
        match self {
            ForwarderError::MalformedPacket { .. } => DropReason::Malformed,
            ForwarderError::NoStrategy { .. } => DropReason::NoStrategy,
            ForwarderError::KeyChainInitFailed { .. } => DropReason::Crashed,
            ForwarderError::ValidatorSubmissionFailed { .. } => DropReason::Validator,
            ForwarderError::PipelinePanicked { .. } => DropReason::Crashed,
            ForwarderError::Internal { .. } => DropReason::Crashed,
        }
    }
}
