//! # minet-core
//!
//! ## 角色定位（Why）
//! - 承载命名数据转发引擎的数据模型（[`Name`]、[`Interest`]、[`Data`]、
//!   [`Nack`]、[`GpPkt`]）与外部协作者契约（[`LogicFace`]）；
//! - 为 `minet-forwarder` 提供不持有任何表状态的纯数据类型，使转发逻辑可以
//!   在不依赖具体传输/校验实现的前提下独立测试。
//!
//! ## 设计要求（What）
//! - 本 crate 不实现 PIT/FIB/CS/StrategyTable/Forwarder——那些是
//!   `minet-forwarder` 的职责；这里只有它们共同依赖的词汇表。
//! - 错误域（[`error::ForwarderError`]）与配置（[`config::ForwarderConfig`]）
//!   同样放在这里，因为两者都是 forwarder 与宿主进程共享的契约面。

pub mod config;
pub mod error;
pub mod face;
pub mod keychain;
pub mod name;
pub mod packet;

pub use config::ForwarderConfig;
pub use error::{DropReason, ForwarderError};
pub use face::LogicFace;
pub use keychain::{KeyChain, NullKeyChain, UnverifiedPacket};
pub use name::{IdentifierTag, Name, NameParseError};
pub use packet::{Data, GpPkt, Interest, Nack, NackHeader, NackReason};
