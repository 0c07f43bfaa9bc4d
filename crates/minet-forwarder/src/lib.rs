//! # minet-forwarder
//!
//! ## 角色定位（Why）
//! - 拥有所有可变转发状态：PIT、FIB、ContentStore、StrategyTable、
//!   HeapTimer、PluginManager、Face 注册表；
//! - 实现连接这些表的十余条流水线（incoming interest/data/nack/gppkt、
//!   content-store hit/miss、interest-loop、interest-finalize、
//!   data-unsolicited……），并以一个单线程调度循环（[`forwarder::Forwarder`]）
//!   把它们串起来。
//!
//! `minet-core` 提供词汇表，这个 crate 提供会动的部分。

pub mod core;
pub mod forwarder;
pub mod queue;
pub mod strategies;
pub mod validator;

pub use core::{
    ContentStore, DuplicateNonce, FaceRegistry, Fib, HeapTimer, HookOutcome, InRecord,
    NextHop, NullPluginManager, OutRecord, Pit, PitEntry, PipelineContext, PluginManager,
    Strategy, StrategyTable,
};
pub use forwarder::{shutdown_channel, Forwarder};
pub use queue::{
    packet_queue, IncomingPacketData, MinPacket, PacketQueueReceiver, PacketQueueSender,
    ReadResult,
};
pub use strategies::{BestRoute, RoundRobin};
pub use validator::PacketValidator;
