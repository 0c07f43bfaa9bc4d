//! 转发引擎拥有的表与调度状态：PIT、FIB、ContentStore、StrategyTable、
//! HeapTimer、PluginManager、Face 注册表，以及策略执行所需的能力句柄。

pub mod content_store;
pub mod faces;
pub mod fib;
pub mod heap_timer;
pub mod pit;
pub mod plugin;
pub mod strategy;
pub mod strategy_table;

pub use content_store::ContentStore;
pub use faces::FaceRegistry;
pub use fib::{Fib, NextHop};
pub use heap_timer::HeapTimer;
pub use pit::{DuplicateNonce, InRecord, OutRecord, Pit, PitEntry};
pub use plugin::{HookOutcome, NullPluginManager, PluginManager};
pub use strategy::{PipelineContext, Strategy};
pub use strategy_table::StrategyTable;
