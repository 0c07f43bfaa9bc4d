//! StrategyTable：名称前缀 → [`Strategy`] 实例的最长前缀查找表。

use std::sync::Arc;

use parking_lot::RwLock;

use minet_core::Name;

use super::strategy::Strategy;

#[derive(Default)]
pub struct StrategyTable {
    entries: RwLock<Vec<(Name, Arc<dyn Strategy>)>>,
}

impl StrategyTable {
    #[must_use]
    pub fn new() -> Self {
        Self { entries: RwLock::new(Vec::new()) }
    }

    /// 注册一个前缀到策略的绑定；重复注册同一前缀会替换旧策略，而不是
    /// 追加出一个永远打不到的第二条目。
    pub fn register(&self, prefix: Name, strategy: Arc<dyn Strategy>) {
        let mut entries = self.entries.write();
        if let Some(slot) = entries.iter_mut().find(|(p, _)| *p == prefix) {
            slot.1 = strategy;
        } else {
            entries.push((prefix, strategy));
        }
    }

    #[must_use]
    pub fn longest_prefix(&self, name: &Name) -> Option<Arc<dyn Strategy>> {
        let entries = self.entries.read();
        entries
            .iter()
            .filter(|(prefix, _)| prefix.is_prefix_of(name))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, s)| Arc::clone(s))
    }
}
