//! Content Store：按名称缓存 Data，带新鲜度语义与容量上限。
//!
//! 与 PIT/FIB 不同，CS 完全由转发器单线程独占（没有外部写者），因此用一个
//! 普通 `HashMap` 加一个 FIFO 驱逐队列就够了，不需要 `DashMap` 的并发保护。

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use minet_core::{Data, Name};

struct CsEntry {
    data: Data,
    inserted_at: Instant,
}

impl CsEntry {
    /// `freshness_period_ms == 0` 被当作"从不新鲜"处理，而不是"永远新鲜"：
    /// 缓存的来源方如果没有显式声明新鲜期，`must_be_fresh` 查询就不应该把
    /// 它当作权威答案返回。
    fn is_fresh(&self, now: Instant) -> bool {
        self.data.freshness_period_ms > 0
            && now.saturating_duration_since(self.inserted_at) < Duration::from_millis(self.data.freshness_period_ms as u64)
    }
}

/// Content Store，容量上限触发 FIFO 驱逐（最早插入的条目先被替换）。
pub struct ContentStore {
    capacity: usize,
    entries: HashMap<Name, CsEntry>,
    insertion_order: VecDeque<Name>,
}

impl ContentStore {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            insertion_order: VecDeque::new(),
        }
    }

    pub fn insert(&mut self, data: Data) {
        let name = data.name.clone();
        if !self.entries.contains_key(&name) {
            self.insertion_order.push_back(name.clone());
        }
        self.entries.insert(name, CsEntry { data, inserted_at: Instant::now() });
        self.evict_if_over_capacity();
    }

    fn evict_if_over_capacity(&mut self) {
        while self.entries.len() > self.capacity {
            if let Some(oldest) = self.insertion_order.pop_front() {
                self.entries.remove(&oldest);
            } else {
                break;
            }
        }
    }

    /// 按名称精确查找；`must_be_fresh` 为真时，陈旧条目视为未命中。
    #[must_use]
    pub fn find(&self, name: &Name, must_be_fresh: bool) -> Option<&Data> {
        let entry = self.entries.get(name)?;
        if must_be_fresh && !entry.is_fresh(Instant::now()) {
            return None;
        }
        Some(&entry.data)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
