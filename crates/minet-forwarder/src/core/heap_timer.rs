//! HeapTimer：按到期时间排序的最小堆，驱动 PITEntry 的过期/终结。
//!
//! # 教案式说明
//! - **意图 (Why)**：转发器需要在单线程循环里廉价地问"现在有哪些事件到期了"，
//!   同时支持按 key 取消——PIT key 每次 `SetExpiryTime` 都要先取消旧事件。
//! - **执行 (How)**：沿用设计注记里建议的惰性取消策略——`cancel` 只是把
//!   `key → seq` 映射里的条目抹掉；堆里的旧条目在 `drain_due` 弹出时如果发现
//!   自己的 `seq` 不再是该 key 的"当前代"，直接丢弃不执行回调。这样
//!   `add`/`cancel` 都是 O(log n) / O(1)，不需要在堆内部做按位置删除。
//! - **风险 (Trade-offs)**：堆可能短暂持有已经作废的条目直到它们被弹出，
//!   属于有界的空间浪费，而不是正确性问题。

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::collections::HashMap;
use std::time::{Duration, Instant};

type Seq = u64;

struct HeapEntry<K> {
    deadline: Instant,
    seq: Seq,
    key: K,
}

impl<K> PartialEq for HeapEntry<K> {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}
impl<K> Eq for HeapEntry<K> {}

impl<K> PartialOrd for HeapEntry<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> Ord for HeapEntry<K> {
    /// `BinaryHeap` 是大顶堆；反转比较使得最早到期（deadline 最小）的条目
    /// 排在堆顶。到期时间相同时按插入序（seq 小的先）保证 FIFO。
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// 单线程最小堆定时器。`K` 是 PIT key（或任何调用方希望绑定一个"当前唯一
/// 有效事件"语义的标识）；`K` 必须可哈希、可比较，因为它同时是侧表的键。
pub struct HeapTimer<K: Eq + std::hash::Hash + Clone> {
    heap: BinaryHeap<HeapEntry<K>>,
    current_seq: HashMap<K, Seq>,
    next_seq: Seq,
}

impl<K: Eq + std::hash::Hash + Clone> Default for HeapTimer<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + std::hash::Hash + Clone> HeapTimer<K> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            current_seq: HashMap::new(),
            next_seq: 0,
        }
    }

    /// 加入一个 `duration` 毫秒之后到期的事件，键为 `key`。若该 key 已有
    /// 挂起事件，旧事件被取消（先取消后添加，保证同一 key 至多一个活跃
    /// 事件）。
    pub fn add(&mut self, duration: Duration, key: K) {
        self.cancel(&key);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.current_seq.insert(key.clone(), seq);
        self.heap.push(HeapEntry {
            deadline: Instant::now() + duration,
            seq,
            key,
        });
    }

    /// 取消 key 对应的挂起事件（若存在）。堆内旧条目不会立即移除，留给
    /// `drain_due` 在弹出时按代数识别丢弃。
    pub fn cancel(&mut self, key: &K) {
        self.current_seq.remove(key);
    }

    /// 弹出所有到期时间 `<= now` 的事件，按到期顺序返回其 key；已取消/过期
    /// 代的条目被静默丢弃，不出现在返回值里。
    pub fn drain_due(&mut self, now: Instant) -> Vec<K> {
        let mut due = Vec::new();
        while let Some(top) = self.heap.peek() {
            if top.deadline > now {
                break;
            }
            let entry = self.heap.pop().expect("peeked entry must be poppable");
            let is_current = self.current_seq.get(&entry.key) == Some(&entry.seq);
            if is_current {
                self.current_seq.remove(&entry.key);
                due.push(entry.key);
            }
        }
        due
    }

    #[must_use]
    pub fn is_pending(&self, key: &K) -> bool {
        self.current_seq.contains_key(key)
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.current_seq.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn drain_due_respects_deadline_order() {
        let mut timer: HeapTimer<&'static str> = HeapTimer::new();
        let base = Instant::now();
        timer.add(Duration::from_millis(10), "late");
        timer.add(Duration::from_millis(1), "early");

        let due = timer.drain_due(base + Duration::from_millis(5));
        assert_eq!(due, vec!["early"]);

        let due = timer.drain_due(base + Duration::from_millis(20));
        assert_eq!(due, vec!["late"]);
    }

    #[test]
    fn re_add_cancels_previous_event_for_same_key() {
        let mut timer: HeapTimer<&'static str> = HeapTimer::new();
        timer.add(Duration::from_millis(1), "k");
        timer.add(Duration::from_millis(100), "k");

        let due = timer.drain_due(Instant::now() + Duration::from_millis(5));
        assert!(due.is_empty(), "the 1ms event must have been cancelled by the re-add");
        assert!(timer.is_pending(&"k"));
    }

    #[test]
    fn explicit_cancel_drops_event_silently() {
        let mut timer: HeapTimer<&'static str> = HeapTimer::new();
        timer.add(Duration::from_millis(1), "k");
        timer.cancel(&"k");

        let due = timer.drain_due(Instant::now() + Duration::from_millis(5));
        assert!(due.is_empty());
        assert!(!timer.is_pending(&"k"));
    }

    #[test]
    fn zero_duration_is_immediately_due() {
        let mut timer: HeapTimer<&'static str> = HeapTimer::new();
        timer.add(Duration::from_millis(0), "k");
        let due = timer.drain_due(Instant::now());
        assert_eq!(due, vec!["k"]);
    }
}
