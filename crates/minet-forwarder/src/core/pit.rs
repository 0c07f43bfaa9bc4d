//! Pending Interest Table。
//!
//! # 教案式说明
//! - **意图 (Why)**：记录"已转发但尚未满足"的 Interest，是去重、成环检测与
//!   Data/Nack 回溯匹配的唯一权威来源。
//! - **架构位置 (Where)**：以 `DashMap<Name, PitEntry>` 为骨架，承袭
//!   `SessionManager` 用并发 map 承载"活跃状态集合 + 按键排他访问"的做法——
//!   这里的转发器虽然单线程拥有 PIT，DashMap 仍然给了我们现成的
//!   entry-API（`get_mut`/`entry().or_insert_with`），比手写一个
//!   `Mutex<HashMap<_>>` 更省样板，且为将来若要把校验器之外的路径也并发化
//!   留了余地。
//! - **契约 (What)**：每个 face 至多一条 in-record、至多一条 out-record；
//!   `finalize` 对同一名称至多成功一次，由 `DashMap::remove` 的原子性
//!   天然保证。

use std::collections::HashMap;
use std::time::Instant;

use minet_core::{Interest, Name, NackHeader};

/// 一条 in-record：某个 face 上挂起的 Interest 状态。
#[derive(Clone, Debug)]
pub struct InRecord {
    pub face: u64,
    pub last_nonce: u64,
    pub last_interest: Interest,
    pub expire_time: Instant,
}

/// 一条 out-record：向某个 face 转发出去、尚待满足的 Interest 状态。
#[derive(Clone, Debug)]
pub struct OutRecord {
    pub face: u64,
    pub last_nonce: u64,
    pub expire_time: Instant,
    pub nack_header: Option<NackHeader>,
}

/// PIT 条目：某个名称下所有挂起消费者/已转发出站请求的聚合状态。
#[derive(Clone, Debug)]
pub struct PitEntry {
    pub name: Name,
    pub in_records: HashMap<u64, InRecord>,
    pub out_records: HashMap<u64, OutRecord>,
    pub satisfied: bool,
    pub deleted: bool,
}

impl PitEntry {
    fn new(name: Name) -> Self {
        Self {
            name,
            in_records: HashMap::new(),
            out_records: HashMap::new(),
            satisfied: false,
            deleted: false,
        }
    }

    /// 聚合过期时间：所有 in-record 到期时间的最大值——用 `max` 而非
    /// "只看最新"，因为 PITEntry 必须存活到最后一个还在等待的消费者
    /// 超时为止，而不是只保证最近一次刷新的消费者。
    #[must_use]
    pub fn max_in_record_expiry(&self) -> Option<Instant> {
        self.in_records.values().map(|r| r.expire_time).max()
    }

    /// 是否已经有挂起的消费者——决定 Incoming Interest 管线要不要跳过 CS
    /// 直接当作"正在抓取中"处理。
    #[must_use]
    pub fn has_pending_consumer(&self) -> bool {
        !self.in_records.is_empty()
    }

    /// 在 `entry.in_records` 中扫描与 `nonce` 相同的记录，区分是否来自
    /// `ingress` 本身。用于 Incoming Interest 管线的重复 Nonce 分类。
    #[must_use]
    pub fn classify_duplicate_nonce(&self, ingress: u64, nonce: u64) -> DuplicateNonce {
        let mut same = false;
        let mut other = false;
        for record in self.in_records.values() {
            if record.last_nonce == nonce {
                if record.face == ingress {
                    same = true;
                } else {
                    other = true;
                }
            }
        }
        if other {
            DuplicateNonce::InOther
        } else if same {
            DuplicateNonce::InSame
        } else {
            DuplicateNonce::None
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DuplicateNonce {
    None,
    InSame,
    InOther,
}

/// Pending Interest Table。以名称为键索引 [`PitEntry`]。
#[derive(Default)]
pub struct Pit {
    table: dashmap::DashMap<Name, PitEntry>,
}

impl Pit {
    #[must_use]
    pub fn new() -> Self {
        Self { table: dashmap::DashMap::new() }
    }

    /// 幂等插入：已存在同名条目则原样返回，否则为第一个命中该名称的
    /// Interest 创建一个空条目。
    pub fn insert(&self, name: &Name) -> dashmap::mapref::one::RefMut<'_, Name, PitEntry> {
        self.table
            .entry(name.clone())
            .or_insert_with(|| PitEntry::new(name.clone()))
    }

    #[must_use]
    pub fn get(&self, name: &Name) -> Option<dashmap::mapref::one::Ref<'_, Name, PitEntry>> {
        self.table.get(name)
    }

    #[must_use]
    pub fn get_mut(&self, name: &Name) -> Option<dashmap::mapref::one::RefMut<'_, Name, PitEntry>> {
        self.table.get_mut(name)
    }

    /// 按 Data 的名称查找匹配的挂起 Interest。精确匹配——Data 满足的是
    /// 发出该具体名称 Interest 的条目，不做前缀匹配（那是 FIB 查路由时的
    /// 语义，不是这里的 Data-to-Interest 回溯匹配）。
    #[must_use]
    pub fn find_data_matches(&self, name: &Name) -> Option<dashmap::mapref::one::RefMut<'_, Name, PitEntry>> {
        self.table.get_mut(name)
    }

    /// 终结：从表中移除条目。`DashMap::remove` 的原子性保证对同一名称至多
    /// 成功一次——第二次调用返回 `None`，不需要额外的 `deleted` 标记来防止
    /// 重复处理（标记仍保留在 [`PitEntry`] 上，供持有游离引用的调用方在
    /// 重新核对时使用）。
    pub fn finalize(&self, name: &Name) -> Option<PitEntry> {
        self.table.remove(name).map(|(_, mut entry)| {
            entry.deleted = true;
            entry
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minet_core::Interest;

    fn sample_interest(name: &Name, nonce: u64) -> Interest {
        Interest::new(name.clone(), nonce, 3)
    }

    #[test]
    fn insert_is_idempotent_by_name() {
        let pit = Pit::new();
        let name = Name::parse("/a").unwrap();
        pit.insert(&name);
        pit.insert(&name);
        assert_eq!(pit.len(), 1);
    }

    #[test]
    fn duplicate_nonce_classification() {
        let name = Name::parse("/a").unwrap();
        let mut entry = PitEntry::new(name.clone());
        entry.in_records.insert(
            1,
            InRecord {
                face: 1,
                last_nonce: 7,
                last_interest: sample_interest(&name, 7),
                expire_time: Instant::now(),
            },
        );

        assert_eq!(entry.classify_duplicate_nonce(1, 7), DuplicateNonce::InSame);
        assert_eq!(entry.classify_duplicate_nonce(2, 7), DuplicateNonce::InOther);
        assert_eq!(entry.classify_duplicate_nonce(2, 9), DuplicateNonce::None);
    }

    #[test]
    fn finalize_is_idempotent() {
        let pit = Pit::new();
        let name = Name::parse("/a").unwrap();
        pit.insert(&name);

        assert!(pit.finalize(&name).is_some());
        assert!(pit.finalize(&name).is_none());
    }

    #[test]
    fn max_in_record_expiry_picks_latest_deadline() {
        let name = Name::parse("/a").unwrap();
        let mut entry = PitEntry::new(name.clone());
        let now = Instant::now();
        entry.in_records.insert(1, InRecord { face: 1, last_nonce: 1, last_interest: sample_interest(&name, 1), expire_time: now });
        entry.in_records.insert(2, InRecord { face: 2, last_nonce: 2, last_interest: sample_interest(&name, 2), expire_time: now + std::time::Duration::from_secs(5) });

        assert_eq!(entry.max_in_record_expiry(), Some(now + std::time::Duration::from_secs(5)));
    }
}
