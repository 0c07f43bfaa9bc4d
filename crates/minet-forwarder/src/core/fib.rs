//! Forwarding Information Base：名称前缀 → 下一跳集合，只读于核心。
//!
//! 路由计算不在这里发生——FIB 由外部控制面填充；这里只提供插入/移除接口
//! 给宿主，以及策略查询时使用的最长前缀查找。

use parking_lot::RwLock;

use minet_core::Name;

/// 一个下一跳：目标 face 与成本（成本越低越优先）。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NextHop {
    pub face_id: u64,
    pub cost: u32,
}

/// Forwarding Information Base。
///
/// 用 `RwLock<Vec<(Name, Vec<NextHop>)>>` 而不是前缀树：FIB 更新频率远低于
/// 查询频率，但路由条目数量在这个引擎的目标规模下足够小，线性扫描加读写锁
/// 比维护一棵并发 trie 更直接也更容易审计；见 [`minet_core::name::longest_prefix_match`]。
#[derive(Default)]
pub struct Fib {
    routes: RwLock<Vec<(Name, Vec<NextHop>)>>,
}

impl Fib {
    #[must_use]
    pub fn new() -> Self {
        Self { routes: RwLock::new(Vec::new()) }
    }

    /// 为 `prefix` 注册一个下一跳；若该 face 已经是该前缀的下一跳，更新其
    /// 成本而不是追加重复条目。
    pub fn add_route(&self, prefix: Name, next_hop: NextHop) {
        let mut routes = self.routes.write();
        if let Some((_, hops)) = routes.iter_mut().find(|(p, _)| *p == prefix) {
            if let Some(existing) = hops.iter_mut().find(|h| h.face_id == next_hop.face_id) {
                existing.cost = next_hop.cost;
            } else {
                hops.push(next_hop);
            }
        } else {
            routes.push((prefix, vec![next_hop]));
        }
    }

    pub fn remove_route(&self, prefix: &Name, face_id: u64) {
        let mut routes = self.routes.write();
        if let Some((_, hops)) = routes.iter_mut().find(|(p, _)| p == prefix) {
            hops.retain(|h| h.face_id != face_id);
        }
    }

    /// 最长前缀匹配，返回命中前缀下的下一跳集合快照。
    #[must_use]
    pub fn longest_prefix(&self, name: &Name) -> Option<Vec<NextHop>> {
        let routes = self.routes.read();
        routes
            .iter()
            .filter(|(prefix, _)| prefix.is_prefix_of(name))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, hops)| hops.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_prefix_prefers_more_specific_route() {
        let fib = Fib::new();
        fib.add_route(Name::parse("/min").unwrap(), NextHop { face_id: 1, cost: 10 });
        fib.add_route(Name::parse("/min/pkusz").unwrap(), NextHop { face_id: 2, cost: 5 });

        let hops = fib.longest_prefix(&Name::parse("/min/pkusz/x").unwrap()).unwrap();
        assert_eq!(hops, vec![NextHop { face_id: 2, cost: 5 }]);
    }

    #[test]
    fn no_match_returns_none() {
        let fib = Fib::new();
        fib.add_route(Name::parse("/other").unwrap(), NextHop { face_id: 1, cost: 1 });
        assert!(fib.longest_prefix(&Name::parse("/min").unwrap()).is_none());
    }

    #[test]
    fn re_adding_same_face_updates_cost_instead_of_duplicating() {
        let fib = Fib::new();
        let prefix = Name::parse("/a").unwrap();
        fib.add_route(prefix.clone(), NextHop { face_id: 1, cost: 10 });
        fib.add_route(prefix.clone(), NextHop { face_id: 1, cost: 2 });

        let hops = fib.longest_prefix(&prefix).unwrap();
        assert_eq!(hops, vec![NextHop { face_id: 1, cost: 2 }]);
    }
}
