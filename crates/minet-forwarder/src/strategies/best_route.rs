//! BestRoute: 总是选 FIB 命中集合里成本最低、且不是入口 face 的下一跳。

use minet_core::{Data, GpPkt, Interest, Nack, NackReason};

use crate::core::pit::PitEntry;
use crate::core::strategy::{pick_excluding, PipelineContext, Strategy};

#[derive(Debug, Default, Clone, Copy)]
pub struct BestRoute;

impl Strategy for BestRoute {
    fn after_receive_interest(&self, ctx: &PipelineContext<'_>, entry: &mut PitEntry, interest: &Interest, ingress: u64) {
        let Some(hops) = ctx.fib.longest_prefix(&interest.name) else {
            tracing::debug!(name = %interest.name, "best-route: no FIB entry, Nack(NoRoute)");
            ctx.outgoing_nack(entry, ingress, NackReason::NoRoute);
            return;
        };
        match pick_excluding(&hops, ingress) {
            Some(hop) => ctx.outgoing_interest(entry, interest, hop.face_id),
            None => {
                tracing::debug!(name = %interest.name, "best-route: no usable nexthop excluding ingress, Nack(NoRoute)");
                ctx.outgoing_nack(entry, ingress, NackReason::NoRoute);
            }
        }
    }

    fn after_content_store_hit(&self, ctx: &PipelineContext<'_>, _entry: &mut PitEntry, data: &Data, ingress: u64) {
        ctx.outgoing_data(data, ingress);
    }

    fn after_receive_data(&self, ctx: &PipelineContext<'_>, entry: &mut PitEntry, data: &Data, _ingress: u64) {
        let faces: Vec<u64> = entry.in_records.keys().copied().collect();
        for face in faces {
            ctx.outgoing_data(data, face);
        }
    }

    fn after_receive_nack(&self, _ctx: &PipelineContext<'_>, entry: &mut PitEntry, nack: &Nack, ingress: u64) {
        tracing::debug!(name = %entry.name, ingress, reason = ?nack.reason, "best-route: nack observed, no retry policy configured");
    }

    fn after_receive_gppkt(&self, ctx: &PipelineContext<'_>, packet: &GpPkt, ingress: u64) {
        let Some(hops) = ctx.fib.longest_prefix(&packet.dst_identifier) else {
            tracing::debug!(dst = %packet.dst_identifier, "best-route: gppkt has no route, dropped");
            return;
        };
        if let Some(hop) = pick_excluding(&hops, ingress) {
            ctx.outgoing_gppkt(packet, hop.face_id);
        } else {
            tracing::debug!(dst = %packet.dst_identifier, "best-route: gppkt has no usable nexthop, dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Fib, NextHop};
    use crate::core::{FaceRegistry, NullPluginManager, Pit};
    use minet_core::Name;

    #[test]
    fn picks_lowest_cost_nexthop_excluding_ingress() {
        let fib = Fib::new();
        fib.add_route(Name::parse("/a").unwrap(), NextHop { face_id: 1, cost: 5 });
        fib.add_route(Name::parse("/a").unwrap(), NextHop { face_id: 2, cost: 1 });
        let faces = FaceRegistry::new();
        let plugin = NullPluginManager;
        let ctx = PipelineContext { fib: &fib, faces: &faces, plugin: &plugin };

        let pit = Pit::new();
        let name = Name::parse("/a/x").unwrap();
        let interest = Interest::new(name.clone(), 1, 3);
        let mut entry_ref = pit.insert(&name);

        BestRoute.after_receive_interest(&ctx, &mut entry_ref, &interest, 1);
        assert!(entry_ref.out_records.contains_key(&2));
        assert_eq!(entry_ref.out_records.len(), 1);
    }
}
