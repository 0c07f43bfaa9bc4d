//! Concrete forwarding strategies: [`BestRoute`] and [`RoundRobin`].

mod best_route;
mod round_robin;

pub use best_route::BestRoute;
pub use round_robin::RoundRobin;
