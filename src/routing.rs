//! Connection routing: endpoint pairing, path planning, smoothing and checks.

pub mod clearance;
pub mod engine;
pub mod options;
pub mod pairing;
pub mod path_check;
pub mod planner;
pub mod search;
pub mod smoothing;

pub use engine::ConnectionRouter;
pub use options::{RouteError, RouteOptions, RoutingResult};
pub use pairing::ConnectionPair;
pub use path_check::PathReport;
