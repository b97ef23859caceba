pub mod content;
pub mod layout_file;
pub mod pathfinding;
pub mod route;
pub mod session;
pub mod state;
pub mod traversal;
pub mod types;

#[cfg(test)]
mod test_support;

pub use layout_file::LayoutError;
pub use route::{Route, RoutePlan, TargetSet, plan_route};
pub use session::{ClickOutcome, NavSession};
pub use state::{Floor, ShopListing, Venue};
pub use traversal::{CancelToken, Pace, Traversal};
pub use types::*;
