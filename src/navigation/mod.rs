//! Navigation access and view-cache control.
//!
//! The static route table, the depth-bounding flattener, location matching,
//! the guard deciding each navigation, and the controller running the
//! before/after phases around it.

pub mod controller;
pub mod flatten;
pub mod guard;
pub mod location;
pub mod matcher;
pub mod table;
pub mod view;

pub use controller::{NavigationController, NavigationReport, NavigationState, NavigationTicket};
pub use flatten::flatten_routes;
pub use guard::{AllowList, Decision, decide};
pub use location::Location;
pub use matcher::{ResolvedRoute, RouteMatcher};
pub use table::constant_routes;
pub use view::ViewFactory;
