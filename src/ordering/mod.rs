//! Ordered collections: boards of prep columns, pages of content blocks and
//! navigation menus all keep their children in one integer `order` sequence.
//!
//! Planning (`plan`) is pure and synchronous; the manager hands a planner to
//! the store, which runs it against a locked snapshot inside one transaction.

pub mod error;
pub mod manager;
pub mod plan;

pub use error::{OrderError, ReorderMismatch};
pub use manager::OrderedCollectionManager;
pub use plan::{Direction, OrderPlan, OrderUpdate};
