pub mod assignment;
pub mod container;
pub mod item;
pub mod tenant;

pub use assignment::StaffAssignment;
pub use container::{Container, ContainerKind, NewContainer};
pub use item::{NewItem, OrderedItem};
pub use tenant::{AccessibleTenant, Tenant, TenantId};
