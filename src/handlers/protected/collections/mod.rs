pub mod container;
pub mod item;
pub mod items;
pub mod order;
pub mod utils;

// Re-export handler functions for use in routing
pub use container::get as container_list;
pub use container::post as container_create;

pub use items::get as items_get;
pub use items::post as items_post;

pub use item::delete as item_delete;
pub use item::move_step as item_move;

pub use order::put as order_put;
