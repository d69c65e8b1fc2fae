//! [`Command`] definition.

pub mod hard_delete_order;
pub mod mark_orders_delivered;
pub mod restore_order;
pub mod soft_delete_order;
pub mod update_order;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    hard_delete_order::HardDeleteOrder,
    mark_orders_delivered::MarkOrdersDelivered, restore_order::RestoreOrder,
    soft_delete_order::SoftDeleteOrder, update_order::UpdateOrder,
};
