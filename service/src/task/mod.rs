//! Background [`Task`]s definitions.

mod background;
pub mod purge_deleted_orders;

pub use common::Handler as Task;

pub use self::{
    background::Background, purge_deleted_orders::PurgeDeletedOrders,
};
