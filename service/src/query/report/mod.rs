//! Export report [`Query`] definitions.
//!
//! The spreadsheet and label documents themselves are rendered by external
//! libraries; these queries derive the data those renderers consume.
//!
//! [`Query`]: crate::Query

pub mod labels;
pub mod orders;

pub use self::{labels::Labels, orders::Orders};
