//! Infrastructure layer.

pub mod store;

#[cfg(feature = "http")]
pub use self::store::Http;
pub use self::store::Store;
