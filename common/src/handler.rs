//! [`Handler`] abstractions.

use std::future::Future;

/// Executable handler of a single operation.
///
/// Store backends, commands, queries and background tasks all share this
/// seam, so any of them can be substituted behind it.
pub trait Handler<Args = ()> {
    /// Type of successful [`Handler`] result.
    type Ok;

    /// Type of this [`Handler`] error.
    type Err;

    /// Executes this [`Handler`] with the provided arguments.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
