//! [`Command`] for hard-deleting an [`Order`].

use common::operations::{By, Delete, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{order, Order},
    infra::{store, Store},
    Service,
};

use super::Command;

/// [`Command`] for removing an [`Order`] from the store entirely.
///
/// Only soft-deleted [`Order`]s (the recycling bin) can be removed this way.
#[derive(Clone, Debug, From)]
pub struct HardDeleteOrder {
    /// ID of the [`Order`] to remove.
    pub id: order::Id,
}

impl<Db> Command<HardDeleteOrder> for Service<Db>
where
    Db: Store<
            Select<By<Option<Order>, order::Id>>,
            Ok = Option<Order>,
            Err = Traced<store::Error>,
        > + Store<
            Delete<By<Order, order::Id>>,
            Ok = (),
            Err = Traced<store::Error>,
        >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: HardDeleteOrder,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let HardDeleteOrder { id } = cmd;

        let order = self
            .store()
            .execute(Select(By::<Option<Order>, _>::new(id.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::OrderNotExists(id.clone()))
            .map_err(tracerr::wrap!())?;
        if !order.is_deleted() {
            return Err(tracerr::new!(E::NotSoftDeleted(id)));
        }

        self.store()
            .execute(Delete(By::<Order, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`HardDeleteOrder`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Store`] error.
    #[display("`Store` operation failed: {_0}")]
    Store(store::Error),

    /// [`Order`] doesn't exist.
    #[display("`Order(id: {_0})` does not exist")]
    #[from(ignore)]
    OrderNotExists(#[error(not(source))] order::Id),

    /// [`Order`] is not in the recycling bin.
    #[display("`Order(id: {_0})` is not soft-deleted")]
    #[from(ignore)]
    NotSoftDeleted(#[error(not(source))] order::Id),
}
