//! [`Command`] for restoring a soft-deleted [`Order`].

use common::operations::{By, Restore, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{order, Order},
    infra::{store, Store},
    Service,
};

use super::Command;

/// [`Command`] for restoring an [`Order`] out of the recycling bin.
#[derive(Clone, Debug, From)]
pub struct RestoreOrder {
    /// ID of the [`Order`] to restore.
    pub id: order::Id,
}

impl<Db> Command<RestoreOrder> for Service<Db>
where
    Db: Store<
            Select<By<Option<Order>, order::Id>>,
            Ok = Option<Order>,
            Err = Traced<store::Error>,
        > + Store<
            Restore<By<Order, order::Id>>,
            Ok = (),
            Err = Traced<store::Error>,
        >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: RestoreOrder) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RestoreOrder { id } = cmd;

        let order = self
            .store()
            .execute(Select(By::<Option<Order>, _>::new(id.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::OrderNotExists(id.clone()))
            .map_err(tracerr::wrap!())?;
        if !order.is_deleted() {
            return Ok(());
        }

        self.store()
            .execute(Restore(By::<Order, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`RestoreOrder`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Store`] error.
    #[display("`Store` operation failed: {_0}")]
    Store(store::Error),

    /// [`Order`] doesn't exist.
    #[display("`Order(id: {_0})` does not exist")]
    #[from(ignore)]
    OrderNotExists(#[error(not(source))] order::Id),
}
