//! [`Command`] for soft-deleting an [`Order`].

use common::operations::{By, Select, SoftDelete};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{order, Order},
    infra::{store, Store},
    Service,
};

use super::Command;

/// [`Command`] for soft-deleting an [`Order`], moving it into the recycling
/// bin.
#[derive(Clone, Debug, From)]
pub struct SoftDeleteOrder {
    /// ID of the [`Order`] to soft-delete.
    pub id: order::Id,
}

impl<Db> Command<SoftDeleteOrder> for Service<Db>
where
    Db: Store<
            Select<By<Option<Order>, order::Id>>,
            Ok = Option<Order>,
            Err = Traced<store::Error>,
        > + Store<
            SoftDelete<By<Order, order::Id>>,
            Ok = (),
            Err = Traced<store::Error>,
        >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SoftDeleteOrder,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SoftDeleteOrder { id } = cmd;

        let order = self
            .store()
            .execute(Select(By::<Option<Order>, _>::new(id.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::OrderNotExists(id.clone()))
            .map_err(tracerr::wrap!())?;
        if order.is_deleted() {
            return Ok(());
        }

        self.store()
            .execute(SoftDelete(By::<Order, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`SoftDeleteOrder`] [`Command`] execution.
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
