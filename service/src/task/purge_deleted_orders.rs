//! [`PurgeDeletedOrders`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::operations::{By, Delete, Perform, Select, Start};
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{order, Order},
    infra::{store, Store},
    Service,
};

use super::Task;

/// Configuration for [`PurgeDeletedOrders`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between recycling bin sweeps.
    pub interval: time::Duration,

    /// Timeout after which a soft-deleted [`Order`] is purged for good.
    pub timeout: time::Duration,
}

/// [`Task`] emptying the recycling bin of [`Order`]s soft-deleted longer ago
/// than the configured timeout.
#[derive(Clone, Copy, Debug)]
pub struct PurgeDeletedOrders<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db> Task<Start<By<PurgeDeletedOrders<Self>, Config>>> for Service<Db>
where
    PurgeDeletedOrders<Service<Db>>:
        Task<Perform<()>, Ok = (), Err: Error> + Send + Sync + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<PurgeDeletedOrders<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = PurgeDeletedOrders {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            _ = task.execute(Perform(())).await.map_err(|e| {
                log::error!("`task::PurgeDeletedOrders` failed: {e}");
            });
        }
    }
}

impl<Db> Task<Perform<()>> for PurgeDeletedOrders<Service<Db>>
where
    Db: Store<
            Select<By<Vec<order::Id>, order::DeletionDateTime>>,
            Ok = Vec<order::Id>,
            Err = Traced<store::Error>,
        > + Store<
            Delete<By<Order, order::Id>>,
            Ok = (),
            Err = Traced<store::Error>,
        >,
{
    type Ok = ();
    type Err = ExecutionError;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        let deadline = order::DeletionDateTime::now() - self.config.timeout;
        let stale = self
            .service
            .store()
            .execute(Select(By::<Vec<order::Id>, _>::new(deadline)))
            .await
            .map_err(tracerr::map_from_and_wrap!())?;
        if stale.is_empty() {
            return Ok(());
        }

        // Documents are removed one by one: the store has no transactions,
        // so a failed removal only delays that document until the next
        // sweep.
        let total = stale.len();
        let mut purged = 0_usize;
        for id in stale {
            match self
                .service
                .store()
                .execute(Delete(By::<Order, _>::new(id.clone())))
                .await
            {
                Ok(()) => purged += 1,
                Err(e) => {
                    log::warn!("failed to purge `Order(id: {id})`: {e}");
                }
            }
        }
        log::info!("purged {purged} of {total} stale deleted orders");

        Ok(())
    }
}

/// Error of [`PurgeDeletedOrders`] execution.
pub type ExecutionError = Traced<store::Error>;
