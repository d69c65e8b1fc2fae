//! [`Command`] for marking [`Order`]s as delivered in bulk.

use std::convert::Infallible;

use common::operations::Update;
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::Order;
use crate::{
    domain::{delivery, order},
    infra::{store, Store},
    Service,
};

use super::Command;

/// [`Command`] for marking the selected [`Order`]s as delivered on the
/// provided date.
///
/// Each [`Order`] is updated independently: there is no transaction across
/// them, so the result is a list of per-order [`Outcome`]s rather than an
/// all-or-nothing answer.
#[derive(Clone, Debug)]
pub struct MarkOrdersDelivered {
    /// IDs of the [`Order`]s to mark.
    pub ids: Vec<order::Id>,

    /// Delivery [`DateTime`] to stamp them with.
    ///
    /// [`DateTime`]: common::DateTime
    pub at: order::DeliveryDateTime,
}

/// Outcome of delivering a single [`Order`] within a [`MarkOrdersDelivered`]
/// [`Command`].
#[derive(Debug)]
pub struct Outcome {
    /// ID of the [`Order`].
    pub id: order::Id,

    /// Result of its update.
    pub result: Result<(), Traced<store::Error>>,
}

impl Outcome {
    /// Indicates whether the [`Order`] was marked as delivered.
    #[must_use]
    pub fn is_delivered(&self) -> bool {
        self.result.is_ok()
    }
}

impl<Db> Command<MarkOrdersDelivered> for Service<Db>
where
    Db: Store<
        Update<delivery::Confirmation>,
        Ok = (),
        Err = Traced<store::Error>,
    >,
{
    type Ok = Vec<Outcome>;
    type Err = Infallible;

    async fn execute(
        &self,
        cmd: MarkOrdersDelivered,
    ) -> Result<Self::Ok, Self::Err> {
        let MarkOrdersDelivered { ids, at } = cmd;

        let mut outcomes = Vec::with_capacity(ids.len());
        for id in ids {
            let result = self
                .store()
                .execute(Update(delivery::Confirmation {
                    order: id.clone(),
                    at,
                }))
                .await;
            if let Err(e) = &result {
                log::warn!(
                    "failed to mark `Order(id: {id})` as delivered: {e}",
                );
            }
            outcomes.push(Outcome { id, result });
        }

        Ok(outcomes)
    }
}
