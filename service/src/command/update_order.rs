//! [`Command`] for updating an [`Order`].

use common::operations::{By, Select, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{delivery, order, Order},
    infra::{store, Store},
    Service,
};

use super::Command;

/// [`Command`] for updating editable fields of an [`Order`].
#[derive(Clone, Debug)]
pub struct UpdateOrder {
    /// ID of the [`Order`] to update.
    pub id: order::Id,

    /// [`Patch`] to apply.
    pub patch: Patch,
}

/// Editable field group of an [`Order`].
///
/// Each variant replaces its whole group, mirroring the edit dialogs: a
/// [`None`] within a variant clears the field.
#[derive(Clone, Debug)]
pub enum Patch {
    /// Replaces the delivery information.
    Delivery {
        /// New [`delivery::Kind`].
        kind: Option<delivery::Kind>,

        /// New [`delivery::TrackingId`].
        tracking_id: Option<delivery::TrackingId>,

        /// New delivery timestamp.
        delivered_at: Option<order::DeliveryDateTime>,
    },

    /// Replaces the delivery address.
    Address {
        /// New street [`order::Address`].
        address: Option<order::Address>,

        /// New [`order::City`].
        city: Option<order::City>,

        /// New [`order::Region`].
        region: Option<order::Region>,

        /// New [`order::Pincode`].
        pincode: Option<order::Pincode>,
    },

    /// Replaces the mobile number.
    Mobile(order::Mobile),
}

impl<Db> Command<UpdateOrder> for Service<Db>
where
    Db: Store<
            Select<By<Option<Order>, order::Id>>,
            Ok = Option<Order>,
            Err = Traced<store::Error>,
        > + Store<Update<Order>, Ok = (), Err = Traced<store::Error>>,
{
    type Ok = Order;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateOrder) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateOrder { id, patch } = cmd;

        let mut order = self
            .store()
            .execute(Select(By::<Option<Order>, _>::new(id.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::OrderNotExists(id))
            .map_err(tracerr::wrap!())?;

        match patch {
            Patch::Delivery {
                kind,
                tracking_id,
                delivered_at,
            } => {
                order.delivery_kind = kind;
                order.tracking_id = tracking_id;
                order.delivered_at = delivered_at;
            }
            Patch::Address {
                address,
                city,
                region,
                pincode,
            } => {
                order.address = address;
                order.city = city;
                order.region = region;
                order.pincode = pincode;
            }
            Patch::Mobile(mobile) => {
                order.mobile = mobile;
            }
        }

        self.store()
            .execute(Update(order.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(order)
    }
}

/// Error of [`UpdateOrder`] [`Command`] execution.
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
