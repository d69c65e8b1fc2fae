//! [`Orders`] export report definition.

use std::convert::Infallible;

use crate::{
    domain::{delivery, order, Order},
    Query, Service,
};

/// [`Query`] deriving spreadsheet export [`Row`]s from an already filtered
/// in-memory set of [`Order`]s.
///
/// Runs no store round trip.
#[derive(Clone, Debug)]
pub struct Orders {
    /// [`Order`]s to derive the [`Row`]s from.
    pub records: Vec<Order>,
}

/// Output of the [`Orders`] [`Query`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Rows of the report, one per [`Order`], in the input ordering.
    pub rows: Vec<Row>,
}

/// Row in the [`Output`] of the [`Orders`] [`Query`].
#[derive(Clone, Debug)]
pub struct Row {
    /// [`order::RegistrationId`] of the [`Order`].
    pub registration: order::RegistrationId,

    /// Full recipient name.
    pub recipient: String,

    /// [`order::Mobile`] of the recipient.
    pub mobile: order::Mobile,

    /// [`order::City`] of the delivery address.
    pub city: Option<order::City>,

    /// [`order::Region`] of the delivery address.
    pub region: Option<order::Region>,

    /// [`order::Pincode`] of the delivery address.
    pub pincode: Option<order::Pincode>,

    /// Street [`order::Address`] of the delivery.
    pub address: Option<order::Address>,

    /// Total requested copies.
    pub copies: u32,

    /// Assigned [`delivery::Kind`].
    pub delivery_kind: Option<delivery::Kind>,

    /// Assigned [`delivery::TrackingId`].
    pub tracking_id: Option<delivery::TrackingId>,

    /// [`DateTime`] the [`Order`] was delivered at.
    ///
    /// [`DateTime`]: common::DateTime
    pub delivered_at: Option<order::DeliveryDateTime>,

    /// [`DateTime`] the [`Order`] was created at.
    ///
    /// [`DateTime`]: common::DateTime
    pub created_at: order::CreationDateTime,
}

impl From<&Order> for Row {
    fn from(order: &Order) -> Self {
        Self {
            registration: order.registration.clone(),
            recipient: order.recipient(),
            mobile: order.mobile.clone(),
            city: order.city.clone(),
            region: order.region.clone(),
            pincode: order.pincode.clone(),
            address: order.address.clone(),
            copies: order.copies.total(),
            delivery_kind: order.delivery_kind,
            tracking_id: order.tracking_id.clone(),
            delivered_at: order.delivered_at,
            created_at: order.created_at,
        }
    }
}

impl<Db> Query<Orders> for Service<Db> {
    type Ok = Output;
    type Err = Infallible;

    async fn execute(
        &self,
        Orders { records }: Orders,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(Output {
            rows: records.iter().map(Row::from).collect(),
        })
    }
}

#[cfg(test)]
mod spec {
    use std::collections::BTreeMap;

    use common::DateTime;

    use crate::domain::{delivery, order, Order};

    use super::Row;

    #[test]
    fn derives_row_from_order() {
        let order = Order {
            id: order::Id::new("doc-1").unwrap(),
            book: "prayers".parse().unwrap(),
            registration: order::RegistrationId::new("AP-3440").unwrap(),
            name: order::Name::new("Asha").unwrap(),
            surname: order::Surname::new("Patel"),
            mobile: order::Mobile::new("9876543210").unwrap(),
            city: order::City::new("Anand"),
            region: order::Region::new("Gujarat"),
            pincode: None,
            address: None,
            copies: order::Copies::PerTitle(BTreeMap::from([
                ("english".to_owned(), 2),
                ("hindi".to_owned(), 1),
            ])),
            delivery_kind: Some(delivery::Kind::Courier),
            tracking_id: delivery::TrackingId::new("CR-555"),
            delivered_at: None,
            created_at: DateTime::from_rfc3339("2024-01-15T10:00:00Z")
                .unwrap()
                .coerce(),
            deleted_at: None,
        };

        let row = Row::from(&order);

        assert_eq!(row.recipient, "Asha Patel");
        assert_eq!(row.copies, 3);
        assert_eq!(row.delivery_kind, Some(delivery::Kind::Courier));
        assert_eq!(row.tracking_id, delivery::TrackingId::new("CR-555"));
        assert_eq!(row.pincode, None);
        assert_eq!(row.created_at, order.created_at);
    }
}
