//! [`Labels`] export report definition.

use std::convert::Infallible;

use crate::{
    domain::{order, Order},
    Query, Service,
};

/// [`Query`] deriving shipping [`Label`]s from an already filtered in-memory
/// set of [`Order`]s.
///
/// Orders with no printable address cannot be labelled and are reported in
/// [`Output::skipped`] instead of being dropped silently.
#[derive(Clone, Debug)]
pub struct Labels {
    /// [`Order`]s to derive the [`Label`]s from.
    pub records: Vec<Order>,
}

/// Output of the [`Labels`] [`Query`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Printable labels, in the input ordering.
    pub labels: Vec<Label>,

    /// [`Order`]s skipped for having no printable address.
    pub skipped: Vec<order::Id>,
}

/// Shipping label data of one [`Order`].
#[derive(Clone, Debug)]
pub struct Label {
    /// [`order::RegistrationId`] of the [`Order`].
    pub registration: order::RegistrationId,

    /// Full recipient name.
    pub recipient: String,

    /// [`order::Mobile`] of the recipient.
    pub mobile: order::Mobile,

    /// Address block, one printable line per entry.
    pub address_lines: Vec<String>,

    /// Total requested copies.
    pub copies: u32,
}

impl Label {
    /// Derives a [`Label`] from the provided [`Order`].
    ///
    /// [`None`] is returned if the [`Order`] has no printable address.
    #[must_use]
    fn derive(order: &Order) -> Option<Self> {
        let street = order.address.as_ref()?;

        let mut address_lines = vec![street.to_string()];
        let locality = [
            order.city.as_ref().map(ToString::to_string),
            order.pincode.as_ref().map(ToString::to_string),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
        if !locality.is_empty() {
            address_lines.push(locality);
        }
        if let Some(region) = &order.region {
            address_lines.push(region.to_string());
        }

        Some(Self {
            registration: order.registration.clone(),
            recipient: order.recipient(),
            mobile: order.mobile.clone(),
            address_lines,
            copies: order.copies.total(),
        })
    }
}

impl<Db> Query<Labels> for Service<Db> {
    type Ok = Output;
    type Err = Infallible;

    async fn execute(
        &self,
        Labels { records }: Labels,
    ) -> Result<Self::Ok, Self::Err> {
        let mut labels = Vec::with_capacity(records.len());
        let mut skipped = Vec::new();
        for order in &records {
            match Label::derive(order) {
                Some(label) => labels.push(label),
                None => skipped.push(order.id.clone()),
            }
        }

        Ok(Output { labels, skipped })
    }
}

#[cfg(test)]
mod spec {
    use common::DateTime;

    use crate::domain::{order, Order};

    use super::Label;

    fn order() -> Order {
        Order {
            id: order::Id::new("doc-1").unwrap(),
            book: "prayers".parse().unwrap(),
            registration: order::RegistrationId::new("AP-3440").unwrap(),
            name: order::Name::new("Asha").unwrap(),
            surname: order::Surname::new("Patel"),
            mobile: order::Mobile::new("9876543210").unwrap(),
            city: order::City::new("Anand"),
            region: order::Region::new("Gujarat"),
            pincode: order::Pincode::new("388120"),
            address: order::Address::new("12 Station Road"),
            copies: order::Copies::Single(3),
            delivery_kind: None,
            tracking_id: None,
            delivered_at: None,
            created_at: DateTime::from_rfc3339("2024-01-15T10:00:00Z")
                .unwrap()
                .coerce(),
            deleted_at: None,
        }
    }

    #[test]
    fn builds_address_block() {
        let label = Label::derive(&order()).unwrap();

        assert_eq!(label.recipient, "Asha Patel");
        assert_eq!(label.copies, 3);
        assert_eq!(
            label.address_lines,
            vec!["12 Station Road", "Anand 388120", "Gujarat"],
        );
    }

    #[test]
    fn tolerates_partial_addresses() {
        let mut partial = order();
        partial.city = None;
        partial.region = None;

        let label = Label::derive(&partial).unwrap();
        assert_eq!(
            label.address_lines,
            vec!["12 Station Road", "388120"],
        );
    }

    #[test]
    fn skips_orders_without_a_street_address() {
        let mut homeless = order();
        homeless.address = None;

        assert!(Label::derive(&homeless).is_none());
    }
}
