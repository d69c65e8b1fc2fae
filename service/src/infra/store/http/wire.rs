//! Wire representations of the remote document API.

use std::collections::BTreeMap;

use common::datetime;
use derive_more::{Display, Error as StdError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{delivery, order, Order};

/// One order document, as the remote API serves and accepts it.
///
/// Field names follow the submission pipeline's original schema, hence the
/// `camelCase` and the loosely typed copy counts.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct OrderDoc {
    /// Document id.
    pub(super) id: String,

    /// Book the order was submitted for.
    pub(super) book_name: String,

    /// Human-readable registration id.
    pub(super) registration_id: String,

    /// Recipient name.
    pub(super) name: String,

    /// Recipient surname.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) surname: Option<String>,

    /// Recipient mobile number.
    pub(super) mobile_number: String,

    /// Delivery city.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) city: Option<String>,

    /// Delivery state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) state: Option<String>,

    /// Delivery pincode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) pincode: Option<String>,

    /// Delivery street address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) address: Option<String>,

    /// Plain copy count. Historically a number or a numeric string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) no_of_copies: Option<Value>,

    /// Per-title quantities of a multi-title order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) quantities: Option<BTreeMap<String, Value>>,

    /// Delivery type marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) delivery_type: Option<String>,

    /// Carrier tracking id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) delivery_id: Option<String>,

    /// Delivery timestamp.
    #[serde(
        default,
        with = "datetime::serde::rfc3339_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub(super) delivered_date: Option<order::DeliveryDateTime>,

    /// Creation timestamp.
    #[serde(with = "datetime::serde::rfc3339")]
    pub(super) created_at: order::CreationDateTime,

    /// Soft-deletion flag.
    #[serde(default)]
    pub(super) is_delete: bool,

    /// Soft-deletion timestamp.
    #[serde(
        default,
        with = "datetime::serde::rfc3339_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub(super) deleted_at: Option<order::DeletionDateTime>,
}

/// Error of an [`OrderDoc`] failing domain validation.
#[derive(Clone, Debug, Display, StdError)]
#[display("invalid `{field}` in document `{id}`")]
pub struct InvalidField {
    /// Id of the invalid document.
    pub id: String,

    /// Name of the invalid field.
    pub field: &'static str,
}

impl TryFrom<OrderDoc> for Order {
    type Error = InvalidField;

    fn try_from(doc: OrderDoc) -> Result<Self, Self::Error> {
        let OrderDoc {
            id,
            book_name,
            registration_id,
            name,
            surname,
            mobile_number,
            city,
            state,
            pincode,
            address,
            no_of_copies,
            quantities,
            delivery_type,
            delivery_id,
            delivered_date,
            created_at,
            is_delete,
            deleted_at,
        } = doc;

        let invalid = |field| InvalidField {
            id: id.clone(),
            field,
        };

        Ok(Self {
            book: crate::domain::book::Id::new(book_name)
                .ok_or_else(|| invalid("bookName"))?,
            registration: order::RegistrationId::new(registration_id)
                .ok_or_else(|| invalid("registrationId"))?,
            name: order::Name::new(name).ok_or_else(|| invalid("name"))?,
            surname: surname.and_then(order::Surname::new),
            mobile: order::Mobile::new(mobile_number)
                .ok_or_else(|| invalid("mobileNumber"))?,
            city: city.and_then(order::City::new),
            region: state.and_then(order::Region::new),
            pincode: pincode.and_then(order::Pincode::new),
            address: address.and_then(order::Address::new),
            copies: copies(no_of_copies.as_ref(), quantities.as_ref()),
            delivery_kind: delivery_type
                .and_then(|t| t.parse::<delivery::Kind>().ok()),
            tracking_id: delivery_id.and_then(delivery::TrackingId::new),
            delivered_at: delivered_date,
            created_at,
            deleted_at: is_delete.then(|| {
                deleted_at
                    .unwrap_or(common::DateTimeOf::UNIX_EPOCH)
            }),
            id: order::Id::new(id.clone()).ok_or_else(|| invalid("id"))?,
        })
    }
}

impl From<&Order> for OrderDoc {
    fn from(order: &Order) -> Self {
        let (no_of_copies, quantities) = match &order.copies {
            order::Copies::Single(count) => {
                (Some(Value::from(*count)), None)
            }
            order::Copies::PerTitle(map) => (
                None,
                Some(
                    map.iter()
                        .map(|(title, count)| {
                            (title.clone(), Value::from(*count))
                        })
                        .collect(),
                ),
            ),
        };

        Self {
            id: order.id.to_string(),
            book_name: order.book.to_string(),
            registration_id: order.registration.to_string(),
            name: order.name.to_string(),
            surname: order.surname.as_ref().map(ToString::to_string),
            mobile_number: order.mobile.to_string(),
            city: order.city.as_ref().map(ToString::to_string),
            state: order.region.as_ref().map(ToString::to_string),
            pincode: order.pincode.as_ref().map(ToString::to_string),
            address: order.address.as_ref().map(ToString::to_string),
            no_of_copies,
            quantities,
            delivery_type: order
                .delivery_kind
                .map(|kind| kind.to_string()),
            delivery_id: order.tracking_id.as_ref().map(ToString::to_string),
            delivered_date: order.delivered_at,
            created_at: order.created_at,
            is_delete: order.deleted_at.is_some(),
            deleted_at: order.deleted_at,
        }
    }
}

/// Interprets the loosely typed copy fields of an [`OrderDoc`].
///
/// A multi-title quantity map wins over the plain count; an unparseable
/// plain count defaults to a single copy.
fn copies(
    no_of_copies: Option<&Value>,
    quantities: Option<&BTreeMap<String, Value>>,
) -> order::Copies {
    if let Some(quantities) = quantities {
        order::Copies::PerTitle(
            quantities
                .iter()
                .map(|(title, count)| {
                    (title.clone(), parse_count(count).unwrap_or(0))
                })
                .collect(),
        )
    } else {
        order::Copies::Single(
            no_of_copies.and_then(parse_count).unwrap_or(1),
        )
    }
}

/// Parses a copy count out of a JSON number or a numeric string.
fn parse_count(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64()?.try_into().ok(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => {
            None
        }
    }
}

/// Response of the page-fetching endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PageResponse {
    /// Indicator whether the request succeeded.
    pub(super) success: bool,

    /// Served page of documents.
    #[serde(default)]
    pub(super) data: Vec<OrderDoc>,

    /// Id part of the cursor for the next page.
    #[serde(default)]
    pub(super) last_doc_id: Option<String>,

    /// Timestamp part of the cursor for the next page.
    #[serde(default, with = "datetime::serde::rfc3339_option")]
    pub(super) last_timestamp: Option<order::CreationDateTime>,

    /// Indicator whether more pages follow.
    #[serde(default)]
    pub(super) has_more: bool,

    /// Failure reason, if any.
    #[serde(default)]
    pub(super) error: Option<String>,
}

/// Response of the count endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CountResponse {
    /// Indicator whether the request succeeded.
    pub(super) success: bool,

    /// Total count of documents in the collection.
    #[serde(default)]
    pub(super) total_count: i64,

    /// Failure reason, if any.
    #[serde(default)]
    pub(super) error: Option<String>,
}

/// Response of a single-document endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DocResponse {
    /// Indicator whether the request succeeded.
    pub(super) success: bool,

    /// Served document, if it exists.
    #[serde(default)]
    pub(super) data: Option<OrderDoc>,

    /// Failure reason, if any.
    #[serde(default)]
    pub(super) error: Option<String>,
}

/// Response of the deleted-documents listing endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct IdsResponse {
    /// Indicator whether the request succeeded.
    pub(super) success: bool,

    /// Served document ids.
    #[serde(default)]
    pub(super) data: Vec<String>,

    /// Failure reason, if any.
    #[serde(default)]
    pub(super) error: Option<String>,
}

/// Response of a write endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WriteResponse {
    /// Indicator whether the write succeeded.
    pub(super) success: bool,

    /// Failure reason, if any.
    #[serde(default)]
    pub(super) error: Option<String>,
}
