//! [`Order`]-related API handlers.
//!
//! [`Order`]: service::domain::Order

use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use common::{DateTime, DateTimeOf};
use serde::{Deserialize, Serialize};
use service::{
    command::{
        self, update_order::Patch, Command as _, HardDeleteOrder,
        MarkOrdersDelivered, RestoreOrder, SoftDeleteOrder, UpdateOrder,
    },
    domain::{book, delivery, order, Order},
    query,
    read::order::list,
    Query as _,
};

use crate::{error::OrderError, AsError as _, Context, Error};

use super::PatchError;

/// Page size served when the request does not name one.
const DEFAULT_PAGE_SIZE: usize = 50;

/// Hard cap on the requested page size.
const MAX_PAGE_SIZE: usize = 500;

/// Parses a [`book::Id`] out of a path segment.
fn book_id(raw: String) -> Result<book::Id, Error> {
    book::Id::new(raw).ok_or_else(|| Error::invalid_field("book"))
}

/// Parses an [`order::Id`] out of a path segment or a request field.
fn order_id(raw: String) -> Result<order::Id, Error> {
    order::Id::new(raw).ok_or_else(|| Error::invalid_field("id"))
}

/// Parses an [RFC 3339] timestamp out of a request field.
///
/// [RFC 3339]: https://tools.ietf.org/html/rfc3339
fn timestamp<Of: ?Sized>(
    raw: &str,
    field: &str,
) -> Result<DateTimeOf<Of>, Error> {
    DateTime::from_rfc3339(raw)
        .map(DateTime::coerce)
        .map_err(|_| Error::invalid_field(field))
}

/// Wire shape of an [`Order`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct OrderBody {
    /// Document id.
    id: String,

    /// Book the order belongs to.
    book: String,

    /// Human-readable registration id.
    registration_id: String,

    /// Recipient name.
    name: String,

    /// Recipient surname.
    surname: Option<String>,

    /// Recipient mobile number.
    mobile: String,

    /// Delivery city.
    city: Option<String>,

    /// Delivery region.
    region: Option<String>,

    /// Delivery pincode.
    pincode: Option<String>,

    /// Delivery street address.
    address: Option<String>,

    /// Total requested copies.
    copies: u32,

    /// Per-title quantities of a multi-title order.
    quantities: Option<BTreeMap<String, u32>>,

    /// Assigned delivery type.
    delivery_type: Option<delivery::Kind>,

    /// Assigned tracking id.
    tracking_id: Option<String>,

    /// Delivery timestamp.
    delivered_at: Option<String>,

    /// Creation timestamp.
    created_at: String,

    /// Soft-deletion timestamp.
    deleted_at: Option<String>,
}

impl From<&Order> for OrderBody {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            book: order.book.to_string(),
            registration_id: order.registration.to_string(),
            name: order.name.to_string(),
            surname: order.surname.as_ref().map(ToString::to_string),
            mobile: order.mobile.to_string(),
            city: order.city.as_ref().map(ToString::to_string),
            region: order.region.as_ref().map(ToString::to_string),
            pincode: order.pincode.as_ref().map(ToString::to_string),
            address: order.address.as_ref().map(ToString::to_string),
            copies: order.copies.total(),
            quantities: match &order.copies {
                order::Copies::Single(_) => None,
                order::Copies::PerTitle(map) => Some(map.clone()),
            },
            delivery_type: order.delivery_kind,
            tracking_id: order.tracking_id.as_ref().map(ToString::to_string),
            delivered_at: order
                .delivered_at
                .as_ref()
                .map(DateTimeOf::to_rfc3339),
            created_at: order.created_at.to_rfc3339(),
            deleted_at: order.deleted_at.as_ref().map(DateTimeOf::to_rfc3339),
        }
    }
}

/// Parameters of the [`list()`] handler.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(super) struct ListParams {
    /// Requested page size.
    page_size: Option<usize>,

    /// Id part of the cursor to resume after.
    last_doc_id: Option<String>,

    /// Timestamp part of the cursor to resume after.
    last_timestamp: Option<String>,
}

/// Wire shape of a served page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PageBody {
    /// Orders of this page.
    data: Vec<OrderBody>,

    /// Id part of the cursor for the next page.
    last_doc_id: Option<String>,

    /// Timestamp part of the cursor for the next page.
    last_timestamp: Option<String>,

    /// Indicator whether more pages follow.
    has_more: bool,
}

/// Serves one page of a book's [`Order`]s.
pub(super) async fn list(
    context: Context,
    Path(book): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<PageBody>, Error> {
    let book = book_id(book)?;
    let size = params
        .page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let after = match (params.last_doc_id, params.last_timestamp) {
        (Some(id), Some(ts)) => Some(list::Cursor {
            id: order_id(id)?,
            created_at: timestamp(&ts, "lastTimestamp")?,
        }),
        (None, None) => None,
        (Some(_), None) | (None, Some(_)) => {
            return Err(Error::invalid_field("lastDocId/lastTimestamp"));
        }
    };

    let page = context
        .service()
        .execute(query::orders::List::by(list::Selector {
            book,
            size,
            after,
        }))
        .await
        .map_err(|e| e.into_error())?;

    Ok(Json(PageBody {
        data: page.items.iter().map(OrderBody::from).collect(),
        last_doc_id: page.cursor.as_ref().map(|c| c.id.to_string()),
        last_timestamp: page
            .cursor
            .as_ref()
            .map(|c| c.created_at.to_rfc3339()),
        has_more: page.has_more,
    }))
}

/// Wire shape of a total count.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CountBody {
    /// Total count of orders in the book.
    total_count: i64,
}

/// Serves the total count of a book's [`Order`]s.
pub(super) async fn count(
    context: Context,
    Path(book): Path<String>,
) -> Result<Json<CountBody>, Error> {
    let book = book_id(book)?;

    let total = context
        .service()
        .execute(query::orders::TotalCount::by(book))
        .await
        .map_err(|e| e.into_error())?;

    Ok(Json(CountBody {
        total_count: total.into(),
    }))
}

/// Serves a single [`Order`].
pub(super) async fn find(
    context: Context,
    Path(id): Path<String>,
) -> Result<Json<OrderBody>, Error> {
    let id = order_id(id)?;

    let order = context
        .service()
        .execute(query::order::ById::by(id))
        .await
        .map_err(|e| e.into_error())?
        .ok_or_else(|| Error::from(OrderError::NotFound))?;

    Ok(Json(OrderBody::from(&order)))
}

/// Delivery field group of an [`update()`] request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DeliveryPatchBody {
    /// New delivery type.
    #[serde(default)]
    delivery_type: Option<delivery::Kind>,

    /// New tracking id.
    #[serde(default)]
    tracking_id: Option<String>,

    /// New delivery timestamp.
    #[serde(default)]
    delivered_at: Option<String>,
}

/// Address field group of an [`update()`] request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AddressPatchBody {
    /// New street address.
    #[serde(default)]
    address: Option<String>,

    /// New city.
    #[serde(default)]
    city: Option<String>,

    /// New region.
    #[serde(default)]
    region: Option<String>,

    /// New pincode.
    #[serde(default)]
    pincode: Option<String>,
}

/// Body of an [`update()`] request.
///
/// Exactly one field group must be provided.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(super) struct UpdateBody {
    /// Delivery field group.
    delivery: Option<DeliveryPatchBody>,

    /// Address field group.
    address: Option<AddressPatchBody>,

    /// New mobile number.
    mobile: Option<String>,
}

/// Updates an [`Order`].
pub(super) async fn update(
    context: Context,
    Path(id): Path<String>,
    Json(body): Json<UpdateBody>,
) -> Result<Json<OrderBody>, Error> {
    let id = order_id(id)?;

    let patch = match (body.delivery, body.address, body.mobile) {
        (Some(delivery), None, None) => Patch::Delivery {
            kind: delivery.delivery_type,
            tracking_id: delivery
                .tracking_id
                .map(|v| {
                    delivery::TrackingId::new(v).ok_or_else(|| {
                        Error::invalid_field("trackingId")
                    })
                })
                .transpose()?,
            delivered_at: delivery
                .delivered_at
                .map(|v| timestamp(&v, "deliveredAt"))
                .transpose()?,
        },
        (None, Some(address), None) => Patch::Address {
            address: address
                .address
                .map(|v| {
                    order::Address::new(v)
                        .ok_or_else(|| Error::invalid_field("address"))
                })
                .transpose()?,
            city: address
                .city
                .map(|v| {
                    order::City::new(v)
                        .ok_or_else(|| Error::invalid_field("city"))
                })
                .transpose()?,
            region: address
                .region
                .map(|v| {
                    order::Region::new(v)
                        .ok_or_else(|| Error::invalid_field("region"))
                })
                .transpose()?,
            pincode: address
                .pincode
                .map(|v| {
                    order::Pincode::new(v)
                        .ok_or_else(|| Error::invalid_field("pincode"))
                })
                .transpose()?,
        },
        (None, None, Some(mobile)) => Patch::Mobile(
            order::Mobile::new(mobile)
                .ok_or_else(|| Error::invalid_field("mobile"))?,
        ),
        (None, None, None)
        | (Some(_), Some(_), _)
        | (Some(_), _, Some(_))
        | (_, Some(_), Some(_)) => {
            return Err(PatchError::Ambiguous.into());
        }
    };

    let updated = context
        .service()
        .execute(UpdateOrder { id, patch })
        .await
        .map_err(|e| e.into_error())?;

    Ok(Json(OrderBody::from(&updated)))
}

/// Parameters of the [`delete()`] handler.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct DeleteParams {
    /// Indicator whether to remove the order for good instead of moving it
    /// into the recycling bin.
    hard: bool,
}

/// Soft-deletes an [`Order`], or hard-deletes it from the recycling bin.
pub(super) async fn delete(
    context: Context,
    Path(id): Path<String>,
    Query(params): Query<DeleteParams>,
) -> Result<StatusCode, Error> {
    let id = order_id(id)?;

    if params.hard {
        context
            .service()
            .execute(HardDeleteOrder { id })
            .await
            .map_err(|e| e.into_error())?;
    } else {
        context
            .service()
            .execute(SoftDeleteOrder { id })
            .await
            .map_err(|e| e.into_error())?;
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Restores an [`Order`] out of the recycling bin.
pub(super) async fn restore(
    context: Context,
    Path(id): Path<String>,
) -> Result<StatusCode, Error> {
    let id = order_id(id)?;

    context
        .service()
        .execute(RestoreOrder { id })
        .await
        .map_err(|e| e.into_error())?;

    Ok(StatusCode::NO_CONTENT)
}

/// Body of a [`mark_delivered()`] request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DeliveredBody {
    /// IDs of the orders to mark.
    ids: Vec<String>,

    /// Delivery timestamp to stamp them with.
    delivered_at: String,
}

/// Wire shape of one bulk-delivery outcome.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct OutcomeBody {
    /// ID of the order.
    id: String,

    /// Indicator whether the order was marked as delivered.
    delivered: bool,

    /// Failure reason, if any.
    error: Option<String>,
}

impl From<&command::mark_orders_delivered::Outcome> for OutcomeBody {
    fn from(outcome: &command::mark_orders_delivered::Outcome) -> Self {
        Self {
            id: outcome.id.to_string(),
            delivered: outcome.is_delivered(),
            error: outcome.result.as_ref().err().map(ToString::to_string),
        }
    }
}

/// Marks the selected [`Order`]s as delivered, reporting an [`OutcomeBody`]
/// per order.
pub(super) async fn mark_delivered(
    context: Context,
    Json(body): Json<DeliveredBody>,
) -> Result<Json<Vec<OutcomeBody>>, Error> {
    let ids = body
        .ids
        .into_iter()
        .map(order_id)
        .collect::<Result<Vec<_>, _>>()?;
    let at = timestamp(&body.delivered_at, "deliveredAt")?;

    let outcomes = match context
        .service()
        .execute(MarkOrdersDelivered { ids, at })
        .await
    {
        Ok(outcomes) => outcomes,
        Err(never) => match never {},
    };

    Ok(Json(outcomes.iter().map(OutcomeBody::from).collect()))
}
