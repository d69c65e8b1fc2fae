//! Export report API handlers.
//!
//! The spreadsheet/PDF documents themselves are rendered on the consumer
//! side; these handlers serve the row and label data for them, derived from
//! the filtered record set with no further store writes.

use axum::{extract::Path, Json};
use common::{DateTime, DateTimeOf};
use serde::{Deserialize, Serialize};
use service::{
    domain::{book, delivery, order, Order},
    query::{self, report},
    read::order::list,
    Query as _,
};

use crate::{AsError as _, Context, Error};

use super::ExportError;

/// Page size the export fetches the record set with.
const FETCH_PAGE_SIZE: usize = 500;

/// Hard cap on the pages fetched per export.
const MAX_FETCH_PAGES: usize = 200;

/// Scope selector of a [`FilterBody`].
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) enum ScopeBody {
    /// Regular views.
    #[default]
    Active,

    /// Recycling bin.
    Bin,
}

/// Delivery status selector of a [`FilterBody`].
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) enum StatusBody {
    /// Any status passes.
    #[default]
    All,

    /// Only delivered orders pass.
    Delivered,

    /// Only not yet delivered orders pass.
    NotDelivered,
}

/// Mode of a [`TextBody`] matcher.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) enum ModeBody {
    /// A field passes if any of the values occurs in it.
    #[default]
    Include,

    /// A field passes if none of the values occurs in it.
    Exclude,
}

/// Multi-value text matcher of a [`FilterBody`].
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(super) struct TextBody {
    /// Comma-separated values to match.
    values: String,

    /// Mode to match in.
    mode: ModeBody,
}

/// Wire shape of the filter an export is derived with.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(super) struct FilterBody {
    /// Scope of the list.
    scope: ScopeBody,

    /// Delivery selector: `all`, `unassigned`, or a delivery type marker.
    delivery_type: String,

    /// Delivery status selector.
    delivery_status: StatusBody,

    /// Minimum total copies (inclusive).
    min_copies: Option<u32>,

    /// Maximum total copies (inclusive).
    max_copies: Option<u32>,

    /// Recipient name matcher.
    name: Option<TextBody>,

    /// City matcher.
    city: Option<TextBody>,

    /// Region matcher.
    region: Option<TextBody>,

    /// Pincode matcher.
    pincode: Option<TextBody>,

    /// Mobile number matcher.
    mobile: Option<TextBody>,

    /// Creation date the passing orders start at.
    date_from: Option<String>,

    /// Creation date the passing orders end at.
    date_to: Option<String>,

    /// Threshold registration id.
    after_order_id: Option<String>,
}

impl TryFrom<FilterBody> for list::Filter {
    type Error = Error;

    fn try_from(body: FilterBody) -> Result<Self, Self::Error> {
        let text = |t: Option<TextBody>| {
            t.map_or_else(list::Text::default, |t| list::Text {
                values: t.values,
                mode: match t.mode {
                    ModeBody::Include => list::Mode::Include,
                    ModeBody::Exclude => list::Mode::Exclude,
                },
            })
        };
        let date = |v: Option<String>, field| {
            v.map(|v| {
                DateTime::from_rfc3339(&v)
                    .map_err(|_| Error::invalid_field(field))
            })
            .transpose()
        };

        Ok(Self {
            scope: match body.scope {
                ScopeBody::Active => list::Scope::Active,
                ScopeBody::Bin => list::Scope::Bin,
            },
            delivery: match body.delivery_type.as_str() {
                "" | "all" => list::Delivery::All,
                "unassigned" => list::Delivery::Unassigned,
                other => list::Delivery::Kind(other.parse().map_err(
                    |_| Error::invalid_field("deliveryType"),
                )?),
            },
            status: match body.delivery_status {
                StatusBody::All => list::Status::All,
                StatusBody::Delivered => list::Status::Delivered,
                StatusBody::NotDelivered => list::Status::NotDelivered,
            },
            min_copies: body.min_copies,
            max_copies: body.max_copies,
            name: text(body.name),
            city: text(body.city),
            region: text(body.region),
            pincode: text(body.pincode),
            mobile: text(body.mobile),
            from: date(body.date_from, "dateFrom")?,
            to: date(body.date_to, "dateTo")?,
            after: body
                .after_order_id
                .map(|v| {
                    order::RegistrationId::new(v).ok_or_else(|| {
                        Error::invalid_field("afterOrderId")
                    })
                })
                .transpose()?,
        })
    }
}

/// Fetches the whole record set of a book, page by page.
async fn fetch_all(
    context: &Context,
    book: book::Id,
) -> Result<Vec<Order>, Error> {
    let mut all = Vec::new();
    let mut after = None;

    for _ in 0..MAX_FETCH_PAGES {
        let page = context
            .service()
            .execute(query::orders::List::by(list::Selector {
                book: book.clone(),
                size: FETCH_PAGE_SIZE,
                after: after.clone(),
            }))
            .await
            .map_err(|e| e.into_error())?;

        after = page.cursor.clone();
        let done = !page.has_more || page.items.is_empty();
        all.extend(page.items);
        if done {
            return Ok(all);
        }
    }

    Err(ExportError::TooLarge.into())
}

/// Derives the filtered record set an export works on.
async fn filtered(
    context: &Context,
    book: String,
    body: FilterBody,
) -> Result<Vec<Order>, Error> {
    let book = book::Id::new(book)
        .ok_or_else(|| Error::invalid_field("book"))?;
    let filter = list::Filter::try_from(body)?;

    let all = fetch_all(context, book).await?;
    Ok(filter.apply(&all).into_iter().cloned().collect())
}

/// Wire shape of one spreadsheet report row.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RowBody {
    /// Registration id of the order.
    registration_id: String,

    /// Full recipient name.
    recipient: String,

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

    /// Assigned delivery type.
    delivery_type: Option<delivery::Kind>,

    /// Assigned tracking id.
    tracking_id: Option<String>,

    /// Delivery timestamp.
    delivered_at: Option<String>,

    /// Creation timestamp.
    created_at: String,
}

impl From<&report::orders::Row> for RowBody {
    fn from(row: &report::orders::Row) -> Self {
        Self {
            registration_id: row.registration.to_string(),
            recipient: row.recipient.clone(),
            mobile: row.mobile.to_string(),
            city: row.city.as_ref().map(ToString::to_string),
            region: row.region.as_ref().map(ToString::to_string),
            pincode: row.pincode.as_ref().map(ToString::to_string),
            address: row.address.as_ref().map(ToString::to_string),
            copies: row.copies,
            delivery_type: row.delivery_kind,
            tracking_id: row.tracking_id.as_ref().map(ToString::to_string),
            delivered_at: row
                .delivered_at
                .as_ref()
                .map(DateTimeOf::to_rfc3339),
            created_at: row.created_at.to_rfc3339(),
        }
    }
}

/// Wire shape of a spreadsheet report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ReportBody {
    /// Rows of the report.
    rows: Vec<RowBody>,
}

/// Serves the spreadsheet export rows of a book's filtered orders.
pub(super) async fn orders(
    context: Context,
    Path(book): Path<String>,
    Json(body): Json<FilterBody>,
) -> Result<Json<ReportBody>, Error> {
    let records = filtered(&context, book, body).await?;

    let output = match context
        .service()
        .execute(report::Orders { records })
        .await
    {
        Ok(output) => output,
        Err(never) => match never {},
    };

    Ok(Json(ReportBody {
        rows: output.rows.iter().map(RowBody::from).collect(),
    }))
}

/// Wire shape of one shipping label.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct LabelBody {
    /// Registration id of the order.
    registration_id: String,

    /// Full recipient name.
    recipient: String,

    /// Recipient mobile number.
    mobile: String,

    /// Address block, one printable line per entry.
    address_lines: Vec<String>,

    /// Total requested copies.
    copies: u32,
}

impl From<&report::labels::Label> for LabelBody {
    fn from(label: &report::labels::Label) -> Self {
        Self {
            registration_id: label.registration.to_string(),
            recipient: label.recipient.clone(),
            mobile: label.mobile.to_string(),
            address_lines: label.address_lines.clone(),
            copies: label.copies,
        }
    }
}

/// Wire shape of a shipping label export.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct LabelsBody {
    /// Printable labels.
    labels: Vec<LabelBody>,

    /// IDs of the orders skipped for having no printable address.
    skipped: Vec<String>,
}

/// Serves the shipping label data of a book's filtered orders.
pub(super) async fn labels(
    context: Context,
    Path(book): Path<String>,
    Json(body): Json<FilterBody>,
) -> Result<Json<LabelsBody>, Error> {
    let records = filtered(&context, book, body).await?;

    let output = match context
        .service()
        .execute(report::Labels { records })
        .await
    {
        Ok(output) => output,
        Err(never) => match never {},
    };

    Ok(Json(LabelsBody {
        labels: output.labels.iter().map(LabelBody::from).collect(),
        skipped: output
            .skipped
            .iter()
            .map(ToString::to_string)
            .collect(),
    }))
}
