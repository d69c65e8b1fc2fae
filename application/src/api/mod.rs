//! Admin REST API definitions.

pub mod orders;
pub mod reports;

use axum::{
    routing::{get, post},
    Router,
};

use crate::define_error;

/// Builds the [`Router`] of the admin API.
#[must_use]
pub fn router() -> Router {
    Router::new()
        .route("/api/books/:book/orders", get(orders::list))
        .route("/api/books/:book/orders/count", get(orders::count))
        .route("/api/books/:book/orders/report", post(reports::orders))
        .route("/api/books/:book/orders/labels", post(reports::labels))
        .route("/api/orders/delivered", post(orders::mark_delivered))
        .route(
            "/api/orders/:id",
            get(orders::find)
                .patch(orders::update)
                .delete(orders::delete),
        )
        .route("/api/orders/:id/restore", post(orders::restore))
}

define_error! {
    enum PatchError {
        #[code = "AMBIGUOUS_PATCH"]
        #[status = BAD_REQUEST]
        #[message = "Exactly one field group must be provided"]
        Ambiguous,
    }
}

define_error! {
    enum ExportError {
        #[code = "EXPORT_TOO_LARGE"]
        #[status = PAYLOAD_TOO_LARGE]
        #[message = "Too many orders to export in one go"]
        TooLarge,
    }
}
