//! [`Store`] operations of the [`Http`] backend.

use common::operations::{By, Delete, Restore, Select, SoftDelete, Update};
use reqwest::Method;
use serde_json::json;
use tracerr::Traced;

use crate::{
    domain::{delivery, order, Order},
    infra::{store, store::Store},
    read::order::list,
};

use super::{wire, Error, Http};

/// Checks the `success` flag of a response envelope.
fn ensure(
    success: bool,
    error: Option<String>,
) -> Result<(), Traced<store::Error>> {
    if success {
        Ok(())
    } else {
        Err(tracerr::new!(store::Error::from(Error::Rejected(
            error.unwrap_or_else(|| "unspecified error".into()),
        ))))
    }
}

/// Validates a document id served by the remote.
fn doc_id(id: String) -> Result<order::Id, Traced<store::Error>> {
    order::Id::new(id).ok_or_else(|| {
        tracerr::new!(store::Error::from(Error::Rejected(
            "malformed document id".into(),
        )))
    })
}

impl Store<Select<By<list::Page, list::Selector>>> for Http {
    type Ok = list::Page;
    type Err = Traced<store::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<list::Page, list::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let list::Selector { book, size, after } = by.into_inner();

        let mut query = vec![
            ("book", book.to_string()),
            ("pageSize", size.to_string()),
        ];
        if let Some(after) = after {
            query.push(("lastDocId", after.id.to_string()));
            query.push(("lastTimestamp", after.created_at.to_rfc3339()));
        }

        let resp: wire::PageResponse = self
            .send(self.request(Method::GET, "/orders").query(&query))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> store::Error))?;
        ensure(resp.success, resp.error)?;

        let items = resp
            .data
            .into_iter()
            .map(Order::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                tracerr::new!(store::Error::from(Error::Invalid(e)))
            })?;

        let cursor = if let (Some(id), Some(created_at)) =
            (resp.last_doc_id, resp.last_timestamp)
        {
            Some(list::Cursor {
                id: doc_id(id)?,
                created_at,
            })
        } else {
            None
        };

        Ok(list::Page::new(items, cursor, resp.has_more))
    }
}

impl Store<Select<By<list::TotalCount, crate::domain::book::Id>>> for Http {
    type Ok = list::TotalCount;
    type Err = Traced<store::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<list::TotalCount, crate::domain::book::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let book = by.into_inner();

        let resp: wire::CountResponse = self
            .send(
                self.request(Method::GET, "/orders/count")
                    .query(&[("book", book.to_string())]),
            )
            .await
            .map_err(tracerr::map_from_and_wrap!(=> store::Error))?;
        ensure(resp.success, resp.error)?;

        Ok(resp.total_count.into())
    }
}

impl Store<Select<By<Option<Order>, order::Id>>> for Http {
    type Ok = Option<Order>;
    type Err = Traced<store::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Order>, order::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let resp: wire::DocResponse = self
            .send(self.request(Method::GET, &format!("/documents/{id}")))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> store::Error))?;
        ensure(resp.success, resp.error)?;

        resp.data.map(Order::try_from).transpose().map_err(|e| {
            tracerr::new!(store::Error::from(Error::Invalid(e)))
        })
    }
}

impl Store<Update<Order>> for Http {
    type Ok = ();
    type Err = Traced<store::Error>;

    async fn execute(
        &self,
        Update(order): Update<Order>,
    ) -> Result<Self::Ok, Self::Err> {
        let resp: wire::WriteResponse = self
            .send(
                self.request(
                    Method::PUT,
                    &format!("/documents/{}", order.id),
                )
                .json(&wire::OrderDoc::from(&order)),
            )
            .await
            .map_err(tracerr::map_from_and_wrap!(=> store::Error))?;

        ensure(resp.success, resp.error)
    }
}

impl Store<SoftDelete<By<Order, order::Id>>> for Http {
    type Ok = ();
    type Err = Traced<store::Error>;

    async fn execute(
        &self,
        SoftDelete(by): SoftDelete<By<Order, order::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let resp: wire::WriteResponse = self
            .send(
                self.request(Method::PATCH, &format!("/documents/{id}"))
                    .json(&json!({
                        "isDelete": true,
                        "deletedAt":
                            order::DeletionDateTime::now().to_rfc3339(),
                    })),
            )
            .await
            .map_err(tracerr::map_from_and_wrap!(=> store::Error))?;

        ensure(resp.success, resp.error)
    }
}

impl Store<Restore<By<Order, order::Id>>> for Http {
    type Ok = ();
    type Err = Traced<store::Error>;

    async fn execute(
        &self,
        Restore(by): Restore<By<Order, order::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let resp: wire::WriteResponse = self
            .send(
                self.request(Method::PATCH, &format!("/documents/{id}"))
                    .json(&json!({
                        "isDelete": false,
                        "deletedAt": null,
                    })),
            )
            .await
            .map_err(tracerr::map_from_and_wrap!(=> store::Error))?;

        ensure(resp.success, resp.error)
    }
}

impl Store<Delete<By<Order, order::Id>>> for Http {
    type Ok = ();
    type Err = Traced<store::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Order, order::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let resp: wire::WriteResponse = self
            .send(self.request(Method::DELETE, &format!("/documents/{id}")))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> store::Error))?;

        ensure(resp.success, resp.error)
    }
}

impl Store<Update<delivery::Confirmation>> for Http {
    type Ok = ();
    type Err = Traced<store::Error>;

    async fn execute(
        &self,
        Update(confirmation): Update<delivery::Confirmation>,
    ) -> Result<Self::Ok, Self::Err> {
        let delivery::Confirmation { order, at } = confirmation;

        let resp: wire::WriteResponse = self
            .send(
                self.request(Method::PATCH, &format!("/documents/{order}"))
                    .json(&json!({
                        "deliveredDate": at.to_rfc3339(),
                    })),
            )
            .await
            .map_err(tracerr::map_from_and_wrap!(=> store::Error))?;

        ensure(resp.success, resp.error)
    }
}

impl Store<Select<By<Vec<order::Id>, order::DeletionDateTime>>> for Http {
    type Ok = Vec<order::Id>;
    type Err = Traced<store::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<order::Id>, order::DeletionDateTime>>,
    ) -> Result<Self::Ok, Self::Err> {
        let before = by.into_inner();

        let resp: wire::IdsResponse = self
            .send(
                self.request(Method::GET, "/orders/deleted")
                    .query(&[("before", before.to_rfc3339())]),
            )
            .await
            .map_err(tracerr::map_from_and_wrap!(=> store::Error))?;
        ensure(resp.success, resp.error)?;

        resp.data.into_iter().map(doc_id).collect()
    }
}
