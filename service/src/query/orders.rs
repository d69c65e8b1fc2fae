//! [`Query`] collection related to the multiple [`Order`]s.
//!
//! [`Order`]: crate::domain::Order

use common::operations::By;

use crate::{domain::book, read};
#[cfg(doc)]
use crate::{domain::Order, Query};

use super::StoreQuery;

/// Queries a page of [`Order`]s.
pub type List = StoreQuery<
    By<read::order::list::Page, read::order::list::Selector>,
>;

/// Queries total count of [`Order`]s in a book.
pub type TotalCount =
    StoreQuery<By<read::order::list::TotalCount, book::Id>>;
