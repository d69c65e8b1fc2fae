//! Interactive browsing of paginated [`Order`] lists.

use std::convert::Infallible;

use common::{
    operations::{By, Select},
    pagination,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    command::{
        self, mark_orders_delivered::Outcome, Command, HardDeleteOrder,
        MarkOrdersDelivered, RestoreOrder, SoftDeleteOrder, UpdateOrder,
    },
    domain::{book, order, Order},
    infra::{store, Store},
    read::order::list,
    Service,
};

/// Interactive browser of a book's [`Order`] list.
///
/// Owns the paging state of one admin view: the current page, the forward
/// cursor, a cache of already visited pages, and the [`list::Filter`] its
/// visible subset is derived with. Every mutation goes through the remote
/// [`Store`] first and patches the local state only once the write is
/// confirmed, so the view stays consistent without refetching.
///
/// Pages are keyed by `(number, size)`: changing the page size starts a new
/// cursor chain and drops the whole cache. An uncached page is fetchable
/// only right after the highest cached one, since cursors are forward-only;
/// anything further is refused instead of being served from a mismatched
/// cursor.
///
/// `&mut self` on every state transition is what serializes the fetches: a
/// response can never be committed over the state of a newer request.
#[derive(Debug)]
pub struct Browser<Db> {
    /// [`Service`] executing the operations.
    service: Service<Db>,

    /// Book this [`Browser`] lists [`Order`]s of.
    book: book::Id,

    /// [`list::Filter`] deriving the visible subset.
    filter: list::Filter,

    /// Cache of already visited pages.
    cache: list::Cache,

    /// Cursor the next uncached page starts after.
    cursor: Option<list::Cursor>,

    /// [`Order`]s of the current page.
    items: Vec<Order>,

    /// Number of the current page.
    ///
    /// `0` until the first page is loaded.
    page: usize,

    /// Current page size.
    size: usize,

    /// Indicator whether the source has more [`Order`]s after the current
    /// page.
    has_more: bool,
}

impl<Db> Browser<Db> {
    /// Page size used until [`Browser::set_page_size()`] changes it.
    pub const DEFAULT_PAGE_SIZE: usize = 50;

    /// Creates a new [`Browser`] of the provided book's [`Order`]s.
    #[must_use]
    pub fn new(service: Service<Db>, book: book::Id) -> Self {
        Self {
            service,
            book,
            filter: list::Filter::default(),
            cache: list::Cache::new(),
            cursor: None,
            items: Vec::new(),
            page: 0,
            size: Self::DEFAULT_PAGE_SIZE,
            has_more: false,
        }
    }

    /// Returns the book this [`Browser`] lists [`Order`]s of.
    #[must_use]
    pub fn book(&self) -> &book::Id {
        &self.book
    }

    /// Returns all [`Order`]s of the current page.
    #[must_use]
    pub fn items(&self) -> &[Order] {
        &self.items
    }

    /// Returns the [`Order`]s of the current page passing the current
    /// [`list::Filter`], preserving their ordering.
    #[must_use]
    pub fn visible(&self) -> Vec<&Order> {
        self.filter.apply(&self.items)
    }

    /// Returns the number of the current page.
    ///
    /// `0` until the first page is loaded.
    #[must_use]
    pub fn page(&self) -> usize {
        self.page
    }

    /// Returns the current page size.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Indicates whether the source has more [`Order`]s after the current
    /// page.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Returns the tracked forward cursor: the one the page following the
    /// current one starts after.
    #[must_use]
    pub fn cursor(&self) -> Option<&list::Cursor> {
        self.cursor.as_ref()
    }

    /// Returns the current [`list::Filter`].
    #[must_use]
    pub fn filter(&self) -> &list::Filter {
        &self.filter
    }

    /// Returns the current [`list::Filter`] for modification.
    ///
    /// Filtering is applied to the loaded page only, so no refetch is
    /// required afterwards.
    #[must_use]
    pub fn filter_mut(&mut self) -> &mut list::Filter {
        &mut self.filter
    }

    /// Resets the current [`list::Filter`] to its defaults, keeping the
    /// [`list::Scope`] intact.
    pub fn reset_filter(&mut self) {
        self.filter = list::Filter {
            scope: self.filter.scope,
            ..list::Filter::default()
        };
    }

    /// Loads the provided page, serving it from the cache when it was
    /// already visited.
    ///
    /// # Errors
    ///
    /// - [`LoadError::NoSuchPage`] if the page number is `0` or past the end
    ///   of the list.
    /// - [`LoadError::BeyondFrontier`] if the page is uncached and not the
    ///   one right after the highest cached page.
    /// - [`LoadError::Store`] if the fetch itself fails. The cache, cursor
    ///   and current items are left untouched in this case.
    pub async fn load_page(
        &mut self,
        number: usize,
    ) -> Result<(), Traced<LoadError>>
    where
        Db: Store<
            Select<By<list::Page, list::Selector>>,
            Ok = list::Page,
            Err = Traced<store::Error>,
        >,
    {
        use LoadError as E;

        if number == 0 {
            return Err(tracerr::new!(E::NoSuchPage(number)));
        }

        let key = pagination::Key {
            number,
            size: self.size,
        };
        if let Some(cached) = self.cache.get(key) {
            self.items = cached.items.clone();
            self.cursor = cached.cursor.clone();
            self.has_more = cached.has_more;
            self.page = number;
            return Ok(());
        }

        let after = if number == 1 {
            None
        } else {
            // The cursor a page starts after always comes from the previous
            // page's cache entry, never from whatever cursor the last
            // navigation happened to leave behind.
            let prev = self
                .cache
                .get(pagination::Key {
                    number: number - 1,
                    size: self.size,
                })
                .ok_or_else(|| {
                    tracerr::new!(E::BeyondFrontier {
                        requested: number,
                        frontier: self
                            .cache
                            .frontier(self.size)
                            .unwrap_or(0),
                    })
                })?;
            if !prev.has_more {
                return Err(tracerr::new!(E::NoSuchPage(number)));
            }
            Some(
                prev.cursor
                    .clone()
                    .ok_or_else(|| tracerr::new!(E::NoSuchPage(number)))?,
            )
        };

        let page = self
            .service
            .store()
            .execute(Select(By::<list::Page, _>::new(list::Selector {
                book: self.book.clone(),
                size: self.size,
                after,
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        self.cursor = page.cursor.clone();
        self.has_more = page.has_more;
        self.items = page.items.clone();
        self.cache.insert(key, page);
        self.page = number;

        Ok(())
    }

    /// Loads the page following the current one.
    ///
    /// # Errors
    ///
    /// Same as [`Browser::load_page()`].
    pub async fn next_page(&mut self) -> Result<(), Traced<LoadError>>
    where
        Db: Store<
            Select<By<list::Page, list::Selector>>,
            Ok = list::Page,
            Err = Traced<store::Error>,
        >,
    {
        self.load_page(self.page + 1).await
    }

    /// Loads the page preceding the current one.
    ///
    /// # Errors
    ///
    /// Same as [`Browser::load_page()`].
    pub async fn prev_page(&mut self) -> Result<(), Traced<LoadError>>
    where
        Db: Store<
            Select<By<list::Page, list::Selector>>,
            Ok = list::Page,
            Err = Traced<store::Error>,
        >,
    {
        if self.page <= 1 {
            return Err(tracerr::new!(LoadError::NoSuchPage(0)));
        }
        self.load_page(self.page - 1).await
    }

    /// Changes the page size, dropping the whole page cache and the tracked
    /// cursor, and loads the first page of the new chain.
    ///
    /// # Errors
    ///
    /// - [`LoadError::InvalidPageSize`] if the provided size is `0`.
    /// - Same as [`Browser::load_page()`] otherwise.
    pub async fn set_page_size(
        &mut self,
        size: usize,
    ) -> Result<(), Traced<LoadError>>
    where
        Db: Store<
            Select<By<list::Page, list::Selector>>,
            Ok = list::Page,
            Err = Traced<store::Error>,
        >,
    {
        if size == 0 {
            return Err(tracerr::new!(LoadError::InvalidPageSize));
        }

        self.discard();
        self.size = size;
        self.load_page(1).await
    }

    /// Drops all local state and refetches the first page.
    ///
    /// # Errors
    ///
    /// Same as [`Browser::load_page()`].
    pub async fn reload(&mut self) -> Result<(), Traced<LoadError>>
    where
        Db: Store<
            Select<By<list::Page, list::Selector>>,
            Ok = list::Page,
            Err = Traced<store::Error>,
        >,
    {
        self.discard();
        self.load_page(1).await
    }

    /// Queries the total count of [`Order`]s in the browsed book.
    ///
    /// # Errors
    ///
    /// Errors if the [`Store`] fails.
    pub async fn total(
        &self,
    ) -> Result<list::TotalCount, Traced<store::Error>>
    where
        Db: Store<
            Select<By<list::TotalCount, book::Id>>,
            Ok = list::TotalCount,
            Err = Traced<store::Error>,
        >,
    {
        self.service
            .store()
            .execute(Select(By::<list::TotalCount, _>::new(
                self.book.clone(),
            )))
            .await
            .map_err(tracerr::wrap!())
    }

    /// Soft-deletes the provided [`Order`] and removes it from the current
    /// page and its cache entry.
    ///
    /// # Errors
    ///
    /// Errors if the remote write fails; local state is untouched then.
    pub async fn soft_delete(
        &mut self,
        id: &order::Id,
    ) -> Result<(), Traced<command::soft_delete_order::ExecutionError>>
    where
        Service<Db>: Command<
            SoftDeleteOrder,
            Ok = (),
            Err = Traced<command::soft_delete_order::ExecutionError>,
        >,
    {
        self.service
            .execute(SoftDeleteOrder { id: id.clone() })
            .await
            .map_err(tracerr::wrap!())?;
        self.remove_locally(id);
        Ok(())
    }

    /// Restores the provided [`Order`] and removes it from the current page
    /// and its cache entry (the recycling bin is the view restoring happens
    /// from).
    ///
    /// # Errors
    ///
    /// Errors if the remote write fails; local state is untouched then.
    pub async fn restore(
        &mut self,
        id: &order::Id,
    ) -> Result<(), Traced<command::restore_order::ExecutionError>>
    where
        Service<Db>: Command<
            RestoreOrder,
            Ok = (),
            Err = Traced<command::restore_order::ExecutionError>,
        >,
    {
        self.service
            .execute(RestoreOrder { id: id.clone() })
            .await
            .map_err(tracerr::wrap!())?;
        self.remove_locally(id);
        Ok(())
    }

    /// Hard-deletes the provided [`Order`] and removes it from the current
    /// page and its cache entry.
    ///
    /// # Errors
    ///
    /// Errors if the remote write fails (including the [`Order`] not being
    /// soft-deleted); local state is untouched then.
    pub async fn hard_delete(
        &mut self,
        id: &order::Id,
    ) -> Result<(), Traced<command::hard_delete_order::ExecutionError>>
    where
        Service<Db>: Command<
            HardDeleteOrder,
            Ok = (),
            Err = Traced<command::hard_delete_order::ExecutionError>,
        >,
    {
        self.service
            .execute(HardDeleteOrder { id: id.clone() })
            .await
            .map_err(tracerr::wrap!())?;
        self.remove_locally(id);
        Ok(())
    }

    /// Updates an [`Order`] and patches it in the current page and its cache
    /// entry, re-sorting the page by creation time descending, as an edit
    /// can change the displayed ordering.
    ///
    /// # Errors
    ///
    /// Errors if the remote write fails; local state is untouched then.
    pub async fn update(
        &mut self,
        cmd: UpdateOrder,
    ) -> Result<Order, Traced<command::update_order::ExecutionError>>
    where
        Service<Db>: Command<
            UpdateOrder,
            Ok = Order,
            Err = Traced<command::update_order::ExecutionError>,
        >,
    {
        let updated = self
            .service
            .execute(cmd)
            .await
            .map_err(tracerr::wrap!())?;

        if let Some(item) =
            self.items.iter_mut().find(|o| o.id == updated.id)
        {
            *item = updated.clone();
        }
        self.items
            .sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let key = self.key();
        if let Some(entry) = self.cache.get_mut(key) {
            if let Some(item) =
                entry.items.iter_mut().find(|o| o.id == updated.id)
            {
                *item = updated.clone();
            }
        }

        Ok(updated)
    }

    /// Marks the provided [`Order`]s as delivered on the provided date,
    /// merging the stamp into the current page and its cache entry for every
    /// confirmed [`Outcome`].
    ///
    /// Cache entries of other pages are left untouched. Failed outcomes are
    /// reported back per [`Order`] and leave their records unchanged.
    pub async fn mark_delivered(
        &mut self,
        ids: Vec<order::Id>,
        at: order::DeliveryDateTime,
    ) -> Vec<Outcome>
    where
        Service<Db>:
            Command<MarkOrdersDelivered, Ok = Vec<Outcome>, Err = Infallible>,
    {
        let outcomes = match self
            .service
            .execute(MarkOrdersDelivered { ids, at })
            .await
        {
            Ok(outcomes) => outcomes,
            Err(never) => match never {},
        };

        for outcome in &outcomes {
            if outcome.is_delivered() {
                self.set_delivered(&outcome.id, at);
            }
        }

        outcomes
    }

    /// Key of the current page in the cache.
    fn key(&self) -> pagination::Key {
        pagination::Key {
            number: self.page,
            size: self.size,
        }
    }

    /// Removes the provided [`Order`] from the current page and its cache
    /// entry, keeping the entry's cursor and `has_more` intact.
    fn remove_locally(&mut self, id: &order::Id) {
        self.items.retain(|o| o.id != *id);
        let key = self.key();
        if let Some(entry) = self.cache.get_mut(key) {
            entry.items.retain(|o| o.id != *id);
        }
    }

    /// Stamps the provided [`Order`] as delivered in the current page and
    /// its cache entry.
    fn set_delivered(&mut self, id: &order::Id, at: order::DeliveryDateTime) {
        if let Some(item) = self.items.iter_mut().find(|o| o.id == *id) {
            item.delivered_at = Some(at);
        }
        let key = self.key();
        if let Some(entry) = self.cache.get_mut(key) {
            if let Some(item) = entry.items.iter_mut().find(|o| o.id == *id)
            {
                item.delivered_at = Some(at);
            }
        }
    }

    /// Drops the cache, the cursor and the current page.
    fn discard(&mut self) {
        self.cache.clear();
        self.cursor = None;
        self.items.clear();
        self.page = 0;
        self.has_more = false;
    }
}

/// Error of loading a page in a [`Browser`].
#[derive(Debug, Display, Error, From)]
pub enum LoadError {
    /// [`Store`] error.
    #[display("`Store` operation failed: {_0}")]
    Store(store::Error),

    /// Requested page cannot be reached with the cached cursor chain.
    ///
    /// Cursors are forward-only: an uncached page is fetchable only right
    /// after the highest cached one.
    #[display("page {requested} is not reachable yet (frontier is \
               {frontier})")]
    #[from(ignore)]
    BeyondFrontier {
        /// Requested page number.
        requested: usize,

        /// Highest cached page number.
        frontier: usize,
    },

    /// Requested page does not exist.
    #[display("page {_0} does not exist")]
    #[from(ignore)]
    NoSuchPage(#[error(not(source))] usize),

    /// Provided page size is not usable.
    #[display("page size must be positive")]
    InvalidPageSize,
}
