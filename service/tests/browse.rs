//! [`Browser`] behavior against an in-memory store double.

#![cfg(feature = "http")]

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use common::{
    operations::{By, Delete, Restore, Select, SoftDelete, Update},
    DateTimeOf,
};
use service::{
    browse::{Browser, LoadError},
    command::{update_order::Patch, UpdateOrder},
    domain::{book, delivery, order, Order},
    infra::store::{self, Store},
    read::order::list,
    Config, Service,
};
use tracerr::Traced;

fn book() -> book::Id {
    book::Id::new("prayers").unwrap()
}

fn sample(i: usize) -> Order {
    Order {
        id: order::Id::new(format!("doc-{i:03}")).unwrap(),
        book: book(),
        registration: order::RegistrationId::new(format!("AP-{}", 5000 - i))
            .unwrap(),
        name: order::Name::new("Asha").unwrap(),
        surname: order::Surname::new("Patel"),
        mobile: order::Mobile::new("9876543210").unwrap(),
        city: order::City::new("Anand"),
        region: order::Region::new("Gujarat"),
        pincode: order::Pincode::new("388120"),
        address: order::Address::new("12 Station Road"),
        copies: order::Copies::Single(1 + (i % 3) as u32),
        delivery_kind: None,
        tracking_id: None,
        delivered_at: None,
        // Seeded newest first, exactly as the remote serves them.
        created_at: DateTimeOf::from_unix_timestamp(1_700_000_000 - i as i64)
            .unwrap(),
        deleted_at: None,
    }
}

#[derive(Debug, Default)]
struct State {
    orders: Vec<Order>,
    page_calls: usize,
    selectors: Vec<list::Selector>,
    failing: bool,
}

/// In-memory [`Store`] double with call accounting.
#[derive(Clone, Debug, Default)]
struct MockStore {
    state: Arc<Mutex<State>>,
}

impl MockStore {
    fn seed(count: usize) -> (Self, Vec<Order>) {
        let orders = (0..count).map(sample).collect::<Vec<_>>();
        let store = Self {
            state: Arc::new(Mutex::new(State {
                orders: orders.clone(),
                ..State::default()
            })),
        };
        (store, orders)
    }

    fn page_calls(&self) -> usize {
        self.state.lock().unwrap().page_calls
    }

    fn selectors(&self) -> Vec<list::Selector> {
        self.state.lock().unwrap().selectors.clone()
    }

    fn set_failing(&self, failing: bool) {
        self.state.lock().unwrap().failing = failing;
    }

    fn order(&self, id: &order::Id) -> Option<Order> {
        self.state
            .lock()
            .unwrap()
            .orders
            .iter()
            .find(|o| o.id == *id)
            .cloned()
    }
}

fn fail() -> Traced<store::Error> {
    tracerr::new!(store::Error::from(store::http::Error::Rejected(
        "injected failure".into(),
    )))
}

impl Store<Select<By<list::Page, list::Selector>>> for MockStore {
    type Ok = list::Page;
    type Err = Traced<store::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<list::Page, list::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let selector = by.into_inner();

        let mut state = self.state.lock().unwrap();
        if state.failing {
            return Err(fail());
        }
        state.page_calls += 1;
        state.selectors.push(selector.clone());

        let list::Selector { book, size, after } = selector;
        let all = state
            .orders
            .iter()
            .filter(|o| o.book == book)
            .cloned()
            .collect::<Vec<_>>();
        let start = match after {
            Some(cursor) => all
                .iter()
                .position(|o| o.id == cursor.id)
                .map_or(all.len(), |i| i + 1),
            None => 0,
        };

        let items = all
            .iter()
            .skip(start)
            .take(size)
            .cloned()
            .collect::<Vec<_>>();
        let has_more = start + items.len() < all.len();
        let cursor = items.last().map(|o| list::Cursor {
            id: o.id.clone(),
            created_at: o.created_at,
        });

        Ok(list::Page::new(items, cursor, has_more))
    }
}

impl Store<Select<By<list::TotalCount, book::Id>>> for MockStore {
    type Ok = list::TotalCount;
    type Err = Traced<store::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<list::TotalCount, book::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let book = by.into_inner();
        let count = self
            .state
            .lock()
            .unwrap()
            .orders
            .iter()
            .filter(|o| o.book == book)
            .count();
        Ok(i64::try_from(count).unwrap().into())
    }
}

impl Store<Select<By<Option<Order>, order::Id>>> for MockStore {
    type Ok = Option<Order>;
    type Err = Traced<store::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Order>, order::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        let state = self.state.lock().unwrap();
        if state.failing {
            return Err(fail());
        }
        Ok(state.orders.iter().find(|o| o.id == id).cloned())
    }
}

impl Store<Update<Order>> for MockStore {
    type Ok = ();
    type Err = Traced<store::Error>;

    async fn execute(
        &self,
        Update(order): Update<Order>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state.lock().unwrap();
        if state.failing {
            return Err(fail());
        }
        let existing = state
            .orders
            .iter_mut()
            .find(|o| o.id == order.id)
            .ok_or_else(fail)?;
        *existing = order;
        Ok(())
    }
}

impl Store<SoftDelete<By<Order, order::Id>>> for MockStore {
    type Ok = ();
    type Err = Traced<store::Error>;

    async fn execute(
        &self,
        SoftDelete(by): SoftDelete<By<Order, order::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        let mut state = self.state.lock().unwrap();
        if state.failing {
            return Err(fail());
        }
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(fail)?;
        order.deleted_at = Some(DateTimeOf::now());
        Ok(())
    }
}

impl Store<Restore<By<Order, order::Id>>> for MockStore {
    type Ok = ();
    type Err = Traced<store::Error>;

    async fn execute(
        &self,
        Restore(by): Restore<By<Order, order::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        let mut state = self.state.lock().unwrap();
        if state.failing {
            return Err(fail());
        }
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(fail)?;
        order.deleted_at = None;
        Ok(())
    }
}

impl Store<Delete<By<Order, order::Id>>> for MockStore {
    type Ok = ();
    type Err = Traced<store::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Order, order::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        let mut state = self.state.lock().unwrap();
        if state.failing {
            return Err(fail());
        }
        let position = state
            .orders
            .iter()
            .position(|o| o.id == id)
            .ok_or_else(fail)?;
        drop(state.orders.remove(position));
        Ok(())
    }
}

impl Store<Update<delivery::Confirmation>> for MockStore {
    type Ok = ();
    type Err = Traced<store::Error>;

    async fn execute(
        &self,
        Update(confirmation): Update<delivery::Confirmation>,
    ) -> Result<Self::Ok, Self::Err> {
        let delivery::Confirmation { order: id, at } = confirmation;
        let mut state = self.state.lock().unwrap();
        if state.failing {
            return Err(fail());
        }
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(fail)?;
        order.delivered_at = Some(at);
        Ok(())
    }
}

impl Store<Select<By<Vec<order::Id>, order::DeletionDateTime>>>
    for MockStore
{
    type Ok = Vec<order::Id>;
    type Err = Traced<store::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<order::Id>, order::DeletionDateTime>>,
    ) -> Result<Self::Ok, Self::Err> {
        let before = by.into_inner();
        Ok(self
            .state
            .lock()
            .unwrap()
            .orders
            .iter()
            .filter(|o| o.deleted_at.is_some_and(|at| at < before))
            .map(|o| o.id.clone())
            .collect())
    }
}

fn setup(count: usize) -> (MockStore, Vec<Order>, Browser<MockStore>) {
    let (store, orders) = MockStore::seed(count);
    let config = Config {
        purge_deleted_orders: service::task::purge_deleted_orders::Config {
            interval: Duration::from_secs(60 * 60),
            timeout: Duration::from_secs(60 * 60 * 24 * 30),
        },
    };
    let (service, _background) = Service::new(config, store.clone());
    let browser = Browser::new(service, book());
    (store, orders, browser)
}

#[tokio::test]
async fn serves_revisited_pages_from_cache() {
    let (store, orders, mut browser) = setup(120);

    browser.load_page(1).await.unwrap();
    let first = browser.items().to_vec();
    assert_eq!(first, &orders[..50]);
    assert!(browser.has_more());
    assert_eq!(store.page_calls(), 1);

    browser.load_page(2).await.unwrap();
    assert_eq!(browser.items(), &orders[50..100]);
    assert_eq!(store.page_calls(), 2);

    // Going back must not touch the network and must serve the identical
    // record set.
    browser.load_page(1).await.unwrap();
    assert_eq!(browser.items(), first);
    assert_eq!(store.page_calls(), 2);
}

#[tokio::test]
async fn page_requests_carry_the_previous_cursor() {
    let (store, orders, mut browser) = setup(120);

    browser.load_page(1).await.unwrap();
    assert_eq!(browser.cursor().unwrap().id, orders[49].id);

    browser.load_page(2).await.unwrap();

    let selectors = store.selectors();
    assert_eq!(selectors.len(), 2);
    assert_eq!(selectors[0].after, None);
    assert_eq!(selectors[0].size, 50);
    let after = selectors[1].after.clone().unwrap();
    assert_eq!(after.id, orders[49].id);
    assert_eq!(after.created_at, orders[49].created_at);
}

#[tokio::test]
async fn changing_page_size_invalidates_the_cache() {
    let (store, orders, mut browser) = setup(120);

    browser.load_page(1).await.unwrap();
    assert_eq!(store.page_calls(), 1);

    browser.set_page_size(25).await.unwrap();
    assert_eq!(browser.page(), 1);
    assert_eq!(browser.items(), &orders[..25]);
    assert_eq!(store.page_calls(), 2);
    assert_eq!(store.selectors()[1].size, 25);
    assert_eq!(store.selectors()[1].after, None);

    // Page 1 of the old chain is gone: switching back refetches.
    browser.set_page_size(50).await.unwrap();
    assert_eq!(store.page_calls(), 3);

    // While the fresh chain is served from cache again.
    browser.load_page(1).await.unwrap();
    assert_eq!(store.page_calls(), 3);
}

#[tokio::test]
async fn refuses_pages_beyond_the_cursor_frontier() {
    let (store, _orders, mut browser) = setup(120);

    let err = browser.load_page(3).await.unwrap_err();
    assert!(matches!(
        err.as_ref(),
        LoadError::BeyondFrontier {
            requested: 3,
            frontier: 0,
        },
    ));
    assert_eq!(store.page_calls(), 0);

    browser.load_page(1).await.unwrap();
    let err = browser.load_page(3).await.unwrap_err();
    assert!(matches!(
        err.as_ref(),
        LoadError::BeyondFrontier {
            requested: 3,
            frontier: 1,
        },
    ));
    assert_eq!(store.page_calls(), 1);
}

#[tokio::test]
async fn refuses_pages_past_the_end() {
    let (store, _orders, mut browser) = setup(30);

    let err = browser.load_page(0).await.unwrap_err();
    assert!(matches!(err.as_ref(), LoadError::NoSuchPage(0)));

    browser.load_page(1).await.unwrap();
    assert!(!browser.has_more());

    let err = browser.next_page().await.unwrap_err();
    assert!(matches!(err.as_ref(), LoadError::NoSuchPage(2)));
    assert_eq!(store.page_calls(), 1);
}

#[tokio::test]
async fn soft_deletion_patches_page_and_cache_without_refetch() {
    let (store, _orders, mut browser) = setup(120);

    browser.load_page(1).await.unwrap();
    let victim = browser.items()[3].clone();

    browser.soft_delete(&victim.id).await.unwrap();

    assert_eq!(browser.items().len(), 49);
    assert!(browser.items().iter().all(|o| o.id != victim.id));
    assert!(store.order(&victim.id).unwrap().is_deleted());

    // The cached entry was patched in place, so revisiting the page serves
    // the removal without a network call.
    browser.load_page(1).await.unwrap();
    assert_eq!(store.page_calls(), 1);
    assert!(browser.items().iter().all(|o| o.id != victim.id));
}

#[tokio::test]
async fn failed_write_leaves_local_state_untouched() {
    let (store, orders, mut browser) = setup(120);

    browser.load_page(1).await.unwrap();
    let victim = browser.items()[0].clone();

    store.set_failing(true);
    assert!(browser.soft_delete(&victim.id).await.is_err());
    store.set_failing(false);

    assert_eq!(browser.items(), &orders[..50]);
    assert!(!store.order(&victim.id).unwrap().is_deleted());
}

#[tokio::test]
async fn restoring_removes_from_the_bin_view() {
    let (store, _orders, mut browser) = setup(40);

    browser.load_page(1).await.unwrap();
    let deleted = browser.items()[5].clone();
    browser.soft_delete(&deleted.id).await.unwrap();

    // A recycling bin view over the same store.
    let config = Config {
        purge_deleted_orders: service::task::purge_deleted_orders::Config {
            interval: Duration::from_secs(60 * 60),
            timeout: Duration::from_secs(60 * 60 * 24 * 30),
        },
    };
    let (bin_service, _background) = Service::new(config, store.clone());
    let mut bin = Browser::new(bin_service, book());
    bin.filter_mut().scope = list::Scope::Bin;

    bin.load_page(1).await.unwrap();
    let shown = bin.visible();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].id, deleted.id);

    bin.restore(&deleted.id).await.unwrap();
    assert!(bin.visible().is_empty());
    assert!(bin.items().iter().all(|o| o.id != deleted.id));
    assert!(!store.order(&deleted.id).unwrap().is_deleted());
}

#[tokio::test]
async fn update_patches_and_resorts_the_page() {
    let (store, _orders, mut browser) = setup(120);

    browser.load_page(1).await.unwrap();
    let target = browser.items()[10].clone();

    let new_mobile = order::Mobile::new("1112223334").unwrap();
    let updated = browser
        .update(UpdateOrder {
            id: target.id.clone(),
            patch: Patch::Mobile(new_mobile.clone()),
        })
        .await
        .unwrap();
    assert_eq!(updated.mobile, new_mobile);

    let shown = browser
        .items()
        .iter()
        .find(|o| o.id == target.id)
        .unwrap()
        .clone();
    assert_eq!(shown.mobile, new_mobile);
    assert_eq!(store.order(&target.id).unwrap().mobile, new_mobile);

    // Still sorted by creation time descending after the in-place patch.
    let times = browser
        .items()
        .iter()
        .map(|o| o.created_at)
        .collect::<Vec<_>>();
    let mut sorted = times.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(times, sorted);

    // Cache entry reflects the edit on a cached revisit.
    browser.load_page(1).await.unwrap();
    assert_eq!(store.page_calls(), 1);
    assert_eq!(
        browser
            .items()
            .iter()
            .find(|o| o.id == target.id)
            .unwrap()
            .mobile,
        new_mobile,
    );
}

#[tokio::test]
async fn bulk_delivery_merges_confirmed_outcomes_only() {
    let (store, orders, mut browser) = setup(120);

    browser.load_page(1).await.unwrap();
    browser.load_page(2).await.unwrap();
    browser.load_page(1).await.unwrap();
    assert_eq!(store.page_calls(), 2);

    let delivered_on: order::DeliveryDateTime =
        DateTimeOf::from_unix_timestamp(1_705_276_800).unwrap();
    let selected = vec![
        orders[0].id.clone(),
        orders[7].id.clone(),
        order::Id::new("doc-missing").unwrap(),
        orders[21].id.clone(),
    ];

    let outcomes = browser.mark_delivered(selected, delivered_on).await;

    assert_eq!(outcomes.len(), 4);
    assert!(outcomes[0].is_delivered());
    assert!(outcomes[1].is_delivered());
    assert!(!outcomes[2].is_delivered());
    assert!(outcomes[3].is_delivered());

    for id in [&orders[0].id, &orders[7].id, &orders[21].id] {
        assert_eq!(
            browser
                .items()
                .iter()
                .find(|o| o.id == *id)
                .unwrap()
                .delivered_at,
            Some(delivered_on),
        );
        assert_eq!(
            store.order(id).unwrap().delivered_at,
            Some(delivered_on),
        );
    }

    // The cached second page was not touched by the merge.
    browser.load_page(2).await.unwrap();
    assert_eq!(store.page_calls(), 2);
    assert!(browser.items().iter().all(|o| o.delivered_at.is_none()));
}

#[tokio::test]
async fn hard_deletion_is_bin_only() {
    let (store, _orders, mut browser) = setup(40);

    browser.load_page(1).await.unwrap();
    let alive = browser.items()[0].clone();
    let victim = browser.items()[1].clone();

    // Refused while the order is not soft-deleted.
    assert!(browser.hard_delete(&alive.id).await.is_err());
    assert!(store.order(&alive.id).is_some());

    browser.soft_delete(&victim.id).await.unwrap();
    browser.hard_delete(&victim.id).await.unwrap();
    assert!(store.order(&victim.id).is_none());
}

#[tokio::test]
async fn total_count_is_queried_from_the_store() {
    let (_store, _orders, mut browser) = setup(77);

    browser.load_page(1).await.unwrap();
    assert_eq!(i64::from(browser.total().await.unwrap()), 77);
}
