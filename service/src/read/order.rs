//! [`Order`] read model definition.
//!
//! [`Order`]: crate::domain::Order

pub mod list {
    //! [`Order`]s list definitions.
    //!
    //! [`Order`]: crate::domain::Order

    use common::{pagination, DateTime};
    use derive_more::{From, Into};

    use crate::domain::{delivery, order, Order};

    /// Node in a [`Page`].
    pub type Node = Order;

    /// A [`pagination::Page`] of [`Order`]s.
    pub type Page = pagination::Page<Cursor, Node>;

    /// A [`pagination::Cache`] of [`Order`] [`Page`]s.
    pub type Cache = pagination::Cache<Cursor, Node>;

    /// Cursor pointing right after a specific [`Order`] in a list.
    ///
    /// Forward-only: the store serves lists ordered by creation time
    /// descending and resumes them strictly after the pointed document.
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub struct Cursor {
        /// ID of the [`Order`] the list resumes after.
        pub id: order::Id,

        /// Creation [`DateTime`] of that [`Order`].
        ///
        /// [`DateTime`]: common::DateTime
        pub created_at: order::CreationDateTime,
    }

    /// Selector of a [`Page`].
    #[derive(Clone, Debug)]
    pub struct Selector {
        /// Book to list [`Order`]s of.
        pub book: crate::domain::book::Id,

        /// Number of [`Order`]s to return.
        pub size: usize,

        /// [`Cursor`] to resume the list after.
        ///
        /// [`None`] starts the list from the beginning.
        pub after: Option<Cursor>,
    }

    /// Total count of [`Order`]s in a book.
    #[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
    pub struct TotalCount(i64);

    /// Scope of an [`Order`]s list.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub enum Scope {
        /// Regular views: soft-deleted [`Order`]s are hidden.
        #[default]
        Active,

        /// Recycling bin: only soft-deleted [`Order`]s are shown.
        Bin,
    }

    /// Delivery selector of a [`Filter`].
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub enum Delivery {
        /// Any delivery state passes.
        #[default]
        All,

        /// Only [`Order`]s with no delivery assigned pass.
        Unassigned,

        /// Only [`Order`]s of the exact [`delivery::Kind`] pass.
        ///
        /// [`delivery::Kind::Parcel`] additionally requires a delivery to be
        /// assigned already.
        Kind(delivery::Kind),
    }

    /// Delivery status selector of a [`Filter`].
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub enum Status {
        /// Any status passes.
        #[default]
        All,

        /// Only delivered [`Order`]s pass.
        Delivered,

        /// Only not yet delivered [`Order`]s pass.
        NotDelivered,
    }

    /// Mode of a [`Text`] matcher.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub enum Mode {
        /// A field passes if any of the values occurs in it.
        #[default]
        Include,

        /// A field passes if none of the values occurs in it.
        Exclude,
    }

    /// Multi-value text matcher of a single [`Order`] field.
    #[derive(Clone, Debug, Default, Eq, PartialEq)]
    pub struct Text {
        /// Comma-separated values to match.
        ///
        /// Empty (or all-blank) values match everything.
        pub values: String,

        /// [`Mode`] to match in.
        pub mode: Mode,
    }

    impl Text {
        /// Indicates whether the provided field passes this [`Text`] matcher.
        ///
        /// Matching is case-insensitive by substring.
        #[must_use]
        pub fn passes(&self, field: &str) -> bool {
            let values = self
                .values
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_lowercase)
                .collect::<Vec<_>>();
            if values.is_empty() {
                return true;
            }

            let field = field.to_lowercase();
            let hit = values.iter().any(|v| field.contains(v));
            match self.mode {
                Mode::Include => hit,
                Mode::Exclude => !hit,
            }
        }
    }

    /// Compound predicate applied to an already fetched [`Page`] of
    /// [`Order`]s.
    ///
    /// Pure and order-preserving: no store access, no mutation.
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// [`Scope`] of the list.
        pub scope: Scope,

        /// [`Delivery`] selector.
        pub delivery: Delivery,

        /// [`Status`] selector.
        pub status: Status,

        /// Minimum total copies (inclusive).
        pub min_copies: Option<u32>,

        /// Maximum total copies (inclusive).
        pub max_copies: Option<u32>,

        /// [`Text`] matcher of the recipient name.
        pub name: Text,

        /// [`Text`] matcher of the city.
        pub city: Text,

        /// [`Text`] matcher of the region.
        pub region: Text,

        /// [`Text`] matcher of the pincode.
        pub pincode: Text,

        /// [`Text`] matcher of the mobile number.
        pub mobile: Text,

        /// Creation date the passing [`Order`]s start at (its day start).
        pub from: Option<DateTime>,

        /// Creation date the passing [`Order`]s end at (its day end).
        pub to: Option<DateTime>,

        /// Threshold [`order::RegistrationId`]: only [`Order`]s with a
        /// strictly greater trailing number pass.
        pub after: Option<order::RegistrationId>,
    }

    impl Filter {
        /// Indicates whether the provided [`Order`] passes this [`Filter`].
        #[must_use]
        pub fn matches(&self, order: &Order) -> bool {
            match self.scope {
                Scope::Active => {
                    if order.is_deleted() {
                        return false;
                    }
                }
                Scope::Bin => {
                    if !order.is_deleted() {
                        return false;
                    }
                }
            }

            if let Some(after) = &self.after {
                if order.registration.number() <= after.number() {
                    return false;
                }
            }

            let delivery_passes = match self.delivery {
                Delivery::All => true,
                Delivery::Unassigned => !order.has_delivery_assigned(),
                Delivery::Kind(delivery::Kind::Parcel) => {
                    order.delivery_kind == Some(delivery::Kind::Parcel)
                        && order.has_delivery_assigned()
                }
                Delivery::Kind(kind) => order.delivery_kind == Some(kind),
            };
            if !delivery_passes {
                return false;
            }

            let status_passes = match self.status {
                Status::All => true,
                Status::Delivered => order.is_delivered(),
                Status::NotDelivered => !order.is_delivered(),
            };
            if !status_passes {
                return false;
            }

            let copies = order.copies.total();
            if self.min_copies.is_some_and(|min| copies < min)
                || self.max_copies.is_some_and(|max| copies > max)
            {
                return false;
            }

            if !self.name.passes(&order.recipient())
                || !self
                    .city
                    .passes(order.city.as_ref().map_or("", AsRef::as_ref))
                || !self
                    .region
                    .passes(order.region.as_ref().map_or("", AsRef::as_ref))
                || !self
                    .pincode
                    .passes(order.pincode.as_ref().map_or("", AsRef::as_ref))
                || !self.mobile.passes(order.mobile.as_ref())
            {
                return false;
            }

            if let Some(from) = self.from {
                if order.created_at < from.start_of_day().coerce() {
                    return false;
                }
            }
            if let Some(to) = self.to {
                if order.created_at > to.end_of_day().coerce() {
                    return false;
                }
            }

            true
        }

        /// Applies this [`Filter`] to the provided [`Order`]s, preserving
        /// their relative ordering.
        #[must_use]
        pub fn apply<'o>(&self, orders: &'o [Order]) -> Vec<&'o Order> {
            orders.iter().filter(|o| self.matches(o)).collect()
        }
    }
}

#[cfg(test)]
mod spec {
    use std::collections::BTreeMap;

    use common::DateTime;

    use crate::domain::{delivery, order, Order};

    use super::list::{Delivery, Filter, Mode, Scope, Status, Text};

    fn order(registration: &str) -> Order {
        Order {
            id: order::Id::new(format!("doc-{registration}")).unwrap(),
            book: "prayers".parse().unwrap(),
            registration: order::RegistrationId::new(registration).unwrap(),
            name: order::Name::new("Asha").unwrap(),
            surname: order::Surname::new("Patel"),
            mobile: order::Mobile::new("9876543210").unwrap(),
            city: order::City::new("Anand"),
            region: order::Region::new("Gujarat"),
            pincode: order::Pincode::new("388120"),
            address: order::Address::new("12 Station Road"),
            copies: order::Copies::Single(2),
            delivery_kind: None,
            tracking_id: None,
            delivered_at: None,
            created_at: DateTime::from_rfc3339("2024-01-15T10:00:00Z")
                .unwrap()
                .coerce(),
            deleted_at: None,
        }
    }

    fn text(values: &str, mode: Mode) -> Text {
        Text {
            values: values.to_owned(),
            mode,
        }
    }

    #[test]
    fn default_filter_only_hides_deleted() {
        let alive = order("AP-1");
        let mut deleted = order("AP-2");
        deleted.deleted_at = Some(DateTime::now().coerce());
        let also_alive = order("AP-3");

        let records =
            vec![alive.clone(), deleted.clone(), also_alive.clone()];
        let visible = Filter::default().apply(&records);

        assert_eq!(visible, vec![&alive, &also_alive]);
    }

    #[test]
    fn bin_scope_shows_only_deleted() {
        let alive = order("AP-1");
        let mut deleted = order("AP-2");
        deleted.deleted_at = Some(DateTime::now().coerce());

        let records = vec![alive, deleted.clone()];
        let filter = Filter {
            scope: Scope::Bin,
            ..Filter::default()
        };

        assert_eq!(filter.apply(&records), vec![&deleted]);
    }

    #[test]
    fn registration_threshold() {
        let record = order("AP-3440");

        let passing = Filter {
            after: order::RegistrationId::new("AP-3400"),
            ..Filter::default()
        };
        assert!(passing.matches(&record));

        let excluding = Filter {
            after: order::RegistrationId::new("AP-3500"),
            ..Filter::default()
        };
        assert!(!excluding.matches(&record));

        let equal = Filter {
            after: order::RegistrationId::new("XX-3440"),
            ..Filter::default()
        };
        assert!(!equal.matches(&record));

        // A non-numeric threshold parses as 0, so everything numeric passes.
        let nonsense = Filter {
            after: order::RegistrationId::new("garbage"),
            ..Filter::default()
        };
        assert!(nonsense.matches(&record));
    }

    #[test]
    fn delivery_selector() {
        let unassigned = order("AP-1");

        let mut parcel_assigned = order("AP-2");
        parcel_assigned.delivery_kind = Some(delivery::Kind::Parcel);
        parcel_assigned.tracking_id = delivery::TrackingId::new("RM12345");

        let mut parcel_unassigned = order("AP-3");
        parcel_unassigned.delivery_kind = Some(delivery::Kind::Parcel);

        let mut courier = order("AP-4");
        courier.delivery_kind = Some(delivery::Kind::Courier);

        let all = Filter::default();
        for o in [&unassigned, &parcel_assigned, &parcel_unassigned, &courier]
        {
            assert!(all.matches(o));
        }

        let only_unassigned = Filter {
            delivery: Delivery::Unassigned,
            ..Filter::default()
        };
        assert!(only_unassigned.matches(&unassigned));
        assert!(only_unassigned.matches(&parcel_unassigned));
        assert!(!only_unassigned.matches(&parcel_assigned));

        // `Parcel` requires both the kind and an assigned delivery.
        let only_parcel = Filter {
            delivery: Delivery::Kind(delivery::Kind::Parcel),
            ..Filter::default()
        };
        assert!(only_parcel.matches(&parcel_assigned));
        assert!(!only_parcel.matches(&parcel_unassigned));
        assert!(!only_parcel.matches(&courier));

        let only_courier = Filter {
            delivery: Delivery::Kind(delivery::Kind::Courier),
            ..Filter::default()
        };
        assert!(only_courier.matches(&courier));
        assert!(!only_courier.matches(&parcel_assigned));
    }

    #[test]
    fn status_selector() {
        let pending = order("AP-1");
        let mut delivered = order("AP-2");
        delivered.delivered_at = Some(DateTime::now().coerce());

        let only_delivered = Filter {
            status: Status::Delivered,
            ..Filter::default()
        };
        assert!(only_delivered.matches(&delivered));
        assert!(!only_delivered.matches(&pending));

        let only_pending = Filter {
            status: Status::NotDelivered,
            ..Filter::default()
        };
        assert!(only_pending.matches(&pending));
        assert!(!only_pending.matches(&delivered));
    }

    #[test]
    fn copies_range() {
        let mut record = order("AP-1");
        record.copies = order::Copies::PerTitle(BTreeMap::from([
            ("english".to_owned(), 2),
            ("hindi".to_owned(), 3),
        ]));

        for (min, max, expected) in [
            (None, None, true),
            (Some(5), None, true),
            (Some(6), None, false),
            (None, Some(5), true),
            (None, Some(4), false),
            (Some(2), Some(10), true),
        ] {
            let filter = Filter {
                min_copies: min,
                max_copies: max,
                ..Filter::default()
            };
            assert_eq!(
                filter.matches(&record),
                expected,
                "for min {min:?}, max {max:?}",
            );
        }
    }

    #[test]
    fn text_include_and_exclude_are_complementary() {
        let cities = ["Anand", "Surat", "Vadodara", "Rajkot"];
        let records = cities
            .iter()
            .enumerate()
            .map(|(i, city)| {
                let mut o = order(&format!("AP-{i}"));
                o.city = order::City::new(*city);
                o
            })
            .collect::<Vec<_>>();

        let include = Filter {
            city: text("anand, surat", Mode::Include),
            ..Filter::default()
        };
        let exclude = Filter {
            city: text("anand, surat", Mode::Exclude),
            ..Filter::default()
        };

        let included = include.apply(&records);
        let excluded = exclude.apply(&records);

        assert_eq!(included.len() + excluded.len(), records.len());
        for record in &records {
            assert_ne!(
                included.contains(&record),
                excluded.contains(&record),
            );
        }
    }

    #[test]
    fn text_matches_substrings_case_insensitively() {
        let record = order("AP-1");

        let filter = Filter {
            name: text("ASHA", Mode::Include),
            ..Filter::default()
        };
        assert!(filter.matches(&record));

        // Surname is part of the matched recipient name.
        let filter = Filter {
            name: text("patel", Mode::Include),
            ..Filter::default()
        };
        assert!(filter.matches(&record));

        let filter = Filter {
            mobile: text("6543", Mode::Include),
            ..Filter::default()
        };
        assert!(filter.matches(&record));

        let filter = Filter {
            pincode: text("999", Mode::Include),
            ..Filter::default()
        };
        assert!(!filter.matches(&record));
    }

    #[test]
    fn blank_text_values_pass_everything() {
        let record = order("AP-1");

        for values in ["", "  ", ", ,"] {
            let include = Filter {
                city: text(values, Mode::Include),
                ..Filter::default()
            };
            let exclude = Filter {
                city: text(values, Mode::Exclude),
                ..Filter::default()
            };
            assert!(include.matches(&record), "include `{values}`");
            assert!(exclude.matches(&record), "exclude `{values}`");
        }
    }

    #[test]
    fn missing_field_fails_include_and_passes_exclude() {
        let mut record = order("AP-1");
        record.city = None;

        let include = Filter {
            city: text("anand", Mode::Include),
            ..Filter::default()
        };
        assert!(!include.matches(&record));

        let exclude = Filter {
            city: text("anand", Mode::Exclude),
            ..Filter::default()
        };
        assert!(exclude.matches(&record));
    }

    #[test]
    fn date_range_spans_whole_days() {
        // Created at 2024-01-15T10:00:00Z.
        let record = order("AP-1");
        let date = |s| DateTime::from_rfc3339(s).unwrap();

        let same_day = Filter {
            from: Some(date("2024-01-15T23:00:00Z")),
            to: Some(date("2024-01-15T01:00:00Z")),
            ..Filter::default()
        };
        assert!(same_day.matches(&record));

        let before = Filter {
            to: Some(date("2024-01-14T23:59:59Z")),
            ..Filter::default()
        };
        assert!(!before.matches(&record));

        let after = Filter {
            from: Some(date("2024-01-16T00:00:00Z")),
            ..Filter::default()
        };
        assert!(!after.matches(&record));
    }

    #[test]
    fn apply_preserves_ordering() {
        let records =
            vec![order("AP-3"), order("AP-1"), order("AP-2")];

        let visible = Filter::default().apply(&records);

        assert_eq!(
            visible
                .iter()
                .map(|o| o.registration.as_ref())
                .collect::<Vec<&str>>(),
            vec!["AP-3", "AP-1", "AP-2"],
        );
    }
}
