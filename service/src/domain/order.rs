//! [`Order`] definitions.

use std::{collections::BTreeMap, str::FromStr, sync::LazyLock};

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display};
use regex::Regex;

use super::{book, delivery};

/// Book-order submission.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Order {
    /// ID of this [`Order`].
    pub id: Id,

    /// [`book::Id`] this [`Order`] was submitted for.
    pub book: book::Id,

    /// Human-readable [`RegistrationId`] of this [`Order`].
    pub registration: RegistrationId,

    /// [`Name`] of the recipient.
    pub name: Name,

    /// [`Surname`] of the recipient.
    pub surname: Option<Surname>,

    /// [`Mobile`] number of the recipient.
    pub mobile: Mobile,

    /// [`City`] of the delivery address.
    pub city: Option<City>,

    /// [`Region`] (state) of the delivery address.
    pub region: Option<Region>,

    /// Postal [`Pincode`] of the delivery address.
    pub pincode: Option<Pincode>,

    /// Street [`Address`] to deliver to.
    pub address: Option<Address>,

    /// Requested [`Copies`].
    pub copies: Copies,

    /// [`delivery::Kind`] assigned to this [`Order`].
    pub delivery_kind: Option<delivery::Kind>,

    /// [`delivery::TrackingId`] assigned to this [`Order`].
    pub tracking_id: Option<delivery::TrackingId>,

    /// [`DateTime`] when this [`Order`] was delivered.
    ///
    /// [`None`] means it hasn't been dispatched yet.
    pub delivered_at: Option<DeliveryDateTime>,

    /// [`DateTime`] when this [`Order`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Order`] was deleted.
    ///
    /// Presence of this stamp is what makes an [`Order`] soft-deleted: such
    /// orders show up in the recycling bin only, until restored.
    pub deleted_at: Option<DeletionDateTime>,
}

impl Order {
    /// Indicates whether this [`Order`] is soft-deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Indicates whether this [`Order`] has been delivered.
    #[must_use]
    pub fn is_delivered(&self) -> bool {
        self.delivered_at.is_some()
    }

    /// Indicates whether a delivery has been assigned to this [`Order`].
    #[must_use]
    pub fn has_delivery_assigned(&self) -> bool {
        self.tracking_id.is_some()
    }

    /// Returns the full recipient name of this [`Order`].
    #[must_use]
    pub fn recipient(&self) -> String {
        self.surname.as_ref().map_or_else(
            || self.name.to_string(),
            |surname| format!("{} {surname}", self.name),
        )
    }
}

/// ID of an [`Order`].
///
/// Opaque document id assigned by the store.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
pub struct Id(String);

impl Id {
    /// Creates a new [`Id`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `id` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a new [`Id`] if the given `id` is valid.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        Self::check(&id).then_some(Self(id))
    }

    /// Checks whether the given `id` is a valid [`Id`].
    fn check(id: impl AsRef<str>) -> bool {
        let id = id.as_ref();
        id.trim() == id && !id.is_empty() && id.len() <= 256
    }
}

impl FromStr for Id {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `order::Id`")
    }
}

/// Human-readable registration id of an [`Order`], like `AP-3440`.
///
/// The trailing numeric run is what "after order id" threshold comparisons
/// operate on.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
pub struct RegistrationId(String);

impl RegistrationId {
    /// Creates a new [`RegistrationId`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `id` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a new [`RegistrationId`] if the given `id` is valid.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        Self::check(&id).then_some(Self(id))
    }

    /// Checks whether the given `id` is a valid [`RegistrationId`].
    fn check(id: impl AsRef<str>) -> bool {
        let id = id.as_ref();
        id.trim() == id && !id.is_empty() && id.len() <= 64
    }

    /// Returns the trailing numeric run of this [`RegistrationId`].
    ///
    /// `0` is returned if it ends with no digits (or the run overflows).
    #[must_use]
    pub fn number(&self) -> u64 {
        let bytes = self.0.as_bytes();
        let mut start = bytes.len();
        while start > 0 && bytes[start - 1].is_ascii_digit() {
            start -= 1;
        }
        self.0[start..].parse().unwrap_or(0)
    }
}

impl FromStr for RegistrationId {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `order::RegistrationId`")
    }
}

/// Name of an [`Order`] recipient.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Surname of an [`Order`] recipient.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Surname(String);

impl Surname {
    /// Creates a new [`Surname`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `surname` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(surname: impl Into<String>) -> Self {
        Self(surname.into())
    }

    /// Creates a new [`Surname`] if the given `surname` is valid.
    #[must_use]
    pub fn new(surname: impl Into<String>) -> Option<Self> {
        let surname = surname.into();
        Self::check(&surname).then_some(Self(surname))
    }

    /// Checks whether the given `surname` is a valid [`Surname`].
    fn check(surname: impl AsRef<str>) -> bool {
        let surname = surname.as_ref();
        surname.trim() == surname
            && !surname.is_empty()
            && surname.len() <= 512
    }
}

impl FromStr for Surname {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Surname`")
    }
}

/// Mobile number of an [`Order`] recipient.
///
/// Kept as a string: leading zeroes and separators are significant for
/// display and substring filtering.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Mobile(String);

impl Mobile {
    /// Creates a new [`Mobile`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `number` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(number: impl Into<String>) -> Self {
        Self(number.into())
    }

    /// Creates a new [`Mobile`] if the given `number` is valid.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Option<Self> {
        let number = number.into();
        Self::check(&number).then_some(Self(number))
    }

    /// Checks whether the given `number` is a valid [`Mobile`].
    fn check(number: impl AsRef<str>) -> bool {
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^\+?[0-9][0-9 -]{3,17}[0-9]$").unwrap()
        });

        REGEX.is_match(number.as_ref())
    }
}

impl FromStr for Mobile {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Mobile`")
    }
}

/// City of an [`Order`] delivery address.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct City(String);

impl City {
    /// Creates a new [`City`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `city` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(city: impl Into<String>) -> Self {
        Self(city.into())
    }

    /// Creates a new [`City`] if the given `city` is valid.
    #[must_use]
    pub fn new(city: impl Into<String>) -> Option<Self> {
        let city = city.into();
        Self::check(&city).then_some(Self(city))
    }

    /// Checks whether the given `city` is a valid [`City`].
    fn check(city: impl AsRef<str>) -> bool {
        let city = city.as_ref();
        city.trim() == city && !city.is_empty() && city.len() <= 256
    }
}

impl FromStr for City {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `City`")
    }
}

/// Region (state) of an [`Order`] delivery address.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Region(String);

impl Region {
    /// Creates a new [`Region`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `region` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(region: impl Into<String>) -> Self {
        Self(region.into())
    }

    /// Creates a new [`Region`] if the given `region` is valid.
    #[must_use]
    pub fn new(region: impl Into<String>) -> Option<Self> {
        let region = region.into();
        Self::check(&region).then_some(Self(region))
    }

    /// Checks whether the given `region` is a valid [`Region`].
    fn check(region: impl AsRef<str>) -> bool {
        let region = region.as_ref();
        region.trim() == region && !region.is_empty() && region.len() <= 256
    }
}

impl FromStr for Region {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Region`")
    }
}

/// Postal pincode of an [`Order`] delivery address.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Pincode(String);

impl Pincode {
    /// Creates a new [`Pincode`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `pincode` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(pincode: impl Into<String>) -> Self {
        Self(pincode.into())
    }

    /// Creates a new [`Pincode`] if the given `pincode` is valid.
    #[must_use]
    pub fn new(pincode: impl Into<String>) -> Option<Self> {
        let pincode = pincode.into();
        Self::check(&pincode).then_some(Self(pincode))
    }

    /// Checks whether the given `pincode` is a valid [`Pincode`].
    fn check(pincode: impl AsRef<str>) -> bool {
        static REGEX: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"^[0-9]{4,10}$").unwrap());

        REGEX.is_match(pincode.as_ref())
    }
}

impl FromStr for Pincode {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Pincode`")
    }
}

/// Street address of an [`Order`] delivery.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Address(String);

impl Address {
    /// Creates a new [`Address`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `address` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Creates a new [`Address`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Address`].
    fn check(address: impl AsRef<str>) -> bool {
        let address = address.as_ref();
        address.trim() == address
            && !address.is_empty()
            && address.len() <= 2048
    }
}

impl FromStr for Address {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Address`")
    }
}

/// Requested copies of an [`Order`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Copies {
    /// Single-title order with a plain copy count.
    Single(u32),

    /// Multi-title order with a per-title quantity.
    ///
    /// Keys are the title markers the submission pipeline writes.
    PerTitle(BTreeMap<String, u32>),
}

impl Copies {
    /// Returns the total number of copies this [`Copies`] requests.
    #[must_use]
    pub fn total(&self) -> u32 {
        match self {
            Self::Single(count) => *count,
            Self::PerTitle(quantities) => quantities.values().sum(),
        }
    }
}

impl Default for Copies {
    fn default() -> Self {
        Self::Single(1)
    }
}

/// [`DateTime`] of an [`Order`] creation.
pub type CreationDateTime = DateTimeOf<unit::Creation>;

/// [`DateTime`] of an [`Order`] deletion.
pub type DeletionDateTime = DateTimeOf<unit::Deletion>;

/// [`DateTime`] of an [`Order`] delivery.
pub type DeliveryDateTime = DateTimeOf<unit::Delivery>;

#[cfg(test)]
mod spec {
    use std::collections::BTreeMap;

    use super::{Copies, Mobile, Pincode, RegistrationId};

    #[test]
    fn registration_id_trailing_number() {
        for (id, expected) in [
            ("AP-3440", 3440),
            ("AP-0012", 12),
            ("ap3440", 3440),
            ("3440", 3440),
            ("AP-", 0),
            ("FOO", 0),
            ("AP-12X", 0),
        ] {
            assert_eq!(
                RegistrationId::new(id).unwrap().number(),
                expected,
                "for `{id}`",
            );
        }
    }

    #[test]
    fn copies_totals() {
        assert_eq!(Copies::Single(3).total(), 3);
        assert_eq!(Copies::default().total(), 1);

        let quantities = BTreeMap::from([
            ("gujarati".to_owned(), 2),
            ("hindi".to_owned(), 1),
            ("english".to_owned(), 4),
        ]);
        assert_eq!(Copies::PerTitle(quantities).total(), 7);

        assert_eq!(Copies::PerTitle(BTreeMap::new()).total(), 0);
    }

    #[test]
    fn mobile_format() {
        assert!(Mobile::new("9876543210").is_some());
        assert!(Mobile::new("+91 98765 43210").is_some());
        assert!(Mobile::new("98-76-54").is_some());
        assert!(Mobile::new("").is_none());
        assert!(Mobile::new("phone").is_none());
        assert!(Mobile::new("123").is_none());
    }

    #[test]
    fn pincode_format() {
        assert!(Pincode::new("388120").is_some());
        assert!(Pincode::new("0001").is_some());
        assert!(Pincode::new("38 81").is_none());
        assert!(Pincode::new("abcdef").is_none());
    }
}
