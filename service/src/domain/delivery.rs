//! Delivery definitions.

use std::str::FromStr;

use derive_more::{AsRef, Display};
use serde::{Deserialize, Serialize};

use super::order;

/// Means of delivering an [`Order`].
///
/// Values are wire-stable: they match the delivery type markers the
/// submission pipeline writes into order documents.
///
/// [`Order`]: crate::domain::Order
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Eq,
    PartialEq,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
pub enum Kind {
    /// Registered postal parcel.
    #[serde(rename = "parcelId")]
    #[strum(serialize = "parcelId")]
    Parcel,

    /// Private courier shipment.
    #[serde(rename = "courierId")]
    #[strum(serialize = "courierId")]
    Courier,

    /// Handed over in person, without a carrier.
    #[serde(rename = "handtohand")]
    #[strum(serialize = "handtohand")]
    HandToHand,
}

/// Carrier tracking number assigned to an [`Order`].
///
/// [`Order`]: crate::domain::Order
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct TrackingId(String);

impl TrackingId {
    /// Creates a new [`TrackingId`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `id` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a new [`TrackingId`] if the given `id` is valid.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        Self::check(&id).then_some(Self(id))
    }

    /// Checks whether the given `id` is a valid [`TrackingId`].
    fn check(id: impl AsRef<str>) -> bool {
        let id = id.as_ref();
        id.trim() == id && !id.is_empty() && id.len() <= 128
    }
}

impl FromStr for TrackingId {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `delivery::TrackingId`")
    }
}

/// Confirmation of an [`Order`] being delivered.
///
/// [`Order`]: crate::domain::Order
#[derive(Clone, Debug)]
pub struct Confirmation {
    /// ID of the delivered [`Order`].
    ///
    /// [`Order`]: crate::domain::Order
    pub order: order::Id,

    /// [`DateTime`] when the [`Order`] was delivered.
    ///
    /// [`DateTime`]: common::DateTime
    /// [`Order`]: crate::domain::Order
    pub at: order::DeliveryDateTime,
}
