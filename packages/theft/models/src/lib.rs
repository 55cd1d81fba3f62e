#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Theft record field definitions and time-of-day periods.
//!
//! Theft records are schemaless documents imported from spreadsheets, and
//! different dataset versions spell the same column differently (`MAKE` vs
//! `Make`, `Time_of_day` vs `Time_of_Day`). This crate names each logical
//! field once and lists every stored key that may carry it, so readers can
//! probe all spellings instead of assuming one.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A logical attribute of a theft record.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TheftField {
    /// Police station (locality) that registered the theft.
    Station,
    /// Free-text place where the vehicle was parked.
    Place,
    /// Vehicle manufacturer or model.
    Make,
    /// Vehicle category.
    Category,
    /// Time-of-day bucket.
    TimeOfDay,
    /// Day of the week.
    Day,
    /// Location-type tag.
    Spot,
    /// Latitude (numeric or numeric-like text).
    Latitude,
    /// Longitude (numeric or numeric-like text).
    Longitude,
    /// Incident date in one of several textual formats.
    Date,
}

impl TheftField {
    /// Returns the stored document keys that may hold this field, in the
    /// order they should be probed.
    #[must_use]
    pub const fn stored_keys(self) -> &'static [&'static str] {
        match self {
            Self::Station => &["POLICE_STATION"],
            Self::Place => &["PLACE"],
            Self::Make => &["MAKE", "Make"],
            Self::Category => &["Category"],
            Self::TimeOfDay => &["Time_of_day", "Time_of_Day"],
            Self::Day => &["DAY"],
            Self::Spot => &["SPOT"],
            Self::Latitude => &["LATITUDE"],
            Self::Longitude => &["LONGITUDE"],
            Self::Date => &["DATE"],
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Station,
            Self::Place,
            Self::Make,
            Self::Category,
            Self::TimeOfDay,
            Self::Day,
            Self::Spot,
            Self::Latitude,
            Self::Longitude,
            Self::Date,
        ]
    }
}

/// Fields returned by the raw record listing.
pub const RECORD_LISTING_FIELDS: &[TheftField] = &[
    TheftField::Make,
    TheftField::Category,
    TheftField::Place,
    TheftField::Station,
    TheftField::TimeOfDay,
    TheftField::Day,
    TheftField::Latitude,
    TheftField::Longitude,
    TheftField::Date,
];

/// The four time-of-day buckets used as pivot columns.
///
/// Parsing is exact: `"morning"` is not a [`TimePeriod`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum TimePeriod {
    /// Morning hours.
    Morning,
    /// Afternoon hours.
    Afternoon,
    /// Evening hours.
    Evening,
    /// Late night hours.
    Midnight,
}

impl TimePeriod {
    /// Returns all variants in column order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Morning, Self::Afternoon, Self::Evening, Self::Midnight]
    }
}

/// Sentinel value of the `time_of_day` filter meaning "any time".
pub const ALL_TIMES: &str = "All";
