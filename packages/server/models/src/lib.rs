#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the theft map server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the analytics result types so the envelope of each endpoint can
//! evolve independently of the computation.

use serde::{Deserialize, Serialize};
use theft_map_database_models::TheftFilter;

/// Filter query parameters shared by every aggregate endpoint.
///
/// Multi-value parameters are comma-joined (`localities=A,B`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterQueryParams {
    /// Police stations.
    pub localities: Option<String>,
    /// Places.
    pub places: Option<String>,
    /// Exact vehicle make.
    pub company: Option<String>,
    /// Vehicle categories.
    pub categories: Option<String>,
    /// Exact time-of-day period, or `All`.
    pub time_of_day: Option<String>,
    /// Days.
    pub days: Option<String>,
    /// Spot types.
    pub spot_types: Option<String>,
}

impl FilterQueryParams {
    /// Converts the raw parameters into a filter configuration using
    /// `split` to break up the comma-joined lists.
    #[must_use]
    pub fn to_filter(&self, split: impl Fn(Option<&str>) -> Vec<String>) -> TheftFilter {
        TheftFilter {
            localities: split(self.localities.as_deref()),
            places: split(self.places.as_deref()),
            company: self.company.clone(),
            categories: split(self.categories.as_deref()),
            time_of_day: self.time_of_day.clone(),
            days: split(self.days.as_deref()),
            spot_types: split(self.spot_types.as_deref()),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// `GET /api/total-thefts` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiTotalThefts {
    pub total_thefts: u64,
}

/// Envelope for list responses: `{"data": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiData<T> {
    pub data: Vec<T>,
}

impl<T> From<Vec<T>> for ApiData<T> {
    fn from(data: Vec<T>) -> Self {
        Self { data }
    }
}

/// Body of 404 and 400 responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    pub message: String,
}

/// Body of 500 responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Short description of the failed operation.
    pub error: String,
    /// Underlying error text.
    pub detail: String,
}
