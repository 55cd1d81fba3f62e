//! Filtered aggregate views.
//!
//! Every view applies the caller's predicate and runs a single grouping,
//! then reshapes the grouped rows for the dashboard.

use std::collections::BTreeMap;
use std::str::FromStr as _;

use chrono::NaiveDate;
use theft_map_analytics_models::{
    CompanyCount, CompanyTimeSlots, DailyCount, LocalityCount, ModelCount, PeakTime, TopStation,
};
use theft_map_database::TheftStore;
use theft_map_database_models::{GroupOrder, GroupQuery, Predicate, TheftDocument};
use theft_map_theft_models::{RECORD_LISTING_FIELDS, TheftField, TimePeriod};

use crate::dates::{format_date, parse_date};
use crate::{AnalyticsError, count_cell};

/// Label for records without a police station.
pub const UNKNOWN_STATION: &str = "Unknown";

/// Label reported when a top-group view matched nothing.
pub const NOT_AVAILABLE: &str = "N/A";

/// Number of makes returned by [`top_models`].
pub const TOP_MODELS: usize = 5;

/// Counts records matching `predicate`.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the store query fails.
pub fn total_thefts(store: &dyn TheftStore, predicate: &Predicate) -> Result<u64, AnalyticsError> {
    Ok(store.count(predicate)?)
}

/// Returns the police station with the most thefts.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the store query fails.
pub fn highest_station(
    store: &dyn TheftStore,
    predicate: &Predicate,
) -> Result<TopStation, AnalyticsError> {
    let query = GroupQuery::by(TheftField::Station)
        .if_missing(UNKNOWN_STATION)
        .limit(1);
    let top = store.group_count(predicate, &query)?.into_iter().next();

    Ok(top.map_or_else(
        || TopStation {
            station: NOT_AVAILABLE.to_string(),
            thefts: 0,
        },
        |group| TopStation {
            station: group.key(0).unwrap_or(UNKNOWN_STATION).to_string(),
            thefts: group.count,
        },
    ))
}

/// Returns the most stolen makes, at most [`TOP_MODELS`] of them.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the store query fails.
pub fn top_models(
    store: &dyn TheftStore,
    predicate: &Predicate,
) -> Result<Vec<ModelCount>, AnalyticsError> {
    let query = GroupQuery::by(TheftField::Make).limit(TOP_MODELS);

    Ok(store
        .group_count(predicate, &query)?
        .into_iter()
        .map(|group| ModelCount {
            model: group.key(0).map(ToString::to_string),
            count: group.count,
        })
        .collect())
}

/// Returns the busiest time-of-day period.
///
/// Records without a time of day form their own group, reported with a
/// `null` slot if it is the largest.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the store query fails.
pub fn peak_time(store: &dyn TheftStore, predicate: &Predicate) -> Result<PeakTime, AnalyticsError> {
    let query = GroupQuery::by(TheftField::TimeOfDay).limit(1);
    let top = store.group_count(predicate, &query)?.into_iter().next();

    Ok(top.map_or_else(
        || PeakTime {
            time_slot: Some(NOT_AVAILABLE.to_string()),
            time: 0,
        },
        |group| PeakTime {
            time_slot: group.key(0).map(ToString::to_string),
            time: group.count,
        },
    ))
}

/// Returns theft counts for every police station, largest first.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the store query fails.
pub fn thefts_by_station(
    store: &dyn TheftStore,
    predicate: &Predicate,
) -> Result<Vec<LocalityCount>, AnalyticsError> {
    let query = GroupQuery::by(TheftField::Station).if_missing(UNKNOWN_STATION);

    Ok(store
        .group_count(predicate, &query)?
        .into_iter()
        .map(|group| LocalityCount {
            locality: group.key(0).unwrap_or(UNKNOWN_STATION).to_string(),
            count: group.count,
        })
        .collect())
}

/// Returns theft counts for every company, ordered by company name.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the store query fails.
pub fn thefts_by_company(
    store: &dyn TheftStore,
    predicate: &Predicate,
) -> Result<Vec<CompanyCount>, AnalyticsError> {
    let query = GroupQuery::by(TheftField::Make).order(GroupOrder::KeyAsc);

    Ok(store
        .group_count(predicate, &query)?
        .into_iter()
        .map(|group| CompanyCount {
            company: group.key(0).map(ToString::to_string),
            count: group.count,
        })
        .collect())
}

/// Pivots company by time of day into one row per company.
///
/// Only the four [`TimePeriod`] labels become columns. Groups with any
/// other period are dropped, but their company still gets a row.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the store query fails.
pub fn time_slots_by_company(
    store: &dyn TheftStore,
    predicate: &Predicate,
) -> Result<Vec<CompanyTimeSlots>, AnalyticsError> {
    let query = GroupQuery::by_all(&[TheftField::Make, TheftField::TimeOfDay])
        .order(GroupOrder::KeyAsc);
    let groups = store.group_count(predicate, &query)?;

    // KeyAsc already sorts by company; the map just merges the periods.
    let mut rows: BTreeMap<Option<String>, CompanyTimeSlots> = BTreeMap::new();
    for group in groups {
        let company = group.key(0).map(ToString::to_string);
        let row = rows
            .entry(company.clone())
            .or_insert_with(|| CompanyTimeSlots::empty(company));

        let Some(period) = group.key(1).and_then(|p| TimePeriod::from_str(p).ok()) else {
            continue;
        };
        let cell = count_cell(group.count);
        match period {
            TimePeriod::Morning => row.Morning = cell,
            TimePeriod::Afternoon => row.Afternoon = cell,
            TimePeriod::Evening => row.Evening = cell,
            TimePeriod::Midnight => row.Midnight = cell,
        }
    }

    Ok(rows.into_values().collect())
}

/// Returns matching records projected to the listing fields.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the store query fails.
pub fn theft_data(
    store: &dyn TheftStore,
    predicate: &Predicate,
) -> Result<Vec<TheftDocument>, AnalyticsError> {
    Ok(store.find(predicate, RECORD_LISTING_FIELDS)?)
}

/// Returns theft counts per calendar date, oldest first.
///
/// Dates are stored in several formats, so records are loaded and parsed
/// here rather than grouped by the store. Records whose date does not
/// parse are left out.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the store query fails.
pub fn theft_trends(
    store: &dyn TheftStore,
    predicate: &Predicate,
) -> Result<Vec<DailyCount>, AnalyticsError> {
    let mut days: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for doc in store.find(predicate, &[TheftField::Date])? {
        if let Some(date) = doc.field(TheftField::Date).as_deref().and_then(parse_date) {
            *days.entry(date).or_default() += 1;
        }
    }

    Ok(days
        .into_iter()
        .map(|(date, count)| DailyCount {
            date: format_date(date),
            count,
        })
        .collect())
}
