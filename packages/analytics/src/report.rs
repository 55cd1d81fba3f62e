//! Narrative theft report.
//!
//! Loads the records of one station (or all), keeps those whose date falls
//! in the requested range, and summarizes them into a [`TheftReport`].

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use theft_map_analytics_models::{ReportParams, TheftReport};
use theft_map_database::TheftStore;
use theft_map_database_models::{Clause, Matcher, Predicate, TheftDocument};
use theft_map_theft_models::TheftField;

use crate::AnalyticsError;
use crate::dates::{format_date, parse_date};
use crate::views::{NOT_AVAILABLE, UNKNOWN_STATION};

/// Title printed at the top of every report.
pub const REPORT_TITLE: &str = "Bike Theft Analysis Report";

/// Station label of a report covering every station.
pub const ALL_STATIONS: &str = "All";

const REPORT_FIELDS: &[TheftField] = &[
    TheftField::Station,
    TheftField::TimeOfDay,
    TheftField::Make,
    TheftField::Date,
];

/// Inclusive date range covered by a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Builds a range, swapping the bounds if they are reversed.
    #[must_use]
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days covered, counting both ends.
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to {}",
            format_date(self.start),
            format_date(self.end)
        )
    }
}

fn requested_station(params: &ReportParams) -> Option<&str> {
    params
        .police_station
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != ALL_STATIONS)
}

fn requested_date(raw: Option<&str>, name: &str) -> Result<Option<NaiveDate>, AnalyticsError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    parse_date(raw)
        .map(Some)
        .ok_or_else(|| AnalyticsError::InvalidRange {
            message: format!("Invalid {name} '{raw}'. Expected a date such as 2025-07-27"),
        })
}

/// Most frequent value, ties broken by the smaller value.
fn mode<I: IntoIterator<Item = String>>(values: I) -> Option<String> {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }
    // `max_by` keeps the last of equal elements, so iterate in reverse key
    // order to land on the smallest key.
    counts
        .into_iter()
        .rev()
        .max_by(|a, b| a.1.cmp(&b.1))
        .map(|(value, _)| value)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Generates the narrative report.
///
/// The requested bounds apply only when both are given, swapped if
/// reversed. Otherwise the range is every observed record date. Records whose date cannot be parsed are left
/// out of the report.
///
/// # Errors
///
/// * [`AnalyticsError::InvalidRange`] if a supplied date cannot be parsed
/// * [`AnalyticsError::NoData`] if no record matches the station or the
///   range
/// * [`AnalyticsError::Store`] if the store query fails
#[allow(clippy::cast_precision_loss)]
pub fn generate_report(
    store: &dyn TheftStore,
    params: &ReportParams,
    now: NaiveDateTime,
) -> Result<TheftReport, AnalyticsError> {
    let start = requested_date(params.start_date.as_deref(), "start_date")?;
    let end = requested_date(params.end_date.as_deref(), "end_date")?;
    let station = requested_station(params);

    let predicate = station.map_or_else(Predicate::default, |s| {
        Predicate::new(vec![Clause {
            field: TheftField::Station,
            matcher: Matcher::Equals(s.to_string()),
        }])
    });

    let docs = store.find(&predicate, REPORT_FIELDS)?;
    if docs.is_empty() {
        return Err(AnalyticsError::NoData {
            message: station.map_or_else(
                || "No theft records found".to_string(),
                |s| format!("No theft records found for police station '{s}'"),
            ),
        });
    }

    let dated: Vec<(NaiveDate, TheftDocument)> = docs
        .into_iter()
        .filter_map(|doc| {
            let date = doc.field(TheftField::Date).as_deref().and_then(parse_date)?;
            Some((date, doc))
        })
        .collect();

    let range = match (start, end) {
        (Some(start), Some(end)) => DateRange::new(start, end),
        _ => {
            let observed_min = dated.iter().map(|(d, _)| *d).min();
            let observed_max = dated.iter().map(|(d, _)| *d).max();
            let (Some(first), Some(last)) = (observed_min, observed_max) else {
                return Err(AnalyticsError::NoData {
                    message: "No theft records with a valid date".to_string(),
                });
            };
            DateRange::new(first, last)
        }
    };

    let in_range: Vec<(NaiveDate, TheftDocument)> = dated
        .into_iter()
        .filter(|(d, _)| range.contains(*d))
        .collect();
    if in_range.is_empty() {
        return Err(AnalyticsError::NoData {
            message: format!("No theft records from {range}"),
        });
    }

    let total = in_range.len() as u64;
    let top_station = mode(in_range.iter().map(|(_, doc)| {
        doc.field(TheftField::Station)
            .unwrap_or_else(|| UNKNOWN_STATION.to_string())
    }))
    .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let top_time = mode(in_range.iter().filter_map(|(_, doc)| doc.field(TheftField::TimeOfDay)))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let top_model = mode(in_range.iter().filter_map(|(_, doc)| doc.field(TheftField::Make)))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let top_day = mode(in_range.iter().map(|(d, _)| format_date(*d)))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let average = round2(total as f64 / range.days() as f64);

    let station_label = station.unwrap_or(ALL_STATIONS).to_string();
    let summary = format!(
        "Between {} and {}, {total} bike thefts were reported{}. \
         {top_station} was the most targeted police station and most thefts \
         happened in the {top_time}. {top_model} was the most stolen model. \
         The highest number of thefts occurred on {top_day}, an average of \
         {average:.2} thefts per day.",
        format_date(range.start),
        format_date(range.end),
        station.map_or_else(String::new, |s| format!(" under {s} police station")),
    );

    log::info!("Generated report for {station_label} covering {range}: {total} thefts");

    Ok(TheftReport {
        report_title: REPORT_TITLE.to_string(),
        police_station: station_label,
        date_range: range.to_string(),
        generated_on: now.format("%Y-%m-%d %H:%M:%S").to_string(),
        total_thefts: total,
        most_targeted_station: top_station,
        most_common_time: top_time,
        most_stolen_model: top_model,
        highest_theft_day: top_day,
        average_per_day: average,
        summary,
    })
}
