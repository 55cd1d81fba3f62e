#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Result types for the theft map aggregate views.
//!
//! Field names are the JSON keys the dashboard frontend reads, so several
//! types keep the dataset's own spelling (`Morning`, `Report_Title`, ...)
//! instead of Rust naming.

use serde::{Deserialize, Serialize};

/// Station with the most thefts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopStation {
    /// Station name, `"Unknown"` for records without one, or `"N/A"` when
    /// nothing matched.
    pub station: String,
    /// Number of thefts at the station.
    pub thefts: u64,
}

/// Busiest time-of-day period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeakTime {
    /// Period label. `None` when the largest group is records without a
    /// time of day.
    pub time_slot: Option<String>,
    /// Number of thefts in the period.
    pub time: u64,
}

/// Thefts per vehicle make.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCount {
    /// Vehicle make, `None` for records without one.
    pub model: Option<String>,
    /// Number of thefts.
    pub count: u64,
}

/// Thefts per police station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalityCount {
    /// Station name, `"Unknown"` for records without one.
    pub locality: String,
    /// Number of thefts.
    pub count: u64,
}

/// Thefts per company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyCount {
    /// Vehicle make, `None` for records without one.
    pub company: Option<String>,
    /// Number of thefts.
    pub count: u64,
}

/// One row of the company by time-of-day pivot.
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyTimeSlots {
    /// Vehicle make, `None` for records without one.
    pub company: Option<String>,
    pub Morning: f64,
    pub Afternoon: f64,
    pub Evening: f64,
    pub Midnight: f64,
}

impl CompanyTimeSlots {
    /// Creates a row with every period at zero.
    #[must_use]
    pub const fn empty(company: Option<String>) -> Self {
        Self {
            company,
            Morning: 0.0,
            Afternoon: 0.0,
            Evening: 0.0,
            Midnight: 0.0,
        }
    }

    /// Sum of the four period columns.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.Morning + self.Afternoon + self.Evening + self.Midnight
    }
}

/// A single theft location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Points for the heat map together with the viewport center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapData {
    /// Centroid of `points`, or the fallback city center when empty.
    pub center: HeatPoint,
    pub points: Vec<HeatPoint>,
}

/// Thefts on one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    /// Date formatted `YYYY-MM-DD`.
    pub date: String,
    pub count: u64,
}

/// Request body for the narrative report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportParams {
    /// Restrict the report to one police station.
    #[serde(default)]
    pub police_station: Option<String>,
    /// Inclusive start date.
    #[serde(default)]
    pub start_date: Option<String>,
    /// Inclusive end date.
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Narrative theft report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TheftReport {
    #[serde(rename = "Report_Title")]
    pub report_title: String,
    #[serde(rename = "Police_Station")]
    pub police_station: String,
    #[serde(rename = "Date_Range")]
    pub date_range: String,
    #[serde(rename = "Generated_On")]
    pub generated_on: String,
    #[serde(rename = "Total_Thefts")]
    pub total_thefts: u64,
    #[serde(rename = "Most_Targeted_Station")]
    pub most_targeted_station: String,
    #[serde(rename = "Most_Common_Time")]
    pub most_common_time: String,
    #[serde(rename = "Most_Stolen_Model")]
    pub most_stolen_model: String,
    #[serde(rename = "Highest_Theft_Day")]
    pub highest_theft_day: String,
    #[serde(rename = "Average_Per_Day")]
    pub average_per_day: f64,
    #[serde(rename = "Summary")]
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pivot_row_uses_period_keys() {
        let mut row = CompanyTimeSlots::empty(Some("Honda".to_string()));
        row.Evening = 2.0;
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["company"], "Honda");
        assert_eq!(json["Evening"], 2.0);
        assert_eq!(json["Midnight"], 0.0);
        assert!((row.total() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn report_serializes_with_dataset_keys() {
        let report = TheftReport {
            report_title: "Bike Theft Analysis Report".to_string(),
            police_station: "All".to_string(),
            date_range: "2025-07-01 to 2025-07-31".to_string(),
            generated_on: "2025-08-01 10:00:00".to_string(),
            total_thefts: 3,
            most_targeted_station: "Karveer".to_string(),
            most_common_time: "Evening".to_string(),
            most_stolen_model: "Honda".to_string(),
            highest_theft_day: "Monday".to_string(),
            average_per_day: 0.1,
            summary: String::new(),
        };
        let json = serde_json::to_value(&report).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        for key in [
            "Report_Title",
            "Police_Station",
            "Date_Range",
            "Generated_On",
            "Total_Thefts",
            "Most_Targeted_Station",
            "Most_Common_Time",
            "Most_Stolen_Model",
            "Highest_Theft_Day",
            "Average_Per_Day",
            "Summary",
        ] {
            assert!(keys.contains(&key), "missing {key}");
        }
        assert_eq!(keys.len(), 11);
    }

    #[test]
    fn report_params_fields_are_optional() {
        let params: ReportParams = serde_json::from_str("{\"police_station\": \"Karveer\"}").unwrap();
        assert_eq!(params.police_station.as_deref(), Some("Karveer"));
        assert_eq!(params.start_date, None);
    }
}
