// Aggregator - filtering and group-by-sum over rental records
//
// Every function here is pure: inputs are borrowed, outputs are new
// collections, and identical inputs give identical outputs.

use crate::record::{day_type_label, RentalRecord, WeatherSituation};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// SUMMARY TYPES
// ============================================================================

/// Casual / registered / overall sums for a group of records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageTotals {
    pub casual: u64,
    pub registered: u64,
    pub total: u64,
}

impl UsageTotals {
    pub fn add(&mut self, record: &RentalRecord) {
        self.casual += u64::from(record.casual);
        self.registered += u64::from(record.registered);
        self.total += u64::from(record.total);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherUsage {
    pub weather: WeatherSituation,
    pub label: String,
    #[serde(flatten)]
    pub usage: UsageTotals,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayUsage {
    pub holiday: bool,
    pub label: String,
    #[serde(flatten)]
    pub usage: UsageTotals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourPoint {
    pub hour: u8,
    pub total: u64,
}

/// Per-hour totals split by day type, hours ascending
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlySeries {
    pub working: Vec<HourPoint>,
    pub weekend: Vec<HourPoint>,
}

// ============================================================================
// OPERATIONS
// ============================================================================

/// Records of `year` whose date lies in `[start, end]`.
/// Empty when nothing matches or when `start > end`.
pub fn filter_by_year_and_range(
    records: &[RentalRecord],
    year: i32,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<RentalRecord> {
    if start > end {
        return Vec::new();
    }

    records
        .iter()
        .filter(|r| r.year() == year && r.date >= start && r.date <= end)
        .cloned()
        .collect()
}

/// Sums over every record, used for the headline metrics
pub fn totals(records: &[RentalRecord]) -> UsageTotals {
    let mut totals = UsageTotals::default();
    for record in records {
        totals.add(record);
    }
    totals
}

/// One row per weather situation present in `records`, ordered by code
pub fn summarize_by_weather(records: &[RentalRecord]) -> Vec<WeatherUsage> {
    let mut groups: BTreeMap<WeatherSituation, UsageTotals> = BTreeMap::new();

    for record in records {
        groups.entry(record.weather).or_default().add(record);
    }

    groups
        .into_iter()
        .map(|(weather, usage)| WeatherUsage {
            weather,
            label: weather.label().to_string(),
            usage,
        })
        .collect()
}

/// One row per holiday flag present in `records`, working days first
pub fn summarize_by_holiday(records: &[RentalRecord]) -> Vec<HolidayUsage> {
    let mut groups: BTreeMap<bool, UsageTotals> = BTreeMap::new();

    for record in records {
        groups.entry(record.holiday).or_default().add(record);
    }

    groups
        .into_iter()
        .map(|(holiday, usage)| HolidayUsage {
            holiday,
            label: day_type_label(holiday).to_string(),
            usage,
        })
        .collect()
}

/// Hourly totals for working days and for the remaining days.
/// Records without an hour are ignored; hours with no records are absent.
pub fn summarize_hourly_by_daytype(records: &[RentalRecord]) -> HourlySeries {
    let mut working: BTreeMap<u8, u64> = BTreeMap::new();
    let mut weekend: BTreeMap<u8, u64> = BTreeMap::new();

    for record in records {
        let Some(hour) = record.hour else {
            continue;
        };
        let partition = if record.working_day {
            &mut working
        } else {
            &mut weekend
        };
        *partition.entry(hour).or_insert(0) += u64::from(record.total);
    }

    let to_points = |groups: BTreeMap<u8, u64>| {
        groups
            .into_iter()
            .map(|(hour, total)| HourPoint { hour, total })
            .collect::<Vec<_>>()
    };

    HourlySeries {
        working: to_points(working),
        weekend: to_points(weekend),
    }
}
