// Rental Records - one observation row of the daily or hourly table
//
// Records are built once by the loader and never mutated afterwards.
// Every aggregation produces a new collection.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

// ============================================================================
// LABEL TABLES
// ============================================================================

/// Display labels for weather situation codes (1-4)
pub const WEATHER_LABELS: [(u8, &str); 4] = [
    (1, "Clear/Few Clouds"),
    (2, "Mist/Cloudy"),
    (3, "Light Rain/Snow"),
    (4, "Heavy Rain/Snow"),
];

/// Display labels for season codes (1-4)
pub const SEASON_LABELS: [(u8, &str); 4] = [
    (1, "Spring"),
    (2, "Summer"),
    (3, "Fall"),
    (4, "Winter"),
];

/// Display labels for the holiday flag, indexed by `holiday as usize`
pub const DAY_TYPE_LABELS: [&str; 2] = ["Working Day", "Holiday"];

fn lookup(table: &[(u8, &'static str)], code: u8) -> &'static str {
    table
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
        .unwrap_or("Unknown")
}

// ============================================================================
// CATEGORICAL CODES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherSituation {
    Clear,
    Mist,
    LightPrecipitation,
    HeavyPrecipitation,
}

impl WeatherSituation {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(WeatherSituation::Clear),
            2 => Some(WeatherSituation::Mist),
            3 => Some(WeatherSituation::LightPrecipitation),
            4 => Some(WeatherSituation::HeavyPrecipitation),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            WeatherSituation::Clear => 1,
            WeatherSituation::Mist => 2,
            WeatherSituation::LightPrecipitation => 3,
            WeatherSituation::HeavyPrecipitation => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        lookup(&WEATHER_LABELS, self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Season::Spring),
            2 => Some(Season::Summer),
            3 => Some(Season::Fall),
            4 => Some(Season::Winter),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Season::Spring => 1,
            Season::Summer => 2,
            Season::Fall => 3,
            Season::Winter => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        lookup(&SEASON_LABELS, self.code())
    }
}

/// Label for a holiday flag ("Working Day" / "Holiday")
pub fn day_type_label(holiday: bool) -> &'static str {
    DAY_TYPE_LABELS[holiday as usize]
}

// ============================================================================
// RENTAL RECORD
// ============================================================================

/// One row of either table. `hour` is only present for hourly records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalRecord {
    pub date: NaiveDate,
    pub season: Season,
    pub weather: WeatherSituation,
    pub holiday: bool,
    pub working_day: bool,
    pub hour: Option<u8>,
    pub casual: u32,
    pub registered: u32,
    pub total: u32,
}

impl RentalRecord {
    /// Calendar year of the observation
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// `total == casual + registered`
    pub fn is_consistent(&self) -> bool {
        u64::from(self.total) == u64::from(self.casual) + u64::from(self.registered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_codes_and_labels() {
        for (code, label) in WEATHER_LABELS {
            let weather = WeatherSituation::from_code(code).unwrap();
            assert_eq!(weather.code(), code);
            assert_eq!(weather.label(), label);
        }
        assert_eq!(WeatherSituation::from_code(0), None);
        assert_eq!(WeatherSituation::from_code(5), None);
    }

    #[test]
    fn test_season_labels_are_not_weather_labels() {
        assert_eq!(Season::Spring.label(), "Spring");
        assert_eq!(Season::Fall.label(), "Fall");
        for season in [Season::Spring, Season::Summer, Season::Fall, Season::Winter] {
            assert!(WEATHER_LABELS.iter().all(|(_, l)| *l != season.label()));
            assert_eq!(Season::from_code(season.code()), Some(season));
        }
    }

    #[test]
    fn test_day_type_label() {
        assert_eq!(day_type_label(false), "Working Day");
        assert_eq!(day_type_label(true), "Holiday");
    }

    #[test]
    fn test_year_and_consistency() {
        let mut record = RentalRecord {
            date: NaiveDate::from_ymd_opt(2012, 3, 14).unwrap(),
            season: Season::Spring,
            weather: WeatherSituation::Clear,
            holiday: false,
            working_day: true,
            hour: None,
            casual: 120,
            registered: 880,
            total: 1000,
        };
        assert_eq!(record.year(), 2012);
        assert!(record.is_consistent());

        record.total = 999;
        assert!(!record.is_consistent());
    }
}
