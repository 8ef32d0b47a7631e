use crate::config::DataPaths;
use crate::record::{RentalRecord, Season, WeatherSituation};
use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

/// Column layout shared by `day.csv` and `hour.csv`.
/// Columns not listed here (instant, yr, mnth, weekday, temp, ...) are ignored.
#[derive(Debug, Deserialize)]
struct RawRow {
    dteday: String,
    season: u8,
    holiday: u8,
    workingday: u8,
    weathersit: u8,
    #[serde(default)]
    hr: Option<u8>,
    casual: u32,
    registered: u32,
    cnt: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Table {
    Daily,
    Hourly,
}

fn parse_flag(value: u8, column: &str) -> Result<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => bail!("{} must be 0 or 1, got {}", column, other),
    }
}

impl RawRow {
    fn into_record(self, table: Table) -> Result<RentalRecord> {
        let date = NaiveDate::parse_from_str(&self.dteday, "%Y-%m-%d")
            .with_context(|| format!("Invalid dteday '{}'", self.dteday))?;
        let season = Season::from_code(self.season)
            .ok_or_else(|| anyhow!("Unknown season code {}", self.season))?;
        let weather = WeatherSituation::from_code(self.weathersit)
            .ok_or_else(|| anyhow!("Unknown weathersit code {}", self.weathersit))?;

        let hour = match (table, self.hr) {
            (Table::Daily, _) => None,
            (Table::Hourly, Some(hr)) if hr <= 23 => Some(hr),
            (Table::Hourly, Some(hr)) => bail!("hr must be within 0-23, got {}", hr),
            (Table::Hourly, None) => bail!("Hourly row is missing hr"),
        };

        Ok(RentalRecord {
            date,
            season,
            weather,
            holiday: parse_flag(self.holiday, "holiday")?,
            working_day: parse_flag(self.workingday, "workingday")?,
            hour,
            casual: self.casual,
            registered: self.registered,
            total: self.cnt,
        })
    }
}

fn read_table<R: Read>(reader: R, table: Table) -> Result<Vec<RentalRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut records = Vec::new();

    for (index, result) in rdr.deserialize::<RawRow>().enumerate() {
        // +2: header line and 1-based numbering
        let line = index + 2;
        let raw = result.with_context(|| format!("Failed to deserialize row at line {}", line))?;
        let record = raw
            .into_record(table)
            .with_context(|| format!("Invalid row at line {}", line))?;

        if !record.is_consistent() {
            log::warn!(
                "line {}: cnt {} != casual {} + registered {}",
                line,
                record.total,
                record.casual,
                record.registered
            );
        }

        records.push(record);
    }

    Ok(records)
}

/// Read daily records (`day.csv` layout) from any reader
pub fn read_daily<R: Read>(reader: R) -> Result<Vec<RentalRecord>> {
    read_table(reader, Table::Daily)
}

/// Read hourly records (`hour.csv` layout) from any reader
pub fn read_hourly<R: Read>(reader: R) -> Result<Vec<RentalRecord>> {
    read_table(reader, Table::Hourly)
}

pub fn load_daily(path: &Path) -> Result<Vec<RentalRecord>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open daily CSV {}", path.display()))?;
    let records = read_daily(file).with_context(|| format!("Failed to load {}", path.display()))?;
    log::info!("loaded {} daily records from {}", records.len(), path.display());
    Ok(records)
}

pub fn load_hourly(path: &Path) -> Result<Vec<RentalRecord>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open hourly CSV {}", path.display()))?;
    let records = read_hourly(file).with_context(|| format!("Failed to load {}", path.display()))?;
    log::info!("loaded {} hourly records from {}", records.len(), path.display());
    Ok(records)
}

// ============================================================================
// DATASET
// ============================================================================

/// Both tables, loaded once and shared read-only with every consumer
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub daily: Vec<RentalRecord>,
    pub hourly: Vec<RentalRecord>,
}

impl Dataset {
    pub fn new(daily: Vec<RentalRecord>, hourly: Vec<RentalRecord>) -> Self {
        Self { daily, hourly }
    }

    pub fn load(paths: &DataPaths) -> Result<Self> {
        let daily = load_daily(&paths.daily)?;
        let hourly = load_hourly(&paths.hourly)?;
        Ok(Self::new(daily, hourly))
    }

    /// Distinct years of the daily table, ascending
    pub fn years(&self) -> Vec<i32> {
        self.daily
            .iter()
            .map(|r| r.year())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Earliest and latest date of the daily table
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.daily.iter().map(|r| r.date).min()?;
        let max = self.daily.iter().map(|r| r.date).max()?;
        Some((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY_CSV: &str = "\
instant,dteday,season,yr,mnth,holiday,weekday,workingday,weathersit,temp,atemp,hum,windspeed,casual,registered,cnt
1,2011-01-01,1,0,1,0,6,0,2,0.344167,0.363625,0.805833,0.160446,331,654,985
2,2011-01-02,1,0,1,0,0,0,2,0.363478,0.353739,0.696087,0.248539,131,670,801
3,2012-12-31,1,1,12,0,1,1,1,0.215833,0.223487,0.5775,0.154846,439,2290,2729
";

    const HOUR_CSV: &str = "\
instant,dteday,season,yr,mnth,hr,holiday,weekday,workingday,weathersit,temp,atemp,hum,windspeed,casual,registered,cnt
1,2011-01-01,1,0,1,0,0,6,0,1,0.24,0.2879,0.81,0,3,13,16
2,2011-01-01,1,0,1,1,0,6,0,1,0.22,0.2727,0.8,0,8,32,40
";

    #[test]
    fn test_read_daily() {
        let records = read_daily(DAY_CSV.as_bytes()).unwrap();

        assert_eq!(records.len(), 3);
        let first = &records[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2011, 1, 1).unwrap());
        assert_eq!(first.season, Season::Spring);
        assert_eq!(first.weather, WeatherSituation::Mist);
        assert!(!first.holiday);
        assert!(!first.working_day);
        assert_eq!(first.hour, None);
        assert_eq!((first.casual, first.registered, first.total), (331, 654, 985));
        assert!(records[2].working_day);
    }

    #[test]
    fn test_read_hourly() {
        let records = read_hourly(HOUR_CSV.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].hour, Some(0));
        assert_eq!(records[1].hour, Some(1));
        assert_eq!(records[1].total, 40);
    }

    #[test]
    fn test_hourly_requires_hr() {
        let err = read_hourly(DAY_CSV.as_bytes()).unwrap_err();
        assert!(format!("{:#}", err).contains("missing hr"));
    }

    #[test]
    fn test_rejects_hour_out_of_range() {
        let csv = "dteday,season,hr,holiday,workingday,weathersit,casual,registered,cnt\n\
                   2011-01-01,1,24,0,0,1,1,1,2\n";
        let err = read_hourly(csv.as_bytes()).unwrap_err();
        assert!(format!("{:#}", err).contains("0-23"));
    }

    #[test]
    fn test_rejects_unknown_weather_code() {
        let csv = "dteday,season,holiday,workingday,weathersit,casual,registered,cnt\n\
                   2011-01-01,1,0,0,7,1,1,2\n";
        let err = read_daily(csv.as_bytes()).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("line 2"));
        assert!(message.contains("weathersit"));
    }

    #[test]
    fn test_rejects_bad_date() {
        let csv = "dteday,season,holiday,workingday,weathersit,casual,registered,cnt\n\
                   01/01/2011,1,0,0,1,1,1,2\n";
        assert!(read_daily(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_inconsistent_count_is_kept() {
        let csv = "dteday,season,holiday,workingday,weathersit,casual,registered,cnt\n\
                   2011-01-01,1,0,0,1,1,1,5\n";
        let records = read_daily(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert!(!records[0].is_consistent());
    }

    #[test]
    fn test_dataset_years_and_span() {
        let dataset = Dataset::new(read_daily(DAY_CSV.as_bytes()).unwrap(), Vec::new());

        assert_eq!(dataset.years(), vec![2011, 2012]);
        assert_eq!(
            dataset.date_span(),
            Some((
                NaiveDate::from_ymd_opt(2011, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2012, 12, 31).unwrap()
            ))
        );

        let empty = Dataset::default();
        assert!(empty.years().is_empty());
        assert_eq!(empty.date_span(), None);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_daily(Path::new("/nonexistent/day.csv")).unwrap_err();
        assert!(err.to_string().contains("Failed to open daily CSV"));
    }
}
