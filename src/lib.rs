// Bike Rental Dashboard - Core Library
// Exposes all modules for use in the terminal dashboard, API server, and tests

pub mod aggregator;
pub mod config;
pub mod loader;
pub mod record;
pub mod selection;

// Re-export commonly used types
pub use aggregator::{
    filter_by_year_and_range, summarize_by_holiday, summarize_by_weather,
    summarize_hourly_by_daytype, totals,
    HolidayUsage, HourPoint, HourlySeries, UsageTotals, WeatherUsage,
};
pub use config::{ChartScope, Config, DataPaths, ServerConfig, DEFAULT_CONFIG_FILE};
pub use loader::{load_daily, load_hourly, read_daily, read_hourly, Dataset};
pub use record::{
    day_type_label, RentalRecord, Season, WeatherSituation,
    DAY_TYPE_LABELS, SEASON_LABELS, WEATHER_LABELS,
};
pub use selection::{DashboardView, Report, Selection, EMPTY_SELECTION_WARNING};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
