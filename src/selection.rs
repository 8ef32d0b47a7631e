// Selection & Render Cycle
//
// A selection is the year + inclusive date range chosen by the user.
// Each change rebuilds the whole DashboardView from the immutable dataset.

use crate::aggregator::{
    filter_by_year_and_range, summarize_by_holiday, summarize_by_weather,
    summarize_hourly_by_daytype, totals, HolidayUsage, HourlySeries, UsageTotals, WeatherUsage,
};
use crate::config::ChartScope;
use crate::loader::Dataset;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

pub const EMPTY_SELECTION_WARNING: &str = "No data for the selected year and date range.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub year: i32,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Selection {
    /// Most recent year, full date span of the daily table.
    /// `None` when the daily table is empty.
    pub fn default_for(dataset: &Dataset) -> Option<Selection> {
        let year = *dataset.years().last()?;
        let (start, end) = dataset.date_span()?;
        Some(Selection { year, start, end })
    }

    /// Keep both dates inside the span the picker offers
    pub fn clamp_to(self, dataset: &Dataset) -> Selection {
        match dataset.date_span() {
            Some((min, max)) => Selection {
                year: self.year,
                start: self.start.clamp(min, max),
                end: self.end.clamp(min, max),
            },
            None => self,
        }
    }

    pub fn next_year(&mut self, years: &[i32]) {
        if let Some(year) = cycle(years, self.year, 1) {
            self.year = year;
        }
    }

    pub fn previous_year(&mut self, years: &[i32]) {
        if let Some(year) = cycle(years, self.year, -1) {
            self.year = year;
        }
    }

    /// Move the start date by `days`, staying within `span`
    pub fn shift_start(&mut self, days: i64, span: (NaiveDate, NaiveDate)) {
        self.start = shift(self.start, days, span);
    }

    /// Move the end date by `days`, staying within `span`
    pub fn shift_end(&mut self, days: i64, span: (NaiveDate, NaiveDate)) {
        self.end = shift(self.end, days, span);
    }
}

fn cycle(years: &[i32], current: i32, step: isize) -> Option<i32> {
    if years.is_empty() {
        return None;
    }
    let len = years.len() as isize;
    let next = match years.iter().position(|y| *y == current) {
        Some(i) => (i as isize + step).rem_euclid(len),
        None => len - 1,
    };
    years.get(next as usize).copied()
}

fn shift(date: NaiveDate, days: i64, (min, max): (NaiveDate, NaiveDate)) -> NaiveDate {
    date.checked_add_signed(Duration::days(days))
        .unwrap_or(date)
        .clamp(min, max)
}

// ============================================================================
// DASHBOARD VIEW
// ============================================================================

/// Everything drawn for a non-empty selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub selection: Selection,
    pub chart_scope: ChartScope,
    pub totals: UsageTotals,
    pub weather: Vec<WeatherUsage>,
    pub holiday: Vec<HolidayUsage>,
    pub hourly: HourlySeries,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DashboardView {
    /// Nothing matched; shown as a warning with no charts
    Empty { selection: Selection, message: String },
    Report(Report),
}

impl DashboardView {
    pub fn build(dataset: &Dataset, selection: &Selection, scope: ChartScope) -> DashboardView {
        let daily = filter_by_year_and_range(
            &dataset.daily,
            selection.year,
            selection.start,
            selection.end,
        );

        if daily.is_empty() {
            log::debug!("empty selection {:?}", selection);
            return DashboardView::Empty {
                selection: *selection,
                message: EMPTY_SELECTION_WARNING.to_string(),
            };
        }

        let (weather, holiday, hourly) = match scope {
            ChartScope::Selection => {
                let hourly = filter_by_year_and_range(
                    &dataset.hourly,
                    selection.year,
                    selection.start,
                    selection.end,
                );
                (
                    summarize_by_weather(&daily),
                    summarize_by_holiday(&daily),
                    summarize_hourly_by_daytype(&hourly),
                )
            }
            ChartScope::All => (
                summarize_by_weather(&dataset.daily),
                summarize_by_holiday(&dataset.daily),
                summarize_hourly_by_daytype(&dataset.hourly),
            ),
        };

        DashboardView::Report(Report {
            selection: *selection,
            chart_scope: scope,
            totals: totals(&daily),
            weather,
            holiday,
            hourly,
        })
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, DashboardView::Empty { .. })
    }

    pub fn selection(&self) -> &Selection {
        match self {
            DashboardView::Empty { selection, .. } => selection,
            DashboardView::Report(report) => &report.selection,
        }
    }
}
