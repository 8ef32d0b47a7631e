// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Write as _;
use std::path::PathBuf;

use bike_dashboard::{ChartScope, Config, DashboardView, Dataset, Selection};

#[derive(Debug, Parser)]
#[command(name = "bike-dashboard", version, about = "Bike rental usage dashboard")]
struct Cli {
    /// YAML config file (defaults to .bike-dashboard.yml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Daily table (day.csv)
    #[arg(long, global = true)]
    daily: Option<PathBuf>,

    /// Hourly table (hour.csv)
    #[arg(long, global = true)]
    hourly: Option<PathBuf>,

    /// Year to show (defaults to the most recent one)
    #[arg(long, global = true)]
    year: Option<i32>,

    /// First date of the range, YYYY-MM-DD
    #[arg(long, global = true)]
    start: Option<NaiveDate>,

    /// Last date of the range, YYYY-MM-DD
    #[arg(long, global = true)]
    end: Option<NaiveDate>,

    /// Rows used for the charts
    #[arg(long, global = true, value_enum)]
    scope: Option<ChartScope>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive terminal dashboard (default)
    Dashboard,
    /// Print the dashboard for the selection and exit
    Report {
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(daily) = &cli.daily {
        config.data.daily = daily.clone();
    }
    if let Some(hourly) = &cli.hourly {
        config.data.hourly = hourly.clone();
    }
    if let Some(scope) = cli.scope {
        config.chart_scope = scope;
    }

    let dataset = Dataset::load(&config.data)?;
    let selection = initial_selection(&dataset, &cli)?;

    match cli.command.unwrap_or(Command::Dashboard) {
        Command::Dashboard => run_ui_mode(dataset, selection, config.chart_scope)?,
        Command::Report { format } => {
            let view = DashboardView::build(&dataset, &selection, config.chart_scope);
            match format {
                ReportFormat::Text => print!("{}", render_text(&view, dataset.date_span())),
                ReportFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&view).context("Failed to serialize report")?
                ),
            }
        }
    }

    Ok(())
}

fn initial_selection(dataset: &Dataset, cli: &Cli) -> Result<Selection> {
    let mut selection = Selection::default_for(dataset).context("Daily table has no records")?;
    if let Some(year) = cli.year {
        selection.year = year;
    }
    if let Some(start) = cli.start {
        selection.start = start;
    }
    if let Some(end) = cli.end {
        selection.end = end;
    }
    Ok(selection.clamp_to(dataset))
}

#[cfg(feature = "tui")]
fn run_ui_mode(dataset: Dataset, selection: Selection, scope: ChartScope) -> Result<()> {
    println!("🚲 Loaded {} daily and {} hourly records", dataset.daily.len(), dataset.hourly.len());
    println!("Starting dashboard... (Press 'q' to quit)\n");

    let mut app = ui::App::new(dataset, selection, scope);
    ui::run_ui(&mut app)?;

    println!("\n✅ Dashboard closed");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_dataset: Dataset, _selection: Selection, _scope: ChartScope) -> Result<()> {
    eprintln!("❌ Dashboard mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or print a report: bike-dashboard report");
    std::process::exit(1);
}

fn render_text(view: &DashboardView, span: Option<(NaiveDate, NaiveDate)>) -> String {
    let mut out = String::new();
    let selection = view.selection();

    let _ = writeln!(out, "🚲 Bike Rental Dashboard");
    let _ = writeln!(out, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    let _ = writeln!(
        out,
        "Year: {}  Range: {} → {}",
        selection.year, selection.start, selection.end
    );
    if let Some((min, max)) = span {
        let _ = writeln!(out, "Available: {} → {}", min, max);
    }
    let _ = writeln!(out);

    let report = match view {
        DashboardView::Empty { message, .. } => {
            let _ = writeln!(out, "⚠️  {}", message);
            return out;
        }
        DashboardView::Report(report) => report,
    };

    let _ = writeln!(out, "Casual users:     {:>10}", report.totals.casual);
    let _ = writeln!(out, "Registered users: {:>10}", report.totals.registered);
    let _ = writeln!(out, "Total rentals:    {:>10}", report.totals.total);

    let _ = writeln!(out, "\nUsage by weather");
    let _ = writeln!(out, "  {:<18} {:>10} {:>10} {:>10}", "Weather", "Casual", "Registered", "Total");
    for row in &report.weather {
        let _ = writeln!(
            out,
            "  {:<18} {:>10} {:>10} {:>10}",
            row.label, row.usage.casual, row.usage.registered, row.usage.total
        );
    }

    let _ = writeln!(out, "\nHoliday vs working day");
    for row in &report.holiday {
        let _ = writeln!(out, "  {:<18} {:>10}", row.label, row.usage.total);
    }

    let _ = writeln!(out, "\nHourly usage");
    let _ = writeln!(out, "  {:>4} {:>12} {:>12}", "Hour", "Working day", "Weekend");
    for hour in 0..24u8 {
        let working = report.hourly.working.iter().find(|p| p.hour == hour);
        let weekend = report.hourly.weekend.iter().find(|p| p.hour == hour);
        if working.is_none() && weekend.is_none() {
            continue;
        }
        let cell = |p: Option<&bike_dashboard::HourPoint>| {
            p.map(|p| p.total.to_string()).unwrap_or_else(|| "-".to_string())
        };
        let _ = writeln!(out, "  {:>4} {:>12} {:>12}", hour, cell(working), cell(weekend));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bike_dashboard::read_daily;

    const DAY_CSV: &str = "\
dteday,season,holiday,workingday,weathersit,casual,registered,cnt
2011-01-01,1,0,0,2,331,654,985
2012-07-04,3,1,0,1,3065,2978,6043
";

    fn dataset() -> Dataset {
        Dataset::new(read_daily(DAY_CSV.as_bytes()).unwrap(), Vec::new())
    }

    #[test]
    fn test_cli_parses_report_flags() {
        let cli = Cli::try_parse_from([
            "bike-dashboard",
            "report",
            "--format",
            "json",
            "--year",
            "2011",
            "--start",
            "2011-01-01",
            "--scope",
            "all",
        ])
        .unwrap();

        assert_eq!(cli.year, Some(2011));
        assert_eq!(cli.start, NaiveDate::from_ymd_opt(2011, 1, 1));
        assert_eq!(cli.scope, Some(ChartScope::All));
        assert!(matches!(cli.command, Some(Command::Report { format: ReportFormat::Json })));
    }

    #[test]
    fn test_initial_selection_applies_overrides() {
        let cli = Cli::try_parse_from(["bike-dashboard", "--year", "2011", "--end", "2030-01-01"]).unwrap();

        let selection = initial_selection(&dataset(), &cli).unwrap();

        assert_eq!(selection.year, 2011);
        assert_eq!(selection.start, NaiveDate::from_ymd_opt(2011, 1, 1).unwrap());
        // Clamped to the last available date
        assert_eq!(selection.end, NaiveDate::from_ymd_opt(2012, 7, 4).unwrap());
    }

    #[test]
    fn test_render_text_report() {
        let dataset = dataset();
        let selection = Selection::default_for(&dataset).unwrap();
        let view = DashboardView::build(&dataset, &selection, ChartScope::Selection);

        let text = render_text(&view, dataset.date_span());

        assert!(text.contains("Year: 2012"));
        assert!(text.contains("Total rentals:"));
        assert!(text.contains("6043"));
        assert!(text.contains("Holiday"));
    }

    #[test]
    fn test_render_text_empty_selection() {
        let dataset = dataset();
        let mut selection = Selection::default_for(&dataset).unwrap();
        selection.end = NaiveDate::from_ymd_opt(2012, 1, 1).unwrap();
        let view = DashboardView::build(&dataset, &selection, ChartScope::Selection);

        let text = render_text(&view, dataset.date_span());

        assert!(text.contains(bike_dashboard::EMPTY_SELECTION_WARNING));
        assert!(!text.contains("Usage by weather"));
    }
}
