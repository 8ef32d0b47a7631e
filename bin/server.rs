// Bike Rental Dashboard - Web Server
// JSON API over the same aggregations the terminal dashboard draws

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use bike_dashboard::{ChartScope, Config, DashboardView, Dataset, Selection};
use chrono::NaiveDate;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

#[derive(Debug, Parser)]
#[command(name = "bike-server", version, about = "Bike rental dashboard JSON API")]
struct Cli {
    /// YAML config file (defaults to .bike-dashboard.yml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address, overrides server.addr
    #[arg(long)]
    addr: Option<String>,
}

/// Shared application state. The dataset is immutable after startup.
#[derive(Clone)]
struct AppState {
    dataset: Arc<Dataset>,
    scope: ChartScope,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Serialize)]
struct YearsResponse {
    years: Vec<i32>,
    default_year: Option<i32>,
    min_date: Option<NaiveDate>,
    max_date: Option<NaiveDate>,
}

/// Query string for /api/dashboard. Dates stay strings so a bad value
/// is reported in the response body instead of a bare rejection.
#[derive(Debug, Default, Deserialize)]
struct DashboardQuery {
    year: Option<i32>,
    start: Option<String>,
    end: Option<String>,
}

fn parse_date(value: &str, field: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("Invalid {} '{}': {}", field, value, e))
}

impl DashboardQuery {
    fn selection(&self, dataset: &Dataset) -> Result<Selection, String> {
        let mut selection = Selection::default_for(dataset)
            .ok_or_else(|| "Daily table has no records".to_string())?;
        if let Some(year) = self.year {
            selection.year = year;
        }
        if let Some(start) = &self.start {
            selection.start = parse_date(start, "start")?;
        }
        if let Some(end) = &self.end {
            selection.end = parse_date(end, "end")?;
        }
        Ok(selection.clamp_to(dataset))
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/years - Year choices and the date picker bounds
async fn get_years(State(state): State<AppState>) -> impl IntoResponse {
    let years = state.dataset.years();
    let span = state.dataset.date_span();

    Json(ApiResponse::ok(YearsResponse {
        default_year: years.last().copied(),
        years,
        min_date: span.map(|(min, _)| min),
        max_date: span.map(|(_, max)| max),
    }))
}

/// GET /api/dashboard?year=&start=&end= - Metrics and chart data for a selection
async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> impl IntoResponse {
    match query.selection(&state.dataset) {
        Ok(selection) => {
            let view = DashboardView::build(&state.dataset, &selection, state.scope);
            (StatusCode::OK, Json(ApiResponse::ok(view))).into_response()
        }
        Err(e) => {
            log::warn!("rejected dashboard query {:?}: {}", query, e);
            (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<DashboardView>::err(e)),
            )
                .into_response()
        }
    }
}

fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/years", get(get_years))
        .route("/dashboard", get(get_dashboard))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    println!("🌐 Bike Rental Dashboard - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let dataset = Dataset::load(&config.data)?;
    println!(
        "✓ Loaded {} daily and {} hourly records",
        dataset.daily.len(),
        dataset.hourly.len()
    );

    let state = AppState {
        dataset: Arc::new(dataset),
        scope: config.chart_scope,
    };
    let app = build_router(state);

    let addr = cli.addr.unwrap_or(config.server.addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: http://{}/api/dashboard", addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use bike_dashboard::read_daily;
    use tower::ServiceExt;

    const DAY_CSV: &str = "\
dteday,season,holiday,workingday,weathersit,casual,registered,cnt
2011-01-01,1,0,0,2,331,654,985
2012-07-04,3,1,0,1,3065,2978,6043
";

    fn router() -> Router {
        let dataset = Dataset::new(read_daily(DAY_CSV.as_bytes()).unwrap(), Vec::new());
        build_router(AppState {
            dataset: Arc::new(dataset),
            scope: ChartScope::Selection,
        })
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_json("/api/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], "OK");
    }

    #[tokio::test]
    async fn test_years() {
        let (status, body) = get_json("/api/years").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["years"], serde_json::json!([2011, 2012]));
        assert_eq!(body["data"]["default_year"], 2012);
        assert_eq!(body["data"]["min_date"], "2011-01-01");
        assert_eq!(body["data"]["max_date"], "2012-07-04");
    }

    #[tokio::test]
    async fn test_dashboard_defaults() {
        let (status, body) = get_json("/api/dashboard").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "report");
        assert_eq!(body["data"]["selection"]["year"], 2012);
        assert_eq!(body["data"]["totals"]["total"], 6043);
        assert_eq!(body["data"]["holiday"][0]["label"], "Holiday");
    }

    #[tokio::test]
    async fn test_dashboard_empty_selection() {
        let (status, body) = get_json("/api/dashboard?year=2011&start=2012-01-01").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "empty");
    }

    #[tokio::test]
    async fn test_dashboard_rejects_bad_date() {
        let (status, body) = get_json("/api/dashboard?start=01-01-2011").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("Invalid start"));
    }
}
