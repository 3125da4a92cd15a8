// Cannabis Registry Dashboard - Web Server
// One dashboard session served over a small JSON API + a static page

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use registry_dashboard::{
    DashboardConfig, DashboardView, SelectionState, SessionContext, ValidationError, Widget,
};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Shared application state
#[derive(Clone)]
struct AppState {
    session: Arc<Mutex<SessionContext>>,
}

impl AppState {
    fn session(&self) -> MutexGuard<'_, SessionContext> {
        // Selection writes are single assignments; a poisoned lock is still consistent
        self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Response {
        (
            StatusCode::OK,
            Json(Self {
                success: true,
                data: Some(data),
                error: None,
            }),
        )
            .into_response()
    }
}

fn failure(status: StatusCode, message: String) -> Response {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(message),
        }),
    )
        .into_response()
}

/// Ready widgets answer 200, failed widgets 422 with the reason
fn widget_response<T: Serialize>(widget: Widget<T>) -> Response {
    match widget {
        Widget::Ready { data } => ApiResponse::ok(data),
        Widget::Failed { message } => failure(StatusCode::UNPROCESSABLE_ENTITY, message),
    }
}

fn validation_response(err: ValidationError) -> Response {
    warn!("rejected selection: {}", err);
    failure(StatusCode::BAD_REQUEST, err.to_string())
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    ApiResponse::ok("OK")
}

/// GET /api/dashboard - Every widget in one pass
async fn get_dashboard(State(state): State<AppState>) -> Response {
    let view: DashboardView = state.session().render();
    ApiResponse::ok(view)
}

/// GET /api/charts/status - License status bar chart
async fn get_status_chart(State(state): State<AppState>) -> Response {
    widget_response(state.session().render().status_bar)
}

/// GET /api/charts/categories - License category pie chart
async fn get_category_chart(State(state): State<AppState>) -> Response {
    widget_response(state.session().render().category_pie)
}

/// GET /api/charts/equity - Equity program bar chart
async fn get_equity_chart(State(state): State<AppState>) -> Response {
    widget_response(state.session().render().equity_bar)
}

/// GET /api/map - Scatter layer with tooltips
async fn get_map(State(state): State<AppState>) -> Response {
    widget_response(state.session().render().map)
}

/// GET /api/selection - Current dropdown and radio values
async fn get_selection(State(state): State<AppState>) -> Response {
    let selection: SelectionState = *state.session().selection();
    ApiResponse::ok(selection)
}

/// POST /api/selection/category/:value - Dropdown change
async fn set_category(State(state): State<AppState>, Path(value): Path<String>) -> Response {
    // Path has already percent-decoded the segment
    let mut session = state.session();

    match session.set_selected_category(&value) {
        Ok(()) => ApiResponse::ok(session.render()),
        Err(e) => validation_response(e),
    }
}

/// POST /api/selection/status/:value - Radio change
async fn set_status(State(state): State<AppState>, Path(value): Path<String>) -> Response {
    let mut session = state.session();

    match session.set_selected_status(&value) {
        Ok(()) => ApiResponse::ok(session.render()),
        Err(e) => validation_response(e),
    }
}

/// GET / - Serve index.html
const INDEX_HTML: &str = include_str!("../web/index.html");

async fn serve_index() -> impl IntoResponse {
    Html(INDEX_HTML)
}

// ============================================================================
// Main Server
// ============================================================================

fn build_router(state: AppState, config: &DashboardConfig) -> Router {
    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/dashboard", get(get_dashboard))
        .route("/charts/status", get(get_status_chart))
        .route("/charts/categories", get(get_category_chart))
        .route("/charts/equity", get(get_equity_chart))
        .route("/map", get(get_map))
        .route("/selection", get(get_selection))
        .route("/selection/category/:value", post(set_category))
        .route("/selection/status/:value", post(set_status))
        .with_state(state);

    // Build main router
    Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .route_service("/banner", ServeFile::new(&config.data.banner_path))
        .nest_service("/static", ServeDir::new(&config.server.static_dir))
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")?;

    println!("🌐 Cannabis Registry Dashboard - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = DashboardConfig::load().context("Failed to load dashboard.toml")?;
    let bind = config.server.bind.clone();

    let session = match SessionContext::open(config) {
        Ok(session) => session,
        Err(e) => {
            error!("{}", e);
            eprintln!("❌ {}", e);
            eprintln!("   Place the registry CSV next to the binary or set [data] csv_path in dashboard.toml");
            std::process::exit(1);
        }
    };
    println!("✓ Loaded {} registries", session.dataset().len());

    let router_config = session.config().clone();
    let state = AppState {
        session: Arc::new(Mutex::new(session)),
    };
    let app = build_router(state, &router_config);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind to {}", bind))?;

    info!("listening on {}", bind);
    println!("\n🚀 Server running on http://{}", bind);
    println!("   API: http://{}/api/dashboard", bind);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use registry_dashboard::{Dataset, RegistryRecord};

    fn state() -> AppState {
        let records = vec![
            RegistryRecord {
                license_status: Some("Active".to_string()),
                license_category: Some("Retail".to_string()),
                equity_program_designation: Some("Y".to_string()),
                ..Default::default()
            },
        ];
        AppState {
            session: Arc::new(Mutex::new(SessionContext::new(
                Dataset::from_records(records),
                DashboardConfig::default(),
            ))),
        }
    }

    #[tokio::test]
    async fn test_path_value_used_as_given() {
        let state = state();
        let response = set_category(State(state.clone()), Path("Co-Located".to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);

        // A literal '%' arrives already decoded and must not be decoded again
        let response = set_category(State(state.clone()), Path("Retail%20".to_string())).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            state.session().selection().selected_category(),
            registry_dashboard::LicenseCategory::CoLocated
        );
    }

    #[tokio::test]
    async fn test_invalid_status_is_bad_request() {
        let state = state();
        let response = set_status(State(state.clone()), Path("Suspended".to_string())).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            state.session().selection().selected_status(),
            registry_dashboard::LicenseStatus::Inactive
        );
    }

    #[tokio::test]
    async fn test_category_change_applies() {
        let state = state();
        let response = set_category(State(state.clone()), Path("Medical".to_string())).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            state.session().selection().selected_category(),
            registry_dashboard::LicenseCategory::Medical
        );
    }

    #[tokio::test]
    async fn test_failed_widget_is_unprocessable() {
        // Only 'Y' rows, so the equity chart cannot be built
        let response = get_equity_chart(State(state())).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = get_status_chart(State(state())).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_index_inserts_api_values_as_text() {
        assert!(!INDEX_HTML.contains("innerHTML"));
        assert!(!INDEX_HTML.contains("insertAdjacentHTML"));
        assert!(INDEX_HTML.contains("p.tooltip"));
        assert!(INDEX_HTML.contains("view.dataset"));
    }

    #[tokio::test]
    async fn test_dashboard_carries_dataset_origin() {
        let state = state();
        let expected = state.session().dataset().loaded_at;
        let view = state.session().render();

        assert_eq!(view.dataset.loaded_at, expected);
        assert_eq!(view.dataset.source, None);

        let response = get_dashboard(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
