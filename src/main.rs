use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router, serve};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use delivery_planner::config::PlannerConfig;
use delivery_planner::error::PlanError;
use delivery_planner::plan::Plan;
use delivery_planner::planner::OsrmPlanner;
use delivery_planner::request::PlanRequest;

type AppState = Arc<OsrmPlanner>;

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: &'static str,
    details: String,
}

struct ApiError(PlanError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorBody {
            error: self.0.code(),
            message: self.0.message(),
            details: self.0.details(),
        };
        (status, Json(body)).into_response()
    }
}

async fn solve_handler(
    State(planner): State<AppState>,
    payload: Result<Json<PlanRequest>, JsonRejection>,
) -> Result<Json<Plan>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        info!(status = %rejection.status(), "rejected plan request body");
        ApiError(PlanError::InvalidInput(rejection.body_text()))
    })?;
    info!(
        orders = request.orders.len(),
        vehicles = request.num_vehicles,
        capacity = request.vehicle_capacity,
        "plan request"
    );

    // the OSRM client and the solver block, keep them off the async workers
    let result = tokio::task::spawn_blocking(move || planner.plan(&request))
        .await
        .map_err(|err| ApiError(PlanError::Unexpected(err.to_string())))?;

    result.map(Json).map_err(|err| {
        error!(code = err.code(), error = %err, "plan request failed");
        ApiError(err)
    })
}

async fn health_handler() -> &'static str {
    "ok"
}

fn router(planner: AppState) -> Router {
    let cors_layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .route("/solve", post(solve_handler))
        .route("/health", get(health_handler))
        .layer(cors_layer)
        .with_state(planner)
}

fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = PlannerConfig::from_env();
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:5000".to_string());

    // the blocking HTTP client must be built and dropped outside the runtime
    let planner = Arc::new(OsrmPlanner::from_config(config).expect("build OSRM client"));
    info!(osrm = %planner.config().osrm.base_url, "routing service");

    let app = router(planner.clone());

    let runtime = tokio::runtime::Runtime::new().expect("start tokio runtime");
    runtime.block_on(async {
        let listener = tokio::net::TcpListener::bind(&bind_addr)
            .await
            .expect("bind listener");
        info!(addr = %bind_addr, "listening");
        serve(listener, app).await.expect("serve");
    });
    drop(runtime);
    drop(planner);
}
