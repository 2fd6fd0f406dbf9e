//! HTTP/JSON command surface.
//!
//! One route per operation, returning the primitive result shapes clients
//! expect: sorted name arrays, description strings, and 0/1 return codes.
//! Unknown names are a warning and an empty result, never an error status.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    response::Json,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/devices", get(device_list))
        .route("/api/devices/{device}", get(device_info))
        .route("/api/devices/{device}/buttons", get(device_list_buttons))
        .route(
            "/api/devices/{device}/buttons/{button}",
            post(device_press_button),
        )
        .route("/api/devices/{device}/status", get(device_list_status_cmds))
        .route(
            "/api/devices/{device}/status/{command}",
            get(device_get_status),
        )
        .route("/api/activities", get(activity_list))
        .route("/api/activities/current", get(activity_current))
        .route("/api/activities/{activity}", get(activity_info))
        .route("/api/activities/{activity}/start", post(activity_start))
        .route("/api/power-off", post(power_off))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn device_list(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.registry.device_names())
}

async fn device_info(
    Path(device): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Json<String> {
    match state.registry.device(&device) {
        Some(found) => Json(found.description().to_string()),
        None => {
            warn!(device = %device, "Received info request for non-existent device");
            Json(String::new())
        }
    }
}

async fn device_list_buttons(
    Path(device): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Json<Vec<String>> {
    match state.registry.device(&device) {
        Some(found) => Json(found.list_buttons()),
        None => {
            warn!(device = %device, "Received button listing for non-existent device");
            Json(Vec::new())
        }
    }
}

async fn device_press_button(
    Path((device, button)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> Json<i32> {
    match state.registry.device(&device) {
        Some(found) => Json(found.press_button(&button).await),
        None => {
            warn!(device = %device, button = %button, "Received press for non-existent device");
            Json(1)
        }
    }
}

async fn device_list_status_cmds(
    Path(device): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Json<Vec<String>> {
    match state.registry.device(&device) {
        Some(found) => Json(found.list_status_cmds()),
        None => {
            warn!(device = %device, "Received status listing for non-existent device");
            Json(Vec::new())
        }
    }
}

async fn device_get_status(
    Path((device, command)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> Json<String> {
    match state.registry.device(&device) {
        Some(found) => Json(found.get_status(&command).await),
        None => {
            warn!(device = %device, command = %command, "Received status request for non-existent device");
            Json(String::new())
        }
    }
}

async fn activity_list(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.registry.activity_names())
}

async fn activity_info(
    Path(activity): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Json<String> {
    match state.registry.activity(&activity) {
        Some(found) => Json(found.description.clone()),
        None => {
            warn!(activity = %activity, "Received info request for non-existent activity");
            Json(String::new())
        }
    }
}

async fn activity_start(
    Path(activity): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Json<i32> {
    Json(state.orchestrator.start(&activity).await)
}

async fn activity_current(State(state): State<Arc<AppState>>) -> Json<String> {
    Json(state.orchestrator.current())
}

async fn power_off(State(state): State<Arc<AppState>>) -> Json<i32> {
    Json(state.orchestrator.power_off().await)
}
