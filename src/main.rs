use axum::extract::State;
use axum::{response::Json, routing::get, Router};
use mongodb::bson::doc;
use serde_json::{json, Value};
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;

mod config;
mod database;
mod errors;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;
mod state;
mod updater;

use config::AppConfig;
use database::connection::get_db_client;
use services::football_api::FootballApiClient;
use state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = AppConfig::from_env();
    let db = get_db_client(&config).await;
    let api = FootballApiClient::new(&config);
    let app_state = AppState::new(db, api, config);

    let app = build_router(app_state.clone());
    start_server(app, &app_state).await;
}

fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health/", get(health_check))
        .merge(routes::updater::routes(app_state.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn start_server(app: Router, state: &AppState) {
    let host: [u8; 4] = if state.config.host == "0.0.0.0" {
        [0, 0, 0, 0]
    } else {
        [127, 0, 0, 1]
    };
    let addr = SocketAddr::from((host, state.config.port));

    tracing::info!("Updater API starting on {}", addr);

    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("Server error: {}", e);
                std::process::exit(1);
            }
        }
        Err(e) => {
            tracing::error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    }
}

async fn root_handler() -> &'static str {
    "Futbol Updater API"
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let db_status = match state.db.run_command(doc! {"ping": 1}).await {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };

    Json(json!({
        "status": "healthy",
        "database": db_status,
        "environment": state.config.app_env,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
