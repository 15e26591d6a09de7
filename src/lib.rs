use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub mod error;
pub mod geo;
pub mod leaderboard;
pub mod ledger;
pub mod routes;

use ledger::Ledger;

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Ledger>,
    pub http: reqwest::Client,
    pub recipe_api_base: String,
    pub recipe_api_key: Option<String>,
    pub translate_api_url: Option<String>,
    pub geoip_api_url: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/session", get(routes::profile::new_session))
        .route("/api/profile/{user_id}", get(routes::profile::get_profile))
        .route(
            "/api/donations",
            get(routes::donations::list_donations).post(routes::donations::create_donation),
        )
        .route("/api/foodbanks", get(routes::foodbanks::list_food_banks))
        .route("/api/foodbanks/nearby", get(routes::foodbanks::find_nearby))
        .route("/api/locate", get(routes::foodbanks::locate))
        .route("/api/leaderboard", get(routes::leaderboard::get_leaderboard))
        .route("/api/recipes", post(routes::recipes::suggest_recipes))
        .route("/api/reports/export", get(routes::reports::export_csv))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
