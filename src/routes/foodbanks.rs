use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json as AxumJson},
};
use serde::Deserialize;

use crate::error::AppError;
use crate::geo;
use crate::AppState;

const DEFAULT_RADIUS_KM: f64 = 10.0;

#[derive(Deserialize)]
pub struct NearbyParams {
    pub lat: f64,
    pub lng: f64,
    pub radius_km: Option<f64>,
}

pub async fn list_food_banks() -> impl IntoResponse {
    AxumJson(serde_json::json!({ "food_banks": geo::FOOD_BANKS }))
}

pub async fn find_nearby(
    Query(params): Query<NearbyParams>,
) -> Result<impl IntoResponse, AppError> {
    if !params.lat.is_finite() || !params.lng.is_finite() {
        return Err(AppError::Validation(
            "lat and lng must be finite numbers".to_string(),
        ));
    }

    let radius_km = params.radius_km.unwrap_or(DEFAULT_RADIUS_KM);
    let nearby = geo::find_nearby(params.lat, params.lng, radius_km);
    Ok(AxumJson(serde_json::json!({ "food_banks": nearby })))
}

#[derive(Deserialize)]
struct GeoIpResponse {
    lat: f64,
    lon: f64,
}

/// Approximate location of the caller's network, via an ip-api style
/// upstream. Purely a convenience for pre-filling the nearby search.
pub async fn locate(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let resp = state
        .http
        .get(&state.geoip_api_url)
        .send()
        .await
        .map_err(|e| {
            tracing::error!("Geolocation request failed: {}", e);
            AppError::Upstream("geolocation service unreachable".to_string())
        })?;

    if !resp.status().is_success() {
        return Err(AppError::Upstream(format!(
            "geolocation service returned {}",
            resp.status()
        )));
    }

    let geo: GeoIpResponse = resp.json().await.map_err(|e| {
        tracing::error!("Geolocation response malformed: {}", e);
        AppError::Upstream("geolocation response malformed".to_string())
    })?;

    Ok(AxumJson(
        serde_json::json!({ "lat": geo.lat, "lng": geo.lon }),
    ))
}
