use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json as AxumJson},
};
use uuid::Uuid;

use crate::error::AppError;
use crate::AppState;

/// Estimated kilograms of food waste avoided per donated item.
const WASTE_KG_PER_ITEM: f64 = 0.5;

/// Mints a fresh identity for a client session. Clients that want a stable
/// leaderboard presence should persist the id themselves.
pub async fn new_session() -> impl IntoResponse {
    AxumJson(serde_json::json!({ "user_id": Uuid::new_v4().to_string() }))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let donations = state.ledger.records_for(&user_id).await?;
    let total_points: u64 = donations.iter().map(|d| u64::from(d.points_earned)).sum();
    let total_items: usize = donations.iter().map(|d| d.food_items.len()).sum();

    Ok(AxumJson(serde_json::json!({
        "user_id": user_id,
        "total_points": total_points,
        "donation_count": donations.len(),
        "estimated_waste_reduced_kg": total_items as f64 * WASTE_KG_PER_ITEM,
        "donations": donations,
    })))
}
