use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json as AxumJson},
};
use serde::Deserialize;

use crate::error::AppError;
use crate::ledger::DonationType;
use crate::AppState;

#[derive(Deserialize)]
pub struct CreateDonationRequest {
    pub user_id: String,
    /// Free-text, comma-separated item list, e.g. "rice, beans, bread".
    pub food_items: String,
    pub donation_type: DonationType,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub user_id: String,
}

pub async fn create_donation(
    State(state): State<AppState>,
    Json(req): Json<CreateDonationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = req.user_id.trim();
    if user_id.is_empty() {
        return Err(AppError::Validation("user_id is required".to_string()));
    }

    // The ledger rejects an empty item list before any write, and only
    // returns Ok once the record has been flushed to disk.
    let record = state
        .ledger
        .record(user_id, &req.food_items, req.donation_type)
        .await
        .inspect_err(|e| tracing::error!("Donation record failed: {}", e))?;

    let total_points = state.ledger.total_points(user_id).await?;

    Ok((
        StatusCode::CREATED,
        AxumJson(serde_json::json!({
            "points_earned": record.points_earned,
            "total_points": total_points,
            "record": record,
        })),
    ))
}

pub async fn list_donations(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let donations = state.ledger.records_for(params.user_id.trim()).await?;
    Ok(AxumJson(serde_json::json!({ "donations": donations })))
}
