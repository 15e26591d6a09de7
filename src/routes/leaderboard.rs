use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json as AxumJson},
};
use serde::Deserialize;

use crate::error::AppError;
use crate::leaderboard;
use crate::AppState;

const DEFAULT_LIMIT: usize = 5;

#[derive(Deserialize)]
pub struct LeaderboardParams {
    pub limit: Option<usize>,
}

pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> Result<impl IntoResponse, AppError> {
    let records = state.ledger.load_all().await?;
    let board = leaderboard::top_n(&records, params.limit.unwrap_or(DEFAULT_LIMIT));
    Ok(AxumJson(serde_json::json!({ "leaderboard": board })))
}
