use axum::{
    extract::{Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::error::AppError;
use crate::ledger::DonationType;
use crate::AppState;

#[derive(Deserialize)]
pub struct ExportParams {
    pub user_id: String,
}

fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        let escaped = s.replace('"', "\"\"");
        format!("\"{}\"", escaped)
    } else {
        s.to_string()
    }
}

fn donation_type_label(t: DonationType) -> &'static str {
    match t {
        DonationType::DropOff => "drop-off",
        DonationType::Pickup => "pickup",
    }
}

pub async fn export_csv(
    State(state): State<AppState>,
    Query(params): Query<ExportParams>,
) -> Result<impl IntoResponse, AppError> {
    let donations = state.ledger.records_for(params.user_id.trim()).await?;

    let mut w = String::new();
    w.push_str("timestamp,food_items,donation_type,points_earned\n");
    for d in donations {
        let timestamp = d.timestamp.format("%Y-%m-%d %H:%M:%S").to_string();
        let items = d.food_items.join(", ");
        w.push_str(&format!(
            "{},{},{},{}\n",
            csv_escape(&timestamp),
            csv_escape(&items),
            donation_type_label(d.donation_type),
            d.points_earned,
        ));
    }

    let mut resp = Response::new(axum::body::Body::from(w));
    let headers = resp.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment; filename=donations.csv"),
    );
    Ok(resp)
}
