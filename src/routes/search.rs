use axum::{
    extract::rejection::QueryRejection,
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::AppError;
use crate::models::EntryFilter;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    license_plate: Option<String>,
    house_number: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/search", get(search_entries))
}

async fn search_entries(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(params) = params?;
    let filter = EntryFilter {
        license_plate: params.license_plate,
        house_number: params.house_number,
    };

    let entries = state.store.search(&filter).await?;

    Ok(Json(json!({
        "total": entries.len(),
        "entries": entries,
    })))
}
