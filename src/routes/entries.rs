use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::AppError;
use crate::models::entry::{normalize_field, HOUSE_NUMBER_MAX_LEN, LICENSE_PLATE_MAX_LEN};
use crate::models::EntryChanges;
use crate::AppState;

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_PER_PAGE: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct EntryPayload {
    license_plate: Option<String>,
    house_number: Option<String>,
}

/// Raw pagination params. Anything that is not a positive integer falls back
/// to the default.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    page: Option<String>,
    per_page: Option<String>,
}

fn parse_positive(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n >= 1)
        .unwrap_or(default)
}

fn check_length(field: &str, value: &str, max: usize) -> Result<(), AppError> {
    if value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

/// Validate a create request, returning trimmed `(license_plate, house_number)`.
fn validate_new_entry(payload: &EntryPayload) -> Result<(String, String), AppError> {
    let (Some(license_plate), Some(house_number)) =
        (&payload.license_plate, &payload.house_number)
    else {
        return Err(AppError::Validation(
            "license_plate and house_number are required".to_string(),
        ));
    };

    let (Some(license_plate), Some(house_number)) =
        (normalize_field(license_plate), normalize_field(house_number))
    else {
        return Err(AppError::Validation(
            "license_plate and house_number must not be empty".to_string(),
        ));
    };

    check_length("license_plate", &license_plate, LICENSE_PLATE_MAX_LEN)?;
    check_length("house_number", &house_number, HOUSE_NUMBER_MAX_LEN)?;

    Ok((license_plate, house_number))
}

/// Absent or blank fields are dropped; the rest must still fit the column limits.
fn validate_changes(payload: &EntryPayload) -> Result<EntryChanges, AppError> {
    let changes = EntryChanges {
        license_plate: payload.license_plate.as_deref().and_then(normalize_field),
        house_number: payload.house_number.as_deref().and_then(normalize_field),
    };

    if let Some(license_plate) = &changes.license_plate {
        check_length("license_plate", license_plate, LICENSE_PLATE_MAX_LEN)?;
    }
    if let Some(house_number) = &changes.house_number {
        check_length("house_number", house_number, HOUSE_NUMBER_MAX_LEN)?;
    }

    Ok(changes)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/entries", get(list_entries).post(create_entry))
        .route(
            "/api/entries/{id}",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
}

async fn create_entry(
    State(state): State<AppState>,
    payload: Result<Json<EntryPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    let (license_plate, house_number) = validate_new_entry(&payload)?;

    let entry = state.store.create(&license_plate, &house_number).await?;
    tracing::info!(id = entry.id, license_plate = %entry.license_plate, "entry recorded");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Entry recorded", "entry": entry })),
    ))
}

async fn list_entries(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(params) = params?;
    let page = parse_positive(params.page.as_deref(), DEFAULT_PAGE);
    let per_page = parse_positive(params.per_page.as_deref(), DEFAULT_PER_PAGE);

    let page = state.store.list(page, per_page).await?;

    Ok(Json(json!({
        "entries": page.entries,
        "total": page.total,
        "pages": page.pages,
        "current_page": page.page,
    })))
}

async fn get_entry(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;

    let Some(entry) = state.store.get(id).await? else {
        return Err(AppError::NotFound);
    };

    Ok(Json(entry))
}

async fn update_entry(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<EntryPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let changes = validate_changes(&payload)?;

    let Some(entry) = state.store.update(id, &changes).await? else {
        return Err(AppError::NotFound);
    };
    tracing::info!(id = entry.id, "entry updated");

    Ok(Json(json!({ "message": "Entry updated", "entry": entry })))
}

async fn delete_entry(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;

    if !state.store.delete(id).await? {
        return Err(AppError::NotFound);
    }
    tracing::info!(id, "entry deleted");

    Ok(Json(json!({ "message": "Entry deleted" })))
}
