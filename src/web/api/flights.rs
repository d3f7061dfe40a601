use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::importer::{import_csv, LineString};
use crate::storage::{FlightEntry, StoredSample};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::state::AppState;

const DEFAULT_SOURCE_NAME: &str = "upload.csv";

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    #[serde(default)]
    pub file_name: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/flights",
    tag = "flights",
    params(
        ("file_name" = Option<String>, Query, description = "Original file name, stored as the flight's source name")
    ),
    request_body(content = String, content_type = "text/csv"),
    responses(
        (status = 201, description = "Flight imported", body = FlightEntry),
        (status = 400, description = "Import failed", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse)
    )
)]
pub async fn upload_flight(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let source_name = query
        .file_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SOURCE_NAME.to_string());
    let storage = state.storage.clone();
    let config = state.config.clone();

    // parsing is synchronous and can take a while on long logs
    let entry = tokio::task::spawn_blocking(move || -> ApiResult<FlightEntry> {
        let flight = import_csv(
            body.as_ref(),
            &source_name,
            Utc::now(),
            &config.import.columns,
        )?;
        Ok(storage.save_flight(flight)?)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    log::info!(
        "Stored flight {} ({} samples)",
        entry.id,
        entry.sample_count
    );

    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    get,
    path = "/api/flights",
    tag = "flights",
    responses(
        (status = 200, description = "Stored flights ordered by start time", body = Vec<FlightEntry>),
        (status = 500, description = "Storage error", body = ErrorResponse)
    )
)]
pub async fn list_flights(State(state): State<AppState>) -> ApiResult<Json<Vec<FlightEntry>>> {
    Ok(Json(state.storage.list_flights()?))
}

#[utoipa::path(
    get,
    path = "/api/flights/{id}",
    tag = "flights",
    params(
        ("id" = String, Path, description = "Flight ID")
    ),
    responses(
        (status = 200, description = "Flight summary", body = FlightEntry),
        (status = 404, description = "Flight not found", body = ErrorResponse)
    )
)]
pub async fn get_flight(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<FlightEntry>> {
    Ok(Json(state.storage.get_flight(&id)?))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SampleResponse {
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub speed: f64,
    pub battery: u8,
}

impl From<&StoredSample> for SampleResponse {
    fn from(stored: &StoredSample) -> Self {
        let s = &stored.sample;
        SampleResponse {
            timestamp: s.timestamp.timestamp_millis(),
            latitude: s.latitude,
            longitude: s.longitude,
            altitude: s.altitude,
            speed: s.speed,
            battery: s.battery_percent,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/flights/{id}/samples",
    tag = "flights",
    params(
        ("id" = String, Path, description = "Flight ID")
    ),
    responses(
        (status = 200, description = "Samples ordered by timestamp", body = Vec<SampleResponse>),
        (status = 404, description = "Flight not found", body = ErrorResponse)
    )
)]
pub async fn list_samples(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<SampleResponse>>> {
    let samples = state.storage.samples(&id)?;
    Ok(Json(samples.iter().map(SampleResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/flights/{id}/track",
    tag = "flights",
    params(
        ("id" = String, Path, description = "Flight ID")
    ),
    responses(
        (status = 200, description = "GeoJSON LineString of the flight path", body = LineString),
        (status = 404, description = "Flight not found", body = ErrorResponse)
    )
)]
pub async fn get_track(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<LineString>> {
    Ok(Json(state.storage.track(&id)?))
}

#[utoipa::path(
    delete,
    path = "/api/flights/{id}",
    tag = "flights",
    params(
        ("id" = String, Path, description = "Flight ID")
    ),
    responses(
        (status = 204, description = "Flight deleted"),
        (status = 404, description = "Flight not found", body = ErrorResponse)
    )
)]
pub async fn delete_flight(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.storage.delete_flight(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
