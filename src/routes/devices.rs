//! Device CRUD routes (protected)

use axum::extract::{
    rejection::{JsonRejection, PathRejection},
    Path, State,
};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::database::models::Device;
use crate::errors::ApiError;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateDeviceRequest {
    pub name: String,
    pub type_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDeviceRequest {
    pub name: Option<String>,
    pub type_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct DeviceResponse {
    pub id: i64,
    pub name: String,
    pub type_id: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Device> for DeviceResponse {
    fn from(device: Device) -> Self {
        Self {
            id: device.id,
            name: device.name,
            type_id: device.type_id,
            created_at: device.created_at.to_rfc3339(),
            updated_at: device.updated_at.to_rfc3339(),
        }
    }
}

fn check_name(name: &str) -> Result<(), ApiError> {
    if name.is_empty() {
        return Err(ApiError::BadRequest("name is required".into()));
    }
    Ok(())
}

fn check_type_id(type_id: i64) -> Result<(), ApiError> {
    if type_id <= 0 {
        return Err(ApiError::BadRequest("type_id is required".into()));
    }
    Ok(())
}

pub async fn create_device(
    State(state): State<AppState>,
    payload: Result<Json<CreateDeviceRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    check_name(&req.name)?;
    check_type_id(req.type_id)?;

    let device = state.devices.create(&req.name, req.type_id).await?;
    Ok((StatusCode::CREATED, Json(DeviceResponse::from(device))))
}

pub async fn list_devices(
    State(state): State<AppState>,
) -> Result<Json<Vec<DeviceResponse>>, ApiError> {
    let devices = state.devices.list().await?;
    Ok(Json(devices.into_iter().map(DeviceResponse::from).collect()))
}

pub async fn get_device(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeviceResponse>, ApiError> {
    let Path(id) = id?;
    let device = state.devices.get_by_id(id).await?;
    Ok(Json(device.into()))
}

pub async fn update_device(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateDeviceRequest>, JsonRejection>,
) -> Result<Json<DeviceResponse>, ApiError> {
    let Path(id) = id?;
    let Json(req) = payload?;

    if req.name.is_none() && req.type_id.is_none() {
        return Err(ApiError::BadRequest("no fields to update".into()));
    }
    if let Some(name) = req.name.as_deref() {
        check_name(name)?;
    }
    if let Some(type_id) = req.type_id {
        check_type_id(type_id)?;
    }

    let device = state
        .devices
        .update(id, req.name.as_deref(), req.type_id)
        .await?;
    Ok(Json(device.into()))
}

pub async fn delete_device(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    state.devices.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/devices", get(list_devices).post(create_device))
        .route(
            "/api/v1/devices/{id}",
            get(get_device).put(update_device).delete(delete_device),
        )
}
