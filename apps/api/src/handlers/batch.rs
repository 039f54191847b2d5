use axum::Extension;
use axum::Json;
use axum::extract::State;
use forgeline_core::UserIdentity;

use crate::dto::{ApiEnvelope, BatchDeleteData, BatchDeleteRequest, summary_message};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub async fn batch_delete_departments_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(request): Json<BatchDeleteRequest>,
) -> ApiResult<Json<ApiEnvelope<BatchDeleteData>>> {
    let ids = request.resource_ids()?;
    let result = state
        .department_delete
        .batch_delete(&user, &ids, &request.context())
        .await
        .map_err(ApiError::batch)?;

    let message = summary_message(&result, "departments");
    Ok(Json(ApiEnvelope::success(message, result.into())))
}

pub async fn batch_delete_devices_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(request): Json<BatchDeleteRequest>,
) -> ApiResult<Json<ApiEnvelope<BatchDeleteData>>> {
    let ids = request.resource_ids()?;
    let result = state
        .device_delete
        .batch_delete(&user, &ids, &request.context())
        .await
        .map_err(ApiError::batch)?;

    let message = summary_message(&result, "devices");
    Ok(Json(ApiEnvelope::success(message, result.into())))
}

pub async fn batch_delete_system_parameters_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(request): Json<BatchDeleteRequest>,
) -> ApiResult<Json<ApiEnvelope<BatchDeleteData>>> {
    let ids = request.resource_ids()?;
    let result = state
        .parameter_delete
        .batch_delete(&user, &ids, &request.context())
        .await
        .map_err(ApiError::batch)?;

    let message = summary_message(&result, "system parameters");
    Ok(Json(ApiEnvelope::success(message, result.into())))
}
