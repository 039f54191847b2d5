use axum::Extension;
use axum::Json;
use axum::extract::{Query, State};
use forgeline_application::AuditLogQuery;
use forgeline_core::UserIdentity;
use serde::Deserialize;

use crate::dto::{ApiEnvelope, AuditLogEntryResponse};
use crate::error::ApiResult;
use crate::state::AppState;

const DEFAULT_LIMIT: usize = 50;

/// Paging and filter parameters accepted by the audit log listing.
#[derive(Debug, Deserialize)]
pub struct AuditLogParams {
    limit: Option<usize>,
    offset: Option<usize>,
    action: Option<String>,
    subject: Option<String>,
}

pub async fn list_audit_log_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(params): Query<AuditLogParams>,
) -> ApiResult<Json<ApiEnvelope<Vec<AuditLogEntryResponse>>>> {
    let query = AuditLogQuery {
        limit: params.limit.unwrap_or(DEFAULT_LIMIT),
        offset: params.offset.unwrap_or(0),
        action: params.action,
        subject: params.subject,
    };

    let entries = state.audit_log_service.list_audit_log(&user, query).await?;
    let payload: Vec<AuditLogEntryResponse> =
        entries.into_iter().map(AuditLogEntryResponse::from).collect();

    Ok(Json(ApiEnvelope::success("audit log", payload)))
}
