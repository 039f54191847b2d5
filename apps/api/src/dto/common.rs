use chrono::Utc;
use serde::Serialize;
use ts_rs::TS;
use uuid::Uuid;

/// Standard meta block attached to every response.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/response-meta.ts"
)]
pub struct ResponseMeta {
    pub timestamp: String,
    pub version: String,
    pub request_id: String,
}

impl ResponseMeta {
    /// Builds a meta block for the current instant.
    #[must_use]
    pub fn now() -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            request_id: Uuid::new_v4().to_string(),
        }
    }
}

/// Success envelope wrapping one response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/api-envelope.ts"
)]
pub struct ApiEnvelope<T: TS> {
    pub success: bool,
    pub message: String,
    pub data: T,
    pub meta: ResponseMeta,
}

impl<T: TS> ApiEnvelope<T> {
    /// Wraps a payload in the standard success envelope.
    #[must_use]
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            meta: ResponseMeta::now(),
        }
    }
}

/// Error envelope returned for failed requests.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

/// Stable code and message for one failed request.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-body.ts"
)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ready: bool,
    pub postgres: &'static str,
}
