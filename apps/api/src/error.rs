use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use forgeline_core::AppError;

use crate::dto::{ErrorBody, ErrorResponse, ResponseMeta};

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError {
    error: AppError,
    code_override: Option<&'static str>,
}

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self {
            error: value,
            code_override: None,
        }
    }
}

impl ApiError {
    /// Wraps a batch-delete failure; whole-batch system errors surface with
    /// the stable `BATCH_DELETE_FAILED` code.
    pub fn batch(error: AppError) -> Self {
        let code_override = match &error {
            AppError::Internal(_) => Some("BATCH_DELETE_FAILED"),
            _ => None,
        };

        Self {
            error,
            code_override,
        }
    }

    fn code(&self) -> String {
        if let Some(code) = self.code_override {
            return code.to_owned();
        }

        match &self.error {
            AppError::Validation(message) => structural_code(message)
                .unwrap_or("VALIDATION_ERROR")
                .to_owned(),
            AppError::NotFound(_) => "NOT_FOUND".to_owned(),
            AppError::Conflict(_) => "CONFLICT".to_owned(),
            AppError::Unauthorized(_) => "UNAUTHORIZED".to_owned(),
            AppError::Forbidden(_) => "PERMISSION_DENIED".to_owned(),
            AppError::Internal(_) => "INTERNAL_ERROR".to_owned(),
        }
    }
}

/// Extracts a leading stable code from messages shaped like
/// `BATCH_SIZE_EXCEEDED: 120 ids exceed …`.
fn structural_code(message: &str) -> Option<&str> {
    let (prefix, _) = message.split_once(':')?;
    let is_code = !prefix.is_empty()
        && prefix
            .chars()
            .all(|character| character.is_ascii_uppercase() || character == '_');
    is_code.then_some(prefix)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorResponse {
            success: false,
            error: ErrorBody {
                code: self.code(),
                message: self.error.to_string(),
            },
            meta: ResponseMeta::now(),
        });

        (status, payload).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use forgeline_core::AppError;

    use super::ApiError;

    #[test]
    fn structural_validation_code_is_extracted() {
        let error = ApiError::from(AppError::Validation(
            "MISSING_FIELD: ids must not be empty".to_owned(),
        ));
        assert_eq!(error.code(), "MISSING_FIELD");
    }

    #[test]
    fn plain_validation_message_falls_back_to_generic_code() {
        let error = ApiError::from(AppError::Validation("ids look odd".to_owned()));
        assert_eq!(error.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn batch_internal_errors_get_the_batch_code() {
        let error = ApiError::batch(AppError::Internal("connection lost".to_owned()));
        assert_eq!(error.code(), "BATCH_DELETE_FAILED");
    }
}
