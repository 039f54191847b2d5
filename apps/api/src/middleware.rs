use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use forgeline_core::{AppError, TenantId, UserIdentity};
use uuid::Uuid;

use crate::error::ApiResult;

/// Installs the authenticated identity from the upstream gateway headers.
///
/// Authentication itself happens upstream; this service only trusts the
/// headers the gateway sets after a successful login.
pub async fn identity_from_gateway(mut request: Request, next: Next) -> ApiResult<Response> {
    let headers = request.headers();

    let subject = header_value(headers, "x-auth-subject")?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;
    let tenant_raw = header_value(headers, "x-auth-tenant")?
        .ok_or_else(|| AppError::Unauthorized("tenant header missing".to_owned()))?;
    let tenant_id = Uuid::parse_str(tenant_raw.as_str())
        .map(TenantId::from_uuid)
        .map_err(|_| AppError::Unauthorized("tenant header is not a UUID".to_owned()))?;

    let display_name = header_value(headers, "x-auth-name")?.unwrap_or_else(|| subject.clone());

    let identity = UserIdentity::new(subject, display_name, tenant_id);
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

fn header_value(
    headers: &axum::http::HeaderMap,
    name: &str,
) -> Result<Option<String>, AppError> {
    match headers.get(name) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(|value| Some(value.to_owned()))
            .map_err(|_| AppError::Unauthorized(format!("header '{name}' is not valid UTF-8"))),
    }
}
