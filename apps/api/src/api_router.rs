use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::middleware::from_fn;
use axum::routing::{delete, get};
use forgeline_core::AppError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let protected_routes = Router::new()
        .route(
            "/api/departments/batch",
            delete(handlers::batch::batch_delete_departments_handler),
        )
        .route(
            "/api/devices/batch",
            delete(handlers::batch::batch_delete_devices_handler),
        )
        .route(
            "/api/system-parameters/batch",
            delete(handlers::batch::batch_delete_system_parameters_handler),
        )
        .route(
            "/api/security/audit-log",
            get(handlers::security::list_audit_log_handler),
        )
        .route_layer(from_fn(middleware::identity_from_gateway));

    let cors_layer = CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(frontend_url)
                .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    Ok(Router::new()
        .route("/api/health", get(handlers::health::health_handler))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state))
}
