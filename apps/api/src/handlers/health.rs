use axum::Json;
use axum::extract::State;

use crate::dto::{ApiEnvelope, HealthResponse};
use crate::state::AppState;

/// Liveness and readiness probe. Unauthenticated on purpose so load
/// balancers can poll it.
pub async fn health_handler(State(state): State<AppState>) -> Json<ApiEnvelope<HealthResponse>> {
    let postgres_ok = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.pool)
        .await
        .is_ok();

    let payload = HealthResponse {
        status: if postgres_ok { "ok" } else { "degraded" },
        ready: postgres_ok,
        postgres: if postgres_ok { "up" } else { "down" },
    };

    Json(ApiEnvelope::success("health", payload))
}
