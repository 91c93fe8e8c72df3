use crate::api::MgmtState;
use axum::{extract::State, http::StatusCode};

pub async fn livez() -> StatusCode {
    StatusCode::OK
}

pub async fn readyz(State(state): State<MgmtState>) -> StatusCode {
    match state.health_service.check_database().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
