//! Health check endpoints for Kubernetes-style probes.
//!
//! - `/livez` - Basic liveness probe (immediate 200, no checks)
//! - `/healthz` - Store query plus a cache write/read round trip

use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use pinboard_core::response::{DataEnvelope, ErrorBody};

use crate::state::AppState;

const PROBE_KEY: &str = "healthz:probe";
const PROBE_VALUE: &[u8] = b"ok";

#[derive(Debug, Serialize)]
struct Health {
    store: &'static str,
    cache: &'static str,
}

/// GET /livez - Basic liveness probe.
///
/// Returns 200 immediately. Used to check if the server is accepting connections.
#[axum::debug_handler]
pub async fn livez() -> StatusCode {
    StatusCode::OK
}

/// GET /healthz - Dependency check.
///
/// 200 when the store answers a count and the cache returns what was just
/// written to it, 503 otherwise.
#[axum::debug_handler]
pub async fn healthz(State(state): State<AppState>) -> Response {
    if let Err(err) = state.pins.count_pins().await {
        tracing::warn!(error = %err, "Health check: store unavailable");
        return unavailable("Store unavailable");
    }

    let round_trip = async {
        state
            .cache
            .set_raw(PROBE_KEY, PROBE_VALUE, Some(Duration::from_secs(5)))
            .await?;
        state.cache.get_raw(PROBE_KEY).await
    };
    match round_trip.await {
        Ok(Some(value)) if value == PROBE_VALUE => {}
        Ok(_) => return unavailable("Cache unavailable"),
        Err(err) => {
            tracing::warn!(error = %err, "Health check: cache unavailable");
            return unavailable("Cache unavailable");
        }
    }

    Json(DataEnvelope::success(Health {
        store: "ok",
        cache: "ok",
    }))
    .into_response()
}

fn unavailable(message: &str) -> Response {
    let code = StatusCode::SERVICE_UNAVAILABLE;
    (code, Json(ErrorBody::new(code.as_u16(), message))).into_response()
}
