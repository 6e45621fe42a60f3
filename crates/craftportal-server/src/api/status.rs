use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use craftportal_core::DEFAULT_JAVA_PORT;
use serde::{Deserialize, Serialize};

use super::AppState;

#[derive(Debug, Deserialize)]
pub(super) struct StatusQuery {
    ip: Option<String>,
    port: Option<String>,
}

/// Bare error shape of the status proxy; it predates the API envelope.
#[derive(Debug, Serialize)]
struct StatusProxyError {
    error: &'static str,
}

/// `GET /api/status/minecraft?ip=<host>[&port=<port>]`
///
/// Upstream failures are reported as an offline server with HTTP 200.
pub(super) async fn minecraft_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Response {
    let Some(ip) = query.ip.as_deref().map(str::trim).filter(|ip| !ip.is_empty()) else {
        return bad_request("ip is required");
    };

    let Some(port) = parse_port(query.port.as_deref()) else {
        return bad_request("port must be a number between 1 and 65535");
    };

    let status = state.status.fetch_or_offline(ip, port).await;
    (StatusCode::OK, Json(status)).into_response()
}

/// Missing or blank means the default Java port; `None` means invalid.
fn parse_port(raw: Option<&str>) -> Option<u16> {
    match raw.map(str::trim) {
        None | Some("") => Some(DEFAULT_JAVA_PORT),
        Some(value) => value.parse::<u16>().ok().filter(|port| *port != 0),
    }
}

fn bad_request(error: &'static str) -> Response {
    (StatusCode::BAD_REQUEST, Json(StatusProxyError { error })).into_response()
}
