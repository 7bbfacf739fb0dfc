//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// The maximum number of bytes of a body to log at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
///
/// Multipart request bodies and binary response bodies, such as uploaded
/// spreadsheets, are passed through without being buffered or logged.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let request = if is_loggable(request.headers(), false) {
        let (parts, body) = request.into_parts();
        let bytes = match buffer_body(body).await {
            Ok(bytes) => bytes,
            Err(response) => return response,
        };

        log_request(&parts, &bytes);
        Request::from_parts(parts, Body::from(bytes))
    } else {
        tracing::info!(
            "Received request: {} {} {:#?}\nbody: <not logged>",
            request.method(),
            request.uri(),
            request.headers()
        );
        request
    };

    let response = next.run(request).await;

    if !is_loggable(response.headers(), true) {
        tracing::info!(
            "Sending response: {} {:#?}\nbody: <not logged>",
            response.status(),
            response.headers()
        );
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match buffer_body(body).await {
        Ok(bytes) => bytes,
        Err(response) => return response,
    };

    log_response(&parts, &bytes);
    Response::from_parts(parts, Body::from(bytes))
}

/// Whether a body with these headers is text that is safe to buffer and log.
fn is_loggable(headers: &HeaderMap, is_response: bool) -> bool {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if content_type.starts_with("multipart/") {
        return false;
    }

    !is_response
        || content_type.is_empty()
        || content_type.starts_with("text/")
        || content_type.starts_with("application/json")
}

async fn buffer_body(body: Body) -> Result<Bytes, Response> {
    axum::body::to_bytes(body, usize::MAX).await.map_err(|error| {
        tracing::error!("could not read body for logging: {error}");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    })
}

/// The first [LOG_BODY_LENGTH_LIMIT] bytes of `body` as text, and whether
/// it was truncated.
fn truncated_text(body: &[u8]) -> (String, bool) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        (
            String::from_utf8_lossy(&body[..LOG_BODY_LENGTH_LIMIT]).to_string(),
            true,
        )
    } else {
        (String::from_utf8_lossy(body).to_string(), false)
    }
}

fn log_request(parts: &axum::http::request::Parts, body: &[u8]) {
    match truncated_text(body) {
        (text, true) => {
            tracing::info!("Received request: {parts:#?}\nbody: {text}...");
            tracing::debug!("Full request body: {:?}", String::from_utf8_lossy(body));
        }
        (text, false) => tracing::info!("Received request: {parts:#?}\nbody: {text:?}"),
    }
}

fn log_response(parts: &axum::http::response::Parts, body: &[u8]) {
    match truncated_text(body) {
        (text, true) => {
            tracing::info!("Sending response: {parts:#?}\nbody: {text}...");
            tracing::debug!("Full response body: {:?}", String::from_utf8_lossy(body));
        }
        (text, false) => tracing::info!("Sending response: {parts:#?}\nbody: {text:?}"),
    }
}
