use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use uuid::Uuid;

/// Tags every request with a generated id, logs it on the way in and logs
/// status plus latency on the way out. The id is echoed back in the
/// `x-request-id` response header so callers can quote it in reports.
pub async fn request_logger_middleware(mut req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();

    // Hyphenated UUIDs are always valid header values.
    let header_value = request_id.parse().unwrap();
    req.headers_mut().insert("x-request-id", header_value);

    tracing::info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        "Incoming request"
    );

    let mut response = next.run(req).await;

    tracing::info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = %response.status().as_u16(),
        latency_ms = start.elapsed().as_millis(),
        "Outgoing response"
    );

    response
        .headers_mut()
        .insert("x-request-id", request_id.parse().unwrap());

    response
}
