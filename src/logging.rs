//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE, request, response},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

/// The number of bytes of a body that are logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// The largest request body that will be read, in bytes.
///
/// Matches the default body limit of axum's extractors.
pub const REQUEST_BODY_LIMIT: usize = 2 * 1024 * 1024;

const REDACTED: &str = "********";

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is truncated
/// and the full body is logged at the `debug` level.
/// The `password` field of JSON request bodies is never logged.
///
/// Request bodies larger than [REQUEST_BODY_LIMIT] are rejected with
/// `413 Payload Too Large`. Only JSON response bodies are read for logging,
/// other responses are passed through with just their headers logged.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match axum::body::to_bytes(body, REQUEST_BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::warn!(
                "Could not read body of {} {}: {error}",
                parts.method,
                parts.uri
            );
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };

    let body_text = String::from_utf8_lossy(&body_bytes);
    if is_json(&parts.headers) {
        log_request(&parts, &redact_password(&body_text));
    } else {
        log_request(&parts, &body_text);
    }

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    if !is_json(&parts.headers) {
        tracing::info!("Sending response: {parts:#?}");
        return Response::from_parts(parts, body);
    }

    let body_bytes: Bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    log_response(&parts, &String::from_utf8_lossy(&body_bytes));

    Response::from_parts(parts, Body::from(body_bytes))
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|content_type| content_type.to_str().ok())
        .and_then(|content_type| content_type.split(';').next())
        .is_some_and(|media_type| media_type.trim().ends_with("json"))
}

/// Replace the value of a top-level `password` field in a JSON object.
///
/// Text that is not a JSON object is returned unchanged.
fn redact_password(json_text: &str) -> String {
    let Ok(Value::Object(mut object)) = serde_json::from_str::<Value>(json_text) else {
        return json_text.to_owned();
    };

    match object.get_mut("password") {
        Some(password) => {
            *password = Value::String(REDACTED.to_owned());
            Value::Object(object).to_string()
        }
        None => json_text.to_owned(),
    }
}

/// The longest prefix of `text` that fits in [LOG_BODY_LENGTH_LIMIT] bytes
/// without splitting a character.
fn truncate(text: &str) -> &str {
    let end = (0..=LOG_BODY_LENGTH_LIMIT)
        .rev()
        .find(|&index| text.is_char_boundary(index))
        .unwrap_or(0);

    &text[..end]
}

fn log_request(parts: &request::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!("Received request: {parts:#?}\nbody: {}...", truncate(body));
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!("Received request: {parts:#?}\nbody: {body:?}");
    }
}

fn log_response(parts: &response::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!("Sending response: {parts:#?}\nbody: {}...", truncate(body));
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {parts:#?}\nbody: {body:?}");
    }
}

#[cfg(test)]
mod logging_tests {
    use axum::{
        Json, Router,
        http::StatusCode,
        middleware,
        routing::{get, post},
    };
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use super::{
        LOG_BODY_LENGTH_LIMIT, REQUEST_BODY_LIMIT, logging_middleware, redact_password, truncate,
    };

    fn get_test_server() -> TestServer {
        let app = Router::new()
            .route("/echo", post(|Json(body): Json<Value>| async { Json(body) }))
            .route("/text", get(|| async { "plain text response" }))
            .layer(middleware::from_fn(logging_middleware));

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[test]
    fn redacts_password_field() {
        let redacted = redact_password(r#"{"username":"alice","password":"hunter2"}"#);

        let redacted: Value = serde_json::from_str(&redacted).unwrap();
        assert_eq!(
            redacted,
            json!({ "username": "alice", "password": "********" })
        );
    }

    #[test]
    fn leaves_json_without_password_unchanged() {
        let text = r#"{"query":"{ transactions { id } }"}"#;

        assert_eq!(redact_password(text), text);
    }

    #[test]
    fn leaves_invalid_json_unchanged() {
        let text = "password=hunter2";

        assert_eq!(redact_password(text), text);
    }

    #[test]
    fn truncate_does_not_split_characters() {
        let text = "é".repeat(LOG_BODY_LENGTH_LIMIT);

        let truncated = truncate(&text);

        assert_eq!(truncated.len(), LOG_BODY_LENGTH_LIMIT);
        assert_eq!(truncate("short"), "short");
    }

    #[tokio::test]
    async fn middleware_passes_body_through_unchanged() {
        let server = get_test_server();
        let body = json!({ "username": "alice", "password": "hunter2" });

        let response = server.post("/echo").json(&body).await;

        response.assert_status_ok();
        response.assert_json(&body);
    }

    #[tokio::test]
    async fn middleware_passes_non_json_response_through() {
        let server = get_test_server();

        let response = server.get("/text").await;

        response.assert_status_ok();
        response.assert_text("plain text response");
    }

    #[tokio::test]
    async fn oversized_request_body_is_rejected() {
        let server = get_test_server();
        let body = "a".repeat(REQUEST_BODY_LIMIT + 1);

        let response = server.post("/echo").text(body).await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    }
}
