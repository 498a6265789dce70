//! HTTP front end. Each request is turned into an invocation event so the
//! server and the event path share one gate.

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use claimcheck_core::ResponseEnvelope;
use claimcheck_runtime::FactChecker;

pub async fn run(checker: FactChecker, addr: &str) -> Result<()> {
    let app = router(Arc::new(checker));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(addr, "Listening");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

fn router(checker: Arc<FactChecker>) -> Router {
    Router::new()
        .route("/", post(check).options(check))
        .with_state(checker)
}

async fn check(State(checker): State<Arc<FactChecker>>, method: Method, body: String) -> Response {
    let event = serde_json::json!({
        "httpMethod": method.as_str(),
        "body": body,
    });
    let envelope = checker.handle_event(&event).await;
    into_response(&method, envelope)
}

/// Only a verdict is plain text; preflight acknowledgements and errors are JSON.
fn into_response(method: &Method, envelope: ResponseEnvelope) -> Response {
    let status = StatusCode::from_u16(envelope.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let content_type = if envelope.is_success() && *method != Method::OPTIONS {
        "text/plain; charset=utf-8"
    } else {
        "application/json"
    };

    let mut response = (status, envelope.body).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    for (name, value) in &envelope.headers {
        if let (Ok(name), Ok(value)) = (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            headers.insert(name, value);
        }
    }
    response
}
