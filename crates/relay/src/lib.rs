//! Chat relay endpoint.
//!
//! Accepts a chat request from the browser UI, validates it, assembles
//! the upstream message sequence (with optional file-handling prompt
//! augmentation) and forwards it to an OpenAI-style chat-completion API.
//! The upstream response is passed through unmodified; failures are
//! shaped into an envelope the UI can render like a normal answer.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::any,
};
use config::RelayConfig;

mod error;
mod messages;
mod prompt;
mod upstream;

use error::RelayError;
use messages::{ChatRequest, ErrorEnvelope};
use upstream::{UpstreamClient, UpstreamOutcome};

pub(crate) type Result<T> = std::result::Result<T, RelayError>;

/// Creates an axum router for the relay endpoint.
pub fn router(config: RelayConfig) -> anyhow::Result<Router> {
    if !config.path.starts_with('/') {
        anyhow::bail!("relay.path must start with '/', got '{}'", config.path);
    }

    let endpoint = Arc::new(RelayEndpoint::new(&config)?);

    Ok(Router::new().route(&config.path, any(relay)).with_state(endpoint))
}

struct RelayEndpoint {
    upstream: UpstreamClient,
    config: RelayConfig,
}

/// Handle a request to the relay endpoint.
///
/// Every method is routed here: OPTIONS answers the browser preflight,
/// POST runs the forwarding pipeline, everything else is rejected.
///
/// The body is taken as raw bytes and lossy-decoded so a non-UTF-8
/// payload still flows through the normal validation taxonomy instead
/// of an extractor rejection that skips the CORS headers.
async fn relay(State(endpoint): State<Arc<RelayEndpoint>>, method: Method, body: Bytes) -> Response {
    log::info!("Relay endpoint called: {method}");

    if method == Method::OPTIONS {
        return preflight();
    }

    if method != Method::POST {
        return RelayError::MethodNotAllowed(method.to_string()).into_response();
    }

    let body = String::from_utf8_lossy(&body);

    match endpoint.handle(&body).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

impl RelayEndpoint {
    fn new(config: &RelayConfig) -> anyhow::Result<Self> {
        Ok(Self {
            upstream: UpstreamClient::new(config)?,
            config: config.clone(),
        })
    }

    /// The POST pipeline: validate, build the prompt, call upstream,
    /// shape the response. Each stage short-circuits with a `RelayError`.
    async fn handle(&self, body: &str) -> Result<Response> {
        log::debug!("Request body length: {}", body.len());

        if body.is_empty() {
            return Err(RelayError::EmptyBody);
        }

        let request: ChatRequest = sonic_rs::from_str(body).map_err(|e| {
            log::debug!("Failed to parse request body: {e}");
            RelayError::InvalidJson
        })?;

        if request.message.is_empty() {
            return Err(RelayError::MissingMessage);
        }

        let has_files = !request.files.is_empty();

        log::debug!(
            "Message length: {}, history turns: {}, files: {}",
            request.message.len(),
            request.messages.len(),
            request.files.len(),
        );

        if has_files {
            let names: Vec<&str> = request.files.iter().map(|f| f.name.as_str()).collect();
            log::debug!("Attached files: {}", names.join(", "));
        }

        let system_prompt = prompt::system_prompt(has_files);
        let outgoing = prompt::assemble(system_prompt, &request.messages, &request.message);

        log::debug!("Assembled {} outgoing messages", outgoing.len());

        let budget = self.config.token_budget(has_files);

        match self.upstream.chat_completion(outgoing, budget).await? {
            UpstreamOutcome::Success(upstream_body) => Ok(json_ok((
                [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
                upstream_body,
            ))),
            UpstreamOutcome::ContextLengthExceeded => {
                // Delivered as 200 so front-ends that only branch on
                // network-level success still display the guidance.
                log::warn!("Prompt exceeded the upstream context window, returning overflow guidance");
                Ok(json_ok(Json(ErrorEnvelope::context_overflow())))
            }
        }
    }
}

/// Response to the browser preflight: no body, permissive CORS headers.
fn preflight() -> Response {
    let mut response = StatusCode::NO_CONTENT.into_response();
    let headers = response.headers_mut();

    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );

    response
}

fn json_ok(body: impl IntoResponse) -> Response {
    let mut response = body.into_response();

    response
        .headers_mut()
        .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));

    response
}
