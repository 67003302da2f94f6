//! Mock upstream completion API for exercising the relay end to end.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use indoc::formatdoc;
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// Builder for the mock upstream server
pub struct UpstreamMockBuilder {
    reply_content: String,
    error: Option<(u16, String)>,
}

impl UpstreamMockBuilder {
    /// Set the assistant content returned on success
    pub fn with_reply(mut self, content: impl Into<String>) -> Self {
        self.reply_content = content.into();
        self
    }

    /// Make the mock answer every completion call with the given status
    /// and raw error body
    pub fn with_error(mut self, status: u16, body: impl Into<String>) -> Self {
        self.error = Some((status, body.into()));
        self
    }

    /// Start the mock server on an ephemeral port
    pub async fn spawn(self) -> UpstreamMock {
        let state = Arc::new(MockState {
            reply_content: self.reply_content,
            error: self.error,
            received: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1/chat/completions", post(chat_completions))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server time to start
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        UpstreamMock { address, state }
    }
}

/// A request the mock received on its completion endpoint
#[derive(Debug, Clone)]
pub struct ReceivedRequest {
    /// Value of the Authorization header, if any
    pub authorization: Option<String>,
    /// The JSON payload the relay forwarded
    pub body: Value,
}

/// Running mock upstream server
pub struct UpstreamMock {
    address: SocketAddr,
    state: Arc<MockState>,
}

impl UpstreamMock {
    pub fn builder() -> UpstreamMockBuilder {
        UpstreamMockBuilder {
            reply_content: "Hallo! Wie kann ich dir helfen?".to_string(),
            error: None,
        }
    }

    /// Relay configuration pointing at this mock, ready for `TestServer::start`
    pub fn config(&self) -> String {
        formatdoc! {r#"
            [relay]
            api_key = "sk-test"
            base_url = "http://{address}/v1"
        "#, address = self.address}
    }

    /// All requests received on the completion endpoint, in order
    pub fn received(&self) -> Vec<ReceivedRequest> {
        self.state.received.lock().unwrap().clone()
    }

    /// The single request the mock is expected to have received
    pub fn only_request(&self) -> ReceivedRequest {
        let received = self.received();
        assert_eq!(received.len(), 1, "expected exactly one upstream call");
        received.into_iter().next().unwrap()
    }
}

struct MockState {
    reply_content: String,
    error: Option<(u16, String)>,
    received: Mutex<Vec<ReceivedRequest>>,
}

async fn chat_completions(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let authorization = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let model = body["model"].as_str().unwrap_or("unknown").to_string();

    state.received.lock().unwrap().push(ReceivedRequest { authorization, body });

    if let Some((status, error_body)) = &state.error {
        let status = StatusCode::from_u16(*status).unwrap();
        return (status, error_body.clone()).into_response();
    }

    // Fixed id and timestamp keep relay output reproducible across calls
    let response = json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1700000000,
        "model": model,
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": state.reply_content,
            },
            "finish_reason": "stop",
        }],
        "usage": {
            "prompt_tokens": 10,
            "completion_tokens": 10,
            "total_tokens": 20,
        },
    });

    Json(response).into_response()
}
