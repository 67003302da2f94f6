use serde::{Deserialize, Serialize};

/// Inbound chat request from the browser UI.
///
/// `message` is the latest user utterance, which may already embed
/// serialized file contents. `messages` carries the prior turns in
/// chronological order.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChatRequest {
    #[serde(default)]
    pub(crate) message: String,
    #[serde(default)]
    pub(crate) messages: Vec<ChatMessage>,
    #[serde(default)]
    pub(crate) files: Vec<FileAttachment>,
}

/// Chat message in OpenAI format.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub(crate) struct ChatMessage {
    pub(crate) role: Role,
    pub(crate) content: String,
}

/// Message role on the upstream wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Role {
    System,
    User,
    Assistant,
}

/// Descriptor of a file the user attached to the current turn. The file
/// text itself is embedded in `message` by the caller; the relay only
/// cares that files are present.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FileAttachment {
    #[serde(default)]
    pub(crate) name: String,
    #[serde(default)]
    #[expect(dead_code)] // accepted from the wire, only name is logged so far
    pub(crate) size: Option<u64>,
}

/// Outgoing request envelope for the upstream completion API.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CompletionRequest {
    pub(crate) model: String,
    pub(crate) messages: Vec<ChatMessage>,
    pub(crate) max_tokens: u32,
    pub(crate) temperature: f32,
}

/// Error body for validation and method failures: `{ "error": ... }`.
#[derive(Debug, Serialize)]
pub(crate) struct ErrorBody {
    pub(crate) error: String,
}

/// Failure response shaped like a success response, so a caller that
/// only reads `choices[0].message.content` still renders something
/// useful.
#[derive(Debug, Serialize)]
pub(crate) struct ErrorEnvelope {
    pub(crate) error: String,
    pub(crate) choices: Vec<EnvelopeChoice>,
}

#[derive(Debug, Serialize)]
pub(crate) struct EnvelopeChoice {
    pub(crate) message: EnvelopeMessage,
}

#[derive(Debug, Serialize)]
pub(crate) struct EnvelopeMessage {
    pub(crate) content: String,
}

/// Fallback assistant content for unexpected failures.
pub(crate) const TECHNICAL_FAILURE_CONTENT: &str =
    "Entschuldigung, es gab einen technischen Fehler. Bitte versuche es erneut.";

/// Guidance shown when the combined prompt exceeds the model's context
/// window. Bilingual so it stays readable outside the German UI.
pub(crate) const CONTEXT_OVERFLOW_CONTENT: &str = "Entschuldigung, deine Nachricht ist zusammen mit den Dateiinhalten zu lang für das Modell. Bitte kürze den Text oder teile die Datei in kleinere Abschnitte auf. (Sorry, your message including the file contents is too long for the model. Please shorten it or split the file into smaller parts.)";

impl ErrorEnvelope {
    pub(crate) fn new(error: impl Into<String>, fallback_content: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            choices: vec![EnvelopeChoice {
                message: EnvelopeMessage {
                    content: fallback_content.into(),
                },
            }],
        }
    }

    /// Envelope for the context-length overflow case, delivered with
    /// HTTP 200 so naive callers render it as a normal assistant turn.
    pub(crate) fn context_overflow() -> Self {
        Self::new("context_length_exceeded", CONTEXT_OVERFLOW_CONTENT)
    }
}
