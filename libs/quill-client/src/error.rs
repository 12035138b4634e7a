use quill_api::DecodeError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("config error: {0}")]
    Config(String),

    /// Non-2xx response or a response body of unrecognized shape.
    /// Never retried internally.
    #[error("remote error: {0}")]
    Remote(String),

    /// The request never produced a response (connect failure, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("request serialization: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// Add context to the error.
    ///
    /// `Decode` keeps its inner variant; the other message-carrying variants
    /// get `"context: original message"`.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            ClientError::Config(msg) => ClientError::Config(format!("{ctx}: {msg}")),
            ClientError::Remote(msg) => ClientError::Remote(format!("{ctx}: {msg}")),
            ClientError::Transport(msg) => ClientError::Transport(format!("{ctx}: {msg}")),
            ClientError::Decode(e) => ClientError::Decode(e.with_context(ctx)),
            other => other,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
