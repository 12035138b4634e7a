use crate::schema::TypeCode;

/// Failure to turn a wire scalar into a typed [`Value`](crate::Value).
///
/// Fatal to the single decode call only: rows decoded before the failure
/// are not affected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    /// The raw scalar cannot be parsed as the declared type
    /// (bad base64, bad RFC 3339, wrong JSON kind, row/column count mismatch).
    #[error("malformed value: {0}")]
    MalformedValue(String),

    /// The declared type has no decoding rule.
    #[error("unsupported type: {0}")]
    UnsupportedType(TypeCode),
}

impl DecodeError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedValue(msg.into())
    }

    /// Add context to the error, preserving the variant.
    ///
    /// `MalformedValue` produces `"context: original message"`.
    /// `UnsupportedType` keeps its code untouched, the context is only
    /// useful for malformed input.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            DecodeError::MalformedValue(msg) => DecodeError::MalformedValue(format!("{ctx}: {msg}")),
            other => other,
        }
    }
}
