//! Error types for the JSON codec.

use http::StatusCode;

use crate::limits::ByteSize;

/// Codec errors.
///
/// Decode-side failures are `MalformedJson`, `TooLarge` and
/// `MultipleDocuments`; encode-side failures are `SerializationFailed`.
/// `Io` carries read/write errors from the body or the response sink as-is.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The first JSON document could not be parsed into the destination.
    #[error("malformed JSON: {0}")]
    MalformedJson(#[source] serde_json::Error),

    /// The body was truncated by the size ceiling.
    #[error("JSON data is too large and exceeds the maximum buffer size ({limit})")]
    TooLarge { limit: ByteSize },

    /// Something other than whitespace followed the first document.
    #[error("request body contains more than one JSON object, which is not allowed")]
    MultipleDocuments,

    /// The response value is not representable as JSON.
    #[error("failed to serialize JSON response: {0}")]
    SerializationFailed(#[source] serde_json::Error),

    /// Read or write failure from the underlying stream or sink.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Rejected limit configuration.
    #[error("invalid codec limits: {message}")]
    InvalidLimits { message: String },
}

impl CodecError {
    /// Suggested HTTP status for reporting this error to a client.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::MalformedJson(_) | Self::MultipleDocuments => StatusCode::BAD_REQUEST,
            Self::SerializationFailed(_) | Self::Io(_) | Self::InvalidLimits { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Whether the error came from the client's request body.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedJson(_) | Self::TooLarge { .. } | Self::MultipleDocuments
        )
    }
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
