//! Uniform response envelope.
//!
//! # Wire format
//!
//! ```text
//! {"error":true,"message":"bad input"}
//! {"error":false,"message":"created","data":{"id":5}}
//! ```
//!
//! `data` is omitted, not `null`, when it is not set.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Response envelope used for every codec-produced JSON body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = serde_json::Value> {
    /// True iff the envelope represents a failure.
    pub error: bool,
    /// Human-readable message.
    pub message: String,
    /// Optional success payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Successful envelope without data.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            error: false,
            message: message.into(),
            data: None,
        }
    }

    /// Failure envelope. Failures never carry data.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
            data: None,
        }
    }

    /// Failure envelope carrying the error's display text.
    pub fn from_error<E: Display + ?Sized>(err: &E) -> Self {
        Self::failure(err.to_string())
    }

    /// Attach a payload.
    pub fn with_data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }
}
