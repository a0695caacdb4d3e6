//! Bounded JSON request/response codec for HTTP handlers.
//!
//! - Decoding reads at most 1 MiB (configurable) of the request body, parses
//!   exactly one JSON document and rejects anything but whitespace after it.
//! - Encoding serializes a value, merges caller headers, forces
//!   `Content-Type: application/json`, then writes status and body.
//! - Errors are reported to clients in a uniform envelope:
//!   `{"error":true,"message":"..."}`.
//!
//! # Quick Start
//!
//! ```
//! use http::{Response, StatusCode};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Credentials { email: String, password: String }
//!
//! let body = br#"{"email":"admin@example.com","password":"verysecret"}"#;
//! let mut response = Response::new(Vec::new());
//!
//! match jsonwire::decode_json::<Credentials, _>(&body[..]) {
//!     Ok(creds) => jsonwire::write_envelope(
//!         &mut response,
//!         StatusCode::ACCEPTED,
//!         &format!("Logged in user {}", creds.email),
//!         None::<()>,
//!     )
//!     .unwrap(),
//!     Err(err) => jsonwire::write_error(&mut response, &err, None).unwrap(),
//! }
//! assert_eq!(response.status(), StatusCode::ACCEPTED);
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `JSONWIRE_MAX_BODY_BYTES` | Request body ceiling in bytes (default: 1048576) |

pub mod codec;
pub mod decode;
pub mod encode;
pub mod envelope;
pub mod error;
pub mod limits;
pub mod sink;

// Re-export main types
pub use codec::JsonCodec;
pub use decode::{decode_json, decode_json_into, decode_json_with_limits};
pub use encode::{encode_json, respond_codec_error, write_envelope, write_error, APPLICATION_JSON};
pub use envelope::Envelope;
pub use error::{CodecError, CodecResult};
pub use limits::{
    ByteSize, JsonLimits, JsonLimitsOverrides, DEFAULT_MAX_BODY_BYTES, MAX_BODY_BYTES_ENV,
};
pub use sink::ResponseSink;
