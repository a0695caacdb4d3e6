//! Stateless codec bundling limits with the decode/encode operations.

use std::fmt::Display;
use std::io::Read;

use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::decode::{decode_json_into, decode_json_with_limits};
use crate::encode::{encode_json, respond_codec_error, write_envelope, write_error};
use crate::error::{CodecError, CodecResult};
use crate::limits::JsonLimits;
use crate::sink::ResponseSink;

/// Bounded JSON codec for HTTP handlers.
///
/// Holds nothing but its limits; share one per service and call it from any
/// number of handlers concurrently.
///
/// ```
/// use http::{Response, StatusCode};
/// use jsonwire::JsonCodec;
///
/// let codec = JsonCodec::default();
/// let mut response = Response::new(Vec::new());
///
/// match codec.decode::<serde_json::Value, _>(&b"{\"a\":1}{\"b\":2}"[..]) {
///     Ok(_) => unreachable!(),
///     Err(err) => codec.respond_error(&mut response, err).unwrap(),
/// }
/// assert_eq!(response.status(), StatusCode::BAD_REQUEST);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonCodec {
    limits: JsonLimits,
}

impl JsonCodec {
    /// Create a codec, rejecting unusable limits.
    pub fn new(limits: JsonLimits) -> CodecResult<Self> {
        limits.validate()?;
        Ok(Self { limits })
    }

    /// Create a codec from `JSONWIRE_*` environment variables.
    pub fn from_env() -> Self {
        Self {
            limits: JsonLimits::from_env(),
        }
    }

    pub fn limits(&self) -> &JsonLimits {
        &self.limits
    }

    /// Decode exactly one JSON document from a request body.
    pub fn decode<T, R>(&self, body: R) -> CodecResult<T>
    where
        T: DeserializeOwned,
        R: Read,
    {
        decode_json_with_limits(body, &self.limits)
    }

    /// Decode into a caller-owned destination.
    pub fn decode_into<T, R>(&self, body: R, destination: &mut T) -> CodecResult<()>
    where
        T: DeserializeOwned,
        R: Read,
    {
        decode_json_into(body, destination, &self.limits)
    }

    /// Encode `value` as the response body.
    pub fn encode<S, V>(
        &self,
        sink: &mut S,
        status: StatusCode,
        value: &V,
        headers: &[HeaderMap],
    ) -> CodecResult<()>
    where
        S: ResponseSink + ?Sized,
        V: Serialize + ?Sized,
    {
        encode_json(sink, status, value, headers)
    }

    /// Write an error envelope (default status `400 Bad Request`).
    pub fn write_error<S, E>(
        &self,
        sink: &mut S,
        err: &E,
        status: Option<StatusCode>,
    ) -> CodecResult<()>
    where
        S: ResponseSink + ?Sized,
        E: Display + ?Sized,
    {
        write_error(sink, err, status)
    }

    /// Write a success envelope.
    pub fn write_envelope<S, T>(
        &self,
        sink: &mut S,
        status: StatusCode,
        message: &str,
        data: Option<T>,
    ) -> CodecResult<()>
    where
        S: ResponseSink + ?Sized,
        T: Serialize,
    {
        write_envelope(sink, status, message, data)
    }

    /// Report a codec failure with its mapped status.
    pub fn respond_error<S>(&self, sink: &mut S, err: CodecError) -> CodecResult<()>
    where
        S: ResponseSink + ?Sized,
    {
        respond_codec_error(sink, err)
    }
}
