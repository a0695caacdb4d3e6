//! Bounded, single-document JSON decoding of request bodies.
//!
//! The body is read through a [`LimitReader`] so at most the configured
//! ceiling (plus one probe byte) is ever pulled from the source. After the
//! first document, the remainder of the stream must be whitespace up to end of
//! stream. The three outcomes of that check are kept apart:
//!
//! - clean end of stream: success
//! - ceiling hit while reading: [`CodecError::TooLarge`]
//! - anything else after the document: [`CodecError::MultipleDocuments`]

use std::io::{BufReader, Read};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::{CodecError, CodecResult};
use crate::limits::{JsonLimits, LimitReader};

/// Where parsing stopped.
enum DecodeFailure {
    /// The first document did not parse.
    Document(serde_json::Error),
    /// The document parsed but the stream did not end cleanly.
    Trailing(serde_json::Error),
}

/// Decode exactly one JSON document from `body` under the default 1 MiB ceiling.
///
/// ```
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Login { email: String }
///
/// let login: Login = jsonwire::decode_json(&br#"{"email":"a@b.c"}"#[..]).unwrap();
/// assert_eq!(login.email, "a@b.c");
///
/// let err = jsonwire::decode_json::<Login, _>(&br#"{"email":"a"}{"email":"b"}"#[..]);
/// assert!(matches!(err, Err(jsonwire::CodecError::MultipleDocuments)));
/// ```
pub fn decode_json<T, R>(body: R) -> CodecResult<T>
where
    T: DeserializeOwned,
    R: Read,
{
    decode_json_with_limits(body, &JsonLimits::default())
}

/// Decode exactly one JSON document from `body` under `limits`.
pub fn decode_json_with_limits<T, R>(body: R, limits: &JsonLimits) -> CodecResult<T>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut limited = LimitReader::new(body, limits.max_body_bytes);
    let outcome = parse_single_document::<T, _>(&mut limited);

    if limited.exceeded() {
        return Err(CodecError::TooLarge {
            limit: limits.max_body_size(),
        });
    }

    match outcome {
        Ok(value) => {
            debug!(
                bytes = limited.bytes_read(),
                limit = limits.max_body_bytes,
                "decoded JSON request body"
            );
            Ok(value)
        }
        Err(DecodeFailure::Document(e)) if e.is_io() => Err(CodecError::Io(e.into())),
        Err(DecodeFailure::Document(e)) => Err(CodecError::MalformedJson(e)),
        Err(DecodeFailure::Trailing(e)) if e.is_io() => Err(CodecError::Io(e.into())),
        Err(DecodeFailure::Trailing(_)) => Err(CodecError::MultipleDocuments),
    }
}

/// Decode into a caller-owned destination.
///
/// `destination` is only assigned once the whole body has been accepted; on
/// error it keeps its previous value.
pub fn decode_json_into<T, R>(
    body: R,
    destination: &mut T,
    limits: &JsonLimits,
) -> CodecResult<()>
where
    T: DeserializeOwned,
    R: Read,
{
    *destination = decode_json_with_limits(body, limits)?;
    Ok(())
}

fn parse_single_document<T, R>(reader: R) -> Result<T, DecodeFailure>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut de = serde_json::Deserializer::from_reader(BufReader::new(reader));
    let value = T::deserialize(&mut de).map_err(DecodeFailure::Document)?;
    // Consumes trailing whitespace up to end of stream; fails on anything else.
    de.end().map_err(DecodeFailure::Trailing)?;
    Ok(value)
}
