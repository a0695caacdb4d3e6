//! JSON response encoding.
//!
//! Serialization happens before anything touches the sink, so a value that
//! cannot be represented as JSON leaves the response untouched. Header merge
//! order is fixed: caller header sets in sequence, then `Content-Type`.

use std::fmt::Display;

use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, StatusCode};
use serde::Serialize;
use tracing::{debug, trace};

use crate::envelope::Envelope;
use crate::error::{CodecError, CodecResult};
use crate::sink::ResponseSink;

/// MIME type forced on every encoded response.
pub const APPLICATION_JSON: &str = "application/json";

/// Serialize `value` and write it with `status` and the merged `headers`.
///
/// Header sets are applied in order; a key present in a later set replaces
/// every value an earlier set (or the sink) held for it. `Content-Type` is
/// set to `application/json` last, whatever the caller supplied.
pub fn encode_json<S, V>(
    sink: &mut S,
    status: StatusCode,
    value: &V,
    headers: &[HeaderMap],
) -> CodecResult<()>
where
    S: ResponseSink + ?Sized,
    V: Serialize + ?Sized,
{
    let body = serde_json::to_vec(value).map_err(CodecError::SerializationFailed)?;

    let target = sink.headers_mut();
    merge_headers(target, headers);
    target.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));

    sink.write_status(status)?;
    sink.write_body(&body)?;

    debug!(
        status = status.as_u16(),
        bytes = body.len(),
        "wrote JSON response"
    );
    Ok(())
}

/// Write a failure envelope for `err`.
///
/// `status` defaults to `400 Bad Request`. The envelope carries the error's
/// display text and no `data`.
pub fn write_error<S, E>(sink: &mut S, err: &E, status: Option<StatusCode>) -> CodecResult<()>
where
    S: ResponseSink + ?Sized,
    E: Display + ?Sized,
{
    let status = status.unwrap_or(StatusCode::BAD_REQUEST);
    let payload: Envelope = Envelope::from_error(err);
    encode_json(sink, status, &payload, &[])
}

/// Write a success envelope with an optional payload.
pub fn write_envelope<S, T>(
    sink: &mut S,
    status: StatusCode,
    message: &str,
    data: Option<T>,
) -> CodecResult<()>
where
    S: ResponseSink + ?Sized,
    T: Serialize,
{
    let payload = Envelope {
        error: false,
        message: message.to_string(),
        data,
    };
    encode_json(sink, status, &payload, &[])
}

/// Report a codec failure to the client.
///
/// Client-side errors become an error envelope with
/// [`CodecError::status_code`]. `Io` errors mean the stream or sink is broken,
/// so nothing is written and the error is handed back.
pub fn respond_codec_error<S>(sink: &mut S, err: CodecError) -> CodecResult<()>
where
    S: ResponseSink + ?Sized,
{
    match err {
        CodecError::Io(e) => Err(CodecError::Io(e)),
        other => {
            let status = other.status_code();
            debug!(status = status.as_u16(), "responding with codec error envelope");
            write_error(sink, &other, Some(status))
        }
    }
}

fn merge_headers(target: &mut HeaderMap, sets: &[HeaderMap]) {
    for set in sets {
        for name in set.keys() {
            trace!(header = %name, "applying response header");
            target.remove(name);
            for value in set.get_all(name) {
                target.append(name.clone(), value.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::ByteSize;
    use http::header::{HeaderName, CACHE_CONTROL, SET_COOKIE};
    use http::Response;
    use serde_json::{json, Value};
    use std::collections::BTreeMap;

    fn response() -> Response<Vec<u8>> {
        Response::new(Vec::new())
    }

    fn header_set(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for &(name, value) in pairs {
            map.append(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
        map
    }

    #[test]
    fn test_encode_status_headers_body() {
        let mut resp = response();
        encode_json(
            &mut resp,
            StatusCode::CREATED,
            &json!({"id": 5}),
            &[header_set(&[("x-foo", "bar")])],
        )
        .unwrap();

        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(resp.headers()["x-foo"], "bar");
        assert_eq!(resp.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(resp.body(), br#"{"id":5}"#);
    }

    #[test]
    fn test_content_type_cannot_be_overridden() {
        let mut resp = response();
        encode_json(
            &mut resp,
            StatusCode::OK,
            &json!(true),
            &[header_set(&[("content-type", "text/html")])],
        )
        .unwrap();

        let values: Vec<_> = resp.headers().get_all(CONTENT_TYPE).iter().collect();
        assert_eq!(values, vec!["application/json"]);
    }

    #[test]
    fn test_later_header_sets_win_per_key() {
        let mut resp = response();
        let first = header_set(&[("x-trace", "one"), ("cache-control", "no-store")]);
        let second = header_set(&[("x-trace", "two")]);
        encode_json(&mut resp, StatusCode::OK, &json!({}), &[first, second]).unwrap();

        let traces: Vec<_> = resp.headers().get_all("x-trace").iter().collect();
        assert_eq!(traces, vec!["two"]);
        assert_eq!(resp.headers()[CACHE_CONTROL], "no-store");
    }

    #[test]
    fn test_multi_valued_header_kept_within_one_set() {
        let mut resp = response();
        ResponseSink::headers_mut(&mut resp)
            .insert(SET_COOKIE, HeaderValue::from_static("stale=1"));
        let cookies = header_set(&[("set-cookie", "a=1"), ("set-cookie", "b=2")]);
        encode_json(&mut resp, StatusCode::OK, &json!(null), &[cookies]).unwrap();

        let values: Vec<_> = resp.headers().get_all(SET_COOKIE).iter().collect();
        assert_eq!(values, vec!["a=1", "b=2"]);
    }

    #[test]
    fn test_serialization_failure_writes_nothing() {
        // Non-string map keys cannot be represented as JSON object keys.
        let mut unencodable = BTreeMap::new();
        unencodable.insert(vec![1u8, 2], "value");

        let mut resp = response();
        let result = encode_json(
            &mut resp,
            StatusCode::OK,
            &unencodable,
            &[header_set(&[("x-foo", "bar")])],
        );

        assert!(matches!(result, Err(CodecError::SerializationFailed(_))));
        assert!(resp.headers().is_empty());
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.body().is_empty());
    }

    #[test]
    fn test_write_error_defaults_to_bad_request() {
        let mut resp = response();
        write_error(&mut resp, "bad input", None).unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(resp.body(), br#"{"error":true,"message":"bad input"}"#);
        assert_eq!(resp.headers()[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_write_error_with_status() {
        let mut resp = response();
        let err = std::io::Error::other("upstream unavailable");
        write_error(&mut resp, &err, Some(StatusCode::BAD_GATEWAY)).unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let body: Value = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(
            body,
            json!({"error": true, "message": "upstream unavailable"})
        );
    }

    #[test]
    fn test_write_envelope_with_and_without_data() {
        let mut resp = response();
        write_envelope(&mut resp, StatusCode::ACCEPTED, "Logged in", Some(json!({"id": 1})))
            .unwrap();
        assert_eq!(
            resp.body(),
            br#"{"error":false,"message":"Logged in","data":{"id":1}}"#
        );

        let mut resp = response();
        write_envelope::<_, Value>(&mut resp, StatusCode::OK, "pong", None).unwrap();
        assert_eq!(resp.body(), br#"{"error":false,"message":"pong"}"#);
    }

    #[test]
    fn test_respond_codec_error_maps_status() {
        let mut resp = response();
        respond_codec_error(
            &mut resp,
            CodecError::TooLarge {
                limit: ByteSize(1_048_576),
            },
        )
        .unwrap();

        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body: Value = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(
            body["message"],
            "JSON data is too large and exceeds the maximum buffer size (1MB)"
        );
    }

    #[test]
    fn test_respond_codec_error_does_not_write_io() {
        let mut resp = response();
        let err = CodecError::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "reset",
        ));
        let result = respond_codec_error(&mut resp, err);

        assert!(
            matches!(result, Err(CodecError::Io(ref e)) if e.kind() == std::io::ErrorKind::ConnectionReset)
        );
        assert!(resp.body().is_empty());
        assert!(resp.headers().is_empty());
    }
}
