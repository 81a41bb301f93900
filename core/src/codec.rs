//! Pluggable body codecs.
//!
//! # Design
//! Codecs work on the `serde_json::Value` data model so they stay
//! object-safe and can be shared as `Arc<dyn Encoder>` / `Arc<dyn Decoder>`.
//! Typed values are converted to and from `Value` by the builder; a codec
//! only turns that model into bytes and back.

use bytes::Bytes;
use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::http::ContentType;

/// Turns a structured value into request body bytes.
pub trait Encoder: Send + Sync {
    fn encode(&self, value: &Value) -> Result<Bytes, String>;

    /// Media type of the bytes produced by `encode`.
    fn content_type(&self) -> ContentType;
}

/// Turns response body bytes into a structured value.
pub trait Decoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<Value, String>;
}

/// The default codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Encoder for JsonCodec {
    fn encode(&self, value: &Value) -> Result<Bytes, String> {
        serde_json::to_vec(value)
            .map(Bytes::from)
            .map_err(|e| e.to_string())
    }

    fn content_type(&self) -> ContentType {
        ContentType::Json
    }
}

impl Decoder for JsonCodec {
    fn decode(&self, bytes: &[u8]) -> Result<Value, String> {
        serde_json::from_slice(bytes).map_err(|e| e.to_string())
    }
}

/// `application/x-www-form-urlencoded` codec.
///
/// Encodes a flat object; nested arrays and objects are rejected. Decoding
/// yields an object whose values are all strings, and an empty body decodes
/// to `null`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormCodec;

impl Encoder for FormCodec {
    fn encode(&self, value: &Value) -> Result<Bytes, String> {
        let Value::Object(fields) = value else {
            return Err(format!("form body must be an object, got {}", type_name(value)));
        };
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, field) in fields {
            match field {
                Value::Null => {}
                Value::String(s) => {
                    serializer.append_pair(key, s);
                }
                Value::Bool(_) | Value::Number(_) => {
                    serializer.append_pair(key, &field.to_string());
                }
                Value::Array(_) | Value::Object(_) => {
                    return Err(format!("form field {key:?} must be a scalar"));
                }
            }
        }
        Ok(Bytes::from(serializer.finish()))
    }

    fn content_type(&self) -> ContentType {
        ContentType::FormUrlEncoded
    }
}

impl Decoder for FormCodec {
    fn decode(&self, bytes: &[u8]) -> Result<Value, String> {
        if bytes == b"null" || bytes.is_empty() {
            return Ok(Value::Null);
        }
        let fields: Map<String, Value> = form_urlencoded::parse(bytes)
            .map(|(key, value)| (key.into_owned(), Value::String(value.into_owned())))
            .collect();
        Ok(Value::Object(fields))
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn json_encodes_compactly() {
        let bytes = JsonCodec.encode(&json!({"name": "a"})).unwrap();
        assert_eq!(&bytes[..], br#"{"name":"a"}"#);
    }

    #[test]
    fn json_decode_rejects_garbage() {
        assert!(JsonCodec.decode(b"not json").is_err());
    }

    #[test]
    fn json_decodes_null_literal() {
        assert_eq!(JsonCodec.decode(b"null").unwrap(), Value::Null);
    }

    #[test]
    fn form_encodes_scalars() {
        let bytes = FormCodec
            .encode(&json!({"q": "rust lang", "page": 2, "exact": true, "skip": null}))
            .unwrap();
        let text = std::str::from_utf8(&bytes).unwrap();
        assert!(text.contains("q=rust+lang"));
        assert!(text.contains("page=2"));
        assert!(text.contains("exact=true"));
        assert!(!text.contains("skip"));
    }

    #[test]
    fn form_rejects_nested_values() {
        assert!(FormCodec.encode(&json!({"tags": ["a"]})).is_err());
        assert!(FormCodec.encode(&json!("plain")).is_err());
    }

    #[test]
    fn form_decodes_pairs_as_strings() {
        let value = FormCodec.decode(b"a=1&b=hello+world").unwrap();
        assert_eq!(value, json!({"a": "1", "b": "hello world"}));
    }
}
