//! JSON-RPC 2.0 envelope codec.
//!
//! Requests are serialized straight from the caller's typed parameters.
//! Responses are decoded in two phases: [`decode_response`] parses the
//! envelope and keeps `result` as an untouched [`RawValue`], then
//! [`decode_result`] turns that payload into the method-specific shape.
//! The codec itself never needs to know what a method returns.

use crate::error::{ErrorCode, RpcError};
use serde::de::{DeserializeOwned, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::value::RawValue;
use serde_json::Value;
use std::fmt;

/// Protocol version sent in every request.
pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC 2.0 request envelope.
#[derive(Serialize)]
struct RequestEnvelope<'a, P> {
    jsonrpc: &'static str,
    method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<&'a P>,
    id: u64,
}

/// A request envelope as seen by the server side.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IncomingRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
    #[serde(default)]
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Wire form of the response. `result` and `error` may each be absent or
/// `null`; [`decode_response`] folds them into a [`Payload`].
///
/// Only a JSON object is accepted; a derived `Deserialize` would also take
/// an array and match its elements to fields by position.
#[derive(Default)]
struct RawResponse {
    jsonrpc: Option<String>,
    id: Option<Value>,
    result: Option<Box<RawValue>>,
    error: Option<ErrorObject>,
}

impl<'de> Deserialize<'de> for RawResponse {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RawResponseVisitor)
    }
}

struct RawResponseVisitor;

impl<'de> Visitor<'de> for RawResponseVisitor {
    type Value = RawResponse;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON-RPC response object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawResponse, A::Error> {
        let mut resp = RawResponse::default();
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "jsonrpc" => resp.jsonrpc = map.next_value()?,
                "id" => resp.id = map.next_value()?,
                "result" => resp.result = map.next_value()?,
                "error" => resp.error = map.next_value()?,
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(resp)
    }
}

/// Either the opaque result or the server's error, never both.
#[derive(Debug)]
pub enum Payload {
    Result(Box<RawValue>),
    Error(ErrorObject),
}

/// Decoded JSON-RPC 2.0 response envelope.
#[derive(Debug)]
pub struct ResponseEnvelope {
    pub jsonrpc: Option<String>,
    pub id: Option<Value>,
    pub payload: Payload,
}

impl ResponseEnvelope {
    /// Hand back the raw result, or the server error classified as
    /// [`RpcError::Rpc`].
    pub fn into_result(self, method: &str) -> Result<Box<RawValue>, RpcError> {
        match self.payload {
            Payload::Result(raw) => Ok(raw),
            Payload::Error(err) => Err(RpcError::Rpc {
                method: method.to_string(),
                code: err.code,
                kind: ErrorCode::from_code(err.code),
                message: err.message,
                data: err.data,
            }),
        }
    }
}

/// Serialize a request envelope. `params` is omitted from the output when
/// `None`.
pub fn encode_request<P: Serialize>(
    method: &str,
    params: Option<&P>,
    id: u64,
) -> Result<Vec<u8>, RpcError> {
    if method.is_empty() {
        return Err(RpcError::Encode {
            method: String::new(),
            reason: "method name is empty".to_string(),
        });
    }

    let envelope = RequestEnvelope {
        jsonrpc: JSONRPC_VERSION,
        method,
        params,
        id,
    };
    serde_json::to_vec(&envelope).map_err(|e| RpcError::Encode {
        method: method.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a request envelope.
pub fn decode_request(bytes: &[u8]) -> Result<IncomingRequest, RpcError> {
    serde_json::from_slice(bytes).map_err(|e| RpcError::Decode {
        method: "<incoming request>".to_string(),
        source: e,
    })
}

/// Parse a response envelope for `method`.
///
/// When `expected_id` is given, an echoed id that is present, non-null and
/// different from it is rejected. Servers that leave the id out are accepted.
pub fn decode_response(
    method: &str,
    bytes: &[u8],
    expected_id: Option<u64>,
) -> Result<ResponseEnvelope, RpcError> {
    let raw: RawResponse = serde_json::from_slice(bytes).map_err(|e| RpcError::Decode {
        method: method.to_string(),
        source: e,
    })?;

    if let (Some(expected), Some(got)) = (expected_id, raw.id.as_ref()) {
        if !id_matches(expected, got) {
            return Err(RpcError::IdMismatch {
                method: method.to_string(),
                expected,
                got: got.clone(),
            });
        }
    }

    let payload = match (raw.error, raw.result) {
        (Some(err), _) => Payload::Error(err),
        (None, Some(result)) => Payload::Result(result),
        (None, None) => {
            return Err(RpcError::MissingResult {
                method: method.to_string(),
            })
        }
    };

    Ok(ResponseEnvelope {
        jsonrpc: raw.jsonrpc,
        id: raw.id,
        payload,
    })
}

/// Second decoding phase: turn an opaque result into `R`.
pub fn decode_result<R: DeserializeOwned>(method: &str, raw: &RawValue) -> Result<R, RpcError> {
    serde_json::from_str(raw.get()).map_err(|e| RpcError::UnexpectedResult {
        method: method.to_string(),
        source: e,
    })
}

fn id_matches(expected: u64, got: &Value) -> bool {
    match got {
        Value::Null => true,
        Value::Number(n) => n.as_u64() == Some(expected),
        // Some wallet builds echo the id as a string.
        Value::String(s) => s.parse::<u64>().ok() == Some(expected),
        _ => false,
    }
}
