//! Response decoding

use serde_json::{Map, Value};
use tss_core::{TssError, TssResult};

/// Bytes preceding the JSON payload in every response
pub const RESPONSE_HEADER_SIZE: usize = 8;

/// Telemetry object carried by a response
pub type Payload = Map<String, Value>;

/// Decode a raw response datagram into a JSON object.
///
/// The header is stripped only when the datagram is longer than it. The
/// payload ends at the first NUL byte and is whitespace-trimmed. Invalid
/// UTF-8 is rejected, and only a JSON object is accepted.
pub fn decode_response(raw: &[u8]) -> TssResult<Payload> {
    if raw.is_empty() {
        return Err(TssError::InvalidResponse("empty datagram".into()));
    }

    let payload = if raw.len() > RESPONSE_HEADER_SIZE {
        &raw[RESPONSE_HEADER_SIZE..]
    } else {
        raw
    };
    let payload = match payload.iter().position(|&b| b == 0) {
        Some(end) => &payload[..end],
        None => payload,
    };

    let text = std::str::from_utf8(payload)
        .map_err(|e| TssError::InvalidResponse(format!("payload is not UTF-8: {}", e)))?
        .trim();
    if text.is_empty() {
        return Err(TssError::InvalidResponse("empty payload".into()));
    }

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(TssError::InvalidResponse(format!(
            "expected JSON object, got {}",
            kind(&other)
        ))),
        Err(e) => Err(TssError::InvalidResponse(e.to_string())),
    }
}

/// Decode, collapsing every failure into "no data"
pub fn decode_payload(raw: &[u8]) -> Option<Payload> {
    match decode_response(raw) {
        Ok(map) => Some(map),
        Err(e) => {
            tracing::debug!("discarding response: {}", e);
            None
        }
    }
}

/// Build a response datagram the way the source does: zeroed header, JSON, NUL
pub fn encode_response(payload: &Value) -> Vec<u8> {
    let json = payload.to_string();
    let mut out = Vec::with_capacity(RESPONSE_HEADER_SIZE + json.len() + 1);
    out.extend_from_slice(&[0u8; RESPONSE_HEADER_SIZE]);
    out.extend_from_slice(json.as_bytes());
    out.push(0);
    out
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
