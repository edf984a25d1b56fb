//! Response envelope normalization.
//!
//! Read endpoints answer `{"status": "OK", "payload": [...]}`; write endpoints
//! answer `{"result": [...]}` or `{"result": {...}}`. Both collapse into
//! [`Envelope`] here so nothing above this module sees the wire shape.

use audit_core::ports::Envelope;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::RemoteError;

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    payload: Option<Value>,
    #[serde(default)]
    result: Option<Value>,
}

/// Parse a response body into an envelope of wire rows.
///
/// `ok` is the reported status when present (`"OK"`, case-insensitive);
/// otherwise it is true when the body carried a `payload` or `result`.
pub fn parse_envelope<W: DeserializeOwned>(body: &str) -> Result<Envelope<W>, RemoteError> {
    let raw: RawEnvelope =
        serde_json::from_str(body).map_err(|e| RemoteError::Parse(format!("envelope: {e}")))?;

    let has_data = raw.payload.is_some() || raw.result.is_some();
    let ok = raw
        .status
        .as_deref()
        .map_or(has_data, |s| s.eq_ignore_ascii_case("ok"));

    let rows = match raw.payload.or(raw.result) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(single @ Value::Object(_)) => vec![single],
        Some(other) => {
            return Err(RemoteError::Parse(format!(
                "expected array or object, got {other}"
            )));
        }
    };

    let items = rows
        .into_iter()
        .map(|row| {
            serde_json::from_value(row).map_err(|e| RemoteError::Parse(format!("row: {e}")))
        })
        .collect::<Result<Vec<W>, _>>()?;

    Ok(Envelope { ok, items })
}

/// Map every item of an envelope, keeping `ok`.
pub fn map_items<W, T>(envelope: Envelope<W>, f: impl FnMut(W) -> T) -> Envelope<T> {
    Envelope {
        ok: envelope.ok,
        items: envelope.items.into_iter().map(f).collect(),
    }
}
