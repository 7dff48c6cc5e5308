//! Exhibit items and payload normalization.
//!
//! Curation responses arrive in several envelope shapes depending on the
//! upstream service: the interesting object may sit at the top level,
//! nested under `json`/`data`/`result`, or embedded as a JSON string in
//! a `text` field. Normalization tries each candidate shape in order and
//! falls through to the raw value, so ingestion never errors. The worst
//! outcome is an empty works list, which callers treat as "no update".

use serde_json::Value;

/// A single exhibit entry. Identity is `id`; two items with the same id
/// are the same artwork at different points in time.
#[derive(Debug, Clone, PartialEq)]
pub struct ExhibitItem {
    pub id: String,
    pub title: String,
    pub reason: String,
    pub url: String,
    /// Physical size hints in metres, when known.
    pub size_hint_w: Option<f32>,
    pub size_hint_h: Option<f32>,
}

/// Payload after envelope unwrapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedPayload {
    pub curator_comment: Option<String>,
    pub error: Option<String>,
    /// Plain-text reply, surfaced when no structured content matched.
    pub text: Option<String>,
    pub works: Vec<ExhibitItem>,
}

fn has_exhibit_fields(v: &Value) -> bool {
    v.get("curator_comment").is_some() || v.get("works").is_some()
}

/// Unwraps the response envelope.
///
/// Candidate shapes are tried in a fixed order, first match wins:
/// the value itself, then `json`, `data`, `result` wrappers, then a
/// `text` field holding an embedded JSON object. Anything else passes
/// through unchanged.
pub fn unwrap_envelope(value: &Value) -> Value {
    if has_exhibit_fields(value) {
        return value.clone();
    }

    for key in ["json", "data", "result"] {
        if let Some(inner) = value.get(key) {
            if has_exhibit_fields(inner) {
                return inner.clone();
            }
        }
    }

    if let Some(text) = value.get("text").and_then(Value::as_str) {
        let s = text.trim();
        if s.starts_with('{') && s.ends_with('}') {
            if let Ok(parsed) = serde_json::from_str::<Value>(s) {
                return parsed;
            }
        }
    }

    value.clone()
}

/// Extracts the ordered works list. Entries without an `id` are
/// discarded; everything else is defaulted, never rejected.
pub fn normalize_works(payload: &Value) -> Vec<ExhibitItem> {
    let Some(works) = payload.get("works").and_then(Value::as_array) else {
        return Vec::new();
    };

    works
        .iter()
        .filter_map(|w| {
            let id = match w.get("id") {
                Some(Value::String(s)) if !s.is_empty() => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => return None,
            };
            Some(ExhibitItem {
                id,
                title: str_field(w, "title"),
                reason: str_field(w, "reason"),
                url: str_field(w, "url"),
                size_hint_w: num_field(w, "w"),
                size_hint_h: num_field(w, "h"),
            })
        })
        .collect()
}

/// Full ingestion step: unwrap, then pull out the fields the client
/// surfaces (comment/error/text) alongside the filtered works.
pub fn normalize_payload(value: &Value) -> NormalizedPayload {
    let payload = unwrap_envelope(value);
    NormalizedPayload {
        curator_comment: payload
            .get("curator_comment")
            .and_then(Value::as_str)
            .map(str::to_owned),
        error: payload.get("error").and_then(Value::as_str).map(str::to_owned),
        text: payload
            .get("text")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned),
        works: normalize_works(&payload),
    }
}

fn str_field(v: &Value, key: &str) -> String {
    v.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn num_field(v: &Value, key: &str) -> Option<f32> {
    v.get(key).and_then(Value::as_f64).map(|n| n as f32)
}
