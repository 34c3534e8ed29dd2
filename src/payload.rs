//! Request payload parsing — path ids and JSON bodies.
//!
//! Permissive mode (the default) keeps the lenient behavior existing clients
//! rely on: a malformed body reads as `{}` and a malformed id reads as `0`,
//! which no todo ever has, and update fields are written with whatever JSON
//! type they arrive in. Strict mode rejects all three with 400.

use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::store::TodoPatch;

/// Parse a `:id` path segment.
///
/// Permissive: the leading decimal digits are used (`"12abc"` → 12). No
/// leading digits, a minus sign, or overflow all yield 0.
pub fn parse_id(segment: &str, strict: bool) -> Result<u64, ApiError> {
    if strict {
        return segment.parse().map_err(|_| ApiError::InvalidId);
    }

    let s = segment.trim_start();
    let s = s.strip_prefix('+').unwrap_or(s);
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    Ok(s[..end].parse().unwrap_or(0))
}

/// Parse a request body as JSON.
///
/// An empty body is `{}` in both modes. Invalid JSON is `{}` unless `strict`.
pub fn parse_body(body: &[u8], strict: bool) -> Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    match serde_json::from_slice(body) {
        Ok(v) => Ok(v),
        Err(_) if strict => Err(ApiError::InvalidPayload),
        Err(_) => Ok(Value::Object(Map::new())),
    }
}

/// Extract the title for a new todo. Trimming and the emptiness check are the
/// store's job; this only coerces the JSON value to text.
pub fn create_title(body: &Value) -> Result<String, ApiError> {
    let obj = body.as_object().ok_or(ApiError::InvalidPayload)?;
    match obj.get("title") {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(Value::Array(_) | Value::Object(_)) => Err(ApiError::InvalidPayload),
    }
}

/// Build a partial update. Absent keys are left alone. Present keys are
/// written as given, unless `strict`, where they must carry the field's type.
pub fn update_patch(body: &Value, strict: bool) -> Result<TodoPatch, ApiError> {
    let obj = body.as_object().ok_or(ApiError::InvalidPayload)?;

    let title = obj.get("title").cloned();
    let completed = obj.get("completed").cloned();

    if strict {
        if title.as_ref().is_some_and(|v| !v.is_string()) {
            return Err(ApiError::InvalidPayload);
        }
        if completed.as_ref().is_some_and(|v| !v.is_boolean()) {
            return Err(ApiError::InvalidPayload);
        }
    }

    Ok(TodoPatch { title, completed })
}
