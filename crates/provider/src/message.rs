//! Human-readable rendering of provider error payloads

use serde_json::Value;

/// Render a provider error payload as `[code] [status] message`.
///
/// Accepts either the full response body (`{"error": {...}}`) or the inner
/// error object. Missing parts are dropped; a payload with no message at all
/// is rendered as its JSON text.
pub fn error_message(payload: &Value) -> String {
    match payload {
        Value::Null => "Unknown Error".to_string(),
        Value::String(s) => s.clone(),
        Value::Object(map) => {
            if let Some(inner) = map.get("error").filter(|e| e.is_object()) {
                let code = prefix(inner.get("code"));
                let status = prefix(inner.get("status"));
                let message = inner
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| inner.to_string());
                return format!("{code}{status}{message}");
            }
            match (map.get("code"), map.get("status"), map.get("message")) {
                (Some(_), Some(_), Some(Value::String(message))) => format!(
                    "{}{}{message}",
                    prefix(map.get("code")),
                    prefix(map.get("status"))
                ),
                (_, _, Some(Value::String(message))) => message.clone(),
                _ => payload.to_string(),
            }
        }
        other => other.to_string(),
    }
}

/// Parse a response body and render it; non-JSON bodies are returned trimmed.
pub fn error_message_from_body(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => error_message(&value),
        Err(_) => body.trim().to_string(),
    }
}

fn prefix(part: Option<&Value>) -> String {
    match part {
        Some(Value::String(s)) if !s.is_empty() => format!("[{s}] "),
        Some(Value::Number(n)) => format!("[{n}] "),
        _ => String::new(),
    }
}
