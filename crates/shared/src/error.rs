use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error body returned by the service for failed requests. `detail` is a string
/// for handled failures and a list of field errors for rejected payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceErrorBody {
    pub detail: Value,
}

impl ServiceErrorBody {
    pub fn detail_text(&self) -> Option<String> {
        match &self.detail {
            Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            Value::Array(items) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .collect();
                (!messages.is_empty()).then(|| messages.join("; "))
            }
            _ => None,
        }
    }
}
