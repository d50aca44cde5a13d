//! Batch validation types

use careguard_core::{Error, Result, ValidationResult};
use serde::{Deserialize, Serialize};

/// One entry of a batch: a domain tag and its untyped payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItem {
    /// Caller's correlation id, echoed back
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(alias = "type")]
    pub domain: String,

    #[serde(alias = "data", default)]
    pub payload: serde_json::Value,
}

impl BatchItem {
    pub fn new(domain: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            id: None,
            domain: domain.into(),
            payload,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Result for one batch entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub domain: String,
    pub result: ValidationResult,
}

/// Results of a batch, in request order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOutcome {
    pub batch_size: usize,
    pub results: Vec<BatchEntry>,
}

impl BatchOutcome {
    /// Entries that ended in an escalation
    pub fn escalations(&self) -> impl Iterator<Item = &BatchEntry> {
        self.results.iter().filter(|e| e.result.status.is_escalation())
    }
}

/// Parse a batch document: either a JSON array of items or `{"requests": [...]}`
pub fn parse_batch(json: &str) -> Result<Vec<BatchItem>> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Document {
        List(Vec<BatchItem>),
        Wrapped { requests: Vec<BatchItem> },
    }

    match serde_json::from_str::<Document>(json) {
        Ok(Document::List(items)) | Ok(Document::Wrapped { requests: items }) => Ok(items),
        Err(e) => Err(Error::config(format!("invalid batch document: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_legacy_field_names() {
        let items = parse_batch(
            r#"[
                {"id": "req_1", "type": "chat", "data": {"message": "Olá, como posso ajudar?"}},
                {"domain": "clinical", "payload": {"content": "Use fio dental todos os dias."}}
            ]"#,
        )
        .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id.as_deref(), Some("req_1"));
        assert_eq!(items[0].domain, "chat");
        assert_eq!(items[1].payload["content"], "Use fio dental todos os dias.");
    }

    #[test]
    fn test_parse_wrapped_document() {
        let items = parse_batch(r#"{"requests": [{"domain": "chat"}]}"#).unwrap();
        assert_eq!(items[0].payload, serde_json::Value::Null);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_batch("{\"items\": 3}").is_err());
    }
}
