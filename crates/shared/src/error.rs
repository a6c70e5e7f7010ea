use serde::{Deserialize, Serialize};

/// Error body returned by the contract and auth services: `{"detail": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Validation(Vec<ValidationIssue>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    #[serde(default)]
    pub loc: Vec<serde_json::Value>,
    pub msg: String,
}

impl ErrorDetail {
    pub fn message(&self) -> String {
        match self {
            ErrorDetail::Message(message) => message.clone(),
            ErrorDetail::Validation(issues) => issues
                .iter()
                .map(|issue| {
                    let location = issue
                        .loc
                        .iter()
                        .map(|part| match part {
                            serde_json::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect::<Vec<_>>()
                        .join(".");
                    if location.is_empty() {
                        issue.msg.clone()
                    } else {
                        format!("{location}: {}", issue.msg)
                    }
                })
                .collect::<Vec<_>>()
                .join("; "),
        }
    }
}

/// Best-effort extraction of a human-readable message from a raw error body.
pub fn detail_message(raw_body: &str) -> Option<String> {
    let body: ErrorBody = serde_json::from_str(raw_body).ok()?;
    let message = body.detail.message();
    (!message.trim().is_empty()).then_some(message)
}
