//! Jira REST DTOs

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Issue as returned by `GET /issue/{key}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub key: String,
    pub fields: IssueFields,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueFields {
    #[serde(default)]
    pub summary: String,
    /// Plain text on Jira Server; may be null or a document object elsewhere
    pub description: Option<JsonValue>,
    pub status: Option<IssueStatus>,
    #[serde(default)]
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueStatus {
    pub name: String,
}

impl Issue {
    /// Description text, when the description is a plain string
    pub fn description_text(&self) -> Option<&str> {
        self.fields.description.as_ref().and_then(JsonValue::as_str)
    }
}

/// Error body Jira returns with non-2xx responses
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorCollection {
    #[serde(default)]
    pub error_messages: Vec<String>,
    #[serde(default)]
    pub errors: JsonValue,
}

impl ErrorCollection {
    pub fn message(&self) -> String {
        let mut messages = self.error_messages.clone();
        if let Some(fields) = self.errors.as_object() {
            for (field, reason) in fields {
                let reason = reason
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| reason.to_string());
                messages.push(format!("{}: {}", field, reason));
            }
        }
        messages.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_description_text() {
        let issue: Issue = serde_json::from_str(
            r#"{"id": "10001", "key": "REL-12",
                "fields": {"summary": "Sprint 42 release",
                           "description": "line one\nline two"}}"#,
        )
        .unwrap();

        assert_eq!(issue.description_text(), Some("line one\nline two"));
    }

    #[test]
    fn test_missing_description() {
        let issue: Issue = serde_json::from_str(
            r#"{"id": "10001", "key": "REL-12", "fields": {"description": null}}"#,
        )
        .unwrap();

        assert_eq!(issue.description_text(), None);
    }

    #[test]
    fn test_error_collection_message() {
        let errors: ErrorCollection = serde_json::from_str(
            r#"{"errorMessages": ["Issue does not exist or you do not have permission to see it."],
                "errors": {}}"#,
        )
        .unwrap();

        assert_eq!(
            errors.message(),
            "Issue does not exist or you do not have permission to see it."
        );
    }
}
