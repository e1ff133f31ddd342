//! Remote operation handles

use serde::{Deserialize, Serialize};

/// An in-flight (or finished) deployment mutation on the remote service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Remote-assigned operation name, used to query its status
    pub name: String,

    /// Kind of mutation (e.g., "insert", "update", "delete")
    #[serde(default)]
    pub operation_type: String,

    /// Current status
    #[serde(default)]
    pub status: OperationStatus,

    /// Link to the deployment this operation acts on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_link: Option<String>,

    /// Progress hint in percent, when reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<i32>,

    /// Errors reported once the operation is done
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationErrors>,
}

impl Operation {
    pub fn new(name: impl Into<String>, operation_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operation_type: operation_type.into(),
            status: OperationStatus::Pending,
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: OperationStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error
            .get_or_insert_with(OperationErrors::default)
            .errors
            .push(OperationErrorDetail {
                code: None,
                location: None,
                message: message.into(),
            });
        self
    }

    pub fn is_done(&self) -> bool {
        self.status == OperationStatus::Done
    }

    /// First reported error, if any. Later errors are not surfaced.
    pub fn first_error(&self) -> Option<&OperationErrorDetail> {
        self.error.as_ref().and_then(|e| e.errors.first())
    }
}

/// Status of an operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    Pending,
    Running,
    /// Terminal; the operation may still carry errors
    Done,
    #[default]
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationStatus::Pending => write!(f, "PENDING"),
            OperationStatus::Running => write!(f, "RUNNING"),
            OperationStatus::Done => write!(f, "DONE"),
            OperationStatus::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationErrors {
    #[serde(default)]
    pub errors: Vec<OperationErrorDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationErrorDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_done_with_errors() {
        let op: Operation = serde_json::from_value(json!({
            "kind": "deploymentmanager#operation",
            "name": "operation-1234-abcd",
            "operationType": "insert",
            "status": "DONE",
            "targetLink": "https://www.googleapis.com/deploymentmanager/v2beta/projects/p/global/deployments/d",
            "progress": 100,
            "error": {
                "errors": [
                    {"code": "RESOURCE_ERROR", "location": "/deployments/d/resources/vm", "message": "first"},
                    {"code": "RESOURCE_ERROR", "message": "second"}
                ]
            }
        }))
        .unwrap();

        assert!(op.is_done());
        assert_eq!(op.operation_type, "insert");
        assert_eq!(op.first_error().unwrap().message, "first");
        assert_eq!(op.error.as_ref().unwrap().errors.len(), 2);
    }

    #[test]
    fn test_unknown_status_is_not_done() {
        let op: Operation =
            serde_json::from_value(json!({"name": "op", "status": "CANCELLING"})).unwrap();
        assert_eq!(op.status, OperationStatus::Unknown);
        assert!(!op.is_done());
        assert!(op.first_error().is_none());
    }

    #[test]
    fn test_empty_error_list_has_no_first_error() {
        let op: Operation =
            serde_json::from_value(json!({"name": "op", "status": "DONE", "error": {"errors": []}}))
                .unwrap();
        assert!(op.is_done());
        assert!(op.first_error().is_none());
    }

    #[test]
    fn test_builders() {
        let op = Operation::new("op-1", "delete")
            .with_status(OperationStatus::Done)
            .with_error("X")
            .with_error("Y");

        assert_eq!(op.status.to_string(), "DONE");
        assert_eq!(op.first_error().unwrap().message, "X");
    }
}
