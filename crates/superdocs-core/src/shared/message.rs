use serde::{Deserialize, Serialize};

use crate::services::diff::types::{Change, ReconcileError};

/// Planner output: a message for the user and independent edit instructions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Plan {
    pub message: String,
    #[serde(alias = "edit_instructions")]
    pub edit_instructions: Vec<String>,
}

/// Events emitted while an edit session runs. `index` is the position of the
/// edit instruction in the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamMessage {
    Progress {
        index: usize,
        text: String,
    },
    Plan(Plan),
    Change {
        index: usize,
        changes: Vec<Change>,
    },
    Error {
        index: Option<usize>,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<ReconcileError>,
    },
}

impl StreamMessage {
    pub fn error(index: Option<usize>, message: impl Into<String>) -> Self {
        Self::Error {
            index,
            message: message.into(),
            detail: None,
        }
    }

    pub fn reconcile_error(index: usize, error: ReconcileError) -> Self {
        Self::Error {
            index: Some(index),
            message: error.to_string(),
            detail: Some(error),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
