use serde::{Deserialize, Serialize};

use super::response::ApiError;
use super::validation::Choice;

/// Admin action requesting a new status, with optional reviewer remarks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: String,
    #[serde(default)]
    pub remarks: Option<String>,
}

/// Status enums whose changes are guarded by the previous status.
pub trait WorkflowStatus: Choice + PartialEq {
    fn allowed_next(self) -> &'static [Self];

    fn is_terminal(self) -> bool {
        self.allowed_next().is_empty()
    }
}

/// Check that `to` may follow `from`; re-applying the current status is rejected.
pub fn transition<S: WorkflowStatus>(from: S, to: S) -> Result<S, ApiError> {
    if from.allowed_next().contains(&to) {
        Ok(to)
    } else {
        Err(ApiError::InvalidTransition {
            from: from.label(),
            to: to.label(),
        })
    }
}
