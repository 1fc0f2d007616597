use std::time::Duration;

use super::{Flow, Step};
use crate::config::FlowTimeouts;
use crate::platform::Reply;

pub const CONFIRM_TOKEN: &str = "DELETE";

/// Single confirmation step. Only the exact token confirms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteProject {
    project: String,
}

impl DeleteProject {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
        }
    }
}

impl Flow for DeleteProject {
    /// Name of the project to delete.
    type Output = String;

    fn name(&self) -> &'static str {
        "Deletion"
    }

    fn prompt(&self) -> Reply {
        Reply::text(format!(
            "⚠️ **Final Confirmation:** Type '{}' to confirm deletion of **{}**:",
            CONFIRM_TOKEN, self.project
        ))
    }

    fn timeout(&self, timeouts: &FlowTimeouts) -> Duration {
        timeouts.confirm
    }

    fn advance(self, input: &str) -> Step<Self> {
        if input == CONFIRM_TOKEN {
            Step::Finish(self.project)
        } else {
            Step::Cancel("❌ Deletion cancelled.".to_string())
        }
    }
}
