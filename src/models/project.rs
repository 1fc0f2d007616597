use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;
use super::{MemberId, Task};

/// A named unit of work with tasks, members, and a forum mirror.
///
/// Projects are keyed by name in the [`Document`](super::Document). The
/// `progress_percent` and `status` fields are derived from the task list and
/// are kept in sync by the ledger after every task mutation:
///
/// - `progress_percent == floor(100 * completed / total)`, or 0 with no tasks
/// - `status == Completed` exactly when every task (of at least one) is done
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(default)]
    pub(crate) status: ProjectStatus,
    #[serde(default, alias = "progress")]
    pub(crate) progress_percent: u8,
    #[serde(
        default = "Utc::now",
        alias = "created",
        deserialize_with = "timestamp::deserialize"
    )]
    pub(crate) created_at: DateTime<Utc>,
    #[serde(default = "unknown_creator")]
    pub(crate) created_by: String,
    #[serde(default)]
    pub(crate) tasks: Vec<Task>,
    #[serde(default)]
    pub(crate) members: BTreeSet<MemberId>,
    /// Task records from the data file that could not be read. Kept as-is so
    /// they survive the next save.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) unreadable_tasks: Vec<serde_json::Value>,
}

fn unknown_creator() -> String {
    "Unknown".to_string()
}

impl Project {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> ProjectStatus {
        self.status
    }

    pub fn progress_percent(&self) -> u8 {
        self.progress_percent
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    pub fn unreadable_tasks(&self) -> &[serde_json::Value] {
        &self.unreadable_tasks
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    pub fn members(&self) -> &BTreeSet<MemberId> {
        &self.members
    }

    pub fn completed_task_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_completed()).count()
    }

    /// True when the project has at least one task and all of them are done.
    pub fn all_tasks_completed(&self) -> bool {
        !self.tasks.is_empty() && self.tasks.iter().all(Task::is_completed)
    }
}

/// The lifecycle status of a project.
///
/// - `InProgress`: default for new projects
/// - `OnHold`: paused by an editor
/// - `Completed`: every task is done (set automatically)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProjectStatus {
    #[default]
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "On Hold")]
    OnHold,
    #[serde(rename = "Completed")]
    Completed,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "In Progress",
            Self::OnHold => "On Hold",
            Self::Completed => "Completed",
        }
    }

    /// Parse a status typed by a user. Case and inner spacing are ignored.
    pub fn from_str(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "inprogress" => Some(Self::InProgress),
            "onhold" => Some(Self::OnHold),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for creating a project, gathered by the creation flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProjectInput {
    pub name: String,
    pub description: String,
    pub created_by: String,
    pub tasks: Vec<Task>,
}

/// A single change to a project, produced by the edit flow.
///
/// The edit flow commits exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectEdit {
    Description(String),
    AddTask(Task),
    RemoveTask(usize),
    EditTask { index: usize, edit: super::TaskEdit },
    Status(ProjectStatus),
}
