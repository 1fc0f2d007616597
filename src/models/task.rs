use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;
use super::MemberId;

/// An assignable, rewardable unit of work within a project.
///
/// Tasks are validated when they are built: the description is non-empty and
/// both `reward_points` and `max_members` are positive. The same checks run
/// when a task is read back from the data file, so a malformed record never
/// reaches the ledger.
///
/// Once a task is completed its `assigned_members` list is frozen; the ledger
/// refuses any further assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaskRecord")]
pub struct Task {
    pub(crate) description: String,
    pub(crate) reward_points: u64,
    pub(crate) max_members: u32,
    pub(crate) assigned_members: Vec<MemberId>,
    pub(crate) completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) completed_by: Option<MemberId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn reward_points(&self) -> u64 {
        self.reward_points
    }

    pub fn max_members(&self) -> u32 {
        self.max_members
    }

    pub fn assigned_members(&self) -> &[MemberId] {
        &self.assigned_members
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn completed_by(&self) -> Option<&str> {
        self.completed_by.as_deref()
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn is_assigned(&self, member: &str) -> bool {
        self.assigned_members.iter().any(|m| m == member)
    }

    /// True when no more members can join. Over-capacity tasks (after
    /// `max_members` was lowered) count as full.
    pub fn is_full(&self) -> bool {
        self.assigned_members.len() >= self.max_members as usize
    }
}

/// The editable fields of a task, used by the edit flow and the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskField {
    Description,
    RewardPoints,
    MaxMembers,
}

impl TaskField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Description => "description",
            Self::RewardPoints => "reward points",
            Self::MaxMembers => "number of members",
        }
    }
}

/// A single field change on a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEdit {
    Description(String),
    RewardPoints(u64),
    MaxMembers(u32),
}

impl TaskEdit {
    pub fn field(&self) -> TaskField {
        match self {
            Self::Description(_) => TaskField::Description,
            Self::RewardPoints(_) => TaskField::RewardPoints,
            Self::MaxMembers(_) => TaskField::MaxMembers,
        }
    }
}

/// The result of completing a task: who was credited and how much.
///
/// `reward_per_member` is the floor of `total_reward / recipients`; the
/// `remainder` is never credited to anyone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewardDistribution {
    pub task_description: String,
    pub total_reward: u64,
    pub reward_per_member: u64,
    pub remainder: u64,
    pub recipients: Vec<MemberId>,
}

impl RewardDistribution {
    pub fn total_credited(&self) -> u64 {
        self.reward_per_member * self.recipients.len() as u64
    }
}

/// Wire shape of a task in the data file.
#[derive(Debug, Deserialize)]
struct TaskRecord {
    description: String,
    reward_points: i64,
    max_members: i64,
    #[serde(default)]
    assigned_members: Vec<MemberId>,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    completed_by: Option<MemberId>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<TaskRecord> for Task {
    type Error = String;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        let mut task = Task::new(record.description, record.reward_points, record.max_members)
            .map_err(|e| e.to_string())?;

        let mut seen = std::collections::BTreeSet::new();
        if !record.assigned_members.iter().all(|m| seen.insert(m.clone())) {
            return Err(format!(
                "task '{}' lists the same member twice",
                task.description
            ));
        }

        task.assigned_members = record.assigned_members;
        task.completed = record.completed;
        task.completed_by = record.completed_by;
        task.completed_at = record.completed_at;
        Ok(task)
    }
}
