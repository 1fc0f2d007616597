//! Task ledger: every state transition on tasks and projects.
//!
//! All operations validate before they mutate, so an `Err` always leaves the
//! project exactly as it was. Derived fields (`progress_percent`, `status`)
//! are recomputed after each successful mutation.

use chrono::{DateTime, Utc};

use crate::error::LedgerError;
use crate::models::{
    CreateProjectInput, MemberId, Project, ProjectEdit, ProjectStatus, RewardDistribution, Task,
    TaskEdit, UserPoints,
};

pub const MAX_PROJECT_NAME_LEN: usize = 50;

const TASK_FORMAT_HINT: &str = "Invalid format! Use: `<task> <reward points> <number of members>`";
const POSITIVE_HINT: &str = "Reward points and number of members must be positive numbers!";

// ============================================================
// Tasks
// ============================================================

impl Task {
    /// Build a validated, unassigned task.
    pub fn new(
        description: impl Into<String>,
        reward_points: i64,
        max_members: i64,
    ) -> Result<Self, LedgerError> {
        let description = description.into().trim().to_string();
        if description.is_empty() {
            return Err(LedgerError::Validation(
                "Task description cannot be empty!".to_string(),
            ));
        }
        if reward_points <= 0 || max_members <= 0 {
            return Err(LedgerError::Validation(POSITIVE_HINT.to_string()));
        }
        let max_members = u32::try_from(max_members).map_err(|_| {
            LedgerError::Validation(format!("Number of members is too large: {}", max_members))
        })?;

        Ok(Self {
            description,
            reward_points: reward_points as u64,
            max_members,
            assigned_members: Vec::new(),
            completed: false,
            completed_by: None,
            completed_at: None,
        })
    }
}

/// Parse a chat task line: `<description words> <reward> <members>`.
///
/// The last two whitespace-separated parts are the integers; everything
/// before them is the description.
pub fn parse_task_line(line: &str) -> Result<Task, LedgerError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 3 {
        return Err(LedgerError::Validation(TASK_FORMAT_HINT.to_string()));
    }
    let (words, numbers) = parts.split_at(parts.len() - 2);
    let (Ok(reward), Ok(members)) = (numbers[0].parse::<i64>(), numbers[1].parse::<i64>()) else {
        return Err(LedgerError::Validation(TASK_FORMAT_HINT.to_string()));
    };
    Task::new(words.join(" "), reward, members)
}

/// Parse a positive integer typed by a user for a single numeric field.
pub fn parse_positive(input: &str, field: &str) -> Result<u64, LedgerError> {
    match input.trim().parse::<i64>() {
        Ok(n) if n > 0 => Ok(n as u64),
        Ok(_) => Err(LedgerError::Validation(format!("{} must be positive!", field))),
        Err(_) => Err(LedgerError::Validation(
            "Please enter a valid number!".to_string(),
        )),
    }
}

// ============================================================
// Projects
// ============================================================

/// Trim and check a project name.
pub fn validate_project_name(name: &str) -> Result<String, LedgerError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::Validation(
            "Project name cannot be empty!".to_string(),
        ));
    }
    if name.chars().count() > MAX_PROJECT_NAME_LEN {
        return Err(LedgerError::Validation(format!(
            "Project name is too long! Please use a shorter name (max {} characters).",
            MAX_PROJECT_NAME_LEN
        )));
    }
    Ok(name.to_string())
}

impl Project {
    pub fn new(input: CreateProjectInput) -> Result<Self, LedgerError> {
        let name = validate_project_name(&input.name)?;
        let mut project = Self {
            name,
            description: input.description.trim().to_string(),
            status: ProjectStatus::InProgress,
            progress_percent: 0,
            created_at: Utc::now(),
            created_by: input.created_by,
            tasks: input.tasks,
            members: Default::default(),
            unreadable_tasks: Vec::new(),
        };
        project.recompute();
        Ok(project)
    }

    fn task_mut(&mut self, index: usize) -> Result<&mut Task, LedgerError> {
        let len = self.tasks.len();
        self.tasks
            .get_mut(index)
            .ok_or(LedgerError::IndexError { index, len })
    }

    /// Add `member` to the task at `index` and to the project's members.
    pub fn assign(&mut self, index: usize, member: &str) -> Result<&Task, LedgerError> {
        let task = self.task_mut(index)?;
        if task.completed {
            return Err(LedgerError::TaskCompleted(task.description.clone()));
        }
        if task.is_assigned(member) {
            return Err(LedgerError::AlreadyAssigned(task.description.clone()));
        }
        if task.is_full() {
            return Err(LedgerError::TaskFull {
                description: task.description.clone(),
                max_members: task.max_members,
            });
        }

        task.assigned_members.push(member.to_string());
        self.members.insert(member.to_string());
        self.recompute();
        Ok(&self.tasks[index])
    }

    /// Mark the task at `index` completed by `member` and credit every
    /// assignee with an equal floor share of the reward.
    pub fn complete(
        &mut self,
        index: usize,
        member: &str,
        points: &mut UserPoints,
        now: DateTime<Utc>,
    ) -> Result<RewardDistribution, LedgerError> {
        let task = self.task_mut(index)?;
        if task.completed {
            return Err(LedgerError::TaskCompleted(task.description.clone()));
        }
        if !task.is_assigned(member) {
            return Err(LedgerError::NotAssigned(task.description.clone()));
        }

        let recipients: Vec<MemberId> = task.assigned_members.clone();
        let share_count = recipients.len().max(1) as u64;
        let reward_per_member = task.reward_points / share_count;
        let overflows = recipients.iter().any(|r| {
            points
                .get(r)
                .copied()
                .unwrap_or(0)
                .checked_add(reward_per_member)
                .is_none()
        });
        if overflows {
            return Err(LedgerError::Validation(format!(
                "Completing '{}' would overflow a point balance!",
                task.description
            )));
        }

        task.completed = true;
        task.completed_by = Some(member.to_string());
        task.completed_at = Some(now);

        let distribution = RewardDistribution {
            task_description: task.description.clone(),
            total_reward: task.reward_points,
            reward_per_member,
            remainder: task.reward_points % share_count,
            recipients,
        };

        for recipient in &distribution.recipients {
            *points.entry(recipient.clone()).or_insert(0) += reward_per_member;
        }
        self.recompute();
        Ok(distribution)
    }

    /// Change one field of the task at `index`. Lowering `max_members` below
    /// the current assignee count is allowed; nobody is unassigned.
    pub fn edit_task(&mut self, index: usize, edit: TaskEdit) -> Result<(), LedgerError> {
        let task = self.task_mut(index)?;
        match edit {
            TaskEdit::Description(description) => {
                let description = description.trim();
                if description.is_empty() {
                    return Err(LedgerError::Validation(
                        "Task description cannot be empty!".to_string(),
                    ));
                }
                task.description = description.to_string();
            }
            TaskEdit::RewardPoints(0) => {
                return Err(LedgerError::Validation(
                    "Reward points must be positive!".to_string(),
                ))
            }
            TaskEdit::RewardPoints(points) => task.reward_points = points,
            TaskEdit::MaxMembers(0) => {
                return Err(LedgerError::Validation(
                    "Number of members must be positive!".to_string(),
                ))
            }
            TaskEdit::MaxMembers(max) => task.max_members = max,
        }
        Ok(())
    }

    pub fn add_task(&mut self, task: Task) {
        self.tasks.push(task);
        self.recompute();
    }

    /// Remove the task at `index`, completed or not. Points already credited
    /// for it stay with their recipients.
    pub fn remove_task(&mut self, index: usize) -> Result<Task, LedgerError> {
        let len = self.tasks.len();
        if index >= len {
            return Err(LedgerError::IndexError { index, len });
        }
        let removed = self.tasks.remove(index);
        self.recompute();
        Ok(removed)
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = description.trim().to_string();
    }

    /// Manual status change. `Completed` must agree with the task list.
    pub fn set_status(&mut self, status: ProjectStatus) -> Result<(), LedgerError> {
        let all_done = self.all_tasks_completed();
        match status {
            ProjectStatus::Completed if !all_done => Err(LedgerError::Validation(
                "A project can only be marked Completed once all of its tasks are completed!"
                    .to_string(),
            )),
            ProjectStatus::InProgress | ProjectStatus::OnHold if all_done => {
                Err(LedgerError::Validation(
                    "All tasks are completed, so the project stays Completed.".to_string(),
                ))
            }
            status => {
                self.status = status;
                Ok(())
            }
        }
    }

    /// Apply a single edit produced by the edit flow.
    pub fn apply_edit(&mut self, edit: ProjectEdit) -> Result<(), LedgerError> {
        match edit {
            ProjectEdit::Description(description) => {
                self.set_description(&description);
                Ok(())
            }
            ProjectEdit::AddTask(task) => {
                self.add_task(task);
                Ok(())
            }
            ProjectEdit::RemoveTask(index) => self.remove_task(index).map(|_| ()),
            ProjectEdit::EditTask { index, edit } => self.edit_task(index, edit),
            ProjectEdit::Status(status) => self.set_status(status),
        }
    }

    /// Re-derive progress and status from the task list.
    pub fn recompute(&mut self) {
        let total = self.tasks.len();
        let done = self.completed_task_count();
        self.progress_percent = if total == 0 {
            0
        } else {
            (done * 100 / total) as u8
        };

        if self.all_tasks_completed() {
            self.status = ProjectStatus::Completed;
        } else if self.status == ProjectStatus::Completed {
            self.status = ProjectStatus::InProgress;
        }
    }

    /// Tasks `member` could join, with their indices.
    pub fn available_tasks(&self, member: &str) -> Vec<(usize, &Task)> {
        self.tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.completed && !t.is_full() && !t.is_assigned(member))
            .collect()
    }

    /// Incomplete tasks `member` is assigned to, with their indices.
    pub fn tasks_assigned_to(&self, member: &str) -> Vec<(usize, &Task)> {
        self.tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.completed && t.is_assigned(member))
            .collect()
    }
}
