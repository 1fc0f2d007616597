use std::time::Duration;

use super::{parse_number, Flow, Step};
use crate::config::FlowTimeouts;
use crate::ledger::{parse_positive, parse_task_line};
use crate::models::{Project, ProjectEdit, ProjectStatus, TaskEdit, TaskField};
use crate::platform::Reply;
use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Menu,
    Description,
    TaskMenu,
    AddTask,
    RemoveTask,
    PickTaskToEdit,
    PickField { index: usize },
    FieldValue { index: usize, field: TaskField },
    Status,
}

/// Menu-driven editor that ends with exactly one [`ProjectEdit`].
///
/// The project is a snapshot taken when the flow starts. It is used for
/// listings and early validation only; the edit is applied to the current
/// document at commit.
#[derive(Debug, Clone)]
pub struct EditProject {
    project: Project,
    stage: Stage,
}

impl EditProject {
    pub fn new(project: Project) -> Self {
        Self {
            project,
            stage: Stage::Menu,
        }
    }

    fn to(self, stage: Stage) -> Step<Self> {
        Step::Advance(Self { stage, ..self })
    }

    fn retry(self, notice: impl Into<String>) -> Step<Self> {
        Step::Notice(self, Reply::text(notice))
    }

    fn with_listing(&self, question: &str) -> Reply {
        Reply::text(format!("{}\n\n{}", render::task_listing(&self.project), question))
    }

    fn pick_task(self, input: &str, then: impl FnOnce(usize) -> Stage) -> Step<Self> {
        match parse_number(input) {
            Some(index) if index < self.project.tasks().len() => {
                let stage = then(index);
                self.to(stage)
            }
            Some(_) => self.retry("❌ Invalid task number!"),
            None => self.retry("❌ Please enter a valid number!"),
        }
    }
}

impl Flow for EditProject {
    type Output = ProjectEdit;

    fn name(&self) -> &'static str {
        "Project editing"
    }

    fn prompt(&self) -> Reply {
        match self.stage {
            Stage::Menu => Reply::text(format!(
                "📝 **Editing Project:** {}\n\nWhat would you like to edit?\n1. Project description\n2. Tasks (add/remove/edit)\n3. Project status\n\nType the number (1, 2, or 3):",
                self.project.name()
            )),
            Stage::Description => Reply::text("📝 Enter the new project description:"),
            Stage::TaskMenu => Reply::text(
                "📝 **Task Management**\n\nWhat would you like to do?\n1. Add new task\n2. Remove task\n3. Edit task\n4. View current tasks\n\nType the number (1-4):",
            ),
            Stage::AddTask => Reply::text(
                "📝 **Adding New Task**\n\nPlease provide the task in the following format:\n`<task> <reward points> <number of members>`\n\nExample: `Fix login bug 50 2`",
            ),
            Stage::RemoveTask => self.with_listing("📝 Enter the number of the task to remove:"),
            Stage::PickTaskToEdit => self.with_listing("📝 Enter the number of the task to edit:"),
            Stage::PickField { index } => {
                let description = self
                    .project
                    .task(index)
                    .map(|t| t.description())
                    .unwrap_or_default();
                Reply::text(format!(
                    "📝 What would you like to edit for task **{}**?\n1. Description\n2. Reward points\n3. Number of members\n\nType the number (1-3):",
                    description
                ))
            }
            Stage::FieldValue { field, .. } => Reply::text(match field {
                TaskField::Description => "📝 Enter the new task description:",
                TaskField::RewardPoints => "📝 Enter the new reward points:",
                TaskField::MaxMembers => "📝 Enter the new number of members:",
            }),
            Stage::Status => Reply::text(format!(
                "📝 Current status: **{}**\nEnter the new status ('In Progress', 'On Hold' or 'Completed'):",
                self.project.status()
            )),
        }
    }

    fn timeout(&self, timeouts: &FlowTimeouts) -> Duration {
        match self.stage {
            Stage::Description
            | Stage::FieldValue {
                field: TaskField::Description,
                ..
            } => timeouts.description,
            Stage::AddTask => timeouts.task_line,
            _ => timeouts.choice,
        }
    }

    fn advance(self, input: &str) -> Step<Self> {
        match self.stage {
            Stage::Menu => match input {
                "1" => self.to(Stage::Description),
                "2" => self.to(Stage::TaskMenu),
                "3" => self.to(Stage::Status),
                _ => self.retry("❌ Invalid choice!"),
            },

            Stage::Description => Step::Finish(ProjectEdit::Description(input.to_string())),

            Stage::TaskMenu => {
                let has_tasks = !self.project.tasks().is_empty();
                match input {
                    "1" => self.to(Stage::AddTask),
                    "2" | "3" if !has_tasks => self.retry("❌ This project has no tasks yet."),
                    "2" => self.to(Stage::RemoveTask),
                    "3" => self.to(Stage::PickTaskToEdit),
                    "4" => {
                        let listing = render::task_listing(&self.project);
                        Step::Notice(self, Reply::text(listing))
                    }
                    _ => self.retry("❌ Invalid choice!"),
                }
            }

            Stage::AddTask => match parse_task_line(input) {
                Ok(task) => Step::Finish(ProjectEdit::AddTask(task)),
                Err(e) => self.retry(format!("❌ {}", e)),
            },

            Stage::RemoveTask => match parse_number(input) {
                Some(index) if index < self.project.tasks().len() => {
                    Step::Finish(ProjectEdit::RemoveTask(index))
                }
                Some(_) => self.retry("❌ Invalid task number!"),
                None => self.retry("❌ Please enter a valid number!"),
            },

            Stage::PickTaskToEdit => self.pick_task(input, |index| Stage::PickField { index }),

            Stage::PickField { index } => {
                let field = match input {
                    "1" => TaskField::Description,
                    "2" => TaskField::RewardPoints,
                    "3" => TaskField::MaxMembers,
                    _ => return self.retry("❌ Invalid choice!"),
                };
                self.to(Stage::FieldValue { index, field })
            }

            Stage::FieldValue { index, field } => {
                let edit = match field {
                    TaskField::Description => Ok(TaskEdit::Description(input.to_string())),
                    TaskField::RewardPoints => {
                        parse_positive(input, "Reward points").map(TaskEdit::RewardPoints)
                    }
                    TaskField::MaxMembers => parse_positive(input, "Number of members")
                        .and_then(|n| {
                            u32::try_from(n).map_err(|_| {
                                crate::error::LedgerError::Validation(
                                    "Number of members is too large!".to_string(),
                                )
                            })
                        })
                        .map(TaskEdit::MaxMembers),
                };
                match edit {
                    Ok(edit) => Step::Finish(ProjectEdit::EditTask { index, edit }),
                    Err(e) => self.retry(format!("❌ {}", e)),
                }
            }

            Stage::Status => {
                let Some(status) = ProjectStatus::from_str(input) else {
                    return self.retry(
                        "❌ Unknown status! Use 'In Progress', 'On Hold' or 'Completed'.",
                    );
                };
                let mut probe = self.project.clone();
                match probe.set_status(status) {
                    Ok(()) => Step::Finish(ProjectEdit::Status(status)),
                    Err(e) => self.retry(format!("❌ {}", e)),
                }
            }
        }
    }
}
