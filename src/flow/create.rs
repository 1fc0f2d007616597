use std::collections::BTreeSet;
use std::time::Duration;

use super::{Flow, Step};
use crate::config::FlowTimeouts;
use crate::ledger::{parse_task_line, validate_project_name};
use crate::models::{CreateProjectInput, Task};
use crate::platform::Reply;

const STEP_TASKS: &str = "📝 **Step 3:** Please provide the tasks in the following format:\n`<task> <reward points> <number of members>`\n\nExample:\n`Fix login bug 50 2`\n`Update documentation 30 1`\n`Design new UI 75 3`\n\nSend one task per message. Type 'done' when finished, or 'cancel' to cancel project creation:";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Stage {
    AwaitingName,
    AwaitingDescription {
        name: String,
    },
    CollectingTasks {
        name: String,
        description: String,
        tasks: Vec<Task>,
    },
}

/// Name, then description, then one task line per message until `done`.
#[derive(Debug, Clone)]
pub struct CreateProject {
    stage: Stage,
    existing: BTreeSet<String>,
    created_by: String,
}

impl CreateProject {
    /// `existing` is the set of project names at the start of the flow; it
    /// only drives early feedback and is checked again at commit.
    pub fn new(created_by: impl Into<String>, existing: BTreeSet<String>) -> Self {
        Self {
            stage: Stage::AwaitingName,
            existing,
            created_by: created_by.into(),
        }
    }

    fn with(self, stage: Stage) -> Self {
        Self { stage, ..self }
    }
}

impl Flow for CreateProject {
    type Output = CreateProjectInput;

    fn name(&self) -> &'static str {
        "Project creation"
    }

    fn prompt(&self) -> Reply {
        match &self.stage {
            Stage::AwaitingName => Reply::text(
                "📝 **Step 1:** What is the name of the project?\n\nType 'cancel' or 'exit' to cancel project creation.",
            ),
            Stage::AwaitingDescription { .. } => Reply::text(
                "📝 **Step 2:** What is the description of the project?\n\nType 'cancel' or 'exit' to cancel project creation.",
            ),
            Stage::CollectingTasks { tasks, .. } if tasks.is_empty() => Reply::text(STEP_TASKS),
            Stage::CollectingTasks { tasks, .. } => Reply::text(format!(
                "📝 Add another task, or type 'done' when finished ({} task(s) so far).",
                tasks.len()
            )),
        }
    }

    fn timeout(&self, timeouts: &FlowTimeouts) -> Duration {
        match self.stage {
            Stage::AwaitingName => timeouts.name,
            Stage::AwaitingDescription { .. } => timeouts.description,
            Stage::CollectingTasks { .. } => timeouts.task_line,
        }
    }

    fn advance(self, input: &str) -> Step<Self> {
        match self.stage.clone() {
            Stage::AwaitingName => match validate_project_name(input) {
                Ok(name) if self.existing.contains(&name) => {
                    let notice = format!(
                        "❌ A project named '{}' already exists! Please choose another name.",
                        name
                    );
                    Step::Notice(self, Reply::text(notice))
                }
                Ok(name) => Step::Advance(self.with(Stage::AwaitingDescription { name })),
                Err(e) => Step::Notice(self, Reply::text(format!("❌ {}", e))),
            },

            Stage::AwaitingDescription { name } => {
                Step::Advance(self.with(Stage::CollectingTasks {
                    name,
                    description: input.to_string(),
                    tasks: Vec::new(),
                }))
            }

            Stage::CollectingTasks {
                name,
                description,
                mut tasks,
            } => {
                if input.eq_ignore_ascii_case("done") {
                    if tasks.is_empty() {
                        return Step::Cancel(
                            "❌ No tasks provided! Project creation cancelled.".to_string(),
                        );
                    }
                    return Step::Finish(CreateProjectInput {
                        name,
                        description,
                        created_by: self.created_by,
                        tasks,
                    });
                }

                match parse_task_line(input) {
                    Ok(task) => {
                        let notice = format!(
                            "✅ Task added: **{}** (Reward: {} points, Members: {})",
                            task.description(),
                            task.reward_points(),
                            task.max_members()
                        );
                        tasks.push(task);
                        let next = self.with(Stage::CollectingTasks {
                            name,
                            description,
                            tasks,
                        });
                        Step::Notice(next, Reply::text(notice))
                    }
                    Err(e) => Step::Notice(self, Reply::text(format!("❌ {}", e))),
                }
            }
        }
    }
}
