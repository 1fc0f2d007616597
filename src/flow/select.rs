use std::time::Duration;

use super::{parse_number, Flow, Step};
use crate::config::FlowTimeouts;
use crate::platform::Reply;
use crate::render::Embed;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectPurpose {
    Assign,
    Complete,
}

/// Pick one task from a rendered, filtered list.
///
/// Tasks keep their position in the project as their number, so the list may
/// skip numbers. Only numbers shown in the list are accepted.
#[derive(Debug, Clone)]
pub struct SelectTask {
    purpose: SelectPurpose,
    listing: Embed,
    choices: Vec<usize>,
}

impl SelectTask {
    pub fn new(purpose: SelectPurpose, listing: Embed, choices: Vec<usize>) -> Self {
        Self {
            purpose,
            listing,
            choices,
        }
    }
}

impl Flow for SelectTask {
    /// Index of the chosen task in the project.
    type Output = usize;

    fn name(&self) -> &'static str {
        match self.purpose {
            SelectPurpose::Assign => "Task assignment",
            SelectPurpose::Complete => "Task completion",
        }
    }

    fn prompt(&self) -> Reply {
        Reply::Embed(self.listing.clone())
    }

    fn timeout(&self, timeouts: &FlowTimeouts) -> Duration {
        timeouts.choice
    }

    fn advance(self, input: &str) -> Step<Self> {
        match parse_number(input) {
            Some(index) if self.choices.contains(&index) => Step::Finish(index),
            Some(_) => Step::Notice(
                self,
                Reply::text("❌ Invalid task selection! Please try again."),
            ),
            None => Step::Notice(
                self,
                Reply::text("❌ Please enter a valid number or 'exit' to cancel."),
            ),
        }
    }
}
