//! Multi-step conversations.
//!
//! Each conversation is a [`Flow`]: a state machine whose `advance` is pure.
//! [`drive`] sends the current prompt, waits for the next reply routed to the
//! flow's [`Inbox`], and races that wait against the step's timeout. The
//! keywords `cancel` and `exit` end any flow at any step.
//!
//! Flows never touch the store. Their output is committed by the caller
//! against the document as it is at that moment.

mod conversation;
mod create;
mod delete;
mod edit;
mod select;

pub use conversation::{ConversationKey, Conversations, Inbox};
pub use create::CreateProject;
pub use delete::DeleteProject;
pub use edit::EditProject;
pub use select::{SelectPurpose, SelectTask};

use std::time::Duration;

use tracing::Instrument;
use uuid::Uuid;

use crate::config::FlowTimeouts;
use crate::platform::{Destination, Platform, PlatformResult, Reply, UserId};

pub const CANCEL_KEYWORDS: [&str; 2] = ["cancel", "exit"];

/// What a flow does with one reply.
pub enum Step<F: Flow> {
    /// Move to the next state and prompt for it.
    Advance(F),
    /// Send a notice, then prompt for the given state. Used both for input
    /// errors (same state) and acknowledgements (next state).
    Notice(F, Reply),
    Finish(F::Output),
    /// End without output, sending the message.
    Cancel(String),
}

impl<F> std::fmt::Debug for Step<F>
where
    F: Flow + std::fmt::Debug,
    F::Output: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Advance(next) => f.debug_tuple("Advance").field(next).finish(),
            Self::Notice(next, notice) => f.debug_tuple("Notice").field(next).field(notice).finish(),
            Self::Finish(output) => f.debug_tuple("Finish").field(output).finish(),
            Self::Cancel(message) => f.debug_tuple("Cancel").field(message).finish(),
        }
    }
}

pub trait Flow: Sized + Send {
    type Output: Send;

    /// Human label used in cancel and timeout notices, e.g. "Project creation".
    fn name(&self) -> &'static str;

    fn prompt(&self) -> Reply;

    fn timeout(&self, timeouts: &FlowTimeouts) -> Duration;

    fn advance(self, input: &str) -> Step<Self>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome<T> {
    Committed(T),
    Cancelled,
    TimedOut,
}

pub fn is_cancel(input: &str) -> bool {
    let input = input.trim();
    CANCEL_KEYWORDS.iter().any(|k| input.eq_ignore_ascii_case(k))
}

/// Parse a 1-based number typed by the user into an index.
pub(crate) fn parse_number(input: &str) -> Option<usize> {
    input.trim().parse::<usize>().ok().filter(|n| *n > 0).map(|n| n - 1)
}

/// Run `flow` until it finishes, is cancelled, or times out.
pub async fn drive<F: Flow>(
    flow: F,
    inbox: &mut Inbox,
    platform: &dyn Platform,
    to: Destination,
    user: UserId,
    timeouts: &FlowTimeouts,
) -> PlatformResult<FlowOutcome<F::Output>> {
    let span = tracing::info_span!(
        "flow",
        id = %Uuid::new_v4(),
        name = flow.name(),
        user = %user
    );
    run(flow, inbox, platform, to, timeouts).instrument(span).await
}

async fn run<F: Flow>(
    mut flow: F,
    inbox: &mut Inbox,
    platform: &dyn Platform,
    to: Destination,
    timeouts: &FlowTimeouts,
) -> PlatformResult<FlowOutcome<F::Output>> {
    let name = flow.name();
    tracing::debug!("Flow started");
    loop {
        platform.send(to, flow.prompt()).await?;

        let wait = flow.timeout(timeouts);
        let input = match tokio::time::timeout(wait, inbox.recv()).await {
            Err(_) => {
                tracing::info!("Flow timed out after {:?}", wait);
                platform
                    .send(to, Reply::text(format!("⏰ Timeout! {} cancelled.", name)))
                    .await?;
                return Ok(FlowOutcome::TimedOut);
            }
            Ok(None) => return Ok(FlowOutcome::Cancelled),
            Ok(Some(input)) => input,
        };

        if is_cancel(&input) {
            tracing::info!("Flow cancelled by user");
            platform
                .send(to, Reply::text(format!("❌ {} cancelled.", name)))
                .await?;
            return Ok(FlowOutcome::Cancelled);
        }

        match flow.advance(input.trim()) {
            Step::Advance(next) => flow = next,
            Step::Notice(next, notice) => {
                platform.send(to, notice).await?;
                flow = next;
            }
            Step::Finish(output) => {
                tracing::debug!("Flow finished");
                return Ok(FlowOutcome::Committed(output));
            }
            Step::Cancel(message) => {
                tracing::info!("Flow ended without changes");
                platform.send(to, Reply::text(message)).await?;
                return Ok(FlowOutcome::Cancelled);
            }
        }
    }
}
