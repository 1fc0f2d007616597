//! Domain records for crewmate.
//!
//! # Core Concepts
//!
//! - [`Project`]: a named unit of work with an ordered task list and a member set.
//!   Its progress and status are derived from its tasks.
//! - [`Task`]: an assignable, rewardable unit of work inside a project.
//! - [`Document`]: everything the bot persists, stored as one JSON blob.
//!
//! Records are validated when built. The mutating operations on them live in
//! [`crate::ledger`].

mod document;
mod project;
mod task;
pub(crate) mod timestamp;

pub use document::*;
pub use project::*;
pub use task::*;

/// Identifier of a chat member as stored in the document (the platform user id).
pub type MemberId = String;
