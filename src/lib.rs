//! crewmate: project, task and rewards bot for Discord communities.

pub mod config;
pub mod error;
pub mod flow;
pub mod ledger;
pub mod mirror;
pub mod models;
pub mod permissions;
pub mod platform;
pub mod render;
pub mod router;
pub mod store;

pub use error::{Error, Result};
pub use router::Bot;
pub use store::Store;
