//! Runtime configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PREFIX: &str = "!";

/// Bot configuration.
#[derive(Clone, Debug)]
pub struct BotConfig {
    /// Gateway token (from DISCORD_TOKEN)
    pub token: Option<String>,
    /// Command prefix (from CREWMATE_PREFIX)
    pub prefix: String,
    /// Data file override (from CREWMATE_DATA)
    pub data_path: Option<PathBuf>,
    pub timeouts: FlowTimeouts,
}

impl BotConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let token = std::env::var("DISCORD_TOKEN")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let prefix = std::env::var("CREWMATE_PREFIX")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PREFIX.to_string());

        let data_path = std::env::var("CREWMATE_DATA").ok().map(PathBuf::from);

        Self {
            token,
            prefix,
            data_path,
            timeouts: FlowTimeouts::default(),
        }
    }

    /// Config for tests: default prefix, no token, the given timeouts.
    pub fn with_timeouts(timeouts: FlowTimeouts) -> Self {
        Self {
            token: None,
            prefix: DEFAULT_PREFIX.to_string(),
            data_path: None,
            timeouts,
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self::with_timeouts(FlowTimeouts::default())
    }
}

/// How long each kind of flow step waits for a reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlowTimeouts {
    pub name: Duration,
    pub description: Duration,
    /// Per task line while collecting tasks
    pub task_line: Duration,
    /// Menus and numeric choices
    pub choice: Duration,
    pub confirm: Duration,
}

impl Default for FlowTimeouts {
    fn default() -> Self {
        Self {
            name: Duration::from_secs(60),
            description: Duration::from_secs(120),
            task_line: Duration::from_secs(120),
            choice: Duration::from_secs(60),
            confirm: Duration::from_secs(30),
        }
    }
}

impl FlowTimeouts {
    /// Same timeout for every step.
    pub fn uniform(timeout: Duration) -> Self {
        Self {
            name: timeout,
            description: timeout,
            task_line: timeout,
            choice: timeout,
            confirm: timeout,
        }
    }
}
