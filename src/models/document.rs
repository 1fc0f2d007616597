use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{MemberId, Project};
use crate::permissions::PermissionTable;

/// Default forum channel that mirrors project state.
pub const DEFAULT_FORUM_CHANNEL: &str = "📋・projects";

/// Member id → point balance.
pub type UserPoints = BTreeMap<MemberId, u64>;

/// Everything the bot persists.
///
/// The document is stored as a single pretty-printed JSON object and is
/// always replaced as a whole. Missing keys take their defaults, so files
/// written by older versions still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    /// Project name → project.
    pub projects: BTreeMap<String, Project>,
    /// Member id → last role the member assigned to themselves.
    pub user_roles: BTreeMap<MemberId, String>,
    pub user_points: UserPoints,
    /// Reserved per-member task data, carried through untouched.
    pub user_tasks: BTreeMap<MemberId, serde_json::Value>,
    pub forum_channel_name: String,
    pub permissions: PermissionTable,
    /// Shop item → price in points.
    pub shop_items: BTreeMap<String, u64>,
    /// Catalog of reward tasks shown by `rewards` (name → points).
    pub reward_tasks: BTreeMap<String, u64>,
    /// Project records from the data file that could not be read, by name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub unreadable_projects: BTreeMap<String, serde_json::Value>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            projects: BTreeMap::new(),
            user_roles: BTreeMap::new(),
            user_points: BTreeMap::new(),
            user_tasks: BTreeMap::new(),
            forum_channel_name: DEFAULT_FORUM_CHANNEL.to_string(),
            permissions: PermissionTable::default(),
            shop_items: default_shop_items(),
            reward_tasks: default_reward_tasks(),
            unreadable_projects: BTreeMap::new(),
        }
    }
}

impl Document {
    /// Restore derived fields after loading: each project's name comes from
    /// its map key, and progress and status are recomputed from its tasks.
    pub fn normalize(&mut self) {
        for (name, project) in self.projects.iter_mut() {
            project.name = name.clone();
            project.recompute();
        }
    }

    pub fn project(&self, name: &str) -> Option<&Project> {
        self.projects.get(name)
    }

    pub fn points(&self, member: &str) -> u64 {
        self.user_points.get(member).copied().unwrap_or(0)
    }
}

fn default_shop_items() -> BTreeMap<String, u64> {
    [
        ("Custom Role", 1000),
        ("Server Boost", 500),
        ("Special Badge", 300),
        ("Priority Support", 200),
        ("Custom Emoji", 150),
    ]
    .into_iter()
    .map(|(name, price)| (name.to_string(), price))
    .collect()
}

fn default_reward_tasks() -> BTreeMap<String, u64> {
    [
        ("Complete a project", 50),
        ("Help a team member", 25),
        ("Submit bug report", 30),
        ("Write documentation", 40),
        ("Code review", 35),
    ]
    .into_iter()
    .map(|(name, points)| (name.to_string(), points))
    .collect()
}
