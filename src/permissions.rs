//! Role-based permission gate.
//!
//! A [`PermissionTable`] maps each [`PermissionCategory`] to the role names
//! holding it. Checks read the table live; nothing is cached.
//!
//! `permission_management` is special: the `perm` command is gated on the
//! caller being the guild owner (see [`is_owner`]), and the granting
//! operations never attach that category to a role.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::platform::UserId;

/// A gated capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionCategory {
    /// `new project`, `edit project`, `delete project`
    ProjectManagement,
    /// `forums`
    ForumConfig,
    /// `shop add`
    ShopManagement,
    /// `perm` (owner only)
    PermissionManagement,
}

impl PermissionCategory {
    pub const ALL: [PermissionCategory; 4] = [
        Self::ProjectManagement,
        Self::ForumConfig,
        Self::ShopManagement,
        Self::PermissionManagement,
    ];

    /// Categories that `perm add` / `perm remove` touch.
    pub const GRANTABLE: [PermissionCategory; 3] = [
        Self::ProjectManagement,
        Self::ForumConfig,
        Self::ShopManagement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProjectManagement => "project_management",
            Self::ForumConfig => "forum_config",
            Self::ShopManagement => "shop_management",
            Self::PermissionManagement => "permission_management",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "project_management" => Some(Self::ProjectManagement),
            "forum_config" => Some(Self::ForumConfig),
            "shop_management" => Some(Self::ShopManagement),
            "permission_management" => Some(Self::PermissionManagement),
            _ => None,
        }
    }

    /// Human-readable label used in `perm view`.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ProjectManagement => "Project Management (new/edit/delete)",
            Self::ForumConfig => "Forum Configuration",
            Self::ShopManagement => "Shop Management",
            Self::PermissionManagement => "Permission Management",
        }
    }
}

/// Category → role names holding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionTable {
    roles: BTreeMap<PermissionCategory, Vec<String>>,
}

impl Default for PermissionTable {
    fn default() -> Self {
        let roles = [
            (
                PermissionCategory::ProjectManagement,
                vec!["owner", "admin", "Team Leader"],
            ),
            (PermissionCategory::ForumConfig, vec!["owner", "admin"]),
            (PermissionCategory::ShopManagement, vec!["owner", "admin"]),
            (PermissionCategory::PermissionManagement, vec!["owner"]),
        ]
        .into_iter()
        .map(|(category, names)| {
            (
                category,
                names.into_iter().map(str::to_string).collect::<Vec<_>>(),
            )
        })
        .collect();
        Self { roles }
    }
}

impl PermissionTable {
    /// A table with no roles in any category.
    pub fn empty() -> Self {
        Self {
            roles: BTreeMap::new(),
        }
    }

    /// True iff any of `role_names` holds `category`.
    pub fn has_permission(&self, role_names: &BTreeSet<String>, category: PermissionCategory) -> bool {
        self.roles
            .get(&category)
            .is_some_and(|holders| holders.iter().any(|r| role_names.contains(r)))
    }

    pub fn roles_for(&self, category: PermissionCategory) -> &[String] {
        self.roles.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Categories `role` currently holds, in table order.
    pub fn categories_for(&self, role: &str) -> Vec<PermissionCategory> {
        PermissionCategory::ALL
            .into_iter()
            .filter(|c| self.roles_for(*c).iter().any(|r| r == role))
            .collect()
    }

    /// Append `role` to a category. Returns false if it was already there.
    pub fn grant(&mut self, category: PermissionCategory, role: &str) -> bool {
        let holders = self.roles.entry(category).or_default();
        if holders.iter().any(|r| r == role) {
            return false;
        }
        holders.push(role.to_string());
        true
    }

    /// Remove `role` from a category. Returns false if it was not there.
    pub fn revoke(&mut self, category: PermissionCategory, role: &str) -> bool {
        let Some(holders) = self.roles.get_mut(&category) else {
            return false;
        };
        let before = holders.len();
        holders.retain(|r| r != role);
        holders.len() != before
    }

    /// Grant every grantable category. Returns the newly granted ones.
    pub fn grant_all(&mut self, role: &str) -> Vec<PermissionCategory> {
        PermissionCategory::GRANTABLE
            .into_iter()
            .filter(|c| self.grant(*c, role))
            .collect()
    }

    /// Revoke every grantable category. Returns the ones actually removed.
    pub fn revoke_all(&mut self, role: &str) -> Vec<PermissionCategory> {
        PermissionCategory::GRANTABLE
            .into_iter()
            .filter(|c| self.revoke(*c, role))
            .collect()
    }
}

/// Owner predicate used for `permission_management` commands.
pub fn is_owner(caller: UserId, owner: UserId) -> bool {
    caller == owner
}
