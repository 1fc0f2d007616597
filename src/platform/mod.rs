//! The chat platform as seen by the bot.
//!
//! [`Platform`] is the seam between the bot and a concrete gateway. The
//! Discord adapter lives in [`discord`]; [`memory`] is an in-process stand-in
//! that records everything sent to it.

pub mod discord;
pub mod memory;

use std::collections::BTreeSet;
use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::render::Embed;

macro_rules! snowflake {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

snowflake!(UserId);
snowflake!(ChannelId);
snowflake!(GuildId);
snowflake!(MessageId);
snowflake!(RoleId);

impl UserId {
    /// The key used for this user in the persisted document.
    pub fn member_id(&self) -> String {
        self.0.to_string()
    }

    pub fn mention(&self) -> String {
        format!("<@{}>", self.0)
    }
}

/// Where a reply goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    Channel(ChannelId),
    Direct(UserId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    Embed(Embed),
}

impl Reply {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Plain text of the reply, or the embed title.
    pub fn summary(&self) -> &str {
        match self {
            Self::Text(s) => s,
            Self::Embed(e) => &e.title,
        }
    }
}

impl From<Embed> for Reply {
    fn from(embed: Embed) -> Self {
        Self::Embed(embed)
    }
}

impl From<String> for Reply {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for Reply {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// An incoming chat message.
#[derive(Debug, Clone)]
pub struct Incoming {
    pub author: UserId,
    pub author_name: String,
    /// Names of the author's roles in the guild. Empty in DMs.
    pub roles: BTreeSet<String>,
    pub guild: Option<GuildId>,
    pub channel: ChannelId,
    pub direct: bool,
    pub message: MessageId,
    pub content: String,
}

impl Incoming {
    /// Where replies to this message go.
    pub fn reply_to(&self) -> Destination {
        if self.direct {
            Destination::Direct(self.author)
        } else {
            Destination::Channel(self.channel)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleInfo {
    pub id: RoleId,
    pub name: String,
    /// Integration-managed roles cannot be self-assigned.
    pub managed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelKind {
    Forum,
    Text,
    Other(String),
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forum => f.write_str("forum"),
            Self::Text => f.write_str("text"),
            Self::Other(kind) => f.write_str(kind),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub id: ChannelId,
    pub name: String,
    pub kind: ChannelKind,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlatformError {
    #[error("I don't have permission to {0}!")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Other(String),
}

pub type PlatformResult<T> = std::result::Result<T, PlatformError>;

/// Operations the bot needs from the chat platform.
#[async_trait]
pub trait Platform: Send + Sync {
    async fn send(&self, to: Destination, reply: Reply) -> PlatformResult<()>;

    async fn delete_message(&self, channel: ChannelId, message: MessageId) -> PlatformResult<()>;

    async fn guild_roles(&self, guild: GuildId) -> PlatformResult<Vec<RoleInfo>>;

    async fn guild_owner(&self, guild: GuildId) -> PlatformResult<UserId>;

    async fn add_role(&self, guild: GuildId, user: UserId, role: RoleId) -> PlatformResult<()>;

    async fn remove_role(&self, guild: GuildId, user: UserId, role: RoleId) -> PlatformResult<()>;

    async fn set_nickname(&self, guild: GuildId, user: UserId, nickname: &str)
        -> PlatformResult<()>;

    /// First channel in the guild with exactly this name.
    async fn find_channel(&self, guild: GuildId, name: &str) -> PlatformResult<Option<ChannelInfo>>;

    async fn forum_channels(&self, guild: GuildId) -> PlatformResult<Vec<ChannelInfo>>;

    /// Thread in `forum` with exactly this name, active or archived.
    async fn find_thread(
        &self,
        guild: GuildId,
        forum: ChannelId,
        name: &str,
    ) -> PlatformResult<Option<ChannelId>>;

    /// Create a forum post whose first message is `summary`.
    async fn create_thread(
        &self,
        forum: ChannelId,
        name: &str,
        summary: Embed,
    ) -> PlatformResult<ChannelId>;

    /// Replace the summary shown in an existing thread, reopening it if it
    /// was archived.
    async fn replace_summary(&self, thread: ChannelId, summary: Embed) -> PlatformResult<()>;

    async fn delete_thread(&self, thread: ChannelId) -> PlatformResult<()>;
}
