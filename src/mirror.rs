//! Forum mirror: one thread per project, showing its current state.
//!
//! Mirroring always runs after the authoritative commit. A failure here is
//! reported as a warning and never rolls the data back.

use std::sync::Arc;

use thiserror::Error;

use crate::models::Project;
use crate::platform::{ChannelId, ChannelInfo, ChannelKind, GuildId, Platform, PlatformError};
use crate::render;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MirrorFailure {
    #[error("this command has to be used inside a server")]
    NoGuild,

    #[error("Could not find forum channel: '{name}'")]
    ChannelNotFound { name: String, available: Vec<String> },

    #[error("Configured channel '{name}' is a {kind} channel, not a forum channel.")]
    NotAForum { name: String, kind: ChannelKind },

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Created(ChannelId),
    Updated(ChannelId),
}

pub fn thread_name(project_name: &str) -> String {
    format!("Project: {}", project_name)
}

/// Keeps project threads in the configured forum channel in line with the
/// document.
pub struct ForumMirror<'a> {
    platform: &'a Arc<dyn Platform>,
    guild: Option<GuildId>,
    forum_name: String,
    prefix: &'a str,
}

impl<'a> ForumMirror<'a> {
    pub fn new(
        platform: &'a Arc<dyn Platform>,
        guild: Option<GuildId>,
        forum_name: impl Into<String>,
        prefix: &'a str,
    ) -> Self {
        Self {
            platform,
            guild,
            forum_name: forum_name.into(),
            prefix,
        }
    }

    pub fn forum_name(&self) -> &str {
        &self.forum_name
    }

    fn guild(&self) -> Result<GuildId, MirrorFailure> {
        self.guild.ok_or(MirrorFailure::NoGuild)
    }

    /// Resolve the configured forum channel.
    pub async fn locate(&self) -> Result<ChannelInfo, MirrorFailure> {
        let guild = self.guild()?;
        match self.platform.find_channel(guild, &self.forum_name).await? {
            Some(channel) if channel.kind == ChannelKind::Forum => Ok(channel),
            Some(channel) => Err(MirrorFailure::NotAForum {
                name: channel.name,
                kind: channel.kind,
            }),
            None => {
                let available = self
                    .platform
                    .forum_channels(guild)
                    .await?
                    .into_iter()
                    .map(|c| c.name)
                    .collect();
                Err(MirrorFailure::ChannelNotFound {
                    name: self.forum_name.clone(),
                    available,
                })
            }
        }
    }

    /// Create the project's thread, or replace its summary if it exists.
    pub async fn sync(&self, project: &Project) -> Result<SyncOutcome, MirrorFailure> {
        let guild = self.guild()?;
        let forum = self.locate().await?;
        let name = thread_name(project.name());
        let summary = render::forum_summary(self.prefix, project);

        let outcome = match self.platform.find_thread(guild, forum.id, &name).await? {
            Some(thread) => {
                self.platform.replace_summary(thread, summary).await?;
                SyncOutcome::Updated(thread)
            }
            None => SyncOutcome::Created(self.platform.create_thread(forum.id, &name, summary).await?),
        };
        tracing::debug!(project = project.name(), ?outcome, "Synced forum thread");
        Ok(outcome)
    }

    /// Remove the project's thread. `Ok(false)` when there was none.
    pub async fn delete(&self, project_name: &str) -> Result<bool, MirrorFailure> {
        let guild = self.guild()?;
        let forum = self.locate().await?;
        let name = thread_name(project_name);
        match self.platform.find_thread(guild, forum.id, &name).await? {
            Some(thread) => {
                self.platform.delete_thread(thread).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
