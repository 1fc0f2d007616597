//! Command routing: parse, gate, dispatch, report.

mod admin;
pub mod command;
mod projects;

use std::sync::Arc;

pub use command::{Command, UsageError};

use crate::config::BotConfig;
use crate::error::{Error, Result};
use crate::flow::{ConversationKey, Conversations, Inbox};
use crate::mirror::{ForumMirror, SyncOutcome};
use crate::permissions::PermissionCategory;
use crate::platform::{Destination, GuildId, Incoming, Platform, Reply, UserId};
use crate::render;
use crate::store::Store;

/// The bot: owns the store, the platform handle and open conversations.
///
/// Cheap to clone; every clone shares the same state.
#[derive(Clone)]
pub struct Bot {
    inner: Arc<Inner>,
}

struct Inner {
    store: Store,
    platform: Arc<dyn Platform>,
    conversations: Conversations,
    config: BotConfig,
}

impl Bot {
    pub fn new(store: Store, platform: Arc<dyn Platform>, config: BotConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                platform,
                conversations: Conversations::new(),
                config,
            }),
        }
    }

    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    pub fn conversations(&self) -> &Conversations {
        &self.inner.conversations
    }

    pub fn config(&self) -> &BotConfig {
        &self.inner.config
    }

    fn platform(&self) -> &Arc<dyn Platform> {
        &self.inner.platform
    }

    fn prefix(&self) -> &str {
        &self.inner.config.prefix
    }

    /// Handle one incoming message: feed it to an open conversation, or run
    /// it as a command.
    pub async fn handle(&self, msg: Incoming) {
        let key = ConversationKey::new(msg.author, msg.reply_to());
        if self.conversations().deliver(&key, &msg.content) {
            return;
        }

        let Some(parsed) = command::parse(&msg.content, self.prefix()) else {
            return;
        };
        let to = msg.reply_to();
        let result = match parsed {
            Ok(cmd) => {
                tracing::debug!(user = %msg.author, command = ?cmd, "Dispatching command");
                self.dispatch(&msg, cmd).await
            }
            Err(UsageError::Invalid(usage)) => self.send(to, render::error(usage)).await,
            Err(UsageError::Unknown(name)) => {
                let suggestions = command::suggestions(&name);
                let embed = render::command_not_found(self.prefix(), msg.content.trim(), &suggestions);
                self.send(to, embed).await
            }
        };
        if let Err(e) = result {
            self.report(to, &e).await;
        }
    }

    async fn dispatch(&self, msg: &Incoming, cmd: Command) -> Result<()> {
        match cmd {
            Command::Help => self.help(msg).await,
            Command::Projects => self.list_projects(msg).await,
            Command::Project { name, action } => self.project(msg, &name, action).await,
            Command::NewProject => self.new_project(msg).await,
            Command::EditProject(name) => self.edit_project(msg, &name).await,
            Command::DeleteProject(name) => self.delete_project(msg, &name).await,
            Command::CompleteTask(name) => self.complete_task(msg, &name).await,
            Command::Roles => self.roles(msg).await,
            Command::Role { action, role } => self.role(msg, action, &role).await,
            Command::Nickname { name, profession } => self.nickname(msg, &name, &profession).await,
            Command::Rewards => self.rewards(msg).await,
            Command::Shop => self.shop(msg).await,
            Command::ShopAdd { item, price } => self.shop_add(msg, &item, price).await,
            Command::Forums(channel) => self.forums(msg, channel.as_deref()).await,
            Command::Perm { action, role } => self.perm(msg, action, &role).await,
        }
    }

    /// Report a failed command to the user.
    async fn report(&self, to: Destination, e: &Error) {
        let text = if e.is_user_error() {
            tracing::debug!("Command rejected: {}", e);
            render::error(e.to_string())
        } else {
            tracing::error!("Command failed: {}", e);
            render::generic_error(e)
        };
        if let Err(send_err) = self.platform().send(to, Reply::Text(text)).await {
            tracing::warn!("Could not report error to {:?}: {}", to, send_err);
        }
    }

    async fn send(&self, to: Destination, reply: impl Into<Reply>) -> Result<()> {
        self.platform().send(to, reply.into()).await?;
        Ok(())
    }

    fn require(&self, msg: &Incoming, category: PermissionCategory, denied: &str) -> Result<()> {
        let allowed = self
            .store()
            .read(|doc| doc.permissions.has_permission(&msg.roles, category));
        if allowed {
            Ok(())
        } else {
            tracing::info!(user = %msg.author, category = category.as_str(), "Permission denied");
            Err(Error::permission_denied(format!(
                "You don't have permission to {}. Contact an administrator to configure permissions.",
                denied
            )))
        }
    }

    fn require_guild(&self, msg: &Incoming) -> Result<GuildId> {
        msg.guild
            .ok_or_else(|| Error::validation("This command can only be used in a server!"))
    }

    fn open_conversation(&self, key: ConversationKey) -> Result<Inbox> {
        self.conversations().open(key).ok_or_else(|| {
            Error::validation(
                "You already have an interactive session open here. Finish it or type 'cancel' first.",
            )
        })
    }

    /// Delete the invoking command message, for privacy. Best effort.
    async fn hide_command(&self, msg: &Incoming) {
        if msg.direct {
            return;
        }
        if let Err(e) = self.platform().delete_message(msg.channel, msg.message).await {
            tracing::debug!("Could not delete command message: {}", e);
        }
    }

    fn mirror(&self, guild: Option<GuildId>) -> ForumMirror<'_> {
        let forum = self.store().read(|doc| doc.forum_channel_name.clone());
        ForumMirror::new(self.platform(), guild, forum, self.prefix())
    }

    /// Bring the project's forum thread up to date with the document. Any
    /// failure becomes a warning sent to `warn_to`.
    async fn sync_mirror(
        &self,
        guild: Option<GuildId>,
        project_name: &str,
        warn_to: Destination,
    ) -> Option<SyncOutcome> {
        let project = self.store().read(|doc| doc.project(project_name).cloned())?;
        let mirror = self.mirror(guild);
        match mirror.sync(&project).await {
            Ok(outcome) => Some(outcome),
            Err(failure) => {
                tracing::warn!(project = project_name, "Forum mirror failed: {}", failure);
                let warning = render::mirror_warning(self.prefix(), &failure);
                if let Err(e) = self.platform().send(warn_to, warning.into()).await {
                    tracing::warn!("Could not send mirror warning: {}", e);
                }
                None
            }
        }
    }

    /// Greet a new member and give them the `Member` role. Failures are
    /// logged only.
    pub async fn member_joined(&self, guild: GuildId, user: UserId, name: &str) {
        let platform = self.platform();

        let role_assigned = match platform.guild_roles(guild).await {
            Ok(roles) => match roles.iter().find(|r| r.name == "Member" && !r.managed) {
                Some(role) => match platform.add_role(guild, user, role.id).await {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!("Cannot assign Member role to {}: {}", name, e);
                        false
                    }
                },
                None => {
                    tracing::warn!("'Member' role not found in guild {}", guild);
                    false
                }
            },
            Err(e) => {
                tracing::warn!("Could not list roles of guild {}: {}", guild, e);
                false
            }
        };

        let general = match platform.find_channel(guild, "general").await {
            Ok(channel) => channel,
            Err(e) => {
                tracing::warn!("Could not look up welcome channel: {}", e);
                None
            }
        };
        let Some(general) = general else {
            tracing::debug!("No 'general' channel; skipping welcome for {}", name);
            return;
        };

        let embed = render::welcome(self.prefix(), &user.member_id(), role_assigned);
        match platform
            .send(Destination::Channel(general.id), embed.into())
            .await
        {
            Ok(()) => tracing::info!("Welcomed {}", name),
            Err(e) => tracing::warn!("Could not welcome {}: {}", name, e),
        }
    }
}
