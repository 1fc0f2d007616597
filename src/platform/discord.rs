//! Discord adapter built on serenity.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serenity::all::{
    ChannelType, Context, CreateEmbed, CreateEmbedFooter, CreateForumPost, CreateMessage,
    EditMember, EditMessage, EditThread, EventHandler, GatewayIntents, Http, Member, Message,
    Ready,
};
use serenity::model::id as sid;

use super::{
    ChannelId, ChannelInfo, ChannelKind, Destination, GuildId, MessageId, Platform,
    PlatformError, PlatformResult, Reply, RoleId, RoleInfo, UserId,
};
use crate::render::Embed;
use crate::router::Bot;

/// Most recently archived threads fetched per forum lookup (the API maximum).
const ARCHIVED_THREAD_PAGE: u64 = 100;

pub fn intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MEMBERS
}

/// Build a gateway client that feeds every event to `bot`.
pub async fn client(token: &str, bot: Bot) -> anyhow::Result<serenity::Client> {
    let client = serenity::Client::builder(token, intents())
        .event_handler(Handler { bot })
        .await?;
    Ok(client)
}

pub struct DiscordPlatform {
    http: Arc<Http>,
}

impl DiscordPlatform {
    pub fn new(token: &str) -> Self {
        Self {
            http: Arc::new(Http::new(token)),
        }
    }

    fn http(&self) -> &Http {
        &self.http
    }
}

fn map_err(action: &str) -> impl Fn(serenity::Error) -> PlatformError + '_ {
    move |e| {
        if let serenity::Error::Http(http) = &e {
            match http.status_code().map(|s| s.as_u16()) {
                Some(403) => return PlatformError::Forbidden(action.to_string()),
                Some(404) => return PlatformError::NotFound(action.to_string()),
                _ => {}
            }
        }
        PlatformError::Other(e.to_string())
    }
}

fn to_create_embed(embed: Embed) -> CreateEmbed {
    let mut out = CreateEmbed::new()
        .title(embed.title)
        .colour(embed.color);
    if let Some(description) = embed.description {
        out = out.description(description);
    }
    for field in embed.fields {
        out = out.field(field.name, field.value, field.inline);
    }
    if let Some(footer) = embed.footer {
        out = out.footer(CreateEmbedFooter::new(footer));
    }
    out
}

fn to_message(reply: Reply) -> CreateMessage {
    match reply {
        Reply::Text(text) => CreateMessage::new().content(text),
        Reply::Embed(embed) => CreateMessage::new().embed(to_create_embed(embed)),
    }
}

fn channel_kind(kind: ChannelType) -> ChannelKind {
    match kind {
        ChannelType::Forum => ChannelKind::Forum,
        ChannelType::Text => ChannelKind::Text,
        other => ChannelKind::Other(format!("{:?}", other).to_lowercase()),
    }
}

#[async_trait]
impl Platform for DiscordPlatform {
    async fn send(&self, to: Destination, reply: Reply) -> PlatformResult<()> {
        let message = to_message(reply);
        match to {
            Destination::Channel(channel) => {
                sid::ChannelId::new(channel.0)
                    .send_message(self.http(), message)
                    .await
                    .map_err(map_err("send messages"))?;
            }
            Destination::Direct(user) => {
                sid::UserId::new(user.0)
                    .direct_message(self.http(), message)
                    .await
                    .map_err(map_err("send you direct messages"))?;
            }
        }
        Ok(())
    }

    async fn delete_message(&self, channel: ChannelId, message: MessageId) -> PlatformResult<()> {
        sid::ChannelId::new(channel.0)
            .delete_message(self.http(), sid::MessageId::new(message.0))
            .await
            .map_err(map_err("delete messages"))
    }

    async fn guild_roles(&self, guild: GuildId) -> PlatformResult<Vec<RoleInfo>> {
        let roles = sid::GuildId::new(guild.0)
            .roles(self.http())
            .await
            .map_err(map_err("view roles"))?;
        let mut roles: Vec<_> = roles
            .into_values()
            .filter(|r| r.id.get() != guild.0)
            .collect();
        roles.sort_by(|a, b| b.position.cmp(&a.position));
        Ok(roles
            .into_iter()
            .map(|r| RoleInfo {
                id: RoleId(r.id.get()),
                name: r.name,
                managed: r.managed,
            })
            .collect())
    }

    async fn guild_owner(&self, guild: GuildId) -> PlatformResult<UserId> {
        let partial = sid::GuildId::new(guild.0)
            .to_partial_guild(self.http())
            .await
            .map_err(map_err("view the server"))?;
        Ok(UserId(partial.owner_id.get()))
    }

    async fn add_role(&self, guild: GuildId, user: UserId, role: RoleId) -> PlatformResult<()> {
        self.http
            .add_member_role(
                sid::GuildId::new(guild.0),
                sid::UserId::new(user.0),
                sid::RoleId::new(role.0),
                None,
            )
            .await
            .map_err(map_err("manage roles"))
    }

    async fn remove_role(&self, guild: GuildId, user: UserId, role: RoleId) -> PlatformResult<()> {
        self.http
            .remove_member_role(
                sid::GuildId::new(guild.0),
                sid::UserId::new(user.0),
                sid::RoleId::new(role.0),
                None,
            )
            .await
            .map_err(map_err("manage roles"))
    }

    async fn set_nickname(
        &self,
        guild: GuildId,
        user: UserId,
        nickname: &str,
    ) -> PlatformResult<()> {
        sid::GuildId::new(guild.0)
            .edit_member(
                self.http(),
                sid::UserId::new(user.0),
                EditMember::new().nickname(nickname),
            )
            .await
            .map_err(map_err("change your nickname"))?;
        Ok(())
    }

    async fn find_channel(
        &self,
        guild: GuildId,
        name: &str,
    ) -> PlatformResult<Option<ChannelInfo>> {
        let channels = sid::GuildId::new(guild.0)
            .channels(self.http())
            .await
            .map_err(map_err("view channels"))?;
        let mut matching: Vec<_> = channels.into_values().filter(|c| c.name == name).collect();
        matching.sort_by_key(|c| c.position);
        Ok(matching.into_iter().next().map(|c| ChannelInfo {
            id: ChannelId(c.id.get()),
            name: c.name,
            kind: channel_kind(c.kind),
        }))
    }

    async fn forum_channels(&self, guild: GuildId) -> PlatformResult<Vec<ChannelInfo>> {
        let channels = sid::GuildId::new(guild.0)
            .channels(self.http())
            .await
            .map_err(map_err("view channels"))?;
        let mut forums: Vec<_> = channels
            .into_values()
            .filter(|c| c.kind == ChannelType::Forum)
            .collect();
        forums.sort_by_key(|c| c.position);
        Ok(forums
            .into_iter()
            .map(|c| ChannelInfo {
                id: ChannelId(c.id.get()),
                name: c.name,
                kind: ChannelKind::Forum,
            })
            .collect())
    }

    async fn find_thread(
        &self,
        guild: GuildId,
        forum: ChannelId,
        name: &str,
    ) -> PlatformResult<Option<ChannelId>> {
        let active = sid::GuildId::new(guild.0)
            .get_active_threads(self.http())
            .await
            .map_err(map_err("view threads"))?;
        let found = active
            .threads
            .into_iter()
            .find(|t| t.parent_id.map(|p| p.get()) == Some(forum.0) && t.name == name);
        if let Some(thread) = found {
            return Ok(Some(ChannelId(thread.id.get())));
        }

        // Inactive forum posts are archived and drop out of the active list.
        let archived = sid::ChannelId::new(forum.0)
            .get_archived_public_threads(self.http(), None, Some(ARCHIVED_THREAD_PAGE))
            .await
            .map_err(map_err("read message history in the forum"))?;
        Ok(archived
            .threads
            .into_iter()
            .find(|t| t.name == name)
            .map(|t| ChannelId(t.id.get())))
    }

    async fn create_thread(
        &self,
        forum: ChannelId,
        name: &str,
        summary: Embed,
    ) -> PlatformResult<ChannelId> {
        let post = CreateForumPost::new(name, CreateMessage::new().embed(to_create_embed(summary)));
        let thread = sid::ChannelId::new(forum.0)
            .create_forum_post(self.http(), post)
            .await
            .map_err(map_err("create forum posts"))?;
        Ok(ChannelId(thread.id.get()))
    }

    async fn replace_summary(&self, thread: ChannelId, summary: Embed) -> PlatformResult<()> {
        let channel = sid::ChannelId::new(thread.0);
        // The starter message of a forum post shares the thread's id.
        let starter = sid::MessageId::new(thread.0);
        let embed = to_create_embed(summary);
        let edited = channel
            .edit_message(self.http(), starter, EditMessage::new().embed(embed.clone()))
            .await;
        if let Err(e) = edited {
            tracing::debug!("Could not edit starter message of thread {}: {}", thread, e);
            // Archived posts reject edits until they are reopened.
            let reopened = channel
                .edit_thread(self.http(), EditThread::new().archived(false))
                .await
                .is_ok();
            if reopened {
                let retried = channel
                    .edit_message(self.http(), starter, EditMessage::new().embed(embed.clone()))
                    .await;
                if retried.is_ok() {
                    return Ok(());
                }
            }
            channel
                .send_message(self.http(), CreateMessage::new().embed(embed))
                .await
                .map_err(map_err("send messages in the forum thread"))?;
        }
        Ok(())
    }

    async fn delete_thread(&self, thread: ChannelId) -> PlatformResult<()> {
        sid::ChannelId::new(thread.0)
            .delete(self.http())
            .await
            .map_err(map_err("manage threads"))?;
        Ok(())
    }
}

// ============================================================
// Gateway events
// ============================================================

struct Handler {
    bot: Bot,
}

/// Names of the roles a message author holds.
async fn author_roles(ctx: &Context, msg: &Message) -> BTreeSet<String> {
    let (Some(guild_id), Some(member)) = (msg.guild_id, msg.member.as_ref()) else {
        return BTreeSet::new();
    };

    let cached: Option<BTreeSet<String>> = ctx.cache.guild(guild_id).map(|guild| {
        member
            .roles
            .iter()
            .filter_map(|id| guild.roles.get(id).map(|r| r.name.clone()))
            .collect()
    });
    if let Some(names) = cached {
        return names;
    }

    match guild_id.roles(&ctx.http).await {
        Ok(roles) => member
            .roles
            .iter()
            .filter_map(|id| roles.get(id).map(|r| r.name.clone()))
            .collect(),
        Err(e) => {
            tracing::warn!("Could not resolve roles for {}: {}", msg.author.name, e);
            BTreeSet::new()
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _: Context, ready: Ready) {
        tracing::info!(
            "{} is online and connected to {} guild(s)",
            ready.user.name,
            ready.guilds.len()
        );
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let incoming = super::Incoming {
            author: UserId(msg.author.id.get()),
            author_name: msg.author.name.clone(),
            roles: author_roles(&ctx, &msg).await,
            guild: msg.guild_id.map(|g| GuildId(g.get())),
            channel: ChannelId(msg.channel_id.get()),
            direct: msg.guild_id.is_none(),
            message: MessageId(msg.id.get()),
            content: msg.content.clone(),
        };
        self.bot.handle(incoming).await;
    }

    async fn guild_member_addition(&self, _: Context, new_member: Member) {
        self.bot
            .member_joined(
                GuildId(new_member.guild_id.get()),
                UserId(new_member.user.id.get()),
                &new_member.user.name,
            )
            .await;
    }
}
