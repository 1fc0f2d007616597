//! In-process platform that records everything the bot does to it.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::{
    ChannelId, ChannelInfo, ChannelKind, Destination, GuildId, MessageId, Platform,
    PlatformError, PlatformResult, Reply, RoleId, RoleInfo, UserId,
};
use crate::render::Embed;

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryThread {
    pub id: ChannelId,
    pub forum: ChannelId,
    pub name: String,
    /// Every summary the thread has shown, oldest first.
    pub summaries: Vec<Embed>,
    pub archived: bool,
}

impl MemoryThread {
    pub fn summary(&self) -> Option<&Embed> {
        self.summaries.last()
    }
}

#[derive(Default)]
struct State {
    owner: Option<UserId>,
    roles: Vec<RoleInfo>,
    member_roles: BTreeMap<UserId, BTreeSet<RoleId>>,
    nicknames: BTreeMap<UserId, String>,
    channels: Vec<ChannelInfo>,
    threads: Vec<MemoryThread>,
    sent: Vec<(Destination, Reply)>,
    deleted_messages: Vec<MessageId>,
    deny_roles: bool,
    deny_nicknames: bool,
    fail_threads: bool,
}

pub struct MemoryPlatform {
    state: Mutex<State>,
    next_id: AtomicU64,
}

impl Default for MemoryPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPlatform {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            next_id: AtomicU64::new(1000),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    // ============================================================
    // Setup
    // ============================================================

    pub fn with_owner(self, owner: UserId) -> Self {
        self.state().owner = Some(owner);
        self
    }

    pub fn with_role(self, name: &str) -> Self {
        self.add_guild_role(name, false);
        self
    }

    pub fn with_managed_role(self, name: &str) -> Self {
        self.add_guild_role(name, true);
        self
    }

    pub fn with_forum(self, name: &str) -> Self {
        self.add_channel(name, ChannelKind::Forum);
        self
    }

    pub fn with_text_channel(self, name: &str) -> Self {
        self.add_channel(name, ChannelKind::Text);
        self
    }

    /// Role changes fail with `Forbidden`.
    pub fn deny_role_changes(self) -> Self {
        self.state().deny_roles = true;
        self
    }

    pub fn deny_nicknames(self) -> Self {
        self.state().deny_nicknames = true;
        self
    }

    /// Toggle failure of every thread operation.
    pub fn set_fail_threads(&self, fail: bool) {
        self.state().fail_threads = fail;
    }

    /// Archive every thread with this name, as the platform does to idle posts.
    pub fn archive_thread(&self, name: &str) {
        for thread in self.state().threads.iter_mut().filter(|t| t.name == name) {
            thread.archived = true;
        }
    }

    fn add_guild_role(&self, name: &str, managed: bool) -> RoleId {
        let id = RoleId(self.next_id());
        self.state().roles.push(RoleInfo {
            id,
            name: name.to_string(),
            managed,
        });
        id
    }

    fn add_channel(&self, name: &str, kind: ChannelKind) -> ChannelId {
        let id = ChannelId(self.next_id());
        self.state().channels.push(ChannelInfo {
            id,
            name: name.to_string(),
            kind,
        });
        id
    }

    /// Pre-create a thread, as if someone had posted it by hand.
    pub fn seed_thread(&self, forum_name: &str, name: &str) -> PlatformResult<ChannelId> {
        let forum = self
            .state()
            .channels
            .iter()
            .find(|c| c.name == forum_name)
            .map(|c| c.id)
            .ok_or_else(|| PlatformError::NotFound(format!("channel '{}'", forum_name)))?;
        let id = ChannelId(self.next_id());
        self.state().threads.push(MemoryThread {
            id,
            forum,
            name: name.to_string(),
            summaries: Vec::new(),
            archived: false,
        });
        Ok(id)
    }

    // ============================================================
    // Inspection
    // ============================================================

    pub fn sent(&self) -> Vec<(Destination, Reply)> {
        self.state().sent.clone()
    }

    pub fn sent_to(&self, to: Destination) -> Vec<Reply> {
        self.state()
            .sent
            .iter()
            .filter(|(d, _)| *d == to)
            .map(|(_, r)| r.clone())
            .collect()
    }

    pub fn clear_sent(&self) {
        self.state().sent.clear();
    }

    pub fn threads(&self) -> Vec<MemoryThread> {
        self.state().threads.clone()
    }

    pub fn thread_named(&self, name: &str) -> Option<MemoryThread> {
        self.state().threads.iter().find(|t| t.name == name).cloned()
    }

    pub fn role_id(&self, name: &str) -> Option<RoleId> {
        self.state().roles.iter().find(|r| r.name == name).map(|r| r.id)
    }

    /// Role names currently held by `user`.
    pub fn member_role_names(&self, user: UserId) -> BTreeSet<String> {
        let state = self.state();
        let held = state.member_roles.get(&user).cloned().unwrap_or_default();
        state
            .roles
            .iter()
            .filter(|r| held.contains(&r.id))
            .map(|r| r.name.clone())
            .collect()
    }

    pub fn nickname(&self, user: UserId) -> Option<String> {
        self.state().nicknames.get(&user).cloned()
    }

    pub fn deleted_messages(&self) -> Vec<MessageId> {
        self.state().deleted_messages.clone()
    }
}

#[async_trait]
impl Platform for MemoryPlatform {
    async fn send(&self, to: Destination, reply: Reply) -> PlatformResult<()> {
        self.state().sent.push((to, reply));
        Ok(())
    }

    async fn delete_message(&self, _channel: ChannelId, message: MessageId) -> PlatformResult<()> {
        self.state().deleted_messages.push(message);
        Ok(())
    }

    async fn guild_roles(&self, _guild: GuildId) -> PlatformResult<Vec<RoleInfo>> {
        Ok(self.state().roles.clone())
    }

    async fn guild_owner(&self, _guild: GuildId) -> PlatformResult<UserId> {
        self.state()
            .owner
            .ok_or_else(|| PlatformError::NotFound("guild owner".to_string()))
    }

    async fn add_role(&self, _guild: GuildId, user: UserId, role: RoleId) -> PlatformResult<()> {
        let mut state = self.state();
        if state.deny_roles {
            return Err(PlatformError::Forbidden("manage roles".to_string()));
        }
        state.member_roles.entry(user).or_default().insert(role);
        Ok(())
    }

    async fn remove_role(&self, _guild: GuildId, user: UserId, role: RoleId) -> PlatformResult<()> {
        let mut state = self.state();
        if state.deny_roles {
            return Err(PlatformError::Forbidden("manage roles".to_string()));
        }
        if let Some(held) = state.member_roles.get_mut(&user) {
            held.remove(&role);
        }
        Ok(())
    }

    async fn set_nickname(
        &self,
        _guild: GuildId,
        user: UserId,
        nickname: &str,
    ) -> PlatformResult<()> {
        let mut state = self.state();
        if state.deny_nicknames {
            return Err(PlatformError::Forbidden("change your nickname".to_string()));
        }
        state.nicknames.insert(user, nickname.to_string());
        Ok(())
    }

    async fn find_channel(
        &self,
        _guild: GuildId,
        name: &str,
    ) -> PlatformResult<Option<ChannelInfo>> {
        Ok(self.state().channels.iter().find(|c| c.name == name).cloned())
    }

    async fn forum_channels(&self, _guild: GuildId) -> PlatformResult<Vec<ChannelInfo>> {
        Ok(self
            .state()
            .channels
            .iter()
            .filter(|c| c.kind == ChannelKind::Forum)
            .cloned()
            .collect())
    }

    async fn find_thread(
        &self,
        _guild: GuildId,
        forum: ChannelId,
        name: &str,
    ) -> PlatformResult<Option<ChannelId>> {
        let state = self.state();
        if state.fail_threads {
            return Err(PlatformError::Forbidden("view threads".to_string()));
        }
        Ok(state
            .threads
            .iter()
            .find(|t| t.forum == forum && t.name == name)
            .map(|t| t.id))
    }

    async fn create_thread(
        &self,
        forum: ChannelId,
        name: &str,
        summary: Embed,
    ) -> PlatformResult<ChannelId> {
        if self.state().fail_threads {
            return Err(PlatformError::Forbidden("create threads".to_string()));
        }
        let id = ChannelId(self.next_id());
        self.state().threads.push(MemoryThread {
            id,
            forum,
            name: name.to_string(),
            summaries: vec![summary],
            archived: false,
        });
        Ok(id)
    }

    async fn replace_summary(&self, thread: ChannelId, summary: Embed) -> PlatformResult<()> {
        let mut state = self.state();
        if state.fail_threads {
            return Err(PlatformError::Forbidden("edit threads".to_string()));
        }
        let thread = state
            .threads
            .iter_mut()
            .find(|t| t.id == thread)
            .ok_or_else(|| PlatformError::NotFound(format!("thread {}", thread)))?;
        thread.summaries.push(summary);
        thread.archived = false;
        Ok(())
    }

    async fn delete_thread(&self, thread: ChannelId) -> PlatformResult<()> {
        let mut state = self.state();
        if state.fail_threads {
            return Err(PlatformError::Forbidden("manage threads".to_string()));
        }
        let before = state.threads.len();
        state.threads.retain(|t| t.id != thread);
        if state.threads.len() == before {
            return Err(PlatformError::NotFound(format!("thread {}", thread)));
        }
        Ok(())
    }
}
