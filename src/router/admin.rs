use super::command::{PermAction, RoleAction};
use super::Bot;
use crate::error::{Error, Result};
use crate::mirror::ForumMirror;
use crate::permissions::{self, PermissionCategory};
use crate::platform::{Incoming, RoleInfo};
use crate::render;

/// Longest nickname the platform accepts, in characters.
pub const MAX_NICKNAME_LEN: usize = 32;

/// `"<name> | <profession>"`, shortened to fit [`MAX_NICKNAME_LEN`].
///
/// The profession is cut first. If the name alone leaves no room, the
/// nickname is the name cut to the limit.
pub fn compose_nickname(name: &str, profession: &str) -> String {
    let name = name.trim();
    let profession = profession.trim();
    let full = format!("{} | {}", name, profession);
    if full.chars().count() <= MAX_NICKNAME_LEN {
        return full;
    }

    let room = MAX_NICKNAME_LEN.saturating_sub(name.chars().count() + 3);
    if room > 0 {
        let cut: String = profession.chars().take(room).collect();
        format!("{} | {}", name, cut)
    } else {
        name.chars().take(MAX_NICKNAME_LEN).collect()
    }
}

impl Bot {
    // ============================================================
    // Roles and nicknames
    // ============================================================

    async fn find_role(&self, msg: &Incoming, name: &str) -> Result<RoleInfo> {
        let guild = self.require_guild(msg)?;
        self.platform()
            .guild_roles(guild)
            .await?
            .into_iter()
            .find(|r| r.name == name)
            .ok_or_else(|| Error::not_found(format!("Role '{}' not found!", name)))
    }

    pub(super) async fn roles(&self, msg: &Incoming) -> Result<()> {
        let guild = self.require_guild(msg)?;
        let names: Vec<String> = self
            .platform()
            .guild_roles(guild)
            .await?
            .into_iter()
            .filter(|r| !r.managed && r.name != "@everyone")
            .map(|r| r.name)
            .collect();
        self.send(msg.reply_to(), render::roles_list(self.prefix(), &names))
            .await
    }

    pub(super) async fn role(&self, msg: &Incoming, action: RoleAction, name: &str) -> Result<()> {
        let guild = self.require_guild(msg)?;
        let role = self.find_role(msg, name).await?;
        let member = msg.author.member_id();
        let held = msg.roles.contains(&role.name);

        match action {
            RoleAction::Assign => {
                if held {
                    return Err(Error::validation(format!(
                        "You already have the role '{}'!",
                        name
                    )));
                }
                if role.managed {
                    return Err(Error::validation(
                        "I can't assign that role because it's managed by an integration!",
                    ));
                }
                self.platform().add_role(guild, msg.author, role.id).await?;
                self.store().update(|doc| {
                    doc.user_roles.insert(member.clone(), role.name.clone());
                    Ok::<_, Error>(())
                })?;
                tracing::info!(user = %msg.author, role = %role.name, "Role assigned");
                self.send(msg.reply_to(), render::role_assigned(&role.name))
                    .await
            }
            RoleAction::Remove => {
                if !held {
                    return Err(Error::validation(format!(
                        "You don't have the role '{}'!",
                        name
                    )));
                }
                self.platform()
                    .remove_role(guild, msg.author, role.id)
                    .await?;
                let stored = self.store().read(|doc| {
                    doc.user_roles.get(&member).map(String::as_str) == Some(role.name.as_str())
                });
                if stored {
                    self.store().update(|doc| {
                        doc.user_roles.remove(&member);
                        Ok::<_, Error>(())
                    })?;
                }
                tracing::info!(user = %msg.author, role = %role.name, "Role removed");
                self.send(msg.reply_to(), render::role_removed(&role.name))
                    .await
            }
        }
    }

    pub(super) async fn nickname(&self, msg: &Incoming, name: &str, profession: &str) -> Result<()> {
        let guild = self.require_guild(msg)?;
        let nickname = compose_nickname(name, profession);
        self.platform()
            .set_nickname(guild, msg.author, &nickname)
            .await?;
        tracing::info!(user = %msg.author, nickname = %nickname, "Nickname updated");
        self.send(
            msg.reply_to(),
            render::nickname_updated(&nickname, name.trim(), profession.trim()),
        )
        .await
    }

    // ============================================================
    // Points and shop
    // ============================================================

    pub(super) async fn rewards(&self, msg: &Incoming) -> Result<()> {
        let member = msg.author.member_id();
        let embed = self
            .store()
            .read(|doc| render::rewards(doc.points(&member), &doc.reward_tasks));
        self.send(msg.reply_to(), embed).await
    }

    pub(super) async fn shop(&self, msg: &Incoming) -> Result<()> {
        let member = msg.author.member_id();
        let embed = self
            .store()
            .read(|doc| render::shop(doc.points(&member), &doc.shop_items));
        self.send(msg.reply_to(), embed).await
    }

    pub(super) async fn shop_add(&self, msg: &Incoming, item: &str, price: u64) -> Result<()> {
        self.require(msg, PermissionCategory::ShopManagement, "add shop items")?;
        self.store().update(|doc| {
            doc.shop_items.insert(item.to_string(), price);
            Ok::<_, Error>(())
        })?;
        tracing::info!(item, price, by = %msg.author_name, "Shop item added");
        self.send(
            msg.reply_to(),
            render::shop_item_added(item, price, &msg.author.member_id()),
        )
        .await
    }

    // ============================================================
    // Forum channel and permissions
    // ============================================================

    pub(super) async fn forums(&self, msg: &Incoming, channel: Option<&str>) -> Result<()> {
        self.require(msg, PermissionCategory::ForumConfig, "configure forum channels")?;
        self.require_guild(msg)?;

        let Some(new_name) = channel else {
            let mirror = self.mirror(msg.guild);
            let located = mirror.locate().await;
            let status = located.as_ref().map(|_| ());
            let embed = render::forum_status(self.prefix(), mirror.forum_name(), status);
            return self.send(msg.reply_to(), embed).await;
        };

        let candidate = ForumMirror::new(self.platform(), msg.guild, new_name, self.prefix());
        match candidate.locate().await {
            Ok(forum) => {
                let old = self.store().update(|doc| {
                    let old = std::mem::replace(&mut doc.forum_channel_name, forum.name.clone());
                    Ok::<_, Error>(old)
                })?;
                tracing::info!(old = %old, new = %forum.name, by = %msg.author_name, "Forum channel changed");
                self.send(
                    msg.reply_to(),
                    render::forum_updated(&old, &forum.name, &msg.author.member_id()),
                )
                .await
            }
            Err(failure) => {
                tracing::debug!("Rejected forum channel '{}': {}", new_name, failure);
                self.send(msg.reply_to(), render::forum_rejected(&failure))
                    .await
            }
        }
    }

    pub(super) async fn perm(&self, msg: &Incoming, action: PermAction, role: &str) -> Result<()> {
        let guild = self.require_guild(msg)?;
        let owner = self.platform().guild_owner(guild).await?;
        if !permissions::is_owner(msg.author, owner) {
            return Err(Error::permission_denied(
                "Only the server owner can configure permissions!",
            ));
        }
        let role = self.find_role(msg, role).await?.name;
        let by = msg.author.member_id();

        let embed = match action {
            PermAction::View => self
                .store()
                .read(|doc| render::permission_view(self.prefix(), &role, &doc.permissions)),
            PermAction::Add => {
                let granted = self.store().update(|doc| {
                    Ok::<_, Error>(doc.permissions.grant_all(&role))
                })?;
                tracing::info!(role = %role, granted = granted.len(), "Permissions granted");
                render::permissions_granted(&role, &granted, &by)
            }
            PermAction::Remove => {
                let removed = self.store().update(|doc| {
                    Ok::<_, Error>(doc.permissions.revoke_all(&role))
                })?;
                tracing::info!(role = %role, removed = removed.len(), "Permissions removed");
                render::permissions_removed(&role, &removed, &by)
            }
        };
        self.send(msg.reply_to(), embed).await
    }
}
