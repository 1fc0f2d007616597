use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crewmate::config::{BotConfig, FlowTimeouts};
use crewmate::flow::ConversationKey;
use crewmate::mirror::thread_name;
use crewmate::models::*;
use crewmate::platform::memory::MemoryPlatform;
use crewmate::platform::{ChannelId, Destination, GuildId, Incoming, MessageId, Reply, UserId};
use crewmate::{Bot, Store};

const GUILD: GuildId = GuildId(1);
const CHANNEL: ChannelId = ChannelId(10);
const OWNER: UserId = UserId(100);
const ADMIN: UserId = UserId(200);
const MEMBER: UserId = UserId(300);

static NEXT_MESSAGE: AtomicU64 = AtomicU64::new(1);

struct Harness {
    bot: Bot,
    platform: Arc<MemoryPlatform>,
}

fn platform() -> MemoryPlatform {
    MemoryPlatform::new()
        .with_owner(OWNER)
        .with_role("admin")
        .with_role("Developer")
        .with_role("Member")
        .with_managed_role("Helper Bot")
        .with_forum(DEFAULT_FORUM_CHANNEL)
        .with_text_channel("general")
}

fn setup_with(platform: MemoryPlatform, timeouts: FlowTimeouts) -> Harness {
    let platform = Arc::new(platform);
    let bot = Bot::new(
        Store::open_memory(),
        platform.clone(),
        BotConfig::with_timeouts(timeouts),
    );
    Harness { bot, platform }
}

fn setup() -> Harness {
    setup_with(platform(), FlowTimeouts::uniform(Duration::from_secs(5)))
}

fn roles_of(user: UserId) -> &'static [&'static str] {
    if user == ADMIN {
        &["admin"]
    } else {
        &[]
    }
}

fn incoming(user: UserId, content: &str, direct: bool) -> Incoming {
    Incoming {
        author: user,
        author_name: format!("user-{}", user),
        roles: if direct {
            Default::default()
        } else {
            roles_of(user).iter().map(|r| r.to_string()).collect()
        },
        guild: if direct { None } else { Some(GUILD) },
        channel: CHANNEL,
        direct,
        message: MessageId(NEXT_MESSAGE.fetch_add(1, Ordering::Relaxed)),
        content: content.to_string(),
    }
}

fn say(user: UserId, content: &str) -> Incoming {
    incoming(user, content, false)
}

fn dm(user: UserId, content: &str) -> Incoming {
    incoming(user, content, true)
}

fn texts(replies: Vec<Reply>) -> Vec<String> {
    replies.iter().map(|r| r.summary().to_string()).collect()
}

impl Harness {
    async fn send(&self, msg: Incoming) {
        self.bot.handle(msg).await;
    }

    /// Run `command` in the background until it opens the conversation at `key`.
    async fn start(&self, command: Incoming, key: &ConversationKey) -> JoinHandle<()> {
        let bot = self.bot.clone();
        let task = tokio::spawn(async move { bot.handle(command).await });

        let mut opened = false;
        for _ in 0..1000 {
            if self.bot.conversations().is_open(key) {
                opened = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        assert!(opened, "conversation {:?} never opened", key);
        task
    }

    async fn finish(task: JoinHandle<()>) {
        tokio::time::timeout(Duration::from_secs(10), task)
            .await
            .expect("command did not finish")
            .expect("command panicked");
    }

    /// Run `command`, feed `replies` to the conversation it opens at `key`,
    /// and wait for the command to finish.
    async fn converse(&self, command: Incoming, key: ConversationKey, replies: &[Incoming]) {
        let task = self.start(command, &key).await;
        for reply in replies {
            self.bot.handle(reply.clone()).await;
        }
        Self::finish(task).await;
    }

    async fn in_dm(&self, user: UserId, command: &str, replies: &[&str]) {
        let replies: Vec<Incoming> = replies.iter().map(|r| dm(user, r)).collect();
        self.converse(say(user, command), ConversationKey::direct(user), &replies)
            .await;
    }

    async fn in_channel(&self, user: UserId, command: &str, replies: &[&str]) {
        let replies: Vec<Incoming> = replies.iter().map(|r| say(user, r)).collect();
        let key = ConversationKey::new(user, Destination::Channel(CHANNEL));
        self.converse(say(user, command), key, &replies).await;
    }

    fn channel_texts(&self) -> Vec<String> {
        texts(self.platform.sent_to(Destination::Channel(CHANNEL)))
    }

    fn dm_texts(&self, user: UserId) -> Vec<String> {
        texts(self.platform.sent_to(Destination::Direct(user)))
    }

    fn doc(&self) -> Document {
        self.bot.store().snapshot()
    }

    fn seed(&self, name: &str, tasks: &[(&str, i64, i64)]) {
        let tasks = tasks
            .iter()
            .map(|(d, r, m)| Task::new(*d, *r, *m).expect("Failed to build task"))
            .collect();
        let project = Project::new(CreateProjectInput {
            name: name.to_string(),
            description: "Seeded".to_string(),
            created_by: "seed".to_string(),
            tasks,
        })
        .expect("Failed to build project");
        self.bot
            .store()
            .update(|doc| {
                doc.projects.insert(name.to_string(), project);
                Ok::<_, crewmate::Error>(())
            })
            .expect("seed failed");
    }

    fn assign(&self, name: &str, index: usize, member: UserId) {
        self.bot
            .store()
            .update(|doc| {
                let project = doc.projects.get_mut(name).expect("project missing");
                project.assign(index, &member.member_id())?;
                Ok::<_, crewmate::Error>(())
            })
            .expect("assign failed");
    }
}

fn contains(texts: &[String], needle: &str) -> bool {
    texts.iter().any(|t| t.contains(needle))
}

mod create_project {
    use super::*;

    #[tokio::test]
    async fn creates_a_project_through_direct_messages() {
        let h = setup();
        h.in_dm(
            ADMIN,
            "!new project",
            &["Apollo", "Reach the moon", "Build rocket 50 3", "Paint it 20 1", "done"],
        )
        .await;

        let doc = h.doc();
        let project = doc.project("Apollo").expect("project missing");
        assert_eq!(project.description(), "Reach the moon");
        assert_eq!(project.tasks().len(), 2);
        assert_eq!(project.created_by(), "user-200");
        assert_eq!(project.progress_percent(), 0);

        assert!(contains(&h.dm_texts(ADMIN), "✅ Project Created Successfully!"));
        let thread = h.platform.thread_named(&thread_name("Apollo")).expect("thread missing");
        assert_eq!(thread.summaries.len(), 1);
        assert_eq!(h.platform.deleted_messages().len(), 1);
    }

    #[tokio::test]
    async fn refuses_members_without_permission() {
        let h = setup();
        h.send(say(MEMBER, "!new project")).await;

        assert!(contains(&h.channel_texts(), "You don't have permission to create projects"));
        assert!(!h.bot.conversations().is_open(&ConversationKey::direct(MEMBER)));
        assert!(h.dm_texts(MEMBER).is_empty());
    }

    #[tokio::test]
    async fn cancel_during_task_collection_leaves_no_project() {
        let h = setup();
        h.in_dm(ADMIN, "!new project", &["Apollo", "Moon", "Build rocket 50 3", "cancel"])
            .await;

        assert!(h.doc().projects.is_empty());
        assert!(contains(&h.dm_texts(ADMIN), "❌ Project creation cancelled."));
        assert!(h.platform.threads().is_empty());
    }

    #[tokio::test]
    async fn done_without_tasks_creates_nothing() {
        let h = setup();
        h.in_dm(ADMIN, "!new project", &["Apollo", "Moon", "DONE"]).await;

        assert!(h.doc().projects.is_empty());
        assert!(contains(&h.dm_texts(ADMIN), "No tasks provided"));
    }

    #[tokio::test]
    async fn timeout_after_some_tasks_leaves_no_project() {
        let h = setup_with(platform(), FlowTimeouts::uniform(Duration::from_millis(250)));
        h.in_dm(ADMIN, "!new project", &["Apollo", "Moon", "Build rocket 50 3"])
            .await;

        assert!(h.doc().projects.is_empty());
        assert!(contains(&h.dm_texts(ADMIN), "⏰ Timeout! Project creation cancelled."));
    }

    #[tokio::test]
    async fn timeout_before_any_task_leaves_no_project() {
        let h = setup_with(platform(), FlowTimeouts::uniform(Duration::from_millis(250)));
        h.in_dm(ADMIN, "!new project", &[]).await;

        assert!(h.doc().projects.is_empty());
        assert!(!h.bot.conversations().is_open(&ConversationKey::direct(ADMIN)));
    }

    #[tokio::test]
    async fn bad_task_lines_reprompt() {
        let h = setup();
        h.in_dm(
            ADMIN,
            "!new project",
            &["Apollo", "Moon", "Build rocket fifty 3", "Build rocket 0 3", "Build rocket 50 3", "done"],
        )
        .await;

        assert_eq!(h.doc().project("Apollo").expect("project missing").tasks().len(), 1);
        let dms = h.dm_texts(ADMIN);
        assert!(contains(&dms, "Invalid format!"));
        assert!(contains(&dms, "must be positive numbers"));
    }

    #[tokio::test]
    async fn duplicate_names_are_asked_again() {
        let h = setup();
        h.seed("Apollo", &[("Build rocket", 50, 3)]);
        h.in_dm(ADMIN, "!new project", &["Apollo", "Gemini", "Orbit", "Dock 10 2", "done"])
            .await;

        assert!(contains(&h.dm_texts(ADMIN), "A project named 'Apollo' already exists!"));
        assert!(h.doc().project("Gemini").is_some());
        assert_eq!(h.doc().projects.len(), 2);
    }

    #[tokio::test]
    async fn missing_forum_only_warns() {
        let h = setup_with(
            MemoryPlatform::new().with_text_channel("general"),
            FlowTimeouts::uniform(Duration::from_secs(5)),
        );
        h.in_dm(ADMIN, "!new project", &["Apollo", "Moon", "Build rocket 50 3", "done"])
            .await;

        assert!(h.doc().project("Apollo").is_some());
        let dms = h.dm_texts(ADMIN);
        assert!(contains(&dms, "⚠️ Forum Channel Not Found"));
        assert!(contains(&dms, "✅ Project Created Successfully!"));
    }

    #[tokio::test]
    async fn a_second_session_is_refused_while_one_is_open() {
        let h = setup();
        let key = ConversationKey::direct(ADMIN);
        let replies = [say(ADMIN, "!new project"), dm(ADMIN, "cancel")];
        h.converse(say(ADMIN, "!new project"), key, &replies).await;

        assert!(contains(&h.channel_texts(), "already have an interactive session"));
        assert!(h.doc().projects.is_empty());
    }
}

mod assign_and_complete {
    use super::*;

    #[tokio::test]
    async fn assigns_the_chosen_task_and_updates_the_thread() {
        let h = setup();
        h.seed("Apollo", &[("Build rocket", 50, 3), ("Paint it", 20, 1)]);
        h.in_channel(MEMBER, "!project Apollo assign", &["2"]).await;

        let doc = h.doc();
        let project = doc.project("Apollo").expect("project missing");
        assert!(project.tasks()[1].is_assigned(&MEMBER.member_id()));
        assert!(project.members().contains(&MEMBER.member_id()));
        assert!(contains(&h.channel_texts(), "✅ Task Assigned!"));
        assert!(h.platform.thread_named(&thread_name("Apollo")).is_some());
    }

    #[tokio::test]
    async fn timeout_leaves_the_task_unassigned() {
        let h = setup_with(platform(), FlowTimeouts::uniform(Duration::from_millis(250)));
        h.seed("Apollo", &[("Build rocket", 50, 3)]);
        h.in_channel(MEMBER, "!project Apollo assign", &[]).await;

        let doc = h.doc();
        assert!(doc.project("Apollo").expect("project missing").tasks()[0]
            .assigned_members()
            .is_empty());
        assert!(contains(&h.channel_texts(), "⏰ Timeout! Task assignment cancelled."));
        let key = ConversationKey::new(MEMBER, Destination::Channel(CHANNEL));
        assert!(!h.bot.conversations().is_open(&key));
    }

    #[tokio::test]
    async fn only_listed_numbers_are_accepted() {
        let h = setup();
        h.seed("Apollo", &[("Paint it", 20, 1), ("Build rocket", 50, 3)]);
        h.assign("Apollo", 0, ADMIN);

        h.in_channel(MEMBER, "!project Apollo assign", &["1", "two", "2"])
            .await;

        let texts = h.channel_texts();
        assert!(contains(&texts, "❌ Invalid task selection! Please try again."));
        assert!(contains(&texts, "valid number or 'exit'"));
        let doc = h.doc();
        let project = doc.project("Apollo").expect("project missing");
        assert_eq!(project.tasks()[0].assigned_members().len(), 1);
        assert!(project.tasks()[1].is_assigned(&MEMBER.member_id()));
    }

    #[tokio::test]
    async fn reports_when_nothing_is_available() {
        let h = setup();
        h.seed("Apollo", &[("Paint it", 20, 1)]);
        h.assign("Apollo", 0, ADMIN);

        h.send(say(MEMBER, "!project Apollo assign")).await;

        assert!(contains(&h.channel_texts(), "❌ No Available Tasks"));
    }

    #[tokio::test]
    async fn completion_splits_points_by_floor_division() {
        let h = setup();
        h.seed("Apollo", &[("Build rocket", 50, 3), ("Paint it", 20, 1), ("Launch", 10, 1)]);
        h.assign("Apollo", 0, ADMIN);
        h.assign("Apollo", 0, OWNER);
        h.assign("Apollo", 0, MEMBER);

        h.in_channel(MEMBER, "!completed project Apollo", &["1"]).await;

        let doc = h.doc();
        for user in [ADMIN, OWNER, MEMBER] {
            assert_eq!(doc.points(&user.member_id()), 16);
        }
        let project = doc.project("Apollo").expect("project missing");
        assert_eq!(project.progress_percent(), 33);
        assert_eq!(project.tasks()[0].completed_by(), Some(MEMBER.member_id().as_str()));
        assert!(contains(&h.channel_texts(), "🎉 Task Completed!"));
    }

    #[tokio::test]
    async fn completion_needs_an_assigned_task() {
        let h = setup();
        h.seed("Apollo", &[("Build rocket", 50, 3)]);

        h.send(say(MEMBER, "!completed project Apollo")).await;

        assert!(contains(&h.channel_texts(), "❌ No Assigned Tasks"));
    }

    #[tokio::test]
    async fn exit_cancels_the_selection() {
        let h = setup();
        h.seed("Apollo", &[("Build rocket", 50, 3)]);
        h.in_channel(MEMBER, "!project Apollo assign", &["exit"]).await;

        assert!(h.doc().project("Apollo").expect("project missing").members().is_empty());
        assert!(contains(&h.channel_texts(), "❌ Task assignment cancelled."));
    }

    #[tokio::test]
    async fn views_report_unknown_projects() {
        let h = setup();
        h.send(say(MEMBER, "!project Gemini dashboard")).await;

        assert!(contains(&h.channel_texts(), "❌ Project Not Found"));
    }

    #[tokio::test]
    async fn progress_view_shows_the_percentage() {
        let h = setup();
        h.seed("Apollo", &[("Build rocket", 50, 3)]);
        h.send(say(MEMBER, "!project Apollo progress")).await;

        assert!(contains(&h.channel_texts(), "📈 Apollo Progress"));
    }
}

mod edit_and_delete {
    use super::*;

    #[tokio::test]
    async fn edits_the_description() {
        let h = setup();
        h.seed("Apollo", &[("Build rocket", 50, 3)]);
        h.in_dm(ADMIN, "!edit project Apollo", &["1", "A new description"])
            .await;

        assert_eq!(
            h.doc().project("Apollo").expect("project missing").description(),
            "A new description"
        );
        assert!(contains(&h.dm_texts(ADMIN), "✅ Project updated successfully!"));
    }

    #[tokio::test]
    async fn timeout_keeps_the_old_description() {
        let h = setup_with(platform(), FlowTimeouts::uniform(Duration::from_millis(250)));
        h.seed("Apollo", &[("Build rocket", 50, 3)]);
        h.in_dm(ADMIN, "!edit project Apollo", &["1"]).await;

        assert_eq!(
            h.doc().project("Apollo").expect("project missing").description(),
            "Seeded"
        );
        assert!(contains(&h.dm_texts(ADMIN), "⏰ Timeout! Project editing cancelled."));
    }

    #[tokio::test]
    async fn an_assignment_made_during_an_edit_survives_its_commit() {
        let h = setup();
        h.seed("Apollo", &[("Build rocket", 50, 3)]);
        let edit = h
            .start(say(ADMIN, "!edit project Apollo"), &ConversationKey::direct(ADMIN))
            .await;
        h.send(dm(ADMIN, "1")).await;

        h.in_channel(MEMBER, "!project Apollo assign", &["1"]).await;
        h.send(dm(ADMIN, "New words")).await;
        Harness::finish(edit).await;

        let doc = h.doc();
        let project = doc.project("Apollo").expect("project missing");
        assert_eq!(project.description(), "New words");
        assert_eq!(project.tasks()[0].assigned_members(), [MEMBER.member_id()]);
        assert!(project.members().contains(&MEMBER.member_id()));
    }

    #[tokio::test]
    async fn adds_a_task_from_the_task_menu() {
        let h = setup();
        h.seed("Apollo", &[("Build rocket", 50, 3)]);
        h.in_dm(ADMIN, "!edit project Apollo", &["2", "4", "1", "Write docs 30 1"])
            .await;

        let doc = h.doc();
        let tasks = doc.project("Apollo").expect("project missing").tasks();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1].description(), "Write docs");
    }

    #[tokio::test]
    async fn refuses_completed_status_with_open_tasks() {
        let h = setup();
        h.seed("Apollo", &[("Build rocket", 50, 3)]);
        h.in_dm(ADMIN, "!edit project Apollo", &["3", "Completed", "On Hold"])
            .await;

        let doc = h.doc();
        assert_eq!(doc.project("Apollo").expect("project missing").status(), ProjectStatus::OnHold);
        assert!(contains(&h.dm_texts(ADMIN), "only be marked Completed"));
    }

    #[tokio::test]
    async fn edit_with_no_projects_says_so() {
        let h = setup();
        h.send(say(ADMIN, "!edit project Apollo")).await;

        assert!(contains(&h.channel_texts(), "❌ No Projects Found"));
    }

    #[tokio::test]
    async fn deletes_the_project_and_its_thread() {
        let h = setup();
        h.seed("Apollo", &[("Build rocket", 50, 3)]);
        h.platform
            .seed_thread(DEFAULT_FORUM_CHANNEL, &thread_name("Apollo"))
            .expect("seed thread failed");

        h.in_dm(ADMIN, "!delete project Apollo", &["DELETE"]).await;

        assert!(h.doc().projects.is_empty());
        assert!(h.platform.threads().is_empty());
        assert!(contains(&h.dm_texts(ADMIN), "✅ Project Deleted Successfully!"));
    }

    #[tokio::test]
    async fn deletes_the_project_even_when_the_thread_cannot_be_removed() {
        let h = setup();
        h.seed("Apollo", &[("Build rocket", 50, 3)]);
        h.platform
            .seed_thread(DEFAULT_FORUM_CHANNEL, &thread_name("Apollo"))
            .expect("seed thread failed");
        h.platform.set_fail_threads(true);

        h.in_dm(ADMIN, "!delete project Apollo", &["DELETE"]).await;

        assert!(h.doc().projects.is_empty());
        assert_eq!(h.platform.threads().len(), 1);
        let dms = h.dm_texts(ADMIN);
        assert!(contains(&dms, "✅ Project Deleted Successfully!"));
        let warning = h
            .platform
            .sent_to(Destination::Direct(ADMIN))
            .into_iter()
            .find_map(|r| match r {
                Reply::Embed(e) if e.title == "⚠️ Forum Post Error" => Some(e),
                _ => None,
            })
            .expect("no mirror warning sent");
        assert_eq!(
            warning.field_value("Error"),
            Some("I don't have permission to view threads!")
        );
    }

    #[tokio::test]
    async fn anything_but_the_exact_token_keeps_the_project() {
        let h = setup();
        h.seed("Apollo", &[("Build rocket", 50, 3)]);
        h.in_dm(ADMIN, "!delete project Apollo", &["delete"]).await;

        assert!(h.doc().project("Apollo").is_some());
        assert!(contains(&h.dm_texts(ADMIN), "❌ Deletion cancelled."));
    }

    #[tokio::test]
    async fn members_cannot_delete() {
        let h = setup();
        h.seed("Apollo", &[("Build rocket", 50, 3)]);
        h.send(say(MEMBER, "!delete project Apollo")).await;

        assert!(h.doc().project("Apollo").is_some());
        assert!(contains(&h.channel_texts(), "You don't have permission to delete projects"));
    }
}

mod roles_and_nicknames {
    use super::*;

    #[tokio::test]
    async fn lists_only_assignable_roles() {
        let h = setup();
        h.send(say(MEMBER, "!roles")).await;

        let sent = h.platform.sent_to(Destination::Channel(CHANNEL));
        let Some(Reply::Embed(embed)) = sent.last() else {
            panic!("expected an embed, got {:?}", sent);
        };
        let roles = embed.field_value("Roles").expect("roles field missing");
        assert!(roles.contains("Developer"));
        assert!(!roles.contains("Helper Bot"));
    }

    #[tokio::test]
    async fn assigns_and_removes_a_role() {
        let h = setup();
        h.send(say(MEMBER, "!role assign Developer")).await;

        assert!(h.platform.member_role_names(MEMBER).contains("Developer"));
        assert_eq!(
            h.doc().user_roles.get(&MEMBER.member_id()).map(String::as_str),
            Some("Developer")
        );

        let mut remove = say(MEMBER, "!role remove Developer");
        remove.roles.insert("Developer".to_string());
        h.send(remove).await;

        assert!(h.platform.member_role_names(MEMBER).is_empty());
        assert!(h.doc().user_roles.is_empty());
        assert!(contains(&h.channel_texts(), "✅ Role Removed!"));
    }

    #[tokio::test]
    async fn refuses_roles_already_held() {
        let h = setup();
        let mut msg = say(MEMBER, "!role assign Developer");
        msg.roles.insert("Developer".to_string());
        h.send(msg).await;

        assert!(contains(&h.channel_texts(), "❌ You already have the role 'Developer'!"));
    }

    #[tokio::test]
    async fn reports_unknown_and_forbidden_roles() {
        let h = setup_with(
            platform().deny_role_changes(),
            FlowTimeouts::uniform(Duration::from_secs(5)),
        );
        h.send(say(MEMBER, "!role assign Astronaut")).await;
        h.send(say(MEMBER, "!role assign Developer")).await;

        let texts = h.channel_texts();
        assert!(contains(&texts, "❌ Role 'Astronaut' not found!"));
        assert!(contains(&texts, "❌ I don't have permission to manage roles!"));
        assert!(h.doc().user_roles.is_empty());
    }

    #[tokio::test]
    async fn sets_a_nickname() {
        let h = setup();
        h.send(say(MEMBER, "!nickname John Backend Developer")).await;

        assert_eq!(
            h.platform.nickname(MEMBER).as_deref(),
            Some("John | Backend Developer")
        );
        assert!(contains(&h.channel_texts(), "✅ Nickname Updated!"));
    }

    #[tokio::test]
    async fn greets_new_members() {
        let h = setup();
        h.bot.member_joined(GUILD, MEMBER, "newbie").await;

        assert!(h.platform.member_role_names(MEMBER).contains("Member"));
        let general = h.platform.sent().into_iter().find(|(_, r)| r.summary() == "🎉 Welcome to the Server!");
        assert!(general.is_some());
    }
}

mod settings {
    use super::*;

    #[tokio::test]
    async fn shop_add_needs_shop_permission() {
        let h = setup();
        h.send(say(MEMBER, "!shop add Sticker Pack 40")).await;
        assert!(!h.doc().shop_items.contains_key("Sticker Pack"));

        h.send(say(ADMIN, "!shop add Sticker Pack 40")).await;
        assert_eq!(h.doc().shop_items.get("Sticker Pack"), Some(&40));
        assert!(contains(&h.channel_texts(), "✅ Shop Item Added!"));
    }

    #[tokio::test]
    async fn rewards_show_the_member_balance() {
        let h = setup();
        h.bot
            .store()
            .update(|doc| {
                doc.user_points.insert(MEMBER.member_id(), 42);
                Ok::<_, crewmate::Error>(())
            })
            .expect("update failed");

        h.send(say(MEMBER, "!rewards")).await;

        let sent = h.platform.sent_to(Destination::Channel(CHANNEL));
        let Some(Reply::Embed(embed)) = sent.last() else {
            panic!("expected an embed, got {:?}", sent);
        };
        assert!(embed.description.as_deref().unwrap_or_default().contains("42"));
    }

    #[tokio::test]
    async fn forum_channel_must_be_a_forum() {
        let h = setup();
        h.send(say(ADMIN, "!forums general")).await;
        assert_eq!(h.doc().forum_channel_name, DEFAULT_FORUM_CHANNEL);
        assert!(contains(&h.channel_texts(), "❌ Invalid Channel Type"));

        h.send(say(ADMIN, "!forums nowhere")).await;
        assert!(contains(&h.channel_texts(), "❌ Channel Not Found"));
    }

    #[tokio::test]
    async fn forum_channel_can_be_changed() {
        let h = setup_with(
            platform().with_forum("launch-log"),
            FlowTimeouts::uniform(Duration::from_secs(5)),
        );
        h.send(say(ADMIN, "!forums launch-log")).await;

        assert_eq!(h.doc().forum_channel_name, "launch-log");
        assert!(contains(&h.channel_texts(), "✅ Forum Channel Updated!"));
    }

    #[tokio::test]
    async fn only_the_owner_configures_permissions() {
        let h = setup();
        h.send(say(ADMIN, "!perm add Developer")).await;
        assert!(contains(&h.channel_texts(), "Only the server owner can configure permissions!"));

        h.send(say(OWNER, "!perm add Developer")).await;
        let developer: BTreeSet<String> = ["Developer".to_string()].into_iter().collect();
        let doc = h.doc();
        assert!(doc
            .permissions
            .has_permission(&developer, crewmate::permissions::PermissionCategory::ShopManagement));
        assert!(contains(&h.channel_texts(), "✅ Permissions Granted!"));

        h.send(say(OWNER, "!perm remove Developer")).await;
        assert!(h.doc().permissions.categories_for("Developer").is_empty());
    }

    #[tokio::test]
    async fn granted_roles_can_create_projects() {
        let h = setup();
        h.send(say(OWNER, "!perm add Developer")).await;

        let mut command = say(MEMBER, "!new project");
        command.roles.insert("Developer".to_string());
        let replies: Vec<Incoming> = ["Apollo", "Moon", "Build 10 1", "done"]
            .iter()
            .map(|r| dm(MEMBER, r))
            .collect();
        h.converse(command, ConversationKey::direct(MEMBER), &replies).await;

        assert!(h.doc().project("Apollo").is_some());
    }

    #[tokio::test]
    async fn unknown_commands_get_suggestions() {
        let h = setup();
        h.send(say(MEMBER, "!projct")).await;

        assert!(contains(&h.channel_texts(), "❌ Command Not Found"));
    }

    #[tokio::test]
    async fn messages_without_the_prefix_are_ignored() {
        let h = setup();
        h.send(say(MEMBER, "hello there")).await;

        assert!(h.platform.sent().is_empty());
    }
}
