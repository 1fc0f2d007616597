//! Platform-neutral embeds for every reply the bot sends.
//!
//! Builders here are pure: they take model data and return an [`Embed`].
//! Field values are cut at 1024 characters and descriptions at 2000, the
//! limits the chat platform enforces.

use serde::Serialize;

use crate::mirror::MirrorFailure;
use crate::models::{Project, ProjectStatus, RewardDistribution, Task};
use crate::permissions::{PermissionCategory, PermissionTable};

pub const SUCCESS: u32 = 0x00ff00;
pub const INFO: u32 = 0x0099ff;
pub const ERROR: u32 = 0xff6b6b;
pub const WARNING: u32 = 0xff9900;
pub const GOLD: u32 = 0xffd700;

pub const MAX_FIELD_NAME: usize = 256;
pub const MAX_FIELD_VALUE: usize = 1024;
pub const MAX_DESCRIPTION: usize = 2000;

const PROGRESS_BAR_WIDTH: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: Option<String>,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    pub footer: Option<String>,
}

impl Embed {
    pub fn new(title: impl Into<String>, color: u32) -> Self {
        Self {
            title: title.into(),
            description: None,
            color,
            fields: Vec::new(),
            footer: None,
        }
    }

    pub fn description(mut self, description: impl AsRef<str>) -> Self {
        self.description = Some(truncate(description.as_ref(), MAX_DESCRIPTION));
        self
    }

    pub fn field(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.push_field(name.as_ref(), value.as_ref(), false);
        self
    }

    pub fn inline(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.push_field(name.as_ref(), value.as_ref(), true);
        self
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    fn push_field(&mut self, name: &str, value: &str, inline: bool) {
        // Empty values are rejected by the platform.
        let value = if value.trim().is_empty() { "-" } else { value };
        self.fields.push(EmbedField {
            name: truncate(name, MAX_FIELD_NAME),
            value: truncate(value, MAX_FIELD_VALUE),
            inline,
        });
    }

    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

/// Cut `s` to at most `max` characters.
pub fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

pub fn mention(member: &str) -> String {
    format!("<@{}>", member)
}

fn bullet_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| format!("• {}", s.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn progress_bar(percent: u8) -> String {
    let filled = (percent.min(100) as usize * PROGRESS_BAR_WIDTH) / 100;
    format!(
        "{}{}",
        "█".repeat(filled),
        "░".repeat(PROGRESS_BAR_WIDTH - filled)
    )
}

// ============================================================
// Task lines
// ============================================================

fn members_count(task: &Task) -> String {
    format!("{}/{}", task.assigned_members().len(), task.max_members())
}

/// `3. **Fix login** (Reward: 50 points, Members: 1/2)`
pub fn available_task_line(index: usize, task: &Task) -> String {
    format!(
        "{}. **{}** (Reward: {} points, Members: {})",
        index + 1,
        task.description(),
        task.reward_points(),
        members_count(task)
    )
}

pub fn assigned_task_line(index: usize, task: &Task) -> String {
    format!(
        "{}. **{}** (Reward: {} points)",
        index + 1,
        task.description(),
        task.reward_points()
    )
}

/// Plain listing used inside the edit flow.
pub fn task_listing(project: &Project) -> String {
    if project.tasks().is_empty() {
        return "📝 This project has no tasks yet.".to_string();
    }
    let lines: Vec<String> = project
        .tasks()
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let done = if t.is_completed() { " ✅" } else { "" };
            format!(
                "{}. {} (Reward: {} points, Members: {}){}",
                i + 1,
                t.description(),
                t.reward_points(),
                members_count(t),
                done
            )
        })
        .collect();
    format!("📝 **Current tasks:**\n{}", lines.join("\n"))
}

fn mirror_task_lines(project: &Project) -> String {
    project
        .tasks()
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let emoji = if t.is_completed() { "✅" } else { "⏳" };
            format!(
                "{}. {} **{}**\n   • Reward: {} points\n   • Members: {}\n",
                i + 1,
                emoji,
                t.description(),
                t.reward_points(),
                members_count(t)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn members_line(project: &Project) -> String {
    project
        .members()
        .iter()
        .map(|m| mention(m))
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================
// General
// ============================================================

pub fn error(message: impl AsRef<str>) -> String {
    format!("❌ {}", message.as_ref())
}

pub fn generic_error(message: impl std::fmt::Display) -> String {
    format!("❌ An error occurred: {}", message)
}

pub fn help(p: &str, project_names: &[String]) -> Embed {
    let commands: [(String, &str); 20] = [
        (format!("{p}commands"), "Shows this help message with command syntax"),
        (format!("{p}roles"), "Shows all available roles in the server that you can assign to yourself"),
        (format!("{p}role assign <role_name>"), "Assigns a role to yourself"),
        (format!("{p}role remove <role_name>"), "Removes a role from yourself"),
        (format!("{p}nickname <name> <profession>"), "Changes your nickname to include your name and profession"),
        (format!("{p}projects"), "Shows all ongoing projects in the server"),
        (format!("{p}project <name> dashboard"), "Shows the dashboard for a specific project"),
        (format!("{p}project <name> details"), "Shows detailed information about a project"),
        (format!("{p}project <name> progress"), "Shows a progress bar for a project"),
        (format!("{p}project <name> assign"), "Lists available tasks and lets you pick one by number"),
        (format!("{p}forums <channel>"), "Configures the forum channel for project posts"),
        (format!("{p}new project"), "Creates a new project with predefined tasks"),
        (format!("{p}edit project <name>"), "Edits an existing project"),
        (format!("{p}delete project <name>"), "Deletes a project"),
        (format!("{p}completed project <name>"), "Lists your assigned tasks and marks the one you pick as completed"),
        (format!("{p}rewards"), "Shows your current points and the reward catalog"),
        (format!("{p}shop"), "Shows items you can purchase with your earned points"),
        (format!("{p}shop add <item> <price>"), "Adds a new item to the shop"),
        (format!("{p}perm <add|remove> <role>"), "Grants or removes all permissions for a role (Server Owner only)"),
        (format!("{p}perm view <role>"), "Shows current permissions for a role (Server Owner only)"),
    ];

    let mut embed = Embed::new("🤖 Project Management Bot Commands", SUCCESS)
        .description("Here are all the available commands with their syntax:");
    for (cmd, desc) in &commands {
        embed = embed.field(format!("📝 {}", cmd), desc);
    }
    embed = embed.field(
        "💡 Tips",
        "• Project names are case-sensitive\n• Tasks can contain spaces and special characters\n• Nicknames are limited to 32 characters\n• Type `cancel` or `exit` to leave any interactive step",
    );
    if let Some(first) = project_names.first() {
        embed = embed.field(
            "🚀 Quick Start Examples",
            format!(
                "Try these commands:\n• `{p}project {first} dashboard`\n• `{p}project {first} assign`\n• `{p}completed project {first}`"
            ),
        );
    }
    embed.footer("Use these commands to manage your projects effectively!")
}

pub fn command_not_found(p: &str, content: &str, suggestions: &[&str]) -> Embed {
    let mut embed = Embed::new("❌ Command Not Found", ERROR)
        .description(format!("Command `{}` not found.", content));
    if !suggestions.is_empty() {
        embed = embed.field(
            "💡 Did you mean?",
            suggestions
                .iter()
                .map(|s| format!("• `{p}{s}`"))
                .collect::<Vec<_>>()
                .join("\n"),
        );
    }
    embed.field("📚 Help", format!("Use `{p}commands` to see all available commands."))
}

pub fn welcome(p: &str, member: &str, role_assigned: bool) -> Embed {
    let mut embed = Embed::new("🎉 Welcome to the Server!", SUCCESS).description(format!(
        "Hello {}! Welcome to our project management community!",
        mention(member)
    ));
    if role_assigned {
        embed = embed.field(
            "✅ Role Assigned",
            "You have been automatically assigned the **Member** role!",
        );
    }
    embed
        .field(
            "🚀 Getting Started",
            format!(
                "• Use `{p}commands` to see all available commands\n• Use `{p}roles` to see available roles\n• Use `{p}nickname <name> <profession>` to set your nickname\n• Join a project with `{p}project <name> assign`"
            ),
        )
        .footer("Enjoy your time in our community!")
}

// ============================================================
// Roles and nicknames
// ============================================================

pub fn roles_list(p: &str, roles: &[String]) -> Embed {
    const SHOWN: usize = 25;
    let value = if roles.is_empty() {
        "No assignable roles available".to_string()
    } else {
        let mut text = bullet_list(roles.iter().take(SHOWN));
        if roles.len() > SHOWN {
            text.push_str(&format!("\n... and {} more roles", roles.len() - SHOWN));
        }
        text
    };
    Embed::new("🏷️ Available Roles", INFO)
        .description("Roles you can assign to yourself:")
        .field("Roles", value)
        .field(
            "How to assign",
            format!("Use `{p}role assign <role_name>` to assign a role to yourself"),
        )
}

pub fn role_assigned(role: &str) -> Embed {
    Embed::new("✅ Role Assigned!", SUCCESS)
        .description(format!("You have been assigned the role: **{}**", role))
}

pub fn role_removed(role: &str) -> Embed {
    Embed::new("✅ Role Removed!", ERROR)
        .description(format!("The role **{}** has been removed from you", role))
}

pub fn nickname_updated(nickname: &str, name: &str, profession: &str) -> Embed {
    Embed::new("✅ Nickname Updated!", SUCCESS)
        .description(format!("Your nickname has been changed to: **{}**", nickname))
        .inline("Name", name)
        .inline("Profession", profession)
}

// ============================================================
// Projects
// ============================================================

pub fn projects_overview<'a>(p: &str, projects: impl IntoIterator<Item = &'a Project>) -> Embed {
    let projects: Vec<&Project> = projects.into_iter().collect();
    if projects.is_empty() {
        return Embed::new("📋 Projects", WARNING)
            .description(format!(
                "No projects found. Create a project using `{p}new project`!"
            ))
            .field(
                "How to create a project",
                format!("Use `{p}new project` to create a new project with tasks and rewards."),
            );
    }

    let mut embed = Embed::new("📋 Ongoing Projects", INFO).description("Here are all the projects:");
    for project in projects {
        embed = embed.inline(
            format!("📁 {}", project.name()),
            format!(
                "Status: {}\nProgress: {}%\nTasks: {}",
                project.status(),
                project.progress_percent(),
                project.tasks().len()
            ),
        );
    }
    embed.field(
        "How to view details",
        format!("Use `{p}project <name> dashboard` to see project details"),
    )
}

pub fn project_not_found(p: &str, name: &str) -> Embed {
    Embed::new("❌ Project Not Found", ERROR)
        .description(format!("Project '{}' not found!", name))
        .field(
            "Available Projects",
            format!("Use `{p}projects` to see all available projects, or `{p}new project` to create a new one."),
        )
}

pub fn no_projects(p: &str, verb: &str) -> Embed {
    Embed::new("❌ No Projects Found", ERROR)
        .description(format!("There are no projects to {}.", verb))
        .field(
            "How to create a project",
            format!("Use `{p}new project` to create a new project first."),
        )
}

fn created_line(project: &Project) -> String {
    project.created_at().format("%Y-%m-%d %H:%M").to_string()
}

fn description_or_default(project: &Project) -> &str {
    if project.description().is_empty() {
        "No description available"
    } else {
        project.description()
    }
}

pub fn dashboard(project: &Project) -> Embed {
    const RECENT: usize = 5;
    let mut embed = Embed::new(format!("📊 {} Dashboard", project.name()), SUCCESS)
        .description(description_or_default(project))
        .inline("Status", project.status().as_str())
        .inline("Progress", format!("{}%", project.progress_percent()))
        .inline("Created", created_line(project));

    let tasks = project.tasks();
    if !tasks.is_empty() {
        let mut text = tasks
            .iter()
            .take(RECENT)
            .enumerate()
            .map(|(i, t)| available_task_line(i, t))
            .collect::<Vec<_>>()
            .join("\n");
        if tasks.len() > RECENT {
            text.push_str(&format!("\n... and {} more tasks", tasks.len() - RECENT));
        }
        embed = embed.field("Recent Tasks", text);
    }
    embed
}

pub fn details(project: &Project) -> Embed {
    let mut embed = Embed::new(format!("📋 {} Details", project.name()), INFO)
        .description(description_or_default(project))
        .inline("Status", project.status().as_str())
        .inline("Progress", format!("{}%", project.progress_percent()))
        .inline("Created", created_line(project))
        .inline("Created by", project.created_by());

    if !project.tasks().is_empty() {
        let text = project
            .tasks()
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let mark = if t.is_completed() { "✅" } else { "⏳" };
                format!("{} {}", mark, available_task_line(i, t))
            })
            .collect::<Vec<_>>()
            .join("\n");
        embed = embed.field("All Tasks", text);
    }
    if !project.members().is_empty() {
        embed = embed.field(
            "Team Members",
            bullet_list(project.members().iter().map(|m| mention(m))),
        );
    }
    embed
}

pub fn progress(project: &Project) -> Embed {
    let color = if project.status() == ProjectStatus::Completed {
        SUCCESS
    } else {
        INFO
    };
    Embed::new(format!("📈 {} Progress", project.name()), color)
        .description(format!(
            "`{}` {}%",
            progress_bar(project.progress_percent()),
            project.progress_percent()
        ))
        .inline(
            "Tasks Completed",
            format!("{}/{}", project.completed_task_count(), project.tasks().len()),
        )
        .inline("Status", project.status().as_str())
}

// ============================================================
// Assignment and completion
// ============================================================

pub fn pick_available_task(project: &Project, tasks: &[(usize, &Task)]) -> Embed {
    Embed::new(format!("📋 Available Tasks in {}", project.name()), INFO)
        .description("Select a task to assign yourself to by typing its number, or type 'exit' to cancel:")
        .field(
            "Available Tasks",
            tasks
                .iter()
                .map(|(i, t)| available_task_line(*i, t))
                .collect::<Vec<_>>()
                .join("\n"),
        )
        .field(
            "Instructions",
            "Type the number of the task you want to work on, or 'exit' to cancel.",
        )
}

pub fn pick_assigned_task(project: &Project, tasks: &[(usize, &Task)]) -> Embed {
    Embed::new(format!("📋 Your Tasks in {}", project.name()), INFO)
        .description("Select a task to mark as completed by typing its number, or type 'exit' to cancel:")
        .field(
            "Your Assigned Tasks",
            tasks
                .iter()
                .map(|(i, t)| assigned_task_line(*i, t))
                .collect::<Vec<_>>()
                .join("\n"),
        )
        .field(
            "Instructions",
            "Type the number of the task you want to complete, or 'exit' to cancel.",
        )
}

pub fn no_available_tasks(name: &str) -> Embed {
    Embed::new("❌ No Available Tasks", ERROR)
        .description(format!(
            "No tasks available for assignment in project '{}'.",
            name
        ))
        .field(
            "Reason",
            "All tasks are either completed, full, or already yours.",
        )
}

pub fn no_assigned_tasks(p: &str, project: &Project) -> Embed {
    let mut embed = Embed::new("❌ No Assigned Tasks", ERROR)
        .description(format!(
            "You don't have any incomplete tasks assigned in project '{}'.",
            project.name()
        ))
        .field(
            "How to get tasks",
            format!(
                "Use `{p}project {} assign` to assign yourself to tasks in this project.",
                project.name()
            ),
        );

    let open: Vec<String> = project
        .tasks()
        .iter()
        .enumerate()
        .filter(|(_, t)| !t.is_completed())
        .map(|(i, t)| available_task_line(i, t))
        .collect();
    if !open.is_empty() {
        let mut text = open.iter().take(5).cloned().collect::<Vec<_>>().join("\n");
        if open.len() > 5 {
            text.push_str("\n...");
        }
        embed = embed.field("Available Tasks to Assign", text);
    }
    embed
}

pub fn task_assigned(project: &Project, task: &Task, member: &str) -> Embed {
    Embed::new("✅ Task Assigned!", SUCCESS)
        .description(format!("Task assigned to project: **{}**", project.name()))
        .field("Task", task.description())
        .inline("Assigned to", mention(member))
        .inline("Reward", format!("{} points", task.reward_points()))
        .inline("Members", members_count(task))
        .inline("Project Progress", format!("{}%", project.progress_percent()))
}

pub fn task_completed(project: &Project, reward: &RewardDistribution, completer: &str) -> Embed {
    let mut embed = Embed::new("🎉 Task Completed!", SUCCESS)
        .description(format!(
            "Task **{}** has been completed in project **{}**!",
            reward.task_description,
            project.name()
        ))
        .field("Task", &reward.task_description)
        .inline("Completed by", mention(completer))
        .inline(
            "Team Members",
            reward
                .recipients
                .iter()
                .map(|m| mention(m))
                .collect::<Vec<_>>()
                .join(", "),
        )
        .inline("Reward per Member", format!("{} points", reward.reward_per_member))
        .inline("Total Reward", format!("{} points", reward.total_reward))
        .inline("Project Progress", format!("{}%", project.progress_percent()));

    if project.status() == ProjectStatus::Completed {
        embed = embed.field("🎊 Project Status", "**COMPLETED!** All tasks finished!");
    }
    embed
}

// ============================================================
// Interactive flow banners
// ============================================================

const PRIVACY: &str = "This conversation is private. Only you can see these messages.";

pub fn new_project_intro() -> Embed {
    Embed::new("🆕 New Project Creation", SUCCESS)
        .description("Let's create a new project! I'll ask you a few questions.")
        .field("Privacy Notice", PRIVACY)
}

pub fn edit_project_intro(name: &str) -> Embed {
    Embed::new("✏️ Edit Project", INFO)
        .description(format!("Let's edit the project: **{}**", name))
        .field("Privacy Notice", PRIVACY)
}

pub fn delete_project_intro(name: &str) -> Embed {
    Embed::new("🗑️ Delete Project", ERROR)
        .description(format!(
            "Are you sure you want to delete the project: **{}**?",
            name
        ))
        .field(
            "Warning",
            "This action cannot be undone! All project data will be permanently deleted.",
        )
        .field("Privacy Notice", PRIVACY)
}

pub fn project_created(project: &Project, forum: Option<&str>) -> Embed {
    let description = match forum {
        Some(_) => format!(
            "Project **{}** has been created and posted to the forum.",
            project.name()
        ),
        None => format!("Project **{}** has been created.", project.name()),
    };
    let mut embed = Embed::new("✅ Project Created Successfully!", SUCCESS)
        .description(description)
        .field("Description", description_or_default(project))
        .inline("Tasks", format!("{} tasks created", project.tasks().len()))
        .inline("Created by", project.created_by());
    if let Some(forum) = forum {
        embed = embed.inline("Forum Channel", forum);
    }
    embed
}

pub fn project_updated(name: &str, what: &str) -> Embed {
    Embed::new("✅ Project updated successfully!", SUCCESS)
        .description(format!("**{}**: {}", name, what))
}

pub fn project_deleted(name: &str, thread_deleted: bool, by: &str) -> Embed {
    let thread = if thread_deleted {
        "✅ Deleted from forum"
    } else {
        "⚠️ Could not delete (may not exist)"
    };
    Embed::new("✅ Project Deleted Successfully!", SUCCESS)
        .description(format!("Project **{}** has been permanently deleted.", name))
        .inline("Project Data", "✅ Removed from database")
        .inline("Forum Thread", thread)
        .inline("Deleted by", by)
}

// ============================================================
// Forum mirror
// ============================================================

/// The summary shown at the top of a project's forum thread.
pub fn forum_summary(p: &str, project: &Project) -> Embed {
    let color = if project.status() == ProjectStatus::Completed {
        SUCCESS
    } else {
        INFO
    };
    let mut embed = Embed::new(format!("📋 Project: {}", project.name()), color)
        .description(description_or_default(project))
        .inline("Status", project.status().as_str())
        .inline("Progress", format!("{}%", project.progress_percent()))
        .inline("Created by", project.created_by());

    if !project.tasks().is_empty() {
        embed = embed.field("📝 Tasks", mirror_task_lines(project));
    }
    if !project.members().is_empty() {
        embed = embed.field("👥 Team Members", members_line(project));
    }
    embed.field(
        "🎯 Next Steps",
        format!(
            "Use `{p}project {} assign` to assign yourself to tasks in this project!",
            project.name()
        ),
    )
}

fn forum_list(available: &[String]) -> String {
    const SHOWN: usize = 10;
    if available.is_empty() {
        return "No forum channels found in this server".to_string();
    }
    let mut text = bullet_list(available.iter().take(SHOWN));
    if available.len() > SHOWN {
        text.push_str(&format!("\n... and {} more", available.len() - SHOWN));
    }
    text
}

/// Warning attached next to a success reply when the mirror lags behind.
pub fn mirror_warning(p: &str, failure: &MirrorFailure) -> Embed {
    let fix = format!("Use `{p}forums <channel_name>` to configure the forum channel for project posts.");
    match failure {
        MirrorFailure::ChannelNotFound { name, available } => {
            Embed::new("⚠️ Forum Channel Not Found", WARNING)
                .description(format!("Could not find forum channel: '{}'", name))
                .field("How to fix", fix)
                .field("Available Forum Channels", forum_list(available))
                .field(
                    "Note",
                    "Make sure the channel name is exactly correct, including any emojis or special characters.",
                )
        }
        MirrorFailure::NotAForum { name, kind } => Embed::new("⚠️ Invalid Forum Channel", WARNING)
            .description(format!(
                "Configured channel '{}' is not a forum channel.",
                name
            ))
            .field(
                "Problem",
                format!(
                    "The configured channel '{}' is a {} channel, not a forum channel.",
                    name, kind
                ),
            )
            .field("How to fix", fix),
        MirrorFailure::NoGuild | MirrorFailure::Platform(_) => {
            Embed::new("⚠️ Forum Post Error", WARNING)
                .description("Your change was saved, but the forum post could not be updated.")
                .field("Error", failure.to_string())
                .field(
                    "Next Steps",
                    "The project is still functional. Check the bot's forum permissions or contact an administrator.",
                )
        }
    }
}

pub fn forum_status(p: &str, current: &str, status: Result<(), &MirrorFailure>) -> Embed {
    let status_text = match status {
        Ok(()) => "✅ Forum Channel Found",
        Err(MirrorFailure::NotAForum { .. }) => "⚠️ Channel Found (Not Forum)",
        Err(MirrorFailure::ChannelNotFound { .. }) => "❌ Not Found",
        Err(_) => "⚠️ Could not be checked",
    };
    Embed::new("📋 Forum Channel Configuration", INFO)
        .description("Current forum channel configuration:")
        .inline("Current Channel", current)
        .inline("Status", status_text)
        .field(
            "How to change",
            format!("Use `{p}forums <channel name>` to set a new forum channel"),
        )
}

pub fn forum_rejected(failure: &MirrorFailure) -> Embed {
    match failure {
        MirrorFailure::ChannelNotFound { name, available } => Embed::new("❌ Channel Not Found", ERROR)
            .description(format!("Could not find a channel named '{}'", name))
            .field("Available Forum Channels", forum_list(available)),
        MirrorFailure::NotAForum { name, kind } => Embed::new("❌ Invalid Channel Type", ERROR)
            .description(format!(
                "Channel '{}' is a {} channel, not a forum channel.",
                name, kind
            ))
            .field("How to fix", "Pick a forum channel for project posts."),
        other => Embed::new("❌ Channel Error", ERROR).description(other.to_string()),
    }
}

pub fn forum_updated(old: &str, new: &str, by: &str) -> Embed {
    Embed::new("✅ Forum Channel Updated!", SUCCESS)
        .description("The forum channel for project posts has been updated successfully.")
        .inline("Previous Channel", old)
        .inline("New Channel", new)
        .inline("Updated by", mention(by))
        .field(
            "Next Steps",
            "New projects will now be posted to this forum channel. Existing projects keep their current forum threads.",
        )
}

// ============================================================
// Points, shop, permissions
// ============================================================

pub fn rewards<'a>(points: u64, catalog: impl IntoIterator<Item = (&'a String, &'a u64)>) -> Embed {
    let mut embed = Embed::new("🏆 Your Rewards", GOLD)
        .description(format!("Current Points: **{}**", points))
        .field("Available Tasks", "Complete these tasks to earn points:");
    for (task, reward) in catalog {
        embed = embed.inline(task, format!("Reward: {} points", reward));
    }
    embed.field(
        "How to earn points",
        "Complete tasks and help with projects to earn points!",
    )
}

pub fn shop<'a>(points: u64, items: impl IntoIterator<Item = (&'a String, &'a u64)>) -> Embed {
    let mut embed = Embed::new("🛒 Points Shop", ERROR)
        .description(format!("Your current points: **{}**", points))
        .field("Available Items", "Items you can purchase with points:");
    for (item, cost) in items {
        let affordable = if points >= *cost { "✅" } else { "❌" };
        embed = embed.inline(format!("{} {}", affordable, item), format!("Cost: {} points", cost));
    }
    embed.field(
        "How to purchase",
        "Contact an administrator to purchase items with your points!",
    )
}

pub fn shop_item_added(item: &str, price: u64, by: &str) -> Embed {
    Embed::new("✅ Shop Item Added!", SUCCESS)
        .description("New item has been added to the shop.")
        .inline("Item", item)
        .inline("Price", format!("{} points", price))
        .inline("Added by", mention(by))
}

pub fn permission_view(p: &str, role: &str, table: &PermissionTable) -> Embed {
    let held = table.categories_for(role);
    let lines = PermissionCategory::ALL
        .iter()
        .map(|c| {
            let mark = if held.contains(c) { "✅" } else { "❌" };
            format!("{} {}", mark, c.label())
        })
        .collect::<Vec<_>>()
        .join("\n");
    Embed::new("🔐 Permission Configuration", INFO)
        .description(format!("Current permissions for role: **{}**", role))
        .field("Current Permissions", lines)
        .field(
            "How to configure",
            format!("Use `{p}perm add <role>` to grant all permissions\nUse `{p}perm remove <role>` to revoke all permissions"),
        )
}

fn category_words(category: &PermissionCategory) -> String {
    category.as_str().replace('_', " ")
}

pub fn permissions_granted(role: &str, granted: &[PermissionCategory], by: &str) -> Embed {
    let embed = if granted.is_empty() {
        Embed::new("ℹ️ No Changes Needed", INFO).description(format!(
            "Role **{}** already has all available permissions.",
            role
        ))
    } else {
        granted.iter().fold(
            Embed::new("✅ Permissions Granted!", SUCCESS)
                .description(format!("All permissions granted to role: **{}**", role)),
            |e, c| e.inline("Permission", format!("✅ Granted {} permission", category_words(c))),
        )
    };
    embed.inline("Updated by", mention(by))
}

pub fn permissions_removed(role: &str, removed: &[PermissionCategory], by: &str) -> Embed {
    let embed = if removed.is_empty() {
        Embed::new("ℹ️ No Changes Needed", INFO).description(format!(
            "Role **{}** doesn't have any permissions to remove.",
            role
        ))
    } else {
        removed.iter().fold(
            Embed::new("✅ Permissions Removed!", ERROR)
                .description(format!("All permissions removed from role: **{}**", role)),
            |e, c| e.inline("Permission", format!("❌ Removed {} permission", category_words(c))),
        )
    };
    embed.inline("Updated by", mention(by))
}
