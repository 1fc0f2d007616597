//! Chat command grammar.
//!
//! Command names are case-sensitive; sub-actions such as `assign` or `add`
//! are not. Project names may contain spaces: for `project` the action is the
//! last word and the name is everything before it.

pub const MAX_ITEM_NAME_LEN: usize = 50;
pub const MAX_CHANNEL_NAME_LEN: usize = 100;

pub const COMMAND_NAMES: [&str; 14] = [
    "commands",
    "roles",
    "role",
    "nickname",
    "projects",
    "project",
    "rewards",
    "shop",
    "new",
    "edit",
    "delete",
    "completed",
    "forums",
    "perm",
];

const MISSPELLINGS: [(&str, &str); 9] = [
    ("projct", "project"),
    ("projet", "project"),
    ("comand", "commands"),
    ("comands", "commands"),
    ("rol", "role"),
    ("rewads", "rewards"),
    ("reard", "rewards"),
    ("shp", "shop"),
    ("shopp", "shop"),
];

const MAX_SUGGESTIONS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleAction {
    Assign,
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectAction {
    Dashboard,
    Details,
    Progress,
    Assign,
}

impl ProjectAction {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "dashboard" => Some(Self::Dashboard),
            "details" => Some(Self::Details),
            "progress" => Some(Self::Progress),
            "assign" => Some(Self::Assign),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermAction {
    Add,
    Remove,
    View,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Roles,
    Role { action: RoleAction, role: String },
    Nickname { name: String, profession: String },
    Projects,
    Project { name: String, action: ProjectAction },
    NewProject,
    EditProject(String),
    DeleteProject(String),
    CompleteTask(String),
    Rewards,
    Shop,
    ShopAdd { item: String, price: u64 },
    Forums(Option<String>),
    Perm { action: PermAction, role: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    /// Known command, bad arguments. The message is shown to the user.
    Invalid(String),
    /// No command by that name.
    Unknown(String),
}

fn invalid(msg: impl Into<String>) -> UsageError {
    UsageError::Invalid(msg.into())
}

/// Parse a message. `None` when it is not addressed to the bot.
pub fn parse(content: &str, prefix: &str) -> Option<Result<Command, UsageError>> {
    let body = content.trim().strip_prefix(prefix)?;
    let mut split = body.splitn(2, char::is_whitespace);
    let name = split.next().filter(|n| !n.is_empty())?;
    let rest = split.next().map(str::trim).unwrap_or("");
    let words: Vec<&str> = rest.split_whitespace().collect();
    let p = prefix;

    let parsed = match name {
        "commands" => Ok(Command::Help),
        "roles" => Ok(Command::Roles),
        "role" => parse_role(&words, p),
        "nickname" => parse_nickname(&words, p),
        "projects" => Ok(Command::Projects),
        "project" => parse_project(&words, p),
        "new" => match words.first() {
            Some(w) if w.eq_ignore_ascii_case("project") => Ok(Command::NewProject),
            _ => Err(invalid(format!(
                "Invalid command. Use `{p}new project` to create a new project."
            ))),
        },
        "edit" => {
            parse_named_project(&words, p, "edit", "to edit a project").map(Command::EditProject)
        }
        "delete" => parse_named_project(&words, p, "delete", "to delete a project")
            .map(Command::DeleteProject),
        "completed" => {
            parse_named_project(&words, p, "completed", "to mark a task as completed")
                .map(Command::CompleteTask)
        }
        "rewards" => Ok(Command::Rewards),
        "shop" => parse_shop(&words, p),
        "forums" => parse_forums(rest),
        "perm" => parse_perm(&words, p),
        other => Err(UsageError::Unknown(other.to_string())),
    };
    Some(parsed)
}

fn parse_role(words: &[&str], p: &str) -> Result<Command, UsageError> {
    let action = match words.first().map(|w| w.to_lowercase()).as_deref() {
        Some("assign") => RoleAction::Assign,
        Some("remove") => RoleAction::Remove,
        _ => {
            return Err(invalid(format!(
                "Invalid action. Use `{p}role assign <role_name>` or `{p}role remove <role_name>`"
            )))
        }
    };
    let role = words[1..].join(" ");
    if role.is_empty() {
        return Err(invalid("Please specify a role name!"));
    }
    Ok(Command::Role { action, role })
}

fn parse_nickname(words: &[&str], p: &str) -> Result<Command, UsageError> {
    let usage = format!("Usage: `{p}nickname <name> <profession>`");
    let Some(name) = words.first() else {
        return Err(invalid(format!("Please provide your name! {usage}")));
    };
    let profession = words[1..].join(" ");
    if profession.is_empty() {
        return Err(invalid(format!("Please provide your profession! {usage}")));
    }
    Ok(Command::Nickname {
        name: name.to_string(),
        profession,
    })
}

fn parse_project(words: &[&str], p: &str) -> Result<Command, UsageError> {
    let usage = format!("Usage: `{p}project <name> <action>`");
    match words.len() {
        0 => {
            return Err(invalid(format!(
                "Please specify a project name and action! {usage}"
            )))
        }
        1 => {
            return Err(invalid(format!(
                "Please specify both project name and action! {usage}"
            )))
        }
        _ => {}
    }

    let (action, name) = words
        .split_last()
        .map(|(a, n)| (a.to_lowercase(), n.join(" ")))
        .unwrap_or_default();
    if name.chars().count() > crate::ledger::MAX_PROJECT_NAME_LEN {
        return Err(invalid("Project name is too long! Please use a shorter name."));
    }
    let action = ProjectAction::from_str(&action).ok_or_else(|| {
        invalid("Invalid action. Use: dashboard, details, progress, or assign")
    })?;
    Ok(Command::Project { name, action })
}

/// `<verb> project <name>`
fn parse_named_project(
    words: &[&str],
    p: &str,
    verb: &str,
    purpose: &str,
) -> Result<String, UsageError> {
    let usage = format!("`{p}{verb} project <name>`");
    match words.first() {
        Some(w) if w.eq_ignore_ascii_case("project") => {}
        Some(_) => return Err(invalid(format!("Invalid command. Use {usage} {purpose}."))),
        None => return Err(invalid(format!("Please specify project name! Usage: {usage}"))),
    }
    let name = words[1..].join(" ");
    if name.is_empty() {
        return Err(invalid(format!("Please specify a project name! Usage: {usage}")));
    }
    Ok(name)
}

fn parse_shop(words: &[&str], p: &str) -> Result<Command, UsageError> {
    let Some(action) = words.first() else {
        return Ok(Command::Shop);
    };
    if !action.eq_ignore_ascii_case("add") {
        return Err(invalid(format!(
            "Invalid shop action. Use `{p}shop` to view items or `{p}shop add <item> <price>` to add items."
        )));
    }

    let info = words[1..].join(" ");
    if info.is_empty() {
        return Err(invalid(format!(
            "Please specify an item and price! Usage: `{p}shop add <item> <price>`"
        )));
    }
    let Some((item, price)) = info.rsplit_once(' ') else {
        return Err(invalid(format!(
            "Invalid format! Use: `{p}shop add <item name> <price>`"
        )));
    };
    let price: i64 = price.parse().map_err(|_| {
        invalid(format!(
            "Invalid price! Price must be a number. Usage: `{p}shop add <item name> <price>`"
        ))
    })?;
    if price <= 0 {
        return Err(invalid("Price must be a positive number!"));
    }
    let item = item.trim();
    if item.chars().count() > MAX_ITEM_NAME_LEN {
        return Err(invalid(format!(
            "Item name is too long! Please use a shorter name (max {} characters).",
            MAX_ITEM_NAME_LEN
        )));
    }
    Ok(Command::ShopAdd {
        item: item.to_string(),
        price: price as u64,
    })
}

fn parse_forums(rest: &str) -> Result<Command, UsageError> {
    if rest.is_empty() {
        return Ok(Command::Forums(None));
    }
    if rest.chars().count() > MAX_CHANNEL_NAME_LEN {
        return Err(invalid(format!(
            "Channel name is too long! Please use a shorter name (max {} characters).",
            MAX_CHANNEL_NAME_LEN
        )));
    }
    Ok(Command::Forums(Some(rest.to_string())))
}

fn parse_perm(words: &[&str], p: &str) -> Result<Command, UsageError> {
    let Some(action) = words.first() else {
        return Err(invalid(format!(
            "Please specify an action! Usage: `{p}perm <action> <role>`\nActions: `add`, `remove`, `view`"
        )));
    };
    let role = words[1..].join(" ");
    if role.is_empty() {
        return Err(invalid(format!(
            "Please specify a role name! Usage: `{p}perm <action> <role_name>`"
        )));
    }
    let action = match action.to_lowercase().as_str() {
        "add" => PermAction::Add,
        "remove" => PermAction::Remove,
        "view" => PermAction::View,
        _ => {
            return Err(invalid(
                "Invalid action! Available actions: `add`, `remove`, `view`",
            ))
        }
    };
    Ok(Command::Perm { action, role })
}

/// Commands close to `partial`, for "did you mean" replies.
pub fn suggestions(partial: &str) -> Vec<&'static str> {
    let partial = partial.to_lowercase();
    let mut out: Vec<&'static str> = Vec::new();
    let mut push = |cmd: &'static str| {
        if !out.contains(&cmd) {
            out.push(cmd);
        }
    };

    for cmd in COMMAND_NAMES {
        if cmd.contains(partial.as_str()) {
            push(cmd);
        }
    }
    for (typo, cmd) in MISSPELLINGS {
        if typo == partial {
            push(cmd);
        }
    }
    out.truncate(MAX_SUGGESTIONS);
    out
}
