use chrono::Utc;

use super::command::ProjectAction;
use super::Bot;
use crate::error::{Error, Result};
use crate::flow::{
    self, ConversationKey, CreateProject, DeleteProject, EditProject, FlowOutcome, SelectPurpose,
    SelectTask,
};
use crate::models::{Document, Project, ProjectEdit, TaskEdit};
use crate::permissions::PermissionCategory;
use crate::platform::{Destination, Incoming};
use crate::render;

fn project_gone(name: &str) -> Error {
    Error::not_found(format!("Project '{}' no longer exists!", name))
}

fn describe_edit(edit: &ProjectEdit) -> String {
    match edit {
        ProjectEdit::Description(_) => "Project description updated!".to_string(),
        ProjectEdit::AddTask(task) => format!("Task added: {}", task.description()),
        ProjectEdit::RemoveTask(index) => format!("Task {} removed!", index + 1),
        ProjectEdit::EditTask { index, edit } => {
            let what = match edit {
                TaskEdit::Description(_) => "description",
                TaskEdit::RewardPoints(_) => "reward points",
                TaskEdit::MaxMembers(_) => "number of members",
            };
            format!("Task {} {} updated!", index + 1, what)
        }
        ProjectEdit::Status(status) => format!("Project status set to {}!", status),
    }
}

impl Bot {
    // ============================================================
    // Read-only views
    // ============================================================

    pub(super) async fn help(&self, msg: &Incoming) -> Result<()> {
        let names: Vec<String> = self
            .store()
            .read(|doc| doc.projects.keys().take(3).cloned().collect());
        self.send(msg.reply_to(), render::help(self.prefix(), &names))
            .await
    }

    pub(super) async fn list_projects(&self, msg: &Incoming) -> Result<()> {
        let embed = self
            .store()
            .read(|doc| render::projects_overview(self.prefix(), doc.projects.values()));
        self.send(msg.reply_to(), embed).await
    }

    /// Snapshot of `name`, or a not-found reply.
    async fn find_project(&self, msg: &Incoming, name: &str) -> Result<Option<Project>> {
        match self.store().read(|doc| doc.project(name).cloned()) {
            Some(project) => Ok(Some(project)),
            None => {
                self.send(msg.reply_to(), render::project_not_found(self.prefix(), name))
                    .await?;
                Ok(None)
            }
        }
    }

    pub(super) async fn project(
        &self,
        msg: &Incoming,
        name: &str,
        action: ProjectAction,
    ) -> Result<()> {
        let Some(project) = self.find_project(msg, name).await? else {
            return Ok(());
        };
        let embed = match action {
            ProjectAction::Dashboard => render::dashboard(&project),
            ProjectAction::Details => render::details(&project),
            ProjectAction::Progress => render::progress(&project),
            ProjectAction::Assign => return self.assign_task(msg, project).await,
        };
        self.send(msg.reply_to(), embed).await
    }

    // ============================================================
    // Assignment and completion (in the invoking channel)
    // ============================================================

    async fn assign_task(&self, msg: &Incoming, project: Project) -> Result<()> {
        let member = msg.author.member_id();
        let to = msg.reply_to();

        let (choices, listing) = {
            let available = project.available_tasks(&member);
            let choices: Vec<usize> = available.iter().map(|(i, _)| *i).collect();
            (choices, render::pick_available_task(&project, &available))
        };
        if choices.is_empty() {
            return self.send(to, render::no_available_tasks(project.name())).await;
        }

        let mut inbox = self.open_conversation(ConversationKey::new(msg.author, to))?;
        let flow = SelectTask::new(SelectPurpose::Assign, listing, choices);
        let outcome = flow::drive(
            flow,
            &mut inbox,
            self.platform().as_ref(),
            to,
            msg.author,
            &self.config().timeouts,
        )
        .await?;
        drop(inbox);

        let FlowOutcome::Committed(index) = outcome else {
            return Ok(());
        };

        let name = project.name().to_string();
        let updated = self.store().update(|doc| {
            let project = doc.projects.get_mut(&name).ok_or_else(|| project_gone(&name))?;
            project.assign(index, &member)?;
            Ok::<_, Error>(project.clone())
        })?;
        tracing::info!(project = %name, task = index, member = %member, "Task assigned");

        let task = updated
            .task(index)
            .ok_or(crate::error::LedgerError::IndexError {
                index,
                len: updated.tasks().len(),
            })?;
        self.send(to, render::task_assigned(&updated, task, &member))
            .await?;
        self.sync_mirror(msg.guild, &name, to).await;
        Ok(())
    }

    pub(super) async fn complete_task(&self, msg: &Incoming, name: &str) -> Result<()> {
        let Some(project) = self.find_project(msg, name).await? else {
            return Ok(());
        };
        let member = msg.author.member_id();
        let to = msg.reply_to();

        let (choices, listing) = {
            let assigned = project.tasks_assigned_to(&member);
            let choices: Vec<usize> = assigned.iter().map(|(i, _)| *i).collect();
            (choices, render::pick_assigned_task(&project, &assigned))
        };
        if choices.is_empty() {
            return self
                .send(to, render::no_assigned_tasks(self.prefix(), &project))
                .await;
        }

        let mut inbox = self.open_conversation(ConversationKey::new(msg.author, to))?;
        let flow = SelectTask::new(SelectPurpose::Complete, listing, choices);
        let outcome = flow::drive(
            flow,
            &mut inbox,
            self.platform().as_ref(),
            to,
            msg.author,
            &self.config().timeouts,
        )
        .await?;
        drop(inbox);

        let FlowOutcome::Committed(index) = outcome else {
            return Ok(());
        };

        let (updated, reward) = self.store().update(|doc| {
            let Document {
                projects,
                user_points,
                ..
            } = doc;
            let project = projects.get_mut(name).ok_or_else(|| project_gone(name))?;
            let reward = project.complete(index, &member, user_points, Utc::now())?;
            Ok::<_, Error>((project.clone(), reward))
        })?;
        tracing::info!(
            project = %name,
            task = index,
            per_member = reward.reward_per_member,
            recipients = reward.recipients.len(),
            "Task completed"
        );

        self.send(to, render::task_completed(&updated, &reward, &member))
            .await?;
        self.sync_mirror(msg.guild, name, to).await;
        Ok(())
    }

    // ============================================================
    // Create / edit / delete (in the author's DMs)
    // ============================================================

    pub(super) async fn new_project(&self, msg: &Incoming) -> Result<()> {
        self.require(msg, PermissionCategory::ProjectManagement, "create projects")?;
        let dm = Destination::Direct(msg.author);
        let mut inbox = self.open_conversation(ConversationKey::direct(msg.author))?;
        self.hide_command(msg).await;

        if let Err(e) = self.create_in_dm(msg, &mut inbox).await {
            self.report(dm, &e).await;
        }
        Ok(())
    }

    async fn create_in_dm(&self, msg: &Incoming, inbox: &mut flow::Inbox) -> Result<()> {
        let dm = Destination::Direct(msg.author);
        self.send(dm, render::new_project_intro()).await?;

        // Warn early, but let the project be created regardless.
        let mirror = self.mirror(msg.guild);
        if let Err(failure) = mirror.locate().await {
            tracing::warn!("Forum channel check before creation failed: {}", failure);
            self.send(dm, render::mirror_warning(self.prefix(), &failure))
                .await?;
        }

        let existing = self
            .store()
            .read(|doc| doc.projects.keys().cloned().collect());
        let flow = CreateProject::new(msg.author_name.clone(), existing);
        let outcome = flow::drive(
            flow,
            inbox,
            self.platform().as_ref(),
            dm,
            msg.author,
            &self.config().timeouts,
        )
        .await?;

        let FlowOutcome::Committed(input) = outcome else {
            return Ok(());
        };

        let project = self.store().update(|doc| {
            if doc.projects.contains_key(input.name.trim()) {
                return Err(Error::validation(format!(
                    "A project named '{}' already exists!",
                    input.name.trim()
                )));
            }
            let project = Project::new(input)?;
            doc.projects
                .insert(project.name().to_string(), project.clone());
            Ok(project)
        })?;
        tracing::info!(
            project = project.name(),
            tasks = project.tasks().len(),
            by = %msg.author_name,
            "Project created"
        );

        let synced = self.sync_mirror(msg.guild, project.name(), dm).await;
        let forum = synced.map(|_| mirror.forum_name().to_string());
        self.send(dm, render::project_created(&project, forum.as_deref()))
            .await
    }

    pub(super) async fn edit_project(&self, msg: &Incoming, name: &str) -> Result<()> {
        self.require(msg, PermissionCategory::ProjectManagement, "edit projects")?;
        if self.store().read(|doc| doc.projects.is_empty()) {
            return self
                .send(msg.reply_to(), render::no_projects(self.prefix(), "edit"))
                .await;
        }
        let Some(project) = self.find_project(msg, name).await? else {
            return Ok(());
        };

        let dm = Destination::Direct(msg.author);
        let mut inbox = self.open_conversation(ConversationKey::direct(msg.author))?;
        self.hide_command(msg).await;

        if let Err(e) = self.edit_in_dm(msg, project, &mut inbox).await {
            self.report(dm, &e).await;
        }
        Ok(())
    }

    async fn edit_in_dm(
        &self,
        msg: &Incoming,
        project: Project,
        inbox: &mut flow::Inbox,
    ) -> Result<()> {
        let dm = Destination::Direct(msg.author);
        let name = project.name().to_string();
        self.send(dm, render::edit_project_intro(&name)).await?;

        let outcome = flow::drive(
            EditProject::new(project),
            inbox,
            self.platform().as_ref(),
            dm,
            msg.author,
            &self.config().timeouts,
        )
        .await?;
        let FlowOutcome::Committed(edit) = outcome else {
            return Ok(());
        };

        let summary = describe_edit(&edit);
        self.store().update(|doc| {
            let project = doc.projects.get_mut(&name).ok_or_else(|| project_gone(&name))?;
            project.apply_edit(edit)?;
            Ok::<_, Error>(())
        })?;
        tracing::info!(project = %name, change = %summary, "Project edited");

        self.send(dm, render::project_updated(&name, &summary)).await?;
        self.sync_mirror(msg.guild, &name, dm).await;
        Ok(())
    }

    pub(super) async fn delete_project(&self, msg: &Incoming, name: &str) -> Result<()> {
        self.require(msg, PermissionCategory::ProjectManagement, "delete projects")?;
        if self.store().read(|doc| doc.projects.is_empty()) {
            return self
                .send(msg.reply_to(), render::no_projects(self.prefix(), "delete"))
                .await;
        }
        if self.find_project(msg, name).await?.is_none() {
            return Ok(());
        }

        let dm = Destination::Direct(msg.author);
        let mut inbox = self.open_conversation(ConversationKey::direct(msg.author))?;
        self.hide_command(msg).await;

        if let Err(e) = self.delete_in_dm(msg, name, &mut inbox).await {
            self.report(dm, &e).await;
        }
        Ok(())
    }

    async fn delete_in_dm(
        &self,
        msg: &Incoming,
        name: &str,
        inbox: &mut flow::Inbox,
    ) -> Result<()> {
        let dm = Destination::Direct(msg.author);
        self.send(dm, render::delete_project_intro(name)).await?;

        let outcome = flow::drive(
            DeleteProject::new(name),
            inbox,
            self.platform().as_ref(),
            dm,
            msg.author,
            &self.config().timeouts,
        )
        .await?;
        let FlowOutcome::Committed(name) = outcome else {
            return Ok(());
        };

        self.store().update(|doc| {
            doc.projects
                .remove(&name)
                .map(|_| ())
                .ok_or_else(|| project_gone(&name))
        })?;
        tracing::info!(project = %name, by = %msg.author_name, "Project deleted");

        let (thread_deleted, failure) = match self.mirror(msg.guild).delete(&name).await {
            Ok(deleted) => (deleted, None),
            Err(failure) => {
                tracing::warn!(project = %name, "Could not delete forum thread: {}", failure);
                (false, Some(failure))
            }
        };
        self.send(
            dm,
            render::project_deleted(&name, thread_deleted, &msg.author_name),
        )
        .await?;
        if let Some(failure) = failure {
            self.send(dm, render::mirror_warning(self.prefix(), &failure))
                .await?;
        }
        Ok(())
    }
}
