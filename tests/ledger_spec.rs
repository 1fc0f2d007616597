use chrono::Utc;
use crewmate::error::LedgerError;
use crewmate::models::*;
use speculate2::speculate;

fn build_project(tasks: Vec<Task>) -> Project {
    Project::new(CreateProjectInput {
        name: "Apollo".to_string(),
        description: "Reach the moon".to_string(),
        created_by: "alice".to_string(),
        tasks,
    })
    .expect("Failed to build project")
}

fn task(description: &str, reward: i64, members: i64) -> Task {
    Task::new(description, reward, members).expect("Failed to build task")
}

speculate! {
    before {
        let mut project = build_project(vec![
            task("Build rocket", 50, 3),
            task("Paint it", 20, 1),
            task("Launch", 10, 2),
        ]);
        let mut points = UserPoints::new();
    }

    describe "assign" {
        it "adds the member to the task and the project" {
            project.assign(0, "u1").expect("assign failed");

            assert_eq!(project.tasks()[0].assigned_members(), ["u1".to_string()]);
            assert!(project.members().contains("u1"));
        }

        it "rejects a second assignment of the same member" {
            project.assign(0, "u1").expect("assign failed");
            let err = project.assign(0, "u1").unwrap_err();

            assert_eq!(err, LedgerError::AlreadyAssigned("Build rocket".to_string()));
            assert_eq!(project.tasks()[0].assigned_members().len(), 1);
        }

        it "rejects a full task and leaves it unchanged" {
            project.assign(1, "u1").expect("assign failed");
            let before = project.clone();

            let err = project.assign(1, "u2").unwrap_err();

            assert_eq!(err, LedgerError::TaskFull { description: "Paint it".to_string(), max_members: 1 });
            assert_eq!(project, before);
        }

        it "never exceeds max_members" {
            for member in ["u1", "u2", "u3", "u4", "u5"] {
                let _ = project.assign(0, member);
            }
            let task = &project.tasks()[0];
            assert_eq!(task.assigned_members().len(), task.max_members() as usize);
        }

        it "rejects an index past the end" {
            let err = project.assign(7, "u1").unwrap_err();
            assert_eq!(err, LedgerError::IndexError { index: 7, len: 3 });
        }

        it "rejects a completed task" {
            project.assign(2, "u1").expect("assign failed");
            project.complete(2, "u1", &mut points, Utc::now()).expect("complete failed");

            let err = project.assign(2, "u2").unwrap_err();
            assert_eq!(err, LedgerError::TaskCompleted("Launch".to_string()));
        }
    }

    describe "complete" {
        it "splits the reward by floor division" {
            for member in ["u1", "u2", "u3"] {
                project.assign(0, member).expect("assign failed");
            }

            let reward = project.complete(0, "u2", &mut points, Utc::now()).expect("complete failed");

            assert_eq!(reward.reward_per_member, 16);
            assert_eq!(reward.remainder, 2);
            assert_eq!(reward.total_credited(), 48);
            for member in ["u1", "u2", "u3"] {
                assert_eq!(points.get(member), Some(&16));
            }
        }

        it "records who completed the task" {
            project.assign(1, "u1").expect("assign failed");
            project.complete(1, "u1", &mut points, Utc::now()).expect("complete failed");

            let task = &project.tasks()[1];
            assert!(task.is_completed());
            assert_eq!(task.completed_by(), Some("u1"));
            assert!(task.completed_at().is_some());
        }

        it "adds to an existing balance" {
            points.insert("u1".to_string(), 100);
            project.assign(1, "u1").expect("assign failed");
            project.complete(1, "u1", &mut points, Utc::now()).expect("complete failed");

            assert_eq!(points.get("u1"), Some(&120));
        }

        it "refuses members who are not assigned" {
            project.assign(0, "u1").expect("assign failed");
            let err = project.complete(0, "u9", &mut points, Utc::now()).unwrap_err();

            assert_eq!(err, LedgerError::NotAssigned("Build rocket".to_string()));
            assert!(points.is_empty());
            assert!(!project.tasks()[0].is_completed());
        }

        it "refuses to complete a task twice" {
            project.assign(1, "u1").expect("assign failed");
            project.complete(1, "u1", &mut points, Utc::now()).expect("complete failed");

            let err = project.complete(1, "u1", &mut points, Utc::now()).unwrap_err();
            assert_eq!(err, LedgerError::TaskCompleted("Paint it".to_string()));
            assert_eq!(points.get("u1"), Some(&20));
        }

        it "refuses a reward that would overflow a balance" {
            let mut big = build_project(vec![
                task("One", i64::MAX, 1),
                task("Two", i64::MAX, 1),
                task("Three", i64::MAX, 1),
            ]);
            for index in 0..3 {
                big.assign(index, "u1").expect("assign failed");
            }
            big.complete(0, "u1", &mut points, Utc::now()).expect("complete failed");
            big.complete(1, "u1", &mut points, Utc::now()).expect("complete failed");
            let balance = points["u1"];

            let err = big.complete(2, "u1", &mut points, Utc::now()).unwrap_err();

            assert!(matches!(err, LedgerError::Validation(_)));
            assert_eq!(points["u1"], balance);
            assert!(!big.tasks()[2].is_completed());
            assert_eq!(big.progress_percent(), 66);
        }
    }

    describe "progress and status" {
        it "starts at zero and in progress" {
            assert_eq!(project.progress_percent(), 0);
            assert_eq!(project.status(), ProjectStatus::InProgress);
        }

        it "is 33 percent after one of three tasks" {
            project.assign(0, "u1").expect("assign failed");
            project.complete(0, "u1", &mut points, Utc::now()).expect("complete failed");

            assert_eq!(project.progress_percent(), 33);
            assert_eq!(project.status(), ProjectStatus::InProgress);
        }

        it "completes the project with its last task" {
            for index in 0..3 {
                project.assign(index, "u1").expect("assign failed");
                project.complete(index, "u1", &mut points, Utc::now()).expect("complete failed");
            }

            assert_eq!(project.progress_percent(), 100);
            assert_eq!(project.status(), ProjectStatus::Completed);
        }

        it "reopens a completed project when a task is added" {
            for index in 0..3 {
                project.assign(index, "u1").expect("assign failed");
                project.complete(index, "u1", &mut points, Utc::now()).expect("complete failed");
            }
            project.add_task(task("Land", 40, 1));

            assert_eq!(project.progress_percent(), 75);
            assert_eq!(project.status(), ProjectStatus::InProgress);
        }

        it "keeps an empty project in progress" {
            let empty = build_project(Vec::new());
            assert_eq!(empty.progress_percent(), 0);
            assert_eq!(empty.status(), ProjectStatus::InProgress);
        }

        it "only accepts Completed when every task is done" {
            assert!(project.set_status(ProjectStatus::Completed).is_err());
            project.set_status(ProjectStatus::OnHold).expect("status change failed");
            assert_eq!(project.status(), ProjectStatus::OnHold);
        }
    }

    describe "edits" {
        it "removes a task and recomputes progress" {
            project.assign(0, "u1").expect("assign failed");
            project.complete(0, "u1", &mut points, Utc::now()).expect("complete failed");

            project.apply_edit(ProjectEdit::RemoveTask(1)).expect("edit failed");

            assert_eq!(project.tasks().len(), 2);
            assert_eq!(project.progress_percent(), 50);
            assert_eq!(points.get("u1"), Some(&50));
        }

        it "allows lowering max_members below the assigned count" {
            project.assign(0, "u1").expect("assign failed");
            project.assign(0, "u2").expect("assign failed");

            project.apply_edit(ProjectEdit::EditTask { index: 0, edit: TaskEdit::MaxMembers(1) })
                .expect("edit failed");

            let task = &project.tasks()[0];
            assert_eq!(task.assigned_members().len(), 2);
            assert!(task.is_full());
        }

        it "rejects zero rewards and blank descriptions" {
            let before = project.clone();
            assert!(project.edit_task(0, TaskEdit::RewardPoints(0)).is_err());
            assert!(project.edit_task(0, TaskEdit::Description("  ".to_string())).is_err());
            assert_eq!(project, before);
        }
    }
}
