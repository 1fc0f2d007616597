use chrono::{TimeZone, Utc};
use crewmate::models::*;
use crewmate::store::{self, Store, DATA_FILE_NAME};
use speculate2::speculate;

fn sample_project() -> Project {
    let mut project = Project::new(CreateProjectInput {
        name: "Apollo".to_string(),
        description: "Reach the moon".to_string(),
        created_by: "alice".to_string(),
        tasks: vec![
            Task::new("Build rocket", 50, 3).expect("Failed to build task"),
            Task::new("Paint it", 20, 1).expect("Failed to build task"),
        ],
    })
    .expect("Failed to build project");
    project.assign(0, "111").expect("assign failed");
    project
}

speculate! {
    before {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join(DATA_FILE_NAME);
    }

    describe "open" {
        it "starts empty when the file is missing" {
            let store = Store::open(path.clone());

            let doc = store.snapshot();
            assert!(doc.projects.is_empty());
            assert_eq!(doc.forum_channel_name, DEFAULT_FORUM_CHANNEL);
            assert!(!path.exists());
        }

        it "starts empty when the file is malformed" {
            std::fs::write(&path, "{ not json").expect("write failed");

            let store = Store::open(path.clone());

            assert_eq!(store.snapshot(), Document::default());
        }

        it "fills missing keys with defaults" {
            std::fs::write(&path, r#"{"user_points": {"42": 7}}"#).expect("write failed");

            let doc = Store::open(path.clone()).snapshot();

            assert_eq!(doc.points("42"), 7);
            assert_eq!(doc.forum_channel_name, DEFAULT_FORUM_CHANNEL);
            assert!(!doc.shop_items.is_empty());
        }

        it "accepts legacy progress and created keys" {
            let legacy = r#"{
                "projects": {
                    "Old": {
                        "description": "From before",
                        "status": "In Progress",
                        "progress": 99,
                        "created": "2024-03-05 14:30",
                        "created_by": "bob",
                        "tasks": [
                            {"description": "Only task", "reward_points": 10, "max_members": 1,
                             "assigned_members": ["7"], "completed": true, "completed_by": "7",
                             "completed_at": "2024-03-06 09:00"}
                        ],
                        "members": ["7"]
                    }
                }
            }"#;
            std::fs::write(&path, legacy).expect("write failed");

            let doc = Store::open(path.clone()).snapshot();
            let project = doc.project("Old").expect("project missing");

            assert_eq!(project.name(), "Old");
            assert_eq!(project.created_at(), Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap());
            assert_eq!(project.progress_percent(), 100);
            assert_eq!(project.status(), ProjectStatus::Completed);
        }

        it "sets aside task records with non-positive numbers" {
            std::fs::write(
                &path,
                r#"{"projects": {"Bad": {"tasks": [
                    {"description": "x", "reward_points": 0, "max_members": 1},
                    {"description": "y", "reward_points": 5, "max_members": 1}
                ]}}}"#,
            ).expect("write failed");

            let doc = store::load_document(&path).expect("load failed").expect("file missing");
            let project = doc.project("Bad").expect("project missing");

            assert_eq!(project.tasks().len(), 1);
            assert_eq!(project.tasks()[0].description(), "y");
            assert_eq!(project.unreadable_tasks().len(), 1);
        }

        it "keeps the rest of the document when tasks are plain strings" {
            let legacy = r#"{
                "projects": {
                    "Old": {"description": "From before", "tasks": ["Fix bug"], "members": []},
                    "Good": {"tasks": [{"description": "Ship", "reward_points": 10, "max_members": 1}]}
                },
                "user_points": {"42": 500},
                "forum_channel_name": "projects"
            }"#;
            std::fs::write(&path, legacy).expect("write failed");

            let store = Store::open(path.clone());
            let doc = store.snapshot();
            assert_eq!(doc.points("42"), 500);
            assert_eq!(doc.forum_channel_name, "projects");
            assert!(doc.project("Old").expect("project missing").tasks().is_empty());
            assert_eq!(doc.project("Good").expect("project missing").tasks().len(), 1);

            store.update(|doc| {
                doc.user_roles.insert("42".to_string(), "Developer".to_string());
                Ok::<_, crewmate::Error>(())
            }).expect("update failed");

            let saved: serde_json::Value =
                serde_json::from_slice(&std::fs::read(&path).expect("read failed")).expect("bad json");
            assert_eq!(saved["user_points"]["42"], 500);
            assert_eq!(saved["projects"]["Old"]["unreadable_tasks"][0], "Fix bug");
            assert_eq!(saved["user_roles"]["42"], "Developer");
        }

        it "sets aside a project record that cannot be read" {
            std::fs::write(
                &path,
                r#"{"projects": {"Odd": {"status": "Someday"}, "Fine": {}}, "user_points": {"7": 3}}"#,
            ).expect("write failed");

            let doc = Store::open(path.clone()).snapshot();

            assert!(doc.project("Odd").is_none());
            assert!(doc.project("Fine").is_some());
            assert_eq!(doc.unreadable_projects["Odd"]["status"], "Someday");
            assert_eq!(doc.points("7"), 3);
        }
    }

    describe "update" {
        it "persists every successful change" {
            let store = Store::open(path.clone());
            store.update(|doc| {
                doc.projects.insert("Apollo".to_string(), sample_project());
                doc.user_points.insert("111".to_string(), 25);
                Ok::<_, crewmate::Error>(())
            }).expect("update failed");

            let reloaded = Store::open(path.clone()).snapshot();
            assert_eq!(reloaded, store.snapshot());
            assert_eq!(reloaded.points("111"), 25);
            let project = reloaded.project("Apollo").expect("project missing");
            assert_eq!(project.tasks(), sample_project().tasks());
            assert!(project.members().contains("111"));
        }

        it "leaves the document untouched when the change fails" {
            let store = Store::open(path.clone());
            let result = store.update(|doc| {
                doc.user_points.insert("111".to_string(), 25);
                Err::<(), _>(crewmate::Error::validation("nope"))
            });

            assert!(result.is_err());
            assert_eq!(store.snapshot().points("111"), 0);
            assert!(!path.exists());
        }

        it "does not leave a temp file behind" {
            let store = Store::open(path.clone());
            store.update(|doc| {
                doc.forum_channel_name = "projects".to_string();
                Ok::<_, crewmate::Error>(())
            }).expect("update failed");

            let names: Vec<_> = std::fs::read_dir(dir.path())
                .expect("read_dir failed")
                .map(|e| e.expect("entry").file_name())
                .collect();
            assert_eq!(names, vec![std::ffi::OsString::from(DATA_FILE_NAME)]);
        }
    }

    describe "round trip" {
        it "reproduces projects, tasks and points" {
            let mut doc = Document::default();
            let mut project = sample_project();
            project.complete(0, "111", &mut doc.user_points, Utc::now()).expect("complete failed");
            doc.projects.insert("Apollo".to_string(), project);
            doc.shop_items.insert("Sticker".to_string(), 5);

            store::save_document(&path, &doc).expect("save failed");
            let loaded = store::load_document(&path).expect("load failed").expect("file missing");

            assert_eq!(loaded, doc);
        }
    }

    describe "memory store" {
        it "never touches disk" {
            let store = Store::open_memory();
            assert!(store.path().is_none());
            store.save().expect("save failed");
        }
    }
}
