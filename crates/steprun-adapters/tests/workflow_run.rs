//! End-to-end runs over real directories.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use steprun_adapters::{
    LocalFilesystem, RecordingCommandRunner, ScriptedPrompter, WorkflowLoader,
    register_builtins, register_workflow_placeholders,
};
use steprun_core::{
    application::{ActionOutcome, RunOptions, WorkflowService, ports::CommandOutput},
    domain::{EnvLookup, PlaceholderRegistry, Workflow},
};
use tempfile::TempDir;

const WORKFLOW: &str = r#"{
    "name": "web-app",
    "placeholders": {
        "AUTHOR": { "command": "git config user.name" },
        "LICENSE": { "value": "MIT" }
    },
    "steps": [
        {
            "name": "project",
            "question": { "id": "name", "type": "text", "prompt": "Project name?", "default": "demo" },
            "actions": [
                { "type": "copy", "src": "template", "dest": "[[[ANS:name]]]" },
                {
                    "type": "replace",
                    "file": "[[[ANS:name]]]/README.md",
                    "find": "__NAME__",
                    "replace": "[[[ANS:name]]] by [[[AUTHOR]]] ([[[LICENSE]]], [[[CURRENT_YEAR]]])"
                }
            ]
        },
        {
            "question": {
                "id": "fw", "type": "select", "prompt": "Framework for [[[ANS:name]]]?",
                "options": ["React", "Vue"]
            }
        },
        {
            "question": {
                "id": "ts", "type": "confirm", "prompt": "TypeScript?", "default": false,
                "conditions": [ { "question_id": "fw", "ans": "React" } ]
            },
            "actions": [
                {
                    "type": "rename",
                    "from": "[[[ANS:name]]]/index.js",
                    "to": "[[[ANS:name]]]/index.ts",
                    "conditions": [ { "question_id": "ts", "ans": "Yes" } ]
                },
                {
                    "type": "command",
                    "command": "npm install",
                    "cwd": "[[[ANS:name]]]",
                    "conditions": [ { "question_id": "fw", "ans": { "regex": "^(React|Vue)$" } } ]
                }
            ]
        }
    ]
}"#;

fn seed_template(root: &Path) {
    let template = root.join("template");
    fs::create_dir_all(template.join("src")).unwrap();
    fs::write(template.join("README.md"), "# __NAME__\n").unwrap();
    fs::write(template.join("index.js"), "export {};\n").unwrap();
    fs::write(template.join("src/app.js"), "app\n").unwrap();
}

fn service(workflow: &Workflow, root: &Path, prompter: ScriptedPrompter) -> (WorkflowService, RecordingCommandRunner) {
    let commands = RecordingCommandRunner::new()
        .respond("git config user.name", CommandOutput::success("Ada\n"));
    let env = EnvLookup::from_fn(|_| None);

    let mut builder = PlaceholderRegistry::builder();
    register_workflow_placeholders(
        &mut builder,
        workflow,
        Arc::new(commands.clone()),
        root,
        env.clone(),
    )
    .unwrap();
    register_builtins(&mut builder, root).unwrap();

    let service = WorkflowService::new(
        Box::new(prompter),
        Box::new(LocalFilesystem::new()),
        Box::new(commands.clone()),
        builder.build(),
    )
    .with_env_lookup(env);

    (service, commands)
}

#[test]
fn interactive_run_builds_the_project() {
    let temp = TempDir::new().unwrap();
    seed_template(temp.path());
    let workflow = WorkflowLoader::new().parse(WORKFLOW, "steprun.json").unwrap();

    let prompter = ScriptedPrompter::new(["shop", "React", "y"]);
    let (service, commands) = service(&workflow, temp.path(), prompter.clone());

    let report = service
        .run(
            &workflow,
            &RunOptions {
                base_dir: temp.path().to_path_buf(),
                ..RunOptions::default()
            },
        )
        .unwrap();

    let project = temp.path().join("shop");
    assert!(project.join("src/app.js").is_file());
    assert!(project.join("index.ts").is_file());
    assert!(!project.join("index.js").exists());

    let readme = fs::read_to_string(project.join("README.md")).unwrap();
    assert!(readme.starts_with("# shop by Ada (MIT, "), "{readme}");
    assert!(!readme.contains("[[["));

    assert_eq!(prompter.asked()[1], "Framework for shop?");
    assert_eq!(report.answers.get("ts"), Some("Yes"));
    assert_eq!(report.count(ActionOutcome::Executed), 4);

    let npm: Vec<_> = commands
        .commands()
        .into_iter()
        .filter(|c| c.command == "npm install")
        .collect();
    assert_eq!(npm.len(), 1);
    assert_eq!(npm[0].cwd, project);
}

#[test]
fn skipped_question_skips_its_actions() {
    let temp = TempDir::new().unwrap();
    seed_template(temp.path());
    let workflow = WorkflowLoader::new().parse(WORKFLOW, "steprun.json").unwrap();

    let prompter = ScriptedPrompter::new(["", "Vue"]);
    let (service, _) = service(&workflow, temp.path(), prompter.clone());

    let report = service
        .run(
            &workflow,
            &RunOptions {
                base_dir: temp.path().to_path_buf(),
                ..RunOptions::default()
            },
        )
        .unwrap();

    assert_eq!(report.skipped_questions, vec!["ts"]);
    assert!(!report.answers.contains("ts"));
    assert_eq!(report.count(ActionOutcome::Skipped), 1);
    assert!(temp.path().join("demo/index.js").is_file());
    assert_eq!(prompter.remaining(), 0);
}

#[test]
fn dry_run_leaves_the_disk_alone() {
    let temp = TempDir::new().unwrap();
    seed_template(temp.path());
    let workflow = WorkflowLoader::new().parse(WORKFLOW, "steprun.json").unwrap();

    let (service, commands) = service(&workflow, temp.path(), ScriptedPrompter::default());
    let mut preset = steprun_core::domain::AnswerMap::new();
    preset.insert("fw", "React");

    let report = service
        .run(
            &workflow,
            &RunOptions {
                base_dir: temp.path().to_path_buf(),
                dry_run: true,
                non_interactive: true,
                preset_answers: preset,
            },
        )
        .unwrap();

    assert!(!temp.path().join("demo").exists());
    assert_eq!(report.answers.get("ts"), Some("No"));
    assert_eq!(report.count(ActionOutcome::DryRun), 3);
    assert!(commands.commands().iter().all(|c| c.command != "npm install"));
}
