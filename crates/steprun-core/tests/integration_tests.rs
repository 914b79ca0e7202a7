//! Integration tests for steprun-core: resolver and evaluator properties
//! through the public API, and a full run with in-test ports.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use steprun_core::{
    application::ApplicationError,
    domain::{EnvLookup, EnvSyntax, PlaceholderWarning},
    prelude::*,
};

fn isolated(registry: PlaceholderRegistry) -> Resolver {
    Resolver::new(registry)
        .with_env_syntax(EnvSyntax::Dollar)
        .with_env_lookup(EnvLookup::from_fn(|name| {
            (name == "HOME").then(|| "/home/dev".to_string())
        }))
}

fn answers(pairs: &[(&str, &str)]) -> AnswerMap {
    pairs.iter().copied().collect()
}

// ============================================================================
// Resolver
// ============================================================================

#[test]
fn text_without_placeholders_is_unchanged() {
    let r = isolated(PlaceholderRegistry::empty());
    let text = "plain text with [brackets] and [[two]] only";
    assert_eq!(r.resolve(text, &answers(&[("a", "b")])), text);
}

#[test]
fn answer_tokens_are_replaced_everywhere() {
    let r = isolated(PlaceholderRegistry::empty());
    let out = r.resolve(
        "[[[ANS:name]]]/[[[ANS:name]]].txt",
        &answers(&[("name", "a.b*c$")]),
    );
    assert_eq!(out, "a.b*c$/a.b*c$.txt");
}

#[test]
fn each_uuid_occurrence_is_fresh() {
    let r = isolated(PlaceholderRegistry::empty());
    let out = r.resolve("[[[UUIDv4]]] [[[UUIDv4]]] [[[UUIDv4]]]", &AnswerMap::new());
    let ids: HashSet<&str> = out.split(' ').collect();

    assert_eq!(ids.len(), 3);
    for id in ids {
        assert_eq!(id.len(), 36);
        assert_eq!(&id[14..15], "4");
        assert_eq!(id, id.to_lowercase());
    }
}

#[test]
fn custom_generator_runs_once_per_call() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let registry = PlaceholderRegistry::builder()
        .with("SEQ", move |_: &AnswerMap| {
            Ok::<_, GeneratorError>(counter.fetch_add(1, Ordering::SeqCst).to_string())
        })
        .unwrap()
        .build();
    let r = isolated(registry);

    assert_eq!(r.resolve("[[[SEQ]]]-[[[SEQ]]]", &AnswerMap::new()), "0-0");
    assert_eq!(r.resolve("[[[SEQ]]]", &AnswerMap::new()), "1");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn escaped_tokens_come_out_literal() {
    let r = isolated(PlaceholderRegistry::empty());
    let a = answers(&[("name", "Widget")]);

    assert_eq!(r.resolve(r"\[[[ANS:name]]]", &a), "[[[ANS:name]]]");
    assert_eq!(r.resolve(r"\\[[[ANS:name]]]", &a), r"\[[[ANS:name]]]");
    assert_eq!(
        r.resolve(r"[[[ANS:name]]] vs \[[[ANS:name]]]", &a),
        "Widget vs [[[ANS:name]]]"
    );
}

#[test]
fn environment_expands_after_substitution() {
    let r = isolated(PlaceholderRegistry::empty());
    let out = r.resolve("$HOME/[[[ANS:dir]]] $UNSET", &answers(&[("dir", "code")]));
    assert_eq!(out, "/home/dev/code $UNSET");
}

#[test]
fn failing_generator_does_not_stop_resolution() {
    let registry = PlaceholderRegistry::builder()
        .with("BROKEN", |_: &AnswerMap| -> Result<String, GeneratorError> {
            Err(GeneratorError::new("no git"))
        })
        .unwrap()
        .build();
    let r = isolated(registry);

    let resolution = r.resolve_with_report("[[[BROKEN]]] [[[ANS:x]]]", &answers(&[("x", "ok")]));
    assert_eq!(resolution.text, "[[[BROKEN]]] ok");
    assert_eq!(
        resolution.warnings,
        vec![PlaceholderWarning::GeneratorFailed {
            name: "BROKEN".into(),
            reason: "no git".into()
        }]
    );
}

// ============================================================================
// Conditions
// ============================================================================

#[test]
fn condition_shapes_from_json() {
    let r = isolated(PlaceholderRegistry::empty());
    let eval = ConditionEvaluator::new(&r);
    let a = answers(&[("fw", "Angular"), ("features", "TypeScript, ESLint")]);

    let clauses = |json: &str| -> Vec<ConditionClause> { serde_json::from_str(json).unwrap() };

    assert!(!eval.evaluate(&clauses(r#"[{"question_id":"fw","ans":["React","Vue"]}]"#), &a));
    assert!(eval.evaluate(&clauses(r#"[{"question_id":"fw","ans":"Angular"}]"#), &a));
    assert!(eval.evaluate(
        &clauses(r#"[{"question_id":"features","ans":{"regex":"TypeScript"}}]"#),
        &a
    ));
    assert!(!eval.evaluate(&clauses(r#"[{"ans":"Angular"}]"#), &a));
    assert!(!eval.evaluate(&clauses(r#"[{"question_id":"fw","ans":7}]"#), &a));
    assert!(eval.evaluate(&[], &a));
}

// ============================================================================
// Full run with in-test ports
// ============================================================================

#[derive(Clone, Default)]
struct Recorder {
    files: Arc<Mutex<BTreeMap<PathBuf, String>>>,
    commands: Arc<Mutex<Vec<String>>>,
}

impl Filesystem for Recorder {
    fn create_dir_all(&self, path: &Path) -> SteprunResult<()> {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), "<dir>".into());
        Ok(())
    }

    fn read_to_string(&self, path: &Path) -> SteprunResult<String> {
        self.files.lock().unwrap().get(path).cloned().ok_or_else(|| {
            ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: "missing".into(),
            }
            .into()
        })
    }

    fn write_file(&self, path: &Path, content: &str) -> SteprunResult<()> {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn copy(&self, src: &Path, dest: &Path) -> SteprunResult<()> {
        let content = self.read_to_string(src)?;
        self.write_file(dest, &content)
    }

    fn rename(&self, from: &Path, to: &Path) -> SteprunResult<()> {
        let content = self.read_to_string(from)?;
        self.files.lock().unwrap().remove(from);
        self.write_file(to, &content)
    }

    fn symlink(&self, target: &Path, link: &Path) -> SteprunResult<()> {
        self.write_file(link, &format!("-> {}", target.display()))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }
}

impl CommandRunner for Recorder {
    fn run(&self, command: &str, _cwd: &Path) -> SteprunResult<CommandOutput> {
        self.commands.lock().unwrap().push(command.to_string());
        Ok(CommandOutput::success(""))
    }
}

struct NoPrompts;

impl Prompter for NoPrompts {
    fn input(&self, _: &str, _: Option<&str>) -> SteprunResult<String> {
        Err(ApplicationError::Cancelled.into())
    }
    fn confirm(&self, _: &str, _: Option<bool>) -> SteprunResult<bool> {
        Err(ApplicationError::Cancelled.into())
    }
    fn select(&self, _: &str, _: &[String], _: Option<usize>) -> SteprunResult<usize> {
        Err(ApplicationError::Cancelled.into())
    }
    fn multiselect(&self, _: &str, _: &[String], _: &[bool]) -> SteprunResult<Vec<usize>> {
        Err(ApplicationError::Cancelled.into())
    }
}

const WORKFLOW: &str = r#"{
    "name": "starter",
    "steps": [
        { "question": { "id": "name", "prompt": "Name?", "required": true } },
        {
            "question": { "id": "license", "prompt": "License?", "type": "select",
                          "options": ["MIT", "Apache-2.0"], "default": "MIT" },
            "actions": [
                { "type": "copy", "src": "tpl/LICENSE", "dest": "[[[ANS:name]]]/LICENSE" },
                { "type": "replace", "file": "[[[ANS:name]]]/LICENSE",
                  "find": "__HOLDER__", "replace": "[[[ANS:name]]] authors" }
            ]
        },
        {
            "question": { "id": "git", "prompt": "Init git?", "type": "confirm", "default": false },
            "actions": [
                { "type": "command", "command": "git init [[[ANS:name]]]",
                  "conditions": [{ "question_id": "git", "ans": "Yes" }] }
            ]
        }
    ]
}"#;

#[test]
fn full_run_non_interactive() {
    let workflow: Workflow = serde_json::from_str(WORKFLOW).unwrap();
    let ports = Recorder::default();
    ports
        .write_file(Path::new("/w/tpl/LICENSE"), "Copyright __HOLDER__")
        .unwrap();

    let service = WorkflowService::new(
        Box::new(NoPrompts),
        Box::new(ports.clone()),
        Box::new(ports.clone()),
        PlaceholderRegistry::empty(),
    )
    .with_env_lookup(EnvLookup::from_fn(|_| None));

    let mut options = RunOptions {
        base_dir: PathBuf::from("/w"),
        non_interactive: true,
        ..RunOptions::default()
    };
    options.preset_answers.insert("name", "shop");

    let report = service.run(&workflow, &options).unwrap();

    let files = ports.files.lock().unwrap();
    assert_eq!(
        files.get(Path::new("/w/shop/LICENSE")).map(String::as_str),
        Some("Copyright shop authors")
    );
    assert!(ports.commands.lock().unwrap().is_empty());

    assert_eq!(report.answers.get("license"), Some("MIT"));
    assert_eq!(report.answers.get("git"), Some("No"));
    assert_eq!(report.count(ActionOutcome::Executed), 2);
    assert_eq!(report.count(ActionOutcome::Skipped), 1);
}

#[test]
fn cancelled_prompt_surfaces_as_cancelled() {
    let workflow: Workflow = serde_json::from_str(WORKFLOW).unwrap();
    let ports = Recorder::default();
    let service = WorkflowService::new(
        Box::new(NoPrompts),
        Box::new(ports.clone()),
        Box::new(ports),
        PlaceholderRegistry::empty(),
    );

    let err = service.run(&workflow, &RunOptions::default()).unwrap_err();
    assert!(err.is_cancelled());
}
