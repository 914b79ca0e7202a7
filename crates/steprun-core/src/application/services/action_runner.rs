//! Executes resolved actions through the ports.

use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, instrument};

use crate::{
    application::{
        ApplicationError,
        ports::{CommandRunner, Filesystem},
    },
    domain::{ActionKind, AnswerMap, Resolver},
    error::SteprunResult,
};

/// Runs one already-resolved action.
///
/// Strings are used as given; the only second resolution pass is over the
/// new content produced by a replace action.
pub struct ActionRunner<'a> {
    filesystem: &'a dyn Filesystem,
    commands: &'a dyn CommandRunner,
    resolver: &'a Resolver,
    base_dir: &'a Path,
}

impl<'a> ActionRunner<'a> {
    pub fn new(
        filesystem: &'a dyn Filesystem,
        commands: &'a dyn CommandRunner,
        resolver: &'a Resolver,
        base_dir: &'a Path,
    ) -> Self {
        Self {
            filesystem,
            commands,
            resolver,
            base_dir,
        }
    }

    /// Relative paths are taken from the run's base directory.
    pub fn path(&self, raw: &str) -> PathBuf {
        let path = Path::new(raw);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    #[instrument(skip_all, fields(action = action.name()))]
    pub fn execute(&self, action: &ActionKind, answers: &AnswerMap) -> SteprunResult<()> {
        match action {
            ActionKind::Copy {
                src,
                dest,
                overwrite,
            } => self.copy(&self.path(src), &self.path(dest), *overwrite),
            ActionKind::Replace {
                file,
                find,
                replace,
                regex,
            } => self.replace(&self.path(file), find, replace, *regex, answers),
            ActionKind::Rename { from, to } => {
                let to = self.path(to);
                self.ensure_parent(&to)?;
                self.filesystem.rename(&self.path(from), &to)
            }
            ActionKind::Symlink { target, link } => {
                let link = self.path(link);
                self.ensure_parent(&link)?;
                // the target is stored as written, relative to the link
                self.filesystem.symlink(Path::new(target), &link)
            }
            ActionKind::Mkdir { path } => self.filesystem.create_dir_all(&self.path(path)),
            ActionKind::Command { command, cwd } => {
                let cwd = cwd
                    .as_deref()
                    .map_or_else(|| self.base_dir.to_path_buf(), |c| self.path(c));
                self.command(command, &cwd)
            }
        }
    }

    fn copy(&self, src: &Path, dest: &Path, overwrite: bool) -> SteprunResult<()> {
        if !overwrite && self.filesystem.exists(dest) {
            return Err(ApplicationError::DestinationExists {
                path: dest.to_path_buf(),
            }
            .into());
        }

        self.ensure_parent(dest)?;
        self.filesystem.copy(src, dest)
    }

    fn replace(
        &self,
        file: &Path,
        find: &str,
        replacement: &str,
        regex: bool,
        answers: &AnswerMap,
    ) -> SteprunResult<()> {
        let content = self.filesystem.read_to_string(file)?;

        let replaced = if regex {
            let pattern = Regex::new(find).map_err(|e| ApplicationError::InvalidReplacePattern {
                pattern: find.to_string(),
                reason: e.to_string(),
            })?;
            pattern.replace_all(&content, replacement).into_owned()
        } else {
            content.replace(find, replacement)
        };

        // the replacement may itself introduce placeholders
        let resolved = self.resolver.resolve(&replaced, answers);

        debug!(
            file = %file.display(),
            changed = resolved != content,
            "Replace applied"
        );
        self.filesystem.write_file(file, &resolved)
    }

    fn command(&self, command: &str, cwd: &Path) -> SteprunResult<()> {
        let output = self.commands.run(command, cwd)?;

        if output.is_success() {
            Ok(())
        } else {
            Err(ApplicationError::CommandFailed {
                command: command.to_string(),
                code: output.code,
                stderr: output.stderr,
            }
            .into())
        }
    }

    fn ensure_parent(&self, path: &Path) -> SteprunResult<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !self.filesystem.exists(parent) => {
                self.filesystem.create_dir_all(parent)
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::*;

    use super::*;
    use crate::{
        application::ports::{CommandOutput, MockCommandRunner, MockFilesystem},
        domain::{EnvLookup, GeneratorError, PlaceholderRegistry},
        error::SteprunError,
    };

    fn resolver() -> Resolver {
        Resolver::new(PlaceholderRegistry::empty()).with_env_lookup(EnvLookup::from_fn(|_| None))
    }

    fn base() -> &'static Path {
        Path::new("/work")
    }

    #[test]
    fn copy_refuses_to_overwrite() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists()
            .with(eq(Path::new("/work/out")))
            .return_const(true);
        fs.expect_copy().never();
        let cmd = MockCommandRunner::new();
        let r = resolver();

        let action = ActionKind::Copy {
            src: "tpl".into(),
            dest: "out".into(),
            overwrite: false,
        };
        let err = ActionRunner::new(&fs, &cmd, &r, base())
            .execute(&action, &AnswerMap::new())
            .unwrap_err();

        assert!(matches!(
            err,
            SteprunError::Application(ApplicationError::DestinationExists { .. })
        ));
    }

    #[test]
    fn copy_with_overwrite_skips_the_check() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().return_const(true);
        fs.expect_copy()
            .with(eq(Path::new("/work/tpl")), eq(Path::new("/abs/out")))
            .times(1)
            .returning(|_, _| Ok(()));
        let cmd = MockCommandRunner::new();
        let r = resolver();

        let action = ActionKind::Copy {
            src: "tpl".into(),
            dest: "/abs/out".into(),
            overwrite: true,
        };
        ActionRunner::new(&fs, &cmd, &r, base())
            .execute(&action, &AnswerMap::new())
            .unwrap();
    }

    #[test]
    fn replace_re_resolves_new_content() {
        let mut fs = MockFilesystem::new();
        fs.expect_read_to_string()
            .returning(|_| Ok("name = \"__NAME__\"\n".into()));
        fs.expect_write_file()
            .withf(|path, content| {
                path == Path::new("/work/Cargo.toml") && content == "name = \"shop\"\n"
            })
            .times(1)
            .returning(|_, _| Ok(()));
        let cmd = MockCommandRunner::new();
        let r = resolver();
        let answers: AnswerMap = [("name", "shop")].into_iter().collect();

        // the replacement is still a token; it is resolved after replacing
        let action = ActionKind::Replace {
            file: "Cargo.toml".into(),
            find: "__NAME__".into(),
            replace: "[[[ANS:name]]]".into(),
            regex: false,
        };
        ActionRunner::new(&fs, &cmd, &r, base())
            .execute(&action, &answers)
            .unwrap();
    }

    #[test]
    fn regex_replace_supports_groups() {
        let mut fs = MockFilesystem::new();
        fs.expect_read_to_string()
            .returning(|_| Ok("version = 1.2.3".into()));
        fs.expect_write_file()
            .withf(|_, content| content == "version = 1.2.4")
            .times(1)
            .returning(|_, _| Ok(()));
        let cmd = MockCommandRunner::new();
        let r = resolver();

        let action = ActionKind::Replace {
            file: "v.txt".into(),
            find: r"(\d+)\.(\d+)\.3".into(),
            replace: "$1.$2.4".into(),
            regex: true,
        };
        ActionRunner::new(&fs, &cmd, &r, base())
            .execute(&action, &AnswerMap::new())
            .unwrap();
    }

    #[test]
    fn bad_replace_pattern_is_reported() {
        let mut fs = MockFilesystem::new();
        fs.expect_read_to_string().returning(|_| Ok(String::new()));
        fs.expect_write_file().never();
        let cmd = MockCommandRunner::new();
        let r = resolver();

        let action = ActionKind::Replace {
            file: "f".into(),
            find: "(".into(),
            replace: String::new(),
            regex: true,
        };
        let err = ActionRunner::new(&fs, &cmd, &r, base())
            .execute(&action, &AnswerMap::new())
            .unwrap_err();
        assert!(matches!(
            err,
            SteprunError::Application(ApplicationError::InvalidReplacePattern { .. })
        ));
    }

    #[test]
    fn replace_with_generator_value() {
        let registry = PlaceholderRegistry::builder()
            .with("YEAR", |_: &AnswerMap| Ok::<_, GeneratorError>("2031".into()))
            .unwrap()
            .build();
        let r = Resolver::new(registry).with_env_lookup(EnvLookup::from_fn(|_| None));

        let mut fs = MockFilesystem::new();
        fs.expect_read_to_string()
            .returning(|_| Ok("(c) YYYY".into()));
        fs.expect_write_file()
            .withf(|_, content| content == "(c) 2031")
            .times(1)
            .returning(|_, _| Ok(()));
        let cmd = MockCommandRunner::new();

        let action = ActionKind::Replace {
            file: "LICENSE".into(),
            find: "YYYY".into(),
            replace: "[[[YEAR]]]".into(),
            regex: false,
        };
        ActionRunner::new(&fs, &cmd, &r, base())
            .execute(&action, &AnswerMap::new())
            .unwrap();
    }

    #[test]
    fn command_runs_in_base_dir_by_default() {
        let fs = MockFilesystem::new();
        let mut cmd = MockCommandRunner::new();
        cmd.expect_run()
            .with(eq("make"), eq(Path::new("/work")))
            .times(1)
            .returning(|_, _| Ok(CommandOutput::success("")));
        let r = resolver();

        let action = ActionKind::Command {
            command: "make".into(),
            cwd: None,
        };
        ActionRunner::new(&fs, &cmd, &r, base())
            .execute(&action, &AnswerMap::new())
            .unwrap();
    }

    #[test]
    fn failing_command_is_an_error() {
        let fs = MockFilesystem::new();
        let mut cmd = MockCommandRunner::new();
        cmd.expect_run()
            .with(eq("false"), eq(Path::new("/work/sub")))
            .returning(|_, _| Ok(CommandOutput::failure(1, "nope")));
        let r = resolver();

        let action = ActionKind::Command {
            command: "false".into(),
            cwd: Some("sub".into()),
        };
        let err = ActionRunner::new(&fs, &cmd, &r, base())
            .execute(&action, &AnswerMap::new())
            .unwrap_err();

        match err {
            SteprunError::Application(ApplicationError::CommandFailed { code, stderr, .. }) => {
                assert_eq!(code, Some(1));
                assert_eq!(stderr, "nope");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rename_creates_missing_parent() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists()
            .with(eq(Path::new("/work/new")))
            .return_const(false);
        fs.expect_create_dir_all()
            .with(eq(Path::new("/work/new")))
            .times(1)
            .returning(|_| Ok(()));
        fs.expect_rename()
            .with(eq(Path::new("/work/a.txt")), eq(Path::new("/work/new/b.txt")))
            .times(1)
            .returning(|_, _| Ok(()));
        let cmd = MockCommandRunner::new();
        let r = resolver();

        let action = ActionKind::Rename {
            from: "a.txt".into(),
            to: "new/b.txt".into(),
        };
        ActionRunner::new(&fs, &cmd, &r, base())
            .execute(&action, &AnswerMap::new())
            .unwrap();
    }
}
