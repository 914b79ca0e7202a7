//! `steprun init`: write a starter workflow, or the global config file.

use std::path::Path;

use tracing::instrument;

use crate::{
    cli::InitArgs,
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

/// Starter workflow written by `steprun init`.
pub const STARTER_WORKFLOW: &str = r##"{
  "name": "starter",
  "description": "Created by steprun init",
  "placeholders": {
    "AUTHOR": { "command": "git config user.name" }
  },
  "steps": [
    {
      "name": "project",
      "question": {
        "id": "name",
        "prompt": "Project name?",
        "type": "text",
        "default": "my-project",
        "required": true
      },
      "actions": [
        { "type": "mkdir", "path": "[[[ANS:name]]]" }
      ]
    },
    {
      "name": "readme",
      "question": {
        "id": "readme",
        "prompt": "Add a README?",
        "type": "confirm",
        "default": true
      },
      "actions": [
        {
          "type": "command",
          "command": "echo \"# [[[ANS:name]]] ([[[CURRENT_YEAR]]])\" > README.md",
          "cwd": "[[[ANS:name]]]",
          "conditions": [{ "question_id": "readme", "ans": "Yes" }]
        }
      ]
    }
  ]
}
"##;

#[instrument(skip_all, fields(global = args.global, force = args.force))]
pub fn execute(args: InitArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    if args.global {
        init_config(args.force, &output)
    } else {
        let path = config.workflow.default_file;
        ensure_writable(&path, args.force)?;
        std::fs::write(&path, STARTER_WORKFLOW)
            .with_cli_context(|| format!("Failed to write {}", path.display()))?;
        output.success(&format!("Created {}", path.display()))?;
        output.info(&format!("Try it: steprun run {}", path.display()))?;
        Ok(())
    }
}

fn init_config(force: bool, output: &OutputManager) -> CliResult<()> {
    let config_path = AppConfig::config_path();
    ensure_writable(&config_path, force)?;

    let toml = toml::to_string_pretty(&AppConfig::default()).map_err(|e| CliError::ConfigError {
        message: format!("Failed to serialise default config: {e}"),
        source: Some(Box::new(e)),
    })?;

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).with_cli_context(|| {
            format!("Failed to create config directory '{}'", parent.display())
        })?;
    }

    std::fs::write(&config_path, &toml)
        .with_cli_context(|| format!("Failed to write config to '{}'", config_path.display()))?;

    output.success(&format!("Configuration created at {}", config_path.display()))?;
    Ok(())
}

fn ensure_writable(path: &Path, force: bool) -> CliResult<()> {
    if path.exists() && !force {
        return Err(CliError::FileExists {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}
