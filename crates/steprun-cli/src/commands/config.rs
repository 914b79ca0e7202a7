//! `steprun config`: inspect configuration values.

use serde_json::Value;

use crate::{
    cli::ConfigCommands,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Dispatch to the correct config subcommand.
pub fn execute(cmd: ConfigCommands, config: AppConfig, output: OutputManager) -> CliResult<()> {
    match cmd {
        ConfigCommands::Get { key } => {
            let value = get_config_value(&config, &key)?;
            output.result(&value)?;
        }

        ConfigCommands::List => {
            if output.is_json() {
                output.json(&config)?;
                return Ok(());
            }
            output.header("Current Configuration:")?;
            let serialised =
                toml::to_string_pretty(&config).map_err(|e| CliError::ConfigError {
                    message: format!("Failed to serialise config: {e}"),
                    source: Some(Box::new(e)),
                })?;
            output.print(&serialised)?;
        }

        ConfigCommands::Path => {
            output.result(&AppConfig::config_path().display().to_string())?;
        }
    }

    Ok(())
}

// ── helpers ───────────────────────────────────────────────────────────────────

/// Look up a dotted key (`workflow.default_file`). Unset optional values
/// print as an empty string.
fn get_config_value(config: &AppConfig, key: &str) -> CliResult<String> {
    let tree = serde_json::to_value(config).map_err(|e| CliError::ConfigError {
        message: format!("Failed to serialise config: {e}"),
        source: Some(Box::new(e)),
    })?;

    let unknown = || CliError::ConfigError {
        message: format!("Unknown config key: '{key}'"),
        source: None,
    };

    let (section, field) = key.split_once('.').ok_or_else(unknown)?;
    let Value::Object(fields) = tree.get(section).ok_or_else(unknown)? else {
        return Err(unknown());
    };

    match fields.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Object(_)) | Some(Value::Array(_)) => Err(unknown()),
        Some(other) => Ok(other.to_string()),
        // skipped when unset
        None if section == "workflow" && field == "shell" => Ok(String::new()),
        None => Err(unknown()),
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn get_known_key() {
        let cfg = AppConfig::default();
        assert_eq!(
            get_config_value(&cfg, "workflow.default_file").unwrap(),
            "steprun.json"
        );
        assert_eq!(get_config_value(&cfg, "output.format").unwrap(), "human");
    }

    #[test]
    fn get_unknown_key_is_error() {
        let cfg = AppConfig::default();
        for key in ["does.not.exist", "workflow", "output.missing", "workflow.default_file.x"] {
            assert!(
                matches!(get_config_value(&cfg, key), Err(CliError::ConfigError { .. })),
                "{key}"
            );
        }
    }

    #[test]
    fn get_bool_and_unset_values() {
        let mut cfg = AppConfig::default();
        assert_eq!(get_config_value(&cfg, "output.no_color").unwrap(), "false");
        assert_eq!(get_config_value(&cfg, "placeholders.builtins").unwrap(), "true");
        assert_eq!(get_config_value(&cfg, "workflow.shell").unwrap(), "");

        cfg.workflow.shell = Some("bash".into());
        assert_eq!(get_config_value(&cfg, "workflow.shell").unwrap(), "bash");
    }
}
