//! Preset answers from `--answer ID=VALUE` and `--answers FILE`.

use std::fs;
use std::path::Path;

use serde_json::Value;
use steprun_core::domain::{AnswerMap, CONFIRM_NO, CONFIRM_YES};

use crate::error::{CliError, CliResult, IntoCli};

/// Merge the answers file (if any) with `--answer` flags; flags win.
pub fn collect(pairs: &[String], file: Option<&Path>) -> CliResult<AnswerMap> {
    let mut answers = match file {
        Some(path) => from_file(path)?,
        None => AnswerMap::new(),
    };
    for pair in pairs {
        let (id, value) = parse_pair(pair)?;
        answers.insert(id, value);
    }
    Ok(answers)
}

/// `ID=VALUE`; the value may itself contain `=`.
pub fn parse_pair(pair: &str) -> CliResult<(String, String)> {
    match pair.split_once('=') {
        Some((id, value)) if !id.trim().is_empty() => {
            Ok((id.trim().to_string(), value.to_string()))
        }
        _ => Err(CliError::invalid_input(format!(
            "expected ID=VALUE, got '{pair}'"
        ))),
    }
}

/// A JSON object mapping question ids to answers.
///
/// Booleans become `Yes`/`No`, arrays become a comma-joined selection and
/// numbers keep their JSON spelling.
fn from_file(path: &Path) -> CliResult<AnswerMap> {
    let text = fs::read_to_string(path)
        .with_cli_context(|| format!("Failed to read answers file {}", path.display()))?;

    let value: Value = serde_json::from_str(&text).map_err(|e| CliError::InvalidInput {
        message: format!("{} is not valid JSON", path.display()),
        source: Some(Box::new(e)),
    })?;

    let Value::Object(entries) = value else {
        return Err(CliError::invalid_input(format!(
            "{} must contain a JSON object",
            path.display()
        )));
    };

    let mut answers = AnswerMap::new();
    for (id, value) in entries {
        let answer = to_answer(&value).ok_or_else(|| {
            CliError::invalid_input(format!("answer for '{id}' must be a string, boolean, number or list"))
        })?;
        answers.insert(id, answer);
    }
    Ok(answers)
}

fn to_answer(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(true) => Some(CONFIRM_YES.to_string()),
        Value::Bool(false) => Some(CONFIRM_NO.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Some(s.clone()),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(AnswerMap::join_selection),
        Value::Null | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn pairs_split_on_first_equals() {
        assert_eq!(
            parse_pair("query=a=b").unwrap(),
            ("query".to_string(), "a=b".to_string())
        );
        assert_eq!(parse_pair("empty=").unwrap().1, "");
        assert!(parse_pair("novalue").is_err());
        assert!(parse_pair("=x").is_err());
    }

    #[test]
    fn file_values_are_normalised() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("answers.json");
        fs::write(
            &path,
            r#"{ "name": "shop", "ts": true, "port": 8080, "extras": ["Lint", "Test"] }"#,
        )
        .unwrap();

        let answers = collect(&["name=store".to_string()], Some(&path)).unwrap();

        assert_eq!(answers.get("name"), Some("store"));
        assert_eq!(answers.get("ts"), Some("Yes"));
        assert_eq!(answers.get("port"), Some("8080"));
        assert_eq!(answers.get("extras"), Some("Lint, Test"));
    }

    #[test]
    fn non_object_file_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("answers.json");
        fs::write(&path, "[1, 2]").unwrap();

        assert!(matches!(
            collect(&[], Some(&path)),
            Err(CliError::InvalidInput { .. })
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            collect(&[], Some(&temp.path().join("nope.json"))),
            Err(CliError::IoError { .. })
        ));
    }
}
