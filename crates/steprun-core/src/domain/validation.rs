use std::collections::HashSet;

use crate::domain::{
    error::DomainError,
    placeholder::{contains_placeholder, validate_name},
    workflow::{Question, QuestionKind, Workflow, parse_confirm},
};

/// Centralized domain validation.
///
/// All structural checks on a workflow live here; soft findings are in
/// [`Workflow::diagnostics`].
pub struct DomainValidator;

impl DomainValidator {
    pub fn validate_workflow(workflow: &Workflow) -> Result<(), DomainError> {
        if workflow.steps.is_empty() {
            return Err(DomainError::EmptyWorkflow);
        }

        for name in workflow.placeholders.keys() {
            validate_name(name)?;
        }

        let mut seen = HashSet::new();
        for (index, step) in workflow.steps.iter().enumerate() {
            if let Some(question) = &step.question {
                Self::validate_question(question)?;
                if !seen.insert(question.id.as_str()) {
                    return Err(DomainError::DuplicateQuestion {
                        id: question.id.clone(),
                    });
                }
            }

            for action in &step.actions {
                for (field, value) in action.kind.required_fields() {
                    if value.trim().is_empty() {
                        return Err(DomainError::MissingRequiredField {
                            field,
                            context: format!(
                                "{} action in step {}",
                                action.kind.name(),
                                step.label(index)
                            ),
                        });
                    }
                }
            }
        }

        Ok(())
    }

    pub fn validate_question(question: &Question) -> Result<(), DomainError> {
        if question.id.trim().is_empty() {
            return Err(DomainError::MissingRequiredField {
                field: "id",
                context: format!("question '{}'", question.prompt),
            });
        }

        if question.kind.needs_options() && question.options.is_empty() {
            return Err(DomainError::MissingOptions {
                question_id: question.id.clone(),
                kind: question.kind.to_string(),
            });
        }

        // placeholder defaults are only known after resolution
        let Some(default) = question.default.as_ref().filter(|d| !contains_placeholder(d)) else {
            return Ok(());
        };

        let valid_default = match question.kind {
            QuestionKind::Select => question.options.contains(default),
            QuestionKind::Confirm => parse_confirm(default).is_some(),
            // multiselect defaults are a joined list; text takes anything
            QuestionKind::Multiselect | QuestionKind::Text => true,
        };

        if valid_default {
            Ok(())
        } else {
            Err(DomainError::InvalidDefault {
                question_id: question.id.clone(),
                default: default.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::workflow::{Action, ActionKind, PlaceholderSource, Step};

    fn one_step(question: Question) -> Workflow {
        Workflow::new(vec![Step::ask(question)])
    }

    #[test]
    fn accepts_minimal_workflow() {
        let wf = one_step(Question::text("name", "Name?"));
        assert!(DomainValidator::validate_workflow(&wf).is_ok());
    }

    #[test]
    fn rejects_empty_workflow() {
        assert_eq!(
            DomainValidator::validate_workflow(&Workflow::default()),
            Err(DomainError::EmptyWorkflow)
        );
    }

    #[test]
    fn rejects_duplicate_question_ids() {
        let wf = Workflow::new(vec![
            Step::ask(Question::text("name", "Name?")),
            Step::ask(Question::text("name", "Again?")),
        ]);
        assert_eq!(
            DomainValidator::validate_workflow(&wf),
            Err(DomainError::DuplicateQuestion { id: "name".into() })
        );
    }

    #[test]
    fn select_needs_options_and_a_matching_default() {
        let no_options = one_step(Question::new("fw", "Framework?", QuestionKind::Select));
        assert!(matches!(
            DomainValidator::validate_workflow(&no_options),
            Err(DomainError::MissingOptions { .. })
        ));

        let bad_default = one_step(
            Question::new("fw", "Framework?", QuestionKind::Select)
                .with_options(["React", "Vue"])
                .with_default("Svelte"),
        );
        assert!(matches!(
            DomainValidator::validate_workflow(&bad_default),
            Err(DomainError::InvalidDefault { .. })
        ));
    }

    #[test]
    fn confirm_default_must_be_yes_or_no() {
        for default in ["No", "yes", "y", "FALSE"] {
            let ok = one_step(
                Question::new("git", "Git?", QuestionKind::Confirm).with_default(default),
            );
            assert!(DomainValidator::validate_workflow(&ok).is_ok(), "{default}");
        }

        let bad = one_step(Question::new("git", "Git?", QuestionKind::Confirm).with_default("maybe"));
        assert!(matches!(
            DomainValidator::validate_workflow(&bad),
            Err(DomainError::InvalidDefault { .. })
        ));
    }

    #[test]
    fn placeholder_defaults_are_checked_at_run_time() {
        let select = one_step(
            Question::new("fw", "Framework?", QuestionKind::Select)
                .with_options(["React", "Vue"])
                .with_default("[[[ANS:preferred]]]"),
        );
        assert!(DomainValidator::validate_workflow(&select).is_ok());

        let confirm = one_step(
            Question::new("git", "Git?", QuestionKind::Confirm).with_default("[[[USE_GIT]]]"),
        );
        assert!(DomainValidator::validate_workflow(&confirm).is_ok());
    }

    #[test]
    fn rejects_blank_action_fields() {
        let wf = Workflow::new(vec![Step::act(vec![Action::new(ActionKind::Copy {
            src: "a".into(),
            dest: " ".into(),
            overwrite: false,
        })])]);

        assert!(matches!(
            DomainValidator::validate_workflow(&wf),
            Err(DomainError::MissingRequiredField { field: "dest", .. })
        ));
    }

    #[test]
    fn rejects_reserved_placeholder_declarations() {
        let mut wf = one_step(Question::text("name", "Name?"));
        wf.placeholders
            .insert("UUIDv4".into(), PlaceholderSource::Value("x".into()));

        assert!(matches!(
            DomainValidator::validate_workflow(&wf),
            Err(DomainError::ReservedPlaceholder { .. })
        ));
    }
}
