use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use thiserror::Error;

use super::{ANSWER_PREFIX, UUID_NAME};
use crate::domain::{answers::AnswerMap, error::DomainError};

/// Failure reported by a placeholder generator.
///
/// Never fatal: the resolver turns it into a warning and leaves the token
/// in place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct GeneratorError(String);

impl GeneratorError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }

    pub fn reason(&self) -> &str {
        &self.0
    }
}

/// Produces the value of a dynamic placeholder.
///
/// Generators may be impure (clock, counters, subprocesses). Closures of
/// the shape `Fn(&AnswerMap) -> Result<String, GeneratorError>` implement
/// this trait.
pub trait PlaceholderGenerator: Send + Sync {
    fn generate(&self, answers: &AnswerMap) -> Result<String, GeneratorError>;
}

impl<F> PlaceholderGenerator for F
where
    F: Fn(&AnswerMap) -> Result<String, GeneratorError> + Send + Sync,
{
    fn generate(&self, answers: &AnswerMap) -> Result<String, GeneratorError> {
        self(answers)
    }
}

/// Frozen set of dynamic placeholders.
///
/// Built once through [`PlaceholderRegistryBuilder`] before any step runs
/// and read-only afterwards. Cloning is cheap: generators are shared.
#[derive(Clone, Default)]
pub struct PlaceholderRegistry {
    generators: IndexMap<String, Arc<dyn PlaceholderGenerator>>,
}

impl PlaceholderRegistry {
    pub fn builder() -> PlaceholderRegistryBuilder {
        PlaceholderRegistryBuilder::default()
    }

    /// Registry with no dynamic placeholders.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn PlaceholderGenerator>> {
        self.generators.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.generators.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.generators.keys().map(String::as_str)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn PlaceholderGenerator>)> {
        self.generators.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}

impl fmt::Debug for PlaceholderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaceholderRegistry")
            .field("names", &self.generators.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Setup-phase builder for [`PlaceholderRegistry`].
///
/// Each name can be registered exactly once.
#[derive(Default)]
pub struct PlaceholderRegistryBuilder {
    generators: IndexMap<String, Arc<dyn PlaceholderGenerator>>,
}

impl PlaceholderRegistryBuilder {
    /// Register a generator under `name`.
    ///
    /// # Errors
    ///
    /// - `ReservedPlaceholder` for `UUIDv4` and `ANS:*`
    /// - `InvalidPlaceholderName` for empty names or names with `[`, `]`, `\`
    /// - `DuplicatePlaceholder` if `name` was already registered
    pub fn register<G>(&mut self, name: impl Into<String>, generator: G) -> Result<(), DomainError>
    where
        G: PlaceholderGenerator + 'static,
    {
        let name = name.into();
        validate_name(&name)?;

        if self.generators.contains_key(&name) {
            return Err(DomainError::DuplicatePlaceholder { name });
        }

        if !is_upper_snake(&name) {
            tracing::debug!(placeholder = %name, "Placeholder name is not UPPER_SNAKE_CASE");
        }

        self.generators.insert(name, Arc::new(generator));
        Ok(())
    }

    /// Fluent variant of [`Self::register`].
    pub fn with<G>(mut self, name: impl Into<String>, generator: G) -> Result<Self, DomainError>
    where
        G: PlaceholderGenerator + 'static,
    {
        self.register(name, generator)?;
        Ok(self)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.generators.contains_key(name)
    }

    pub fn build(self) -> PlaceholderRegistry {
        PlaceholderRegistry {
            generators: self.generators,
        }
    }
}

/// Check a dynamic placeholder name against the token grammar.
pub(crate) fn validate_name(name: &str) -> Result<(), DomainError> {
    if name == UUID_NAME || name.starts_with(ANSWER_PREFIX) {
        return Err(DomainError::ReservedPlaceholder { name: name.into() });
    }

    let reason = if name.is_empty() {
        Some("name cannot be empty")
    } else if name.contains(['[', ']']) {
        Some("name cannot contain brackets")
    } else if name.contains('\\') {
        Some("name cannot contain a backslash")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(DomainError::InvalidPlaceholderName {
            name: name.into(),
            reason: reason.into(),
        }),
        None => Ok(()),
    }
}

fn is_upper_snake(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(value: &'static str) -> impl PlaceholderGenerator {
        move |_: &AnswerMap| Ok::<_, GeneratorError>(value.to_string())
    }

    #[test]
    fn registers_in_order() {
        let registry = PlaceholderRegistry::builder()
            .with("B_NAME", constant("b"))
            .unwrap()
            .with("A_NAME", constant("a"))
            .unwrap()
            .build();

        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["B_NAME", "A_NAME"]);
        assert!(registry.contains("A_NAME"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn rejects_duplicates() {
        let mut builder = PlaceholderRegistry::builder();
        builder.register("NAME", constant("1")).unwrap();

        assert_eq!(
            builder.register("NAME", constant("2")),
            Err(DomainError::DuplicatePlaceholder {
                name: "NAME".into()
            })
        );
    }

    #[test]
    fn rejects_builtin_names() {
        let mut builder = PlaceholderRegistry::builder();
        assert!(matches!(
            builder.register("UUIDv4", constant("x")),
            Err(DomainError::ReservedPlaceholder { .. })
        ));
        assert!(matches!(
            builder.register("ANS:name", constant("x")),
            Err(DomainError::ReservedPlaceholder { .. })
        ));
    }

    #[test]
    fn rejects_names_that_break_the_grammar() {
        let mut builder = PlaceholderRegistry::builder();
        for bad in ["", "A]]]", "[B", "C\\D"] {
            assert!(
                matches!(
                    builder.register(bad, constant("x")),
                    Err(DomainError::InvalidPlaceholderName { .. })
                ),
                "accepted: {bad:?}"
            );
        }
    }

    #[test]
    fn lowercase_names_are_allowed() {
        let registry = PlaceholderRegistry::builder()
            .with("lower_case", constant("x"))
            .unwrap()
            .build();
        assert!(registry.contains("lower_case"));
    }
}
