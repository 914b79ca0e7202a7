//! Placeholder grammar, registry and resolver.
//!
//! ## Token grammar
//!
//! | Token                | Meaning                                        |
//! |----------------------|------------------------------------------------|
//! | `[[[ANS:<id>]]]`     | Answer stored for question `<id>`              |
//! | `[[[UUIDv4]]]`       | Fresh random UUID, one per occurrence          |
//! | `[[[<NAME>]]]`       | Registered dynamic placeholder                 |
//! | `\[[[...]]]`         | Escaped: emitted as literal `[[[...]]]`        |
//!
//! Anything that does not match a rule is left in the output untouched, so a
//! string can be resolved again later (the replace action relies on this).

mod env;
mod registry;
mod resolver;

pub use env::{EnvLookup, EnvSyntax};
pub use registry::{
    GeneratorError, PlaceholderGenerator, PlaceholderRegistry, PlaceholderRegistryBuilder,
};
pub use resolver::{PlaceholderWarning, Resolution, Resolver};

pub(crate) use registry::validate_name;

/// Opening delimiter of every placeholder.
pub const TOKEN_OPEN: &str = "[[[";
/// Closing delimiter of every placeholder.
pub const TOKEN_CLOSE: &str = "]]]";
/// An escaped opening delimiter.
pub const ESCAPED_OPEN: &str = "\\[[[";
/// Prefix of the parameterized answer placeholder.
pub const ANSWER_PREFIX: &str = "ANS:";
/// Name of the per-occurrence UUID placeholder.
pub const UUID_NAME: &str = "UUIDv4";

/// `[[[ANS:<id>]]]`
pub fn answer_token(question_id: &str) -> String {
    format!("{TOKEN_OPEN}{ANSWER_PREFIX}{question_id}{TOKEN_CLOSE}")
}

/// `[[[<name>]]]`
pub fn token(name: &str) -> String {
    format!("{TOKEN_OPEN}{name}{TOKEN_CLOSE}")
}

/// Whether `text` contains anything the resolver would try to substitute.
pub fn contains_placeholder(text: &str) -> bool {
    text.contains(TOKEN_OPEN)
}
