use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::{Captures, Regex};

static DOLLAR_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(?:\{([A-Za-z_][A-Za-z0-9_]*)\}|([A-Za-z_][A-Za-z0-9_]*))")
        .expect("static env pattern is valid")
});

static PERCENT_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%([^%\s]+)%").expect("static env pattern is valid"));

/// Environment reference syntax understood by the expansion stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvSyntax {
    /// `$NAME` and `${NAME}`
    Dollar,
    /// `%NAME%`
    Percent,
}

impl EnvSyntax {
    /// The form used by the host platform's shell.
    pub const fn native() -> Self {
        if cfg!(windows) { Self::Percent } else { Self::Dollar }
    }

    fn pattern(self) -> &'static Regex {
        match self {
            Self::Dollar => &DOLLAR_REF,
            Self::Percent => &PERCENT_REF,
        }
    }
}

/// Variable lookup used during expansion.
///
/// Defaults to the process environment; tests inject a fixed map instead.
#[derive(Clone)]
pub struct EnvLookup(Arc<dyn Fn(&str) -> Option<String> + Send + Sync>);

impl EnvLookup {
    pub fn process() -> Self {
        Self(Arc::new(|name| std::env::var(name).ok()))
    }

    pub fn from_fn<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self(Arc::new(lookup))
    }

    pub fn get(&self, name: &str) -> Option<String> {
        (self.0)(name)
    }
}

impl Default for EnvLookup {
    fn default() -> Self {
        Self::process()
    }
}

impl fmt::Debug for EnvLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EnvLookup(..)")
    }
}

/// Expand environment references; unset variables stay as written.
pub(super) fn expand(text: &str, syntax: EnvSyntax, lookup: &EnvLookup) -> String {
    let pattern = syntax.pattern();
    if !pattern.is_match(text) {
        return text.to_string();
    }

    pattern
        .replace_all(text, |caps: &Captures| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map_or("", |m| m.as_str());
            lookup
                .get(name)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup() -> EnvLookup {
        EnvLookup::from_fn(|name| match name {
            "HOME" => Some("/home/dev".into()),
            "USER_NAME" => Some("dev".into()),
            _ => None,
        })
    }

    #[test]
    fn expands_dollar_forms() {
        let out = expand("$HOME/${USER_NAME}/x", EnvSyntax::Dollar, &lookup());
        assert_eq!(out, "/home/dev/dev/x");
    }

    #[test]
    fn leaves_unset_variables_alone() {
        let out = expand("$MISSING and ${ALSO_MISSING}", EnvSyntax::Dollar, &lookup());
        assert_eq!(out, "$MISSING and ${ALSO_MISSING}");
    }

    #[test]
    fn expands_percent_form() {
        let out = expand("%HOME%\\bin %NOPE%", EnvSyntax::Percent, &lookup());
        assert_eq!(out, "/home/dev\\bin %NOPE%");
    }

    #[test]
    fn lone_sigils_are_untouched() {
        assert_eq!(expand("cost: $5 or 100%", EnvSyntax::Dollar, &lookup()), "cost: $5 or 100%");
        assert_eq!(expand("100% sure", EnvSyntax::Percent, &lookup()), "100% sure");
    }
}
