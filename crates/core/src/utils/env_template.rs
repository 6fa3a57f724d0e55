//! `${VAR}` template expansion.
//!
//! Integration definitions may reference environment variables in URLs,
//! header values, request bodies and plugin config values. Resolution happens
//! at execution time, not at definition time, against an explicit lookup.
//!
//! Policy: an undefined variable expands to the empty string. Operators see
//! the same behavior as shell-style expansion, and a missing secret produces
//! an observable (failing) call rather than a hard validation error.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Matches `${NAME}` where NAME is a C-style identifier.
static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("Invalid variable pattern")
});

/// Expands every `${NAME}` in `input` using `lookup`.
///
/// Undefined names expand to `""`. Text outside the `${...}` form is left
/// untouched; a bare `$NAME` is not a reference.
pub fn expand<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    VAR_PATTERN
        .replace_all(input, |caps: &Captures| lookup(&caps[1]).unwrap_or_default())
        .into_owned()
}

/// Expands `${NAME}` references against the process environment.
pub fn expand_env(input: &str) -> String {
    expand(input, |name| std::env::var(name).ok())
}
