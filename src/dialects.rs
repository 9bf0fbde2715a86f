//! Built-in dialect profiles
//!
//! Each function returns the validated [`Syntax`] of one substitution tool,
//! including the skip rules and hand-authored vectors that tool needs.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use vsub_core::{
    is_identifier, Case, Pass, RecursiveDepth, SkipRule, Supplement, Syntax, SyntaxBuilder,
    SyntaxError, TestVector, VarAction, VarPattern,
};

use crate::error::ProfileError;

/// An unescaped `$` followed by something that cannot start a name or a
/// brace, or by nothing at all.
static REQUOTED_DOLLAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[^$])\$(?:[^_a-zA-Z{$]|$)").expect("valid regex"));

fn compose_requotes(vector: &TestVector) -> bool {
    REQUOTED_DOLLAR.is_match(&vector.input)
}

/// `$NAME` around a name the resolver rejects comes back re-quoted.
fn compose_named_invalid(syntax: &Syntax) -> Vec<TestVector> {
    syntax
        .corpus()
        .invalid
        .iter()
        .map(|name| {
            Case::new(Pass::Supplementary, format!("${name}")).expect_value(format!("$${name}"))
        })
        .collect()
}

fn unexportable_env(vector: &TestVector) -> bool {
    vector
        .env
        .keys()
        .any(|key| !is_identifier(VarPattern::AsciiIdentifier, key))
}

/// Compose-file resolver: `$$` escapes, strict on malformed references.
pub fn compose() -> Result<Syntax, SyntaxError> {
    Syntax::builder()
        .named_form(true)
        .braced_form(true)
        .dollar_escape(Some('$'))
        .dollar_literal(VarAction::UseOriginal)
        .unclosed_brace(VarAction::Error)
        .recursive_depth(RecursiveDepth::Passes(1))
        .var_pattern(VarPattern::AsciiIdentifier)
        .var_invalid(VarAction::Error)
        .var_unset(VarAction::UseEmpty)
        .var_empty(VarAction::UseSubstitute)
        .var_case_sensitive(true)
        .skip(SkipRule::new(
            "resolver re-quotes a dollar that starts no reference",
            compose_requotes,
        ))
        .more(Supplement::new("named-invalid-requoted", compose_named_invalid))
        .build()
}

/// Compose-file resolver modeled as re-quoting every dollar it keeps literal.
///
/// Same axes as [`compose`] except `dollar_literal = use_escaped`, so the
/// vectors [`compose`] skips carry the re-quoted text as their expectation.
pub fn compose_requote() -> Result<Syntax, SyntaxError> {
    Syntax::builder()
        .named_form(true)
        .braced_form(true)
        .dollar_escape(Some('$'))
        .dollar_literal(VarAction::UseEscaped)
        .unclosed_brace(VarAction::Error)
        .recursive_depth(RecursiveDepth::Passes(1))
        .var_pattern(VarPattern::AsciiIdentifier)
        .var_invalid(VarAction::Error)
        .var_unset(VarAction::UseEmpty)
        .var_empty(VarAction::UseSubstitute)
        .var_case_sensitive(true)
        .build()
}

/// POSIX-style `envsubst`: no escape, anything unrecognized passes through.
pub fn envsubst() -> Result<Syntax, SyntaxError> {
    envsubst_builder().build()
}

/// `envsubst` fed by a shell that sources a `.env` file.
pub fn dotenv_shell() -> Result<Syntax, SyntaxError> {
    envsubst_builder()
        .skip(SkipRule::new(
            "shell cannot export a variable with this name",
            unexportable_env,
        ))
        .build()
}

fn envsubst_builder() -> SyntaxBuilder {
    Syntax::builder()
        .named_form(true)
        .braced_form(true)
        .dollar_escape(None)
        .dollar_literal(VarAction::UseOriginal)
        .unclosed_brace(VarAction::UseOriginal)
        .recursive_depth(RecursiveDepth::Passes(1))
        .var_pattern(VarPattern::AsciiIdentifier)
        .var_invalid(VarAction::UseOriginal)
        .var_unset(VarAction::UseEmpty)
        .var_empty(VarAction::UseSubstitute)
        .var_case_sensitive(true)
}

/// Dialects shipped with the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dialect {
    Compose,
    ComposeRequote,
    Envsubst,
    DotenvShell,
}

impl Dialect {
    pub const ALL: [Dialect; 4] = [
        Dialect::Compose,
        Dialect::ComposeRequote,
        Dialect::Envsubst,
        Dialect::DotenvShell,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Dialect::Compose => "compose",
            Dialect::ComposeRequote => "compose-requote",
            Dialect::Envsubst => "envsubst",
            Dialect::DotenvShell => "dotenv-shell",
        }
    }

    pub fn syntax(self) -> Result<Syntax, SyntaxError> {
        match self {
            Dialect::Compose => compose(),
            Dialect::ComposeRequote => compose_requote(),
            Dialect::Envsubst => envsubst(),
            Dialect::DotenvShell => dotenv_shell(),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.replace('_', "-");
        Dialect::ALL
            .into_iter()
            .find(|d| d.name() == wanted)
            .ok_or_else(|| ProfileError::UnknownDialect(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vsub_core::{Expected, Matrix};

    #[test]
    fn test_builtins_validate() {
        for dialect in Dialect::ALL {
            assert!(dialect.syntax().is_ok(), "{dialect} failed to build");
        }
    }

    #[test]
    fn test_dialect_from_str() {
        assert_eq!("compose".parse::<Dialect>().unwrap(), Dialect::Compose);
        assert_eq!("dotenv_shell".parse::<Dialect>().unwrap(), Dialect::DotenvShell);
        assert_eq!(
            "compose_requote".parse::<Dialect>().unwrap(),
            Dialect::ComposeRequote
        );
        assert!(matches!(
            "bash".parse::<Dialect>(),
            Err(ProfileError::UnknownDialect(name)) if name == "bash"
        ));
    }

    #[test]
    fn test_requote_pattern() {
        for input in ["$1VAR", "\\$1VAR", "x$", "x$ y", "$ $", "${VAR_1}$-"] {
            assert!(REQUOTED_DOLLAR.is_match(input), "{input:?} should match");
        }
        for input in ["$VAR_1", "${1VAR}", "$${VAR_1}", "$$1VAR", "x$$"] {
            assert!(!REQUOTED_DOLLAR.is_match(input), "{input:?} should not match");
        }
    }

    #[test]
    fn test_compose_supplement_literal() {
        let syntax = compose().unwrap();
        let vectors = Matrix::new(&syntax).collect().unwrap();
        let requoted: Vec<_> = vectors
            .iter()
            .filter(|v| v.pass == Pass::Supplementary)
            .collect();
        assert_eq!(requoted.len(), syntax.corpus().invalid.len());
        assert!(requoted
            .iter()
            .any(|v| v.input == "$1VAR" && v.expected == Expected::output("$$1VAR")));
        assert!(requoted.iter().all(|v| v.env.is_empty()));
    }

    #[test]
    fn test_dotenv_shell_skips_unexportable_names() {
        let syntax = dotenv_shell().unwrap();
        let vectors = Matrix::new(&syntax).collect().unwrap();
        let skipped: Vec<_> = vectors.iter().filter(|v| v.is_skipped()).collect();
        assert!(!skipped.is_empty());
        assert!(skipped
            .iter()
            .all(|v| v.env.keys().any(|k| !is_identifier(VarPattern::AsciiIdentifier, k))));
        assert!(vectors.iter().any(|v| v.input == "${VAR_1}" && !v.is_skipped()));
    }
}
