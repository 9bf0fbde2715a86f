//! Typed error model for the semantics core.
//!
//! Two failure classes exist and never mix:
//!
//! ```text
//! SyntaxError  → wrong model, raised while constructing a Syntax (fatal to the dialect)
//! OracleError  → an action applied where it cannot produce an outcome (programming error)
//! ```
//!
//! A tool disagreeing with the oracle is not an error here; that is a
//! verdict, reported per vector by the collaborator.

use crate::action::{Axis, VarAction};

/// Illegal dialect configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    /// Axis assigned an action outside its legal subset.
    #[error("{axis} value is invalid: {action}")]
    IllegalAction { axis: Axis, action: VarAction },

    /// Escape-dependent action configured without an escape character.
    #[error("{axis} = use_escaped requires a dollar escape character")]
    EscapeRequired { axis: Axis },

    /// Config document version this build does not understand.
    #[error("unsupported syntax config version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// Both case-handling framings given with opposite meaning.
    #[error("var_case_sensitive={sensitive} contradicts var_name_ignorecase={ignorecase}")]
    ContradictoryCaseHandling { sensitive: bool, ignorecase: bool },

    /// `dollar_escape: true` given where an escape character was expected.
    #[error("dollar_escape: true names no escape character; give the character or false")]
    EscapeFlagWithoutChar,

    /// Neither `$VAR` nor `${VAR}` recognized.
    #[error("a dialect must recognize at least one of the named or braced forms")]
    NoForms,
}

/// An action that cannot be resolved against a particular input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("use_escaped requested but no escape character is configured")]
    NoEscapeCharacter,

    #[error("use_escaped not applicable: no unescaped dollar in {input:?}")]
    NothingToEscape { input: String },
}
