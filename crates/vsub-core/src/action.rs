//! Behavioral axes and the closed action set they resolve to.
//!
//! Every configurable behavior of a dialect is an [`Axis`]. For a given input
//! an axis resolves to exactly one [`VarAction`], and each axis accepts only a
//! subset of the action set (see [`Axis::legal_actions`]).

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Outcome of a behavioral axis for one input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarAction {
    /// Emit the input unchanged.
    UseOriginal,
    /// Emit the input with the escape character inserted before the first
    /// unescaped dollar.
    UseEscaped,
    /// Emit an empty string.
    UseEmpty,
    /// Emit the dialect's configured substitute value.
    UseSubstitute,
    /// The substitution must fail.
    Error,
}

impl VarAction {
    pub const ALL: [VarAction; 5] = [
        VarAction::UseOriginal,
        VarAction::UseEscaped,
        VarAction::UseEmpty,
        VarAction::UseSubstitute,
        VarAction::Error,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VarAction::UseOriginal => "use_original",
            VarAction::UseEscaped => "use_escaped",
            VarAction::UseEmpty => "use_empty",
            VarAction::UseSubstitute => "use_substitute",
            VarAction::Error => "error",
        }
    }

    /// Whether producing this outcome needs a configured escape character.
    pub fn needs_escape(self) -> bool {
        matches!(self, VarAction::UseEscaped)
    }
}

impl fmt::Display for VarAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One independent behavior dimension of a dialect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Unescaped `$` followed by content that is not a variable reference.
    DollarLiteral,
    /// `${` without a closing brace.
    UnclosedBrace,
    /// Braced reference whose name the dialect rejects.
    VarInvalid,
    /// Reference to a variable missing from the environment.
    VarUnset,
    /// Reference to a variable bound to the empty string.
    VarEmpty,
}

impl Axis {
    pub const ALL: [Axis; 5] = [
        Axis::DollarLiteral,
        Axis::UnclosedBrace,
        Axis::VarInvalid,
        Axis::VarUnset,
        Axis::VarEmpty,
    ];

    /// Actions this axis may be configured with.
    ///
    /// A lone dollar can be kept, quoted or rejected but never replaced by a
    /// value; an unset variable has no text to escape.
    pub fn legal_actions(self) -> &'static [VarAction] {
        use VarAction::*;
        match self {
            Axis::DollarLiteral | Axis::UnclosedBrace => &[UseOriginal, UseEscaped, Error],
            Axis::VarInvalid => &[UseOriginal, UseEscaped, UseEmpty, Error],
            Axis::VarUnset | Axis::VarEmpty => &[UseOriginal, UseEmpty, UseSubstitute, Error],
        }
    }

    pub fn accepts(self, action: VarAction) -> bool {
        self.legal_actions().contains(&action)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Axis::DollarLiteral => "dollar_literal",
            Axis::UnclosedBrace => "unclosed_brace",
            Axis::VarInvalid => "var_invalid",
            Axis::VarUnset => "var_unset",
            Axis::VarEmpty => "var_empty",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier policy: which corpus names count as valid variable names.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarPattern {
    #[default]
    AsciiIdentifier,
    UnicodeIdentifier,
}

/// How many substitution levels are applied before a result is frozen.
///
/// `Passes(0)` disables substitution entirely. `Passes(1)` expands references
/// in the input but not references found inside substituted values; each
/// further pass expands one more level of nesting. `Unbounded` iterates to a
/// fixed point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecursiveDepth {
    Passes(u32),
    Unbounded,
}

impl Default for RecursiveDepth {
    fn default() -> Self {
        RecursiveDepth::Passes(1)
    }
}

impl RecursiveDepth {
    pub fn is_disabled(self) -> bool {
        matches!(self, RecursiveDepth::Passes(0))
    }

    /// Whether `levels` nested expansions all happen at this depth.
    pub fn reaches(self, levels: u32) -> bool {
        match self {
            RecursiveDepth::Passes(n) => n >= levels,
            RecursiveDepth::Unbounded => true,
        }
    }
}

impl fmt::Display for RecursiveDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecursiveDepth::Passes(n) => write!(f, "{n}"),
            RecursiveDepth::Unbounded => f.write_str("unbounded"),
        }
    }
}

impl Serialize for RecursiveDepth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RecursiveDepth::Passes(n) => serializer.serialize_u32(*n),
            RecursiveDepth::Unbounded => serializer.serialize_str("unbounded"),
        }
    }
}

impl<'de> Deserialize<'de> for RecursiveDepth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Count(u32),
            Word(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Count(n) => Ok(RecursiveDepth::Passes(n)),
            Raw::Word(w) => match w.to_ascii_lowercase().as_str() {
                "unbounded" | "inf" | "infinite" => Ok(RecursiveDepth::Unbounded),
                other => Err(serde::de::Error::custom(format!(
                    "invalid recursive depth '{}': expected a non-negative integer or 'unbounded'",
                    other
                ))),
            },
        }
    }
}
