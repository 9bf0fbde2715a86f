//! Name corpus and surface forms
//!
//! Fixed variable-name fixtures split by identifier policy, the probe set of
//! candidate escape characters, and the two dollar forms a name is rendered in.

use serde::{Deserialize, Serialize};

use crate::action::VarPattern;

const ASCII_IDENT: [&str; 3] = ["VAR_1", "_VAR", "_1VAR"];
const UNICODE_IDENT: [&str; 2] = ["ПРМ", "木"];
const DIGIT: [&str; 2] = ["1VAR", "1"];
// `}` is kept to tell "not a name at all" apart from "a name the dialect rejects".
const SPECIAL: [&str; 3] = ["-", "@", "}"];

/// Escape characters probed for every dialect.
const WELL_KNOWN_ESCAPES: [char; 2] = ['$', '\\'];

/// Valid and invalid variable names for one identifier policy.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NameCorpus {
    pub valid: Vec<String>,
    pub invalid: Vec<String>,
}

impl NameCorpus {
    /// Valid names first, then invalid ones.
    pub fn all(&self) -> impl Iterator<Item = &str> + '_ {
        self.valid
            .iter()
            .chain(self.invalid.iter())
            .map(String::as_str)
    }

    pub fn is_valid(&self, name: &str) -> bool {
        self.valid.iter().any(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.valid.len() + self.invalid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Canonical name fixtures for an identifier policy.
///
/// Under `UnicodeIdentifier` the Unicode names move from the invalid list to
/// the valid one; digit-leading and special shapes stay invalid in both.
pub fn names_for(pattern: VarPattern) -> NameCorpus {
    let owned = |names: &[&str]| names.iter().map(|n| n.to_string()).collect::<Vec<_>>();

    match pattern {
        VarPattern::AsciiIdentifier => NameCorpus {
            valid: owned(&ASCII_IDENT),
            invalid: [owned(&UNICODE_IDENT), owned(&DIGIT), owned(&SPECIAL)].concat(),
        },
        VarPattern::UnicodeIdentifier => NameCorpus {
            valid: [owned(&ASCII_IDENT), owned(&UNICODE_IDENT)].concat(),
            invalid: [owned(&DIGIT), owned(&SPECIAL)].concat(),
        },
    }
}

/// Whether `name` is a syntactically valid variable name under `pattern`.
///
/// ASCII: `[A-Za-z_][A-Za-z0-9_]*`. Unicode: same shape with any alphabetic
/// start character and any alphanumeric continuation.
pub fn is_identifier(pattern: VarPattern, name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    match pattern {
        VarPattern::AsciiIdentifier => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        VarPattern::UnicodeIdentifier => {
            (first.is_alphabetic() || first == '_')
                && chars.all(|c| c.is_alphanumeric() || c == '_')
        }
    }
}

/// Characters to try as dollar escapes: `$`, backslash, then the dialect's
/// own escape if it is neither.
pub fn escape_probes(escape: Option<char>) -> Vec<char> {
    let mut probes = WELL_KNOWN_ESCAPES.to_vec();
    if let Some(esc) = escape {
        if !probes.contains(&esc) {
            probes.push(esc);
        }
    }
    probes
}

/// Surface syntax for referencing a variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Form {
    /// `$NAME`
    Named,
    /// `${NAME}`
    Braced,
}

const TEMPLATE_NAME: &str = "NAME";

impl Form {
    pub const ALL: [Form; 2] = [Form::Named, Form::Braced];

    /// Reference shape with `NAME` standing for the variable name.
    pub fn template(self) -> &'static str {
        match self {
            Form::Named => "$NAME",
            Form::Braced => "${NAME}",
        }
    }

    pub fn render(self, name: &str) -> String {
        self.template().replacen(TEMPLATE_NAME, name, 1)
    }

    /// `${NAME` with the closing brace missing.
    pub fn render_unclosed(name: &str) -> String {
        format!("${{{}", name)
    }
}
