//! Oracle: action → expected outcome
//!
//! Pure functions predicting what a conforming substitution engine must return.
//! [`resolve`] maps one configured action onto a piece of input text;
//! [`classify`] decides which axis governs a rendered reference, applying the
//! form-first tie-break; [`reference_outcome`] combines the two with an
//! environment lookup.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::action::{Axis, VarAction};
use crate::corpus::{is_identifier, Form};
use crate::error::OracleError;
use crate::syntax::Syntax;

/// Expected result of feeding one input to the engine under test.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expected {
    /// Engine succeeds and produces exactly this text.
    Output(String),
    /// Engine must fail.
    Failure,
}

impl Expected {
    pub fn output(text: impl Into<String>) -> Self {
        Expected::Output(text.into())
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Expected::Failure)
    }

    pub fn as_output(&self) -> Option<&str> {
        match self {
            Expected::Output(text) => Some(text),
            Expected::Failure => None,
        }
    }

    /// Outcome of `self` followed by `next`. A failure on either side fails
    /// the whole input.
    pub fn then(self, next: Expected) -> Expected {
        match (self, next) {
            (Expected::Output(mut head), Expected::Output(tail)) => {
                head.push_str(&tail);
                Expected::Output(head)
            }
            _ => Expected::Failure,
        }
    }

    /// Literal text emitted before this outcome.
    pub fn prefixed(self, prefix: &str) -> Expected {
        Expected::output(prefix).then(self)
    }
}

/// Which axis governs a `(form, name)` reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reference {
    /// A real variable reference; the environment decides.
    Variable,
    /// Recognized form around a name the dialect rejects.
    InvalidName,
    /// Not a reference at all: the dollar is literal text.
    LiteralDollar,
}

impl Reference {
    /// Axis consulted when the reference does not simply substitute.
    pub fn axis(self) -> Option<Axis> {
        match self {
            Reference::Variable => None,
            Reference::InvalidName => Some(Axis::VarInvalid),
            Reference::LiteralDollar => Some(Axis::DollarLiteral),
        }
    }
}

/// Form recognition is checked before name validity: an unsupported form is
/// literal text whatever the name, and only a supported form lets the
/// invalid-name axis apply. A named form around an invalid name is a dollar
/// followed by non-name characters, which is literal as well.
pub fn classify(syntax: &Syntax, form: Form, name: &str) -> Reference {
    if !syntax.supports(form) {
        return Reference::LiteralDollar;
    }
    if is_identifier(syntax.var_pattern(), name) {
        return Reference::Variable;
    }
    match form {
        Form::Braced => Reference::InvalidName,
        Form::Named => Reference::LiteralDollar,
    }
}

/// Map one action onto `text`.
///
/// `escape` is the dialect's escape character; `substitute` is the value
/// emitted by `UseSubstitute`.
pub fn resolve(
    action: VarAction,
    text: &str,
    escape: Option<char>,
    substitute: &str,
) -> Result<Expected, OracleError> {
    match action {
        VarAction::UseOriginal => Ok(Expected::output(text)),
        VarAction::UseEscaped => {
            let esc = escape.ok_or(OracleError::NoEscapeCharacter)?;
            escape_first_dollar(text, esc)
                .map(Expected::Output)
                .ok_or_else(|| OracleError::NothingToEscape {
                    input: text.to_string(),
                })
        }
        VarAction::UseEmpty => Ok(Expected::output("")),
        VarAction::UseSubstitute => Ok(Expected::output(substitute)),
        VarAction::Error => Ok(Expected::Failure),
    }
}

/// Insert `esc` before the first dollar that is not already escaped.
///
/// Returns `None` when every dollar in `text` is already escaped.
pub fn escape_first_dollar(text: &str, esc: char) -> Option<String> {
    let mut chars = text.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if c == esc && matches!(chars.peek(), Some((_, '$'))) {
            chars.next();
            continue;
        }
        if c == '$' {
            let mut out = String::with_capacity(text.len() + esc.len_utf8());
            out.push_str(&text[..idx]);
            out.push(esc);
            out.push_str(&text[idx..]);
            return Some(out);
        }
    }
    None
}

/// Text after the engine consumes every `esc$` pair.
pub fn unescape(text: &str, esc: char) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == esc && chars.peek() == Some(&'$') {
            continue;
        }
        out.push(c);
    }
    out
}

/// Look a variable up honoring the dialect's case handling.
pub fn lookup<'a>(
    syntax: &Syntax,
    env: &'a BTreeMap<String, String>,
    name: &str,
) -> Option<&'a str> {
    if syntax.var_case_sensitive() {
        return env.get(name).map(String::as_str);
    }
    let folded = name.to_lowercase();
    env.iter()
        .find(|(key, _)| key.to_lowercase() == folded)
        .map(|(_, value)| value.as_str())
}

/// Expected outcome of the single reference `form.render(name)` against `env`,
/// with no nested expansion of the substituted value.
pub fn reference_outcome(
    syntax: &Syntax,
    form: Form,
    name: &str,
    env: &BTreeMap<String, String>,
) -> Result<Expected, OracleError> {
    let text = form.render(name);
    let axis = match classify(syntax, form, name) {
        Reference::Variable => match lookup(syntax, env, name) {
            Some("") => Axis::VarEmpty,
            Some(value) => return Ok(Expected::output(value)),
            None => Axis::VarUnset,
        },
        Reference::InvalidName => Axis::VarInvalid,
        Reference::LiteralDollar => Axis::DollarLiteral,
    };
    resolve(
        syntax.action(axis),
        &text,
        syntax.dollar_escape(),
        syntax.substitute(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::VarPattern;
    use pretty_assertions::assert_eq;

    fn env(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_resolve_table() {
        let esc = Some('$');
        assert_eq!(
            resolve(VarAction::UseOriginal, "$-", esc, "").unwrap(),
            Expected::output("$-")
        );
        assert_eq!(
            resolve(VarAction::UseEscaped, "$-", esc, "").unwrap(),
            Expected::output("$$-")
        );
        assert_eq!(
            resolve(VarAction::UseEmpty, "$-", esc, "").unwrap(),
            Expected::output("")
        );
        assert_eq!(
            resolve(VarAction::UseSubstitute, "${X}", esc, "dflt").unwrap(),
            Expected::output("dflt")
        );
        assert_eq!(
            resolve(VarAction::Error, "${X}", esc, "").unwrap(),
            Expected::Failure
        );
    }

    #[test]
    fn test_escaped_needs_escape_and_dollar() {
        assert_eq!(
            resolve(VarAction::UseEscaped, "$-", None, ""),
            Err(OracleError::NoEscapeCharacter)
        );
        assert!(matches!(
            resolve(VarAction::UseEscaped, "plain", Some('$'), ""),
            Err(OracleError::NothingToEscape { .. })
        ));
    }

    #[test]
    fn test_escape_skips_already_escaped_dollar() {
        assert_eq!(escape_first_dollar("\\$a$b", '\\').unwrap(), "\\$a\\$b");
        assert_eq!(escape_first_dollar("\\$1", '$').unwrap(), "\\$$1");
        assert_eq!(escape_first_dollar("$$", '$'), None);
        assert_eq!(escape_first_dollar("木$", '\\').unwrap(), "木\\$");
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("$${VAR_1}", '$'), "${VAR_1}");
        assert_eq!(unescape("\\$VAR_1", '\\'), "$VAR_1");
        assert_eq!(unescape("\\x", '\\'), "\\x");
    }

    #[test]
    fn test_then_failure_absorbs() {
        assert_eq!(
            Expected::output("a").then(Expected::output("b")),
            Expected::output("ab")
        );
        assert_eq!(
            Expected::output("a").then(Expected::Failure),
            Expected::Failure
        );
        assert_eq!(Expected::Failure.prefixed("\\"), Expected::Failure);
        assert_eq!(Expected::output("v").prefixed("\\"), Expected::output("\\v"));
    }

    #[test]
    fn test_classify_checks_form_first() {
        let braced_only = Syntax::builder().named_form(false).build().unwrap();
        assert_eq!(
            classify(&braced_only, Form::Named, "VAR_1"),
            Reference::LiteralDollar
        );
        assert_eq!(
            classify(&braced_only, Form::Braced, "1VAR"),
            Reference::InvalidName
        );

        let named_only = Syntax::builder().braced_form(false).build().unwrap();
        // invalid under a braced form, but braced is not recognized at all
        assert_eq!(
            classify(&named_only, Form::Braced, "1VAR"),
            Reference::LiteralDollar
        );
        assert_eq!(
            classify(&named_only, Form::Named, "1VAR"),
            Reference::LiteralDollar
        );
    }

    #[test]
    fn test_classify_unicode_policy() {
        let ascii = Syntax::builder().build().unwrap();
        let unicode = Syntax::builder()
            .var_pattern(VarPattern::UnicodeIdentifier)
            .build()
            .unwrap();
        assert_eq!(classify(&ascii, Form::Braced, "木"), Reference::InvalidName);
        assert_eq!(classify(&unicode, Form::Braced, "木"), Reference::Variable);
    }

    #[test]
    fn test_lookup_case_handling() {
        let sensitive = Syntax::builder().build().unwrap();
        let insensitive = Syntax::builder().var_case_sensitive(false).build().unwrap();
        let vars = env(&[("var_1", "value")]);
        assert_eq!(lookup(&sensitive, &vars, "VAR_1"), None);
        assert_eq!(lookup(&insensitive, &vars, "VAR_1"), Some("value"));
    }

    #[test]
    fn test_reference_outcome_axes() {
        let syntax = Syntax::builder()
            .dollar_escape(Some('$'))
            .var_invalid(VarAction::Error)
            .var_unset(VarAction::UseSubstitute)
            .var_empty(VarAction::UseOriginal)
            .substitute("dflt")
            .build()
            .unwrap();

        let vars = env(&[("VAR_1", "value"), ("_VAR", "")]);
        assert_eq!(
            reference_outcome(&syntax, Form::Braced, "VAR_1", &vars).unwrap(),
            Expected::output("value")
        );
        assert_eq!(
            reference_outcome(&syntax, Form::Braced, "_1VAR", &vars).unwrap(),
            Expected::output("dflt")
        );
        assert_eq!(
            reference_outcome(&syntax, Form::Named, "_VAR", &vars).unwrap(),
            Expected::output("$_VAR")
        );
        assert_eq!(
            reference_outcome(&syntax, Form::Braced, "1VAR", &vars).unwrap(),
            Expected::Failure
        );
        assert_eq!(
            reference_outcome(&syntax, Form::Named, "1VAR", &vars).unwrap(),
            Expected::output("$1VAR")
        );
    }
}
