//! Syntax descriptor
//!
//! [`SyntaxConfig`] is the plain, serializable description of one dialect's
//! behavioral axes. [`Syntax`] is the validated, immutable descriptor built from
//! it: construction rejects illegal axis assignments and derives the name
//! corpus, the supported forms and the escape probe set once.
//!
//! Two `Syntax` values never share state. Each owns its corpus, its skip rules
//! and its supplementary generators.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::action::{Axis, RecursiveDepth, VarAction, VarPattern};
use crate::case::TestVector;
use crate::corpus::{escape_probes, names_for, Form, NameCorpus};
use crate::error::SyntaxError;

/// Current config document version.
pub const SYNTAX_CONFIG_VERSION: u32 = 1;

// =============================================================================
// SyntaxConfig
// =============================================================================

/// Canonical axis set of a dialect.
///
/// Case handling is one boolean: `var_case_sensitive = true` means `VAR` and
/// `var` name different variables. Documents using the inverted
/// `var_name_ignorecase` framing are folded into it on deserialization.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawSyntaxConfig")]
pub struct SyntaxConfig {
    pub version: u32,
    /// Recognizes `$VAR`.
    pub named_form: bool,
    /// Recognizes `${VAR}`.
    pub braced_form: bool,
    /// Dollar escape character, `None` if escaping is unsupported.
    pub dollar_escape: Option<char>,
    pub dollar_literal: VarAction,
    pub unclosed_brace: VarAction,
    pub recursive_depth: RecursiveDepth,
    pub var_pattern: VarPattern,
    pub var_invalid: VarAction,
    pub var_unset: VarAction,
    pub var_empty: VarAction,
    pub var_case_sensitive: bool,
    /// Value emitted by `use_substitute`.
    pub substitute: String,
}

impl Default for SyntaxConfig {
    fn default() -> Self {
        Self {
            version: SYNTAX_CONFIG_VERSION,
            named_form: true,
            braced_form: true,
            dollar_escape: None,
            dollar_literal: VarAction::UseOriginal,
            unclosed_brace: VarAction::UseOriginal,
            recursive_depth: RecursiveDepth::default(),
            var_pattern: VarPattern::AsciiIdentifier,
            var_invalid: VarAction::UseOriginal,
            var_unset: VarAction::UseEmpty,
            var_empty: VarAction::UseSubstitute,
            var_case_sensitive: true,
            substitute: String::new(),
        }
    }
}

impl SyntaxConfig {
    /// Configured action for an axis.
    pub fn action(&self, axis: Axis) -> VarAction {
        match axis {
            Axis::DollarLiteral => self.dollar_literal,
            Axis::UnclosedBrace => self.unclosed_brace,
            Axis::VarInvalid => self.var_invalid,
            Axis::VarUnset => self.var_unset,
            Axis::VarEmpty => self.var_empty,
        }
    }

    /// Check every axis against its legal subset and the escape requirement.
    pub fn validate(&self) -> Result<(), SyntaxError> {
        if self.version != SYNTAX_CONFIG_VERSION {
            return Err(SyntaxError::UnsupportedVersion {
                found: self.version,
                expected: SYNTAX_CONFIG_VERSION,
            });
        }
        if !self.named_form && !self.braced_form {
            return Err(SyntaxError::NoForms);
        }

        for axis in Axis::ALL {
            let action = self.action(axis);
            if !axis.accepts(action) {
                return Err(SyntaxError::IllegalAction { axis, action });
            }
            if action.needs_escape() && self.dollar_escape.is_none() {
                return Err(SyntaxError::EscapeRequired { axis });
            }
        }
        Ok(())
    }
}

/// Wire shape accepted from config documents before folding.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSyntaxConfig {
    #[serde(default = "default_version")]
    version: u32,
    named_form: bool,
    braced_form: bool,
    #[serde(default)]
    dollar_escape: Option<EscapeSpec>,
    dollar_literal: VarAction,
    #[serde(default)]
    unclosed_brace: Option<VarAction>,
    #[serde(default)]
    recursive_depth: RecursiveDepth,
    #[serde(default)]
    var_pattern: VarPattern,
    var_invalid: VarAction,
    var_unset: VarAction,
    #[serde(default)]
    var_empty: Option<VarAction>,
    #[serde(default)]
    var_case_sensitive: Option<bool>,
    #[serde(default)]
    var_name_ignorecase: Option<bool>,
    #[serde(default)]
    substitute: String,
}

fn default_version() -> u32 {
    SYNTAX_CONFIG_VERSION
}

/// `'$'`, `null` or `false`.
#[derive(Deserialize)]
#[serde(untagged)]
enum EscapeSpec {
    Char(char),
    Flag(bool),
}

impl TryFrom<RawSyntaxConfig> for SyntaxConfig {
    type Error = SyntaxError;

    fn try_from(raw: RawSyntaxConfig) -> Result<Self, Self::Error> {
        let var_case_sensitive = match (raw.var_case_sensitive, raw.var_name_ignorecase) {
            (Some(sensitive), Some(ignorecase)) if sensitive == ignorecase => {
                return Err(SyntaxError::ContradictoryCaseHandling {
                    sensitive,
                    ignorecase,
                })
            }
            (Some(sensitive), _) => sensitive,
            (None, Some(ignorecase)) => !ignorecase,
            (None, None) => true,
        };

        let dollar_escape = match raw.dollar_escape {
            Some(EscapeSpec::Char(c)) => Some(c),
            Some(EscapeSpec::Flag(false)) | None => None,
            Some(EscapeSpec::Flag(true)) => return Err(SyntaxError::EscapeFlagWithoutChar),
        };

        Ok(SyntaxConfig {
            version: raw.version,
            named_form: raw.named_form,
            braced_form: raw.braced_form,
            dollar_escape,
            dollar_literal: raw.dollar_literal,
            unclosed_brace: raw.unclosed_brace.unwrap_or(raw.dollar_literal),
            recursive_depth: raw.recursive_depth,
            var_pattern: raw.var_pattern,
            var_invalid: raw.var_invalid,
            var_unset: raw.var_unset,
            var_empty: raw.var_empty.unwrap_or(VarAction::UseSubstitute),
            var_case_sensitive,
            substitute: raw.substitute,
        })
    }
}

// =============================================================================
// Skip rules and supplements
// =============================================================================

/// Marks generated vectors a dialect is known to diverge on.
///
/// Matching vectors are kept and still executed; they only lose the power to
/// fail the suite.
#[derive(Clone, Debug)]
pub struct SkipRule {
    pub reason: String,
    pub predicate: fn(&TestVector) -> bool,
}

impl SkipRule {
    pub fn new(reason: impl Into<String>, predicate: fn(&TestVector) -> bool) -> Self {
        Self {
            reason: reason.into(),
            predicate,
        }
    }

    pub fn matches(&self, vector: &TestVector) -> bool {
        (self.predicate)(vector)
    }
}

/// Hand-authored vectors the systematic passes cannot derive.
///
/// Generated vectors must carry literal expectations and never consult the
/// oracle.
#[derive(Clone, Debug)]
pub struct Supplement {
    pub name: String,
    pub generate: fn(&Syntax) -> Vec<TestVector>,
}

impl Supplement {
    pub fn new(name: impl Into<String>, generate: fn(&Syntax) -> Vec<TestVector>) -> Self {
        Self {
            name: name.into(),
            generate,
        }
    }
}

// =============================================================================
// Syntax
// =============================================================================

/// Validated, immutable dialect descriptor.
#[derive(Clone, Debug)]
pub struct Syntax {
    config: SyntaxConfig,
    corpus: NameCorpus,
    supported: Vec<Form>,
    unsupported: Vec<Form>,
    probes: Vec<char>,
    skip: Vec<SkipRule>,
    more: Vec<Supplement>,
}

impl Syntax {
    /// Validate `config` and derive the corpus. No skip rules or supplements.
    pub fn new(config: SyntaxConfig) -> Result<Self, SyntaxError> {
        SyntaxBuilder::from_config(config).build()
    }

    pub fn builder() -> SyntaxBuilder {
        SyntaxBuilder::default()
    }

    pub fn config(&self) -> &SyntaxConfig {
        &self.config
    }

    pub fn corpus(&self) -> &NameCorpus {
        &self.corpus
    }

    /// Forms the dialect recognizes, in `Named`, `Braced` order.
    pub fn supported_forms(&self) -> &[Form] {
        &self.supported
    }

    /// Forms the dialect treats as literal text.
    pub fn unsupported_forms(&self) -> &[Form] {
        &self.unsupported
    }

    /// Recognized forms first, then unrecognized ones.
    pub fn all_forms(&self) -> impl Iterator<Item = Form> + '_ {
        self.supported
            .iter()
            .chain(self.unsupported.iter())
            .copied()
    }

    pub fn supports(&self, form: Form) -> bool {
        self.supported.contains(&form)
    }

    pub fn escape_probes(&self) -> &[char] {
        &self.probes
    }

    pub fn skip_rules(&self) -> &[SkipRule] {
        &self.skip
    }

    pub fn supplements(&self) -> &[Supplement] {
        &self.more
    }

    pub fn action(&self, axis: Axis) -> VarAction {
        self.config.action(axis)
    }

    pub fn named_form(&self) -> bool {
        self.config.named_form
    }

    pub fn braced_form(&self) -> bool {
        self.config.braced_form
    }

    pub fn dollar_escape(&self) -> Option<char> {
        self.config.dollar_escape
    }

    pub fn dollar_literal(&self) -> VarAction {
        self.config.dollar_literal
    }

    pub fn unclosed_brace(&self) -> VarAction {
        self.config.unclosed_brace
    }

    pub fn recursive_depth(&self) -> RecursiveDepth {
        self.config.recursive_depth
    }

    pub fn var_pattern(&self) -> VarPattern {
        self.config.var_pattern
    }

    pub fn var_invalid(&self) -> VarAction {
        self.config.var_invalid
    }

    pub fn var_unset(&self) -> VarAction {
        self.config.var_unset
    }

    pub fn var_empty(&self) -> VarAction {
        self.config.var_empty
    }

    pub fn var_case_sensitive(&self) -> bool {
        self.config.var_case_sensitive
    }

    pub fn substitute(&self) -> &str {
        &self.config.substitute
    }
}

/// Builder for [`Syntax`]. Starts from [`SyntaxConfig::default`].
///
/// An `unclosed_brace` left unset follows `dollar_literal`, as it does when
/// omitted from a config document.
#[derive(Clone, Debug, Default)]
pub struct SyntaxBuilder {
    config: SyntaxConfig,
    unclosed_brace: Option<VarAction>,
    skip: Vec<SkipRule>,
    more: Vec<Supplement>,
}

impl SyntaxBuilder {
    /// Start from a complete config; its `unclosed_brace` is taken as set.
    pub fn from_config(config: SyntaxConfig) -> Self {
        Self {
            unclosed_brace: Some(config.unclosed_brace),
            config,
            ..Default::default()
        }
    }

    pub fn named_form(mut self, on: bool) -> Self {
        self.config.named_form = on;
        self
    }

    pub fn braced_form(mut self, on: bool) -> Self {
        self.config.braced_form = on;
        self
    }

    pub fn dollar_escape(mut self, escape: Option<char>) -> Self {
        self.config.dollar_escape = escape;
        self
    }

    pub fn dollar_literal(mut self, action: VarAction) -> Self {
        self.config.dollar_literal = action;
        self
    }

    pub fn unclosed_brace(mut self, action: VarAction) -> Self {
        self.unclosed_brace = Some(action);
        self
    }

    pub fn recursive_depth(mut self, depth: RecursiveDepth) -> Self {
        self.config.recursive_depth = depth;
        self
    }

    pub fn var_pattern(mut self, pattern: VarPattern) -> Self {
        self.config.var_pattern = pattern;
        self
    }

    pub fn var_invalid(mut self, action: VarAction) -> Self {
        self.config.var_invalid = action;
        self
    }

    pub fn var_unset(mut self, action: VarAction) -> Self {
        self.config.var_unset = action;
        self
    }

    pub fn var_empty(mut self, action: VarAction) -> Self {
        self.config.var_empty = action;
        self
    }

    pub fn var_case_sensitive(mut self, sensitive: bool) -> Self {
        self.config.var_case_sensitive = sensitive;
        self
    }

    pub fn substitute(mut self, value: impl Into<String>) -> Self {
        self.config.substitute = value.into();
        self
    }

    pub fn skip(mut self, rule: SkipRule) -> Self {
        self.skip.push(rule);
        self
    }

    pub fn more(mut self, supplement: Supplement) -> Self {
        self.more.push(supplement);
        self
    }

    pub fn build(self) -> Result<Syntax, SyntaxError> {
        let mut config = self.config;
        config.unclosed_brace = self.unclosed_brace.unwrap_or(config.dollar_literal);
        config.validate()?;

        let (supported, unsupported): (Vec<Form>, Vec<Form>) =
            Form::ALL.into_iter().partition(|form| match form {
                Form::Named => config.named_form,
                Form::Braced => config.braced_form,
            });

        debug!(
            forms = ?supported,
            escape = ?config.dollar_escape,
            depth = %config.recursive_depth,
            pattern = ?config.var_pattern,
            skip_rules = self.skip.len(),
            supplements = self.more.len(),
            "Syntax descriptor built"
        );

        Ok(Syntax {
            corpus: names_for(config.var_pattern),
            probes: escape_probes(config.dollar_escape),
            supported,
            unsupported,
            config,
            skip: self.skip,
            more: self.more,
        })
    }
}
