//! Test vector builder
//!
//! A [`Case`] is a candidate vector under construction: the raw input and the
//! environment it runs against. Calling exactly one `expect_*` method consumes
//! it and yields a finalized [`TestVector`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::action::VarAction;
use crate::error::OracleError;
use crate::oracle::{resolve, Expected};
use crate::syntax::Syntax;

/// Value bound to every variable the generator declares.
pub const SENTINEL_VALUE: &str = "value";

/// Generation pass that produced a vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pass {
    Forms,
    Escapes,
    LiteralDollar,
    UnclosedBrace,
    RecursiveDepth,
    VarUnset,
    VarEmpty,
    CaseSensitivity,
    Supplementary,
}

impl Pass {
    pub const ALL: [Pass; 9] = [
        Pass::Forms,
        Pass::Escapes,
        Pass::LiteralDollar,
        Pass::UnclosedBrace,
        Pass::RecursiveDepth,
        Pass::VarUnset,
        Pass::VarEmpty,
        Pass::CaseSensitivity,
        Pass::Supplementary,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Pass::Forms => "forms",
            Pass::Escapes => "escapes",
            Pass::LiteralDollar => "literal_dollar",
            Pass::UnclosedBrace => "unclosed_brace",
            Pass::RecursiveDepth => "recursive_depth",
            Pass::VarUnset => "var_unset",
            Pass::VarEmpty => "var_empty",
            Pass::CaseSensitivity => "case_sensitivity",
            Pass::Supplementary => "supplementary",
        }
    }
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Pass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pass::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown pass: {}", s))
    }
}

/// Finalized `(input, environment, expected)` triple handed to a runner.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TestVector {
    /// Text handed verbatim to the engine under test.
    pub input: String,
    /// Variable namespace exposed to the engine.
    pub env: BTreeMap<String, String>,
    pub expected: Expected,
    /// Known divergence for this dialect. The vector still runs; a mismatch
    /// is reported but does not fail the suite.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<String>,
    pub pass: Pass,
}

impl TestVector {
    pub fn is_skipped(&self) -> bool {
        self.skip.is_some()
    }

    pub fn with_skip(mut self, reason: impl Into<String>) -> Self {
        self.skip = Some(reason.into());
        self
    }
}

impl fmt::Display for TestVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {:?}", self.pass, self.input)?;
        if !self.env.is_empty() {
            write!(f, " env={:?}", self.env)?;
        }
        match &self.expected {
            Expected::Output(text) => write!(f, " => {:?}", text)?,
            Expected::Failure => write!(f, " => <fail>")?,
        }
        if let Some(reason) = &self.skip {
            write!(f, " (skip: {})", reason)?;
        }
        Ok(())
    }
}

/// Candidate vector under construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Case {
    pub input: String,
    pub env: BTreeMap<String, String>,
    pass: Pass,
}

impl Case {
    pub fn new(pass: Pass, input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            env: BTreeMap::new(),
            pass,
        }
    }

    /// Case whose environment binds `name` to the sentinel value.
    pub fn declaring(pass: Pass, input: impl Into<String>, name: &str) -> Self {
        Self::new(pass, input).with_var(name, SENTINEL_VALUE)
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(name.into(), value.into());
        self
    }

    pub fn pass(&self) -> Pass {
        self.pass
    }

    /// Engine output must equal the input verbatim.
    pub fn expect_input(self) -> TestVector {
        let expected = Expected::output(self.input.clone());
        self.finish(expected, None)
    }

    pub fn expect_value(self, value: impl Into<String>) -> TestVector {
        self.finish(Expected::output(value), None)
    }

    /// Apply the oracle to this case's own input.
    pub fn expect_action(
        self,
        action: VarAction,
        syntax: &Syntax,
    ) -> Result<TestVector, OracleError> {
        let expected = resolve(
            action,
            &self.input,
            syntax.dollar_escape(),
            syntax.substitute(),
        )?;
        Ok(self.finish(expected, None))
    }

    /// Finalize with an outcome composed elsewhere.
    pub fn expect_outcome(self, expected: Expected) -> TestVector {
        self.finish(expected, None)
    }

    pub fn expect_error(self) -> TestVector {
        self.finish(Expected::Failure, None)
    }

    /// Must fail, but the dialect is known to diverge here.
    pub fn expect_error_known(self, reason: impl Into<String>) -> TestVector {
        self.finish(Expected::Failure, Some(reason.into()))
    }

    fn finish(self, expected: Expected, skip: Option<String>) -> TestVector {
        TestVector {
            input: self.input,
            env: self.env,
            expected,
            skip,
            pass: self.pass,
        }
    }
}
