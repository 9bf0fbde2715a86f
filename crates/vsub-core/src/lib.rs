//! vsub-core: semantics model and test-matrix generator for dollar-variable
//! substitution dialects
//!
//! This crate predicts, it does not substitute. Given a [`Syntax`] describing
//! how one dialect treats `$VAR`, `${VAR}`, escapes, invalid names, unset and
//! empty variables, case and recursion, it derives every [`TestVector`] a
//! conforming engine must satisfy:
//! - Name corpus and surface forms ([`corpus`])
//! - Validated dialect descriptor ([`syntax`])
//! - Action → outcome oracle ([`oracle`])
//! - Vector builder ([`case`])
//! - Pass-by-pass matrix generator ([`matrix`])
//!
//! No I/O happens here. Running vectors against real tools is left to the
//! caller.
//!
//! # Example
//!
//! ```
//! use vsub_core::{Expected, Matrix, Syntax, VarAction};
//!
//! let syntax = Syntax::builder()
//!     .dollar_escape(Some('$'))
//!     .var_invalid(VarAction::Error)
//!     .build()
//!     .unwrap();
//!
//! let vectors = Matrix::new(&syntax).collect().unwrap();
//! let braced = vectors.iter().find(|v| v.input == "${VAR_1}").unwrap();
//! assert_eq!(braced.expected, Expected::Output("value".into()));
//! ```

pub mod action;
pub mod case;
pub mod corpus;
pub mod error;
pub mod matrix;
pub mod oracle;
pub mod syntax;

pub use action::{Axis, RecursiveDepth, VarAction, VarPattern};
pub use case::{Case, Pass, TestVector, SENTINEL_VALUE};
pub use corpus::{escape_probes, is_identifier, names_for, Form, NameCorpus};
pub use error::{OracleError, SyntaxError};
pub use matrix::{Matrix, VectorResult, Vectors};
pub use oracle::{classify, reference_outcome, resolve, Expected, Reference};
pub use syntax::{
    SkipRule, Supplement, Syntax, SyntaxBuilder, SyntaxConfig, SYNTAX_CONFIG_VERSION,
};
