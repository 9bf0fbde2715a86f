//! vsub-matrix
//!
//! Conformance vectors for dollar-variable substitution tools. The semantics
//! model, oracle and generator live in [`vsub_core`]; this crate adds the
//! dialects shipped with it, YAML profiles, and the verdict layer a runner
//! uses to judge what a tool returned.
//!
//! ```
//! use vsub_matrix::dialects::compose;
//! use vsub_matrix::verdict::{MatrixReport, Observed};
//! use vsub_matrix::Matrix;
//!
//! let syntax = compose().unwrap();
//! let mut report = MatrixReport::new("compose");
//! for vector in Matrix::new(&syntax).vectors().take(3) {
//!     let vector = vector.unwrap();
//!     // a runner would execute the tool here
//!     let observed = match vector.expected.as_output() {
//!         Some(text) => Observed::output(text),
//!         None => Observed::failure("rejected"),
//!     };
//!     report.record(vector, observed);
//! }
//! assert!(report.is_clean());
//! ```

pub mod config;
pub mod dialects;
pub mod error;
pub mod verdict;

pub use config::{parse_profile, LoadedProfile, ProfileLoader};
pub use dialects::Dialect;
pub use error::ProfileError;
pub use verdict::{judge, MatrixReport, Observed, ReportEntry, ReportSummary, Verdict};

pub use vsub_core::{
    Case, Expected, Matrix, Pass, RecursiveDepth, Syntax, SyntaxConfig, SyntaxError, TestVector,
    VarAction, VarPattern,
};
