//! Matrix generator
//!
//! Enumerates every test vector a dialect needs, as an explicit pipeline:
//!
//! ```text
//! corpus × forms × probes ──► base passes ──► annotate_skips ──► + supplements
//! ```
//!
//! Every stage is a pure function of the [`Syntax`]; each call to
//! [`Matrix::vectors`] starts a fresh traversal, so the sequence is lazy,
//! finite and restartable, and two equal descriptors yield equal sequences.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::action::RecursiveDepth;
use crate::case::{Case, Pass, TestVector, SENTINEL_VALUE};
use crate::corpus::Form;
use crate::error::OracleError;
use crate::oracle::{classify, reference_outcome, resolve, unescape, Expected, Reference};
use crate::syntax::Syntax;

pub type VectorResult = Result<TestVector, OracleError>;

/// Lazy stream of vectors borrowed from a descriptor.
pub type Vectors<'a> = Box<dyn Iterator<Item = VectorResult> + 'a>;

/// Literal text around lone dollars, for end/middle/adjacent placement.
#[derive(Clone, Copy)]
enum Piece {
    Text(&'static str),
    Dollar,
}

const LITERAL_DOLLAR_LAYOUTS: [&[Piece]; 3] = [
    // last character
    &[Piece::Text("x"), Piece::Dollar],
    // middle, followed by a non-name character
    &[Piece::Text("x"), Piece::Dollar, Piece::Text(" y")],
    // two lone dollars
    &[Piece::Dollar, Piece::Text(" "), Piece::Dollar],
];

/// Depth 0 performs no substitution: every input comes back verbatim.
fn frozen(syntax: &Syntax) -> bool {
    syntax.recursive_depth().is_disabled()
}

// =============================================================================
// Passes
// =============================================================================

/// Pass 1: every form × every corpus name, bound to the sentinel value.
pub fn form_vectors(syntax: &Syntax) -> impl Iterator<Item = VectorResult> + '_ {
    syntax.all_forms().flat_map(move |form| {
        syntax.corpus().all().map(move |name| {
            let case = Case::declaring(Pass::Forms, form.render(name), name);
            if frozen(syntax) {
                return Ok(case.expect_input());
            }
            match classify(syntax, form, name) {
                Reference::Variable => Ok(case.expect_value(SENTINEL_VALUE)),
                Reference::InvalidName => case.expect_action(syntax.var_invalid(), syntax),
                Reference::LiteralDollar => case.expect_action(syntax.dollar_literal(), syntax),
            }
        })
    })
}

/// Pass 2: every pass-1 input prefixed with every probe escape character.
///
/// The configured escape is consumed and suppresses substitution. Any other
/// probe is inert: a `$` probe is a lone dollar of its own, anything else is
/// plain text in front of the pass-1 outcome.
pub fn escape_vectors(syntax: &Syntax) -> impl Iterator<Item = VectorResult> + '_ {
    syntax.all_forms().flat_map(move |form| {
        syntax.corpus().all().flat_map(move |name| {
            syntax.escape_probes().iter().map(move |&probe| {
                let reference = form.render(name);
                let case = Case::declaring(Pass::Escapes, format!("{probe}{reference}"), name);
                if frozen(syntax) {
                    return Ok(case.expect_input());
                }
                if syntax.dollar_escape() == Some(probe) {
                    return Ok(case.expect_value(reference));
                }
                let head = if probe == '$' {
                    lone_dollar(syntax)?
                } else {
                    Expected::output(probe.to_string())
                };
                let tail = reference_outcome(syntax, form, name, &case.env)?;
                Ok(case.expect_outcome(head.then(tail)))
            })
        })
    })
}

/// Pass 3a: lone dollars at the end, in the middle and side by side, plain
/// and escaped.
pub fn literal_dollar_vectors(syntax: &Syntax) -> impl Iterator<Item = VectorResult> + '_ {
    LITERAL_DOLLAR_LAYOUTS.into_iter().flat_map(move |layout| {
        let escaped = syntax
            .dollar_escape()
            .map(|esc| Ok(finalize_escaped(syntax, literal_dollar_escaped(layout, esc), esc)));
        std::iter::once(literal_dollar_plain(syntax, layout)).chain(escaped)
    })
}

fn literal_dollar_plain(syntax: &Syntax, layout: &[Piece]) -> VectorResult {
    let input: String = layout
        .iter()
        .map(|piece| match piece {
            Piece::Text(text) => *text,
            Piece::Dollar => "$",
        })
        .collect();
    let case = Case::new(Pass::LiteralDollar, input);
    if frozen(syntax) {
        return Ok(case.expect_input());
    }

    let mut expected = Expected::output("");
    for piece in layout {
        expected = match piece {
            Piece::Text(text) => expected.then(Expected::output(*text)),
            Piece::Dollar => expected.then(lone_dollar(syntax)?),
        };
    }
    Ok(case.expect_outcome(expected))
}

fn literal_dollar_escaped(layout: &[Piece], esc: char) -> Case {
    let mut input = String::new();
    for piece in layout {
        match piece {
            Piece::Text(text) => input.push_str(text),
            Piece::Dollar => {
                input.push(esc);
                input.push('$');
            }
        }
    }
    Case::new(Pass::LiteralDollar, input)
}

/// Every escaped dollar comes back as a plain one.
fn finalize_escaped(syntax: &Syntax, case: Case, esc: char) -> TestVector {
    if frozen(syntax) {
        return case.expect_input();
    }
    let consumed = unescape(&case.input, esc);
    case.expect_value(consumed)
}

/// Outcome of one `$` that starts no reference.
fn lone_dollar(syntax: &Syntax) -> Result<Expected, OracleError> {
    resolve(
        syntax.dollar_literal(),
        "$",
        syntax.dollar_escape(),
        syntax.substitute(),
    )
}

/// Pass 3b: `${NAME` without its closing brace, plain and escaped.
///
/// Without braced-form support `${` is a lone dollar followed by text.
pub fn unclosed_brace_vectors(syntax: &Syntax) -> impl Iterator<Item = VectorResult> + '_ {
    syntax.corpus().valid.iter().flat_map(move |name| {
        let unclosed = Form::render_unclosed(name);
        let plain = Case::declaring(Pass::UnclosedBrace, unclosed.clone(), name);
        let plain = if frozen(syntax) {
            Ok(plain.expect_input())
        } else if syntax.supports(Form::Braced) {
            plain.expect_action(syntax.unclosed_brace(), syntax)
        } else {
            plain.expect_action(syntax.dollar_literal(), syntax)
        };

        let escaped = syntax.dollar_escape().map(|esc| {
            let case = Case::declaring(Pass::UnclosedBrace, format!("{esc}{unclosed}"), name);
            Ok(finalize_escaped(syntax, case, esc))
        });

        std::iter::once(plain).chain(escaped)
    })
}

/// Pass 3c: chains of references whose values reference the next name.
///
/// With chain `n0 → ${n1} → ${n2} → value` and depth `d`, the output is the
/// reference to `n_d` while `d` is shorter than the chain, then `value`.
pub fn recursive_vectors(syntax: &Syntax) -> impl Iterator<Item = VectorResult> + '_ {
    let names = &syntax.corpus().valid;
    syntax.supported_forms().iter().map(move |&form| {
        let mut env = BTreeMap::new();
        for pair in names.windows(2) {
            env.insert(pair[0].clone(), form.render(&pair[1]));
        }
        if let Some(last) = names.last() {
            env.insert(last.clone(), SENTINEL_VALUE.to_string());
        }

        let mut case = Case::new(Pass::RecursiveDepth, form.render(&names[0]));
        case.env = env;

        match syntax.recursive_depth() {
            RecursiveDepth::Passes(0) => Ok(case.expect_input()),
            RecursiveDepth::Passes(n) if (n as usize) < names.len() => {
                Ok(case.expect_value(form.render(&names[n as usize])))
            }
            _ => Ok(case.expect_value(SENTINEL_VALUE)),
        }
    })
}

/// Pass 3d: references to variables missing from the environment, plain and
/// escaped.
pub fn unset_vectors(syntax: &Syntax) -> impl Iterator<Item = VectorResult> + '_ {
    syntax.supported_forms().iter().flat_map(move |&form| {
        syntax.corpus().valid.iter().flat_map(move |name| {
            let reference = form.render(name);
            let plain = Case::new(Pass::VarUnset, reference.clone());
            let plain = if frozen(syntax) {
                Ok(plain.expect_input())
            } else {
                plain.expect_action(syntax.var_unset(), syntax)
            };

            let escaped = syntax.dollar_escape().map(|esc| {
                let case = Case::new(Pass::VarUnset, format!("{esc}{reference}"));
                Ok(finalize_escaped(syntax, case, esc))
            });

            std::iter::once(plain).chain(escaped)
        })
    })
}

/// Pass 3e: references to variables bound to the empty string.
pub fn empty_vectors(syntax: &Syntax) -> impl Iterator<Item = VectorResult> + '_ {
    syntax.supported_forms().iter().flat_map(move |&form| {
        syntax.corpus().valid.iter().map(move |name| {
            let case = Case::new(Pass::VarEmpty, form.render(name)).with_var(name.clone(), "");
            if frozen(syntax) {
                Ok(case.expect_input())
            } else {
                case.expect_action(syntax.var_empty(), syntax)
            }
        })
    })
}

/// Pass 4: the declared name and the environment key differ only in case.
///
/// Names without case distinction (`木`) cannot probe this and are left out.
pub fn case_vectors(syntax: &Syntax) -> impl Iterator<Item = VectorResult> + '_ {
    syntax.supported_forms().iter().flat_map(move |&form| {
        syntax
            .corpus()
            .valid
            .iter()
            .filter(|name| name.to_uppercase() != name.to_lowercase())
            .flat_map(move |name| {
                let (upper, lower) = (name.to_uppercase(), name.to_lowercase());
                [
                    Case::new(Pass::CaseSensitivity, form.render(&upper))
                        .with_var(lower.clone(), SENTINEL_VALUE),
                    Case::new(Pass::CaseSensitivity, form.render(&lower))
                        .with_var(upper, SENTINEL_VALUE),
                ]
                .into_iter()
                .map(move |case| {
                    if frozen(syntax) {
                        Ok(case.expect_input())
                    } else if syntax.var_case_sensitive() {
                        case.expect_action(syntax.var_unset(), syntax)
                    } else {
                        Ok(case.expect_value(SENTINEL_VALUE))
                    }
                })
            })
    })
}

/// Hand-authored vectors from the dialect's supplements, tagged as such.
pub fn supplementary_vectors(syntax: &Syntax) -> impl Iterator<Item = VectorResult> + '_ {
    syntax.supplements().iter().flat_map(move |supplement| {
        let vectors = (supplement.generate)(syntax);
        debug!(
            supplement = %supplement.name,
            count = vectors.len(),
            "Supplementary vectors generated"
        );
        vectors.into_iter().map(|mut vector| {
            vector.pass = Pass::Supplementary;
            Ok::<_, OracleError>(vector)
        })
    })
}

/// Vectors of one pass.
pub fn pass_vectors(syntax: &Syntax, pass: Pass) -> Vectors<'_> {
    match pass {
        Pass::Forms => Box::new(form_vectors(syntax)),
        Pass::Escapes => Box::new(escape_vectors(syntax)),
        Pass::LiteralDollar => Box::new(literal_dollar_vectors(syntax)),
        Pass::UnclosedBrace => Box::new(unclosed_brace_vectors(syntax)),
        Pass::RecursiveDepth => Box::new(recursive_vectors(syntax)),
        Pass::VarUnset => Box::new(unset_vectors(syntax)),
        Pass::VarEmpty => Box::new(empty_vectors(syntax)),
        Pass::CaseSensitivity => Box::new(case_vectors(syntax)),
        Pass::Supplementary => Box::new(supplementary_vectors(syntax)),
    }
}

// =============================================================================
// Pipeline stages
// =============================================================================

/// All systematic passes, in [`Pass::ALL`] order.
pub fn base_vectors(syntax: &Syntax) -> Vectors<'_> {
    Box::new(
        Pass::ALL
            .into_iter()
            .filter(|pass| *pass != Pass::Supplementary)
            .flat_map(move |pass| pass_vectors(syntax, pass)),
    )
}

/// Mark vectors matched by a skip rule. Nothing is dropped; the first
/// matching rule supplies the reason.
pub fn annotate_skips<'a, I>(syntax: &'a Syntax, vectors: I) -> impl Iterator<Item = VectorResult> + 'a
where
    I: Iterator<Item = VectorResult> + 'a,
{
    vectors.map(move |result| {
        result.map(|vector| {
            if vector.is_skipped() {
                return vector;
            }
            match syntax.skip_rules().iter().find(|rule| rule.matches(&vector)) {
                Some(rule) => {
                    debug!(input = %vector.input, reason = %rule.reason, "Vector marked as skipped");
                    vector.with_skip(rule.reason.clone())
                }
                None => vector,
            }
        })
    })
}

/// Full vector sequence for a descriptor.
#[derive(Clone, Copy, Debug)]
pub struct Matrix<'a> {
    syntax: &'a Syntax,
}

impl<'a> Matrix<'a> {
    pub fn new(syntax: &'a Syntax) -> Self {
        Self { syntax }
    }

    pub fn syntax(&self) -> &'a Syntax {
        self.syntax
    }

    /// Systematic vectors before skip annotation.
    pub fn base(&self) -> Vectors<'a> {
        base_vectors(self.syntax)
    }

    /// Base vectors with skips annotated, followed by supplements.
    pub fn vectors(&self) -> Vectors<'a> {
        Box::new(
            annotate_skips(self.syntax, base_vectors(self.syntax))
                .chain(supplementary_vectors(self.syntax)),
        )
    }

    /// Vectors of a single pass, skips annotated.
    pub fn pass(&self, pass: Pass) -> Vectors<'a> {
        match pass {
            Pass::Supplementary => pass_vectors(self.syntax, pass),
            _ => Box::new(annotate_skips(self.syntax, pass_vectors(self.syntax, pass))),
        }
    }

    /// Materialize the whole sequence, stopping at the first oracle error.
    pub fn collect(&self) -> Result<Vec<TestVector>, OracleError> {
        let vectors = self.vectors().collect::<Result<Vec<_>, _>>()?;

        let mut per_pass: BTreeMap<Pass, usize> = BTreeMap::new();
        for vector in &vectors {
            *per_pass.entry(vector.pass).or_default() += 1;
        }
        for (pass, count) in &per_pass {
            debug!(pass = %pass, count, "Pass complete");
        }
        info!(
            total = vectors.len(),
            skipped = vectors.iter().filter(|v| v.is_skipped()).count(),
            "Vector matrix generated"
        );

        Ok(vectors)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::action::{Axis, VarAction, VarPattern};
    use crate::syntax::SyntaxConfig;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    // -- Strategy helpers --

    fn arb_action(axis: Axis) -> impl Strategy<Value = VarAction> {
        prop::sample::select(axis.legal_actions())
    }

    fn arb_depth() -> impl Strategy<Value = RecursiveDepth> {
        prop_oneof![
            (0u32..5).prop_map(RecursiveDepth::Passes),
            Just(RecursiveDepth::Unbounded),
        ]
    }

    /// Legal configs only: escape-dependent actions need an escape.
    fn arb_config() -> impl Strategy<Value = SyntaxConfig> {
        (
            (any::<bool>(), any::<bool>()),
            prop_oneof![Just(None), Just(Some('$')), Just(Some('\\')), Just(Some('^'))],
            (
                arb_action(Axis::DollarLiteral),
                arb_action(Axis::UnclosedBrace),
                arb_action(Axis::VarInvalid),
                arb_action(Axis::VarUnset),
                arb_action(Axis::VarEmpty),
            ),
            arb_depth(),
            prop_oneof![
                Just(VarPattern::AsciiIdentifier),
                Just(VarPattern::UnicodeIdentifier)
            ],
            any::<bool>(),
            "[a-z]{0,4}",
        )
            .prop_map(
                |((named, braced), escape, actions, depth, pattern, sensitive, substitute)| {
                    SyntaxConfig {
                        named_form: named,
                        braced_form: braced,
                        dollar_escape: escape,
                        dollar_literal: actions.0,
                        unclosed_brace: actions.1,
                        var_invalid: actions.2,
                        var_unset: actions.3,
                        var_empty: actions.4,
                        recursive_depth: depth,
                        var_pattern: pattern,
                        var_case_sensitive: sensitive,
                        substitute,
                        ..SyntaxConfig::default()
                    }
                },
            )
            .prop_filter("legal config", |config| config.validate().is_ok())
    }

    fn generate(config: &SyntaxConfig) -> Vec<TestVector> {
        let syntax = Syntax::new(config.clone()).unwrap();
        Matrix::new(&syntax).collect().unwrap()
    }

    proptest! {
        /// Structurally equal descriptors yield equal vector sets.
        #[test]
        fn equal_configs_generate_equal_sets(config in arb_config()) {
            let first: BTreeSet<_> = generate(&config).into_iter().collect();
            let second: BTreeSet<_> = generate(&config.clone()).into_iter().collect();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn legal_configs_never_hit_oracle_errors(config in arb_config()) {
            let syntax = Syntax::new(config).unwrap();
            prop_assert!(Matrix::new(&syntax).collect().is_ok());
        }

        #[test]
        fn supported_valid_references_substitute(config in arb_config()) {
            prop_assume!(!config.recursive_depth.is_disabled());
            let syntax = Syntax::new(config).unwrap();
            for form in syntax.supported_forms() {
                for name in &syntax.corpus().valid {
                    let input = form.render(name);
                    let vector = form_vectors(&syntax)
                        .map(Result::unwrap)
                        .find(|v| v.input == input)
                        .unwrap();
                    prop_assert_eq!(vector.expected, Expected::output(SENTINEL_VALUE));
                }
            }
        }

        #[test]
        fn configured_escape_is_consumed(config in arb_config()) {
            prop_assume!(!config.recursive_depth.is_disabled());
            let syntax = Syntax::new(config).unwrap();
            let Some(esc) = syntax.dollar_escape() else {
                return Ok(());
            };
            for vector in escape_vectors(&syntax).map(Result::unwrap) {
                if let Some(reference) = vector.input.strip_prefix(esc) {
                    prop_assert_eq!(&vector.expected, &Expected::output(reference));
                }
            }
        }

        #[test]
        fn case_handling_is_all_or_nothing(config in arb_config()) {
            prop_assume!(!config.recursive_depth.is_disabled());
            let syntax = Syntax::new(config).unwrap();
            for vector in case_vectors(&syntax).map(Result::unwrap) {
                let expected = if syntax.var_case_sensitive() {
                    resolve(
                        syntax.var_unset(),
                        &vector.input,
                        syntax.dollar_escape(),
                        syntax.substitute(),
                    )
                    .unwrap()
                } else {
                    Expected::output(SENTINEL_VALUE)
                };
                prop_assert_eq!(vector.expected, expected);
            }
        }
    }
}
