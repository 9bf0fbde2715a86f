//! Vector Matrix CLI
//!
//! Emits the conformance vectors of one dialect for an external runner.
//! It never executes the tool under test.
//!
//! Usage:
//!   cargo run --features cli --bin vsub_matrix -- --dialect compose
//!
//! Examples:
//!   # One JSON object per line
//!   cargo run --features cli --bin vsub_matrix -- --dialect envsubst --format jsonl
//!
//!   # Counts per pass from a YAML profile
//!   cargo run --features cli --bin vsub_matrix -- --profile profiles/compose.yaml --format summary
//!
//!   # Only the escape pass
//!   cargo run --features cli --bin vsub_matrix -- --dialect compose --only-pass escapes

use std::collections::BTreeMap;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;

use vsub_matrix::{parse_profile, Dialect, Matrix, Pass, ProfileLoader, Syntax, TestVector};

#[derive(Parser, Debug)]
#[command(name = "vsub_matrix")]
#[command(about = "Generate substitution conformance vectors for a dialect")]
struct Args {
    /// Built-in dialect (compose, compose-requote, envsubst, dotenv-shell)
    #[arg(long, short = 'd', conflicts_with = "profile", required_unless_present = "profile")]
    dialect: Option<Dialect>,

    /// YAML profile: a file path, or a name in VSUB_PROFILE_DIR
    #[arg(long, short = 'p')]
    profile: Option<String>,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value_t = Format::Jsonl)]
    format: Format,

    /// Emit a single pass (e.g. escapes, var_unset, supplementary)
    #[arg(long)]
    only_pass: Option<Pass>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// One vector per line
    Jsonl,
    /// A single JSON array
    Json,
    /// Counts per pass
    Summary,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let (label, syntax) = resolve_syntax(&args)?;
    let matrix = Matrix::new(&syntax);
    let vectors: Vec<TestVector> = match args.only_pass {
        Some(pass) => matrix.pass(pass).collect::<Result<_, _>>()?,
        None => matrix.collect()?,
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match args.format {
        Format::Jsonl => {
            for vector in &vectors {
                serde_json::to_writer(&mut out, vector)?;
                writeln!(out)?;
            }
        }
        Format::Json => {
            serde_json::to_writer_pretty(&mut out, &vectors)?;
            writeln!(out)?;
        }
        Format::Summary => print_summary(&mut out, &label, &vectors)?,
    }
    out.flush()?;
    Ok(())
}

fn resolve_syntax(args: &Args) -> Result<(String, Syntax)> {
    if let Some(dialect) = args.dialect {
        let syntax = dialect
            .syntax()
            .with_context(|| format!("Built-in dialect '{}' is invalid", dialect))?;
        return Ok((dialect.to_string(), syntax));
    }

    let profile = args
        .profile
        .as_deref()
        .context("Either --dialect or --profile is required")?;
    let path = Path::new(profile);
    if path.is_file() {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(profile)
            .to_string();
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let syntax = parse_profile(&name, &yaml)?;
        return Ok((name, syntax));
    }

    let loaded = ProfileLoader::from_env().load(profile)?;
    Ok((loaded.name, loaded.syntax))
}

fn print_summary(out: &mut impl Write, label: &str, vectors: &[TestVector]) -> Result<()> {
    let mut per_pass: BTreeMap<Pass, (usize, usize)> = BTreeMap::new();
    for vector in vectors {
        let counts = per_pass.entry(vector.pass).or_default();
        counts.0 += 1;
        if vector.is_skipped() {
            counts.1 += 1;
        }
    }

    writeln!(out, "\n{} {}", "Dialect:".cyan().bold(), label)?;
    for (pass, (total, skipped)) in &per_pass {
        let skipped = if *skipped > 0 {
            format!("({} skipped)", skipped).yellow().to_string()
        } else {
            String::new()
        };
        writeln!(out, "  {:<18} {:>5} {}", pass.as_str(), total, skipped)?;
    }
    let failures = vectors.iter().filter(|v| v.expected.is_failure()).count();
    writeln!(
        out,
        "{} {} vectors, {} expect failure",
        "Total:".green().bold(),
        vectors.len(),
        failures
    )?;
    Ok(())
}
