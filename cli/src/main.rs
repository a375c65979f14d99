use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde_json::{Value, json};
use stencil::consts::MAX_GENERATED_LEN;
use stencil::field::{FieldValue, FieldValues};
use stencil::form::{self, AutoPolicy, FormState};
use stencil::generate::{self, MaxSpec};
use stencil::pattern::Rule;
use stencil::random::{RandomSource, RngSource};
use stencil::store::EditorStore;
use stencil::svg::SvgError;
use stencil::{extract, id};
use tracing::{debug, warn};
use tracing_subscriber::filter::LevelFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("cannot read {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("cannot write {path}: {source}")]
    Write { path: String, source: io::Error },
    #[error(transparent)]
    Svg(#[from] SvgError),
    #[error(transparent)]
    Store(#[from] stencil::store::StoreError),
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("invalid id {id}: {error}")]
    InvalidId { id: String, error: String },
    #[error("invalid max spec `{0}` (expected <n> or <n>:<pad>)")]
    InvalidMaxSpec(String),
    #[error("length {0} exceeds the limit of {limit}", limit = MAX_GENERATED_LEN)]
    TooLong(usize),
}

#[derive(Parser, Debug)]
#[command(name = "stencil", about = "Smart SVG template tool")]
struct Cli {
    /// Log debug output to stderr.
    #[arg(long, short, global = true, env = "STENCIL_VERBOSE")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the editable elements, form fields and problems of a template.
    Inspect {
        /// SVG file, or - for stdin.
        svg: String,
    },
    /// Parse and validate one element id.
    CheckId { id: String },
    /// Suggest tokens that may follow a partially typed id.
    Suggest { input: String },
    /// Evaluate a generation rule.
    Generate(GenerateArgs),
    /// Resolve a dependency reference such as `City[w1]`.
    Extract {
        reference: String,
        #[command(flatten)]
        values: ValueArgs,
    },
    /// Fill a template and write the resulting SVG.
    Fill(FillArgs),
}

#[derive(Args, Debug)]
struct ValueArgs {
    /// Field value as `name=value`; repeatable.
    #[arg(long = "value", value_parser = parse_pair)]
    pairs: Vec<(String, String)>,

    /// JSON object of field values; `--value` entries win.
    #[arg(long)]
    values_json: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    rule: String,
    #[command(flatten)]
    values: ValueArgs,
    /// Cut (and `[fill]`) to this many characters.
    #[arg(long)]
    max: Option<usize>,
    /// Legacy `<n>:<pad>` spec; pads rules without a fill part.
    #[arg(long)]
    max_spec: Option<String>,
    /// Seed for reproducible random parts.
    #[arg(long, env = "STENCIL_SEED")]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct FillArgs {
    /// SVG file, or - for stdin.
    svg: String,
    #[command(flatten)]
    values: ValueArgs,
    #[arg(long, env = "STENCIL_SEED")]
    seed: Option<u64>,
    /// `on_dependency_change` or `on_load`.
    #[arg(long, env = "STENCIL_AUTO_POLICY", default_value = "on_dependency_change")]
    policy: AutoPolicy,
    /// Output path; stdout when absent.
    #[arg(long, short)]
    out: Option<PathBuf>,
    /// Print the resolved values as JSON to stderr.
    #[arg(long)]
    report: bool,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let level = if cli.verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();

    match cli.command {
        Command::Inspect { svg } => run_inspect(&svg),
        Command::CheckId { id } => run_check_id(&id),
        Command::Suggest { input } => {
            run_suggest(&input);
            Ok(())
        }
        Command::Generate(args) => run_generate(args),
        Command::Extract { reference, values } => {
            let values = values.collect()?;
            println!("{}", extract::extract_from_dependency(&reference, &values));
            Ok(())
        }
        Command::Fill(args) => run_fill(args),
    }
}

// =============================================================================
// COMMANDS
// =============================================================================

fn run_inspect(path: &str) -> Result<(), CliError> {
    let svg = read_input(path)?;
    let mut store = EditorStore::new();
    let count = store.load(&svg)?;
    debug!(elements = count, "template loaded");

    let form = FormState::from_elements(&store.snapshot(), AutoPolicy::default());
    let invalid: Vec<Value> = store
        .invalid_ids()
        .into_iter()
        .map(|(internal_id, error)| json!({ "internal_id": internal_id, "error": error }))
        .collect();
    let report = json!({
        "elements": count,
        "fields": form.fields().collect::<Vec<_>>(),
        "invalid_ids": invalid,
        "issues": form.issues(),
    });
    print_json(&report)
}

fn run_check_id(raw: &str) -> Result<(), CliError> {
    let parsed = id::parse_id(raw);
    let validation = id::validate_parsed(&parsed);
    print_json(&json!({ "parsed": parsed, "validation": validation }))?;
    match validation.error {
        Some(error) if !validation.is_valid => Err(CliError::InvalidId { id: raw.to_owned(), error }),
        _ => Ok(()),
    }
}

fn run_suggest(input: &str) {
    for token in id::suggest_for_input(input) {
        let key = if token.requires_value { format!("{}_", token.key) } else { token.key.to_owned() };
        println!("{key:<12} {}", token.description);
    }
}

fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let values = args.values.collect()?;
    let value = generate_value(&args.rule, &values, args.max, args.max_spec.as_deref(), args.seed)?;
    println!("{value}");
    Ok(())
}

fn run_fill(args: FillArgs) -> Result<(), CliError> {
    let svg = read_input(&args.svg)?;
    let values = args.values.collect()?;
    let filled = with_rng(args.seed, |rng| form::fill_template(&svg, &values, args.policy, rng))?;
    for issue in &filled.issues {
        warn!(?issue, "form issue");
    }
    if args.report {
        let report = json!({ "values": filled.values, "tracked": filled.tracked, "issues": filled.issues });
        eprintln!("{}", serde_json::to_string_pretty(&report)?);
    }
    match args.out {
        Some(path) => fs::write(&path, filled.svg).map_err(|source| CliError::Write {
            path: path.display().to_string(),
            source,
        }),
        None => {
            println!("{}", filled.svg);
            Ok(())
        }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn generate_value(
    rule: &str,
    values: &FieldValues,
    max: Option<usize>,
    max_spec: Option<&str>,
    seed: Option<u64>,
) -> Result<String, CliError> {
    let spec = max_spec
        .map(|raw| MaxSpec::parse(raw).ok_or_else(|| CliError::InvalidMaxSpec(raw.to_owned())))
        .transpose()?;
    let rule = Rule::parse(rule);
    let max = max.or(spec.map(|s| s.length));
    if let Some(length) = [max, spec.map(|s| s.length)].into_iter().flatten().find(|n| *n > MAX_GENERATED_LEN) {
        return Err(CliError::TooLong(length));
    }
    let value = with_rng(seed, |rng| generate::evaluate(&rule.parts, values, max, rng));
    Ok(match spec {
        Some(spec) if !rule.has_fill() => generate::apply_max_generation(&value, &spec),
        _ => value,
    })
}

fn with_rng<T>(seed: Option<u64>, f: impl FnOnce(&mut dyn RandomSource) -> T) -> T {
    match seed {
        Some(seed) => f(&mut RngSource::seeded(seed)),
        None => f(&mut RngSource::thread()),
    }
}

impl ValueArgs {
    fn collect(self) -> Result<FieldValues, CliError> {
        let mut values = match &self.values_json {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|source| CliError::Read {
                    path: path.display().to_string(),
                    source,
                })?;
                serde_json::from_str::<FieldValues>(&text)?
            }
            None => FieldValues::new(),
        };
        for (name, value) in self.pairs {
            values.insert(name, FieldValue::Text(value));
        }
        Ok(values)
    }
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got `{raw}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty field name in `{raw}`"));
    }
    Ok((name.to_owned(), value.to_owned()))
}

fn read_input(path: &str) -> Result<String, CliError> {
    let read_error = |source| CliError::Read { path: path.to_owned(), source };
    if path == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text).map_err(read_error)?;
        return Ok(text);
    }
    fs::read_to_string(Path::new(path)).map_err(read_error)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
