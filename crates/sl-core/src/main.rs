//! scrubline: sanitize structured record files.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use sl_common::SourceFormat;
use sl_config::{
    parse_mapping, resolve_mapping_path, validate_against_record, ErrorPolicy, MappingConfig,
    PipelineSettings, StrategyKind,
};
use sl_core::logging::{generate_run_id, init_logging, LogConfig, LogFlags, LogFormat};
use sl_core::{policy_hash_for, ExitCode, Pipeline, PipelineError};
use sl_provider::ProviderRegistry;
use sl_redact::Strategy;
use tracing::{debug, error, info, info_span};

/// Redact sensitive fields from JSONL, CSV and Parquet files
#[derive(Parser)]
#[command(name = "scrubline")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log format on stderr (human or jsonl)
    #[arg(long, global = true, value_parser = parse_log_format)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sanitize an input file into JSONL output plus an audit trail
    Sanitize(SanitizeArgs),

    /// Check a mapping file, optionally against a sample record
    Validate(ValidateArgs),

    /// Print the policy hash of a mapping and strategy
    Hash(HashArgs),

    /// Print safe metadata about an input file
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct SanitizeArgs {
    /// Input file (.jsonl, .ndjson, .json, .csv, .tsv, .parquet)
    #[arg(long, short = 'i')]
    input: PathBuf,

    /// Output JSONL file
    #[arg(long, short = 'o')]
    output: PathBuf,

    /// Mapping file (JSON, YAML or TOML)
    #[arg(long, short = 'm')]
    mapping: Option<PathBuf>,

    /// Audit JSONL file (default: <output>.audit.jsonl)
    #[arg(long)]
    audit: Option<PathBuf>,

    /// Do not write an audit trail
    #[arg(long, conflicts_with = "audit")]
    no_audit: bool,

    /// Append malformed-record metadata to this JSONL file
    #[arg(long)]
    quarantine: Option<PathBuf>,

    /// Detection strategy (strict or deep)
    #[arg(long, value_parser = parse_strategy)]
    strategy: Option<StrategyKind>,

    /// Failed-record policy (skip or abort)
    #[arg(long, value_parser = parse_error_policy)]
    on_error: Option<ErrorPolicy>,

    /// Input format, overriding the file extension
    #[arg(long, value_parser = parse_format)]
    format: Option<SourceFormat>,

    /// Settings file (TOML or JSON)
    #[arg(long)]
    settings: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    #[arg(long, short = 'm')]
    mapping: Option<PathBuf>,

    /// Sample input; its first record is matched against the mapping
    #[arg(long)]
    sample: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct HashArgs {
    #[arg(long, short = 'm')]
    mapping: Option<PathBuf>,

    #[arg(long, value_parser = parse_strategy, default_value = "strict")]
    strategy: StrategyKind,
}

#[derive(Args, Debug)]
struct InspectArgs {
    #[arg(long, short = 'i')]
    input: PathBuf,

    #[arg(long, value_parser = parse_format)]
    format: Option<SourceFormat>,

    /// Stream the whole file and report the record count
    #[arg(long)]
    count: bool,
}

fn parse_strategy(s: &str) -> Result<StrategyKind, String> {
    StrategyKind::parse_str(s).ok_or_else(|| format!("unknown strategy '{}' (strict, deep)", s))
}

fn parse_error_policy(s: &str) -> Result<ErrorPolicy, String> {
    ErrorPolicy::parse_str(s).ok_or_else(|| format!("unknown error policy '{}' (skip, abort)", s))
}

fn parse_format(s: &str) -> Result<SourceFormat, String> {
    SourceFormat::parse_str(s).ok_or_else(|| format!("unknown format '{}' (jsonl, csv, parquet)", s))
}

fn parse_log_format(s: &str) -> Result<LogFormat, String> {
    LogFormat::parse_str(s).ok_or_else(|| format!("unknown log format '{}' (human, jsonl)", s))
}

fn main() {
    let cli = Cli::parse();

    init_logging(&LogConfig::from_env(LogFlags {
        quiet: cli.global.quiet,
        verbose: cli.global.verbose,
        format: cli.global.log_format,
    }));

    let run_id = generate_run_id();
    let span = info_span!("scrubline", run_id = %run_id);
    let _guard = span.enter();

    let result = match cli.command {
        Commands::Sanitize(args) => run_sanitize(&args),
        Commands::Validate(args) => run_validate(&args),
        Commands::Hash(args) => run_hash(&args),
        Commands::Inspect(args) => run_inspect(&args),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(err) => {
            error!(code = err.code(), "{}", err);
            eprintln!("scrubline: {}", err);
            err.exit_code()
        }
    };
    std::process::exit(exit_code.as_i32());
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => error!(error = %e, "Failed to render command output"),
    }
}

/// Resolve and parse the mapping. Without one, `deep` runs on an empty
/// mapping; `strict` cannot.
fn load_mapping(cli_path: Option<&Path>, required: bool) -> Result<MappingConfig, PipelineError> {
    let location = resolve_mapping_path(cli_path);
    match location.path {
        Some(path) => {
            info!(path = %path.display(), source = %location.source, "Loading mapping");
            Ok(parse_mapping(path)?)
        }
        None if required => Err(PipelineError::MappingNotFound),
        None => {
            debug!("No mapping found; continuing with an empty mapping");
            Ok(MappingConfig::new())
        }
    }
}

fn run_sanitize(args: &SanitizeArgs) -> Result<ExitCode, PipelineError> {
    let mut settings = match &args.settings {
        Some(path) => PipelineSettings::load(path)?,
        None => PipelineSettings::default(),
    };
    settings.apply_env()?;

    if let Some(strategy) = args.strategy {
        settings.strategy = strategy;
    }
    if let Some(policy) = args.on_error {
        settings.error_policy = policy;
    }
    if let Some(format) = args.format {
        settings.input_format = Some(format);
    }
    if let Some(path) = &args.quarantine {
        settings.quarantine_path = Some(path.clone());
    }
    if let Some(path) = &args.audit {
        settings.audit_path = Some(path.clone());
    }
    if args.no_audit {
        settings.audit_enabled = false;
    }

    let mapping = load_mapping(args.mapping.as_deref(), settings.strategy == StrategyKind::Strict)?;
    let summary = Pipeline::new(settings, mapping).run(&args.input, &args.output)?;
    print_json(&summary);
    Ok(summary.exit_code())
}

fn run_validate(args: &ValidateArgs) -> Result<ExitCode, PipelineError> {
    let mapping = load_mapping(args.mapping.as_deref(), true)?;
    let mut output = json!({
        "valid": true,
        "version": mapping.version,
        "default_action": mapping.default_action,
        "fields": mapping.fields.len(),
        "policy_hash": mapping.policy_hash(),
    });

    let mut code = ExitCode::Ok;
    if let Some(sample) = &args.sample {
        let mut provider = ProviderRegistry::with_defaults().create_for_path(sample, None)?;
        provider.connect()?;
        let first = provider.stream_records()?.find_map(Result::ok);
        provider.close();

        match first {
            Some(record) => {
                let report = validate_against_record(&mapping, &record);
                if !report.is_valid {
                    code = ExitCode::ConfigError;
                    output["valid"] = json!(false);
                }
                output["sample"] = json!(report);
            }
            None => output["sample"] = json!(null),
        }
    }

    print_json(&output);
    Ok(code)
}

fn run_hash(args: &HashArgs) -> Result<ExitCode, PipelineError> {
    let mapping = load_mapping(args.mapping.as_deref(), args.strategy == StrategyKind::Strict)?;
    let strategy = Strategy::from_kind(args.strategy, mapping);
    print_json(&json!({
        "strategy": strategy.name(),
        "policy_hash": policy_hash_for(&strategy),
    }));
    Ok(ExitCode::Ok)
}

fn run_inspect(args: &InspectArgs) -> Result<ExitCode, PipelineError> {
    let mut provider = ProviderRegistry::with_defaults().create_for_path(&args.input, args.format)?;
    provider.connect()?;
    let mut failed = 0u64;
    if args.count {
        failed = provider.stream_records()?.filter(|r| r.is_err()).count() as u64;
    }
    let metadata = provider.fetch_metadata();
    provider.close();

    let mut output = json!(metadata);
    if args.count {
        output["malformed_records"] = json!(failed);
    }
    print_json(&output);
    Ok(ExitCode::Ok)
}
