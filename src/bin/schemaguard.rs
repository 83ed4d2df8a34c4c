use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use schemaguard::config::EnvConfig;
use schemaguard::path::{self, Segment};
use schemaguard::utils::LoggingConfig;
use schemaguard::{Schema, Validator};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "schemaguard", version, about = "Schema-driven JSON validator", author)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate an input document against a schema
    Validate {
        #[arg(long)]
        schema: PathBuf,
        #[arg(long)]
        input: PathBuf,
        /// JSON message catalog merged over the built-in templates
        #[arg(long)]
        messages: Option<PathBuf>,
        /// Print the failure as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Parse a path expression and print its segments
    Path { expression: String },
}

fn main() -> anyhow::Result<ExitCode> {
    LoggingConfig::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Validate {
            schema,
            input,
            messages,
            json,
        } => handle_validate(&schema, &input, messages.as_deref(), json),
        Command::Path { expression } => handle_path(&expression),
    }
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read `{}`", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("`{}` is not valid JSON", path.display()))
}

fn handle_validate(
    schema_path: &Path,
    input_path: &Path,
    messages: Option<&Path>,
    as_json: bool,
) -> anyhow::Result<ExitCode> {
    let catalog = EnvConfig::resolve_catalog(messages)?;
    let schema = Schema::from_value(&read_json(schema_path)?);
    let input = read_json(input_path)?;

    match Validator::new(&catalog).validate(&schema, &input) {
        Ok(()) => {
            if as_json {
                println!("{}", json!({ "valid": true }));
            } else {
                println!("valid");
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            if as_json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({ "valid": false, "error": error }))?
                );
            } else {
                let domain = if error.is_schema_issue() { "schema" } else { "data" };
                println!("{domain} error [{}] at {}: {}", error.code(), error.path(), error);
            }
            Ok(ExitCode::from(if error.is_schema_issue() { 2 } else { 1 }))
        }
    }
}

fn handle_path(expression: &str) -> anyhow::Result<ExitCode> {
    let parsed = path::parse(expression)?;
    for segment in parsed.segments() {
        match segment {
            Segment::Key(key) => println!("key    {key}"),
            Segment::Index(index) => println!("index  {index}"),
        }
    }
    println!("normalized: {parsed}");
    Ok(ExitCode::SUCCESS)
}
