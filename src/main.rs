use clap::{ArgAction, Parser};
use json_rule_validation::{FieldRules, ValidateOptions, Validator};
use serde_json::Value;
use std::process::ExitCode;
use tracing::Level;

/// Validate a JSON document against field rules and print the coerced result.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Field rules: `{"path": "rule|rule:arg"}`, inline or `@file`
    rules: String,
    /// Document to validate, inline or `@file`
    data: String,
    /// Message overrides keyed by declared field path, inline or `@file`
    #[arg(long)]
    messages: Option<String>,
    /// Stop at the first field with a violation
    #[arg(long)]
    skip_on_error: bool,
    /// More logging on stderr (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Inline JSON, or the contents of a file when prefixed with `@`.
fn read_json(input: &str) -> Result<Value, String> {
    let text = match input.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path).map_err(|e| format!("{path}: {e}"))?,
        None => input.to_string(),
    };
    serde_json::from_str(&text).map_err(|e| format!("invalid JSON: {e}"))
}

fn run(args: &Args) -> Result<bool, String> {
    let rules = FieldRules::from_value(&read_json(&args.rules)?).map_err(|e| e.to_string())?;
    let data = read_json(&args.data)?;
    let mut options = ValidateOptions::default().skip_on_error(args.skip_on_error);
    if let Some(messages) = &args.messages {
        options.messages = serde_json::from_value(read_json(messages)?)
            .map_err(|e| format!("invalid messages: {e}"))?;
    }

    let validation = Validator::new()
        .validate(&rules, &data, &options)
        .map_err(|e| e.to_string())?;
    let rendered = serde_json::to_string_pretty(&validation).map_err(|e| e.to_string())?;
    println!("{rendered}");
    Ok(validation.success)
}

fn main() -> ExitCode {
    // Parse CLI arguments.
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(2)
        }
    }
}
