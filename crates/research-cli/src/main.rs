//! research-doc - inspect task and result documents
//!
//! Subcommands:
//! - `roundtrip`: decode and re-encode a result or task document
//! - `components`: show the calendar components and storage pattern of a date pattern
//! - `validate`: run an input validator over participant text

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use research_input::{
    derive_components, storage_pattern, AnswerValue, DatePickerMode, DateTimeValidator,
    DoubleFormatOptions, IntegerFormatOptions, InvalidMessages, RegExValidator,
    TextInputValidator, YearFormatOptions,
};
use research_model::{Factory, FactoryConfig};
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn cli() -> Command {
    Command::new("research-doc")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect research task and result documents")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Factory configuration (TOML)"),
        )
        .subcommand(
            Command::new("roundtrip")
                .about("Decode and re-encode a result or task document")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Document to read"),
                )
                .arg(
                    Arg::new("task")
                        .long("task")
                        .action(ArgAction::SetTrue)
                        .help("Read a task definition (JSON or YAML) instead of a result"),
                ),
        )
        .subcommand(
            Command::new("components")
                .about("Show the calendar components of a date pattern")
                .arg(Arg::new("pattern").required(true).help("LDML date pattern")),
        )
        .subcommand(
            Command::new("validate")
                .about("Validate participant text")
                .arg(
                    Arg::new("kind")
                        .long("kind")
                        .default_value("integer")
                        .value_parser(["integer", "double", "year", "date", "regex"])
                        .help("Validator to run"),
                )
                .arg(
                    Arg::new("min")
                        .long("min")
                        .value_parser(value_parser!(f64))
                        .help("Inclusive minimum (integer, double and year)"),
                )
                .arg(
                    Arg::new("max")
                        .long("max")
                        .value_parser(value_parser!(f64))
                        .help("Inclusive maximum (integer, double and year)"),
                )
                .arg(
                    Arg::new("pattern")
                        .long("pattern")
                        .help("Regular expression for --kind regex"),
                )
                .arg(
                    Arg::new("message")
                        .long("message")
                        .help("Message shown when the text is rejected (numbers and regex)"),
                )
                .arg(Arg::new("text").required(true).help("Text to validate")),
        )
}

fn load_factory(config: Option<&PathBuf>) -> Result<Factory> {
    let config = match config {
        Some(path) => FactoryConfig::load(path)?,
        None => FactoryConfig::default(),
    };
    Ok(Factory::try_new(config)?)
}

/// Outcome of a round trip
#[derive(Debug)]
struct RoundTrip {
    document: Value,
    stable: bool,
}

fn roundtrip_result(factory: &Factory, text: &str) -> Result<RoundTrip> {
    let decoded = factory.decode_result_text(text)?;
    let document = factory.encode_result(decoded.as_ref())?;
    let again = factory.decode_result(&document)?;
    Ok(RoundTrip {
        stable: decoded.as_ref() == again.as_ref(),
        document,
    })
}

fn roundtrip_task(factory: &Factory, path: &Path) -> Result<RoundTrip> {
    let task = factory.load_task(path)?;
    let document = Value::Object(task.encode()?);
    let again = research_model::AssessmentTask::decode(&document, factory)?;
    Ok(RoundTrip {
        stable: Value::Object(again.encode()?) == document,
        document,
    })
}

fn components(pattern: &str) -> Result<String> {
    let components = derive_components(pattern)?;
    let names: Vec<String> = components.iter().map(ToString::to_string).collect();
    Ok(format!(
        "components: {}\nstorage pattern: {}",
        names.join(", "),
        storage_pattern(&components)
    ))
}

/// Message for rejected regex text when `--message` is absent
const DEFAULT_INVALID_TEXT_MESSAGE: &str = "The text entered is not valid.";

/// Read a bound that must be a whole number
#[allow(clippy::cast_possible_truncation)]
fn whole_bound<T: TryFrom<i64>>(args: &ArgMatches, name: &str) -> Result<Option<T>> {
    let Some(value) = args.get_one::<f64>(name).copied() else {
        return Ok(None);
    };
    if value.fract() != 0.0 || value.abs() >= 9.0e15 {
        bail!("--{name} must be a whole number, got {value}");
    }
    match T::try_from(value as i64) {
        Ok(bound) => Ok(Some(bound)),
        Err(_) => bail!("--{name} {value} is out of range"),
    }
}

fn validator(args: &ArgMatches) -> Result<Box<dyn TextInputValidator>> {
    let min = args.get_one::<f64>("min").copied();
    let max = args.get_one::<f64>("max").copied();
    let message = args.get_one::<String>("message").cloned();
    let messages = InvalidMessages {
        invalid_message: message.clone(),
        ..InvalidMessages::default()
    };
    let kind = args.get_one::<String>("kind").map_or("integer", String::as_str);
    if matches!(kind, "date" | "regex") && (min.is_some() || max.is_some()) {
        bail!("--min and --max do not apply to --kind {kind}");
    }
    let validator: Box<dyn TextInputValidator> = match kind {
        "integer" => Box::new(
            IntegerFormatOptions::new()
                .with_range(whole_bound(args, "min")?, whole_bound(args, "max")?)
                .with_messages(messages),
        ),
        "double" => {
            let mut options = DoubleFormatOptions::new().with_range(min, max);
            options.messages = messages;
            Box::new(options)
        }
        "year" => Box::new(YearFormatOptions {
            minimum_year: whole_bound(args, "min")?,
            maximum_year: whole_bound(args, "max")?,
            messages,
            ..YearFormatOptions::new()
        }),
        "date" => {
            if message.is_some() {
                bail!("--message does not apply to --kind date");
            }
            Box::new(DateTimeValidator::new(DatePickerMode::Date))
        }
        "regex" => {
            let pattern = args
                .get_one::<String>("pattern")
                .context("--pattern is required for --kind regex")?;
            let message = message.as_deref().unwrap_or(DEFAULT_INVALID_TEXT_MESSAGE);
            Box::new(RegExValidator::new(pattern, message)?)
        }
        other => bail!("unknown validator kind '{other}'"),
    };
    Ok(validator)
}

fn validate(validator: &dyn TextInputValidator, text: &str) -> Result<Option<AnswerValue>> {
    Ok(validator.validate_text(Some(text))?)
}

fn run(matches: &ArgMatches) -> Result<bool> {
    match matches.subcommand() {
        Some(("roundtrip", args)) => {
            let factory = load_factory(matches.get_one::<PathBuf>("config"))?;
            let Some(path) = args.get_one::<PathBuf>("file") else {
                bail!("missing document path");
            };
            let report = if args.get_flag("task") {
                roundtrip_task(&factory, path)?
            } else {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                roundtrip_result(&factory, &text)?
            };
            println!("{}", serde_json::to_string_pretty(&report.document)?);
            println!("stable: {}", report.stable);
            Ok(report.stable)
        }
        Some(("components", args)) => {
            let pattern = args.get_one::<String>("pattern").map_or("", String::as_str);
            println!("{}", components(pattern)?);
            Ok(true)
        }
        Some(("validate", args)) => {
            let validator = validator(args)?;
            let text = args.get_one::<String>("text").map_or("", String::as_str);
            match validate(validator.as_ref(), text) {
                Ok(Some(answer)) => {
                    let display = validator.display_text(&answer).unwrap_or_else(|| answer.to_string());
                    println!("valid: {display}");
                    Ok(true)
                }
                Ok(None) => {
                    println!("valid: no answer");
                    Ok(true)
                }
                Err(err) => {
                    println!("invalid: {err}");
                    Ok(false)
                }
            }
        }
        _ => Ok(true),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "research_model=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let matches = cli().get_matches();
    let passed = run(&matches)?;
    tracing::debug!(passed, "command finished");
    std::process::exit(i32::from(!passed));
}
