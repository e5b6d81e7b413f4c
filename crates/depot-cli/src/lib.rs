//! Depot settings CLI
//!
//! Offline inspection and editing of exported settings documents. Every
//! subcommand goes through a [`SettingsStore`], so files are checked with the
//! same rules the dashboard applies.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use depot_settings::{EngineConfig, ImportPolicy, KeyPolicy, SettingsStore};
use serde_json::Value as JsonValue;

/// Argument definitions
#[must_use]
pub fn command() -> Command {
    Command::new("depot-settings")
        .version(depot_settings::VERSION)
        .about("Inspect and edit exported depot settings documents")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("defaults")
                .about("Print the default settings document")
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("check")
                .about("Validate a settings document")
                .arg(file_arg())
                .arg(
                    Arg::new("merge-defaults")
                        .long("merge-defaults")
                        .action(ArgAction::SetTrue)
                        .help("Fill missing sections and fields from the defaults"),
                ),
        )
        .subcommand(
            Command::new("set")
                .about("Change one field of a settings document")
                .arg(file_arg())
                .arg(
                    Arg::new("path")
                        .required(true)
                        .help("Section or section.subsection"),
                )
                .arg(Arg::new("field").required(true).help("Field name"))
                .arg(
                    Arg::new("value")
                        .required(true)
                        .help("New value as JSON; anything else is taken as a string"),
                )
                .arg(
                    Arg::new("open")
                        .long("open")
                        .action(ArgAction::SetTrue)
                        .help("Allow keys outside the default shape"),
                )
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("presets")
                .about("List unit-size presets of a settings document")
                .arg(file_arg()),
        )
}

fn file_arg() -> Arg {
    Arg::new("file")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Exported settings document")
}

fn output_arg() -> Arg {
    Arg::new("output")
        .long("output")
        .short('o')
        .value_parser(value_parser!(PathBuf))
        .help("Write the document to this file instead of stdout")
}

/// Execute the parsed command, writing reports to `out`
///
/// # Errors
/// Returns any I/O failure or settings error with context
pub fn run(matches: &ArgMatches, out: &mut impl Write) -> Result<()> {
    match matches.subcommand() {
        Some(("defaults", args)) => {
            let store = SettingsStore::default();
            emit(&store.export(), args.get_one::<PathBuf>("output"), out)
        }
        Some(("check", args)) => {
            let policy = if args.get_flag("merge-defaults") {
                ImportPolicy::MergeWithDefaults
            } else {
                ImportPolicy::Strict
            };
            let store = load(
                required_path(args)?,
                EngineConfig::new().with_import_policy(policy),
            )?;
            writeln!(
                out,
                "ok: {} sections, {} presets, {} templates",
                store.tree().len(),
                store.presets().len(),
                store.templates().len()
            )?;
            Ok(())
        }
        Some(("set", args)) => {
            let key_policy = if args.get_flag("open") {
                KeyPolicy::Open
            } else {
                KeyPolicy::Closed
            };
            let mut store = load(
                required_path(args)?,
                EngineConfig::new().with_key_policy(key_policy),
            )?;
            let path = required_str(args, "path")?;
            let field = required_str(args, "field")?;
            let value = parse_value(required_str(args, "value")?);

            store
                .apply(path, field, value)
                .with_context(|| format!("cannot set {path}.{field}"))?;
            tracing::info!("Set {}.{}", path, field);
            emit(&store.export(), args.get_one::<PathBuf>("output"), out)
        }
        Some(("presets", args)) => {
            let store = load(required_path(args)?, EngineConfig::new())?;
            for preset in store.presets().list() {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}",
                    preset.id, preset.name, preset.size, preset.rate_per_area
                )?;
            }
            Ok(())
        }
        Some((other, _)) => anyhow::bail!("unknown subcommand '{other}'"),
        None => anyhow::bail!("no subcommand given"),
    }
}

/// JSON literal, or the raw text as a string
#[must_use]
pub fn parse_value(raw: &str) -> JsonValue {
    serde_json::from_str(raw).unwrap_or_else(|_| JsonValue::String(raw.to_string()))
}

fn load(path: &Path, config: EngineConfig) -> Result<SettingsStore> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let mut store = SettingsStore::new(config);
    store
        .import(&text)
        .with_context(|| format!("invalid settings document {}", path.display()))?;
    store.commit();
    Ok(store)
}

fn emit(document: &str, output: Option<&PathBuf>, out: &mut impl Write) -> Result<()> {
    match output {
        Some(path) => fs::write(path, format!("{document}\n"))
            .with_context(|| format!("cannot write {}", path.display())),
        None => {
            writeln!(out, "{document}")?;
            Ok(())
        }
    }
}

fn required_path(args: &ArgMatches) -> Result<&Path> {
    args.get_one::<PathBuf>("file")
        .map(PathBuf::as_path)
        .context("missing FILE argument")
}

fn required_str<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a str> {
    args.get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("missing {name} argument"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_value_prefers_json() {
        assert_eq!(parse_value("42"), json!(42));
        assert_eq!(parse_value("true"), json!(true));
        assert_eq!(parse_value("\"quoted\""), json!("quoted"));
        assert_eq!(parse_value("mail.example.com"), json!("mail.example.com"));
    }

    #[test]
    fn command_definition_is_consistent() {
        command().debug_assert();
    }
}
