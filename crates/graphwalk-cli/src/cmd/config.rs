//! `gw config`: inspect configuration.

use std::path::Path;

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use graphwalk_core::config::{ConfigHolder, load_project_config, load_user_config};
use toml::{Table, Value};

use crate::output::{CliError, OutputMode, render_error};

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print one value by dotted path (e.g. traversal.order)
    Get(GetArgs),
    /// Show resolved or raw configuration
    Show(ShowArgs),
}

#[derive(Args, Debug)]
struct GetArgs {
    /// Dotted key path
    key: String,
}

#[derive(Args, Debug)]
struct ShowArgs {
    /// Show raw project config only
    #[arg(long, conflicts_with = "user")]
    project: bool,

    /// Show raw user config only
    #[arg(long)]
    user: bool,
}

/// Execute `gw config`.
///
/// # Errors
///
/// Fails if a raw config file is unreadable, or `get` names an unknown key.
pub fn run_config(
    args: &ConfigArgs,
    holder: &ConfigHolder,
    project_root: &Path,
    output: OutputMode,
) -> Result<()> {
    match &args.command {
        ConfigCommand::Get(get) => run_get(get, holder, output),
        ConfigCommand::Show(show) => run_show(show, holder, project_root, output),
    }
}

fn run_get(args: &GetArgs, holder: &ConfigHolder, output: OutputMode) -> Result<()> {
    let Some(value) = holder.get(&args.key) else {
        render_error(
            output,
            &CliError {
                suggestion: Some("run `gw config show` to list keys".to_string()),
                ..CliError::new(format!("unknown config key `{}`", args.key))
            },
        )?;
        bail!("unknown config key `{}`", args.key);
    };
    println!("{}", format_value(value, output)?);
    Ok(())
}

fn run_show(args: &ShowArgs, holder: &ConfigHolder, project_root: &Path, output: OutputMode) -> Result<()> {
    let table = if args.project {
        load_project_config(project_root)?
    } else if args.user {
        load_user_config()?
    } else {
        holder.effective()
    };
    print_toml_or_json(&table, output)
}

fn format_value(value: &Value, output: OutputMode) -> Result<String> {
    Ok(match (value, output) {
        (_, OutputMode::Json) => serde_json::to_string_pretty(value)?,
        (Value::String(s), _) => s.clone(),
        (Value::Table(table), _) => toml::to_string_pretty(table)?.trim_end().to_string(),
        (other, _) => other.to_string(),
    })
}

fn print_toml_or_json(table: &Table, output: OutputMode) -> Result<()> {
    match output {
        OutputMode::Json => println!("{}", serde_json::to_string_pretty(table)?),
        OutputMode::Text | OutputMode::Pretty => print!("{}", toml::to_string_pretty(table)?),
    }
    Ok(())
}
