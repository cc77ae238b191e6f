#![forbid(unsafe_code)]

mod cmd;
mod document;
mod output;

use anyhow::bail;
use clap::{CommandFactory, Parser, Subcommand};
use graphwalk_core::ErrorCode;
use graphwalk_core::config::resolve_config;
use output::{CliError, OutputMode};
use std::env;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "gw: depth-first and breadth-first walks over JSON/TOML graph documents",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (default: pretty on a TTY, text otherwise).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Depth-first traversal",
        long_about = "Walk a graph document depth-first, listing nodes in pre- or post-order and every reported edge with its kind.",
        after_help = "EXAMPLES:\n    # Post-order walk of a tree document\n    gw dfs tree.json\n\n    # Pre-order over an adjacency document, failing on the first cycle\n    gw dfs graph.toml --order pre --detect-cycles\n\n    # Very deep graphs\n    gw dfs chain.json --strategy iterative"
    )]
    Dfs(cmd::dfs::DfsArgs),

    #[command(
        about = "Breadth-first traversal with levels",
        after_help = "EXAMPLES:\n    # Nodes layer by layer, with their distance from the root\n    gw bfs graph.json --root a\n\n    # Machine-readable output\n    gw bfs graph.json --format json"
    )]
    Bfs(cmd::bfs::BfsArgs),

    #[command(
        about = "Report a cycle reachable from the root",
        after_help = "EXAMPLES:\n    # Exit status is 1 when a cycle exists\n    gw cycles pipeline.toml\n\n    # Undirected: any cycle other than a tree edge walked back\n    gw cycles graph.json --undirected"
    )]
    Cycles(cmd::cycles::CyclesArgs),

    #[command(
        about = "Inspect configuration",
        after_help = "EXAMPLES:\n    # One value\n    gw config get traversal.order\n\n    # Everything, with defaults filled in\n    gw config show"
    )]
    Config(cmd::config::ConfigArgs),

    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    # Bash\n    gw completions bash > ~/.local/share/bash-completion/completions/gw"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("GRAPHWALK_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "graphwalk=debug,info"
        } else {
            "graphwalk=info,warn"
        })
    });

    let format = env::var("GRAPHWALK_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    // Logs go to stderr so stdout stays parseable.
    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let project_root = env::current_dir()?;
    let config = match resolve_config(&project_root) {
        Ok(config) => config,
        Err(err) => {
            // No config to consult: the mode comes from the flag, env and TTY.
            let output = output::resolve_output_mode(cli.format, None);
            let message = format!("{err:#}");
            output::render_error(output, &CliError::coded(&message, ErrorCode::InvalidConfig))?;
            bail!(message);
        }
    };
    let output = output::resolve_output_mode(cli.format, config.settings().output.format.as_deref());
    debug!(?output, root = %project_root.display(), "resolved output mode");

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    match cli.command {
        Commands::Dfs(ref args) => cmd::dfs::run_dfs(args, config.settings(), output),
        Commands::Bfs(ref args) => cmd::bfs::run_bfs(args, config.settings(), output),
        Commands::Cycles(ref args) => cmd::cycles::run_cycles(args, config.settings(), output),
        Commands::Config(ref args) => cmd::config::run_config(args, &config, &project_root, output),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command, &mut std::io::stdout());
            Ok(())
        }
    }
}
