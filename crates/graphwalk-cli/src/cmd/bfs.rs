//! `gw bfs`: breadth-first traversal with levels.

use anyhow::bail;
use clap::Args;
use graphwalk_core::TraversalOrder;
use graphwalk_core::config::GraphwalkConfig;
use tracing::info;

use super::dfs::{render_report_pretty, render_report_text};
use super::{Algorithm, GraphArgs, Outcome, Settings, traverse};
use crate::document::Document;
use crate::output::{OutputMode, render_error, render_mode};

/// Arguments for `gw bfs`.
#[derive(Args, Debug, Clone, Default)]
pub struct BfsArgs {
    #[command(flatten)]
    pub graph: GraphArgs,

    /// Report nodes when dequeued (`pre`) or after their neighbors were
    /// enqueued (`post`).
    #[arg(long)]
    pub order: Option<TraversalOrder>,
}

/// Execute `gw bfs`.
///
/// # Errors
///
/// Fails if the document cannot be loaded or the traversal fails.
pub fn run_bfs(args: &BfsArgs, config: &GraphwalkConfig, output: OutputMode) -> anyhow::Result<()> {
    let doc = Document::load(&args.graph.file)?;
    let settings = Settings::resolve(&args.graph, args.order, config);

    match traverse(&doc, &settings, Algorithm::Bfs)? {
        Outcome::Done(report) => {
            let depth = report.nodes.iter().filter_map(|n| n.level).max().unwrap_or(0);
            info!(nodes = report.nodes.len(), depth, "bfs complete");
            render_mode(output, &report, render_report_text, render_report_pretty)
        }
        // BFS never checks for cycles.
        Outcome::Cycle(path) => bail!("unexpected cycle report: {}", path.join(" → ")),
        Outcome::Failed(err) => {
            render_error(output, &err)?;
            bail!(err.message);
        }
    }
}
