//! `gw dfs`: depth-first traversal of a graph document.

use std::io::{self, Write};

use anyhow::bail;
use clap::Args;
use graphwalk_core::config::GraphwalkConfig;
use graphwalk_core::{ErrorCode, Strategy, TraversalOrder};
use tracing::info;

use super::{Algorithm, GraphArgs, Outcome, Settings, TraversalReport, traverse};
use crate::document::Document;
use crate::output::{CliError, OutputMode, pretty_kv, pretty_section, render_error, render_mode};

/// Arguments for `gw dfs`.
#[derive(Args, Debug, Clone, Default)]
pub struct DfsArgs {
    #[command(flatten)]
    pub graph: GraphArgs,

    /// When nodes are reported: `pre` or `post`.
    #[arg(long)]
    pub order: Option<TraversalOrder>,

    /// `recursive` or `iterative` (use iterative for very deep graphs).
    #[arg(long)]
    pub strategy: Option<Strategy>,

    /// Stop with an error at the first cycle.
    #[arg(long)]
    pub detect_cycles: bool,
}

/// Execute `gw dfs`.
///
/// # Errors
///
/// Fails if the document cannot be loaded, the traversal fails, or a cycle
/// is found with `--detect-cycles`.
pub fn run_dfs(args: &DfsArgs, config: &GraphwalkConfig, output: OutputMode) -> anyhow::Result<()> {
    let doc = Document::load(&args.graph.file)?;
    let settings = Settings::resolve(&args.graph, args.order, config);
    let algorithm = Algorithm::Dfs {
        strategy: args.strategy.unwrap_or(config.traversal.strategy),
        detect_cycles: args.detect_cycles || config.traversal.detect_cycles,
    };

    match traverse(&doc, &settings, algorithm)? {
        Outcome::Done(report) => {
            info!(nodes = report.nodes.len(), edges = report.edges.len(), "dfs complete");
            render_mode(output, &report, render_report_text, render_report_pretty)
        }
        Outcome::Cycle(path) => {
            let message = format!("cycle detected: {}", path.join(" → "));
            render_error(output, &CliError::coded(&message, ErrorCode::CycleDetected))?;
            bail!(message);
        }
        Outcome::Failed(err) => {
            render_error(output, &err)?;
            bail!(err.message);
        }
    }
}

/// One line per record: `node <id>` then `edge <from> <to> <kind>`.
pub fn render_report_text(report: &TraversalReport, w: &mut dyn Write) -> io::Result<()> {
    for node in &report.nodes {
        match node.level {
            Some(level) => writeln!(w, "node {} level={level}", node.id)?,
            None => writeln!(w, "node {}", node.id)?,
        }
    }
    for edge in &report.edges {
        match edge.level {
            Some(level) => writeln!(w, "edge {} {} {} level={level}", edge.from, edge.to, edge.kind.as_str())?,
            None => writeln!(w, "edge {} {} {}", edge.from, edge.to, edge.kind.as_str())?,
        }
    }
    Ok(())
}

pub fn render_report_pretty(report: &TraversalReport, w: &mut dyn Write) -> io::Result<()> {
    let heading = match report.strategy {
        Some(strategy) => format!("{} {} ({strategy})", report.algorithm.to_uppercase(), report.order),
        None => format!("{} {}", report.algorithm.to_uppercase(), report.order),
    };
    pretty_section(w, &heading)?;
    pretty_kv(w, "root", &report.root)?;
    pretty_kv(w, "directed", report.directed.to_string())?;
    writeln!(w)?;

    pretty_section(w, &format!("Nodes ({})", report.nodes.len()))?;
    for (i, node) in report.nodes.iter().enumerate() {
        match node.level {
            Some(level) => writeln!(w, "{:>4}. {}  [level {level}]", i + 1, node.id)?,
            None => writeln!(w, "{:>4}. {}", i + 1, node.id)?,
        }
    }
    writeln!(w)?;

    pretty_section(w, &format!("Edges ({})", report.edges.len()))?;
    if report.edges.is_empty() {
        writeln!(w, "(none)")?;
    }
    for edge in &report.edges {
        writeln!(w, "  {} → {}  {}", edge.from, edge.to, edge.kind.as_str())?;
    }
    Ok(())
}
