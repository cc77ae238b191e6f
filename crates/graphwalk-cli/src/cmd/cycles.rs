//! `gw cycles`: find one cycle reachable from the root.

use std::io::{self, Write};

use anyhow::bail;
use clap::Args;
use graphwalk_core::config::GraphwalkConfig;
use graphwalk_core::{Strategy, TraversalOrder};
use serde::Serialize;

use super::{Algorithm, GraphArgs, Outcome, Settings, traverse};
use crate::document::Document;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_error, render_mode};

/// Arguments for `gw cycles`.
#[derive(Args, Debug, Clone, Default)]
pub struct CyclesArgs {
    #[command(flatten)]
    pub graph: GraphArgs,

    /// `recursive` or `iterative`.
    #[arg(long)]
    pub strategy: Option<Strategy>,
}

#[derive(Debug, Serialize)]
struct CyclesOutput {
    /// Node ids, first id repeated at the end. Empty when acyclic.
    cycle: Vec<String>,
}

/// Execute `gw cycles`. Exits non-zero when a cycle is found.
///
/// # Errors
///
/// Fails if the document cannot be loaded, the traversal fails, or a cycle
/// exists.
pub fn run_cycles(args: &CyclesArgs, config: &GraphwalkConfig, output: OutputMode) -> anyhow::Result<()> {
    let doc = Document::load(&args.graph.file)?;
    let settings = Settings::resolve(&args.graph, Some(TraversalOrder::PreOrder), config);
    let algorithm = Algorithm::Dfs {
        strategy: args.strategy.unwrap_or(config.traversal.strategy),
        detect_cycles: true,
    };

    let payload = match traverse(&doc, &settings, algorithm)? {
        Outcome::Done(_) => CyclesOutput { cycle: Vec::new() },
        Outcome::Cycle(cycle) => CyclesOutput { cycle },
        Outcome::Failed(err) => {
            render_error(output, &err)?;
            bail!(err.message);
        }
    };

    render_mode(output, &payload, render_cycles_text, render_cycles_pretty)?;
    if !payload.cycle.is_empty() {
        bail!("cycle found ({} nodes)", payload.cycle.len() - 1);
    }
    Ok(())
}

fn render_cycles_text(payload: &CyclesOutput, w: &mut dyn Write) -> io::Result<()> {
    if payload.cycle.is_empty() {
        writeln!(w, "No cycle found.")
    } else {
        writeln!(w, "{}", payload.cycle.join(" -> "))
    }
}

fn render_cycles_pretty(payload: &CyclesOutput, w: &mut dyn Write) -> io::Result<()> {
    if payload.cycle.is_empty() {
        return writeln!(w, "No cycle found.");
    }
    pretty_section(w, "Cycle")?;
    pretty_kv(w, "length", (payload.cycle.len() - 1).to_string())?;
    pretty_kv(w, "path", payload.cycle.join(" → "))?;
    Ok(())
}
