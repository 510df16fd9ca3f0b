//! show, state and selection commands - Read-only queries

use super::{load, Context};
use crate::ui::output;
use anyhow::{Context as _, Result};
use std::path::Path;

/// Print the tree with selection markers.
pub fn show(ctx: &Context, file: &Path) -> Result<()> {
    let lattice = load(ctx, file)?;
    println!("{}", output::format_tree(&lattice));
    Ok(())
}

/// Print the derived state of one path.
///
/// Unmatched paths report `not-selected`, with a warning on stderr.
pub fn state(ctx: &Context, file: &Path, path: &str) -> Result<()> {
    let lattice = load(ctx, file)?;
    if lattice.find_node(path).is_none() {
        output::warn(format!("No node matches '{}'", path), ctx.verbosity);
    }
    println!("{}", lattice.selection_state_at(path));
    Ok(())
}

/// Print the explicit selection as pretty JSON.
pub fn selection(ctx: &Context, file: &Path) -> Result<()> {
    let lattice = load(ctx, file)?;
    let json = serde_json::to_string_pretty(&lattice.selection())
        .context("Failed to encode selection")?;
    println!("{}", json);
    Ok(())
}
