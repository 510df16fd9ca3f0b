//! add and link commands - Grow the lattice

use super::{existing, load, save, Context};
use crate::ui::output;
use anyhow::{Context as _, Result};
use std::path::Path;

/// Create every missing node along each path.
pub fn add(ctx: &Context, file: &Path, paths: &[String]) -> Result<()> {
    let mut lattice = load(ctx, file)?;
    let generation = lattice.generation();

    for path in paths {
        let before = lattice.len();
        lattice
            .add_node_at_path(path)
            .with_context(|| format!("Cannot add '{}'", path))?;
        let created = lattice.len() - before;
        if created == 0 {
            output::print(format!("{} already exists", path), ctx.verbosity);
        } else {
            output::print(
                format!("Added {} ({} new node(s))", path, created),
                ctx.verbosity,
            );
        }
    }

    if lattice.generation() != generation {
        save(&lattice, file)?;
    }
    Ok(())
}

/// Cross-link two existing nodes.
pub fn link(ctx: &Context, file: &Path, src: &str, dst: &str) -> Result<()> {
    let mut lattice = load(ctx, file)?;
    let from = existing(&lattice, src)?;
    let to = existing(&lattice, dst)?;

    if lattice.add_cross_link(from, to)? {
        save(&lattice, file)?;
        output::print(format!("Linked {} -> {}", src, dst), ctx.verbosity);
    } else {
        output::print(format!("{} -> {} already linked", src, dst), ctx.verbosity);
    }
    Ok(())
}
