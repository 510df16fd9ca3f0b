//! select, deselect, select-all, deselect-all, clear and apply commands

use super::{load, save, Context};
use crate::core::lattice::Lattice;
use crate::core::selection::Selection;
use crate::ui::output;
use anyhow::{Context as _, Result};
use std::fs;
use std::path::Path;

/// Select each path, creating missing nodes.
pub fn select(ctx: &Context, file: &Path, paths: &[String]) -> Result<()> {
    mark(ctx, file, paths, true)
}

/// Deselect each path, creating missing nodes.
pub fn deselect(ctx: &Context, file: &Path, paths: &[String]) -> Result<()> {
    mark(ctx, file, paths, false)
}

fn mark(ctx: &Context, file: &Path, paths: &[String], selected: bool) -> Result<()> {
    let mut lattice = load(ctx, file)?;
    let generation = lattice.generation();
    let verb = if selected { "selected" } else { "deselected" };

    for path in paths {
        let result = if selected {
            lattice.select_path(path)
        } else {
            lattice.deselect_path(path)
        };
        let changed = result.with_context(|| format!("Cannot update '{}'", path))?;

        if changed {
            output::print(format!("{} {}", path, verb), ctx.verbosity);
        } else {
            output::print(format!("{} already {}", path, verb), ctx.verbosity);
        }
    }

    save_if_changed(&lattice, file, generation)
}

/// Select every node matching `pattern`.
pub fn select_all(ctx: &Context, file: &Path, pattern: &str) -> Result<()> {
    mark_all(ctx, file, pattern, true)
}

/// Deselect every node matching `pattern`.
pub fn deselect_all(ctx: &Context, file: &Path, pattern: &str) -> Result<()> {
    mark_all(ctx, file, pattern, false)
}

fn mark_all(ctx: &Context, file: &Path, pattern: &str, selected: bool) -> Result<()> {
    let mut lattice = load(ctx, file)?;
    let matches = lattice.find_nodes(pattern).len();
    if matches == 0 {
        output::warn(format!("No node matches '{}'", pattern), ctx.verbosity);
        return Ok(());
    }

    let generation = lattice.generation();
    let changed = if selected {
        lattice.select_all(pattern)
    } else {
        lattice.deselect_all(pattern)
    };

    if changed {
        let verb = if selected { "Selected" } else { "Deselected" };
        output::print(format!("{} {} node(s)", verb, matches), ctx.verbosity);
    } else {
        output::print("No changes", ctx.verbosity);
    }
    save_if_changed(&lattice, file, generation)
}

/// Drop every explicit preference.
pub fn clear(ctx: &Context, file: &Path) -> Result<()> {
    let mut lattice = load(ctx, file)?;
    let count = lattice.selection().len();
    lattice.clear_selections();
    save(&lattice, file)?;

    output::print(format!("Cleared {} preference(s)", count), ctx.verbosity);
    Ok(())
}

/// Replay a JSON selection map.
pub fn apply(ctx: &Context, file: &Path, selection_file: &Path) -> Result<()> {
    let text = fs::read_to_string(selection_file)
        .with_context(|| format!("Failed to read '{}'", selection_file.display()))?;
    let selection: Selection = serde_json::from_str(&text).with_context(|| {
        format!(
            "'{}' is not a JSON object of path -> bool",
            selection_file.display()
        )
    })?;

    let mut lattice = load(ctx, file)?;
    let generation = lattice.generation();
    lattice.set_selection(&selection)?;

    output::print(
        format!("Applied {} preference(s)", selection.len()),
        ctx.verbosity,
    );
    save_if_changed(&lattice, file, generation)
}

fn save_if_changed(lattice: &Lattice, file: &Path, generation: u64) -> Result<()> {
    if lattice.generation() != generation {
        save(lattice, file)?;
    }
    Ok(())
}
