//! merge command - Fold other snapshots into one

use super::{load, save, Context};
use crate::ui::output;
use anyhow::{Context as _, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Merge each source snapshot into `file`, in order.
///
/// Stops at the first source that cannot be read or merged; `file` is only
/// written if every source merged.
pub fn merge(ctx: &Context, file: &Path, sources: &[PathBuf]) -> Result<()> {
    let mut lattice = load(ctx, file)?;
    let generation = lattice.generation();

    for source in sources {
        let text = fs::read_to_string(source)
            .with_context(|| format!("Failed to read snapshot '{}'", source.display()))?;
        let summary = lattice
            .merge_str(&text)
            .with_context(|| format!("Cannot merge '{}'", source.display()))?;

        if summary.is_empty() {
            output::print(
                format!("{}: nothing new", source.display()),
                ctx.verbosity,
            );
        } else {
            output::print(
                format!(
                    "{}: {} node(s), {} link(s), {} preference(s)",
                    source.display(),
                    summary.nodes_added,
                    summary.links_added,
                    summary.preferences_adopted
                ),
                ctx.verbosity,
            );
        }
    }

    if lattice.generation() != generation {
        save(&lattice, file)?;
    }
    Ok(())
}
