//! init command - Create an empty snapshot

use super::{save, Context};
use crate::core::lattice::Lattice;
use crate::ui::output;
use anyhow::{bail, Result};
use std::path::Path;

/// Write a root-only lattice to `file`.
///
/// # Arguments
///
/// * `ctx` - Execution context
/// * `file` - Snapshot file to create
/// * `force` - Overwrite an existing file
pub fn init(ctx: &Context, file: &Path, force: bool) -> Result<()> {
    if file.exists() && !force {
        bail!(
            "'{}' already exists. Use --force to overwrite it.",
            file.display()
        );
    }

    let lattice = Lattice::with_config(&ctx.config);
    save(&lattice, file)?;

    output::print(
        format!("Initialized empty lattice in {}", file.display()),
        ctx.verbosity,
    );
    Ok(())
}
