//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Loads the snapshot file named on the command line
//! 2. Calls the lattice API
//! 3. Writes the file back if the lattice changed
//! 4. Formats and displays output
//!
//! Query output (trees, states, JSON) is printed even in quiet mode;
//! progress messages are not.

mod completion;
mod init;
mod merge;
mod query;
mod select;
mod structure;

pub use completion::completion;
pub use init::init;
pub use merge::merge;
pub use query::{selection, show, state};
pub use select::{apply, clear, deselect, deselect_all, select, select_all};
pub use structure::{add, link};

use super::args::Command;
use crate::core::config::LatticeConfig;
use crate::core::lattice::Lattice;
use crate::core::types::NodeId;
use crate::ui::output::Verbosity;
use anyhow::{anyhow, Context as _, Result};
use std::fs;
use std::path::Path;

/// Execution context for commands.
///
/// Contains settings derived from CLI flags and configuration.
#[derive(Debug, Clone)]
pub struct Context {
    /// Effective lattice configuration.
    pub config: LatticeConfig,
    /// Output verbosity.
    pub verbosity: Verbosity,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            config: LatticeConfig::default(),
            verbosity: Verbosity::Normal,
        }
    }
}

/// Dispatch a parsed command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Init { file, force } => init::init(ctx, &file, force),

        // Structure
        Command::Add { file, paths } => structure::add(ctx, &file, &paths),
        Command::Link { file, src, dst } => structure::link(ctx, &file, &src, &dst),

        // Selection
        Command::Select { file, paths } => select::select(ctx, &file, &paths),
        Command::Deselect { file, paths } => select::deselect(ctx, &file, &paths),
        Command::SelectAll { file, pattern } => select::select_all(ctx, &file, &pattern),
        Command::DeselectAll { file, pattern } => select::deselect_all(ctx, &file, &pattern),
        Command::Clear { file } => select::clear(ctx, &file),
        Command::Apply { file, selection } => select::apply(ctx, &file, &selection),

        // Queries
        Command::Show { file } => query::show(ctx, &file),
        Command::State { file, path } => query::state(ctx, &file, &path),
        Command::Selection { file } => query::selection(ctx, &file),

        Command::Merge { file, sources } => merge::merge(ctx, &file, &sources),
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// Read a snapshot file into a lattice honoring the configuration.
pub(crate) fn load(ctx: &Context, file: &Path) -> Result<Lattice> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("Failed to read snapshot '{}'", file.display()))?;
    let mut lattice = Lattice::with_config(&ctx.config);
    lattice
        .deserialize(&text)
        .with_context(|| format!("Invalid snapshot '{}'", file.display()))?;
    Ok(lattice)
}

/// Write a lattice back to its snapshot file.
pub(crate) fn save(lattice: &Lattice, file: &Path) -> Result<()> {
    let text = lattice.serialize().context("Failed to encode snapshot")?;
    fs::write(file, text)
        .with_context(|| format!("Failed to write snapshot '{}'", file.display()))?;
    tracing::debug!(file = %file.display(), nodes = lattice.len(), "snapshot saved");
    Ok(())
}

/// Resolve a path that must already exist.
pub(crate) fn existing(lattice: &Lattice, path: &str) -> Result<NodeId> {
    lattice
        .find_node(path)
        .ok_or_else(|| anyhow!("No node matches '{}'", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_reports_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load(&Context::default(), &dir.path().join("none.xml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read snapshot"));
    }

    #[test]
    fn load_reports_invalid_snapshot() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("bad.xml");
        fs::write(&file, "<not-a-lattice/>").unwrap();
        let err = load(&Context::default(), &file).unwrap_err();
        assert!(err.to_string().contains("Invalid snapshot"));
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("mesh.xml");
        let mut lattice = Lattice::new();
        lattice.select_path("/base/blk-1").unwrap();
        save(&lattice, &file).unwrap();

        let loaded = load(&Context::default(), &file).unwrap();
        assert_eq!(loaded.selection(), lattice.selection());
        assert!(existing(&loaded, "//blk-1").is_ok());
        assert!(existing(&loaded, "//blk-2").is_err());
    }
}
