//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Use this config file
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// sil - Subset inclusion lattice over snapshot files
#[derive(Parser, Debug)]
#[command(name = "sil")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Use this config file instead of the default locations
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an empty lattice snapshot
    #[command(
        name = "init",
        long_about = "Create a snapshot file holding an empty lattice (root only).\n\n\
            Refuses to overwrite an existing file unless --force is given.",
        after_help = "\
EXAMPLES:
    sil init mesh.xml
    sil init mesh.xml --force    # start over"
    )]
    Init {
        /// Snapshot file to create
        file: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Create nodes along fully-qualified paths
    #[command(
        name = "add",
        long_about = "Create every missing node along each path.\n\n\
            Paths must be fully qualified ('/a/b'); search paths ('//b') are \
            rejected because they do not say where a new node belongs. Adding \
            an existing path is a no-op.",
        after_help = "\
EXAMPLES:
    sil add mesh.xml /Hierarchy/Base/blk-1 /Hierarchy/Base/blk-2
    sil add mesh.xml /Families/Wall"
    )]
    Add {
        /// Snapshot file
        file: PathBuf,

        /// Paths to create
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<String>,
    },

    /// Cross-link two existing nodes
    #[command(
        name = "link",
        long_about = "Record a cross-link from SRC to DST.\n\n\
            Both paths must already resolve. Cross-links never affect \
            selection states.",
        after_help = "\
EXAMPLES:
    sil link mesh.xml /Families/Wall /Hierarchy/Base/blk-1"
    )]
    Link {
        /// Snapshot file
        file: PathBuf,

        /// Source node path
        src: String,

        /// Target node path
        dst: String,
    },

    /// Mark nodes selected, creating them if needed
    #[command(
        name = "select",
        after_help = "\
EXAMPLES:
    sil select mesh.xml /Hierarchy/Base/blk-1
    sil select mesh.xml //Grid           # first Grid anywhere"
    )]
    Select {
        /// Snapshot file
        file: PathBuf,

        /// Paths to select
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<String>,
    },

    /// Mark nodes deselected, creating them if needed
    #[command(name = "deselect")]
    Deselect {
        /// Snapshot file
        file: PathBuf,

        /// Paths to deselect
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<String>,
    },

    /// Select every existing node matching a pattern
    #[command(
        name = "select-all",
        long_about = "Select every existing node matching PATTERN.\n\n\
            Unlike select, no node is ever created.",
        after_help = "\
EXAMPLES:
    sil select-all mesh.xml //Grid       # every Grid at any depth"
    )]
    SelectAll {
        /// Snapshot file
        file: PathBuf,

        /// Path pattern
        pattern: String,
    },

    /// Deselect every existing node matching a pattern
    #[command(name = "deselect-all")]
    DeselectAll {
        /// Snapshot file
        file: PathBuf,

        /// Path pattern
        pattern: String,
    },

    /// Drop every explicit preference
    #[command(name = "clear")]
    Clear {
        /// Snapshot file
        file: PathBuf,
    },

    /// Print the tree with selection markers
    #[command(
        name = "show",
        after_help = "\
READING THE OUTPUT:
    [-] /
    [-]   Base         <- partly selected
    [x]     blk-1      <- blk-1 and everything below it selected
    [ ]     blk-2      <- nothing selected
    [ ]   Wall -> /Base/blk-2    <- cross-link"
    )]
    Show {
        /// Snapshot file
        file: PathBuf,
    },

    /// Print the selection state of one path
    #[command(name = "state")]
    State {
        /// Snapshot file
        file: PathBuf,

        /// Node path
        path: String,
    },

    /// Print the explicit selection as JSON
    #[command(
        name = "selection",
        long_about = "Print the explicit preferences as a JSON object mapping \
            fully-qualified paths to true (selected) or false (deselected).\n\n\
            The output can be replayed with 'sil apply'.",
        after_help = "\
EXAMPLES:
    sil selection old.xml > selection.json
    sil apply new.xml selection.json"
    )]
    Selection {
        /// Snapshot file
        file: PathBuf,
    },

    /// Replay a JSON selection map
    #[command(name = "apply")]
    Apply {
        /// Snapshot file
        file: PathBuf,

        /// JSON file mapping paths to true/false
        selection: PathBuf,
    },

    /// Merge other snapshots into a snapshot
    #[command(
        name = "merge",
        long_about = "Merge nodes, cross-links and preferences from each SOURCE.\n\n\
            Nodes are matched by path. Existing nodes, links and preferences \
            are never changed; a preference is only taken from a source when \
            the target has none.",
        after_help = "\
EXAMPLES:
    sil merge mesh.xml part-1.xml part-2.xml"
    )]
    Merge {
        /// Snapshot file to merge into
        file: PathBuf,

        /// Snapshots to merge from
        #[arg(required = true, value_name = "SOURCE")]
        sources: Vec<PathBuf>,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
EXAMPLES:
    # Bash
    sil completion bash > ~/.local/share/bash-completion/completions/sil

    # Zsh
    sil completion zsh > ~/.zfunc/_sil

    # Fish
    sil completion fish > ~/.config/fish/completions/sil.fish

    # PowerShell
    sil completion powershell >> $PROFILE"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
