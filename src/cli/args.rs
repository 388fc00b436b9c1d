//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Tri-state checkbox trees: show, toggle and reconcile tree documents
#[derive(Parser, Debug)]
#[command(name = "checktree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Settings file (default: $XDG_CONFIG_HOME/checktree/checktree.toml)
    #[arg(short, long, global = true, env = "CHECKTREE_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a tree document
    Show {
        /// Tree document (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Toggle nodes in order, then render
    Toggle {
        /// Tree document (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Slash-separated name paths below the root, e.g. "Shopping/Eggs"; "" is the root
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Force a node and its descendants to a selection, then render
    Set {
        /// Tree document (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Slash-separated name path below the root
        path: String,
        /// Selection to apply
        #[arg(action = ArgAction::Set)]
        selected: bool,
    },

    /// List selected sections and leaves
    Selected {
        /// Tree document (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Toggle these paths first
        #[arg(short, long)]
        toggle: Vec<String>,
    },

    /// Reconcile a tree against an [[items]] document and render the result
    Rebuild {
        /// Current tree document (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Document with the new [[items]] descriptors
        #[arg(value_hint = ValueHint::FilePath)]
        items: PathBuf,
        /// Toggle these paths before rebuilding
        #[arg(short, long)]
        toggle: Vec<String>,
    },

    /// Print effective settings
    Config,

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
