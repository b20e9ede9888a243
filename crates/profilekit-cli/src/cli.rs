use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Inspect categorized configuration profiles
///
/// Resolve named profiles with default fallback and aliases, as applications using profilekit see them
#[derive(Parser, Debug)]
#[command(name = "profilekit")]
#[command(about, long_about = None, version)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Profiles file (default: profiles.toml in the current directory or a parent)
    #[arg(long, global = true, value_name = "PATH", env = "PROFILEKIT_SOURCE")]
    pub source: Option<PathBuf>,

    /// Cache the consolidated profiles in this file
    #[arg(long, global = true, value_name = "PATH", env = "PROFILEKIT_CACHE")]
    pub cache: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the profile a name resolves to
    Show {
        /// Profile category
        category: String,

        /// Profile name or alias (default profile when omitted)
        name: Option<String>,

        /// Fail instead of falling back to the default profile
        #[arg(long)]
        exact: bool,

        /// Print the profile as JSON
        #[arg(long)]
        json: bool,
    },

    /// List every category with its profiles and aliases
    List,

    /// Load the profiles file and report problems
    Check,
}
