//! CLI module for pyq-analyser
//!
//! Provides command-line interface parsing and handling for the pyq-server binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod init;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// pyq-analyser - question answering over uploaded documents
///
/// Upload question papers and notes, then ask questions answered from their
/// content with retrieval-augmented generation.
#[derive(Parser, Debug)]
#[command(
    name = "pyq-server",
    version,
    about = "pyq-analyser - question answering over uploaded documents",
    long_about = "A retrieval-augmented question answering server.\n\n\
                  Run without arguments to start the server, or use 'init' to scaffold a config file.",
    after_help = "EXAMPLES:\n    \
                  pyq-server init                          # Write a starter pyq.toml\n    \
                  pyq-server                               # Start the server (requires pyq.toml)\n    \
                  pyq-server --config my.toml              # Use a custom config file\n    \
                  pyq-server ask \"What is paging?\" -f notes.txt  # Answer once from local files"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "pyq.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a starter pyq.toml
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing pyq.toml
        #[arg(short, long)]
        force: bool,

        /// Provider to configure (gemini or ollama)
        #[arg(long, default_value = "gemini")]
        provider: String,

        /// Host address for the server
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port for the server
        #[arg(long, default_value = "8000")]
        port: u16,
    },

    /// Show configuration information
    Config {
        /// Validate the configuration file
        #[arg(long)]
        validate: bool,
    },

    /// Index local files into a fresh index and answer one question
    Ask {
        /// The question to answer
        question: String,

        /// Files to index before answering
        #[arg(short, long = "file")]
        files: Vec<PathBuf>,

        /// Number of chunks to retrieve
        #[arg(short)]
        k: Option<usize>,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
