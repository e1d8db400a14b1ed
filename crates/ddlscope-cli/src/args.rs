//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "ddlscope")]
#[command(author, version, about = "Inspect tables and keys in SQL schema dumps")]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file (defaults to ddlscope.toml in this or a parent directory)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Display the tables and columns of schema dumps
    Show {
        /// Schema dump files (supports glob patterns)
        files: Vec<PathBuf>,

        /// Force a SQL dialect instead of detecting it
        #[arg(short, long)]
        dialect: Option<String>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Report the detected dialect of schema dumps
    Detect {
        /// Schema dump files (supports glob patterns)
        files: Vec<PathBuf>,
    },

    /// List foreign keys leaving and entering a table
    Refs {
        /// Table to inspect
        table: String,

        /// Schema dump files (supports glob patterns)
        files: Vec<PathBuf>,

        /// Force a SQL dialect instead of detecting it
        #[arg(short, long)]
        dialect: Option<String>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable tree
    #[default]
    Human,
    /// JSON output
    Json,
}
