//! ddlscope CLI - inspect tables and keys in SQL schema dumps

mod args;
mod config;
mod output;

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use ddlscope_core::{extract, extract_as, SqlDialect, Structure};
use miette::{IntoDiagnostic, Result};
use tracing::{info, warn};

use crate::args::{Args, Command};
use crate::config::Config;
use crate::output::OutputFormatter;

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing
    let level = match (args.quiet, args.verbose) {
        (true, _) => tracing::Level::ERROR,
        (false, 0) => tracing::Level::WARN,
        (false, 1) => tracing::Level::INFO,
        (false, _) => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    match run(args) {
        Ok(found) => {
            if found {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            eprintln!("Error: {:?}", e);
            ExitCode::from(2)
        }
    }
}

/// Returns whether any input produced something to report
fn run(args: Args) -> Result<bool> {
    let config = if let Some(path) = &args.config {
        Config::from_file(path)?
    } else {
        Config::find_and_load()?.unwrap_or_default()
    };

    match args.command {
        Command::Show {
            files,
            dialect,
            format,
        } => {
            let config = config.merge_with_args(&files, &dialect, &format);
            let forced = config.dialect()?;
            let output_format = config.output_format();

            let mut found = false;
            for file in config.schema_files()? {
                let content = read_dump(&file)?;
                let (structure, dialect) = extract_file(&content, forced);
                info!(file = %file.display(), tables = structure.len(), "extracted structure");
                found |= !structure.is_empty();

                OutputFormatter::new(output_format, file.display().to_string())
                    .print_structure(&structure, dialect)?;
            }
            Ok(found)
        }

        Command::Detect { files } => {
            let config = config.merge_with_args(&files, &None, &None);

            let mut found = false;
            for file in config.schema_files()? {
                let content = read_dump(&file)?;
                let dialect = SqlDialect::detect(&content);
                found |= dialect.is_some();
                match dialect {
                    Some(dialect) => println!("{}: {}", file.display(), dialect),
                    None => println!("{}: unknown", file.display()),
                }
            }
            Ok(found)
        }

        Command::Refs {
            table,
            files,
            dialect,
            format,
        } => {
            let config = config.merge_with_args(&files, &dialect, &format);
            let forced = config.dialect()?;
            let output_format = config.output_format();

            let mut found = false;
            for file in config.schema_files()? {
                let content = read_dump(&file)?;
                let (structure, _) = extract_file(&content, forced);
                let Some(target) = structure.table(&table) else {
                    warn!(file = %file.display(), table = %table, "table not found in dump");
                    continue;
                };
                found = true;
                OutputFormatter::new(output_format, file.display().to_string())
                    .print_refs(&structure, target)?;
            }
            Ok(found)
        }
    }
}

fn read_dump(path: &Path) -> Result<String> {
    if !path.exists() {
        miette::bail!(
            help = "Pass a dump file, or list it under `schema` in ddlscope.toml",
            "No schema dump found at {}",
            path.display()
        );
    }
    fs::read_to_string(path).into_diagnostic()
}

/// Extract with a forced dialect, or detect it from the content
fn extract_file(content: &str, forced: Option<SqlDialect>) -> (Structure, Option<SqlDialect>) {
    match forced {
        Some(dialect) => (extract_as(dialect, content), Some(dialect)),
        None => (extract(content), SqlDialect::detect(content)),
    }
}
