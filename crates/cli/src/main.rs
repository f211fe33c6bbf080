//! # geocols-cli
//!
//! Command-line interface for reconciling geochemical tables against the
//! reference column schema.

mod output;
mod repl;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use geocols_core::{ExportOptions, Session, Settings};
use geocols_sheet::xlsx_sheet_names;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::output::OutputFormat;

/// geocols - reorder geochemical sample tables to a reference column layout
#[derive(Parser)]
#[command(name = "geocols")]
#[command(author, version, about = "Reconcile spreadsheet columns against a reference schema", long_about = None)]
struct Cli {
    /// Settings file (.yaml, .yml or .json)
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the reference columns
    Schema {
        /// Add a custom label to the schema
        #[arg(short = 'l', long = "label", value_name = "LABEL")]
        labels: Vec<String>,

        /// Output format
        #[arg(short = 'f', long = "format", default_value = "table")]
        format: OutputFormat,
    },

    /// List the sheets of a workbook
    Sheets {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Show how a sheet's columns reconcile against the schema
    Inspect {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        selection: Selection,

        /// Output format
        #[arg(short = 'f', long = "format", default_value = "table")]
        format: OutputFormat,
    },

    /// Write the reconciled workbook with extra columns flagged
    Export {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        selection: Selection,

        /// Directory for the output file
        #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Fail instead of replacing an existing output file
        #[arg(long)]
        no_clobber: bool,
    },

    /// Open a workbook in an interactive session
    Interactive {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

impl Command {
    /// Subcommand name as typed on the command line.
    fn name(&self) -> &'static str {
        match self {
            Command::Schema { .. } => "schema",
            Command::Sheets { .. } => "sheets",
            Command::Inspect { .. } => "inspect",
            Command::Export { .. } => "export",
            Command::Interactive { .. } => "interactive",
        }
    }
}

/// Sheet and column order selection shared by `inspect` and `export`.
#[derive(Args)]
struct Selection {
    /// Sheet to load (defaults to the first sheet)
    #[arg(short, long)]
    sheet: Option<String>,

    /// Explicit output order, comma separated
    #[arg(long, value_delimiter = ',', conflicts_with = "all")]
    order: Vec<String>,

    /// Select every schema column in default order
    #[arg(long)]
    all: bool,

    /// Add a custom label to the schema
    #[arg(short = 'l', long = "label", value_name = "LABEL")]
    labels: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::discover(cli.config.as_deref()).context("Failed to load settings")?;

    info!(command = cli.command.name(), "dispatching");
    match cli.command {
        Command::Schema { labels, format } => {
            let mut schema = settings.schema()?;
            for label in &labels {
                schema.add_label(label)?;
            }
            output::print_schema(&schema, format)
        }
        Command::Sheets { file } => {
            let names = xlsx_sheet_names(&file)
                .with_context(|| format!("Failed to read workbook: {}", file.display()))?;
            for name in names {
                println!("{name}");
            }
            Ok(())
        }
        Command::Inspect {
            file,
            selection,
            format,
        } => {
            let session = open_session(&settings, &file, &selection)?;
            let reconciliation = session.reconcile()?;
            output::print_reconciliation(&reconciliation, format)
        }
        Command::Export {
            file,
            selection,
            output_dir,
            no_clobber,
        } => {
            let mut session = open_session(&settings, &file, &selection)?;
            let mut options = ExportOptions::from_settings(&settings)?;
            if let Some(dir) = output_dir {
                options.output_dir = dir;
            }
            if no_clobber {
                options.overwrite = false;
            }
            info!(
                file = %file.display(),
                output_dir = %options.output_dir.display(),
                overwrite = options.overwrite,
                "exporting"
            );
            let report = session.save(&options)?;
            output::print_report(report);
            Ok(())
        }
        Command::Interactive { file } => {
            let mut session = Session::new(settings.schema()?);
            session
                .open(&file, None)
                .with_context(|| format!("Failed to open workbook: {}", file.display()))?;
            let options = ExportOptions::from_settings(&settings)?;
            repl::run(&mut session, &options)
        }
    }
}

/// Build a session for one workbook with the requested sheet, labels and order.
fn open_session(settings: &Settings, file: &Path, selection: &Selection) -> Result<Session> {
    let mut session = Session::new(settings.schema()?);
    session
        .open(file, None)
        .with_context(|| format!("Failed to open workbook: {}", file.display()))?;
    debug!(file = %file.display(), "opened workbook");

    if let Some(sheet) = &selection.sheet {
        session.select_sheet(sheet)?;
    }
    // Labels first so the order may name them
    for label in &selection.labels {
        if !session.add_label(label)? {
            eprintln!("{} label '{label}' is already in the schema", "Note:".yellow());
        }
    }
    if selection.all {
        session.select_all();
    } else if !selection.order.is_empty() {
        let order = selection.order.iter().map(|s| s.trim().to_string()).collect();
        session.set_order(order)?;
    }
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_names() {
        let cli = Cli::try_parse_from(["geocols", "sheets", "survey.xlsx"]).unwrap();
        assert_eq!(cli.command.name(), "sheets");

        let cli = Cli::try_parse_from([
            "geocols", "export", "survey.xlsx", "--order", "SiO2,Sample", "--no-clobber",
        ])
        .unwrap();
        assert_eq!(cli.command.name(), "export");
        let Command::Export {
            selection, no_clobber, ..
        } = cli.command
        else {
            panic!("expected export");
        };
        assert_eq!(selection.order, vec!["SiO2", "Sample"]);
        assert!(no_clobber);
    }

    #[test]
    fn test_order_conflicts_with_all() {
        assert!(Cli::try_parse_from(["geocols", "inspect", "a.xlsx", "--all", "--order", "Sample"]).is_err());
    }
}
