//! Interactive session loop.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use geocols_core::{ExportOptions, Session};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

use crate::output::{self, OutputFormat};

const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Run the REPL over an opened session.
pub fn run(session: &mut Session, options: &ExportOptions) -> Result<()> {
    println!(
        "{} {} - Interactive Mode",
        "geocols".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    if let Some(upload) = session.upload() {
        println!("Opened {}", upload.display_name.bold());
    }
    println!(
        "Type {} for help, {} to exit\n",
        ":help".yellow(),
        ":quit".yellow()
    );

    let mut rl = DefaultEditor::new()?;
    let history_path = dirs_history_path();

    // Load history if available
    if let Some(ref path) = history_path {
        let _ = rl.load_history(path);
    }

    loop {
        let prompt = "geocols> ".green().bold().to_string();

        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                match execute(session, options, line) {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Quit) => break,
                    Err(e) => println!("{} {e:#}", "Error:".red().bold()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(e) => {
                println!("{} {e}", "Error:".red().bold());
                break;
            }
        }
    }

    // Save history
    if let Some(ref path) = history_path {
        let _ = rl.save_history(path);
    }

    Ok(())
}

#[derive(Debug)]
enum Flow {
    Continue,
    Quit,
}

/// Run one REPL command against the session.
fn execute(session: &mut Session, options: &ExportOptions, line: &str) -> Result<Flow> {
    let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    match command {
        ":quit" | ":q" | ":exit" => return Ok(Flow::Quit),
        ":help" | ":h" | ":?" => print_help(),
        ":sheets" => {
            let current = session.table().map(|t| t.name().to_string());
            if let Some(upload) = session.upload() {
                for name in &upload.sheet_names {
                    if current.as_deref() == Some(name.as_str()) {
                        println!("* {}", name.bold());
                    } else {
                        println!("  {name}");
                    }
                }
            }
        }
        ":use" => {
            if rest.is_empty() {
                bail!("usage: :use <sheet>");
            }
            let table = session.select_sheet(rest)?;
            println!(
                "Loaded {} ({} rows, {} columns)",
                table.name().bold(),
                table.row_count(),
                table.col_count()
            );
        }
        ":show" => {
            let reconciliation = session.reconcile()?;
            output::print_reconciliation(&reconciliation, OutputFormat::Table)?;
        }
        ":preview" => {
            let limit = if rest.is_empty() {
                DEFAULT_PREVIEW_ROWS
            } else {
                rest.parse()
                    .with_context(|| format!("invalid row count: '{rest}'"))?
            };
            let preview = session.preview(limit)?;
            let total = session.table().map_or(0, |t| t.row_count());
            output::print_preview(&preview, total);
        }
        ":order" => {
            if rest.is_empty() {
                for (i, name) in session.effective_order().iter().enumerate() {
                    println!("{:>3}  {name}", i + 1);
                }
            } else {
                let order = rest
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
                session.set_order(order)?;
                println!("Order set ({} columns)", session.effective_order().len());
            }
        }
        ":all" => {
            session.select_all();
            println!("Selected all {} schema columns", session.schema().len());
        }
        ":move" => {
            let (from, to) = parse_move(rest)?;
            session.move_column(from, to)?;
            println!("Moved column {} to position {}", from + 1, to + 1);
        }
        ":clear" => {
            session.clear_order();
            println!("Order reset to the schema default");
        }
        ":add" => {
            if rest.is_empty() {
                bail!("usage: :add <label>");
            }
            if session.add_label(rest)? {
                println!("Added label {}", rest.cyan());
            } else {
                println!("{} is already in the schema", rest.cyan());
            }
        }
        ":labels" => {
            let labels: Vec<&str> = session.schema().custom_labels().collect();
            if labels.is_empty() {
                println!("(no custom labels)");
            } else {
                println!("{}", labels.join(", "));
            }
        }
        ":save" => {
            let report = session.save(options)?;
            output::print_report(report);
        }
        _ => bail!("Unknown command: {line} (type :help)"),
    }
    Ok(Flow::Continue)
}

/// Parse `FROM TO` as 1-based positions into 0-based indices.
fn parse_move(args: &str) -> Result<(usize, usize)> {
    let mut parts = args.split_whitespace();
    let (Some(from), Some(to), None) = (parts.next(), parts.next(), parts.next()) else {
        bail!("usage: :move <from> <to>");
    };
    let from: usize = from
        .parse()
        .with_context(|| format!("invalid position: '{from}'"))?;
    let to: usize = to.parse().with_context(|| format!("invalid position: '{to}'"))?;
    if from == 0 || to == 0 {
        bail!("positions start at 1");
    }
    Ok((from - 1, to - 1))
}

/// Get the history file path.
fn dirs_history_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|mut p| {
        p.push("geocols");
        let _ = std::fs::create_dir_all(&p);
        p.push("history.txt");
        p
    })
}

fn print_help() {
    const COMMANDS: &[(&str, &str)] = &[
        (":sheets", "List sheets of the workbook"),
        (":use <sheet>", "Load another sheet"),
        (":show", "Show column classification"),
        (":preview [n]", "Preview the reconciled table"),
        (":order [a,b,..]", "Show or set the column order"),
        (":all", "Select every schema column"),
        (":move <from> <to>", "Move a column (1-based positions)"),
        (":clear", "Reset to the schema order"),
        (":add <label>", "Add a custom label"),
        (":labels", "List custom labels"),
        (":save", "Write the reconciled workbook"),
        (":help", "Show this help"),
        (":quit", "Exit"),
    ];

    println!("{}", "Commands:".bold());
    for (command, description) in COMMANDS {
        println!("  {} {description}", format!("{command:<18}").yellow());
    }
}
