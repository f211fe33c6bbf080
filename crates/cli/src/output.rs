//! Terminal rendering of schemas, reconciliations and tables.

use anyhow::Result;
use colored::{ColoredString, Colorize};
use geocols_core::{ColumnClass, ExportReport, Reconciliation, ReferenceSchema};
use geocols_sheet::Sheet;

/// Widest a preview cell is allowed to be.
const MAX_CELL_WIDTH: usize = 16;

/// Output format for results.
#[derive(Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Aligned table output (default)
    #[default]
    Table,
}

pub fn print_schema(schema: &ReferenceSchema, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "columns": schema.to_vec(),
                "labels": schema.custom_labels().collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Table => {
            let labels: Vec<&str> = schema.custom_labels().collect();
            for (i, name) in schema.columns().enumerate() {
                if labels.contains(&name) {
                    println!("{:>3}  {} {}", i + 1, name, "(label)".cyan());
                } else {
                    println!("{:>3}  {name}", i + 1);
                }
            }
        }
    }
    Ok(())
}

pub fn print_reconciliation(rec: &Reconciliation, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "missing": rec.missing,
                "extra": rec.extra,
                "dropped": rec.dropped,
                "final_order": rec.final_order,
                "classes": rec.classes(),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Table => {
            let width = rec
                .final_order
                .iter()
                .chain(&rec.dropped)
                .map(String::len)
                .max()
                .unwrap_or(0);
            for (i, name) in rec.final_order.iter().enumerate() {
                let class = rec.classify(name).map_or_else(|| "?".normal(), class_label);
                println!("{:>3}  {name:<width$}  {class}", i + 1);
            }
            for name in &rec.dropped {
                println!("  -  {name:<width$}  {}", "dropped".dimmed());
            }
            println!(
                "\n{} columns: {} missing, {} extra, {} dropped",
                rec.final_order.len(),
                rec.missing.len(),
                rec.extra.len(),
                rec.dropped.len()
            );
        }
    }
    Ok(())
}

pub fn print_report(report: &ExportReport) {
    println!(
        "{} {} ({} rows, {} columns)",
        "Wrote".green().bold(),
        report.path.display(),
        report.rows,
        report.columns.len()
    );
    match report.extra_range_label() {
        Some(range) => println!(
            "Flagged {} cells of extra columns in {}",
            report.styled_cells,
            range.red()
        ),
        None => println!("No extra columns to flag"),
    }
}

/// Print a preview table under its header; `total` is the full row count.
pub fn print_preview(sheet: &Sheet, total: usize) {
    let Some(names) = sheet.column_names() else {
        println!("(no header)");
        return;
    };
    if names.is_empty() {
        println!("(no columns)");
        return;
    }

    let rows: Vec<Vec<String>> = sheet
        .rows()
        .map(|row| row.iter().map(|cell| truncate(&cell.to_string())).collect())
        .collect();

    let widths: Vec<usize> = names
        .iter()
        .enumerate()
        .map(|(col, name)| {
            rows.iter()
                .filter_map(|row| row.get(col))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(truncate(name).chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = names
        .iter()
        .zip(&widths)
        .map(|(name, &w)| format!("{:<w$}", truncate(name)))
        .collect();
    println!("{}", header.join(" | ").bold());
    for row in &rows {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{cell:<w$}"))
            .collect();
        println!("{}", line.join(" | "));
    }
    if total > sheet.row_count() {
        println!("... {} more rows", total - sheet.row_count());
    }
}

fn class_label(class: ColumnClass) -> ColoredString {
    match class {
        ColumnClass::Known => "known".green(),
        ColumnClass::Missing => "missing".yellow(),
        ColumnClass::Extra => "extra".red(),
    }
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_CELL_WIDTH {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(MAX_CELL_WIDTH - 1).collect();
    cut.push('…');
    cut
}
