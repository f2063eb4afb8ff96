//! Plain-text rendering of benchmark results.

use crate::bench::{column_labels, ComparisonReport, CostTable, Metric};

/// Column alignment inside a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

fn looks_numeric(cell: &str) -> bool {
    !cell.is_empty() && cell.trim_start_matches('$').parse::<f64>().is_ok()
}

/// Bordered grid with an `=` rule under the header. Numeric cells are
/// right-aligned, everything else left-aligned.
pub fn render_grid(headers: &[String], rows: &[Vec<String>]) -> String {
    let columns = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(columns) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let rule = |fill: char| -> String {
        let mut line = String::from("+");
        for width in &widths {
            line.extend(std::iter::repeat(fill).take(width + 2));
            line.push('+');
        }
        line
    };

    let line = |cells: &[String], header: bool| -> String {
        let mut out = String::from("|");
        for (i, width) in widths.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            let align = if !header && looks_numeric(cell) { Align::Right } else { Align::Left };
            match align {
                Align::Left => out.push_str(&format!(" {:<width$} |", cell, width = width)),
                Align::Right => out.push_str(&format!(" {:>width$} |", cell, width = width)),
            }
        }
        out
    };

    let mut out = Vec::with_capacity(rows.len() * 2 + 3);
    out.push(rule('-'));
    out.push(line(headers, true));
    out.push(rule('='));
    for row in rows {
        out.push(line(row.as_slice(), false));
        out.push(rule('-'));
    }
    if rows.is_empty() {
        out.push(rule('-'));
    }
    out.join("\n")
}

/// Header and body cells for a cost table.
pub fn cost_table_cells(table: &CostTable) -> (Vec<String>, Vec<Vec<String>>) {
    let mut headers = vec!["Prompt Type".to_string()];
    for label in column_labels(&table.models) {
        headers.push(format!("{} In", label));
        headers.push(format!("{} Out", label));
        headers.push(format!("{} Cost", label));
    }

    let rows = table
        .rows
        .iter()
        .map(|row| {
            let mut cells = vec![row.label.clone()];
            for i in 0..table.models.len() {
                match row.cells.get(i).copied().flatten() {
                    Some(cell) => {
                        cells.push(cell.tokens_in.to_string());
                        cells.push(cell.tokens_out.to_string());
                        cells.push(format!("{:.6}", cell.api_cost));
                    }
                    None => cells.extend(["-", "-", "-"].iter().map(|s| s.to_string())),
                }
            }
            cells
        })
        .collect();

    (headers, rows)
}

pub fn render_cost_table(table: &CostTable) -> String {
    let (headers, rows) = cost_table_cells(table);
    render_grid(&headers, &rows)
}

/// Per-metric averages for each model.
pub fn render_comparison_summary(report: &ComparisonReport) -> String {
    let mut out = String::from("=== Model Comparison ===\n");
    for metric in Metric::all() {
        out.push_str(&format!("\n{}:\n", metric.title()));
        for run in &report.runs {
            match run.average(metric) {
                Some(avg) => out.push_str(&format!("{}: {:.2}\n", run.model_id, avg)),
                None => out.push_str(&format!("{}: n/a\n", run.model_id)),
            }
        }
    }
    out
}

/// `$0.000123` style cost.
pub fn format_cost(cost: f64) -> String {
    format!("${:.6}", cost)
}
