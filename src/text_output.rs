//! Console output: grid tables
//!
//! Layout follows the `grid` style of common table printers:
//!
//! ```text
//! +--------+-------+
//! | Metric | Value |
//! +========+=======+
//! | Cycles | 5000  |
//! +--------+-------+
//! ```

use crate::analyze::RunReport;
use crate::compare::ComparisonTable;
use crate::selector::ActiveCore;

/// Headline printed before the detailed metrics of a run
pub fn headline(core: &ActiveCore) -> String {
    format!(
        "Active CPU is {} with {} cycles and {} committed instructions",
        core.core, core.cycles, core.committed_insts
    )
}

/// Grid table formatter
#[derive(Debug)]
pub struct TextOutput {
    title: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TextOutput {
    /// Create a formatter for a table, filling missing cells with `marker`
    pub fn from_table(table: &ComparisonTable, marker: &str) -> Self {
        Self {
            title: table.title.clone(),
            headers: table.headers().into_iter().map(str::to_string).collect(),
            rows: table.display_rows(marker),
        }
    }

    fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }
        widths
    }

    fn separator(widths: &[usize], fill: char) -> String {
        let mut line = String::from("+");
        for width in widths {
            line.extend(std::iter::repeat(fill).take(width + 2));
            line.push('+');
        }
        line
    }

    fn format_row(widths: &[usize], cells: &[String]) -> String {
        let mut line = String::from("|");
        for (width, cell) in widths.iter().zip(cells) {
            line.push_str(&format!(" {:<width$} |", cell, width = width));
        }
        line
    }

    /// Render the titled grid
    pub fn render(&self) -> String {
        let widths = self.column_widths();
        let mut output = String::new();

        output.push_str(&format!("\n{}:\n", self.title));
        output.push_str(&Self::separator(&widths, '-'));
        output.push('\n');
        output.push_str(&Self::format_row(&widths, &self.headers));
        output.push('\n');
        output.push_str(&Self::separator(&widths, '='));
        output.push('\n');

        for row in &self.rows {
            output.push_str(&Self::format_row(&widths, row));
            output.push('\n');
            output.push_str(&Self::separator(&widths, '-'));
            output.push('\n');
        }

        output
    }
}

/// Headlines for every run followed by the category table
pub fn render_report(reports: &[RunReport], table: &ComparisonTable, marker: &str) -> String {
    let mut output = String::new();
    for report in reports {
        if reports.len() > 1 {
            output.push_str(&format!("{}: ", report.label));
        }
        output.push_str(&headline(&report.active_core));
        output.push('\n');
    }
    output.push_str(&TextOutput::from_table(table, marker).render());
    output
}
