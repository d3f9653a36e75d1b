//! CSV output format for category tables
//!
//! The spreadsheet-facing format: one header row, then one row per metric.

use crate::compare::ComparisonTable;

/// CSV output formatter
#[derive(Debug)]
pub struct CsvOutput {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CsvOutput {
    /// Create a CSV formatter for a table, filling missing cells with `marker`
    pub fn from_table(table: &ComparisonTable, marker: &str) -> Self {
        Self {
            headers: table.headers().into_iter().map(str::to_string).collect(),
            rows: table.display_rows(marker),
        }
    }

    /// Escape CSV field (handle commas, quotes, newlines)
    fn escape_field(field: &str) -> String {
        if field.contains(',') || field.contains('"') || field.contains('\n') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    fn format_row(fields: &[String]) -> String {
        fields
            .iter()
            .map(|f| Self::escape_field(f))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Generate CSV output as string
    pub fn to_csv(&self) -> String {
        let mut output = String::new();

        output.push_str(&Self::format_row(&self.headers));
        output.push('\n');

        for row in &self.rows {
            output.push_str(&Self::format_row(row));
            output.push('\n');
        }

        output
    }
}
