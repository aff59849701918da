use anyhow::{Context, Result};
use skiff_athena::ResultTable;

/// One entry per line.
pub fn print_lines(entries: &[String]) {
    for entry in entries {
        println!("{entry}");
    }
}

pub fn print_table(table: &ResultTable, json: bool) -> Result<()> {
    println!("{}", render_table(table, json)?);
    Ok(())
}

fn render_table(table: &ResultTable, json: bool) -> Result<String> {
    if json {
        serde_json::to_string_pretty(table).context("failed to serialize result")
    } else {
        Ok(table.to_string())
    }
}
