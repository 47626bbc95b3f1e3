use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use onco_cli::types::RunSummary;

pub fn print_summary(summary: &RunSummary) {
    println!("Input: {}", summary.input.display());
    println!(
        "Output: {} ({})",
        summary.output.display(),
        summary.format.as_str()
    );
    println!("Elapsed: {:.2?}", summary.elapsed);

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Command"),
        header_cell("Mode"),
        header_cell("Records"),
        header_cell("Matched"),
        header_cell("Unmatched"),
        header_cell("Failed"),
        header_cell("Candidates"),
    ]);
    apply_summary_table_style(&mut table, 100);
    for index in 2..=6 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    let stats = &summary.stats;
    table.add_row(vec![
        Cell::new(summary.command)
            .fg(Color::Blue)
            .add_attribute(Attribute::Bold),
        match summary.mode {
            Some(mode) => Cell::new(mode.as_str()),
            None => dim_cell("-"),
        },
        Cell::new(stats.records).add_attribute(Attribute::Bold),
        count_cell(stats.matched, Color::Green),
        count_cell(stats.unmatched, Color::Yellow),
        count_cell(stats.failed, Color::Red),
        Cell::new(stats.candidates),
    ]);
    println!("{table}");
    print_issue_table(summary);
}

fn print_issue_table(summary: &RunSummary) {
    if summary.reference_issues.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Row"),
        header_cell("Code"),
        header_cell("Excluded because"),
    ]);
    apply_summary_table_style(&mut table, 120);
    align_column(&mut table, 0, CellAlignment::Right);
    for issue in &summary.reference_issues {
        let code = if issue.code.is_empty() {
            dim_cell("-")
        } else {
            Cell::new(&issue.code)
        };
        table.add_row(vec![
            Cell::new(issue.row),
            code,
            Cell::new(issue.kind.to_string()).fg(Color::Yellow),
        ]);
    }
    println!();
    println!("Reference issues:");
    println!("{table}");
}

fn apply_summary_table_style(table: &mut Table, width: u16) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(width);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
