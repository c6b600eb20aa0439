use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use remap_ingest::ValueFrequency;
use remap_map::{ConfidenceBand, MappingRule, MappingRuleStore, ProposalOutcome, Provenance};
use remap_model::{TabularDataset, TransformResponse};
use remap_transform::{PreviewRow, RowOutcome};

pub fn print_sheets(sheets: &[TabularDataset]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Sheet"),
        header_cell("Rows"),
        header_cell("Columns"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for sheet in sheets {
        let headers: Vec<String> = sheet
            .visible_headers()
            .into_iter()
            .map(|header| header.name)
            .collect();
        let columns = if headers.is_empty() {
            dim_cell("-")
        } else {
            Cell::new(headers.join(", "))
        };
        table.add_row(vec![
            Cell::new(sheet.sheet_name()).add_attribute(Attribute::Bold),
            Cell::new(sheet.row_count()),
            columns,
        ]);
    }
    println!("{table}");
}

/// Distinct values with counts, plus the current target when a rule set is given.
pub fn print_values(
    column: &str,
    frequencies: &[ValueFrequency],
    store: Option<&MappingRuleStore>,
) {
    println!("Column: {column}");
    let mut table = Table::new();
    let mut header = vec![header_cell("Value"), header_cell("Count")];
    if store.is_some() {
        header.push(header_cell("Target"));
        header.push(header_cell("Source"));
    }
    table.set_header(header);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);

    for frequency in frequencies {
        let mut row = vec![Cell::new(&frequency.value), Cell::new(frequency.count)];
        if let Some(store) = store {
            match store.get(&frequency.value) {
                Some(rule) => {
                    row.push(Cell::new(&rule.target_value));
                    row.push(provenance_cell(rule));
                }
                None => {
                    row.push(dim_cell("-"));
                    row.push(dim_cell("unmapped"));
                }
            }
        }
        table.add_row(row);
    }
    println!("{table}");

    if let Some(store) = store {
        let values: Vec<String> = frequencies.iter().map(|f| f.value.clone()).collect();
        let coverage = store.coverage(&values);
        println!(
            "Coverage: {}/{} values ({:.0}%)",
            coverage.covered,
            coverage.total(),
            coverage.ratio() * 100.0
        );
    }
}

pub fn print_rules(store: &MappingRuleStore) {
    if store.is_empty() {
        println!("No rules.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source value"),
        header_cell("Target value"),
        header_cell("Source"),
        header_cell("Confidence"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    for rule in store.rules() {
        table.add_row(vec![
            Cell::new(&rule.source_value),
            Cell::new(&rule.target_value),
            provenance_cell(rule),
            confidence_cell(rule),
        ]);
    }
    println!("{table}");
    let suppressed: Vec<&str> = store.suppressed().collect();
    if !suppressed.is_empty() {
        println!("Deleted (ignored in AI proposals): {}", suppressed.join(", "));
    }
}

pub fn print_batch_summary(outcome: &ProposalOutcome) {
    if !outcome.response.explanation.is_empty() {
        println!("Advisor: {}", outcome.response.explanation);
    }
    let summary = &outcome.summary;
    let mut table = Table::new();
    table.set_header(vec![header_cell("Proposals"), header_cell("Count")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![
        Cell::new("Received"),
        Cell::new(outcome.response.mappings.len()),
    ]);
    table.add_row(vec![
        Cell::new("AI rules installed"),
        count_cell(summary.installed, Color::Green),
    ]);
    table.add_row(vec![
        Cell::new("Kept manual rule"),
        count_cell(summary.kept_manual, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Ignored (deleted)"),
        count_cell(summary.suppressed, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Duplicate keys"),
        count_cell(summary.duplicates, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Previous AI rules replaced"),
        count_cell(summary.discarded, Color::DarkGrey),
    ]);
    println!("{table}");
}

pub fn print_preview(column: &str, rows: &[PreviewRow], total_rows: usize) {
    println!("Column: {column}");
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Row"),
        header_cell("Original"),
        header_cell("Transformed"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for row in rows {
        let transformed = match row.outcome {
            RowOutcome::Transformed => Cell::new(&row.transformed).fg(Color::Green),
            RowOutcome::Unchanged => Cell::new(&row.transformed),
            RowOutcome::Absent => dim_cell("(empty)"),
        };
        table.add_row(vec![
            dim_cell(row.row_number),
            Cell::new(&row.original),
            transformed,
        ]);
    }
    println!("{table}");
    if rows.len() < total_rows {
        println!("Showing {} of {} rows.", rows.len(), total_rows);
    }
}

pub fn print_transform_response(response: &TransformResponse) {
    if !response.success {
        let message = response.error_message.as_deref().unwrap_or("unknown error");
        eprintln!("error: {message}");
        return;
    }
    if let Some(path) = &response.output_path {
        println!("Output: {}", path.display());
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Rows"),
        header_cell("Transformed"),
        header_cell("Unchanged"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 0..3 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    table.add_row(vec![
        Cell::new(response.total_rows).add_attribute(Attribute::Bold),
        count_cell(response.transformed_rows, Color::Green),
        count_cell(response.skipped_rows, Color::Yellow),
    ]);
    println!("{table}");
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn provenance_cell(rule: &MappingRule) -> Cell {
    match rule.provenance {
        Provenance::Manual => Cell::new("manual")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Provenance::Ai => Cell::new("ai"),
    }
}

fn confidence_cell(rule: &MappingRule) -> Cell {
    let label = format!("{:.2} {}", rule.confidence, rule.band().label());
    match rule.band() {
        ConfidenceBand::High => Cell::new(label).fg(Color::Green),
        ConfidenceBand::Medium => Cell::new(label).fg(Color::Yellow),
        ConfidenceBand::Low => Cell::new(label).fg(Color::Red),
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
