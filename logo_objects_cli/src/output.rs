use serde_json::Value;
use tabled::builder::Builder;
use tabled::{Table, Tabled};

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

// -- Row builders --

/// Column headers in first-seen order across all records.
fn collect_columns(records: &[Value]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        if let Value::Object(map) = record {
            for key in map.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
    }
    columns
}

fn build_records_table(records: &[Value]) -> Table {
    let columns = collect_columns(records);
    let mut builder = Builder::default();
    builder.push_record(columns.iter().cloned());
    for record in records {
        builder.push_record(
            columns
                .iter()
                .map(|c| record.get(c).map(format_cell).unwrap_or_default()),
        );
    }
    builder.build()
}

fn build_field_rows(record: &Value) -> Vec<FieldRow> {
    match record {
        Value::Object(map) => map
            .iter()
            .map(|(field, value)| FieldRow {
                field: field.clone(),
                value: format_cell(value),
            })
            .collect(),
        other => vec![FieldRow {
            field: String::new(),
            value: format_cell(other),
        }],
    }
}

// -- Table output --

pub fn print_records_table(records: &[Value]) {
    if records.is_empty() {
        eprintln!("No records");
        return;
    }
    println!("{}", build_records_table(records));
}

pub fn print_record_table(record: &Value) {
    println!("{}", Table::new(build_field_rows(record)));
}

// -- JSON output --

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

/// Strings print bare, nested values as compact JSON, null as empty.
fn format_cell(value: &Value) -> String {
    const MAX: usize = 60;
    let text = match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) if items.is_empty() => String::new(),
        other => other.to_string(),
    };
    if text.chars().count() > MAX {
        let cut: String = text.chars().take(MAX - 3).collect();
        format!("{}...", cut)
    } else {
        text
    }
}
