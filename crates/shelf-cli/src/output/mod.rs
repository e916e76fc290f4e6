use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::ui;

pub mod table;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => render_table(&serde_json::to_value(value)?),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

fn options() -> table::TableOptions {
    let prefs = ui::prefs();
    table::TableOptions {
        max_width: prefs.term_width,
        color: prefs.table_color,
    }
}

fn render_table(value: &Value) -> anyhow::Result<String> {
    match value {
        Value::Array(items) if items.is_empty() => Ok(String::from("(no rows)")),
        Value::Array(items) if items.iter().all(Value::is_object) => Ok(records_table(items)),
        Value::Array(items) => {
            let rows = items.iter().map(|item| vec![cell(item)]).collect::<Vec<_>>();
            Ok(table::render(&["value"], &rows, options()))
        }
        Value::Object(map) => {
            let rows = map
                .iter()
                .map(|(key, value)| vec![key.clone(), cell(value)])
                .collect::<Vec<_>>();
            Ok(table::render(&["field", "value"], &rows, options()))
        }
        scalar => Ok(table::render(&["value"], &[vec![cell(scalar)]], options())),
    }
}

/// One row per record; columns follow field declaration order, so flattened
/// report rows lead with the record's `id`.
fn records_table(items: &[Value]) -> String {
    let mut headers = Vec::<&str>::new();
    for key in items.iter().filter_map(Value::as_object).flat_map(|m| m.keys()) {
        if !headers.contains(&key.as_str()) {
            headers.push(key);
        }
    }
    let rows = items
        .iter()
        .filter_map(Value::as_object)
        .map(|map| {
            headers
                .iter()
                .map(|header| map.get(*header).map_or_else(|| String::from("-"), cell))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    table::render(&headers, &rows, options())
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::String(v) => v.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        other => serde_json::to_string(other).unwrap_or_else(|_| String::from("<invalid-json>")),
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::render;
    use crate::cli::OutputFormat;

    #[derive(Serialize)]
    struct Row {
        identifier: &'static str,
        loans: u32,
        due: Option<&'static str>,
    }

    #[test]
    fn json_render_is_valid_json() {
        let value = Row { identifier: "H1", loans: 7, due: None };
        let out = render(&value, OutputFormat::Json).expect("json render should work");
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("json should parse");
        assert_eq!(parsed["identifier"], "H1");
        assert_eq!(parsed["loans"], 7);
    }

    #[test]
    fn raw_render_is_single_line_json() {
        let value = Row { identifier: "H1", loans: 7, due: None };
        let out = render(&value, OutputFormat::Raw).expect("raw render should work");
        assert!(!out.contains('\n'));
    }

    #[test]
    fn table_render_for_records_has_one_row_each() {
        let rows = vec![
            Row { identifier: "H1", loans: 1, due: Some("2026-01-15") },
            Row { identifier: "H2", loans: 0, due: None },
        ];
        let out = render(&rows, OutputFormat::Table).expect("table render should work");
        let lines = out.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("identifier"));
        assert!(lines[3].contains("H2"));
    }

    #[derive(Serialize)]
    struct Loan {
        id: i64,
        status: &'static str,
    }

    #[derive(Serialize)]
    struct LoanRow {
        #[serde(flatten)]
        loan: Loan,
        holding_identifier: &'static str,
    }

    #[test]
    fn flattened_rows_lead_with_id() {
        let rows = vec![LoanRow {
            loan: Loan { id: 3, status: "checked_out" },
            holding_identifier: "H1",
        }];
        let out = render(&rows, OutputFormat::Table).expect("table render should work");
        let header = out.lines().next().unwrap().split_whitespace().collect::<Vec<_>>();
        assert_eq!(header, vec!["id", "status", "holding_identifier"]);
    }

    #[test]
    fn empty_list_renders_placeholder() {
        let rows: Vec<Row> = Vec::new();
        assert_eq!(render(&rows, OutputFormat::Table).unwrap(), "(no rows)");
    }
}
