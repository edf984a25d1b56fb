use serde::Serialize;
use serde_json::{Map, Value};

use crate::cli::OutputFormat;
use crate::ui;

pub mod table;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => render_table(value),
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

/// Objects print as a key/value table of their scalar fields, followed by one
/// table per list field (answers, violations, failures).
fn render_table<T: Serialize>(value: &T) -> anyhow::Result<String> {
    let value = serde_json::to_value(value)?;
    Ok(match value {
        Value::Array(items) => render_list(&items),
        Value::Object(map) => render_object(map),
        scalar => table::render_rows(&["value"], &[vec![cell(&scalar)]], options()),
    })
}

fn render_object(map: Map<String, Value>) -> String {
    let mut scalars = Vec::new();
    let mut lists = Vec::new();
    flatten_into(String::new(), map, &mut scalars, &mut lists);

    let mut sections = Vec::new();
    if !scalars.is_empty() {
        sections.push(table::render_rows(&["key", "value"], &scalars, options()));
    }
    for (name, items) in lists {
        sections.push(format!("{name}:\n{}", render_list(&items)));
    }
    sections.join("\n\n")
}

/// Nested objects become dotted keys (`session.audit_id`, `report.scores_pushed`).
fn flatten_into(
    prefix: String,
    map: Map<String, Value>,
    scalars: &mut Vec<Vec<String>>,
    lists: &mut Vec<(String, Vec<Value>)>,
) {
    for (key, value) in map {
        let key = if prefix.is_empty() {
            key
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Object(inner) => flatten_into(key, inner, scalars, lists),
            Value::Array(items) if items.iter().all(Value::is_object) => lists.push((key, items)),
            other => scalars.push(vec![key, cell(&other)]),
        }
    }
}

fn render_list(items: &[Value]) -> String {
    if items.is_empty() {
        return String::from("(no rows)");
    }
    if !items.iter().all(Value::is_object) {
        let rows = items.iter().map(|item| vec![cell(item)]).collect::<Vec<_>>();
        return table::render_rows(&["value"], &rows, options());
    }

    // Column order follows the first record, then any keys seen later.
    let mut headers = Vec::<String>::new();
    for map in items.iter().filter_map(Value::as_object) {
        for key in map.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let header_refs = headers.iter().map(String::as_str).collect::<Vec<_>>();
    let rows = items
        .iter()
        .filter_map(Value::as_object)
        .map(|map| {
            headers
                .iter()
                .map(|header| map.get(header).map_or_else(|| String::from("-"), cell))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    table::render_rows(&header_refs, &rows, options())
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::Bool(v) => v.to_string(),
        Value::Number(v) => v.to_string(),
        Value::String(v) => v.clone(),
        other => serde_json::to_string(other).unwrap_or_else(|_| String::from("<invalid-json>")),
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::render;
    use crate::cli::OutputFormat;

    #[derive(Serialize)]
    struct Answer {
        answer_id: &'static str,
        score: Option<&'static str>,
    }

    #[derive(Serialize)]
    struct Session {
        audit_id: &'static str,
        state: &'static str,
        answers: Vec<Answer>,
    }

    fn sample() -> Session {
        Session {
            audit_id: "a-1",
            state: "editing",
            answers: vec![
                Answer {
                    answer_id: "ans-1",
                    score: Some("3"),
                },
                Answer {
                    answer_id: "ans-2",
                    score: None,
                },
            ],
        }
    }

    #[test]
    fn json_render_is_valid_json() {
        let out = render(&sample(), OutputFormat::Json).expect("json render should work");
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("json should parse");
        assert_eq!(parsed["audit_id"], "a-1");
        assert_eq!(parsed["answers"][0]["score"], "3");
    }

    #[test]
    fn raw_render_is_single_line_json() {
        let out = render(&sample(), OutputFormat::Raw).expect("raw render should work");
        assert!(!out.contains('\n'));
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("json should parse");
        assert!(parsed["answers"][1]["score"].is_null());
    }

    #[test]
    fn table_render_splits_scalars_and_lists() {
        let out = render(&sample(), OutputFormat::Table).expect("table render should work");
        let (head, tail) = out.split_once("answers:").expect("answers section");

        assert!(head.lines().next().is_some_and(|line| line.contains("key")));
        assert!(head.contains("audit_id"));
        assert!(head.contains("editing"));
        assert!(tail.lines().nth(1).is_some_and(|line| line.contains("answer_id")));
        assert!(tail.contains("ans-2"));
    }

    #[test]
    fn empty_list_renders_placeholder() {
        let out = render(&Vec::<Answer>::new(), OutputFormat::Table).expect("table render");
        assert_eq!(out, "(no rows)");
    }
}
