//! Command output rendering.

use serde::Serialize;

use crate::cli::OutputFormat;

/// Print a serializable value in the requested format.
///
/// - `json`: pretty-printed JSON (the default, machine-friendly)
/// - `raw`: compact single-line JSON
/// - `table`: flat `key: value` lines; arrays render one object per block
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Raw => println!("{}", serde_json::to_string(value)?),
        OutputFormat::Table => {
            let json = serde_json::to_value(value)?;
            print!("{}", render_table(&json));
        }
    }
    Ok(())
}

fn render_table(value: &serde_json::Value) -> String {
    let mut out = String::new();
    match value {
        serde_json::Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push('\n');
                }
                out.push_str(&render_table(item));
            }
        }
        serde_json::Value::Object(map) => {
            for (key, val) in map {
                match val {
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        out.push_str(&format!("{key}: {val}\n"));
                    }
                    _ => out.push_str(&format!("{key}: {}\n", scalar(val))),
                }
            }
        }
        other => out.push_str(&format!("{}\n", scalar(other))),
    }
    out
}

fn scalar(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_renders_flat_object() {
        let value = serde_json::json!({ "id": "prf-1", "name": "Ada", "affiliation": null });
        let rendered = render_table(&value);
        assert!(rendered.contains("id: prf-1"));
        assert!(rendered.contains("name: Ada"));
        assert!(rendered.contains("affiliation: -"));
    }

    #[test]
    fn table_renders_array_as_blocks() {
        let value = serde_json::json!([{ "id": 1 }, { "id": 2 }]);
        let rendered = render_table(&value);
        assert_eq!(rendered, "id: 1\n\nid: 2\n");
    }
}
