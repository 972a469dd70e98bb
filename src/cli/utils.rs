use serde_json::{json, Map, Value};

use crate::cli::OutputFormat;

/// Print a success message, merging `data` into the JSON object when present
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = Map::new();
            response.insert("success".into(), json!(true));
            response.insert("message".into(), json!(message));
            if let Some(Value::Object(fields)) = data {
                response.extend(fields);
            }
            println!("{}", serde_json::to_string_pretty(&Value::Object(response))?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
            if let Some(Value::Object(fields)) = data {
                for (key, value) in fields {
                    match value {
                        Value::String(s) => println!("  {}: {}", key, s),
                        other => println!("  {}: {}", key, other),
                    }
                }
            }
        }
    }
    Ok(())
}

/// Print a two column table of counts
pub fn output_counts(output_format: OutputFormat, counts: &[(String, i64)]) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let object: Map<String, Value> = counts.iter().map(|(t, n)| (t.clone(), json!(n))).collect();
            println!("{}", serde_json::to_string_pretty(&json!({ "success": true, "tables": object }))?);
        }
        OutputFormat::Text => {
            let width = counts.iter().map(|(t, _)| t.len()).max().unwrap_or(0);
            for (table, count) in counts {
                println!("{:<width$}  {}", table, count, width = width);
            }
        }
    }
    Ok(())
}
