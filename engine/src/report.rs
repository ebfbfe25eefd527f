//! Rendering of operation return values.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ReportError;

/// Interchange format for structured results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultFormat {
    #[default]
    Json,
    Yaml,
}

/// Whether and how the terminal operation's return value is printed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportOptions {
    pub print_return: bool,
    pub format: ResultFormat,
}

impl ReportOptions {
    pub fn printing(format: ResultFormat) -> Self {
        Self {
            print_return: true,
            format,
        }
    }
}

/// Renders a returned value as text.
///
/// Strings are printed raw, numbers and booleans via their usual text, and
/// `null` prints nothing. Arrays and objects are serialized (compact JSON, or
/// YAML).
pub fn render_result(value: &Value, format: ResultFormat) -> Result<Option<String>, ReportError> {
    let text = match value {
        Value::Null => return Ok(None),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => match format {
            ResultFormat::Json => serde_json::to_string(value)?,
            ResultFormat::Yaml => serde_yaml::to_string(value)?.trim_end().to_string(),
        },
    };
    Ok(Some(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars_render_as_is() {
        assert_eq!(
            render_result(&json!("Default Suffix"), ResultFormat::Json).unwrap(),
            Some("Default Suffix".to_string())
        );
        assert_eq!(render_result(&json!(42), ResultFormat::Yaml).unwrap(), Some("42".to_string()));
        assert_eq!(render_result(&json!(null), ResultFormat::Json).unwrap(), None);
    }

    #[test]
    fn test_structured_results_serialize() {
        let value = json!({ "name": "widget", "tags": ["a", "b"] });

        assert_eq!(
            render_result(&value, ResultFormat::Json).unwrap(),
            Some(r#"{"name":"widget","tags":["a","b"]}"#.to_string())
        );
        assert_eq!(
            render_result(&value, ResultFormat::Yaml).unwrap(),
            Some("name: widget\ntags:\n- a\n- b".to_string())
        );
    }
}
