// Canonical string form of a produced value; expected outputs are authored in this form
use crate::value::Value;

/// Format a returned value for comparison.
///
/// Lists quote their direct string elements (`["a", "b"]`); arrays and
/// everything else use the default string form (`[a, b]`, `[[1, 2], [3]]`).
pub fn format_value(value: &Value) -> String {
    match value {
        Value::List(items) => {
            let rendered: Vec<String> = items
                .iter()
                .map(|item| match item {
                    Value::Str(s) => format!("\"{}\"", s),
                    other => other.to_string(),
                })
                .collect();
            format!("[{}]", rendered.join(", "))
        }
        other => other.to_string(),
    }
}
