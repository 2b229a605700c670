//! Icinga 2 configuration DSL formatting helpers

/// Indentation used for attributes inside an object block
pub const ATTRIBUTE_INDENT: &str = "    ";

/// Render a double-quoted string literal with DSL escapes applied
pub fn render_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            '\u{0C}' => out.push_str("\\f"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Render an array literal of string values: `[ "a", "b" ]`
pub fn render_array<S: AsRef<str>>(values: &[S]) -> String {
    if values.is_empty() {
        return "[]".to_string();
    }
    let items: Vec<String> = values.iter().map(|v| render_string(v.as_ref())).collect();
    format!("[ {} ]", items.join(", "))
}

/// Render one attribute assignment line: `    key = value\n`
pub fn render_key_value(key: &str, value: &str) -> String {
    format!("{}{} = {}\n", ATTRIBUTE_INDENT, key, value)
}
