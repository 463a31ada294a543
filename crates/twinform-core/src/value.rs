//! The value tree shared by both codecs and the binder.
//!
//! Every parse produces a [`Value`] and every serialization goes through one.
//! The model is deliberately small: there is a single numeric representation
//! and no date or type tags. The binder recovers those from the target type.

/// A parsed or about-to-be-rendered value.
///
/// Maps keep their entries in declaration order as `Vec<(String, Value)>`, so
/// re-rendering a tree is deterministic without depending on `IndexMap`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    /// Every numeric literal; integers and fractions are not distinguished.
    Number(f64),
    /// Unescaped string content.
    Str(String),
    Seq(Vec<Value>),
    /// Name/value pairs in insertion order.
    Map(Vec<(String, Value)>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up the first map entry named exactly `name` (case-sensitive).
    /// Returns `None` for non-map values.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.as_map()?
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Short name of the variant, used in conversion error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Seq(_) => "sequence",
            Value::Map(_) => "mapping",
        }
    }
}

/// Deepest container nesting either parser accepts, matching serde_json.
pub const MAX_DEPTH: usize = 128;

/// Largest integer an `f64` holds exactly (2^53).
pub(crate) const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Render a number as plain decimal text. Whole numbers drop the fraction,
/// non-finite values have no textual form and render as `null`.
pub(crate) fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return "null".to_string();
    }
    // Normalize -0 to 0
    let n = if n == 0.0 { 0.0 } else { n };
    format!("{}", n)
}

/// Parse a numeric literal. Rust's float parser also accepts `inf` and `NaN`,
/// which are rejected here along with anything not starting like a number.
pub(crate) fn parse_number(s: &str) -> Option<f64> {
    let first = s.as_bytes().first()?;
    if !(first.is_ascii_digit() || matches!(first, b'-' | b'+' | b'.')) {
        return None;
    }
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::Seq(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            // Whole numbers in the exactly-representable range go back to integers.
            Value::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER => {
                serde_json::Value::Number((n as i64).into())
            }
            Value::Number(n) => serde_json::Number::from_f64(n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::Str(s) => serde_json::Value::String(s),
            Value::Seq(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            // Later duplicates overwrite earlier ones, as in a JSON parser.
            Value::Map(entries) => serde_json::Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, value.into()))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_is_case_sensitive() {
        let map = Value::Map(vec![
            ("Name".to_string(), Value::Str("Ada".to_string())),
            ("name".to_string(), Value::Str("lower".to_string())),
        ]);
        assert_eq!(map.get("Name"), Some(&Value::Str("Ada".to_string())));
        assert_eq!(map.get("name"), Some(&Value::Str("lower".to_string())));
        assert_eq!(map.get("NAME"), None);
        assert_eq!(Value::Null.get("Name"), None);
    }

    #[test]
    fn number_text_drops_whole_fraction() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(3.25), "3.25");
        assert_eq!(format_number(f64::NAN), "null");
    }

    #[test]
    fn number_parse_rejects_words() {
        assert_eq!(parse_number("42"), Some(42.0));
        assert_eq!(parse_number("-1.5e3"), Some(-1500.0));
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("1e400"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn converts_from_serde_json_in_order() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"b":1,"a":[true,null,"x"]}"#).unwrap();
        let value = Value::from(json.clone());
        assert_eq!(
            value,
            Value::Map(vec![
                ("b".to_string(), Value::Number(1.0)),
                (
                    "a".to_string(),
                    Value::Seq(vec![
                        Value::Bool(true),
                        Value::Null,
                        Value::Str("x".to_string())
                    ])
                ),
            ])
        );
        assert_eq!(serde_json::Value::from(value), json);
    }
}
