//! Permissive access to loosely-typed backend records.
//!
//! The backend returns the same logical field under several spellings
//! (`emails_sent` / `emailsSent`, nested vendor payloads, JSON encoded in
//! strings). `RawRecord` is the one place those records are read; every
//! entity's `from_raw` goes through it with an explicit priority list.
//!
//! Two lookup flavours mirror how fallbacks are chained:
//! - `first_present`: skips only missing and `null` values
//! - `first_truthy`: also skips `false`, `0` and empty strings
//!
//! Numeric coercion is uniform: numbers as-is, numeric strings parsed,
//! booleans as 1/0, everything else 0.

use serde_json::{Map, Value};

/// Read-only view over a JSON object. Non-object values behave as `{}`.
#[derive(Debug, Clone, Copy)]
pub struct RawRecord<'a> {
    map: Option<&'a Map<String, Value>>,
}

impl<'a> RawRecord<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self {
            map: value.as_object(),
        }
    }

    pub fn empty() -> Self {
        Self { map: None }
    }

    pub fn is_empty(&self) -> bool {
        self.map.map(|m| m.is_empty()).unwrap_or(true)
    }

    /// Look up a key; `a.b` walks into nested objects when no literal
    /// `a.b` key exists.
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        let map = self.map?;
        if let Some(value) = map.get(key) {
            return Some(value);
        }
        let (head, rest) = key.split_once('.')?;
        RawRecord::new(map.get(head)?).get(rest)
    }

    /// Nested record under `key`, or an empty record.
    pub fn nested(&self, key: &str) -> RawRecord<'a> {
        self.get(key).map(RawRecord::new).unwrap_or_else(RawRecord::empty)
    }

    /// First nested object among `keys` that is present.
    pub fn first_nested(&self, keys: &[&str]) -> RawRecord<'a> {
        self.first_truthy(keys)
            .map(RawRecord::new)
            .unwrap_or_else(RawRecord::empty)
    }

    pub fn first_present(&self, keys: &[&str]) -> Option<&'a Value> {
        keys.iter()
            .filter_map(|k| self.get(k))
            .find(|v| !v.is_null())
    }

    pub fn first_truthy(&self, keys: &[&str]) -> Option<&'a Value> {
        keys.iter().filter_map(|k| self.get(k)).find(|v| is_truthy(v))
    }

    /// First truthy value, stringified.
    pub fn first_str(&self, keys: &[&str]) -> Option<String> {
        self.first_truthy(keys).map(value_to_string)
    }

    pub fn str_or(&self, keys: &[&str], default: &str) -> String {
        self.first_str(keys).unwrap_or_else(|| default.to_string())
    }

    /// First present value, coerced to a number.
    pub fn number(&self, keys: &[&str]) -> f64 {
        self.first_present(keys).map(coerce_number).unwrap_or(0.0)
    }

    /// First present value, coerced to a non-negative integer.
    pub fn count(&self, keys: &[&str]) -> u64 {
        to_count(self.number(keys))
    }
}

/// JavaScript-style truthiness for JSON values.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// String form of a scalar; containers are serialized, `null` is empty.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

pub fn coerce_number(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

pub fn to_count(n: f64) -> u64 {
    if n.is_finite() && n > 0.0 {
        n.round() as u64
    } else {
        0
    }
}

/// Decode a string that may hold serialized JSON; anything else (or an
/// undecodable string) is returned unchanged.
pub fn parse_json_value(value: &Value) -> Value {
    match value {
        Value::String(s) => serde_json::from_str(s).unwrap_or_else(|_| value.clone()),
        other => other.clone(),
    }
}

/// `round(100 * part / whole)`, 0 when `whole` is 0.
pub fn percentage(part: f64, whole: f64) -> u32 {
    if whole <= 0.0 || !whole.is_finite() || !part.is_finite() {
        return 0;
    }
    let pct = (part / whole * 100.0).round();
    if pct <= 0.0 {
        0
    } else {
        pct as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_present_vs_truthy() {
        let raw = json!({ "a": "", "b": null, "c": 0, "d": "x" });
        let rec = RawRecord::new(&raw);
        assert_eq!(rec.first_present(&["b", "a", "d"]), Some(&json!("")));
        assert_eq!(rec.first_truthy(&["b", "a", "c", "d"]), Some(&json!("x")));
        assert_eq!(rec.first_str(&["missing", "c"]), None);
    }

    #[test]
    fn test_dotted_lookup() {
        let raw = json!({ "company": { "id": 12 }, "all_time": { "emails_sent": "40" } });
        let rec = RawRecord::new(&raw);
        assert_eq!(rec.get("company.id"), Some(&json!(12)));
        assert_eq!(rec.count(&["all_time.emails_sent"]), 40);
        assert!(rec.get("company.name").is_none());
    }

    #[test]
    fn test_non_object_behaves_as_empty() {
        let raw = json!([1, 2, 3]);
        let rec = RawRecord::new(&raw);
        assert!(rec.is_empty());
        assert_eq!(rec.count(&["anything"]), 0);
        assert_eq!(rec.str_or(&["name"], "Unknown"), "Unknown");
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(&json!(" 12 ")), 12.0);
        assert_eq!(coerce_number(&json!("twelve")), 0.0);
        assert_eq!(coerce_number(&json!(true)), 1.0);
        assert_eq!(coerce_number(&json!({})), 0.0);
        assert_eq!(to_count(-3.0), 0);
        assert_eq!(to_count(119.6), 120);
    }

    #[test]
    fn test_parse_json_value() {
        assert_eq!(parse_json_value(&json!("{\"a\":1}")), json!({ "a": 1 }));
        assert_eq!(parse_json_value(&json!("not json")), json!("not json"));
        assert_eq!(parse_json_value(&json!({ "a": 1 })), json!({ "a": 1 }));

        // Double-encoded payloads unwrap one level per call
        let twice = json!(serde_json::to_string(&json!("{\"a\":1}")).unwrap());
        let once = parse_json_value(&twice);
        assert_eq!(once, json!("{\"a\":1}"));
        assert_eq!(parse_json_value(&once), json!({ "a": 1 }));
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(2.0, 4.0), 50);
        assert_eq!(percentage(1.0, 3.0), 33);
        assert_eq!(percentage(2.0, 3.0), 67);
        assert_eq!(percentage(5.0, 0.0), 0);
    }
}
