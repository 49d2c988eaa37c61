//! Loose field handling shared by the record types: presence follows
//! JavaScript truthiness and numbers may arrive as strings.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Missing, null, `false`, `0`, NaN and `""` all count as absent.
pub fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Numeric value of a JSON number or the longest numeric prefix of a string.
/// Anything else is NaN.
pub fn lenient_float(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => float_prefix(s.trim_start()),
        _ => f64::NAN,
    }
}

/// Integer value of a JSON number (truncated) or the leading digits of a
/// string. `None` stands in for NaN.
pub fn lenient_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => int_prefix(s.trim_start()),
        _ => None,
    }
}

/// Reads a stored number back; `null` is how NaN went out on the wire.
pub fn null_as_nan<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

/// Keeps an explicit `null` as `Some(Value::Null)`. Pair with
/// `#[serde(default)]` so only a missing field is `None`.
pub fn explicit<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Path ids parse the same way: optional leading whitespace then digits.
pub fn parse_id(raw: &str) -> Option<u64> {
    let trimmed = raw.trim_start();
    let digits = trimmed.len() - trimmed.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    trimmed[..digits].parse().ok()
}

/// Replace `current` only when the patch carries a non-empty string.
pub fn merge_text(current: &mut String, patch: Option<String>) {
    if let Some(value) = patch.filter(|v| !v.is_empty()) {
        *current = value;
    }
}

fn int_prefix(s: &str) -> Option<i64> {
    let sign_len = usize::from(s.starts_with(['-', '+']));
    let digits = s[sign_len..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .count();
    if digits == 0 {
        return None;
    }
    s[..sign_len + digits].parse().ok()
}

fn float_prefix(s: &str) -> f64 {
    let bytes = s.as_bytes();
    let mut end = usize::from(s.starts_with(['-', '+']));
    let mut seen_digit = false;
    let mut seen_dot = false;
    let mut last_valid = 0;

    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => {
                seen_digit = true;
                last_valid = end + 1;
            }
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }

    if !seen_digit {
        return f64::NAN;
    }
    s[..last_valid].parse().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn presence_follows_truthiness() {
        assert!(!is_present(None));
        assert!(!is_present(Some(&json!(null))));
        assert!(!is_present(Some(&json!(""))));
        assert!(!is_present(Some(&json!(0))));
        assert!(!is_present(Some(&json!(false))));
        assert!(is_present(Some(&json!("x"))));
        assert!(is_present(Some(&json!(12.5))));
        assert!(is_present(Some(&json!("0"))));
    }

    #[test]
    fn floats_accept_numeric_prefixes() {
        assert_eq!(lenient_float(&json!(19.99)), 19.99);
        assert_eq!(lenient_float(&json!("250000")), 250000.0);
        assert_eq!(lenient_float(&json!(" 12.5kg")), 12.5);
        assert_eq!(lenient_float(&json!("-3.")), -3.0);
        assert!(lenient_float(&json!("abc")).is_nan());
        assert!(lenient_float(&json!(true)).is_nan());
    }

    #[test]
    fn ints_truncate_and_stop_at_garbage() {
        assert_eq!(lenient_int(&json!(21)), Some(21));
        assert_eq!(lenient_int(&json!(21.9)), Some(21));
        assert_eq!(lenient_int(&json!("22 years")), Some(22));
        assert_eq!(lenient_int(&json!("-4")), Some(-4));
        assert_eq!(lenient_int(&json!("twenty")), None);
    }

    #[derive(Debug, Deserialize)]
    struct Body {
        #[serde(default, deserialize_with = "explicit")]
        grade: Option<Value>,
        #[serde(default = "nan", deserialize_with = "null_as_nan")]
        price: f64,
    }

    fn nan() -> f64 {
        f64::NAN
    }

    #[test]
    fn explicit_null_differs_from_missing() {
        let body: Body = serde_json::from_value(json!({ "grade": null, "price": 3 })).unwrap();
        assert_eq!(body.grade, Some(Value::Null));
        assert_eq!(body.price, 3.0);

        let body: Body = serde_json::from_value(json!({ "price": null })).unwrap();
        assert_eq!(body.grade, None);
        assert!(body.price.is_nan());
    }

    #[test]
    fn ids_parse_leading_digits() {
        assert_eq!(parse_id("7"), Some(7));
        assert_eq!(parse_id(" 12abc"), Some(12));
        assert_eq!(parse_id("abc"), None);
        assert_eq!(parse_id("-1"), None);
    }

    #[test]
    fn merge_text_ignores_empty_values() {
        let mut name = "Ana".to_string();
        merge_text(&mut name, Some(String::new()));
        assert_eq!(name, "Ana");
        merge_text(&mut name, None);
        assert_eq!(name, "Ana");
        merge_text(&mut name, Some("Ana María".into()));
        assert_eq!(name, "Ana María");
    }
}
