//! Conversion of raw source values into typed property payloads.

use crate::{ConfigError, PropertyKind, PropertyValue};
use chrono::{DateTime, Utc};
use serde_json::{Number, Value};
use std::time::Duration;

/// Pick a kind for an undeclared value. Nulls carry no value and yield `None`.
pub(crate) fn infer(value: Value) -> Option<PropertyValue> {
    let inferred = match value {
        Value::Null => return None,
        Value::Bool(flag) => PropertyValue::Boolean(flag),
        Value::Number(number) => PropertyValue::Number(number),
        Value::Array(items) => PropertyValue::Sequence(items),
        Value::Object(map) => PropertyValue::Object(map),
        Value::String(text) => {
            if let Some(timestamp) = parse_timestamp(&text) {
                PropertyValue::Timestamp(timestamp)
            } else if let Some(duration) = parse_duration(&text) {
                PropertyValue::Duration(duration)
            } else {
                PropertyValue::String(text)
            }
        }
    };
    Some(inferred)
}

/// Convert a raw value to the kind declared for `name`.
pub(crate) fn convert(
    name: &str,
    value: Value,
    kind: PropertyKind,
) -> Result<PropertyValue, ConfigError> {
    let failed = |message: String| ConfigError::Convert {
        name: name.to_string(),
        kind,
        message,
    };
    match (kind, value) {
        (PropertyKind::Boolean, Value::Bool(flag)) => Ok(PropertyValue::Boolean(flag)),
        (PropertyKind::Boolean, Value::String(text)) => match text.to_ascii_lowercase().as_str()
        {
            "true" => Ok(PropertyValue::Boolean(true)),
            "false" => Ok(PropertyValue::Boolean(false)),
            _ => Err(failed(format!("`{text}` is not a boolean"))),
        },
        (PropertyKind::String, Value::String(text)) => Ok(PropertyValue::String(text)),
        (PropertyKind::String, Value::Number(number)) => {
            Ok(PropertyValue::String(number.to_string()))
        }
        (PropertyKind::String, Value::Bool(flag)) => Ok(PropertyValue::String(flag.to_string())),
        (PropertyKind::Timestamp, Value::String(text)) => parse_timestamp(&text)
            .map(PropertyValue::Timestamp)
            .ok_or_else(|| failed(format!("`{text}` is not an RFC 3339 timestamp"))),
        (PropertyKind::Timestamp, Value::Number(number)) => number
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(PropertyValue::Timestamp)
            .ok_or_else(|| failed(format!("{number} is not a unix timestamp"))),
        (PropertyKind::Duration, Value::String(text)) => parse_duration(&text)
            .map(PropertyValue::Duration)
            .ok_or_else(|| failed(format!("`{text}` is not a duration"))),
        (PropertyKind::Duration, Value::Number(number)) => number
            .as_f64()
            .filter(|secs| secs.is_finite() && *secs >= 0.0 && *secs < u64::MAX as f64)
            .map(|secs| PropertyValue::Duration(Duration::from_secs_f64(secs)))
            .ok_or_else(|| failed(format!("{number} is not a number of seconds"))),
        (PropertyKind::Number, Value::Number(number)) => Ok(PropertyValue::Number(number)),
        (PropertyKind::Number, Value::String(text)) => text
            .trim()
            .parse::<Number>()
            .map(PropertyValue::Number)
            .map_err(|err| failed(err.to_string())),
        (PropertyKind::Object, Value::Object(map)) => Ok(PropertyValue::Object(map)),
        (PropertyKind::Sequence, Value::Array(items)) => Ok(PropertyValue::Sequence(items)),
        (_, other) => Err(failed(format!("unsupported {} value", value_label(&other)))),
    }
}

fn value_label(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|timestamp| timestamp.with_timezone(&Utc))
}

/// Parse a duration such as `300ms`, `1.5h` or `2h45m`.
///
/// Accepted units: `ns`, `us`, `µs`, `ms`, `s`, `m`, `h`. A bare `0` is
/// also accepted. Negative durations are rejected.
pub fn parse_duration(text: &str) -> Option<Duration> {
    let text = text.trim();
    if text == "0" {
        return Some(Duration::ZERO);
    }
    if text.is_empty() {
        return None;
    }

    let mut nanos = 0f64;
    let mut rest = text;
    while !rest.is_empty() {
        let digits = rest
            .find(|ch: char| !(ch.is_ascii_digit() || ch == '.'))
            .unwrap_or(rest.len());
        if digits == 0 {
            return None;
        }
        let amount: f64 = rest[..digits].parse().ok()?;
        rest = &rest[digits..];

        let unit_len = rest
            .find(|ch: char| ch.is_ascii_digit() || ch == '.')
            .unwrap_or(rest.len());
        let scale = match &rest[..unit_len] {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => return None,
        };
        rest = &rest[unit_len..];
        nanos += amount * scale;
    }

    if !nanos.is_finite() || nanos > u64::MAX as f64 {
        return None;
    }
    Some(Duration::from_nanos(nanos.round() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_compound_durations() {
        assert_eq!(parse_duration("1h30m"), Some(Duration::from_secs(5400)));
        assert_eq!(parse_duration("250ms"), Some(Duration::from_millis(250)));
        assert_eq!(parse_duration("1.5s"), Some(Duration::from_millis(1500)));
        assert_eq!(parse_duration("0"), Some(Duration::ZERO));
    }

    #[test]
    fn rejects_plain_words_as_durations() {
        assert_eq!(parse_duration("localhost"), None);
        assert_eq!(parse_duration("10"), None);
        assert_eq!(parse_duration("-5s"), None);
        assert_eq!(parse_duration("5 s"), None);
    }

    #[test]
    fn infers_kind_from_string_shape() {
        let stamp = infer(json!("2024-05-01T10:00:00Z")).expect("value");
        assert_eq!(stamp.kind(), PropertyKind::Timestamp);
        let duration = infer(json!("45s")).expect("value");
        assert_eq!(duration, PropertyValue::Duration(Duration::from_secs(45)));
        let text = infer(json!("example.com")).expect("value");
        assert_eq!(text, PropertyValue::String("example.com".to_string()));
        assert!(infer(Value::Null).is_none());
    }

    #[test]
    fn declared_string_accepts_numbers() {
        let value = convert("appId", json!(42), PropertyKind::String).expect("convert");
        assert_eq!(value, PropertyValue::String("42".to_string()));
    }

    #[test]
    fn declared_number_parses_env_text() {
        let value = convert("port", json!("8080"), PropertyKind::Number).expect("convert");
        assert_eq!(value, PropertyValue::Number(Number::from(8080)));
    }

    #[test]
    fn conversion_failure_names_key_and_kind() {
        let err = convert("debug", json!("maybe"), PropertyKind::Boolean).unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("debug"));
        assert!(msg.contains("boolean"));
    }
}
