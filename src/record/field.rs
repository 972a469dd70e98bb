use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use super::RecordError;
use crate::database::value::SqlValue;

/// Storage type of a writable column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Int,
    Bool,
    Date,
    Timestamp,
    Bytes,
    TextList,
    /// Plain text on input, stored as an argon2 hash
    Secret,
}

/// One allow-listed column of a resource
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn text(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Text }
    }

    pub const fn int(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Int }
    }

    pub const fn bool(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Bool }
    }

    pub const fn date(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Date }
    }

    pub const fn timestamp(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Timestamp }
    }

    pub const fn bytes(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Bytes }
    }

    pub const fn text_list(name: &'static str) -> Self {
        Self { name, kind: FieldKind::TextList }
    }

    pub const fn secret(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Secret }
    }

    /// A typed NULL for this column
    pub fn null(&self) -> SqlValue {
        match self.kind {
            FieldKind::Text | FieldKind::Secret => SqlValue::Text(None),
            FieldKind::Int => SqlValue::Int(None),
            FieldKind::Bool => SqlValue::Bool(None),
            FieldKind::Date => SqlValue::Date(None),
            FieldKind::Timestamp => SqlValue::Timestamp(None),
            FieldKind::Bytes => SqlValue::Bytes(None),
            FieldKind::TextList => SqlValue::TextList(None),
        }
    }

    /// Convert a payload value into a bound parameter. Form submissions carry
    /// every value as a string, so strings are accepted for every kind.
    pub fn to_sql(&self, value: &Value) -> Result<SqlValue, RecordError> {
        if value.is_null() {
            if self.kind == FieldKind::Secret {
                return Err(self.invalid("cannot be cleared"));
            }
            return Ok(self.null());
        }

        match self.kind {
            FieldKind::Text => match value {
                Value::String(s) => Ok(SqlValue::text(s.as_str())),
                _ => Err(self.invalid("expected a string")),
            },
            FieldKind::Secret => match value {
                Value::String(s) if !s.is_empty() => {
                    let hashed = crate::auth::hash_password(s)
                        .map_err(|e| RecordError::Hash(e.to_string()))?;
                    Ok(SqlValue::Text(Some(hashed)))
                }
                _ => Err(self.invalid("expected a non-empty string")),
            },
            FieldKind::Int => match value {
                Value::Number(n) => n
                    .as_i64()
                    .map(|i| SqlValue::Int(Some(i)))
                    .ok_or_else(|| self.invalid("expected an integer")),
                Value::String(s) if s.trim().is_empty() => Ok(SqlValue::Int(None)),
                Value::String(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(|i| SqlValue::Int(Some(i)))
                    .map_err(|_| self.invalid("expected an integer")),
                _ => Err(self.invalid("expected an integer")),
            },
            FieldKind::Bool => match value {
                Value::Bool(b) => Ok(SqlValue::Bool(Some(*b))),
                Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" | "1" | "on" | "yes" => Ok(SqlValue::Bool(Some(true))),
                    "false" | "0" | "off" | "no" => Ok(SqlValue::Bool(Some(false))),
                    "" => Ok(SqlValue::Bool(None)),
                    _ => Err(self.invalid("expected a boolean")),
                },
                _ => Err(self.invalid("expected a boolean")),
            },
            FieldKind::Date => match value {
                Value::String(s) if s.trim().is_empty() => Ok(SqlValue::Date(None)),
                Value::String(s) => parse_date(s.trim())
                    .map(|d| SqlValue::Date(Some(d)))
                    .ok_or_else(|| self.invalid("expected a YYYY-MM-DD date")),
                _ => Err(self.invalid("expected a YYYY-MM-DD date")),
            },
            FieldKind::Timestamp => match value {
                Value::String(s) if s.trim().is_empty() => Ok(SqlValue::Timestamp(None)),
                Value::String(s) => parse_timestamp(s.trim())
                    .map(|t| SqlValue::Timestamp(Some(t)))
                    .ok_or_else(|| self.invalid("expected an RFC 3339 timestamp")),
                _ => Err(self.invalid("expected an RFC 3339 timestamp")),
            },
            FieldKind::Bytes => match value {
                Value::String(s) => general_purpose::STANDARD
                    .decode(s.trim())
                    .map(|b| SqlValue::Bytes(Some(b)))
                    .map_err(|_| self.invalid("expected base64 data")),
                _ => Err(self.invalid("expected base64 data")),
            },
            FieldKind::TextList => match value {
                Value::Array(items) => items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => Ok(s.clone()),
                        _ => Err(self.invalid("expected an array of strings")),
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(|list| SqlValue::TextList(Some(list))),
                Value::String(s) => Ok(SqlValue::TextList(Some(split_text_list(s)))),
                _ => Err(self.invalid("expected an array of strings")),
            },
        }
    }

    fn invalid(&self, reason: &str) -> RecordError {
        RecordError::InvalidValue {
            field: self.name.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Zero value of a payload entry: the legacy update path treats these as
/// "not provided"
pub fn is_zero(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s.starts_with("0001-01-01"),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|t| t.date_naive()))
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(t.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|t| t.and_utc())
}

/// Form fields carry lists either as a JSON array or comma separated
fn split_text_list(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        if let Ok(list) = serde_json::from_str::<Vec<String>>(trimmed) {
            return list;
        }
    }
    trimmed
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_accepts_strings_only() {
        let f = FieldSpec::text("first_name");
        assert_eq!(f.to_sql(&json!("Jane")).unwrap(), SqlValue::text("Jane"));
        assert_eq!(f.to_sql(&json!(null)).unwrap(), SqlValue::Text(None));
        assert!(f.to_sql(&json!(12)).is_err());
    }

    #[test]
    fn int_accepts_numbers_and_numeric_strings() {
        let f = FieldSpec::int("post_id");
        assert_eq!(f.to_sql(&json!(7)).unwrap(), SqlValue::Int(Some(7)));
        assert_eq!(f.to_sql(&json!(" 8 ")).unwrap(), SqlValue::Int(Some(8)));
        assert!(f.to_sql(&json!("eight")).is_err());
        assert!(f.to_sql(&json!(1.5)).is_err());
    }

    #[test]
    fn dates_accept_plain_and_rfc3339() {
        let f = FieldSpec::date("dob");
        let expected = SqlValue::Date(NaiveDate::from_ymd_opt(1990, 5, 1));
        assert_eq!(f.to_sql(&json!("1990-05-01")).unwrap(), expected);
        assert_eq!(f.to_sql(&json!("1990-05-01T00:00:00Z")).unwrap(), expected);
        assert!(f.to_sql(&json!("01/05/1990")).is_err());
    }

    #[test]
    fn timestamps_accept_plain_dates_as_midnight() {
        let f = FieldSpec::timestamp("date_hour_of_death");
        match f.to_sql(&json!("2024-03-02")).unwrap() {
            SqlValue::Timestamp(Some(t)) => assert_eq!(t.to_rfc3339(), "2024-03-02T00:00:00+00:00"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn bool_parses_form_values() {
        let f = FieldSpec::bool("consent_given");
        assert_eq!(f.to_sql(&json!("on")).unwrap(), SqlValue::Bool(Some(true)));
        assert_eq!(f.to_sql(&json!(false)).unwrap(), SqlValue::Bool(Some(false)));
        assert!(f.to_sql(&json!("maybe")).is_err());
    }

    #[test]
    fn bytes_decode_base64() {
        let f = FieldSpec::bytes("photo");
        assert_eq!(f.to_sql(&json!("aGVsbG8=")).unwrap(), SqlValue::Bytes(Some(b"hello".to_vec())));
        assert!(f.to_sql(&json!("***")).is_err());
    }

    #[test]
    fn text_lists_from_arrays_or_csv() {
        let f = FieldSpec::text_list("habits");
        assert_eq!(
            f.to_sql(&json!(["smoking", "drinking"])).unwrap(),
            SqlValue::TextList(Some(vec!["smoking".into(), "drinking".into()]))
        );
        assert_eq!(
            f.to_sql(&json!("smoking, drinking")).unwrap(),
            SqlValue::TextList(Some(vec!["smoking".into(), "drinking".into()]))
        );
    }

    #[test]
    fn secret_is_hashed_and_cannot_be_cleared() {
        let f = FieldSpec::secret("password");
        match f.to_sql(&json!("Admin123")).unwrap() {
            SqlValue::Text(Some(hash)) => {
                assert_ne!(hash, "Admin123");
                assert!(crate::auth::verify_password("Admin123", &hash));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(f.to_sql(&json!(null)).is_err());
    }

    #[test]
    fn zero_values() {
        for v in [json!(null), json!(""), json!(0), json!(false), json!([]), json!("0001-01-01T00:00:00Z")] {
            assert!(is_zero(&v), "{} should be zero", v);
        }
        for v in [json!("x"), json!(1), json!(true), json!([1])] {
            assert!(!is_zero(&v), "{} should not be zero", v);
        }
    }
}
