use chrono::{DateTime, NaiveDate, Utc};

/// A typed statement parameter. Every variant carries an `Option` so that a
/// NULL is still bound with the column's Postgres type.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(Option<String>),
    Int(Option<i64>),
    Bool(Option<bool>),
    Date(Option<NaiveDate>),
    Timestamp(Option<DateTime<Utc>>),
    Bytes(Option<Vec<u8>>),
    TextList(Option<Vec<String>>),
    IntList(Vec<i64>),
}

impl SqlValue {
    pub fn text(value: impl Into<String>) -> Self {
        SqlValue::Text(Some(value.into()))
    }

    pub fn is_null(&self) -> bool {
        match self {
            SqlValue::Text(v) => v.is_none(),
            SqlValue::Int(v) => v.is_none(),
            SqlValue::Bool(v) => v.is_none(),
            SqlValue::Date(v) => v.is_none(),
            SqlValue::Timestamp(v) => v.is_none(),
            SqlValue::Bytes(v) => v.is_none(),
            SqlValue::TextList(v) => v.is_none(),
            SqlValue::IntList(_) => false,
        }
    }
}
