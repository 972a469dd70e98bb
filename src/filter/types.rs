use crate::database::value::SqlValue;

/// How a named query parameter turns into a predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMatch {
    /// Case-insensitive substring match
    Contains,
    /// Exact text equality
    Exact,
    /// Integer equality, applied only when the value parses as an integer
    Id,
    /// Inclusive lower bound on a `YYYY-MM-DD` date
    DateFrom,
    /// Inclusive upper bound on a `YYYY-MM-DD` date
    DateTo,
}

/// One searchable query parameter of a resource
#[derive(Debug, Clone, Copy)]
pub struct SearchField {
    pub param: &'static str,
    pub column: &'static str,
    pub matcher: FieldMatch,
}

impl SearchField {
    pub const fn contains(param: &'static str, column: &'static str) -> Self {
        Self { param, column, matcher: FieldMatch::Contains }
    }

    pub const fn exact(param: &'static str, column: &'static str) -> Self {
        Self { param, column, matcher: FieldMatch::Exact }
    }

    pub const fn id(param: &'static str, column: &'static str) -> Self {
        Self { param, column, matcher: FieldMatch::Id }
    }

    pub const fn date_from(param: &'static str, column: &'static str) -> Self {
        Self { param, column, matcher: FieldMatch::DateFrom }
    }

    pub const fn date_to(param: &'static str, column: &'static str) -> Self {
        Self { param, column, matcher: FieldMatch::DateTo }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    ILike,
    Gte,
    Lte,
}

impl FilterOp {
    pub fn to_sql(&self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::ILike => "ILIKE",
            FilterOp::Gte => ">=",
            FilterOp::Lte => "<=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterWhereInfo {
    pub column: &'static str,
    pub operator: FilterOp,
    pub data: SqlValue,
}

#[derive(Debug, Clone, Default)]
pub struct FilterWhereOptions {
    /// Fail on unparsable id/date values instead of dropping them
    pub reject_invalid: bool,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlValue>,
}
