use std::collections::HashMap;

use chrono::NaiveDate;

use super::error::FilterError;
use super::types::{FieldMatch, FilterOp, FilterWhereInfo, FilterWhereOptions, SearchField};
use crate::database::value::SqlValue;

pub struct FilterWhere {
    param_values: Vec<SqlValue>,
    param_index: usize,
    conditions: Vec<FilterWhereInfo>,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
            conditions: vec![],
        }
    }

    /// Build the AND-joined predicate for every present search parameter.
    /// Returns an empty clause when nothing applies.
    pub fn generate(
        fields: &[SearchField],
        query: &HashMap<String, String>,
        options: &FilterWhereOptions,
    ) -> Result<(String, Vec<SqlValue>), FilterError> {
        let mut filter_where = Self::new(0);
        filter_where.parse_query(fields, query, options)?;
        Ok(filter_where.build())
    }

    fn parse_query(
        &mut self,
        fields: &[SearchField],
        query: &HashMap<String, String>,
        options: &FilterWhereOptions,
    ) -> Result<(), FilterError> {
        for field in fields {
            let raw = match query.get(field.param).map(|v| v.trim()) {
                Some(v) if !v.is_empty() => v,
                _ => continue,
            };

            let condition = match field.matcher {
                FieldMatch::Contains => Some(FilterWhereInfo {
                    column: field.column,
                    operator: FilterOp::ILike,
                    data: SqlValue::text(format!("%{}%", escape_like(raw))),
                }),
                FieldMatch::Exact => Some(FilterWhereInfo {
                    column: field.column,
                    operator: FilterOp::Eq,
                    data: SqlValue::text(raw),
                }),
                FieldMatch::Id => match raw.parse::<i64>() {
                    Ok(id) => Some(FilterWhereInfo {
                        column: field.column,
                        operator: FilterOp::Eq,
                        data: SqlValue::Int(Some(id)),
                    }),
                    Err(_) => Self::reject_or_drop(field, "an integer id", raw, options)?,
                },
                FieldMatch::DateFrom | FieldMatch::DateTo => {
                    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                        Ok(date) => Some(FilterWhereInfo {
                            column: field.column,
                            operator: if field.matcher == FieldMatch::DateFrom {
                                FilterOp::Gte
                            } else {
                                FilterOp::Lte
                            },
                            data: SqlValue::Date(Some(date)),
                        }),
                        Err(_) => Self::reject_or_drop(field, "a YYYY-MM-DD date", raw, options)?,
                    }
                }
            };

            if let Some(condition) = condition {
                self.conditions.push(condition);
            }
        }
        Ok(())
    }

    fn reject_or_drop(
        field: &SearchField,
        expected: &'static str,
        raw: &str,
        options: &FilterWhereOptions,
    ) -> Result<Option<FilterWhereInfo>, FilterError> {
        if options.reject_invalid {
            return Err(FilterError::InvalidParam {
                param: field.param,
                expected,
                value: raw.to_string(),
            });
        }
        tracing::warn!(
            "Dropping search parameter '{}': expected {}, got '{}'",
            field.param,
            expected,
            raw
        );
        Ok(None)
    }

    fn build(&mut self) -> (String, Vec<SqlValue>) {
        let conditions = std::mem::take(&mut self.conditions);
        let sql_conditions: Vec<String> = conditions
            .into_iter()
            .map(|c| {
                let placeholder = self.param(c.data);
                format!("\"{}\" {} {}", c.column, c.operator.to_sql(), placeholder)
            })
            .collect();
        (sql_conditions.join(" AND "), std::mem::take(&mut self.param_values))
    }

    fn param(&mut self, value: SqlValue) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

/// Escape LIKE wildcards so user text matches literally (backslash is the
/// default Postgres escape character)
fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
