use std::collections::HashMap;

use super::error::FilterError;
use super::filter_where::FilterWhere;
use super::types::{FilterWhereOptions, SearchField, SqlResult};
use crate::database::value::SqlValue;
use crate::pagination::PageParams;

/// Predicate plus paging for one resource table. The same predicate feeds both
/// the count and the page query so totals always match the slice.
pub struct Filter {
    table_name: &'static str,
    columns: &'static str,
    where_clause: String,
    params: Vec<SqlValue>,
    options: FilterWhereOptions,
}

impl Filter {
    pub fn new(table_name: &'static str, columns: &'static str) -> Result<Self, FilterError> {
        Self::validate_table_name(table_name)?;
        Ok(Self {
            table_name,
            columns,
            where_clause: String::new(),
            params: vec![],
            options: FilterWhereOptions::default(),
        })
    }

    pub fn options(mut self, options: FilterWhereOptions) -> Self {
        self.options = options;
        self
    }

    pub fn search(
        mut self,
        fields: &[SearchField],
        query: &HashMap<String, String>,
    ) -> Result<Self, FilterError> {
        let (where_clause, params) = FilterWhere::generate(fields, query, &self.options)?;
        self.where_clause = where_clause;
        self.params = params;
        Ok(self)
    }

    pub fn is_unfiltered(&self) -> bool {
        self.where_clause.is_empty()
    }

    pub fn to_sql(&self, page: PageParams) -> SqlResult {
        let query = [
            format!("SELECT {}", self.columns),
            format!("FROM \"{}\"", self.table_name),
            self.where_sql(),
            "ORDER BY \"id\" ASC".to_string(),
            format!("LIMIT {} OFFSET {}", page.limit, page.offset()),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        SqlResult { query, params: self.params.clone() }
    }

    pub fn to_count_sql(&self) -> SqlResult {
        let query = [
            "SELECT COUNT(*) AS count".to_string(),
            format!("FROM \"{}\"", self.table_name),
            self.where_sql(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        SqlResult { query, params: self.params.clone() }
    }

    fn where_sql(&self) -> String {
        if self.where_clause.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.where_clause)
        }
    }

    fn validate_table_name(name: &str) -> Result<(), FilterError> {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
            _ => return Err(FilterError::InvalidTableName(name.to_string())),
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(FilterError::InvalidTableName(name.to_string()));
        }
        Ok(())
    }
}
