use sqlx::postgres::PgArguments;
use sqlx::Arguments;

use crate::database::value::SqlValue;
use crate::filter::types::SqlResult;

/// Bind a parameter list in placeholder order
pub fn arguments(params: &[SqlValue]) -> PgArguments {
    let mut args = PgArguments::default();
    for p in params {
        match p {
            SqlValue::Text(v) => args.add(v.clone()),
            SqlValue::Int(v) => args.add(*v),
            SqlValue::Bool(v) => args.add(*v),
            SqlValue::Date(v) => args.add(*v),
            SqlValue::Timestamp(v) => args.add(*v),
            SqlValue::Bytes(v) => args.add(v.clone()),
            SqlValue::TextList(v) => args.add(v.clone()),
            SqlValue::IntList(v) => args.add(v.clone()),
        }
    }
    args
}

pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `INSERT … RETURNING id` for the given column set
pub fn insert_sql(table: &str, columns: &[(&'static str, SqlValue)]) -> SqlResult {
    if columns.is_empty() {
        return SqlResult {
            query: format!("INSERT INTO {} DEFAULT VALUES RETURNING \"id\"", quote_identifier(table)),
            params: vec![],
        };
    }

    let names: Vec<String> = columns.iter().map(|(c, _)| quote_identifier(c)).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${}", i)).collect();
    SqlResult {
        query: format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING \"id\"",
            quote_identifier(table),
            names.join(", "),
            placeholders.join(", ")
        ),
        params: columns.iter().map(|(_, v)| v.clone()).collect(),
    }
}

/// Conditional update scoped by id. Always touches `updated_at`, so a call
/// with no columns still reports whether the row exists.
pub fn update_sql(table: &str, columns: &[(&'static str, SqlValue)], id: i64) -> SqlResult {
    let mut sets: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, (c, _))| format!("{} = ${}", quote_identifier(c), i + 1))
        .collect();
    sets.push("\"updated_at\" = now()".to_string());

    let mut params: Vec<SqlValue> = columns.iter().map(|(_, v)| v.clone()).collect();
    params.push(SqlValue::Int(Some(id)));

    SqlResult {
        query: format!(
            "UPDATE {} SET {} WHERE \"id\" = ${} RETURNING \"id\"",
            quote_identifier(table),
            sets.join(", "),
            params.len()
        ),
        params,
    }
}

pub fn delete_sql(table: &str, id: i64) -> SqlResult {
    SqlResult {
        query: format!("DELETE FROM {} WHERE \"id\" = $1", quote_identifier(table)),
        params: vec![SqlValue::Int(Some(id))],
    }
}

pub fn select_by_id_sql(table: &str, columns: &str, id: i64) -> SqlResult {
    SqlResult {
        query: format!("SELECT {} FROM {} WHERE \"id\" = $1", columns, quote_identifier(table)),
        params: vec![SqlValue::Int(Some(id))],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_lists_columns_in_order() {
        let sql = insert_sql(
            "victims",
            &[("first_name", SqlValue::text("Jane")), ("last_name", SqlValue::text("Doe"))],
        );
        assert_eq!(
            sql.query,
            "INSERT INTO \"victims\" (\"first_name\", \"last_name\") VALUES ($1, $2) RETURNING \"id\""
        );
        assert_eq!(sql.params.len(), 2);
    }

    #[test]
    fn insert_without_columns_uses_defaults() {
        let sql = insert_sql("roles", &[]);
        assert_eq!(sql.query, "INSERT INTO \"roles\" DEFAULT VALUES RETURNING \"id\"");
        assert!(sql.params.is_empty());
    }

    #[test]
    fn update_is_scoped_by_id_and_touches_timestamp() {
        let sql = update_sql("victims", &[("nin", SqlValue::text("CM123"))], 42);
        assert_eq!(
            sql.query,
            "UPDATE \"victims\" SET \"nin\" = $1, \"updated_at\" = now() WHERE \"id\" = $2 RETURNING \"id\""
        );
        assert_eq!(sql.params.last(), Some(&SqlValue::Int(Some(42))));
    }

    #[test]
    fn update_without_columns_only_touches_timestamp() {
        let sql = update_sql("cases", &[], 7);
        assert_eq!(
            sql.query,
            "UPDATE \"cases\" SET \"updated_at\" = now() WHERE \"id\" = $1 RETURNING \"id\""
        );
    }

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_identifier("weird\"name"), "\"weird\"\"name\"");
    }
}
