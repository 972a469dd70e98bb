use sqlx::{FromRow, PgPool};

use crate::database::manager::DatabaseError;

/// The slice of an officer row needed to authenticate
#[derive(Debug, Clone, FromRow)]
pub struct OfficerCredentials {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Find an officer by email or username
pub async fn find_officer_by_identifier(
    pool: &PgPool,
    identifier: &str,
) -> Result<Option<OfficerCredentials>, DatabaseError> {
    let officer = sqlx::query_as::<_, OfficerCredentials>(
        "SELECT id, email, username, password
         FROM police_officers
         WHERE email = $1 OR username = $1
         ORDER BY id
         LIMIT 1",
    )
    .bind(identifier)
    .fetch_optional(pool)
    .await?;

    Ok(officer)
}

/// Find an officer by id, e.g. when a refresh token is exchanged
pub async fn find_officer_by_id(pool: &PgPool, id: i64) -> Result<Option<OfficerCredentials>, DatabaseError> {
    let officer = sqlx::query_as::<_, OfficerCredentials>(
        "SELECT id, email, username, password FROM police_officers WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(officer)
}

/// Names of the roles linked to an officer
pub async fn find_role_names(pool: &PgPool, officer_id: i64) -> Result<Vec<String>, DatabaseError> {
    let names = sqlx::query_scalar::<_, String>(
        "SELECT r.name
         FROM roles r
         JOIN officer_roles o ON o.role_id = r.id
         WHERE o.officer_id = $1
         ORDER BY r.name",
    )
    .bind(officer_id)
    .fetch_all(pool)
    .await?;

    Ok(names)
}

/// Row counts per table, for `gbvmis-admin db status`
pub async fn table_counts(pool: &PgPool, tables: &[&str]) -> Result<Vec<(String, i64)>, DatabaseError> {
    let mut counts = Vec::with_capacity(tables.len());
    for table in tables {
        let query = format!(
            "SELECT COUNT(*) FROM {}",
            crate::database::query_builder::quote_identifier(table)
        );
        let count: i64 = sqlx::query_scalar(&query).fetch_one(pool).await?;
        counts.push((table.to_string(), count));
    }
    Ok(counts)
}
