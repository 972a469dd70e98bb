use std::collections::HashMap;
use std::marker::PhantomData;

use serde_json::Value;
use sqlx::{PgConnection, PgPool};
use tracing::debug;

use crate::config::AppConfig;
use crate::database::manager::DatabaseError;
use crate::database::query_builder::{arguments, delete_sql, insert_sql, quote_identifier, select_by_id_sql, update_sql};
use crate::database::resource::{Actor, Record, Resource, WriteOp};
use crate::database::value::SqlValue;
use crate::filter::{Filter, FilterWhereOptions};
use crate::pagination::{PageParams, Pagination};
use crate::record::{FieldKind, LinkReplace, PatchPolicy, Payload, UpdateSet};

/// Behaviour switches read from configuration
#[derive(Debug, Clone, Default)]
pub struct RepositoryOptions {
    pub filter: FilterWhereOptions,
    pub patch_policy: PatchPolicy,
    /// Log generated search SQL at debug level
    pub log_sql: bool,
}

impl RepositoryOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            filter: FilterWhereOptions { reject_invalid: config.filter.reject_invalid_params },
            patch_policy: config.update.patch_policy,
            log_sql: config.filter.debug_logging,
        }
    }
}

/// Generic CRUD + search over one resource table
pub struct Repository<R> {
    pool: PgPool,
    options: RepositoryOptions,
    _phantom: PhantomData<R>,
}

impl<R: Resource> Repository<R> {
    pub fn new(pool: PgPool) -> Self {
        Self::with_options(pool, RepositoryOptions::from_config(crate::config::config()))
    }

    pub fn with_options(pool: PgPool, options: RepositoryOptions) -> Self {
        Self {
            pool,
            options,
            _phantom: PhantomData,
        }
    }

    /// Insert a record with its links and nested rows in one transaction
    pub async fn create(&self, mut payload: Payload, actor: &Actor) -> Result<Record<R>, DatabaseError> {
        if R::AUDITED {
            payload.set_default("created_by", Value::String(actor.email.clone()));
            payload.remove("updated_by");
        }

        let mut tx = self.pool.begin().await?;
        R::before_create(&mut tx, &mut payload).await?;

        let set = UpdateSet::for_create(&payload, R::FIELDS, R::REQUIRED, R::ASSOCIATIONS)?;
        let sql = insert_sql(R::TABLE, &set.columns);
        let id: i64 = sqlx::query_scalar_with(&sql.query, arguments(&sql.params))
            .fetch_one(&mut *tx)
            .await?;

        replace_links(&mut tx, id, &set.links).await?;
        R::after_write(&mut tx, id, &payload, WriteOp::Create, self.options.patch_policy).await?;
        tx.commit().await?;

        debug!("Created {} {}", R::LABEL, id);
        self.get_by_id(id).await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Record<R>, DatabaseError> {
        let sql = select_by_id_sql(R::TABLE, R::COLUMNS, id);
        let row: R = sqlx::query_as_with(&sql.query, arguments(&sql.params))
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found(R::LABEL, id))?;

        let mut record = Record::new(row);
        for association in R::ASSOCIATIONS {
            let query = format!(
                "SELECT {member} FROM {link} WHERE {owner} = $1 ORDER BY {member}",
                member = quote_identifier(association.member_column),
                link = quote_identifier(association.link_table),
                owner = quote_identifier(association.owner_column),
            );
            let ids: Vec<i64> = sqlx::query_scalar(&query).bind(id).fetch_all(&self.pool).await?;
            record.extra.insert(association.key.to_string(), Value::from(ids));
        }
        record.extra.extend(R::related(&self.pool, id).await?);
        Ok(record)
    }

    pub async fn list(&self, page: PageParams) -> Result<(Pagination, Vec<R>), DatabaseError> {
        self.search(&HashMap::new(), page).await
    }

    /// Count and page through rows matching the resource's search fields.
    /// Both statements run in one snapshot so the total matches the slice.
    pub async fn search(
        &self,
        query: &HashMap<String, String>,
        page: PageParams,
    ) -> Result<(Pagination, Vec<R>), DatabaseError> {
        let filter = Filter::new(R::TABLE, R::COLUMNS)?
            .options(self.options.filter.clone())
            .search(R::SEARCH, query)?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let count = filter.to_count_sql();
        if self.options.log_sql {
            debug!("{} search: {} {:?}", R::LABEL, count.query, count.params);
        }
        let total: i64 = sqlx::query_scalar_with(&count.query, arguments(&count.params))
            .fetch_one(&mut *tx)
            .await?;

        let pagination = Pagination::new(page, total);
        let rows: Vec<R> = if pagination.expected_len() == 0 {
            vec![]
        } else {
            let select = filter.to_sql(page);
            sqlx::query_as_with(&select.query, arguments(&select.params))
                .fetch_all(&mut *tx)
                .await?
        };
        tx.commit().await?;

        Ok((pagination, rows))
    }

    /// Apply a partial update. The row write is conditional on the id, so a
    /// missing record is reported without a separate lookup.
    pub async fn update(&self, id: i64, payload: Payload, actor: &Actor) -> Result<Record<R>, DatabaseError> {
        let mut set = UpdateSet::for_update(
            &payload,
            R::FIELDS,
            R::ASSOCIATIONS,
            R::NESTED,
            self.options.patch_policy,
        )?;

        if R::AUDITED {
            // created_by is fixed at creation
            set.columns.retain(|(c, _)| *c != "created_by");
            if !set.columns.iter().any(|(c, v)| *c == "updated_by" && !v.is_null()) {
                set.columns.retain(|(c, _)| *c != "updated_by");
                set.columns.push(("updated_by", SqlValue::text(actor.email.as_str())));
            }
        }

        let mut tx = self.pool.begin().await?;
        let updated = update_row(&mut tx, R::TABLE, &set.columns, id).await?;
        if updated.is_none() {
            return Err(DatabaseError::not_found(R::LABEL, id));
        }

        replace_links(&mut tx, id, &set.links).await?;
        R::after_write(&mut tx, id, &payload, WriteOp::Update, self.options.patch_policy).await?;
        tx.commit().await?;

        debug!("Updated {} {}", R::LABEL, id);
        self.get_by_id(id).await
    }

    /// Delete the row and whatever its resource owns, in one transaction
    pub async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        R::before_delete(&mut tx, id).await?;

        let sql = delete_sql(R::TABLE, id);
        let result = sqlx::query_with(&sql.query, arguments(&sql.params))
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found(R::LABEL, id));
        }
        tx.commit().await?;
        debug!("Deleted {} {}", R::LABEL, id);
        Ok(())
    }

    /// Raw contents of a byte column; `None` when the record has no data there
    pub async fn blob(&self, id: i64, column: &str) -> Result<Option<Vec<u8>>, DatabaseError> {
        let field = R::FIELDS
            .iter()
            .find(|f| f.name == column && f.kind == FieldKind::Bytes)
            .ok_or_else(|| DatabaseError::InvalidInput(format!("{} has no binary field '{}'", R::LABEL, column)))?;

        let query = format!(
            "SELECT {} FROM {} WHERE \"id\" = $1",
            quote_identifier(field.name),
            quote_identifier(R::TABLE)
        );
        let row: Option<Option<Vec<u8>>> = sqlx::query_scalar(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            None => Err(DatabaseError::not_found(R::LABEL, id)),
            Some(data) => Ok(data.filter(|d| !d.is_empty())),
        }
    }
}

/// Replace each association's member set for `owner_id`, refusing ids that do
/// not exist in the member table
pub async fn replace_links(
    conn: &mut PgConnection,
    owner_id: i64,
    links: &[LinkReplace],
) -> Result<(), DatabaseError> {
    for link in links {
        let association = link.association;
        let link_table = quote_identifier(association.link_table);
        let owner = quote_identifier(association.owner_column);
        let member = quote_identifier(association.member_column);

        if !link.ids.is_empty() {
            let query = format!(
                "SELECT \"id\" FROM {} WHERE \"id\" = ANY($1)",
                quote_identifier(association.member_table)
            );
            let existing: Vec<i64> = sqlx::query_scalar(&query)
                .bind(&link.ids)
                .fetch_all(&mut *conn)
                .await?;
            let missing: Vec<String> = link
                .ids
                .iter()
                .filter(|id| !existing.contains(id))
                .map(|id| id.to_string())
                .collect();
            if !missing.is_empty() {
                return Err(DatabaseError::InvalidInput(format!(
                    "{}: unknown ids {}",
                    association.key,
                    missing.join(", ")
                )));
            }
        }

        sqlx::query(&format!("DELETE FROM {} WHERE {} = $1", link_table, owner))
            .bind(owner_id)
            .execute(&mut *conn)
            .await?;

        if !link.ids.is_empty() {
            sqlx::query(&format!(
                "INSERT INTO {} ({}, {}) SELECT $1, unnest($2::bigint[])",
                link_table, owner, member
            ))
            .bind(owner_id)
            .bind(&link.ids)
            .execute(&mut *conn)
            .await?;
        }
    }
    Ok(())
}

/// Insert a row into `table` from an already-built column set
pub async fn insert_row(
    conn: &mut PgConnection,
    table: &str,
    columns: &[(&'static str, SqlValue)],
) -> Result<i64, DatabaseError> {
    let sql = insert_sql(table, columns);
    let id: i64 = sqlx::query_scalar_with(&sql.query, arguments(&sql.params))
        .fetch_one(&mut *conn)
        .await?;
    Ok(id)
}

/// Update a row by id from an already-built column set; `None` when no row
/// has that id
pub async fn update_row(
    conn: &mut PgConnection,
    table: &str,
    columns: &[(&'static str, SqlValue)],
    id: i64,
) -> Result<Option<i64>, DatabaseError> {
    let sql = update_sql(table, columns, id);
    let updated: Option<i64> = sqlx::query_scalar_with(&sql.query, arguments(&sql.params))
        .fetch_optional(&mut *conn)
        .await?;
    Ok(updated)
}
