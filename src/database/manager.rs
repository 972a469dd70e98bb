use std::time::Duration;

use sqlx::{migrate::MigrateError, postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::filter::FilterError;
use crate::record::RecordError;

/// Storage-level failure classes surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    Conflict,
    StorageFailure,
}

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("{0}")]
    Internal(String),

    #[error(transparent)]
    Migration(#[from] MigrateError),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl DatabaseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DatabaseError::InvalidInput(_) => ErrorKind::InvalidInput,
            DatabaseError::NotFound(_) => ErrorKind::NotFound,
            DatabaseError::Conflict(_) => ErrorKind::Conflict,
            _ => ErrorKind::StorageFailure,
        }
    }

    pub fn not_found(label: &str, id: i64) -> Self {
        DatabaseError::NotFound(format!("{} {} not found", label, id))
    }
}

/// Map a Postgres SQLSTATE onto a failure class. Integrity violations the
/// client can fix are reported as such; everything else is a storage failure.
pub fn classify_sqlstate(code: &str) -> ErrorKind {
    match code {
        // unique_violation
        "23505" => ErrorKind::Conflict,
        // foreign_key_violation, not_null_violation, check_violation
        "23503" | "23502" | "23514" => ErrorKind::InvalidInput,
        // data exception class: bad dates, out of range numbers, ...
        c if c.starts_with("22") => ErrorKind::InvalidInput,
        _ => ErrorKind::StorageFailure,
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => DatabaseError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db) => {
                let message = match db.constraint() {
                    Some(constraint) => format!("{} ({})", db.message(), constraint),
                    None => db.message().to_string(),
                };
                let kind = db.code().map(|code| classify_sqlstate(&code));
                match kind {
                    Some(ErrorKind::Conflict) => DatabaseError::Conflict(message),
                    Some(ErrorKind::InvalidInput) => DatabaseError::InvalidInput(message),
                    _ => DatabaseError::Sqlx(err),
                }
            }
            _ => DatabaseError::Sqlx(err),
        }
    }
}

impl From<RecordError> for DatabaseError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::Hash(msg) => DatabaseError::Internal(msg),
            other => DatabaseError::InvalidInput(other.to_string()),
        }
    }
}

impl From<FilterError> for DatabaseError {
    fn from(err: FilterError) -> Self {
        DatabaseError::InvalidInput(err.to_string())
    }
}

/// Builds and checks the shared connection pool
pub struct DatabaseManager;

impl DatabaseManager {
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let connection_string = Self::build_connection_string(config)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&connection_string)
            .await?;

        info!(
            "Created database pool for {}:{}/{} (max {} connections)",
            config.host, config.port, config.name, config.max_connections
        );
        Ok(pool)
    }

    /// Use DATABASE_URL when given, otherwise assemble one from the parts
    pub fn build_connection_string(config: &DatabaseConfig) -> Result<String, DatabaseError> {
        if let Some(url) = config.url.as_deref().filter(|u| !u.trim().is_empty()) {
            let parsed = url::Url::parse(url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
            return Ok(parsed.into());
        }

        if config.host.is_empty() {
            return Err(DatabaseError::ConfigMissing("DB_HOST"));
        }
        if config.name.is_empty() {
            return Err(DatabaseError::ConfigMissing("DB_NAME"));
        }

        let mut url = url::Url::parse("postgres://localhost")
            .map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        url.set_host(Some(&config.host)).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        url.set_port(Some(config.port)).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        url.set_username(&config.user).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if !config.password.is_empty() {
            url.set_password(Some(&config.password))
                .map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        }
        url.set_path(&format!("/{}", config.name));
        if !config.sslmode.is_empty() {
            url.query_pairs_mut().append_pair("sslmode", &config.sslmode);
        }
        Ok(url.into())
    }

    /// Apply the embedded migrations
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }
}
