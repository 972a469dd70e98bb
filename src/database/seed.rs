use sqlx::PgPool;
use tracing::info;

use crate::database::manager::DatabaseError;

const ROLES: &[(&str, &str)] = &[
    ("Admin", "Full access to all records"),
    ("Station Manager", "Manages a police post and its officers"),
    ("User", "Standard officer access"),
];

const POLICE_POSTS: &[(&str, &str, &str)] = &[
    ("Kampala Central Police Head quarters", "Kampala Main Street", "+25641000789"),
    ("Wandegeya Police Post", "Wandegeya", "+25641000788"),
];

pub const ADMIN_USERNAME: &str = "Admin";
pub const ADMIN_EMAIL: &str = "admin@example.com";
const ADMIN_PASSWORD: &str = "Admin123";

async fn is_empty(pool: &PgPool, table: &str) -> Result<bool, DatabaseError> {
    let query = format!(
        "SELECT NOT EXISTS (SELECT 1 FROM {})",
        crate::database::query_builder::quote_identifier(table)
    );
    Ok(sqlx::query_scalar(&query).fetch_one(pool).await?)
}

/// Seed reference data. Each table is only touched when it has no rows, so
/// running this repeatedly is harmless.
pub async fn seed(pool: &PgPool) -> Result<(), DatabaseError> {
    if is_empty(pool, "roles").await? {
        for (name, description) in ROLES {
            sqlx::query("INSERT INTO roles (name, description) VALUES ($1, $2)")
                .bind(*name)
                .bind(*description)
                .execute(pool)
                .await?;
        }
        info!("Seeded {} roles", ROLES.len());
    }

    if is_empty(pool, "police_posts").await? {
        for (name, location, contact) in POLICE_POSTS {
            sqlx::query("INSERT INTO police_posts (name, location, contact) VALUES ($1, $2, $3)")
                .bind(*name)
                .bind(*location)
                .bind(*contact)
                .execute(pool)
                .await?;
        }
        info!("Seeded {} police posts", POLICE_POSTS.len());
    }

    if is_empty(pool, "police_officers").await? {
        let password = crate::auth::hash_password(ADMIN_PASSWORD)
            .map_err(|e| DatabaseError::Internal(e.to_string()))?;

        let mut tx = pool.begin().await?;
        let post_id: Option<i64> = sqlx::query_scalar("SELECT id FROM police_posts ORDER BY id LIMIT 1")
            .fetch_optional(&mut *tx)
            .await?;

        let officer_id: i64 = sqlx::query_scalar(
            "INSERT INTO police_officers
                (first_name, last_name, rank, badge_no, phone, post_id, username, email, password)
             VALUES ('John', 'Doe', 'ASP', 'B00192', '07812663647', $1, $2, $3, $4)
             RETURNING id",
        )
        .bind(post_id)
        .bind(ADMIN_USERNAME)
        .bind(ADMIN_EMAIL)
        .bind(password)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO officer_roles (officer_id, role_id)
             SELECT $1, id FROM roles WHERE name = 'Admin'",
        )
        .bind(officer_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!("Seeded admin officer '{}'", ADMIN_USERNAME);
    }

    Ok(())
}
