use anyhow::Context;
use clap::Subcommand;
use sqlx::PgPool;

use crate::cli::utils::{output_counts, output_success};
use crate::cli::OutputFormat;
use crate::config;
use crate::database::{models::*, seed, service, DatabaseManager, Resource};

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Apply pending migrations")]
    Migrate,

    #[command(about = "Seed roles, police posts and the admin officer into empty tables")]
    Seed,

    #[command(about = "Check connectivity and show row counts")]
    Status,
}

const TABLES: &[&str] = &[
    Victim::TABLE,
    Suspect::TABLE,
    Case::TABLE,
    Charge::TABLE,
    Arrest::TABLE,
    PoliceOfficer::TABLE,
    PolicePost::TABLE,
    Role::TABLE,
    HealthFacility::TABLE,
    HealthPractitioner::TABLE,
    Examination::TABLE,
    ToxicologyReport::TABLE,
    Symptom::TABLE,
    PostMortemSummary::TABLE,
];

pub(crate) async fn connect() -> anyhow::Result<PgPool> {
    DatabaseManager::connect(&config::config().database)
        .await
        .context("failed to connect to database")
}

pub async fn handle(cmd: DbCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = connect().await?;

    match cmd {
        DbCommands::Migrate => {
            DatabaseManager::migrate(&pool).await?;
            output_success(output_format, "Migrations applied", None)
        }
        DbCommands::Seed => {
            seed::seed(&pool).await?;
            output_success(output_format, "Seed data present", None)
        }
        DbCommands::Status => {
            DatabaseManager::health_check(&pool).await?;
            let counts = service::table_counts(&pool, TABLES).await?;
            output_success(output_format, "Database reachable", None)?;
            output_counts(output_format, &counts)
        }
    }
}
