use anyhow::{anyhow, Context};
use clap::Subcommand;
use serde_json::json;

use super::db::connect;
use crate::auth::{hash_password, TokenKeys};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::service;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Print the argon2 hash of a password")]
    HashPassword {
        #[arg(help = "Plain text password")]
        password: String,
    },

    #[command(about = "Mint an access/refresh pair for an existing officer")]
    Token {
        #[arg(help = "Officer email or username")]
        identifier: String,
    },
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::HashPassword { password } => {
            let hash = hash_password(&password).context("hashing failed")?;
            output_success(output_format, "Password hashed", Some(json!({ "hash": hash })))
        }
        AuthCommands::Token { identifier } => {
            let pool = connect().await?;
            let officer = service::find_officer_by_identifier(&pool, &identifier)
                .await?
                .ok_or_else(|| anyhow!("no officer matches '{}'", identifier))?;
            let roles = service::find_role_names(&pool, officer.id).await?;
            let pair = TokenKeys::global().issue_pair(officer.id, &officer.email, &roles)?;
            output_success(
                output_format,
                &format!("Tokens issued for {}", officer.username),
                Some(json!({
                    "access_token": pair.access_token,
                    "refresh_token": pair.refresh_token,
                    "expires_in": pair.expires_in,
                })),
            )
        }
    }
}
