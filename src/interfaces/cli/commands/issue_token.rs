//! `affiliates issue-token <user_id>`

use std::sync::Arc;

use colored::Colorize;

use crate::api::jwt::get_jwt_service;
use crate::config::get_config;
use crate::interfaces::cli::CliError;
use crate::storage::SeaOrmStorage;

pub async fn issue_token(storage: Arc<SeaOrmStorage>, user_id: i64) -> Result<(), CliError> {
    let user = storage
        .get_user(user_id)
        .await?
        .ok_or_else(|| CliError::CommandError(format!("User {} does not exist", user_id)))?;

    let config = get_config();
    if config.api.jwt_secret.is_empty() {
        println!(
            "{}",
            "api.jwt_secret is empty: this token is only valid for this process".yellow()
        );
    }

    let token = get_jwt_service()
        .issue_session_token(user.id)
        .map_err(|e| CliError::CommandError(format!("Failed to sign token: {}", e)))?;

    println!(
        "{} {} ({})",
        "Session token for".green(),
        user.username.cyan(),
        format!("cookie: {}", config.api.session_cookie_name).dimmed()
    );
    println!("{}", token);
    Ok(())
}
