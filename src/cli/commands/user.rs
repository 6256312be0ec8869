use std::sync::Arc;

use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_details, output_error, output_success};
use crate::cli::OutputFormat;
use crate::database::models::{Role, User};
use crate::database::Repositories;
use crate::services::{AuthService, ServiceError};

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create an admin account")]
    CreateAdmin {
        #[arg(help = "Display name")]
        name: String,
        #[arg(help = "Email address")]
        email: String,
        #[arg(help = "Password (6-255 characters)")]
        password: String,
    },

    #[command(about = "Replace a user's password")]
    SetPassword {
        #[arg(help = "Email address")]
        email: String,
        #[arg(help = "New password (6-255 characters)")]
        password: String,
    },

    #[command(about = "Grant the admin role to an existing user")]
    Promote {
        #[arg(help = "Email address")]
        email: String,
    },
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let (config, manager) = super::connect().await?;
    let auth = AuthService::new(Repositories::postgres(manager.pool().clone()), Arc::new(config.clone()));

    let result = match cmd {
        UserCommands::CreateAdmin { name, email, password } => auth
            .create_user(&name, &email, &password, Role::Admin)
            .await
            .map(|user| ("Admin account created", user)),
        UserCommands::SetPassword { email, password } => {
            match auth.find_by_email(&email).await {
                Ok(user) => auth.update_password(user.id, &password).await.map(|user| ("Password updated", user)),
                Err(e) => Err(e),
            }
        }
        UserCommands::Promote { email } => match auth.find_by_email(&email).await {
            Ok(user) => auth.set_role(user.id, Role::Admin).await.map(|user| ("User promoted to admin", user)),
            Err(e) => Err(e),
        },
    };
    manager.close().await;

    match result {
        Ok((message, user)) => report(&output_format, message, &user),
        Err(e) => {
            output_error(&output_format, &describe(&e))?;
            Err(e.into())
        }
    }
}

fn report(output_format: &OutputFormat, message: &str, user: &User) -> anyhow::Result<()> {
    output_success(output_format, message, Some(json!({ "user": user })))?;
    output_details(
        output_format,
        &[
            ("id", user.id.to_string()),
            ("email", user.email.clone()),
            ("role", user.role.to_string()),
        ],
    );
    Ok(())
}

/// Field errors spelled out, since the CLI has no envelope
fn describe(err: &ServiceError) -> String {
    match err {
        ServiceError::Validation { errors, .. } if errors.len() > 1 => errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}
