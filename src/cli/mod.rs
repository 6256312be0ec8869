pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "civic")]
#[command(about = "CivicPulse operator CLI - schema, sample data and account management")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Wipe all data and load the sample data set")]
    Seed,

    #[command(about = "Account management")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Migrate => commands::migrate::handle(output_format).await,
        Commands::Seed => commands::seed::handle(output_format).await,
        Commands::User { cmd } => commands::user::handle(cmd, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_user_subcommands() {
        let cli = Cli::parse_from(["civic", "--json", "user", "set-password", "a@example.com", "secret99"]);
        assert!(cli.json);
        match cli.command {
            Commands::User {
                cmd: commands::user::UserCommands::SetPassword { email, password },
            } => {
                assert_eq!(email, "a@example.com");
                assert_eq!(password, "secret99");
            }
            _ => panic!("expected user set-password"),
        }
    }

    #[test]
    fn parses_seed() {
        let cli = Cli::parse_from(["civic", "seed"]);
        assert!(matches!(cli.command, Commands::Seed));
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Text));
    }
}
