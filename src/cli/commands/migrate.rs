use anyhow::Context;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let (_, manager) = super::connect().await?;
    let result = manager.migrate().await.context("migration failed");
    manager.close().await;
    result?;

    output_success(&output_format, "Migrations applied", None)
}
