use anyhow::Context;
use serde_json::json;

use crate::cli::utils::{output_details, output_success};
use crate::cli::OutputFormat;
use crate::database::{seed, Repositories};

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let (_, manager) = super::connect().await?;

    let result = async {
        manager.migrate().await.context("migration failed")?;
        let repos = Repositories::postgres(manager.pool().clone());
        seed::seed(&repos).await.context("seeding failed")
    }
    .await;
    manager.close().await;
    let summary = result?;

    let logins: Vec<_> = seed::sample_logins()
        .into_iter()
        .map(|(email, password, role)| json!({ "email": email, "password": password, "role": role }))
        .collect();

    output_success(
        &output_format,
        "Database seeded",
        Some(json!({
            "users": summary.users,
            "problems": summary.problems,
            "comments": summary.comments,
            "upvotes": summary.upvotes,
            "logins": logins,
        })),
    )?;
    output_details(
        &output_format,
        &[
            ("users", summary.users.to_string()),
            ("problems", summary.problems.to_string()),
            ("comments", summary.comments.to_string()),
            ("upvotes", summary.upvotes.to_string()),
        ],
    );
    if let OutputFormat::Text = output_format {
        println!("Sample logins:");
        for (email, password, role) in seed::sample_logins() {
            println!("  {} / {} ({})", email, password, role);
        }
    }
    Ok(())
}
