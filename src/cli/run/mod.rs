//! Run command - executes a workflow document from a JSON file

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use crate::config::EngineConfig;
use crate::domain::Workflow;
use crate::infrastructure::logging;

#[derive(Args)]
pub struct RunArgs {
    /// Path to the workflow JSON document
    #[arg(short, long)]
    pub workflow: PathBuf,

    /// User the run executes on behalf of
    #[arg(short, long, default_value = "local")]
    pub user: String,
}

/// Execute the workflow and print the run result as pretty JSON.
///
/// Exits with status 1 when the run fails, so the command composes in
/// scripts.
pub async fn run(args: RunArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = EngineConfig::load().unwrap_or_default();
    logging::init_logging(&config.logging);

    let document = tokio::fs::read_to_string(&args.workflow).await?;
    let workflow: Workflow = serde_json::from_str(&document)?;

    info!(workflow = %args.workflow.display(), user = %args.user, "Executing workflow");

    let runner = crate::create_runner(&config)?;
    let result = runner.run(&workflow, args.user.as_str()).await?;

    println!("{}", serde_json::to_string_pretty(&result)?);

    if !result.is_success() {
        std::process::exit(1);
    }

    Ok(())
}
