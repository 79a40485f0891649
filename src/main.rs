use anyhow::{Context, Result};
use portal_backend::{
    cli::{Command, cli_options_from_args},
    config::Config,
    integrations::Integrations,
    logging::init_tracing,
    seed, server,
};

#[tokio::main]
async fn main() -> Result<()> {
    let options = cli_options_from_args()?;
    let config = match &options.config_path {
        Some(path) => Config::load(Some(path.as_path()))
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::load(None).context("failed to load config from environment")?,
    };
    let _logging_guard = init_tracing(&config.logging)?;

    match options.command {
        Command::Serve => server::run(config).await,
        Command::Seed => {
            let integrations = Integrations::from_config(&config);
            let report = seed::seed_collections(integrations.data_platform.as_ref()).await?;
            tracing::info!(
                target: "portal.seed",
                created = report.created.len(),
                skipped = report.skipped.len(),
                "collection provisioning finished"
            );
            Ok(())
        }
    }
}
