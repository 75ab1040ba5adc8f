use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use deployer::{
    bundle::ResourceBundle, config::Opts, CreateSettings, Deployer, KubeClusterClient,
};
use kube::Client;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

async fn inner_main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    let bundle = ResourceBundle::from_file(&opts.bundle)?;
    info!(resources = bundle.len(), bundle = %opts.bundle.display(), "loaded bundle");

    let client = Client::try_default()
        .await
        .context("failed to build a kubernetes client")?;
    let client = KubeClusterClient::new(
        client,
        CreateSettings {
            dry_run: opts.dry_run,
            field_manager: opts.field_manager.clone(),
        },
    );

    let mut deployer = Deployer::new(Arc::new(client)).with_policy(opts.on_conversion_error);
    bundle.load_into(&mut deployer, &opts.namespace);
    deployer.run().await?;
    info!("all resources created");
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = inner_main().await {
        eprintln!("{:?}", e);
        std::process::exit(1);
    }
}
