use escrow_validator::{Deployment, DeploymentConfig, TransactionGroup, ValidationEngine};
use std::{env, fs};
use tracing::info;

/// The main entry point for the validator binary.
///
/// Loads a deployment TOML and a transaction-group JSON, binds the
/// deployment, runs the engine, and prints the verdict as JSON. Exits
/// nonzero on a rejected group so the binary composes in scripts.
fn main() -> anyhow::Result<()> {
    // Initialize logging using tracing_subscriber.
    tracing_subscriber::fmt::init();

    let mut args = env::args().skip(1);
    let usage = "usage: escrow-validator <deployment.toml> <group.json>";
    let deployment_path = args.next().ok_or_else(|| anyhow::anyhow!(usage))?;
    let group_path = args.next().ok_or_else(|| anyhow::anyhow!(usage))?;

    // Bind the trade's template parameters. A deployment that fails to bind
    // never gets to evaluate a group.
    let config = DeploymentConfig::load(&deployment_path)?;
    let deployment = Deployment::bind(&config)?;
    info!("validating against {} deployment", deployment.trade());

    let group: TransactionGroup = serde_json::from_str(&fs::read_to_string(&group_path)?)?;

    let engine = ValidationEngine::new(deployment);
    let verdict = engine.validate(&group);
    println!("{}", serde_json::to_string_pretty(&verdict)?);

    if !verdict.is_accepted() {
        std::process::exit(1);
    }
    Ok(())
}
