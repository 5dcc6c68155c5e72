use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use maven_deploy::config::DeployConfig;
use maven_deploy::maven::pom::read_descriptor_coordinates;
use maven_deploy::maven::remote_repo::{HttpsTransport, RemoteMavenRepo};
use maven_deploy::publish::{PublishRequest, Publisher};

#[tokio::main]
async fn main() -> ExitCode {
    let config = DeployConfig::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: DeployConfig) -> anyhow::Result<()> {
    let mode = config.mode();

    // reading the POM validates the version, before anything touches the network
    let coordinates = read_descriptor_coordinates(&config.pom, mode).await?;

    let endpoints = config.endpoints();
    let repository = endpoints.select(mode);
    info!("publishing {}:{}:{} to {} repository {}", coordinates.group_id.0, coordinates.artifact_id.0, coordinates.version, mode, repository);

    let transport = HttpsTransport::new(repository)
        .with_context(|| format!("invalid repository {:?}", repository))?;
    let publisher = Publisher::new(RemoteMavenRepo::new(transport));

    let request = PublishRequest {
        coordinates,
        files: config.files(),
        sign: config.do_sign,
    };
    let report = publisher.publish(&request).await?;

    for path in &report.uploaded {
        info!("uploaded {}", path);
    }
    Ok(())
}
