use std::path::PathBuf;

use clap::Parser;

use crate::maven::version::VersionMode;
use crate::publish::PublishFiles;

/// Publishes a jar, its POM and optional companion jars to a Maven repository, keeping the
///  artifact's maven-metadata.xml up to date.
#[derive(Parser, Debug)]
#[command(name = "maven-deploy")]
#[command(version, about, long_about = None)]
pub struct DeployConfig {
    /// The primary jar
    #[arg(long = "artifact")]
    pub jar: PathBuf,

    /// The POM describing the artifact; group, artifact and version are read from it
    #[arg(long)]
    pub pom: PathBuf,

    /// Sources jar, published with the '-sources' classifier
    #[arg(long = "sources")]
    pub sources_jar: Option<PathBuf>,

    /// Jar including all dependencies, published with the '-all' classifier
    #[arg(long)]
    pub uber_jar: Option<PathBuf>,

    /// Release repository, "host[/path]" or a full URI
    #[arg(long = "release", env = "MAVEN_DEPLOY_RELEASE_REPO")]
    pub release_repo: String,

    /// Snapshot repository, "host[/path]" or a full URI
    #[arg(long = "snapshot", env = "MAVEN_DEPLOY_SNAPSHOT_REPO")]
    pub snapshot_repo: String,

    /// Publish a snapshot (commit hash or '-SNAPSHOT' version) instead of a release
    #[arg(long)]
    pub is_snapshot: bool,

    /// Sign the published artifacts (not yet supported, only warns)
    #[arg(long)]
    pub do_sign: bool,

    /// Log level (trace, debug, info, warn, error), overridden by RUST_LOG
    #[arg(long, default_value = "info", value_parser = ["trace", "debug", "info", "warn", "error"])]
    pub log_level: String,
}

impl DeployConfig {
    pub fn mode(&self) -> VersionMode {
        VersionMode::from_snapshot_flag(self.is_snapshot)
    }

    pub fn endpoints(&self) -> RepositoryEndpoints {
        RepositoryEndpoints {
            release: self.release_repo.clone(),
            snapshot: self.snapshot_repo.clone(),
        }
    }

    pub fn files(&self) -> PublishFiles {
        PublishFiles {
            pom: self.pom.clone(),
            jar: self.jar.clone(),
            sources_jar: self.sources_jar.clone(),
            uber_jar: self.uber_jar.clone(),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RepositoryEndpoints {
    pub release: String,
    pub snapshot: String,
}
impl RepositoryEndpoints {
    pub fn select(&self, mode: VersionMode) -> &str {
        match mode {
            VersionMode::Release => &self.release,
            VersionMode::Snapshot => &self.snapshot,
        }
    }
}
