use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::PublishError;
use crate::maven::coordinates::MavenCoordinates;
use crate::maven::version::VersionMode;

/// The raw (group, artifact, version) strings declared by a POM. Group and version are inherited
///  from `<parent>` if the project does not declare them itself.
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct PomCoordinates {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl PomCoordinates {
    pub fn parse(data: &[u8]) -> Result<PomCoordinates, String> {
        let raw: RawPom = serde_xml_rs::from_reader(data)
            .map_err(|e| format!("not a well-formed POM: {}", e))?;

        let parent = raw.parent.unwrap_or_default();

        let group_id = non_empty(raw.group_id)
            .or_else(|| non_empty(parent.group_id))
            .ok_or("no groupId in project or parent")?;
        let artifact_id = non_empty(raw.artifact_id)
            .ok_or("no artifactId in project")?;
        let version = non_empty(raw.version)
            .or_else(|| non_empty(parent.version))
            .ok_or("no version in project or parent")?;

        Ok(PomCoordinates { group_id, artifact_id, version })
    }

    pub fn into_coordinates(self, mode: VersionMode) -> Result<MavenCoordinates, PublishError> {
        MavenCoordinates::new(&self.group_id, &self.artifact_id, &self.version, mode)
    }
}

/// Reads the coordinates a descriptor file declares and validates its version for `mode`. Runs
///  before any network access.
pub async fn read_descriptor_coordinates(path: &Path, mode: VersionMode) -> Result<MavenCoordinates, PublishError> {
    let data = tokio::fs::read(path).await
        .map_err(|source| PublishError::Io { path: path.to_path_buf(), source })?;

    let pom = PomCoordinates::parse(&data)
        .map_err(|reason| PublishError::InvalidDescriptor { path: path.to_path_buf(), reason })?;
    debug!("descriptor {} declares {}:{}:{}", path.display(), pom.group_id, pom.artifact_id, pom.version);

    pom.into_coordinates(mode)
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPom {
    group_id: Option<String>,
    artifact_id: Option<String>,
    version: Option<String>,
    parent: Option<RawParent>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawParent {
    group_id: Option<String>,
    version: Option<String>,
}
