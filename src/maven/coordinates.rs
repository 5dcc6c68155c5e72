use crate::error::PublishError;
use crate::maven::version::{MavenVersion, VersionMode};

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct MavenArtifactId(pub String);

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct MavenGroupId(pub String);

/// The (group, artifact, version) triple of one publishable unit. The version is validated on
///  construction, so holding a `MavenCoordinates` means no network access can start with a
///  malformed version.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct MavenCoordinates {
    pub group_id: MavenGroupId,
    pub artifact_id: MavenArtifactId,
    pub version: MavenVersion,
}
impl MavenCoordinates {
    pub fn new(group_id: &str, artifact_id: &str, version: &str, mode: VersionMode) -> Result<MavenCoordinates, PublishError> {
        Ok(MavenCoordinates {
            group_id: MavenGroupId(group_id.to_string()),
            artifact_id: MavenArtifactId(artifact_id.to_string()),
            version: MavenVersion::validate(version, mode)?,
        })
    }
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub enum MavenClassifier {
    Unclassified,
    Classified(String),
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct MavenArtifactRef {
    pub coordinates: MavenCoordinates,
    pub classifier: MavenClassifier,
    pub file_extension: String, // including leading '.', e.g. ".jar"
}
impl MavenArtifactRef {
    pub fn new(coordinates: &MavenCoordinates, classifier: MavenClassifier, file_extension: &str) -> MavenArtifactRef {
        MavenArtifactRef {
            coordinates: coordinates.clone(),
            classifier,
            file_extension: file_extension.to_string(),
        }
    }
}
