use crate::maven::coordinates::*;

pub const METADATA_FILE_NAME: &str = "maven-metadata.xml";

/// "com.example" + "lib" -> "com/example/lib"
pub fn root_path(group_id: &MavenGroupId, artifact_id: &MavenArtifactId) -> String {
    format!("{}/{}", group_id.0.replace('.', "/"), artifact_id.0)
}

/// "<artifactId>-<version>", the common prefix of every file of one version
pub fn file_base_name(coordinates: &MavenCoordinates) -> String {
    format!("{}-{}", coordinates.artifact_id.0, coordinates.version)
}

/// Path of a file relative to the artifact's root path, i.e. "<version>/<file name>"
pub fn version_relative_path(artifact_ref: &MavenArtifactRef) -> String {
    format!("{}/{}", artifact_ref.coordinates.version, maven_file_name(artifact_ref))
}

pub fn as_maven_path(artifact_ref: &MavenArtifactRef) -> String {
    format!(
        "{}/{}",
        root_path(&artifact_ref.coordinates.group_id, &artifact_ref.coordinates.artifact_id),
        version_relative_path(artifact_ref),
    )
}

pub fn metadata_path(group_id: &MavenGroupId, artifact_id: &MavenArtifactId) -> String {
    format!("{}/{}", root_path(group_id, artifact_id), METADATA_FILE_NAME)
}

/// Sibling file holding a digest of the file at `path`, e.g. "x.jar" -> "x.jar.sha1"
pub fn checksum_path(path: &str, checksum_extension: &str) -> String {
    format!("{}.{}", path, checksum_extension)
}

fn maven_file_name(artifact_ref: &MavenArtifactRef) -> String {
    let classifier_string = match &artifact_ref.classifier {
        MavenClassifier::Unclassified => "".to_string(),
        MavenClassifier::Classified(c) => format!("-{}", c),
    };

    format!("{}{}{}",
            file_base_name(&artifact_ref.coordinates),
            classifier_string,
            artifact_ref.file_extension,
    )
}
