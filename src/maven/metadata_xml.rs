use std::fmt::Write;

use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use xml::escape::escape_str_pcdata as escape;

use crate::maven::coordinates::{MavenArtifactId, MavenCoordinates, MavenGroupId};
use crate::maven::version::MavenVersion;

/// The per-artifact `maven-metadata.xml` document, reduced to the parts a publisher maintains.
///  See https://maven.apache.org/ref/3.9.5/maven-repository-metadata/repository-metadata.html
///
/// `versions` is in publication order and free of duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MavenMetadata {
    pub group_id: MavenGroupId,
    pub artifact_id: MavenArtifactId,
    pub latest: Option<String>,
    /// absent in documents that only ever saw snapshot publishes
    pub release: Option<String>,
    pub versions: Vec<String>,
    /// "yyyyMMddHHmmss" in UTC, empty for a document that was never merged
    pub last_updated: String,
}

impl MavenMetadata {
    /// A document for an artifact that was never published before
    pub fn new_for(coordinates: &MavenCoordinates) -> MavenMetadata {
        let version = coordinates.version.as_str().to_string();
        MavenMetadata {
            group_id: coordinates.group_id.clone(),
            artifact_id: coordinates.artifact_id.clone(),
            latest: Some(version.clone()),
            release: if coordinates.version.is_snapshot() { None } else { Some(version.clone()) },
            versions: vec![version],
            last_updated: "".to_string(),
        }
    }

    pub fn parse(data: &[u8]) -> anyhow::Result<MavenMetadata> {
        let raw: RawMetadata = serde_xml_rs::from_reader(data)
            .context("not a well-formed metadata document")?;

        let group_id = non_empty(raw.group_id)
            .ok_or_else(|| anyhow!("metadata has no groupId"))?;
        let artifact_id = non_empty(raw.artifact_id)
            .ok_or_else(|| anyhow!("metadata has no artifactId"))?;
        let versioning = raw.versioning.unwrap_or_default();

        let mut versions: Vec<String> = Vec::new();
        for v in versioning.versions.map(|v| v.version).unwrap_or_default() {
            let v = v.trim().to_string();
            if !v.is_empty() && !versions.contains(&v) {
                versions.push(v);
            }
        }

        Ok(MavenMetadata {
            group_id: MavenGroupId(group_id),
            artifact_id: MavenArtifactId(artifact_id),
            latest: non_empty(versioning.latest),
            release: non_empty(versioning.release),
            versions,
            last_updated: non_empty(versioning.last_updated).unwrap_or_default(),
        })
    }

    /// Adds `version` to the document: it is appended to `versions` unless already present, and
    ///  becomes the new 'latest'. Release versions also become the new 'release'; snapshots
    ///  leave 'release' untouched.
    pub fn merge(mut self, version: &MavenVersion, now: DateTime<Utc>) -> MavenMetadata {
        let version_string = version.as_str();

        if !self.versions.iter().any(|v| v == version_string) {
            self.versions.push(version_string.to_string());
        }

        self.latest = Some(version_string.to_string());
        if !version.is_snapshot() {
            self.release = Some(version_string.to_string());
        }

        self.last_updated = format_timestamp(now);
        self
    }

    pub fn render(&self) -> String {
        let mut xml = String::new();
        // writing to a String does not fail
        let _ = self.write_xml(&mut xml);
        xml
    }

    fn write_xml(&self, xml: &mut String) -> std::fmt::Result {
        writeln!(xml, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(xml, "<metadata>")?;
        writeln!(xml, "  <groupId>{}</groupId>", escape(&self.group_id.0))?;
        writeln!(xml, "  <artifactId>{}</artifactId>", escape(&self.artifact_id.0))?;
        writeln!(xml, "  <versioning>")?;
        if let Some(latest) = &self.latest {
            writeln!(xml, "    <latest>{}</latest>", escape(latest))?;
        }
        if let Some(release) = &self.release {
            writeln!(xml, "    <release>{}</release>", escape(release))?;
        }
        writeln!(xml, "    <versions>")?;
        for v in &self.versions {
            writeln!(xml, "      <version>{}</version>", escape(v))?;
        }
        writeln!(xml, "    </versions>")?;
        writeln!(xml, "    <lastUpdated>{}</lastUpdated>", escape(&self.last_updated))?;
        writeln!(xml, "  </versioning>")?;
        writeln!(xml, "</metadata>")
    }
}

pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.format("%Y%m%d%H%M%S").to_string()
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMetadata {
    group_id: Option<String>,
    artifact_id: Option<String>,
    versioning: Option<RawVersioning>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawVersioning {
    latest: Option<String>,
    release: Option<String>,
    versions: Option<RawVersions>,
    last_updated: Option<String>,
}

#[derive(Deserialize)]
struct RawVersions {
    #[serde(default)]
    version: Vec<String>,
}
