//! The publish pipeline: validate, resolve and merge the artifact's metadata, then upload the
//!  metadata followed by the version's files.
//!
//! Publishing is a read-modify-write of the shared `maven-metadata.xml` without any conditional
//!  write. Two publishes of the same artifact running at the same time can race, and the version
//!  added by the one that uploads its metadata first is lost (last writer wins on the whole
//!  document). Callers must serialize publishes per artifact.
//!
//! Local files are read twice: once when the upload plan computes their checksums, and again when
//!  they are streamed to the repository. The files must not change while a publish is running,
//!  otherwise the uploaded checksums do not match the uploaded content.

use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use chrono::Utc;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{PublishError, SigningUnsupported};
use crate::maven::coordinates::{MavenArtifactRef, MavenClassifier, MavenCoordinates};
use crate::maven::metadata_xml::MavenMetadata;
use crate::maven::paths::{checksum_path, metadata_path, root_path, version_relative_path, METADATA_FILE_NAME};
use crate::maven::remote_repo::{RemoteMavenRepo, RepositoryTransport};
use crate::maven::version::MavenVersion;
use crate::util::checksum::{digest_file, ChecksumAlgorithm};
use crate::util::upload_source::UploadSource;

/// the order in which checksum siblings are uploaded after their file
const CHECKSUM_ALGORITHMS: [ChecksumAlgorithm; 2] = [ChecksumAlgorithm::Md5, ChecksumAlgorithm::Sha1];

/// The local files of one publish. Companion files that are `None` are skipped. None of them may
///  change until the publish is finished.
#[derive(Debug, Clone)]
pub struct PublishFiles {
    pub pom: PathBuf,
    pub jar: PathBuf,
    pub sources_jar: Option<PathBuf>,
    pub uber_jar: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub coordinates: MavenCoordinates,
    pub files: PublishFiles,
    pub sign: bool,
}

#[derive(Debug, Clone)]
pub struct PublishReport {
    pub coordinates: MavenCoordinates,
    pub metadata: MavenMetadata,
    /// full repository paths, in upload order
    pub uploaded: Vec<String>,
}

/// One upload of the plan, relative to the artifact's root path
#[derive(Debug, Clone)]
pub struct UploadItem {
    pub source: UploadSource,
    pub relative_path: String,
}

#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum PublishStep {
    Validating,
    ResolvingIndex,
    Merging,
    StagingIndex,
    UploadingIndex,
    UploadingDescriptor,
    UploadingPrimary,
    UploadingOptional,
    Done,
}
impl Display for PublishStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PublishStep::Validating => "validating",
            PublishStep::ResolvingIndex => "resolving index",
            PublishStep::Merging => "merging",
            PublishStep::StagingIndex => "staging index",
            PublishStep::UploadingIndex => "uploading index",
            PublishStep::UploadingDescriptor => "uploading descriptor",
            PublishStep::UploadingPrimary => "uploading primary artifact",
            PublishStep::UploadingOptional => "uploading companion artifacts",
            PublishStep::Done => "done",
        };
        write!(f, "{}", s)
    }
}

/// Signs the artifacts of a publish. Failing to sign is never fatal.
pub trait ArtifactSigner: Send + Sync {
    fn sign(&self, coordinates: &MavenCoordinates, files: &PublishFiles) -> Result<(), SigningUnsupported>;
}

/// The only signer there is for now
pub struct UnsupportedSigner;
impl ArtifactSigner for UnsupportedSigner {
    fn sign(&self, _coordinates: &MavenCoordinates, _files: &PublishFiles) -> Result<(), SigningUnsupported> {
        Err(SigningUnsupported)
    }
}

pub struct Publisher<T: RepositoryTransport> {
    repo: RemoteMavenRepo<T>,
    signer: Box<dyn ArtifactSigner>,
    /// where the rendered metadata is staged before its upload
    staging_dir: PathBuf,
}

impl <T: RepositoryTransport> Publisher<T> {
    pub fn new(repo: RemoteMavenRepo<T>) -> Publisher<T> {
        Publisher {
            repo,
            signer: Box::new(UnsupportedSigner),
            staging_dir: std::env::temp_dir(),
        }
    }

    pub fn with_staging_dir(mut self, staging_dir: impl Into<PathBuf>) -> Publisher<T> {
        self.staging_dir = staging_dir.into();
        self
    }

    pub fn with_signer(mut self, signer: impl ArtifactSigner + 'static) -> Publisher<T> {
        self.signer = Box::new(signer);
        self
    }

    /// Runs the whole pipeline, stopping at the first failure. Uploads that succeeded before a
    ///  failure are not rolled back; since every upload replaces its target, publishing again
    ///  converges to the same end state.
    pub async fn publish(&self, request: &PublishRequest) -> Result<PublishReport, PublishError> {
        let coordinates = &request.coordinates;
        let mut steps = StepLog::new(coordinates);

        steps.enter(PublishStep::Validating);
        MavenVersion::validate(coordinates.version.as_str(), coordinates.version.mode())?;
        if request.sign {
            if let Err(e) = self.signer.sign(coordinates, &request.files) {
                warn!("{}, publishing unsigned artifacts", e);
            }
        }

        steps.enter(PublishStep::ResolvingIndex);
        let root = root_path(&coordinates.group_id, &coordinates.artifact_id);
        let metadata = self.resolve_metadata(coordinates, &root).await?;

        steps.enter(PublishStep::Merging);
        let metadata = metadata.merge(&coordinates.version, Utc::now());

        steps.enter(PublishStep::StagingIndex);
        let staged = stage_metadata(&metadata, &self.staging_dir)?;
        let plan = plan_version_uploads(coordinates, &request.files).await?;

        let mut uploaded = Vec::new();

        steps.enter(PublishStep::UploadingIndex);
        self.repo.upload(&root, UploadSource::File(staged.path().to_path_buf()), METADATA_FILE_NAME).await?;
        uploaded.push(metadata_path(&coordinates.group_id, &coordinates.artifact_id));

        for (step_of_item, item) in plan {
            steps.enter(step_of_item);
            self.repo.upload(&root, item.source, &item.relative_path).await?;
            uploaded.push(format!("{}/{}", root, item.relative_path));
        }

        // the staged metadata is deleted when `staged` goes out of scope, on every path
        drop(staged);

        steps.enter(PublishStep::Done);
        info!("published {} files for {}:{}:{}", uploaded.len(), coordinates.group_id.0, coordinates.artifact_id.0, coordinates.version);

        Ok(PublishReport {
            coordinates: coordinates.clone(),
            metadata,
            uploaded,
        })
    }

    async fn resolve_metadata(&self, coordinates: &MavenCoordinates, root: &str) -> Result<MavenMetadata, PublishError> {
        let data = match self.repo.fetch_metadata(root).await {
            Some(data) => data,
            None => {
                info!("no existing metadata for {}, starting fresh", root);
                return Ok(MavenMetadata::new_for(coordinates));
            }
        };

        let metadata = MavenMetadata::parse(&data)
            .map_err(|source| PublishError::IndexCorrupt {
                path: format!("{}/{}", root, METADATA_FILE_NAME),
                source,
            })?;

        if metadata.group_id != coordinates.group_id || metadata.artifact_id != coordinates.artifact_id {
            warn!(
                "metadata at {} is for {}:{}, merging {}:{} into it anyway",
                root, metadata.group_id.0, metadata.artifact_id.0, coordinates.group_id.0, coordinates.artifact_id.0,
            );
        }
        debug!("existing metadata lists {} versions", metadata.versions.len());
        Ok(metadata)
    }
}

/// Logs each step of a publish once, however many uploads it spans
struct StepLog<'a> {
    coordinates: &'a MavenCoordinates,
    current: Option<PublishStep>,
}
impl <'a> StepLog<'a> {
    fn new(coordinates: &'a MavenCoordinates) -> StepLog<'a> {
        StepLog { coordinates, current: None }
    }

    /// returns `true` if `step` differs from the previous one and was logged
    fn enter(&mut self, step: PublishStep) -> bool {
        if self.current == Some(step) {
            return false;
        }
        self.current = Some(step);
        info!("{}:{}:{} - {}", self.coordinates.group_id.0, self.coordinates.artifact_id.0, self.coordinates.version, step);
        true
    }
}

/// Renders the metadata into a temporary file in `staging_dir` that is removed when the returned
///  handle is dropped
fn stage_metadata(metadata: &MavenMetadata, staging_dir: &Path) -> Result<NamedTempFile, PublishError> {
    let io_error = |source: std::io::Error| PublishError::Io { path: staging_dir.to_path_buf(), source };

    let mut staged = tempfile::Builder::new()
        .prefix("deploymaven")
        .suffix(".xml")
        .tempfile_in(staging_dir)
        .map_err(io_error)?;
    staged.write_all(metadata.render().as_bytes()).map_err(io_error)?;
    staged.flush().map_err(io_error)?;

    debug!("staged metadata at {}", staged.path().display());
    Ok(staged)
}

/// The version specific uploads in order: descriptor, primary artifact with its checksums, then
///  each companion artifact that is present with its checksums. Every local file is read here, so
///  a missing file fails the publish before anything is uploaded.
pub async fn plan_version_uploads(coordinates: &MavenCoordinates, files: &PublishFiles) -> Result<Vec<(PublishStep, UploadItem)>, PublishError> {
    let mut plan = Vec::new();

    let pom_ref = MavenArtifactRef::new(coordinates, MavenClassifier::Unclassified, ".pom");
    check_readable(&files.pom).await?;
    plan.push((PublishStep::UploadingDescriptor, UploadItem {
        source: UploadSource::File(files.pom.clone()),
        relative_path: version_relative_path(&pom_ref),
    }));

    let jar_ref = MavenArtifactRef::new(coordinates, MavenClassifier::Unclassified, ".jar");
    for item in plan_jar_uploads(&files.jar, &jar_ref).await? {
        plan.push((PublishStep::UploadingPrimary, item));
    }

    let companions = [
        (&files.sources_jar, "sources"),
        (&files.uber_jar, "all"),
    ];
    for (file, classifier) in companions {
        if let Some(file) = file {
            let companion_ref = MavenArtifactRef::new(coordinates, MavenClassifier::Classified(classifier.to_string()), ".jar");
            for item in plan_jar_uploads(file, &companion_ref).await? {
                plan.push((PublishStep::UploadingOptional, item));
            }
        }
    }

    Ok(plan)
}

/// a jar followed by its MD5 and SHA-1 siblings
async fn plan_jar_uploads(file: &Path, artifact_ref: &MavenArtifactRef) -> Result<Vec<UploadItem>, PublishError> {
    let digests = digest_file(file).await
        .map_err(|source| PublishError::Io { path: file.to_path_buf(), source })?;
    debug!("{}: md5 {}, sha1 {}", file.display(), hex::encode(digests.md5), hex::encode(digests.sha1));

    let relative_path = version_relative_path(artifact_ref);

    let mut items = vec![UploadItem {
        source: UploadSource::File(file.to_path_buf()),
        relative_path: relative_path.clone(),
    }];
    for algorithm in CHECKSUM_ALGORITHMS {
        items.push(UploadItem {
            source: UploadSource::Bytes(Bytes::copy_from_slice(digests.get(algorithm))),
            relative_path: checksum_path(&relative_path, algorithm.file_extension()),
        });
    }
    Ok(items)
}

async fn check_readable(file: &Path) -> Result<(), PublishError> {
    tokio::fs::File::open(file).await
        .map(|_| ())
        .map_err(|source| PublishError::Io { path: file.to_path_buf(), source })
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;
    use super::*;
    use crate::error::UploadFailure;
    use crate::maven::transient_repo::TransientMavenRepo;
    use crate::maven::version::VersionMode;
    use crate::util::checksum::digest;

    const METADATA_PATH: &str = "com/example/lib/maven-metadata.xml";

    struct Fixture {
        dir: TempDir,
        files: PublishFiles,
    }
    impl Fixture {
        fn new(with_sources: bool, with_uber_jar: bool) -> Fixture {
            let dir = TempDir::new().unwrap();
            let write = |name: &str, content: &str| {
                let path = dir.path().join(name);
                std::fs::write(&path, content).unwrap();
                path
            };

            let files = PublishFiles {
                pom: write("lib.pom", "<project/>"),
                jar: write("lib.jar", "jar content"),
                sources_jar: if with_sources { Some(write("lib-sources.jar", "sources content")) } else { None },
                uber_jar: if with_uber_jar { Some(write("lib-all.jar", "uber content")) } else { None },
            };
            Fixture { dir, files }
        }

        fn request(&self, version: &str, mode: VersionMode) -> PublishRequest {
            PublishRequest {
                coordinates: MavenCoordinates::new("com.example", "lib", version, mode).unwrap(),
                files: self.files.clone(),
                sign: false,
            }
        }
    }

    fn metadata_of(transient: &TransientMavenRepo) -> MavenMetadata {
        MavenMetadata::parse(&transient.file(METADATA_PATH).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_publish_without_existing_metadata() {
        let fixture = Fixture::new(false, false);
        let transient = TransientMavenRepo::new();
        let publisher = Publisher::new(RemoteMavenRepo::new(transient.clone()));

        let report = publisher.publish(&fixture.request("1.0.0", VersionMode::Release)).await.unwrap();

        assert_eq!(transient.uploaded_paths(), vec![
            "com/example/lib/maven-metadata.xml",
            "com/example/lib/1.0.0/lib-1.0.0.pom",
            "com/example/lib/1.0.0/lib-1.0.0.jar",
            "com/example/lib/1.0.0/lib-1.0.0.jar.md5",
            "com/example/lib/1.0.0/lib-1.0.0.jar.sha1",
        ]);
        assert_eq!(report.uploaded, transient.uploaded_paths());

        let metadata = metadata_of(&transient);
        assert_eq!(metadata.versions, vec!["1.0.0"]);
        assert_eq!(metadata.latest.as_deref(), Some("1.0.0"));
        assert_eq!(metadata.release.as_deref(), Some("1.0.0"));
        assert_eq!(metadata.last_updated.len(), 14);
        assert!(metadata.last_updated.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(metadata, report.metadata);
    }

    #[tokio::test]
    async fn test_checksums_are_raw_digests() {
        let fixture = Fixture::new(false, false);
        let transient = TransientMavenRepo::new();
        let publisher = Publisher::new(RemoteMavenRepo::new(transient.clone()));

        publisher.publish(&fixture.request("1.0.0", VersionMode::Release)).await.unwrap();

        assert_eq!(transient.file("com/example/lib/1.0.0/lib-1.0.0.jar").unwrap(), Bytes::from_static(b"jar content"));
        assert_eq!(
            transient.file("com/example/lib/1.0.0/lib-1.0.0.jar.md5").unwrap().to_vec(),
            digest(b"jar content", ChecksumAlgorithm::Md5),
        );
        assert_eq!(
            transient.file("com/example/lib/1.0.0/lib-1.0.0.jar.sha1").unwrap().to_vec(),
            digest(b"jar content", ChecksumAlgorithm::Sha1),
        );
    }

    #[tokio::test]
    async fn test_publish_merges_existing_metadata() {
        let fixture = Fixture::new(false, false);
        let transient = TransientMavenRepo::new();
        let publisher = Publisher::new(RemoteMavenRepo::new(transient.clone()));

        publisher.publish(&fixture.request("1.0.0", VersionMode::Release)).await.unwrap();
        publisher.publish(&fixture.request("1.1.0", VersionMode::Release)).await.unwrap();

        let metadata = metadata_of(&transient);
        assert_eq!(metadata.versions, vec!["1.0.0", "1.1.0"]);
        assert_eq!(metadata.latest.as_deref(), Some("1.1.0"));
        assert_eq!(metadata.release.as_deref(), Some("1.1.0"));
    }

    #[tokio::test]
    async fn test_republish_is_idempotent_on_versions() {
        let fixture = Fixture::new(false, false);
        let transient = TransientMavenRepo::new();
        let publisher = Publisher::new(RemoteMavenRepo::new(transient.clone()));

        publisher.publish(&fixture.request("1.0.0", VersionMode::Release)).await.unwrap();
        let first = metadata_of(&transient);
        publisher.publish(&fixture.request("1.0.0", VersionMode::Release)).await.unwrap();
        let second = metadata_of(&transient);

        assert_eq!(first.versions, second.versions);
        assert_eq!(first.latest, second.latest);
        assert_eq!(first.release, second.release);
    }

    #[tokio::test]
    async fn test_snapshot_does_not_move_release() {
        let fixture = Fixture::new(false, false);
        let transient = TransientMavenRepo::new();
        let publisher = Publisher::new(RemoteMavenRepo::new(transient.clone()));

        publisher.publish(&fixture.request("1.0.0", VersionMode::Release)).await.unwrap();
        publisher.publish(&fixture.request("1.1.0-SNAPSHOT", VersionMode::Snapshot)).await.unwrap();

        let metadata = metadata_of(&transient);
        assert_eq!(metadata.versions, vec!["1.0.0", "1.1.0-SNAPSHOT"]);
        assert_eq!(metadata.latest.as_deref(), Some("1.1.0-SNAPSHOT"));
        assert_eq!(metadata.release.as_deref(), Some("1.0.0"));
        assert!(transient.file("com/example/lib/1.1.0-SNAPSHOT/lib-1.1.0-SNAPSHOT.jar").is_some());
    }

    #[tokio::test]
    async fn test_companion_artifacts() {
        let fixture = Fixture::new(true, true);
        let transient = TransientMavenRepo::new();
        let publisher = Publisher::new(RemoteMavenRepo::new(transient.clone()));

        publisher.publish(&fixture.request("1.0.0", VersionMode::Release)).await.unwrap();

        assert_eq!(transient.uploaded_paths()[5..], [
            "com/example/lib/1.0.0/lib-1.0.0-sources.jar",
            "com/example/lib/1.0.0/lib-1.0.0-sources.jar.md5",
            "com/example/lib/1.0.0/lib-1.0.0-sources.jar.sha1",
            "com/example/lib/1.0.0/lib-1.0.0-all.jar",
            "com/example/lib/1.0.0/lib-1.0.0-all.jar.md5",
            "com/example/lib/1.0.0/lib-1.0.0-all.jar.sha1",
        ]);
    }

    #[tokio::test]
    async fn test_only_uber_jar() {
        let fixture = Fixture::new(false, true);
        let transient = TransientMavenRepo::new();
        let publisher = Publisher::new(RemoteMavenRepo::new(transient.clone()));

        publisher.publish(&fixture.request("1.0.0", VersionMode::Release)).await.unwrap();

        let paths = transient.uploaded_paths();
        assert_eq!(paths.len(), 8);
        assert_eq!(paths[5], "com/example/lib/1.0.0/lib-1.0.0-all.jar");
    }

    #[tokio::test]
    async fn test_failed_upload_aborts() {
        let fixture = Fixture::new(true, false);
        let transient = TransientMavenRepo::new();
        transient.fail_put("com/example/lib/1.0.0/lib-1.0.0.jar", 500);
        let publisher = Publisher::new(RemoteMavenRepo::new(transient.clone()));

        let result = publisher.publish(&fixture.request("1.0.0", VersionMode::Release)).await;

        match result {
            Err(PublishError::UploadFailed { path, cause: UploadFailure::Status(500) }) => {
                assert_eq!(path, "com/example/lib/1.0.0/lib-1.0.0.jar");
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(transient.put_attempts(), vec![
            "com/example/lib/maven-metadata.xml",
            "com/example/lib/1.0.0/lib-1.0.0.pom",
            "com/example/lib/1.0.0/lib-1.0.0.jar",
        ]);
    }

    #[tokio::test]
    async fn test_failed_metadata_upload_aborts_before_version_files() {
        let fixture = Fixture::new(false, false);
        let transient = TransientMavenRepo::new();
        transient.fail_put(METADATA_PATH, 500);
        let publisher = Publisher::new(RemoteMavenRepo::new(transient.clone()));

        assert!(publisher.publish(&fixture.request("1.0.0", VersionMode::Release)).await.is_err());
        assert_eq!(transient.put_attempts(), vec![METADATA_PATH]);
        assert!(transient.uploaded_paths().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_metadata_is_fatal() {
        let fixture = Fixture::new(false, false);
        let transient = TransientMavenRepo::new();
        transient.insert(METADATA_PATH, Bytes::from_static(b"<metadata><groupId>com.example</gro"));
        let publisher = Publisher::new(RemoteMavenRepo::new(transient.clone()));

        let result = publisher.publish(&fixture.request("1.0.0", VersionMode::Release)).await;

        assert!(matches!(result, Err(PublishError::IndexCorrupt { .. })));
        assert!(transient.put_attempts().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_metadata_starts_fresh() {
        let fixture = Fixture::new(false, false);
        let transient = TransientMavenRepo::new();
        transient.fail_get(METADATA_PATH);
        let publisher = Publisher::new(RemoteMavenRepo::new(transient.clone()));

        let report = publisher.publish(&fixture.request("1.0.0", VersionMode::Release)).await.unwrap();
        assert_eq!(report.metadata.versions, vec!["1.0.0"]);
    }

    #[tokio::test]
    async fn test_missing_local_file_fails_before_upload() {
        let mut fixture = Fixture::new(false, false);
        fixture.files.sources_jar = Some(fixture.dir.path().join("missing-sources.jar"));
        let transient = TransientMavenRepo::new();
        let publisher = Publisher::new(RemoteMavenRepo::new(transient.clone()));

        let result = publisher.publish(&fixture.request("1.0.0", VersionMode::Release)).await;

        assert!(matches!(result, Err(PublishError::Io { .. })));
        assert!(transient.put_attempts().is_empty());
    }

    #[tokio::test]
    async fn test_mismatched_mode_is_rejected_before_io() {
        let fixture = Fixture::new(false, false);
        let transient = TransientMavenRepo::new();
        let publisher = Publisher::new(RemoteMavenRepo::new(transient.clone()));

        let mut request = fixture.request("1.0.0", VersionMode::Release);
        request.coordinates.version = MavenVersion::Snapshot("1.0.0".to_string());

        let result = publisher.publish(&request).await;
        assert!(matches!(result, Err(PublishError::InvalidVersion { mode: VersionMode::Snapshot, .. })));
        assert!(transient.put_attempts().is_empty());
    }

    /// Documents the known gap: both publishes read the same metadata before either writes, so
    ///  the second write drops the first publish's version.
    #[tokio::test]
    async fn test_interleaved_publishes_lose_a_version() {
        let transient = TransientMavenRepo::new();
        let repo = RemoteMavenRepo::new(transient.clone());
        let base = MavenMetadata::new_for(&MavenCoordinates::new("com.example", "lib", "1.0.0", VersionMode::Release).unwrap());
        transient.insert(METADATA_PATH, Bytes::from(base.render()));

        let read_a = MavenMetadata::parse(&repo.fetch_metadata("com/example/lib").await.unwrap()).unwrap();
        let read_b = MavenMetadata::parse(&repo.fetch_metadata("com/example/lib").await.unwrap()).unwrap();

        let a = read_a.merge(&MavenVersion::Release("1.1.0".to_string()), Utc::now());
        let b = read_b.merge(&MavenVersion::Release("1.2.0".to_string()), Utc::now());
        repo.upload("com/example/lib", UploadSource::Bytes(Bytes::from(a.render())), METADATA_FILE_NAME).await.unwrap();
        repo.upload("com/example/lib", UploadSource::Bytes(Bytes::from(b.render())), METADATA_FILE_NAME).await.unwrap();

        assert_eq!(metadata_of(&transient).versions, vec!["1.0.0", "1.2.0"]);
    }

    struct CountingSigner(Arc<AtomicUsize>);
    impl ArtifactSigner for CountingSigner {
        fn sign(&self, _coordinates: &MavenCoordinates, _files: &PublishFiles) -> Result<(), SigningUnsupported> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(SigningUnsupported)
        }
    }

    #[tokio::test]
    async fn test_signing_is_consulted_once_and_never_blocks() {
        let fixture = Fixture::new(false, false);
        let transient = TransientMavenRepo::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let publisher = Publisher::new(RemoteMavenRepo::new(transient.clone()))
            .with_signer(CountingSigner(calls.clone()));

        let mut request = fixture.request("1.0.0", VersionMode::Release);
        publisher.publish(&request).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        request.sign = true;
        publisher.publish(&request).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(transient.uploaded_paths().len(), 10);
    }

    fn staged_files(dir: &TempDir) -> usize {
        std::fs::read_dir(dir.path()).unwrap().count()
    }

    #[tokio::test]
    async fn test_staged_metadata_is_removed_after_publish() {
        let fixture = Fixture::new(false, false);
        let staging = TempDir::new().unwrap();
        let transient = TransientMavenRepo::new();
        let publisher = Publisher::new(RemoteMavenRepo::new(transient.clone()))
            .with_staging_dir(staging.path());

        publisher.publish(&fixture.request("1.0.0", VersionMode::Release)).await.unwrap();

        assert!(transient.file(METADATA_PATH).is_some());
        assert_eq!(staged_files(&staging), 0);
    }

    #[tokio::test]
    async fn test_staged_metadata_is_removed_after_failed_upload() {
        let fixture = Fixture::new(false, false);
        let staging = TempDir::new().unwrap();
        let transient = TransientMavenRepo::new();
        transient.fail_put("com/example/lib/1.0.0/lib-1.0.0.jar", 500);
        let publisher = Publisher::new(RemoteMavenRepo::new(transient.clone()))
            .with_staging_dir(staging.path());

        let result = publisher.publish(&fixture.request("1.0.0", VersionMode::Release)).await;

        assert!(matches!(result, Err(PublishError::UploadFailed { .. })));
        assert!(transient.file(METADATA_PATH).is_some());
        assert_eq!(staged_files(&staging), 0);
    }

    #[tokio::test]
    async fn test_staged_metadata_is_removed_when_planning_fails() {
        let mut fixture = Fixture::new(false, false);
        fixture.files.jar = fixture.dir.path().join("missing.jar");
        let staging = TempDir::new().unwrap();
        let publisher = Publisher::new(RemoteMavenRepo::new(TransientMavenRepo::new()))
            .with_staging_dir(staging.path());

        let result = publisher.publish(&fixture.request("1.0.0", VersionMode::Release)).await;

        assert!(matches!(result, Err(PublishError::Io { .. })));
        assert_eq!(staged_files(&staging), 0);
    }

    #[test]
    fn test_stage_metadata_in_missing_dir() {
        let staging = TempDir::new().unwrap();
        let missing = staging.path().join("missing");
        let metadata = MavenMetadata::new_for(&MavenCoordinates::new("com.example", "lib", "1.0.0", VersionMode::Release).unwrap());

        match stage_metadata(&metadata, &missing) {
            Err(PublishError::Io { path, .. }) => assert_eq!(path, missing),
            other => panic!("unexpected result {:?}", other.map(|f| f.path().to_path_buf())),
        }
    }

    #[test]
    fn test_step_log_logs_each_step_once() {
        let coordinates = MavenCoordinates::new("com.example", "lib", "1.0.0", VersionMode::Release).unwrap();
        let mut steps = StepLog::new(&coordinates);

        let logged: Vec<bool> = [
            PublishStep::UploadingIndex,
            PublishStep::UploadingDescriptor,
            PublishStep::UploadingPrimary,
            PublishStep::UploadingPrimary,
            PublishStep::UploadingPrimary,
            PublishStep::UploadingOptional,
            PublishStep::UploadingOptional,
            PublishStep::Done,
        ].into_iter()
            .map(|step| steps.enter(step))
            .collect();

        assert_eq!(logged, vec![true, true, true, false, false, true, false, true]);
    }

    #[tokio::test]
    async fn test_plan_order() {
        let fixture = Fixture::new(true, false);
        let coordinates = MavenCoordinates::new("com.example", "lib", "2.0.0", VersionMode::Release).unwrap();

        let plan = plan_version_uploads(&coordinates, &fixture.files).await.unwrap();
        let steps: Vec<_> = plan.iter().map(|(s, _)| *s).collect();
        let paths: Vec<_> = plan.iter().map(|(_, item)| item.relative_path.as_str()).collect();

        assert_eq!(steps, vec![
            PublishStep::UploadingDescriptor,
            PublishStep::UploadingPrimary,
            PublishStep::UploadingPrimary,
            PublishStep::UploadingPrimary,
            PublishStep::UploadingOptional,
            PublishStep::UploadingOptional,
            PublishStep::UploadingOptional,
        ]);
        assert_eq!(paths, vec![
            "2.0.0/lib-2.0.0.pom",
            "2.0.0/lib-2.0.0.jar",
            "2.0.0/lib-2.0.0.jar.md5",
            "2.0.0/lib-2.0.0.jar.sha1",
            "2.0.0/lib-2.0.0-sources.jar",
            "2.0.0/lib-2.0.0-sources.jar.md5",
            "2.0.0/lib-2.0.0-sources.jar.sha1",
        ]);
    }
}
