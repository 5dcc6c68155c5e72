use async_trait::async_trait;
use bytes::Bytes;
use hyper::{Body, Client, Request, StatusCode, Uri};
use hyper::body::to_bytes;
use hyper::client::HttpConnector;
use hyper::header::{CONTENT_LENGTH, USER_AGENT};
use hyper_tls::HttpsConnector;
use tracing::{debug, trace, warn};

use crate::error::{PublishError, UploadFailure};
use crate::maven::paths::METADATA_FILE_NAME;
use crate::util::upload_source::UploadSource;

const USER_AGENT_VALUE: &str = concat!("maven-deploy/", env!("CARGO_PKG_VERSION"));

/// Raw access to a repository, with paths relative to the repository's base URI
#[async_trait]
pub trait RepositoryTransport: Send + Sync {
    /// `Ok(None)` if the repository does not have the resource
    async fn get(&self, path: &str) -> anyhow::Result<Option<Bytes>>;

    /// Replaces the resource at `path`, returning the response status. `Err` means there was no
    ///  response at all.
    async fn put(&self, path: &str, data: UploadSource) -> anyhow::Result<u16>;
}

/// HTTP(S) transport. Instances do HTTP connection caching internally, so one instance should be
///  used for all requests of a publish.
pub struct HttpsTransport {
    client: Client<HttpsConnector<HttpConnector>>,
    base_uri: String, // with trailing '/'
}
impl HttpsTransport {
    /// `repository` is either "host[/base/path]", which implies https, or a full URI with scheme
    pub fn new(repository: &str) -> anyhow::Result<HttpsTransport> {
        let mut base_uri = if repository.starts_with("https://") || repository.starts_with("http://") {
            repository.to_string()
        }
        else {
            format!("https://{}", repository)
        };
        if !base_uri.ends_with('/') {
            base_uri.push('/');
        }

        // check that the base URI is valid
        Uri::try_from(base_uri.clone())?;

        Ok(HttpsTransport {
            client: Client::builder()
                .build::<_, Body>(HttpsConnector::new()),
            base_uri,
        })
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    fn uri(&self, path: &str) -> anyhow::Result<Uri> {
        Ok(Uri::try_from(format!("{}{}", self.base_uri, path))?)
    }
}

#[async_trait]
impl RepositoryTransport for HttpsTransport {
    async fn get(&self, path: &str) -> anyhow::Result<Option<Bytes>> {
        let request = Request::builder()
            .method("GET")
            .uri(self.uri(path)?)
            .header(USER_AGENT, USER_AGENT_VALUE)
            .body(Body::empty())?;

        trace!("getting {:?}", request);

        let response = self.client.request(request)
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(anyhow::Error::msg(format!("request for {} failed: {}", path, response.status())));
        }

        Ok(Some(to_bytes(response.into_body()).await?))
    }

    async fn put(&self, path: &str, data: UploadSource) -> anyhow::Result<u16> {
        let (body, len) = data.into_body().await?;
        let request = Request::builder()
            .method("PUT")
            .uri(self.uri(path)?)
            .header(USER_AGENT, USER_AGENT_VALUE)
            .header(CONTENT_LENGTH, len)
            .body(body)?;

        trace!("putting {:?}", request);

        let response = self.client.request(request)
            .await?;
        let status = response.status();

        // drain the body so the connection can be reused
        if let Err(e) = to_bytes(response.into_body()).await {
            trace!("failed to read response body for {}: {}", path, e);
        }

        Ok(status.as_u16())
    }
}

/// The two operations a publish needs from a repository: fetching an artifact's metadata and
///  replacing a file below an artifact's root path.
pub struct RemoteMavenRepo<T: RepositoryTransport> {
    transport: T,
}

impl <T: RepositoryTransport> RemoteMavenRepo<T> {
    pub fn new(transport: T) -> RemoteMavenRepo<T> {
        RemoteMavenRepo { transport }
    }

    /// The raw metadata document below `root_path`, or `None` if there is none. Failure to reach
    ///  the repository counts as 'none'; callers start a fresh document in that case.
    pub async fn fetch_metadata(&self, root_path: &str) -> Option<Bytes> {
        let path = format!("{}/{}", root_path, METADATA_FILE_NAME);
        match self.transport.get(&path).await {
            Ok(Some(data)) => {
                debug!("found existing metadata at {} ({} bytes)", path, data.len());
                Some(data)
            }
            Ok(None) => {
                debug!("no metadata at {}", path);
                None
            }
            Err(e) => {
                warn!("could not fetch metadata at {}, starting with fresh metadata: {:#}", path, e);
                None
            }
        }
    }

    /// Replaces `<root_path>/<relative_path>` with `data`. Any status outside 2xx is a failure;
    ///  there are no retries.
    pub async fn upload(&self, root_path: &str, data: UploadSource, relative_path: &str) -> Result<(), PublishError> {
        let path = format!("{}/{}", root_path, relative_path);
        debug!("uploading {}", path);

        match self.transport.put(&path, data).await {
            Ok(status) if (200..=299).contains(&status) => {
                trace!("uploaded {}: {}", path, status);
                Ok(())
            }
            Ok(status) => Err(PublishError::UploadFailed {
                path,
                cause: UploadFailure::Status(status),
            }),
            Err(e) => Err(PublishError::UploadFailed {
                path,
                cause: UploadFailure::Transport(e),
            }),
        }
    }
}
