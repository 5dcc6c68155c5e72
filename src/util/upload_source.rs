use std::path::PathBuf;

use bytes::Bytes;
use hyper::Body;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

/// The data of one upload: either a local file, streamed when it is sent, or an in-memory buffer
#[derive(Debug, Clone)]
pub enum UploadSource {
    File(PathBuf),
    Bytes(Bytes),
}

impl UploadSource {
    /// An HTTP body for this source, along with its length in bytes
    pub async fn into_body(self) -> std::io::Result<(Body, u64)> {
        match self {
            UploadSource::File(path) => {
                let file = File::open(&path).await?;
                let len = file.metadata().await?.len();
                Ok((Body::wrap_stream(ReaderStream::new(file)), len))
            }
            UploadSource::Bytes(bytes) => {
                let len = bytes.len() as u64;
                Ok((Body::from(bytes), len))
            }
        }
    }

    pub async fn read_all(self) -> std::io::Result<Bytes> {
        match self {
            UploadSource::File(path) => Ok(tokio::fs::read(&path).await?.into()),
            UploadSource::Bytes(bytes) => Ok(bytes),
        }
    }
}
