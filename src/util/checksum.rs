use std::path::Path;

use futures::StreamExt;
use sha1::{Digest, Sha1};
use tokio::fs::File;
use tokio_util::io::ReaderStream;

#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum ChecksumAlgorithm {
    /// 128 bit, for repository conventions only
    Md5,
    /// 160 bit
    Sha1,
}
impl ChecksumAlgorithm {
    /// extension of the sibling file a repository expects the digest in
    pub fn file_extension(&self) -> &'static str {
        match self {
            ChecksumAlgorithm::Md5 => "md5",
            ChecksumAlgorithm::Sha1 => "sha1",
        }
    }
}

pub fn digest(data: &[u8], algorithm: ChecksumAlgorithm) -> Vec<u8> {
    match algorithm {
        ChecksumAlgorithm::Md5 => {
            let hash: [u8; 16] = md5::compute(data).into();
            hash.to_vec()
        }
        ChecksumAlgorithm::Sha1 => Sha1::digest(data).to_vec(),
    }
}

/// Both digests of a file, raw bytes (not hex encoded)
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct FileDigests {
    pub md5: [u8; 16],
    pub sha1: [u8; 20],
}
impl FileDigests {
    pub fn get(&self, algorithm: ChecksumAlgorithm) -> &[u8] {
        match algorithm {
            ChecksumAlgorithm::Md5 => &self.md5,
            ChecksumAlgorithm::Sha1 => &self.sha1,
        }
    }
}

/// Computes MD5 and SHA-1 of a file in a single streamed pass, without holding the file in memory
pub async fn digest_file(path: &Path) -> std::io::Result<FileDigests> {
    let file = File::open(path).await?;
    let mut data = ReaderStream::new(file);

    let mut sha1_hasher: Sha1 = Default::default();
    let mut md5_hasher = md5::Context::new();

    while let Some(bytes) = data.next().await {
        let bytes = bytes?;
        sha1_hasher.update(&bytes);
        md5_hasher.consume(&bytes);
    }

    Ok(FileDigests {
        md5: md5_hasher.compute().into(),
        sha1: sha1_hasher.finalize().into(),
    })
}
