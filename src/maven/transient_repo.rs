use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;

use crate::maven::remote_repo::RepositoryTransport;
use crate::util::upload_source::UploadSource;

/// in-memory repository, neither optimized nor particularly robust - for testing purposes
///
/// Clones share their state, so a test can keep one handle and give another to the code under
///  test.
#[derive(Clone, Default)]
pub struct TransientMavenRepo {
    state: Arc<Mutex<TransientState>>,
}

#[derive(Default)]
struct TransientState {
    files: HashMap<String, Bytes>,
    put_attempts: Vec<String>,
    uploaded: Vec<String>,
    failing_puts: HashMap<String, u16>,
    failing_gets: HashSet<String>,
}

impl TransientMavenRepo {
    pub fn new() -> TransientMavenRepo {
        Default::default()
    }

    pub fn insert(&self, path: &str, data: Bytes) {
        self.state.lock().unwrap()
            .files
            .insert(path.to_string(), data);
    }

    pub fn file(&self, path: &str) -> Option<Bytes> {
        self.state.lock().unwrap()
            .files
            .get(path)
            .cloned()
    }

    /// PUTs to `path` are answered with `status` and leave the stored file untouched
    pub fn fail_put(&self, path: &str, status: u16) {
        self.state.lock().unwrap()
            .failing_puts
            .insert(path.to_string(), status);
    }

    /// GETs of `path` fail as if the repository were unreachable
    pub fn fail_get(&self, path: &str) {
        self.state.lock().unwrap()
            .failing_gets
            .insert(path.to_string());
    }

    /// paths of successful PUTs, in order
    pub fn uploaded_paths(&self) -> Vec<String> {
        self.state.lock().unwrap()
            .uploaded
            .clone()
    }

    /// paths of all PUTs including failed ones, in order
    pub fn put_attempts(&self) -> Vec<String> {
        self.state.lock().unwrap()
            .put_attempts
            .clone()
    }
}

#[async_trait]
impl RepositoryTransport for TransientMavenRepo {
    async fn get(&self, path: &str) -> anyhow::Result<Option<Bytes>> {
        let state = self.state.lock().unwrap();
        if state.failing_gets.contains(path) {
            return Err(anyhow::Error::msg(format!("connection refused: {}", path)));
        }
        Ok(state.files.get(path).cloned())
    }

    async fn put(&self, path: &str, data: UploadSource) -> anyhow::Result<u16> {
        // read before locking, the guard must not be held across an await
        let data = data.read_all().await?;

        let mut state = self.state.lock().unwrap();
        state.put_attempts.push(path.to_string());

        if let Some(status) = state.failing_puts.get(path) {
            return Ok(*status);
        }

        state.files.insert(path.to_string(), data);
        state.uploaded.push(path.to_string());
        Ok(201)
    }
}
