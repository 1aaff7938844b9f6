use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde_json::Value;

use super::{PatchRequest, PatchResponse, RemoteError, RemoteFuture, RemoteStore};
use crate::record::{Record, validate_collection};

const INVALID_BODY: &str = "Invalid request body. Expected { ids: string[], viewed: boolean }";

/// In-process collaborator, optionally persisted to a JSON file
///
/// Used for local runs and as the test double: latency can be simulated on
/// both legs and failures can be forced.
#[derive(Debug, Default)]
pub struct LocalRemote {
    records: Mutex<Vec<Record>>,
    path: Option<PathBuf>,
    fetch_latency: Duration,
    patch_latency: Duration,
    fail_fetch: AtomicBool,
    fail_patch: AtomicBool,
    fetch_calls: AtomicUsize,
    patch_calls: AtomicUsize,
}

impl LocalRemote {
    /// Serves the given records from memory
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Default::default()
        }
    }

    /// Serves the records stored in a JSON file, rewriting it after every patch
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, RemoteError> {
        let path = path.as_ref().to_path_buf();
        let raw = tokio::fs::read_to_string(&path).await?;
        let records: Vec<Record> = serde_json::from_str(&raw)?;
        validate_collection(&records)?;
        debug!("local remote: {} records from {}", records.len(), path.display());
        Ok(Self {
            records: Mutex::new(records),
            path: Some(path),
            ..Default::default()
        })
    }

    /// Delays every fetch and patch
    #[must_use]
    pub fn with_latency(mut self, fetch: Duration, patch: Duration) -> Self {
        self.fetch_latency = fetch;
        self.patch_latency = patch;
        self
    }

    /// Makes subsequent fetches fail
    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::Relaxed);
    }

    /// Makes subsequent patches fail without touching data
    pub fn set_fail_patch(&self, fail: bool) {
        self.fail_patch.store(fail, Ordering::Relaxed);
    }

    /// Number of fetches served or failed
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::Relaxed)
    }

    /// Number of patches served or failed
    pub fn patch_calls(&self) -> usize {
        self.patch_calls.load(Ordering::Relaxed)
    }

    /// Current server-side copy of the records
    pub fn snapshot(&self) -> Vec<Record> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Validates a raw JSON patch body, then applies it
    ///
    /// `ids` must be an array of strings and `viewed` a boolean.
    pub fn patch_raw<'a>(&'a self, body: &str) -> RemoteFuture<'a, PatchResponse> {
        let parsed = parse_patch_body(body);
        Box::pin(async move {
            let request = parsed?;
            self.patch_viewed(request).await
        })
    }

    fn apply(&self, request: &PatchRequest) -> Vec<Record> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        for record in records.iter_mut().filter(|r| request.ids.contains(&r.id)) {
            record.viewed = request.viewed;
        }
        records.clone()
    }

    async fn persist(&self, records: &[Record]) -> Result<(), RemoteError> {
        if let Some(path) = &self.path {
            let json = serde_json::to_string_pretty(records)?;
            tokio::fs::write(path, json).await?;
            trace!("local remote: wrote {}", path.display());
        }
        Ok(())
    }
}

fn parse_patch_body(body: &str) -> Result<PatchRequest, RemoteError> {
    let value: Value = serde_json::from_str(body).map_err(|_| RemoteError::BadRequest(INVALID_BODY.into()))?;
    let ids = value
        .get("ids")
        .and_then(Value::as_array)
        .and_then(|ids| {
            ids.iter()
                .map(|id| id.as_str().map(String::from))
                .collect::<Option<Vec<_>>>()
        })
        .ok_or_else(|| RemoteError::BadRequest(INVALID_BODY.into()))?;
    let viewed = value
        .get("viewed")
        .and_then(Value::as_bool)
        .ok_or_else(|| RemoteError::BadRequest(INVALID_BODY.into()))?;
    Ok(PatchRequest { ids, viewed })
}

impl RemoteStore for LocalRemote {
    fn fetch_all(&self) -> RemoteFuture<'_, Vec<Record>> {
        Box::pin(async move {
            self.fetch_calls.fetch_add(1, Ordering::Relaxed);
            if !self.fetch_latency.is_zero() {
                tokio::time::sleep(self.fetch_latency).await;
            }
            if self.fail_fetch.load(Ordering::Relaxed) {
                return Err(RemoteError::Injected);
            }
            Ok(self.snapshot())
        })
    }

    fn patch_viewed(&self, request: PatchRequest) -> RemoteFuture<'_, PatchResponse> {
        Box::pin(async move {
            self.patch_calls.fetch_add(1, Ordering::Relaxed);
            if self.fail_patch.load(Ordering::Relaxed) {
                if !self.patch_latency.is_zero() {
                    tokio::time::sleep(self.patch_latency).await;
                }
                return Err(RemoteError::Injected);
            }
            let records = self.apply(&request);
            self.persist(&records).await?;
            if !self.patch_latency.is_zero() {
                tokio::time::sleep(self.patch_latency).await;
            }
            Ok(PatchResponse {
                success: true,
                updated_count: request.ids.len(),
            })
        })
    }
}
