//! The remote collaborator: read-all and bulk-patch endpoints.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::{Record, RecordError};

mod http;
mod local;

pub use http::HttpRemote;
pub use local::LocalRemote;

/// Body of a bulk viewed-status patch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchRequest {
    /// Records to update
    pub ids: Vec<String>,
    /// Target value
    pub viewed: bool,
}

/// Successful patch response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchResponse {
    /// Whether the remote applied the patch
    pub success: bool,
    /// Number of ids the remote processed
    pub updated_count: usize,
}

/// Failure of a remote call
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Network or protocol error
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-success HTTP status
    #[error("server responded with status {0}")]
    Status(u16),
    /// The request body was rejected
    #[error("bad request: {0}")]
    BadRequest(String),
    /// The payload could not be decoded
    #[error("invalid payload: {0}")]
    Decode(#[from] serde_json::Error),
    /// The payload decoded but holds invalid records
    #[error("invalid records: {0}")]
    InvalidRecords(#[from] RecordError),
    /// Backing file could not be read or written
    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),
    /// Failure forced by the collaborator's failure switch
    #[error("injected failure")]
    Injected,
}

/// Future returned by [`RemoteStore`] operations
pub type RemoteFuture<'a, T> = BoxFuture<'a, Result<T, RemoteError>>;

/// Remote persistence for records
///
/// Patching must be idempotent: applying the same request twice leaves the
/// same final state.
pub trait RemoteStore: Send + Sync {
    /// Fetches the whole record collection, in collection order
    fn fetch_all(&self) -> RemoteFuture<'_, Vec<Record>>;

    /// Sets `viewed` on every listed record
    fn patch_viewed(&self, request: PatchRequest) -> RemoteFuture<'_, PatchResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_response_wire_format() {
        let response: PatchResponse = serde_json::from_str(r#"{"success":true,"updatedCount":2}"#).unwrap();
        assert!(response.success);
        assert_eq!(response.updated_count, 2);
    }

    #[test]
    fn patch_request_wire_format() {
        let request = PatchRequest {
            ids: vec![String::from("1"), String::from("2")],
            viewed: true,
        };
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"ids":["1","2"],"viewed":true}"#
        );
    }
}
