use std::time::Duration;

use reqwest::{Client, StatusCode};

use super::{PatchRequest, PatchResponse, RemoteError, RemoteFuture, RemoteStore};
use crate::record::{Record, validate_collection};

const RESOURCE_PATH: &str = "/api/characters";

/// Collaborator reached over HTTP
///
/// `GET {base}/api/characters` returns every record, `PATCH` on the same path
/// takes a [`PatchRequest`] body.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: Client,
    endpoint: String,
}

impl HttpRemote {
    /// Creates a client for the server at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), RESOURCE_PATH),
        })
    }

    /// Full resource url
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn check_status(status: StatusCode) -> Result<(), RemoteError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(RemoteError::Status(status.as_u16()))
    }
}

impl RemoteStore for HttpRemote {
    fn fetch_all(&self) -> RemoteFuture<'_, Vec<Record>> {
        Box::pin(async move {
            debug!("GET {}", self.endpoint);
            let response = self.client.get(&self.endpoint).send().await?;
            check_status(response.status())?;
            let records: Vec<Record> = response.json().await?;
            validate_collection(&records)?;
            Ok(records)
        })
    }

    fn patch_viewed(&self, request: PatchRequest) -> RemoteFuture<'_, PatchResponse> {
        Box::pin(async move {
            debug!("PATCH {} ({} ids, viewed={})", self.endpoint, request.ids.len(), request.viewed);
            let response = self.client.patch(&self.endpoint).json(&request).send().await?;
            check_status(response.status())?;
            let body: PatchResponse = response.json().await?;
            Ok(body)
        })
    }
}
