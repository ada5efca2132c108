//! HTTP client for the memo server.
//!
//! Two endpoints: `POST <save_path>` takes a multipart form with the recording
//! in a single file field, `GET <records_path>` returns a JSON array of
//! stored filenames.

use std::time::Duration;

use reqwest::multipart::{Form, Part};

use super::filename::RecordFilename;
use crate::config::ServerConfig;
use crate::recording::RecordingBlob;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Network(String),
    #[error("memo server responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode memo server response: {0}")]
    Decode(String),
    #[error("failed to build request: {0}")]
    Request(String),
}

/// Remote storage for recordings.
#[allow(async_fn_in_trait)]
pub trait RecordsApi {
    /// Uploads `blob` under `filename`. Resolves once the server acknowledged it.
    async fn upload(&self, blob: &RecordingBlob, filename: &RecordFilename) -> Result<(), StoreError>;

    /// Lists stored filenames in server order.
    async fn list(&self) -> Result<Vec<String>, StoreError>;

    /// Location a media player can stream a stored file from.
    fn media_url(&self, filename: &str) -> String;
}

pub struct HttpRecordsClient {
    client: reqwest::Client,
    base_url: String,
    save_path: String,
    records_path: String,
    field_name: String,
}

impl HttpRecordsClient {
    pub fn new(config: &ServerConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoreError::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            save_path: config.save_path.clone(),
            records_path: config.records_path.clone(),
            field_name: config.field_name.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl RecordsApi for HttpRecordsClient {
    async fn upload(&self, blob: &RecordingBlob, filename: &RecordFilename) -> Result<(), StoreError> {
        let part = Part::bytes(blob.bytes().to_vec())
            .file_name(filename.to_string())
            .mime_str(blob.mime_type())
            .map_err(|e| StoreError::Request(e.to_string()))?;
        let form = Form::new().part(self.field_name.clone(), part);

        let url = self.url(&self.save_path);
        tracing::debug!(
            "Uploading {} ({} bytes, {}) to {}",
            filename,
            blob.len(),
            blob.mime_type(),
            url
        );

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(network_error)?;
        check_status(response).await?;

        tracing::info!("Saved recording {}", filename);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let url = self.url(&self.records_path);
        let response = self.client.get(&url).send().await.map_err(network_error)?;
        let response = check_status(response).await?;

        let files: Vec<String> = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        tracing::debug!("Fetched {} records from {}", files.len(), url);
        Ok(files)
    }

    fn media_url(&self, filename: &str) -> String {
        format!("{}/{}", self.base_url, urlencoding::encode(filename))
    }
}

fn network_error(e: reqwest::Error) -> StoreError {
    let message = if e.is_connect() {
        format!("Failed to connect to the memo server: {e}")
    } else if e.is_timeout() {
        "Request to the memo server timed out".to_string()
    } else {
        format!("Memo server network error: {e}")
    };
    StoreError::Network(message)
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
pub mod testing {
    //! In-memory stand-in for the memo server.

    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Upload {
        pub filename: String,
        pub mime_type: String,
        pub bytes: Vec<u8>,
    }

    #[derive(Default)]
    pub struct MemoryStore {
        pub files: RefCell<Vec<String>>,
        pub uploads: RefCell<Vec<Upload>>,
        /// Queued failures for the next upload calls.
        pub upload_failures: RefCell<VecDeque<StoreError>>,
        /// Queued failures for the next list calls.
        pub list_failures: RefCell<VecDeque<StoreError>>,
        pub list_calls: RefCell<usize>,
        /// Order of calls, e.g. `["list", "upload", "list"]`.
        pub calls: RefCell<Vec<&'static str>>,
    }

    impl MemoryStore {
        pub fn with_files(files: &[&str]) -> Self {
            let store = Self::default();
            *store.files.borrow_mut() = files.iter().map(|f| f.to_string()).collect();
            store
        }
    }

    impl RecordsApi for MemoryStore {
        async fn upload(&self, blob: &RecordingBlob, filename: &RecordFilename) -> Result<(), StoreError> {
            self.calls.borrow_mut().push("upload");
            if let Some(err) = self.upload_failures.borrow_mut().pop_front() {
                return Err(err);
            }
            self.uploads.borrow_mut().push(Upload {
                filename: filename.to_string(),
                mime_type: blob.mime_type().to_string(),
                bytes: blob.bytes().to_vec(),
            });
            self.files.borrow_mut().push(filename.to_string());
            Ok(())
        }

        async fn list(&self) -> Result<Vec<String>, StoreError> {
            self.calls.borrow_mut().push("list");
            *self.list_calls.borrow_mut() += 1;
            if let Some(err) = self.list_failures.borrow_mut().pop_front() {
                return Err(err);
            }
            Ok(self.files.borrow().clone())
        }

        fn media_url(&self, filename: &str) -> String {
            format!("mem://{filename}")
        }
    }
}
