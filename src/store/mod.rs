//! Persistence of recordings on the memo server.

pub mod client;
pub mod filename;

pub use client::{HttpRecordsClient, RecordsApi, StoreError};
pub use filename::{display_label, RecordFilename};
