//! Checksum sidecar fetching for relcat.
//!
//! Release artifacts are published next to a `<artifact>.sha256` sidecar. This
//! crate fetches those sidecars over blocking HTTP (`HttpChecksumSource`),
//! retrying transient gateway errors with exponential backoff (`RetryPolicy`),
//! and exposes the `ChecksumSource` seam the normalizer is written against.

pub mod config;
pub mod http;
pub mod retry;

pub use config::FetchConfig;
pub use http::HttpChecksumSource;
pub use retry::RetryPolicy;

use relcat_schema::Sha256Digest;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("HTTP {code} for {url}")]
    Status { code: u16, url: String },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("gave up on {url} after {attempts} attempts (last status {last_status})")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last_status: u16,
    },
    #[error("empty checksum file: {0}")]
    EmptyChecksum(String),
}

/// Somewhere checksums of release artifacts can be looked up.
pub trait ChecksumSource {
    /// Fetch the digest published in the sidecar at `url`.
    ///
    /// A missing sidecar is reported as [`RemoteError::NotFound`].
    fn fetch_checksum(&self, url: &str) -> Result<Sha256Digest, RemoteError>;
}
