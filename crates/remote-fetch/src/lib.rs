//! Streaming download client
//!
//! Fetches a remote resource over HTTP with a long timeout and exposes the
//! body as bounded-size chunks, a chunked write to disk, or a full read
//! into memory.

mod error;
mod fetcher;

pub use error::{FetchError, Result};
pub use fetcher::{file_name_from_url, RemoteFetcher, RemoteFile, DEFAULT_TIMEOUT_SECS};
