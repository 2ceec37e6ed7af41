//! Keyed ephemeral artifact store
//!
//! Maps a key to a materialized artifact on disk (backing file, display
//! name, creation time), serves it on demand, and evicts entries once they
//! outlive a fixed TTL — lazily on access, and in bulk via an explicit
//! [`ArtifactStore::sweep`] pass.

mod clock;
mod error;
mod key;
mod store;
mod types;

pub use clock::{Clock, SystemClock};
pub use error::{Result, StoreError};
pub use key::{sanitize_file_name, KeyPolicy};
pub use store::{ArtifactStore, DEFAULT_TTL_SECS};
pub use types::{ArtifactRecord, StoreStats};
