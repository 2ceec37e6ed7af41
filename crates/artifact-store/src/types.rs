//! Store types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One entry in the artifact store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub key: String,
    /// Backing file on local disk; owned exclusively by this record.
    pub path: PathBuf,
    /// Filename presented to the downstream consumer on retrieval.
    pub display_name: String,
    /// Fixed at insertion, never updated.
    pub created_at: DateTime<Utc>,
}

/// Statistics about the store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub evicted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_stats_default() {
        let stats = StoreStats::default();
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.evicted, 0);
    }

    #[test]
    fn test_artifact_record_serialization() {
        let record = ArtifactRecord {
            key: "report.zip".to_string(),
            path: PathBuf::from("/artifacts/report.zip"),
            display_name: "report.zip".to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("report.zip"));

        let deserialized: ArtifactRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.key, record.key);
        assert_eq!(deserialized.path, record.path);
        assert_eq!(deserialized.display_name, record.display_name);
    }
}
