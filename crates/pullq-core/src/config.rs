//! Store tuning knobs that downstream crates can serialize/deserialize.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Initial capacity of the scalar fast-path bucket map.
    pub scalar_capacity: usize,

    /// Initial capacity of the structured (fingerprinted) bucket map.
    pub structured_capacity: usize,

    /// Hard cap on the number of parts fed into a structural fingerprint.
    /// Keys whose distinguishing fields fall past this cap share a bucket and
    /// are told apart by the linear-scan fallback.
    pub max_fingerprint_parts: usize,

    /// Per-part character cap for fingerprint renderings.
    pub max_part_len: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            scalar_capacity: 16,
            structured_capacity: 16,
            max_fingerprint_parts: 8,
            max_part_len: 24,
        }
    }
}
