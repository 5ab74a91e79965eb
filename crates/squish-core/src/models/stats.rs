use serde::{Deserialize, Serialize};

/// Usage counters maintained by the remote service. Matches `/api/stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub views: u64,
    pub pdfs: u64,
    pub images: u64,
}
