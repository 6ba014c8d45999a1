//! Retention sweep configuration.

use serde::{Deserialize, Serialize};

/// Settings for the periodic version retention sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Whether the in-process scheduler runs the sweep.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Number of whole days a version is kept before it becomes sweepable.
    #[serde(default = "default_lifetime_days")]
    pub lifetime_days: u32,
    /// Cron expression for the sweep schedule (seconds-resolution, UTC).
    #[serde(default = "default_schedule")]
    pub schedule: String,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            lifetime_days: default_lifetime_days(),
            schedule: default_schedule(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_lifetime_days() -> u32 {
    30
}

/// Daily at 4 AM.
fn default_schedule() -> String {
    "0 0 4 * * *".to_string()
}
