//! Credential rotation timing. `spec.md` §9 Open Question 3: the
//! pre-rotation window is configurable; the fixed 1-minute retry backoff
//! after a failed rotation (`crate::rotation::ROTATION_RETRY_BACKOFF`) is
//! not — it is a crate-wide constant, not surfaced here.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    pub pre_rotation_window_seconds: u64,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self { pre_rotation_window_seconds: 300 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_is_five_minutes() {
        assert_eq!(RotationConfig::default().pre_rotation_window_seconds, 300);
    }
}
