//! Result-size limits for list endpoints.

use serde::{Deserialize, Serialize};

/// Upper bound on any single list response.
pub const MAX_LIMIT: u64 = 200;

/// A bounded number of records to return, always in `1..=max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Limit(u64);

impl Limit {
    /// Clamps a caller-supplied limit into `1..=max`, using `default` when absent.
    #[must_use]
    pub fn clamped(requested: Option<u64>, default: u64, max: u64) -> Self {
        let max = max.max(1);
        Self(requested.unwrap_or(default).clamp(1, max))
    }

    /// The service-wide cap.
    #[must_use]
    pub const fn max() -> Self {
        Self(MAX_LIMIT)
    }

    /// Returns the limit for database queries.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns the limit as a `usize` for in-memory slicing.
    #[must_use]
    pub fn as_usize(self) -> usize {
        usize::try_from(self.0).unwrap_or(usize::MAX)
    }
}
