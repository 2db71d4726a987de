//! # Query Extractors
//!
//! Pagination parameters shared by every list endpoint. Axum's `Query`
//! does the extraction; this type supplies defaults and clamps the limit
//! so a caller cannot request an unbounded page.

use serde::Deserialize;
use utoipa::IntoParams;

/// Default page size when the caller does not specify one.
const DEFAULT_LIMIT: i64 = 100;
/// Hard ceiling for a single page.
const MAX_LIMIT: i64 = 1000;

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

/// `skip`/`limit` pagination query parameters.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
pub struct Pagination {
    /// Rows to skip from the start of the result set.
    #[serde(default)]
    pub skip: i64,
    /// Maximum rows to return (clamped to 1..=1000).
    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    /// Clamped `(skip, limit)` pair safe to hand to the store.
    pub fn bounds(&self) -> (i64, i64) {
        (self.skip.max(0), self.limit.clamp(1, MAX_LIMIT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(Pagination::default().bounds(), (0, 100));
    }

    #[test]
    fn test_limit_is_clamped_both_ways() {
        let p = Pagination { skip: 0, limit: 100_000 };
        assert_eq!(p.bounds(), (0, 1000));
        let p = Pagination { skip: 0, limit: 0 };
        assert_eq!(p.bounds(), (0, 1));
    }

    #[test]
    fn test_negative_skip_is_floored() {
        let p = Pagination { skip: -5, limit: 10 };
        assert_eq!(p.bounds(), (0, 10));
    }
}
