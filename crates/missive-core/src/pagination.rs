//! Pagination window normalization.
//!
//! Requested limits and offsets come straight from query strings and may be
//! zero, negative, or excessive. [`PaginationNormalizer::normalize`] always
//! produces a usable [`PageWindow`]; it never fails.

use missive_types::config::PaginationConfig;

/// A normalized `(limit, offset)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: u32,
    pub offset: u32,
}

impl PageWindow {
    /// End of this window (exclusive), widened to avoid overflow.
    fn end(&self) -> u64 {
        u64::from(self.offset) + u64::from(self.limit)
    }

    /// True when rows remain after this window.
    pub fn has_next(&self, total: u64) -> bool {
        self.end() < total
    }

    pub fn has_prev(&self) -> bool {
        self.offset > 0
    }

    /// Offset of the following window, if any rows remain.
    pub fn next_offset(&self, total: u64) -> Option<u32> {
        if self.has_next(total) {
            u32::try_from(self.end()).ok()
        } else {
            None
        }
    }
}

/// Clamps and defaults pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationNormalizer {
    default_limit: u32,
    max_limit: u32,
}

impl PaginationNormalizer {
    /// A default above the maximum is lowered to the maximum.
    pub fn new(default_limit: u32, max_limit: u32) -> Self {
        let max_limit = max_limit.max(1);
        Self {
            default_limit: default_limit.clamp(1, max_limit),
            max_limit,
        }
    }

    pub fn default_limit(&self) -> u32 {
        self.default_limit
    }

    /// `limit < 1` becomes the default, `limit > max` becomes the max, and
    /// a negative offset becomes zero.
    pub fn normalize(&self, limit: i64, offset: i64) -> PageWindow {
        let limit = if limit < 1 {
            self.default_limit
        } else if limit > i64::from(self.max_limit) {
            self.max_limit
        } else {
            limit as u32
        };

        let offset = offset.clamp(0, i64::from(u32::MAX)) as u32;

        PageWindow { limit, offset }
    }
}

impl Default for PaginationNormalizer {
    fn default() -> Self {
        PaginationConfig::default().into()
    }
}

impl From<PaginationConfig> for PaginationNormalizer {
    fn from(config: PaginationConfig) -> Self {
        Self::new(config.default_limit, config.max_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_limit_uses_default() {
        let window = PaginationNormalizer::default().normalize(-5, 0);
        assert_eq!(window.limit, 10);
    }

    #[test]
    fn zero_limit_uses_default() {
        assert_eq!(PaginationNormalizer::default().normalize(0, 0).limit, 10);
    }

    #[test]
    fn excessive_limit_is_clamped() {
        assert_eq!(PaginationNormalizer::default().normalize(1000, 0).limit, 100);
    }

    #[test]
    fn negative_offset_becomes_zero() {
        let window = PaginationNormalizer::default().normalize(10, -10);
        assert_eq!(window, PageWindow { limit: 10, offset: 0 });
    }

    #[test]
    fn valid_values_pass_through() {
        let window = PaginationNormalizer::default().normalize(25, 40);
        assert_eq!(window, PageWindow { limit: 25, offset: 40 });
    }

    #[test]
    fn custom_max_limit() {
        let normalizer = PaginationNormalizer::new(10, 50);
        assert_eq!(normalizer.normalize(75, 0).limit, 50);
        assert_eq!(normalizer.normalize(50, 0).limit, 50);
    }

    #[test]
    fn default_above_max_is_lowered() {
        let normalizer = PaginationNormalizer::new(20, 5);
        assert_eq!(normalizer.default_limit(), 5);
        assert_eq!(normalizer.normalize(0, 0).limit, 5);
    }

    #[test]
    fn window_navigation() {
        let first = PageWindow { limit: 5, offset: 0 };
        assert!(first.has_next(15));
        assert!(!first.has_prev());
        assert_eq!(first.next_offset(15), Some(5));

        let last = PageWindow { limit: 5, offset: 10 };
        assert!(!last.has_next(15));
        assert!(last.has_prev());
        assert_eq!(last.next_offset(15), None);
    }

    #[test]
    fn has_next_is_exact_at_boundary() {
        let window = PageWindow { limit: 10, offset: 0 };
        assert!(!window.has_next(10));
        assert!(window.has_next(11));
    }
}
