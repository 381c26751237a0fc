//! Cache Entry Module
//!
//! Defines a cached value together with the moment it was stored.

use std::time::Duration;

// == Cache Entry ==
/// A cached value and its storage timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Storage timestamp (Unix milliseconds)
    pub stored_at: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    pub fn new(value: V, stored_at: u64) -> Self {
        Self { value, stored_at }
    }

    // == Age ==
    /// Milliseconds elapsed since the entry was stored.
    ///
    /// A clock that moved backwards yields an age of zero.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.stored_at)
    }

    // == Is Fresh ==
    /// Checks whether the entry may still be served under `max_age`.
    ///
    /// Boundary condition: an entry exactly `max_age` old is still served.
    /// A `max_age` of zero never serves anything and `Duration::MAX` serves
    /// forever.
    pub fn is_fresh(&self, now_ms: u64, max_age: Duration) -> bool {
        !max_age.is_zero() && u128::from(self.age_ms(now_ms)) <= max_age.as_millis()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_age() {
        let entry = CacheEntry::new("series", 1_000);
        assert_eq!(entry.age_ms(1_250), 250);
    }

    #[test]
    fn test_age_never_negative() {
        let entry = CacheEntry::new("series", 5_000);
        assert_eq!(entry.age_ms(1_000), 0);
    }

    #[test]
    fn test_fresh_within_max_age() {
        let entry = CacheEntry::new("series", 0);
        assert!(entry.is_fresh(899_999, Duration::from_millis(900_000)));
        assert!(!entry.is_fresh(900_001, Duration::from_millis(900_000)));
    }

    #[test]
    fn test_age_equal_to_max_age_is_fresh() {
        let entry = CacheEntry::new("series", 0);
        assert!(entry.is_fresh(900_000, Duration::from_millis(900_000)));
        assert!(entry.is_fresh(1, Duration::from_millis(1)));
    }

    #[test]
    fn test_zero_max_age_is_never_fresh() {
        let entry = CacheEntry::new("series", 10);
        assert!(!entry.is_fresh(10, Duration::ZERO));
    }

    #[test]
    fn test_unbounded_max_age_is_always_fresh() {
        let entry = CacheEntry::new("series", 0);
        assert!(entry.is_fresh(u64::MAX, Duration::MAX));
    }
}
