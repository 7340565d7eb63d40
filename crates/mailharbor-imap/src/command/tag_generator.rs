//! Command tag allocation.
//!
//! Tags are session-scoped, monotonically increasing, and never reused.

use std::sync::atomic::{AtomicU32, Ordering};

/// Generates sequential command tags: `A0001`, `A0002`, ...
#[derive(Debug)]
pub struct TagGenerator {
    counter: AtomicU32,
    prefix: char,
}

impl TagGenerator {
    /// Creates a new generator with the given prefix letter.
    #[must_use]
    pub const fn new(prefix: char) -> Self {
        Self {
            counter: AtomicU32::new(1),
            prefix,
        }
    }

    /// Allocates the next tag.
    ///
    /// # Panics
    ///
    /// Panics if the counter would wrap; 4 billion tags in one session
    /// indicates a defect, and reuse would corrupt response routing.
    #[must_use]
    pub fn next(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        assert!(n != u32::MAX, "tag counter overflow");
        format!("{}{n:04}", self.prefix)
    }

    /// Returns how many tags have been allocated.
    #[must_use]
    pub fn allocated(&self) -> u32 {
        self.counter.load(Ordering::Relaxed) - 1
    }
}

impl Default for TagGenerator {
    fn default() -> Self {
        Self::new('A')
    }
}

impl Clone for TagGenerator {
    fn clone(&self) -> Self {
        Self {
            counter: AtomicU32::new(self.counter.load(Ordering::Relaxed)),
            prefix: self.prefix,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_start_at_one() {
        let generator = TagGenerator::default();
        assert_eq!(generator.next(), "A0001");
        assert_eq!(generator.next(), "A0002");
        assert_eq!(generator.allocated(), 2);
    }

    #[test]
    fn custom_prefix() {
        let generator = TagGenerator::new('T');
        assert_eq!(generator.next(), "T0001");
    }

    #[test]
    fn tags_are_never_reused() {
        let generator = TagGenerator::default();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..10_000 {
            assert!(seen.insert(generator.next()), "duplicate tag");
        }
    }

    #[test]
    fn padding_grows_past_four_digits() {
        let generator = TagGenerator::default();
        for _ in 0..9_999 {
            let _ = generator.next();
        }
        assert_eq!(generator.next(), "A10000");
    }

    #[test]
    #[should_panic(expected = "tag counter overflow")]
    fn overflow_panics() {
        let generator = TagGenerator::default();
        generator.counter.store(u32::MAX, Ordering::Relaxed);
        let _ = generator.next();
    }
}
