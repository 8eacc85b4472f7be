//! Bounded response history for stall detection
//!
//! The remote model can oscillate or loop indefinitely on ambiguous
//! scenes. The history holds the last few normalized classification keys;
//! when a non-terminal key matches all of them, the caller promotes the
//! result to `ready` and the loop terminates.

use std::collections::VecDeque;

/// Number of previous responses considered for stall detection
pub const HISTORY_WINDOW: usize = 3;

/// Sliding window of normalized classification keys
#[derive(Debug, Default)]
pub struct ResponseHistory {
    entries: VecDeque<String>,
}

impl ResponseHistory {
    /// Create an empty history
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a classification and report whether it stalled
    ///
    /// Returns true when `key` is non-terminal and identical to all
    /// `HISTORY_WINDOW` previous entries — i.e. the fourth identical
    /// classification in a row triggers the override. The key is recorded
    /// either way.
    pub fn check_stall(&mut self, key: &str, terminal: bool) -> bool {
        let stalled = !terminal
            && self.entries.len() == HISTORY_WINDOW
            && self.entries.iter().all(|e| e == key);

        if self.entries.len() == HISTORY_WINDOW {
            self.entries.pop_front();
        }
        self.entries.push_back(key.to_string());

        stalled
    }

    /// Clear all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of recorded entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the history is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_stall_before_window_fills() {
        let mut history = ResponseHistory::new();

        assert!(!history.check_stall("move up", false));
        assert!(!history.check_stall("move up", false));
        assert!(!history.check_stall("move up", false));
        assert_eq!(history.len(), HISTORY_WINDOW);
    }

    #[test]
    fn test_stall_on_fourth_identical() {
        let mut history = ResponseHistory::new();

        for _ in 0..3 {
            history.check_stall("move up", false);
        }
        assert!(history.check_stall("move up", false));
    }

    #[test]
    fn test_terminal_key_never_stalls() {
        let mut history = ResponseHistory::new();

        for _ in 0..3 {
            history.check_stall("ready", true);
        }
        assert!(!history.check_stall("ready", true));
    }

    #[test]
    fn test_window_is_bounded() {
        let mut history = ResponseHistory::new();

        for i in 0..10 {
            history.check_stall(&format!("key-{i}"), false);
        }
        assert_eq!(history.len(), HISTORY_WINDOW);
    }

    #[test]
    fn test_interleaved_keys_reset_the_run() {
        let mut history = ResponseHistory::new();

        history.check_stall("move up", false);
        history.check_stall("move left", false);
        history.check_stall("move up", false);
        assert!(!history.check_stall("move up", false));
    }

    #[test]
    fn test_clear() {
        let mut history = ResponseHistory::new();

        for _ in 0..3 {
            history.check_stall("move up", false);
        }
        history.clear();
        assert!(history.is_empty());
        assert!(!history.check_stall("move up", false));
    }
}
