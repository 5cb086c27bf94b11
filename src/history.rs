use std::collections::VecDeque;

/// Bounded command history with a recall cursor.
///
/// The cursor ranges over `0..=len`, where `len` means "past the last
/// entry" (a fresh prompt). Navigation is clamped and never wraps.
#[derive(Debug, Clone)]
pub struct HistoryNavigator {
    entries: VecDeque<String>,
    max: usize,
    cursor: usize,
}

impl HistoryNavigator {
    /// History holding at most `max` entries. A `max` of 0 is raised to 1,
    /// so the last accepted line can always be recalled.
    pub fn new(max: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max.min(64)),
            max: max.max(1),
            cursor: 0,
        }
    }

    /// Append a line unless it repeats the newest entry. The cursor moves
    /// past the end either way.
    pub fn record(&mut self, line: &str) {
        if self.entries.back().map(String::as_str) != Some(line) {
            self.entries.push_back(line.to_string());
            while self.entries.len() > self.max {
                self.entries.pop_front();
            }
        }
        self.cursor = self.entries.len();
    }

    /// Move the cursor by `direction` (negative is older).
    ///
    /// Returns the text the input buffer should hold, or `None` when the move
    /// has no effect on an empty history.
    pub fn navigate(&mut self, direction: i32) -> Option<&str> {
        let len = self.entries.len() as i64;
        let target = self.cursor as i64 + i64::from(direction);

        if target < 0 {
            if self.entries.is_empty() {
                return None;
            }
            self.cursor = 0;
            return self.entries.front().map(String::as_str);
        }

        if target >= len {
            self.cursor = self.entries.len();
            return Some("");
        }

        self.cursor = target as usize;
        self.entries.get(self.cursor).map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl Default for HistoryNavigator {
    fn default() -> Self {
        Self::new(50)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_consecutive() {
        let mut h = HistoryNavigator::default();
        h.record("ls");
        h.record("ls");
        assert_eq!(h.len(), 1);

        let mut h = HistoryNavigator::default();
        h.record("ls");
        h.record("pwd");
        h.record("ls");
        assert_eq!(h.len(), 3);
    }

    #[test]
    fn test_bound_evicts_oldest() {
        let mut h = HistoryNavigator::new(50);
        for i in 0..51 {
            h.record(&format!("cmd{i}"));
        }
        assert_eq!(h.len(), 50);
        assert_eq!(h.entries().next(), Some("cmd1"));
        assert_eq!(h.entries().last(), Some("cmd50"));
    }

    #[test]
    fn test_zero_max_keeps_latest_entry() {
        let mut h = HistoryNavigator::new(0);
        h.record("ls");
        h.record("pwd");
        assert_eq!(h.len(), 1);
        assert_eq!(h.navigate(-1), Some("pwd"));
    }

    #[test]
    fn test_navigate_up_and_down() {
        let mut h = HistoryNavigator::default();
        h.record("a");
        h.record("b");
        h.record("c");

        assert_eq!(h.navigate(-1), Some("c"));
        assert_eq!(h.navigate(-1), Some("b"));
        assert_eq!(h.navigate(-1), Some("a"));
        // Clamped at the oldest entry.
        assert_eq!(h.navigate(-1), Some("a"));
        assert_eq!(h.cursor(), 0);

        assert_eq!(h.navigate(1), Some("b"));
        assert_eq!(h.navigate(1), Some("c"));
        assert_eq!(h.navigate(1), Some(""));
        assert_eq!(h.cursor(), 3);
        assert_eq!(h.navigate(1), Some(""));
        assert_eq!(h.cursor(), 3);
    }

    #[test]
    fn test_navigate_empty() {
        let mut h = HistoryNavigator::default();
        assert_eq!(h.navigate(-1), None);
        assert_eq!(h.navigate(1), Some(""));
        assert_eq!(h.cursor(), 0);
    }

    #[test]
    fn test_duplicate_record_resets_cursor() {
        let mut h = HistoryNavigator::default();
        h.record("ls");
        h.record("pwd");
        h.navigate(-1);
        h.navigate(-1);
        assert_eq!(h.cursor(), 0);

        h.record("pwd");
        assert_eq!(h.len(), 2);
        assert_eq!(h.cursor(), 2);
    }
}
