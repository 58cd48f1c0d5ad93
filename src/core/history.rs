//! # Command History
//!
//! Previously submitted command lines, oldest first, with shell-style
//! Up/Down recall.
//!
//! ```text
//! entries:  [ "pwd", "ls", "cd /tmp" ]
//! index:       0      1       2        None = editing the live line
//! ```
//!
//! When browsing starts, the live line is snapshotted into `saved_live` so
//! stepping past the newest entry gives it back exactly.

/// Default cap on stored entries (oldest are dropped first).
pub const DEFAULT_HISTORY_LIMIT: usize = 500;

#[derive(Debug, Clone)]
pub struct HistoryStore {
    entries: Vec<String>,
    /// Entry being shown, `None` while editing the live line
    index: Option<usize>,
    saved_live: String,
    limit: usize,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            index: None,
            saved_live: String::new(),
            limit: limit.max(1),
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry currently being browsed, `None` when editing the live line.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn is_browsing(&self) -> bool {
        self.index.is_some()
    }

    /// Records a submitted command. Empty lines and repeats of the newest
    /// entry are ignored.
    pub fn push(&mut self, cmd: &str) {
        let cmd = cmd.trim();
        if cmd.is_empty() || self.entries.last().is_some_and(|last| last == cmd) {
            return;
        }
        self.entries.push(cmd.to_string());
        if self.entries.len() > self.limit {
            let excess = self.entries.len() - self.limit;
            self.entries.drain(..excess);
        }
    }

    /// Steps to the next older entry. `current_live` is remembered when
    /// browsing starts. Returns `None` when there is no history at all.
    pub fn recall_previous(&mut self, current_live: &str) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        let index = match self.index {
            None => {
                self.saved_live = current_live.to_string();
                self.entries.len() - 1
            }
            Some(i) => i.saturating_sub(1),
        };
        self.index = Some(index);
        Some(&self.entries[index])
    }

    /// Steps to the next newer entry, or back to the saved live line after
    /// the newest one. Returns `None` when not browsing.
    pub fn recall_next(&mut self) -> Option<String> {
        let current = self.index?;
        let next = current + 1;
        if next >= self.entries.len() {
            self.index = None;
            return Some(std::mem::take(&mut self.saved_live));
        }
        self.index = Some(next);
        Some(self.entries[next].clone())
    }

    /// Leaves browsing mode (called on submit).
    pub fn reset_browsing(&mut self) {
        self.index = None;
        self.saved_live.clear();
    }
}
