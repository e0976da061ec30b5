//! Narration produced while a battle runs.
//!
//! The core writes plain text. [`EntryKind::Action`] entries are the ones a
//! narration oracle may embellish; the rest are shown as written.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntryKind {
    BattleStart,
    Action,
    /// Short system messages: defend, pass, invalid target, not enough MP.
    Notice,
    CannotAct,
    StatusTick,
    Result,
    LevelUp,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogEntry {
    pub kind: EntryKind,
    pub title: String,
    pub text: String,
}

impl LogEntry {
    pub fn new(kind: EntryKind, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            text: text.into(),
        }
    }

    pub fn action(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(EntryKind::Action, title, text)
    }

    pub fn notice(title: impl Into<String>) -> Self {
        Self::new(EntryKind::Notice, title, "")
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BattleLog {
    entries: Vec<LogEntry>,
    cursor: usize,
}

impl BattleLog {
    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Entries added since the previous call.
    pub fn take_new(&mut self) -> Vec<LogEntry> {
        let fresh = self.entries[self.cursor..].to_vec();
        self.cursor = self.entries.len();
        fresh
    }

    /// True if any entry's text or title contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.text.contains(needle) || e.title.contains(needle))
    }
}
