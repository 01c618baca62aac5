//! In-memory activity feed shown by the monitor panel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActivityLevel {
    Info,
    Warn,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityEntry {
    /// Position in the log, counting from 1; survives eviction of older entries
    pub seq: u64,
    pub at: DateTime<Utc>,
    pub level: ActivityLevel,
    pub message: String,
}

#[derive(Debug, Default)]
struct LogState {
    entries: VecDeque<ActivityEntry>,
    recorded: u64,
}

/// Bounded, cloneable log; the oldest entries fall off first.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    state: Arc<Mutex<LogState>>,
    capacity: usize,
}

impl ActivityLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            state: Arc::new(Mutex::new(LogState {
                entries: VecDeque::with_capacity(capacity),
                recorded: 0,
            })),
            capacity,
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(ActivityLevel::Info, message.into());
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.push(ActivityLevel::Warn, message.into());
    }

    fn push(&self, level: ActivityLevel, message: String) {
        let mut state = self.lock();
        if state.entries.len() == self.capacity {
            state.entries.pop_front();
        }
        state.recorded += 1;
        let seq = state.recorded;
        state.entries.push_back(ActivityEntry {
            seq,
            at: Utc::now(),
            level,
            message,
        });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LogState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn entries(&self) -> Vec<ActivityEntry> {
        self.lock().entries.iter().cloned().collect()
    }

    /// Entries with a sequence number above `seq`.
    pub fn entries_after(&self, seq: u64) -> Vec<ActivityEntry> {
        self.lock()
            .entries
            .iter()
            .filter(|entry| entry.seq > seq)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new(200)
    }
}

/// Read position in an `ActivityLog` for feeds that print each entry once.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivityCursor {
    last_seq: u64,
}

impl ActivityCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries recorded since the previous call, oldest first.
    pub fn drain(&mut self, log: &ActivityLog) -> Vec<ActivityEntry> {
        let fresh = log.entries_after(self.last_seq);
        if let Some(last) = fresh.last() {
            self.last_seq = last.seq;
        }
        fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_drops_oldest() {
        let log = ActivityLog::new(2);
        log.info("initializing AI modules");
        log.info("wa_gateway connected");
        log.warn("status poll failed");

        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "wa_gateway connected");
        assert_eq!(entries[1].level, ActivityLevel::Warn);
    }

    #[test]
    fn test_clones_share_entries() {
        let log = ActivityLog::default();
        let handle = log.clone();
        handle.info("bot is ready and listening");

        assert_eq!(log.len(), 1);
        assert!(!log.is_empty());
    }

    #[test]
    fn test_cursor_yields_each_entry_once() {
        let log = ActivityLog::default();
        let mut cursor = ActivityCursor::new();
        assert!(cursor.drain(&log).is_empty());

        log.info("initializing AI modules...");
        log.warn("status poll failed");
        let first: Vec<String> = cursor.drain(&log).into_iter().map(|e| e.message).collect();
        assert_eq!(first, vec!["initializing AI modules...", "status poll failed"]);
        assert!(cursor.drain(&log).is_empty());

        log.info("session disconnected -> open");
        let second = cursor.drain(&log);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].seq, 3);
    }

    #[test]
    fn test_cursor_skips_evicted_entries() {
        let log = ActivityLog::new(2);
        let mut cursor = ActivityCursor::new();
        for i in 0..5 {
            log.info(format!("event {}", i));
        }

        let seen: Vec<u64> = cursor.drain(&log).iter().map(|e| e.seq).collect();
        assert_eq!(seen, vec![4, 5]);
    }
}
