// Copyright (c) 2025 Twistlock Contributors.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # Transition History
//!
//! An append-only audit log of lifecycle transitions. Entries are recorded
//! in the order they happen and read back newest-first; nothing in the
//! public API removes or rewrites an entry.

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use twistlock_model::{ContainerId, StateId};

/// One recorded transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    container: ContainerId,
    from: Option<StateId>,
    to: StateId,
    at: DateTime<Utc>,
    reason: Option<String>,
    changed_by: String,
}

impl HistoryEntry {
    pub(crate) fn new(
        container: ContainerId,
        from: Option<StateId>,
        to: StateId,
        at: DateTime<Utc>,
        reason: Option<String>,
        changed_by: impl Into<String>,
    ) -> Self {
        HistoryEntry {
            container,
            from,
            to,
            at,
            reason,
            changed_by: changed_by.into(),
        }
    }

    #[inline]
    pub fn container(&self) -> ContainerId {
        self.container
    }

    /// The state the container left, or `None` for the first recorded
    /// transition of a container that had no state yet.
    #[inline]
    pub fn from(&self) -> Option<StateId> {
        self.from
    }

    #[inline]
    pub fn to(&self) -> StateId {
        self.to
    }

    #[inline]
    pub fn at(&self) -> DateTime<Utc> {
        self.at
    }

    #[inline]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// The actor that caused the transition; cycle resets are recorded
    /// under the engine's own actor name.
    #[inline]
    pub fn changed_by(&self) -> &str {
        &self.changed_by
    }
}

/// Per-container transition log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryLog {
    entries: FxHashMap<ContainerId, Vec<HistoryEntry>>,
    total: usize,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn append(&mut self, entry: HistoryEntry) {
        self.entries.entry(entry.container()).or_default().push(entry);
        self.total += 1;
    }

    /// A container's transitions, newest first.
    pub fn for_container(
        &self,
        id: &ContainerId,
    ) -> impl Iterator<Item = &HistoryEntry> + '_ {
        self.entries
            .get(id)
            .map(|entries| entries.iter())
            .unwrap_or_default()
            .rev()
    }

    /// Total number of recorded transitions across all containers.
    #[inline]
    pub fn len(&self) -> usize {
        self.total
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn cid(s: &str) -> ContainerId {
        s.parse().unwrap()
    }

    fn entry(seconds: i64, to: u32) -> HistoryEntry {
        HistoryEntry::new(
            cid("CSQU3054383"),
            Some(StateId::new(1)),
            StateId::new(to),
            Utc.timestamp_opt(seconds, 0).unwrap(),
            None,
            "operator",
        )
    }

    #[test]
    fn test_reads_are_newest_first() {
        let mut log = HistoryLog::new();
        log.append(entry(100, 2));
        log.append(entry(200, 3));
        log.append(entry(300, 4));

        let targets: Vec<_> = log
            .for_container(&cid("CSQU3054383"))
            .map(|e| e.to().get())
            .collect();
        assert_eq!(targets, vec![4, 3, 2]);
    }

    #[test]
    fn test_unknown_container_yields_nothing() {
        let log = HistoryLog::new();
        assert_eq!(log.for_container(&cid("MSKU1234565")).count(), 0);
        assert!(log.is_empty());
    }

    #[test]
    fn test_len_counts_across_containers() {
        let mut log = HistoryLog::new();
        log.append(entry(100, 2));
        log.append(HistoryEntry::new(
            cid("MSKU1234565"),
            None,
            StateId::new(1),
            Utc.timestamp_opt(150, 0).unwrap(),
            Some("registered".to_string()),
            "operator",
        ));
        assert_eq!(log.len(), 2);
        assert_eq!(log.for_container(&cid("CSQU3054383")).count(), 1);
        assert_eq!(log.for_container(&cid("MSKU1234565")).count(), 1);
    }
}
