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

//! # Transition Engine
//!
//! Applies lifecycle transitions to container records and records every hop
//! in the [`HistoryLog`](crate::HistoryLog).
//!
//! Transitions are **permissive**: any catalog state may move to any other
//! catalog state, including itself. The one piece of hardwired behavior is
//! the cycle reset: entering a cycle-completing state increments the
//! container's cycle count, appends a second system-actor history row, and
//! lands the container in the catalog's initial state. Both rows of a cycle
//! reset are written in the same call, so readers never observe a container
//! parked in a cycle-completing state.

use crate::catalog::StateCatalog;
use crate::history::{HistoryEntry, HistoryLog};
use chrono::Utc;
use std::fmt;
use tracing::{debug, info};
use twistlock_model::{ContainerId, ContainerSet, StateId};

/// Actor name recorded on the automatic cycle-reset history row.
pub const SYSTEM_ACTOR: &str = "SYSTEM";

/// A transition request that could not be applied. The container and the
/// history are untouched when one of these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleError {
    /// The container id is not in the supplied record set.
    UnknownContainer(ContainerId),
    /// The target state is not in the catalog.
    UnknownState(StateId),
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleError::UnknownContainer(id) => {
                write!(f, "container {} is not registered", id)
            }
            LifecycleError::UnknownState(id) => {
                write!(f, "state {} is not in the catalog", id)
            }
        }
    }
}

impl std::error::Error for LifecycleError {}

/// What a successful [`LifecycleEngine::apply_transition`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutcome {
    final_state: StateId,
    cycle_count: u32,
    cycle_completed: bool,
    entries: Vec<HistoryEntry>,
}

impl TransitionOutcome {
    /// The state the container ended up in. After a cycle reset this is the
    /// catalog's initial state, not the requested target.
    #[inline]
    pub fn final_state(&self) -> StateId {
        self.final_state
    }

    #[inline]
    pub fn cycle_count(&self) -> u32 {
        self.cycle_count
    }

    #[inline]
    pub fn cycle_completed(&self) -> bool {
        self.cycle_completed
    }

    /// The history rows this transition appended, oldest first. One row for
    /// a plain transition, two for a cycle reset.
    #[inline]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }
}

/// The cyclic lifecycle state machine.
///
/// Owns the catalog and the audit history; container records live in the
/// caller-supplied [`ContainerSet`] and are mutated in place.
///
/// # Examples
///
/// ```rust
/// use twistlock_lifecycle::{LifecycleEngine, LifecycleState, StateCatalogBuilder};
/// use twistlock_model::{Container, ContainerSet, ContainerType, StateId};
///
/// let ordered = StateId::new(1);
/// let delivered = StateId::new(9);
/// let catalog = StateCatalogBuilder::new()
///     .state(LifecycleState::new(ordered, "ORDERED"))
///     .state(LifecycleState::new(delivered, "DELIVERED"))
///     .initial(ordered)
///     .cycle_completing(delivered)
///     .build()
///     .unwrap();
///
/// let id = "CSQU3054383".parse().unwrap();
/// let mut containers = ContainerSet::new();
/// containers.insert(Container::new(id, ContainerType::parse_label("40 DC"), ordered));
///
/// let mut engine = LifecycleEngine::new(catalog);
/// let outcome = engine
///     .apply_transition(&mut containers, &id, delivered, None, "operator")
///     .unwrap();
///
/// assert!(outcome.cycle_completed());
/// assert_eq!(outcome.final_state(), ordered);
/// assert_eq!(containers.get(&id).unwrap().cycle_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct LifecycleEngine {
    catalog: StateCatalog,
    history: HistoryLog,
}

impl LifecycleEngine {
    pub fn new(catalog: StateCatalog) -> Self {
        LifecycleEngine {
            catalog,
            history: HistoryLog::new(),
        }
    }

    #[inline]
    pub fn catalog(&self) -> &StateCatalog {
        &self.catalog
    }

    /// A container's recorded transitions, newest first.
    pub fn history(&self, id: &ContainerId) -> impl Iterator<Item = &HistoryEntry> + '_ {
        self.history.for_container(id)
    }

    #[inline]
    pub fn history_log(&self) -> &HistoryLog {
        &self.history
    }

    /// Moves a container to `to`, recording who asked and why.
    ///
    /// Validation happens before any mutation; on error the record set and
    /// the history are unchanged. Entering a cycle-completing state triggers
    /// the automatic reset described in the module docs.
    pub fn apply_transition(
        &mut self,
        containers: &mut ContainerSet,
        id: &ContainerId,
        to: StateId,
        reason: Option<&str>,
        actor: &str,
    ) -> Result<TransitionOutcome, LifecycleError> {
        if !self.catalog.contains(to) {
            return Err(LifecycleError::UnknownState(to));
        }
        let container = containers
            .get_mut(id)
            .ok_or(LifecycleError::UnknownContainer(*id))?;

        let from = container.state();
        let now = Utc::now();
        let mut entries = vec![HistoryEntry::new(
            *id,
            Some(from),
            to,
            now,
            reason.map(str::to_owned),
            actor,
        )];

        let (final_state, cycle_completed) = if self.catalog.is_cycle_completing(to) {
            let completed = container.cycle_count() + 1;
            container.set_cycle_count(completed);
            let initial = self.catalog.initial();
            entries.push(HistoryEntry::new(
                *id,
                Some(to),
                initial,
                now,
                Some(format!("cycle {} completed", completed)),
                SYSTEM_ACTOR,
            ));
            info!(
                container = %id,
                cycle = completed,
                "cycle completed, container reset to initial state"
            );
            (initial, true)
        } else {
            debug!(container = %id, from = %from, to = %to, "lifecycle transition");
            (to, false)
        };

        container.set_state(final_state);
        let cycle_count = container.cycle_count();
        for entry in &entries {
            self.history.append(entry.clone());
        }

        Ok(TransitionOutcome {
            final_state,
            cycle_count,
            cycle_completed,
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{LifecycleState, StateCatalogBuilder};
    use twistlock_model::{Container, ContainerType};

    const ORDERED: StateId = StateId::new(1);
    const IN_TRANSIT: StateId = StateId::new(5);
    const AT_YARD: StateId = StateId::new(7);
    const DELIVERED: StateId = StateId::new(9);
    const DELIVERED_DIRECT: StateId = StateId::new(11);

    fn catalog() -> StateCatalog {
        StateCatalogBuilder::new()
            .state(LifecycleState::new(ORDERED, "ORDERED"))
            .state(LifecycleState::new(IN_TRANSIT, "IN_TRANSIT"))
            .state(LifecycleState::new(AT_YARD, "AT_YARD"))
            .state(LifecycleState::new(DELIVERED, "DELIVERED"))
            .state(LifecycleState::new(DELIVERED_DIRECT, "DELIVERED_DIRECT"))
            .initial(ORDERED)
            .cycle_completing(DELIVERED)
            .cycle_completing(DELIVERED_DIRECT)
            .build()
            .unwrap()
    }

    fn cid() -> ContainerId {
        "CSQU3054383".parse().unwrap()
    }

    fn registered(state: StateId, cycles: u32) -> ContainerSet {
        let mut c = Container::new(cid(), ContainerType::parse_label("40 DC"), state);
        c.set_cycle_count(cycles);
        let mut set = ContainerSet::new();
        set.insert(c);
        set
    }

    #[test]
    fn test_plain_transition_updates_record_and_history() {
        let mut engine = LifecycleEngine::new(catalog());
        let mut containers = registered(ORDERED, 0);

        let outcome = engine
            .apply_transition(&mut containers, &cid(), IN_TRANSIT, Some("departed"), "alice")
            .unwrap();

        assert_eq!(outcome.final_state(), IN_TRANSIT);
        assert!(!outcome.cycle_completed());
        assert_eq!(outcome.entries().len(), 1);
        assert_eq!(outcome.entries()[0].from(), Some(ORDERED));
        assert_eq!(outcome.entries()[0].reason(), Some("departed"));
        assert_eq!(outcome.entries()[0].changed_by(), "alice");
        assert_eq!(containers.get(&cid()).unwrap().state(), IN_TRANSIT);
        assert_eq!(containers.get(&cid()).unwrap().cycle_count(), 0);
    }

    #[test]
    fn test_delivery_completes_cycle_and_resets() {
        // A container on its third trip reaches DELIVERED.
        let mut engine = LifecycleEngine::new(catalog());
        let mut containers = registered(AT_YARD, 2);

        let outcome = engine
            .apply_transition(&mut containers, &cid(), DELIVERED, None, "bob")
            .unwrap();

        assert!(outcome.cycle_completed());
        assert_eq!(outcome.final_state(), ORDERED);
        assert_eq!(outcome.cycle_count(), 3);

        let record = containers.get(&cid()).unwrap();
        assert_eq!(record.state(), ORDERED);
        assert_eq!(record.cycle_count(), 3);

        // Two rows, the second authored by the system actor.
        assert_eq!(outcome.entries().len(), 2);
        let manual = &outcome.entries()[0];
        assert_eq!(manual.from(), Some(AT_YARD));
        assert_eq!(manual.to(), DELIVERED);
        assert_eq!(manual.changed_by(), "bob");
        let reset = &outcome.entries()[1];
        assert_eq!(reset.from(), Some(DELIVERED));
        assert_eq!(reset.to(), ORDERED);
        assert_eq!(reset.changed_by(), SYSTEM_ACTOR);
        assert_eq!(reset.reason(), Some("cycle 3 completed"));
    }

    #[test]
    fn test_history_reads_newest_first_across_cycle() {
        let mut engine = LifecycleEngine::new(catalog());
        let mut containers = registered(ORDERED, 0);

        engine
            .apply_transition(&mut containers, &cid(), IN_TRANSIT, None, "op")
            .unwrap();
        engine
            .apply_transition(&mut containers, &cid(), DELIVERED, None, "op")
            .unwrap();

        let targets: Vec<_> = engine.history(&cid()).map(|e| e.to()).collect();
        assert_eq!(targets, vec![ORDERED, DELIVERED, IN_TRANSIT]);
        assert_eq!(engine.history_log().len(), 3);
    }

    #[test]
    fn test_any_known_state_is_reachable() {
        // No transition graph: AT_YARD back to ORDERED is fine, as is a
        // self-transition.
        let mut engine = LifecycleEngine::new(catalog());
        let mut containers = registered(AT_YARD, 0);

        engine
            .apply_transition(&mut containers, &cid(), ORDERED, None, "op")
            .unwrap();
        assert_eq!(containers.get(&cid()).unwrap().state(), ORDERED);

        let outcome = engine
            .apply_transition(&mut containers, &cid(), ORDERED, None, "op")
            .unwrap();
        assert_eq!(outcome.final_state(), ORDERED);
        assert!(!outcome.cycle_completed());
    }

    #[test]
    fn test_second_cycle_completing_state_also_resets() {
        let mut engine = LifecycleEngine::new(catalog());
        let mut containers = registered(IN_TRANSIT, 0);

        let outcome = engine
            .apply_transition(&mut containers, &cid(), DELIVERED_DIRECT, None, "op")
            .unwrap();
        assert!(outcome.cycle_completed());
        assert_eq!(outcome.cycle_count(), 1);
        assert_eq!(containers.get(&cid()).unwrap().state(), ORDERED);
    }

    #[test]
    fn test_unknown_state_rejected_without_side_effects() {
        let mut engine = LifecycleEngine::new(catalog());
        let mut containers = registered(ORDERED, 0);

        let err = engine
            .apply_transition(&mut containers, &cid(), StateId::new(42), None, "op")
            .unwrap_err();
        assert_eq!(err, LifecycleError::UnknownState(StateId::new(42)));
        assert_eq!(containers.get(&cid()).unwrap().state(), ORDERED);
        assert!(engine.history_log().is_empty());
    }

    #[test]
    fn test_unknown_container_rejected() {
        let mut engine = LifecycleEngine::new(catalog());
        let mut containers = ContainerSet::new();

        let err = engine
            .apply_transition(&mut containers, &cid(), IN_TRANSIT, None, "op")
            .unwrap_err();
        assert_eq!(err, LifecycleError::UnknownContainer(cid()));
        assert!(engine.history_log().is_empty());
    }
}
