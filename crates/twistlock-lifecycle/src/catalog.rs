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

//! # Lifecycle State Catalog
//!
//! The catalog of lifecycle states is caller-supplied data, not a built-in
//! enum. The engine only relies on two structural facts: there is exactly
//! one **initial** state (where a fresh cycle starts), and one or more
//! **cycle-completing** states (entering any of them finishes a cycle and
//! returns the container to the initial state).
//!
//! The builder validates eagerly, so the transition engine never sees a
//! catalog without a valid initial state.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use twistlock_model::StateId;

/// One entry in the caller-supplied state catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleState {
    id: StateId,
    name: String,
    color: Option<String>,
    is_active: bool,
}

impl LifecycleState {
    /// A new active state without a display color.
    pub fn new(id: StateId, name: impl Into<String>) -> Self {
        LifecycleState {
            id,
            name: name.into(),
            color: None,
            is_active: true,
        }
    }

    /// Attaches a display color (e.g. `"#2ecc71"`); presentation-only data
    /// the engine carries but never interprets.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    #[inline]
    pub fn id(&self) -> StateId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.is_active
    }
}

/// The reason a catalog failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogError {
    /// The catalog has no states at all.
    Empty,
    /// Two states share an id.
    DuplicateState(StateId),
    /// No initial state was declared.
    NoInitial,
    /// The declared initial state is not in the catalog.
    UnknownInitial(StateId),
    /// No cycle-completing state was declared.
    NoCycleStates,
    /// A declared cycle-completing state is not in the catalog.
    UnknownCycleState(StateId),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Empty => write!(f, "the state catalog is empty"),
            CatalogError::DuplicateState(id) => write!(f, "duplicate state id {}", id),
            CatalogError::NoInitial => write!(f, "no initial state declared"),
            CatalogError::UnknownInitial(id) => {
                write!(f, "initial state {} is not in the catalog", id)
            }
            CatalogError::NoCycleStates => write!(f, "no cycle-completing state declared"),
            CatalogError::UnknownCycleState(id) => {
                write!(f, "cycle-completing state {} is not in the catalog", id)
            }
        }
    }
}

impl std::error::Error for CatalogError {}

/// Accumulates states and structural declarations, validated by
/// [`StateCatalogBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct StateCatalogBuilder {
    states: Vec<LifecycleState>,
    initial: Option<StateId>,
    cycle_completing: Vec<StateId>,
}

impl StateCatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(mut self, state: LifecycleState) -> Self {
        self.states.push(state);
        self
    }

    /// Declares where a fresh cycle starts.
    pub fn initial(mut self, id: StateId) -> Self {
        self.initial = Some(id);
        self
    }

    /// Declares a state whose entry completes a cycle. May be called more
    /// than once; a deployment can treat several delivery states this way.
    pub fn cycle_completing(mut self, id: StateId) -> Self {
        self.cycle_completing.push(id);
        self
    }

    pub fn build(self) -> Result<StateCatalog, CatalogError> {
        if self.states.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut by_id = FxHashMap::default();
        for (index, state) in self.states.iter().enumerate() {
            if by_id.insert(state.id(), index).is_some() {
                return Err(CatalogError::DuplicateState(state.id()));
            }
        }

        let initial = self.initial.ok_or(CatalogError::NoInitial)?;
        if !by_id.contains_key(&initial) {
            return Err(CatalogError::UnknownInitial(initial));
        }

        if self.cycle_completing.is_empty() {
            return Err(CatalogError::NoCycleStates);
        }
        let mut cycle_completing = FxHashSet::default();
        for id in self.cycle_completing {
            if !by_id.contains_key(&id) {
                return Err(CatalogError::UnknownCycleState(id));
            }
            cycle_completing.insert(id);
        }

        Ok(StateCatalog {
            states: self.states,
            by_id,
            initial,
            cycle_completing,
        })
    }
}

/// A validated, immutable state catalog.
///
/// # Examples
///
/// ```rust
/// use twistlock_lifecycle::{LifecycleState, StateCatalogBuilder};
/// use twistlock_model::StateId;
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
/// assert_eq!(catalog.initial(), ordered);
/// assert!(catalog.is_cycle_completing(delivered));
/// assert!(!catalog.is_cycle_completing(ordered));
/// ```
#[derive(Debug, Clone)]
pub struct StateCatalog {
    states: Vec<LifecycleState>,
    by_id: FxHashMap<StateId, usize>,
    initial: StateId,
    cycle_completing: FxHashSet<StateId>,
}

impl StateCatalog {
    #[inline]
    pub fn get(&self, id: StateId) -> Option<&LifecycleState> {
        self.by_id.get(&id).map(|&index| &self.states[index])
    }

    #[inline]
    pub fn contains(&self, id: StateId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// The state a fresh cycle starts in.
    #[inline]
    pub fn initial(&self) -> StateId {
        self.initial
    }

    #[inline]
    pub fn is_cycle_completing(&self, id: StateId) -> bool {
        self.cycle_completing.contains(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// States in the order the caller supplied them.
    pub fn iter(&self) -> impl Iterator<Item = &LifecycleState> {
        self.states.iter()
    }
}
