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

//! # Container Records
//!
//! The container type label, the container record itself, and the in-memory
//! [`ContainerSet`] snapshot the caller's repository layer supplies.
//!
//! Type labels are free text (`"40 REEFER"`, `"20ft DC"`). Parsing extracts
//! the leading integer as the size in feet (0 when absent) and flags the unit
//! as a reefer when the label contains `REEFER` case-insensitively. An empty
//! label yields an unknown reefer flag, which imposes **no** stacking
//! constraint; `Some(false)` does.

use crate::coord::Location;
use crate::ident::ContainerId;
use regex::Regex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// A lifecycle state catalog key.
///
/// Lives in the model crate so the container record can reference its current
/// state without depending on the lifecycle engine.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct StateId(u32);

impl StateId {
    #[inline]
    pub const fn new(id: u32) -> Self {
        StateId(id)
    }

    #[inline]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateId({})", self.0)
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn size_pattern() -> &'static Regex {
    static SIZE_RE: OnceLock<Regex> = OnceLock::new();
    SIZE_RE.get_or_init(|| Regex::new(r"^\s*(\d+)").expect("size pattern is valid"))
}

/// The physical characteristics parsed out of a type label.
///
/// `size_feet` is 0 when the label carries no leading integer; `reefer` is
/// `None` when the label is empty. Callers must treat `None` as "no
/// constraint", never as `false`.
///
/// # Examples
///
/// ```rust
/// use twistlock_model::ContainerType;
///
/// let kind = ContainerType::parse_label("40 REEFER");
/// assert_eq!(kind.size_feet(), 40);
/// assert_eq!(kind.reefer(), Some(true));
///
/// let unknown = ContainerType::parse_label("");
/// assert_eq!(unknown.size_feet(), 0);
/// assert_eq!(unknown.reefer(), None);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ContainerType {
    size_feet: u32,
    reefer: Option<bool>,
}

impl ContainerType {
    #[inline]
    pub const fn new(size_feet: u32, reefer: Option<bool>) -> Self {
        ContainerType { size_feet, reefer }
    }

    /// Parses a free-text type label.
    pub fn parse_label(label: &str) -> Self {
        if label.trim().is_empty() {
            return ContainerType::new(0, None);
        }
        let size_feet = size_pattern()
            .captures(label)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);
        let reefer = label.to_ascii_uppercase().contains("REEFER");
        ContainerType::new(size_feet, Some(reefer))
    }

    #[inline]
    pub const fn size_feet(&self) -> u32 {
        self.size_feet
    }

    #[inline]
    pub const fn reefer(&self) -> Option<bool> {
        self.reefer
    }

    /// `true` only when the unit is positively known to be a reefer.
    #[inline]
    pub fn is_reefer(&self) -> bool {
        self.reefer == Some(true)
    }
}

/// A container record: the cached view the caller keeps alongside the grids.
///
/// The grid holding the container's coordinates is the single source of truth
/// for `location`; after every committed mutation the caller applies the
/// returned delta back onto this record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Container {
    id: ContainerId,
    kind: ContainerType,
    location: Location,
    state: StateId,
    cycle_count: u32,
}

impl Container {
    /// Creates a fresh, unassigned record in the given lifecycle state with a
    /// cycle count of zero.
    pub fn new(id: ContainerId, kind: ContainerType, state: StateId) -> Self {
        Container {
            id,
            kind,
            location: Location::Unassigned,
            state,
            cycle_count: 0,
        }
    }

    #[inline]
    pub fn id(&self) -> &ContainerId {
        &self.id
    }

    #[inline]
    pub fn kind(&self) -> &ContainerType {
        &self.kind
    }

    #[inline]
    pub fn location(&self) -> &Location {
        &self.location
    }

    #[inline]
    pub fn state(&self) -> StateId {
        self.state
    }

    #[inline]
    pub fn cycle_count(&self) -> u32 {
        self.cycle_count
    }

    /// Overwrites the cached location after a committed grid mutation.
    #[inline]
    pub fn set_location(&mut self, location: Location) {
        self.location = location;
    }

    #[inline]
    pub fn set_state(&mut self, state: StateId) {
        self.state = state;
    }

    #[inline]
    pub fn set_cycle_count(&mut self, cycle_count: u32) {
        self.cycle_count = cycle_count;
    }
}

/// An in-memory snapshot of container records, keyed by identifier.
///
/// Supplied and persisted by the caller-owned repository; the core only
/// reads and mutates it in memory.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ContainerSet {
    inner: FxHashMap<ContainerId, Container>,
}

impl ContainerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record, returning the previous one for the same id, if any.
    pub fn insert(&mut self, container: Container) -> Option<Container> {
        self.inner.insert(*container.id(), container)
    }

    pub fn get(&self, id: &ContainerId) -> Option<&Container> {
        self.inner.get(id)
    }

    pub fn get_mut(&mut self, id: &ContainerId) -> Option<&mut Container> {
        self.inner.get_mut(id)
    }

    pub fn remove(&mut self, id: &ContainerId) -> Option<Container> {
        self.inner.remove(id)
    }

    pub fn contains(&self, id: &ContainerId) -> bool {
        self.inner.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Container> {
        self.inner.values()
    }
}

impl FromIterator<Container> for ContainerSet {
    fn from_iter<I: IntoIterator<Item = Container>>(iter: I) -> Self {
        let mut set = ContainerSet::new();
        for container in iter {
            set.insert(container);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_label_size_and_reefer() {
        let kind = ContainerType::parse_label("40 REEFER");
        assert_eq!(kind.size_feet(), 40);
        assert_eq!(kind.reefer(), Some(true));
        assert!(kind.is_reefer());
    }

    #[test]
    fn test_parse_label_standard_unit() {
        let kind = ContainerType::parse_label("20ft DC");
        assert_eq!(kind.size_feet(), 20);
        assert_eq!(kind.reefer(), Some(false));
        assert!(!kind.is_reefer());
    }

    #[test]
    fn test_parse_label_is_case_insensitive_on_reefer() {
        assert_eq!(ContainerType::parse_label("40 reefer").reefer(), Some(true));
        assert_eq!(ContainerType::parse_label("40 Reefer HC").reefer(), Some(true));
    }

    #[test]
    fn test_parse_label_without_leading_size() {
        let kind = ContainerType::parse_label("REEFER");
        assert_eq!(kind.size_feet(), 0);
        assert_eq!(kind.reefer(), Some(true));
    }

    #[test]
    fn test_parse_label_empty_is_fully_unknown() {
        let kind = ContainerType::parse_label("");
        assert_eq!(kind.size_feet(), 0);
        assert_eq!(kind.reefer(), None);
        assert!(!kind.is_reefer());

        let blank = ContainerType::parse_label("   ");
        assert_eq!(blank.reefer(), None);
    }

    #[test]
    fn test_container_set_roundtrip() {
        let id = ContainerId::parse("CSQU3054383").unwrap();
        let container = Container::new(id, ContainerType::parse_label("40 DC"), StateId::new(1));

        let mut set = ContainerSet::new();
        assert!(set.insert(container.clone()).is_none());
        assert!(set.contains(&id));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(&id), Some(&container));

        set.get_mut(&id).unwrap().set_cycle_count(3);
        assert_eq!(set.get(&id).unwrap().cycle_count(), 3);

        assert!(set.remove(&id).is_some());
        assert!(set.is_empty());
    }

    #[test]
    fn test_new_container_starts_unassigned() {
        let id = ContainerId::parse("MSKU1234565").unwrap();
        let c = Container::new(id, ContainerType::new(40, Some(false)), StateId::new(1));
        assert_eq!(c.location(), &Location::Unassigned);
        assert_eq!(c.cycle_count(), 0);
    }
}
