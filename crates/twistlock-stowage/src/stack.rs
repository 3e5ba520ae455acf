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

//! # Stack Model
//!
//! One vertical column of slots, shared by both grid kinds: a sparse,
//! ordered mapping from tier to occupant with a configurable base tier
//! (yard columns start at 1, vessel columns at 0).
//!
//! The **gravity invariant** says an occupied tier never sits above an
//! unoccupied one. The stack enforces it at placement time only: data loaded
//! from the caller's snapshot may violate it, and such gaps are tolerated
//! and reported through [`Stack::gravity_gaps`] rather than repaired or
//! panicked on.
//!
//! [`Stack::can_place`] is the single authoritative compatibility check
//! (gravity, then size, then reefer) used by candidate search and by the
//! commit-time re-validation.

use crate::error::PlacementError;
use std::collections::BTreeMap;
use twistlock_model::{ContainerId, ContainerType};

/// A container as stowed in a column: its identity plus the physical
/// characteristics the compatibility rules need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupant {
    id: ContainerId,
    kind: ContainerType,
}

impl Occupant {
    #[inline]
    pub fn new(id: ContainerId, kind: ContainerType) -> Self {
        Occupant { id, kind }
    }

    #[inline]
    pub fn id(&self) -> &ContainerId {
        &self.id
    }

    #[inline]
    pub fn kind(&self) -> &ContainerType {
        &self.kind
    }
}

/// One vertical column of slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stack {
    base: u16,
    capacity: u16,
    tiers: BTreeMap<u16, Occupant>,
}

impl Stack {
    /// An empty column whose tiers run `base .. base + capacity`.
    pub fn new(base: u16, capacity: u16) -> Self {
        Stack {
            base,
            capacity,
            tiers: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn base(&self) -> u16 {
        self.base
    }

    #[inline]
    pub fn capacity(&self) -> u16 {
        self.capacity
    }

    /// Number of occupied tiers.
    #[inline]
    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.tiers.len() == self.capacity as usize
    }

    #[inline]
    pub fn occupant(&self, tier: u16) -> Option<&Occupant> {
        self.tiers.get(&tier)
    }

    /// Occupied tiers in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &Occupant)> {
        self.tiers.iter().map(|(tier, occ)| (*tier, occ))
    }

    /// `true` when the tier lies within `base .. base + capacity`.
    #[inline]
    pub fn in_bounds(&self, tier: u16) -> bool {
        tier >= self.base && tier < self.base + self.capacity
    }

    /// The first unoccupied tier scanning upward from the base, which is also
    /// the only tier a new container may legally land on. `None` when the
    /// column is full.
    pub fn lowest_free_tier(&self) -> Option<u16> {
        let mut tier = self.base;
        while self.tiers.contains_key(&tier) {
            tier += 1;
        }
        self.in_bounds(tier).then_some(tier)
    }

    /// Checks whether a container of the given type may land on `tier`.
    ///
    /// Rules, in order:
    /// 1. The tier must be within bounds and equal to the lowest free tier
    ///    (gravity invariant).
    /// 2. Against the occupant one tier below, if any: the candidate may not
    ///    be larger (`candidate.size_feet > below.size_feet` fails), and a
    ///    known reefer may not sit on a known non-reefer. Unknown reefer
    ///    flags impose no constraint.
    /// 3. At the base tier there is no occupant below and no type constraint.
    pub fn can_place(&self, tier: u16, kind: &ContainerType) -> Result<(), PlacementError> {
        if !self.in_bounds(tier) {
            return Err(PlacementError::SlotOutOfBounds);
        }
        let lowest_free = self.lowest_free_tier();
        if lowest_free != Some(tier) {
            return Err(PlacementError::GravityViolation {
                requested_tier: tier,
                lowest_free,
            });
        }

        if tier > self.base {
            if let Some(below) = self.tiers.get(&(tier - 1)) {
                if kind.size_feet() > below.kind().size_feet() {
                    return Err(PlacementError::SizeIncompatible {
                        candidate_feet: kind.size_feet(),
                        below_feet: below.kind().size_feet(),
                    });
                }
                if kind.reefer() == Some(true) && below.kind().reefer() == Some(false) {
                    return Err(PlacementError::ReeferIncompatible);
                }
            }
        }

        Ok(())
    }

    /// A container is movable only when no container occupies the tier above
    /// it: a unit cannot be lifted through a loaded unit.
    #[inline]
    pub fn is_movable(&self, tier: u16) -> bool {
        !self.tiers.contains_key(&(tier + 1))
    }

    /// Occupied tiers whose tier below is unoccupied: gravity-invariant
    /// violations present in loaded data. Empty for any stack built purely
    /// through validated placements.
    pub fn gravity_gaps(&self) -> Vec<u16> {
        self.tiers
            .keys()
            .filter(|&&tier| tier > self.base && !self.tiers.contains_key(&(tier - 1)))
            .copied()
            .collect()
    }

    /// Inserts without rule checks. Used by the grids for loading snapshots
    /// and for committing already-validated placements.
    pub(crate) fn place(&mut self, tier: u16, occupant: Occupant) -> Option<Occupant> {
        debug_assert!(self.in_bounds(tier), "tier {} outside column bounds", tier);
        self.tiers.insert(tier, occupant)
    }

    pub(crate) fn remove(&mut self, tier: u16) -> Option<Occupant> {
        self.tiers.remove(&tier)
    }
}
