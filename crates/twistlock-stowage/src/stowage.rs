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

//! # The Stowage Seam
//!
//! The read/write interface both grid kinds implement, and the delta a
//! committed mutation returns.
//!
//! Candidate queries take `&self` and may run freely against a snapshot;
//! commits take `&mut self`, which makes the single-writer-per-grid
//! requirement structural. No lock is held between a candidate query and the
//! commit: the caller presents choices in between, so every commit
//! re-validates and reports [`PlacementError::StaleState`] when the grid
//! moved underneath it.

use crate::error::PlacementError;
use serde::{Deserialize, Serialize};
use twistlock_model::{ContainerId, ContainerType, Location};

/// The committed effect of a placement or relocation.
///
/// Commits return the delta instead of invalidating anything themselves; the
/// calling layer applies it to its cached [`Container`](twistlock_model::Container)
/// record and decides what to refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StowageDelta {
    container: ContainerId,
    from: Location,
    to: Location,
}

impl StowageDelta {
    pub(crate) fn new(container: ContainerId, from: Location, to: Location) -> Self {
        StowageDelta {
            container,
            from,
            to,
        }
    }

    #[inline]
    pub fn container(&self) -> &ContainerId {
        &self.container
    }

    #[inline]
    pub fn from(&self) -> &Location {
        &self.from
    }

    #[inline]
    pub fn to(&self) -> &Location {
        &self.to
    }
}

/// Placement and relocation over one grid.
///
/// Implemented by [`YardGrid`](crate::yard::YardGrid) (block/bay/tier,
/// 1-indexed) and [`VesselGrid`](crate::vessel::VesselGrid) (bay/row/tier,
/// 0-indexed). `Slot` is the grid's own coordinate type, so yard and vessel
/// coordinates cannot be mixed up at a call site.
pub trait Stowage {
    /// The grid's coordinate type.
    type Slot: Copy + std::fmt::Debug;

    /// Every slot a container of the given type could legally land on, in
    /// stable grid-traversal order. An empty result is normal. Calling this
    /// twice without a commit in between yields identical results.
    fn placement_candidates(&self, kind: &ContainerType) -> Vec<Self::Slot>;

    /// Every slot the resident container could legally move to, evaluated
    /// with the mover lifted out of its own column and with its original
    /// slot excluded.
    fn relocation_candidates(
        &self,
        id: &ContainerId,
    ) -> Result<Vec<Self::Slot>, PlacementError>;

    /// Re-validates and inserts a previously unassigned container.
    fn commit_placement(
        &mut self,
        id: ContainerId,
        kind: ContainerType,
        slot: Self::Slot,
    ) -> Result<StowageDelta, PlacementError>;

    /// Moves a resident container: remove from the old column plus a
    /// placement at the new slot, atomically from the caller's point of
    /// view. On failure the removal is rolled back; the container never ends
    /// up in neither column.
    fn commit_relocation(
        &mut self,
        id: &ContainerId,
        slot: Self::Slot,
    ) -> Result<StowageDelta, PlacementError>;

    /// Whether the container can be lifted, i.e. nothing sits on top of it.
    fn is_container_movable(&self, id: &ContainerId) -> Result<bool, PlacementError>;

    /// The container's current slot in this grid, if resident.
    fn position_of(&self, id: &ContainerId) -> Option<Self::Slot>;
}
