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

//! # Yard Grid
//!
//! The fixed-geometry storage yard: `blocks × bays_per_block` columns of
//! depth `tiers_per_bay`, 1-indexed bays and tiers, blocks lettered from
//! `A`. The classic layout is 10 blocks of 10 bays of 7 tiers, which is the
//! [`YardLayout`] default; the dimensions are configuration, not constants.
//!
//! Columns are stored flattened, block-major then bay, and an id index maps
//! every resident container to its slot.

use crate::error::{LayoutError, PlacementError};
use crate::search::{column_candidate, column_candidate_without, revalidate_for_commit};
use crate::stack::{Occupant, Stack};
use crate::stowage::{Stowage, StowageDelta};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};
use twistlock_model::{BlockId, ContainerId, ContainerType, Location, YardSlot};

/// Yard dimensions. Blocks are letters starting at `A`; bays and tiers are
/// 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YardLayout {
    blocks: u8,
    bays_per_block: u16,
    tiers_per_bay: u16,
}

impl YardLayout {
    pub fn new(blocks: u8, bays_per_block: u16, tiers_per_bay: u16) -> Result<Self, LayoutError> {
        if blocks == 0 || bays_per_block == 0 || tiers_per_bay == 0 {
            return Err(LayoutError::ZeroDimension);
        }
        if blocks > 26 {
            return Err(LayoutError::TooManyBlocks(blocks));
        }
        Ok(YardLayout {
            blocks,
            bays_per_block,
            tiers_per_bay,
        })
    }

    #[inline]
    pub fn blocks(&self) -> u8 {
        self.blocks
    }

    #[inline]
    pub fn bays_per_block(&self) -> u16 {
        self.bays_per_block
    }

    #[inline]
    pub fn tiers_per_bay(&self) -> u16 {
        self.tiers_per_bay
    }

    /// Total number of columns.
    #[inline]
    fn column_count(&self) -> usize {
        self.blocks as usize * self.bays_per_block as usize
    }
}

impl Default for YardLayout {
    /// The classic 10-block, 10-bay, 7-tier yard.
    fn default() -> Self {
        YardLayout {
            blocks: 10,
            bays_per_block: 10,
            tiers_per_bay: 7,
        }
    }
}

/// The storage yard.
///
/// # Examples
///
/// ```rust
/// use twistlock_stowage::{Stowage, YardGrid, YardLayout};
/// use twistlock_model::{ContainerId, ContainerType};
///
/// let mut yard = YardGrid::new(YardLayout::default());
/// let id: ContainerId = "CSQU3054383".parse().unwrap();
/// let kind = ContainerType::parse_label("40 DC");
///
/// let candidates = yard.placement_candidates(&kind);
/// let delta = yard.commit_placement(id, kind, candidates[0]).unwrap();
/// assert_eq!(delta.to().to_string(), "yard A-01-01");
/// ```
#[derive(Debug, Clone)]
pub struct YardGrid {
    layout: YardLayout,
    stacks: Vec<Stack>,
    positions: FxHashMap<ContainerId, YardSlot>,
}

impl YardGrid {
    pub fn new(layout: YardLayout) -> Self {
        let stacks = (0..layout.column_count())
            .map(|_| Stack::new(1, layout.tiers_per_bay))
            .collect();
        YardGrid {
            layout,
            stacks,
            positions: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn layout(&self) -> &YardLayout {
        &self.layout
    }

    /// Number of containers resident in the yard.
    #[inline]
    pub fn container_count(&self) -> usize {
        self.positions.len()
    }

    /// The column for a block/bay pair, when within the layout.
    fn column_index(&self, block: BlockId, bay: u16) -> Option<usize> {
        let in_bounds = block.index() < self.layout.blocks as usize
            && bay >= 1
            && bay <= self.layout.bays_per_block;
        in_bounds
            .then(|| block.index() * self.layout.bays_per_block as usize + (bay as usize - 1))
    }

    /// The block/bay pair for a flattened column index.
    fn slot_at(&self, column: usize, tier: u16) -> YardSlot {
        let bays = self.layout.bays_per_block as usize;
        let block = BlockId::from_index((column / bays) as u8)
            .expect("column index lies within the configured blocks");
        YardSlot::new(block, (column % bays) as u16 + 1, tier)
    }

    /// The column under a slot, ignoring the slot's tier.
    pub fn stack(&self, block: BlockId, bay: u16) -> Option<&Stack> {
        self.column_index(block, bay).map(|c| &self.stacks[c])
    }

    /// Loads a container from the caller's snapshot at an explicit slot,
    /// without placement rules: loaded data may predate them. Bounds,
    /// double-occupancy, and duplicate ids are still rejected per entry.
    pub fn load(
        &mut self,
        id: ContainerId,
        kind: ContainerType,
        slot: YardSlot,
    ) -> Result<(), PlacementError> {
        let column = self
            .column_index(slot.block, slot.bay)
            .ok_or(PlacementError::SlotOutOfBounds)?;
        if !self.stacks[column].in_bounds(slot.tier) {
            return Err(PlacementError::SlotOutOfBounds);
        }
        if self.positions.contains_key(&id) {
            return Err(PlacementError::DuplicateContainer(id));
        }
        if self.stacks[column].occupant(slot.tier).is_some() {
            return Err(PlacementError::SlotOccupied);
        }
        self.stacks[column].place(slot.tier, Occupant::new(id, kind));
        self.positions.insert(id, slot);
        Ok(())
    }

    /// Loads a whole snapshot, entry by entry. Rejected entries are skipped
    /// and returned with their error; one bad entry never aborts the rest.
    pub fn load_all<I>(&mut self, entries: I) -> Vec<(ContainerId, PlacementError)>
    where
        I: IntoIterator<Item = (ContainerId, ContainerType, YardSlot)>,
    {
        let mut rejected = Vec::new();
        for (id, kind, slot) in entries {
            if let Err(e) = self.load(id, kind, slot) {
                warn!(container = %id, slot = %slot, error = %e, "yard snapshot entry rejected");
                rejected.push((id, e));
            }
        }
        rejected
    }

    /// Gravity-invariant violations present in the loaded data, as slots of
    /// the floating containers. The engine reports them; it never repairs
    /// pre-existing violations.
    pub fn gravity_gaps(&self) -> Vec<YardSlot> {
        let mut gaps = Vec::new();
        for (column, stack) in self.stacks.iter().enumerate() {
            for tier in stack.gravity_gaps() {
                gaps.push(self.slot_at(column, tier));
            }
        }
        gaps
    }
}

impl Stowage for YardGrid {
    type Slot = YardSlot;

    fn placement_candidates(&self, kind: &ContainerType) -> Vec<YardSlot> {
        self.stacks
            .iter()
            .enumerate()
            .filter_map(|(column, stack)| {
                column_candidate(stack, kind).map(|tier| self.slot_at(column, tier))
            })
            .collect()
    }

    fn relocation_candidates(&self, id: &ContainerId) -> Result<Vec<YardSlot>, PlacementError> {
        let origin = *self
            .positions
            .get(id)
            .ok_or(PlacementError::UnknownContainer(*id))?;
        let origin_column = self
            .column_index(origin.block, origin.bay)
            .expect("resident positions always lie within the layout");
        let kind = *self.stacks[origin_column]
            .occupant(origin.tier)
            .expect("position index and stacks are consistent")
            .kind();

        let mut candidates = Vec::new();
        for (column, stack) in self.stacks.iter().enumerate() {
            let tier = if column == origin_column {
                column_candidate_without(stack, &kind, origin.tier)
            } else {
                column_candidate(stack, &kind)
            };
            if let Some(tier) = tier {
                let slot = self.slot_at(column, tier);
                if slot != origin {
                    candidates.push(slot);
                }
            }
        }
        Ok(candidates)
    }

    fn commit_placement(
        &mut self,
        id: ContainerId,
        kind: ContainerType,
        slot: YardSlot,
    ) -> Result<StowageDelta, PlacementError> {
        let column = self
            .column_index(slot.block, slot.bay)
            .ok_or(PlacementError::SlotOutOfBounds)?;
        if self.positions.contains_key(&id) {
            return Err(PlacementError::DuplicateContainer(id));
        }
        revalidate_for_commit(&self.stacks[column], slot.tier, &kind)?;

        self.stacks[column].place(slot.tier, Occupant::new(id, kind));
        self.positions.insert(id, slot);
        debug!(container = %id, slot = %slot, "yard placement committed");
        Ok(StowageDelta::new(
            id,
            Location::Unassigned,
            Location::Yard(slot),
        ))
    }

    fn commit_relocation(
        &mut self,
        id: &ContainerId,
        slot: YardSlot,
    ) -> Result<StowageDelta, PlacementError> {
        let origin = *self
            .positions
            .get(id)
            .ok_or(PlacementError::UnknownContainer(*id))?;
        let origin_column = self
            .column_index(origin.block, origin.bay)
            .expect("resident positions always lie within the layout");

        // Both checks run before any mutation.
        if !self.stacks[origin_column].is_movable(origin.tier) {
            return Err(PlacementError::StaleState);
        }
        if slot == origin {
            return Err(PlacementError::StaleState);
        }
        let target_column = self
            .column_index(slot.block, slot.bay)
            .ok_or(PlacementError::SlotOutOfBounds)?;

        let occupant = self.stacks[origin_column]
            .remove(origin.tier)
            .expect("position index and stacks are consistent");

        if let Err(e) = revalidate_for_commit(&self.stacks[target_column], slot.tier, occupant.kind())
        {
            // Roll back the removal; the container must never end up in
            // neither stack.
            self.stacks[origin_column].place(origin.tier, occupant);
            warn!(container = %id, from = %origin, to = %slot, error = %e, "yard relocation rolled back");
            return Err(e);
        }

        self.stacks[target_column].place(slot.tier, occupant);
        self.positions.insert(*id, slot);
        debug!(container = %id, from = %origin, to = %slot, "yard relocation committed");
        Ok(StowageDelta::new(
            *id,
            Location::Yard(origin),
            Location::Yard(slot),
        ))
    }

    fn is_container_movable(&self, id: &ContainerId) -> Result<bool, PlacementError> {
        let slot = self
            .positions
            .get(id)
            .ok_or(PlacementError::UnknownContainer(*id))?;
        let column = self
            .column_index(slot.block, slot.bay)
            .expect("resident positions always lie within the layout");
        Ok(self.stacks[column].is_movable(slot.tier))
    }

    fn position_of(&self, id: &ContainerId) -> Option<YardSlot> {
        self.positions.get(id).copied()
    }
}
