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

//! # Vessel Grid
//!
//! A per-vessel stowage grid: `bay_count × row_count` columns of depth
//! `tier_count`, everything 0-indexed (vessel plans count from zero, unlike
//! the yard — the numbering is deliberately not unified). Dimensions are
//! supplied when the vessel is registered and are immutable for the
//! vessel's lifetime; changing them would orphan existing placements, which
//! is out of scope to reconcile.

use crate::error::{LayoutError, PlacementError};
use crate::search::{column_candidate, column_candidate_without, revalidate_for_commit};
use crate::stack::{Occupant, Stack};
use crate::stowage::{Stowage, StowageDelta};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};
use twistlock_model::{ContainerId, ContainerType, Location, VesselId, VesselSlot};

/// One registered vessel's stowage grid.
#[derive(Debug, Clone)]
pub struct VesselGrid {
    vessel: VesselId,
    bay_count: u16,
    row_count: u16,
    tier_count: u16,
    stacks: Vec<Stack>,
    positions: FxHashMap<ContainerId, VesselSlot>,
}

impl VesselGrid {
    /// Registers a grid with fixed dimensions. All three must be positive.
    pub fn new(
        vessel: VesselId,
        bay_count: u16,
        row_count: u16,
        tier_count: u16,
    ) -> Result<Self, LayoutError> {
        if bay_count == 0 || row_count == 0 || tier_count == 0 {
            return Err(LayoutError::ZeroDimension);
        }
        let stacks = (0..bay_count as usize * row_count as usize)
            .map(|_| Stack::new(0, tier_count))
            .collect();
        Ok(VesselGrid {
            vessel,
            bay_count,
            row_count,
            tier_count,
            stacks,
            positions: FxHashMap::default(),
        })
    }

    #[inline]
    pub fn vessel(&self) -> VesselId {
        self.vessel
    }

    #[inline]
    pub fn bay_count(&self) -> u16 {
        self.bay_count
    }

    #[inline]
    pub fn row_count(&self) -> u16 {
        self.row_count
    }

    #[inline]
    pub fn tier_count(&self) -> u16 {
        self.tier_count
    }

    #[inline]
    pub fn container_count(&self) -> usize {
        self.positions.len()
    }

    fn column_index(&self, bay: u16, row: u16) -> Option<usize> {
        (bay < self.bay_count && row < self.row_count)
            .then(|| bay as usize * self.row_count as usize + row as usize)
    }

    fn slot_at(&self, column: usize, tier: u16) -> VesselSlot {
        let rows = self.row_count as usize;
        VesselSlot::new((column / rows) as u16, (column % rows) as u16, tier)
    }

    pub fn stack(&self, bay: u16, row: u16) -> Option<&Stack> {
        self.column_index(bay, row).map(|c| &self.stacks[c])
    }

    /// Loads a container from the caller's snapshot at an explicit slot;
    /// see [`YardGrid::load`](crate::yard::YardGrid::load) for the rules.
    pub fn load(
        &mut self,
        id: ContainerId,
        kind: ContainerType,
        slot: VesselSlot,
    ) -> Result<(), PlacementError> {
        let column = self
            .column_index(slot.bay, slot.row)
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

    /// Loads a whole snapshot, entry by entry; see
    /// [`YardGrid::load_all`](crate::yard::YardGrid::load_all).
    pub fn load_all<I>(&mut self, entries: I) -> Vec<(ContainerId, PlacementError)>
    where
        I: IntoIterator<Item = (ContainerId, ContainerType, VesselSlot)>,
    {
        let mut rejected = Vec::new();
        for (id, kind, slot) in entries {
            if let Err(e) = self.load(id, kind, slot) {
                warn!(container = %id, vessel = %self.vessel, slot = %slot, error = %e, "vessel snapshot entry rejected");
                rejected.push((id, e));
            }
        }
        rejected
    }

    /// Gravity-invariant violations present in the loaded data.
    pub fn gravity_gaps(&self) -> Vec<VesselSlot> {
        let mut gaps = Vec::new();
        for (column, stack) in self.stacks.iter().enumerate() {
            for tier in stack.gravity_gaps() {
                gaps.push(self.slot_at(column, tier));
            }
        }
        gaps
    }

    #[inline]
    fn location(&self, slot: VesselSlot) -> Location {
        Location::Vessel {
            vessel: self.vessel,
            slot,
        }
    }
}

impl Stowage for VesselGrid {
    type Slot = VesselSlot;

    fn placement_candidates(&self, kind: &ContainerType) -> Vec<VesselSlot> {
        self.stacks
            .iter()
            .enumerate()
            .filter_map(|(column, stack)| {
                column_candidate(stack, kind).map(|tier| self.slot_at(column, tier))
            })
            .collect()
    }

    fn relocation_candidates(&self, id: &ContainerId) -> Result<Vec<VesselSlot>, PlacementError> {
        let origin = *self
            .positions
            .get(id)
            .ok_or(PlacementError::UnknownContainer(*id))?;
        let origin_column = self
            .column_index(origin.bay, origin.row)
            .expect("resident positions always lie within the grid");
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
        slot: VesselSlot,
    ) -> Result<StowageDelta, PlacementError> {
        let column = self
            .column_index(slot.bay, slot.row)
            .ok_or(PlacementError::SlotOutOfBounds)?;
        if self.positions.contains_key(&id) {
            return Err(PlacementError::DuplicateContainer(id));
        }
        revalidate_for_commit(&self.stacks[column], slot.tier, &kind)?;

        self.stacks[column].place(slot.tier, Occupant::new(id, kind));
        self.positions.insert(id, slot);
        debug!(container = %id, vessel = %self.vessel, slot = %slot, "vessel placement committed");
        Ok(StowageDelta::new(
            id,
            Location::Unassigned,
            self.location(slot),
        ))
    }

    fn commit_relocation(
        &mut self,
        id: &ContainerId,
        slot: VesselSlot,
    ) -> Result<StowageDelta, PlacementError> {
        let origin = *self
            .positions
            .get(id)
            .ok_or(PlacementError::UnknownContainer(*id))?;
        let origin_column = self
            .column_index(origin.bay, origin.row)
            .expect("resident positions always lie within the grid");

        if !self.stacks[origin_column].is_movable(origin.tier) {
            return Err(PlacementError::StaleState);
        }
        if slot == origin {
            return Err(PlacementError::StaleState);
        }
        let target_column = self
            .column_index(slot.bay, slot.row)
            .ok_or(PlacementError::SlotOutOfBounds)?;

        let occupant = self.stacks[origin_column]
            .remove(origin.tier)
            .expect("position index and stacks are consistent");

        if let Err(e) = revalidate_for_commit(&self.stacks[target_column], slot.tier, occupant.kind())
        {
            self.stacks[origin_column].place(origin.tier, occupant);
            warn!(container = %id, vessel = %self.vessel, from = %origin, to = %slot, error = %e, "vessel relocation rolled back");
            return Err(e);
        }

        self.stacks[target_column].place(slot.tier, occupant);
        self.positions.insert(*id, slot);
        debug!(container = %id, vessel = %self.vessel, from = %origin, to = %slot, "vessel relocation committed");
        Ok(StowageDelta::new(
            *id,
            self.location(origin),
            self.location(slot),
        ))
    }

    fn is_container_movable(&self, id: &ContainerId) -> Result<bool, PlacementError> {
        let slot = self
            .positions
            .get(id)
            .ok_or(PlacementError::UnknownContainer(*id))?;
        let column = self
            .column_index(slot.bay, slot.row)
            .expect("resident positions always lie within the grid");
        Ok(self.stacks[column].is_movable(slot.tier))
    }

    fn position_of(&self, id: &ContainerId) -> Option<VesselSlot> {
        self.positions.get(id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(serial: &str) -> ContainerId {
        let digit = twistlock_model::ident::check_digit("TSTU", serial).unwrap();
        ContainerId::parse(&format!("TSTU{}{}", serial, digit)).unwrap()
    }

    fn small_vessel() -> VesselGrid {
        // 2 bays x 2 rows x 2 tiers.
        VesselGrid::new(VesselId::new(7), 2, 2, 2).unwrap()
    }

    #[test]
    fn test_dimensions_are_validated_and_fixed() {
        assert_eq!(
            VesselGrid::new(VesselId::new(1), 0, 2, 2).unwrap_err(),
            LayoutError::ZeroDimension
        );
        let vessel = small_vessel();
        assert_eq!(vessel.bay_count(), 2);
        assert_eq!(vessel.row_count(), 2);
        assert_eq!(vessel.tier_count(), 2);
    }

    #[test]
    fn test_candidates_use_zero_indexed_tiers() {
        let vessel = small_vessel();
        let kind = ContainerType::parse_label("40 DC");

        let candidates = vessel.placement_candidates(&kind);
        assert_eq!(
            candidates,
            vec![
                VesselSlot::new(0, 0, 0),
                VesselSlot::new(0, 1, 0),
                VesselSlot::new(1, 0, 0),
                VesselSlot::new(1, 1, 0),
            ]
        );
    }

    #[test]
    fn test_commit_placement_reports_vessel_location() {
        let mut vessel = small_vessel();
        let kind = ContainerType::parse_label("40 DC");

        let delta = vessel
            .commit_placement(id("000001"), kind, VesselSlot::new(1, 0, 0))
            .unwrap();
        assert_eq!(
            delta.to(),
            &Location::Vessel {
                vessel: VesselId::new(7),
                slot: VesselSlot::new(1, 0, 0),
            }
        );
    }

    #[test]
    fn test_stacking_rules_apply_on_board() {
        let mut vessel = small_vessel();
        vessel
            .commit_placement(
                id("000001"),
                ContainerType::parse_label("40 DC"),
                VesselSlot::new(0, 0, 0),
            )
            .unwrap();

        // Reefer on standard is rejected on board too.
        assert_eq!(
            vessel.commit_placement(
                id("000002"),
                ContainerType::parse_label("40 REEFER"),
                VesselSlot::new(0, 0, 1),
            ),
            Err(PlacementError::ReeferIncompatible)
        );

        // A smaller standard unit stacks fine.
        assert!(vessel
            .commit_placement(
                id("000003"),
                ContainerType::parse_label("20 DC"),
                VesselSlot::new(0, 0, 1),
            )
            .is_ok());
    }

    #[test]
    fn test_relocation_round_trip_reflects_post_move_state() {
        let mut vessel = small_vessel();
        let kind = ContainerType::parse_label("40 DC");
        vessel
            .commit_placement(id("000001"), kind, VesselSlot::new(0, 0, 0))
            .unwrap();

        let first = vessel.relocation_candidates(&id("000001")).unwrap()[0];
        vessel.commit_relocation(&id("000001"), first).unwrap();

        assert_eq!(vessel.position_of(&id("000001")), Some(first));
        // Nothing sits above it at the new coordinate.
        assert_eq!(vessel.is_container_movable(&id("000001")), Ok(true));
    }

    #[test]
    fn test_relocation_rolls_back_when_target_went_stale() {
        let mut vessel = small_vessel();
        let kind = ContainerType::parse_label("40 DC");
        vessel
            .commit_placement(id("000001"), kind, VesselSlot::new(0, 0, 0))
            .unwrap();
        vessel
            .commit_placement(id("000002"), kind, VesselSlot::new(0, 1, 0))
            .unwrap();

        assert_eq!(
            vessel.commit_relocation(&id("000001"), VesselSlot::new(0, 1, 0)),
            Err(PlacementError::StaleState)
        );
        assert_eq!(vessel.position_of(&id("000001")), Some(VesselSlot::new(0, 0, 0)));
        assert_eq!(vessel.container_count(), 2);
    }

    #[test]
    fn test_load_all_reports_rejections_per_entry() {
        let mut vessel = small_vessel();
        let kind = ContainerType::parse_label("40 DC");

        let rejected = vessel.load_all(vec![
            (id("000001"), kind, VesselSlot::new(0, 0, 0)),
            (id("000001"), kind, VesselSlot::new(1, 0, 0)), // duplicate id
            (id("000002"), kind, VesselSlot::new(2, 0, 0)), // out of bounds
        ]);

        assert_eq!(vessel.container_count(), 1);
        assert_eq!(
            rejected,
            vec![
                (id("000001"), PlacementError::DuplicateContainer(id("000001"))),
                (id("000002"), PlacementError::SlotOutOfBounds),
            ]
        );
    }

    #[test]
    fn test_load_and_gravity_gap_reporting() {
        let mut vessel = small_vessel();
        vessel
            .load(
                id("000001"),
                ContainerType::parse_label("40 DC"),
                VesselSlot::new(1, 1, 1),
            )
            .unwrap();
        assert_eq!(vessel.gravity_gaps(), vec![VesselSlot::new(1, 1, 1)]);
    }
}
