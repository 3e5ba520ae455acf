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

//! Per-column candidate evaluation shared by both grid kinds.
//!
//! A column contributes at most one candidate: its lowest free tier, and
//! only when [`Stack::can_place`] accepts the moving type there. Relocation
//! evaluates the mover's own column against a working copy with the mover
//! lifted out, so the vacated slot can become that column's new lowest free
//! tier.

use crate::error::PlacementError;
use crate::stack::Stack;
use twistlock_model::ContainerType;

/// The tier this column offers to a container of the given type, if any.
pub(crate) fn column_candidate(stack: &Stack, kind: &ContainerType) -> Option<u16> {
    let tier = stack.lowest_free_tier()?;
    stack.can_place(tier, kind).ok()?;
    Some(tier)
}

/// [`column_candidate`] evaluated as if `lifted_tier` were vacant.
pub(crate) fn column_candidate_without(
    stack: &Stack,
    kind: &ContainerType,
    lifted_tier: u16,
) -> Option<u16> {
    let mut working = stack.clone();
    working.remove(lifted_tier);
    column_candidate(&working, kind)
}

/// Commit-time re-validation. A gravity failure here means the grid moved
/// between query and commit (the tier filled up, or is no longer the lowest
/// free one), so it is reported as [`PlacementError::StaleState`]; rule
/// violations keep their specific variant so callers can tell "re-query"
/// from "illegal request".
pub(crate) fn revalidate_for_commit(
    stack: &Stack,
    tier: u16,
    kind: &ContainerType,
) -> Result<(), PlacementError> {
    stack.can_place(tier, kind).map_err(|e| match e {
        PlacementError::GravityViolation { .. } => PlacementError::StaleState,
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::Occupant;
    use twistlock_model::ContainerId;

    fn occ(serial: &str, label: &str) -> Occupant {
        let digit = twistlock_model::ident::check_digit("TSTU", serial).unwrap();
        let id = ContainerId::parse(&format!("TSTU{}{}", serial, digit)).unwrap();
        Occupant::new(id, ContainerType::parse_label(label))
    }

    #[test]
    fn test_column_candidate_is_the_lowest_free_tier() {
        let mut stack = Stack::new(1, 7);
        stack.place(1, occ("000001", "40 DC"));

        let kind = ContainerType::parse_label("40 DC");
        assert_eq!(column_candidate(&stack, &kind), Some(2));
    }

    #[test]
    fn test_column_candidate_respects_compatibility() {
        let mut stack = Stack::new(1, 7);
        stack.place(1, occ("000001", "20 DC"));

        let forty = ContainerType::parse_label("40 DC");
        assert_eq!(column_candidate(&stack, &forty), None);

        let twenty = ContainerType::parse_label("20 DC");
        assert_eq!(column_candidate(&stack, &twenty), Some(2));
    }

    #[test]
    fn test_column_candidate_none_when_full() {
        let mut stack = Stack::new(0, 1);
        stack.place(0, occ("000001", "40 DC"));
        let kind = ContainerType::parse_label("40 DC");
        assert_eq!(column_candidate(&stack, &kind), None);
    }

    #[test]
    fn test_column_candidate_without_vacates_the_lifted_tier() {
        let mut stack = Stack::new(1, 7);
        stack.place(1, occ("000001", "40 DC"));
        stack.place(2, occ("000002", "40 DC"));

        let kind = ContainerType::parse_label("40 DC");
        // With tier 2 lifted out, tier 2 itself is the candidate again.
        assert_eq!(column_candidate_without(&stack, &kind, 2), Some(2));
        // The original column is untouched.
        assert_eq!(column_candidate(&stack, &kind), Some(3));
    }

    #[test]
    fn test_revalidate_maps_gravity_to_stale() {
        let mut stack = Stack::new(1, 7);
        stack.place(1, occ("000001", "40 DC"));

        let kind = ContainerType::parse_label("40 DC");
        // Tier 1 was free when queried, but is occupied now.
        assert_eq!(
            revalidate_for_commit(&stack, 1, &kind),
            Err(PlacementError::StaleState)
        );
        // Rule violations pass through unchanged.
        let bigger = ContainerType::parse_label("45 DC");
        assert!(matches!(
            revalidate_for_commit(&stack, 2, &bigger),
            Err(PlacementError::SizeIncompatible { .. })
        ));
    }
}
