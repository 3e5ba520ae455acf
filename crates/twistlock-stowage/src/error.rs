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

use twistlock_model::ContainerId;

/// The error type for placement, relocation, and loading operations.
///
/// Every variant is recoverable by the caller: retry with another candidate,
/// re-query the grid, or reject the request. An empty candidate list is a
/// normal result, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementError {
    /// The requested tier is not the lowest free tier of its stack.
    GravityViolation {
        /// The tier the caller asked for.
        requested_tier: u16,
        /// The only tier a placement could legally land on, `None` when the
        /// stack is full.
        lowest_free: Option<u16>,
    },
    /// The candidate is larger than the unit it would sit on.
    SizeIncompatible {
        candidate_feet: u32,
        below_feet: u32,
    },
    /// A reefer unit may not sit on a known non-reefer unit.
    ReeferIncompatible,
    /// The coordinate lies outside the grid's configured dimensions.
    SlotOutOfBounds,
    /// Loading targeted a coordinate that already holds a container.
    SlotOccupied,
    /// Loading an identifier that is already resident in this grid.
    DuplicateContainer(ContainerId),
    /// Commit-time re-validation failed: the grid changed between the
    /// candidate query and the commit. Re-query and pick a new candidate.
    StaleState,
    /// The identifier is not resident in this grid.
    UnknownContainer(ContainerId),
}

impl std::fmt::Display for PlacementError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlacementError::GravityViolation {
                requested_tier,
                lowest_free: Some(lowest),
            } => write!(
                f,
                "gravity violation: tier {} requested but {} is the lowest free tier",
                requested_tier, lowest
            ),
            PlacementError::GravityViolation {
                requested_tier,
                lowest_free: None,
            } => write!(
                f,
                "gravity violation: tier {} requested but the stack is full",
                requested_tier
            ),
            PlacementError::SizeIncompatible {
                candidate_feet,
                below_feet,
            } => write!(
                f,
                "size incompatible: {}ft cannot sit on {}ft",
                candidate_feet, below_feet
            ),
            PlacementError::ReeferIncompatible => {
                write!(f, "a reefer unit cannot sit on a non-reefer unit")
            }
            PlacementError::SlotOutOfBounds => write!(f, "slot is outside the grid"),
            PlacementError::SlotOccupied => write!(f, "slot is already occupied"),
            PlacementError::DuplicateContainer(id) => {
                write!(f, "container {} is already resident in this grid", id)
            }
            PlacementError::StaleState => {
                write!(f, "grid state changed since the candidate was computed")
            }
            PlacementError::UnknownContainer(id) => {
                write!(f, "container {} is not resident in this grid", id)
            }
        }
    }
}

impl std::error::Error for PlacementError {}

/// The error type for grid dimension validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    /// Every dimension must be at least 1.
    ZeroDimension,
    /// Yard blocks are single letters; at most 26 fit the scheme.
    TooManyBlocks(u8),
}

impl std::fmt::Display for LayoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayoutError::ZeroDimension => write!(f, "grid dimensions must be positive"),
            LayoutError::TooManyBlocks(n) => {
                write!(f, "{} blocks requested but block letters stop at Z (26)", n)
            }
        }
    }
}

impl std::error::Error for LayoutError {}
