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

//! # Twistlock Stowage
//!
//! **The Slot Allocation Engine for yard and vessel grids.**
//!
//! Placement and relocation of containers over vertical stacks, governed by
//! three rules checked in one authoritative place ([`Stack::can_place`]):
//!
//! 1. **Gravity**: a container lands only on the lowest free tier of a
//!    stack; no tier may float above an empty one.
//! 2. **Size**: a container may sit only on an equal-or-larger unit.
//! 3. **Reefer**: a reefer unit may not sit on a known non-reefer unit;
//!    unknown flags impose no constraint.
//!
//! ## Architecture
//!
//! * **`stack`**: One sparse vertical column with a per-grid-kind base tier.
//! * **`yard`**: The fixed-geometry yard grid (blocks × bays × tiers,
//!   1-indexed, configurable via [`YardLayout`]).
//! * **`vessel`**: Per-vessel grids with registration-time dimensions,
//!   0-indexed.
//! * **`stowage`**: The [`Stowage`] trait both grids implement, and the
//!   [`StowageDelta`] a commit returns.
//! * **`search`**: The shared per-column candidate evaluation.
//! * **`error`**: The recoverable [`PlacementError`] taxonomy.
//!
//! ## Query/Commit Protocol
//!
//! Candidate search and commit are deliberately separate calls with no lock
//! held in between, so a caller can present the choices to an operator.
//! Commits therefore re-validate against the current grid and report
//! [`PlacementError::StaleState`] when the world moved; the caller re-queries
//! and picks again. Commits take `&mut self`, making single-writer-per-grid
//! structural rather than conventional.

pub mod error;
pub mod search;
pub mod stack;
pub mod stowage;
pub mod vessel;
pub mod yard;

pub use error::{LayoutError, PlacementError};
pub use stack::{Occupant, Stack};
pub use stowage::{Stowage, StowageDelta};
pub use vessel::VesselGrid;
pub use yard::{YardGrid, YardLayout};
