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

//! # Twistlock Model
//!
//! **The Core Domain Model for the Twistlock Container Stowage Engine.**
//!
//! This crate defines the fundamental data structures shared by the slot
//! allocation engine (`twistlock_stowage`) and the lifecycle state machine
//! (`twistlock_lifecycle`). It is a leaf crate: no persistence, no I/O, no
//! grid logic, only validated value types and in-memory records.
//!
//! ## Architecture
//!
//! * **`ident`**: ISO 6346 container identifiers; check-digit computation,
//!   parsing/validation, and random generation.
//! * **`container`**: The free-text container type label (`"40 REEFER"`),
//!   the container record, and the in-memory `ContainerSet` snapshot.
//! * **`coord`**: Strongly-typed yard and vessel coordinates and the tagged
//!   `Location` union, parsed and validated once at the boundary.
//!
//! ## Design Philosophy
//!
//! 1. **Type Safety**: Coordinates are distinct types. A yard slot cannot be
//!    confused with a vessel slot, and a container can never be resident in
//!    both at once because `Location` is a tagged union.
//! 2. **Validate at the Boundary**: Identifiers and slot strings are parsed
//!    exactly once into owned, immutable values. Downstream code never
//!    re-parses a string.
//! 3. **Caller-Owned State**: The grids are authoritative for a container's
//!    location; the `Container` record is a cached view the caller keeps
//!    consistent after every committed mutation.

pub mod container;
pub mod coord;
pub mod ident;

pub use container::{Container, ContainerSet, ContainerType, StateId};
pub use coord::{BlockId, Location, SlotParseError, VesselId, VesselSlot, YardSlot};
pub use ident::{ContainerId, IdError};
