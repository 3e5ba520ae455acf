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

//! # Twistlock Lifecycle
//!
//! **The cyclic lifecycle state machine for container records.**
//!
//! Containers march through a caller-defined catalog of states (ordered,
//! loaded, in transit, delivered, ...) and, on reaching a cycle-completing
//! state, wrap around: the cycle counter increments and the container
//! returns to the initial state for its next trip. Every hop lands in an
//! append-only audit history.
//!
//! ## Architecture
//!
//! * **`catalog`**: The validated [`StateCatalog`] of caller-supplied
//!   states, built via [`StateCatalogBuilder`].
//! * **`history`**: The append-only [`HistoryLog`] of [`HistoryEntry`]
//!   rows, read back newest-first.
//! * **`engine`**: The [`LifecycleEngine`] applying permissive transitions
//!   and the automatic cycle reset.

pub mod catalog;
pub mod engine;
pub mod history;

pub use catalog::{CatalogError, LifecycleState, StateCatalog, StateCatalogBuilder};
pub use engine::{LifecycleEngine, LifecycleError, TransitionOutcome, SYSTEM_ACTOR};
pub use history::{HistoryEntry, HistoryLog};
