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

//! # Coordinates and Locations
//!
//! Strongly-typed slot coordinates for the two grid kinds, and the tagged
//! [`Location`] union that replaces ad-hoc location strings.
//!
//! Numbering is deliberately **not** unified: yard bays and tiers are
//! 1-indexed (tiers 1..=7 in the default layout), vessel bays, rows, and
//! tiers are all 0-indexed. Each grid kind keeps the numbering its operators
//! use.
//!
//! The yard wire format `A-01-03` (block letter, zero-padded bay, zero-padded
//! tier) is parsed exactly once, at the boundary, via [`YardSlot::from_str`];
//! nothing downstream re-parses strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The input could not be parsed as a slot coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotParseError {
    input: String,
}

impl SlotParseError {
    fn new(input: &str) -> Self {
        SlotParseError {
            input: input.to_owned(),
        }
    }

    /// The offending input.
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Display for SlotParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "malformed slot coordinate '{}' (expected e.g. 'A-01-03')",
            self.input
        )
    }
}

impl std::error::Error for SlotParseError {}

/// A yard block letter (`A`, `B`, ...).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct BlockId(char);

impl BlockId {
    /// Accepts a single ASCII letter, upper-casing it.
    pub fn new(letter: char) -> Option<Self> {
        letter
            .is_ascii_alphabetic()
            .then(|| BlockId(letter.to_ascii_uppercase()))
    }

    /// The block at offset `index` from `A` (`0 -> A`, `1 -> B`, ...).
    pub fn from_index(index: u8) -> Option<Self> {
        (index < 26).then(|| BlockId((b'A' + index) as char))
    }

    #[inline]
    pub const fn letter(&self) -> char {
        self.0
    }

    /// Offset from `A`, for flattened grid indexing.
    #[inline]
    pub fn index(&self) -> usize {
        (self.0 as u8 - b'A') as usize
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockId({})", self.0)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A yard slot: block letter, 1-indexed bay, 1-indexed tier.
///
/// # Examples
///
/// ```rust
/// use twistlock_model::YardSlot;
///
/// let slot: YardSlot = "A-01-03".parse().unwrap();
/// assert_eq!(slot.bay, 1);
/// assert_eq!(slot.tier, 3);
/// assert_eq!(slot.to_string(), "A-01-03");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct YardSlot {
    pub block: BlockId,
    pub bay: u16,
    pub tier: u16,
}

impl YardSlot {
    pub const fn new(block: BlockId, bay: u16, tier: u16) -> Self {
        YardSlot { block, bay, tier }
    }
}

impl fmt::Display for YardSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}-{:02}", self.block, self.bay, self.tier)
    }
}

impl FromStr for YardSlot {
    type Err = SlotParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || SlotParseError::new(s);
        let mut parts = s.trim().split('-');

        let block_part = parts.next().ok_or_else(err)?;
        let bay_part = parts.next().ok_or_else(err)?;
        let tier_part = parts.next().ok_or_else(err)?;
        if parts.next().is_some() {
            return Err(err());
        }

        let mut block_chars = block_part.chars();
        let block = block_chars
            .next()
            .filter(|_| block_chars.next().is_none())
            .and_then(BlockId::new)
            .ok_or_else(err)?;
        let bay: u16 = bay_part.parse().map_err(|_| err())?;
        let tier: u16 = tier_part.parse().map_err(|_| err())?;
        if bay == 0 || tier == 0 {
            return Err(err());
        }

        Ok(YardSlot::new(block, bay, tier))
    }
}

/// A registered vessel.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct VesselId(u32);

impl VesselId {
    #[inline]
    pub const fn new(id: u32) -> Self {
        VesselId(id)
    }

    #[inline]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for VesselId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VesselId({})", self.0)
    }
}

impl fmt::Display for VesselId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A vessel slot: 0-indexed bay, row, and tier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct VesselSlot {
    pub bay: u16,
    pub row: u16,
    pub tier: u16,
}

impl VesselSlot {
    pub const fn new(bay: u16, row: u16, tier: u16) -> Self {
        VesselSlot { bay, row, tier }
    }
}

impl fmt::Display for VesselSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}-{:02}", self.bay, self.row, self.tier)
    }
}

/// Where a container currently is. Exactly one variant holds at any time; a
/// container is never concurrently yard- and vessel-resident.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Location {
    /// Not placed anywhere.
    Unassigned,
    /// In the storage yard.
    Yard(YardSlot),
    /// On board a vessel.
    Vessel { vessel: VesselId, slot: VesselSlot },
}

impl Location {
    #[inline]
    pub fn is_unassigned(&self) -> bool {
        matches!(self, Location::Unassigned)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Unassigned => write!(f, "unassigned"),
            Location::Yard(slot) => write!(f, "yard {}", slot),
            Location::Vessel { vessel, slot } => write!(f, "vessel {} {}", vessel, slot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_id_accepts_letters_only() {
        assert_eq!(BlockId::new('a').map(|b| b.letter()), Some('A'));
        assert_eq!(BlockId::new('J').map(|b| b.letter()), Some('J'));
        assert!(BlockId::new('1').is_none());
        assert!(BlockId::new('-').is_none());
    }

    #[test]
    fn test_block_id_index_roundtrip() {
        for i in 0..26u8 {
            let block = BlockId::from_index(i).unwrap();
            assert_eq!(block.index(), i as usize);
        }
        assert!(BlockId::from_index(26).is_none());
    }

    #[test]
    fn test_yard_slot_parse_and_display() {
        let slot: YardSlot = "A-01-03".parse().unwrap();
        assert_eq!(slot.block.letter(), 'A');
        assert_eq!(slot.bay, 1);
        assert_eq!(slot.tier, 3);
        assert_eq!(slot.to_string(), "A-01-03");

        // Unpadded input is accepted; display always pads.
        let slot: YardSlot = "c-7-1".parse().unwrap();
        assert_eq!(slot.to_string(), "C-07-01");
    }

    #[test]
    fn test_yard_slot_rejects_malformed_input() {
        assert!("".parse::<YardSlot>().is_err());
        assert!("A-01".parse::<YardSlot>().is_err());
        assert!("A-01-03-04".parse::<YardSlot>().is_err());
        assert!("AB-01-03".parse::<YardSlot>().is_err());
        assert!("1-01-03".parse::<YardSlot>().is_err());
        assert!("A-00-03".parse::<YardSlot>().is_err());
        assert!("A-01-00".parse::<YardSlot>().is_err());
        assert!("A-xx-03".parse::<YardSlot>().is_err());
    }

    #[test]
    fn test_location_display() {
        let yard = Location::Yard("B-02-01".parse().unwrap());
        assert_eq!(yard.to_string(), "yard B-02-01");

        let vessel = Location::Vessel {
            vessel: VesselId::new(7),
            slot: VesselSlot::new(0, 3, 1),
        };
        assert_eq!(vessel.to_string(), "vessel 7 00-03-01");

        assert!(Location::Unassigned.is_unassigned());
        assert!(!yard.is_unassigned());
    }
}
