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

//! # ISO 6346 Container Identifiers
//!
//! An identifier is an 11-character code: a 3-letter owner prefix, the
//! equipment-category letter `U`, a 6-digit serial, and a check digit that is
//! a deterministic function of the first 10 characters.
//!
//! The check digit weighs each of the 10 characters by `2^position` (left to
//! right), mapping letters through the standard alphabet table that skips
//! multiples of 11 and digits to their numeric value, then takes the sum
//! modulo 11 with 10 mapped to 0.
//!
//! Validation is case-insensitive on input; a [`ContainerId`] always holds
//! the upper-cased form and is immutable once constructed.

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The reason an identifier failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdError {
    /// The string is not exactly 4 letters followed by 7 digits.
    Format,
    /// The 4th character (the equipment category) is not `U`.
    Category,
    /// The 11th character does not match the computed check digit.
    CheckDigit {
        /// The digit the first 10 characters actually compute to.
        expected: u8,
    },
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdError::Format => {
                write!(f, "container id must be 4 letters followed by 7 digits")
            }
            IdError::Category => write!(f, "equipment category letter must be 'U'"),
            IdError::CheckDigit { expected } => {
                write!(f, "check digit mismatch (expected {})", expected)
            }
        }
    }
}

impl std::error::Error for IdError {}

/// ISO 6346 letter values. The standard skips every multiple of 11, so the
/// sequence runs 10, 12..21, 23..32, 34..38 for A..Z.
const LETTER_VALUES: [u32; 26] = [
    10, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 23, 24, 25, 26, 27, 28, 29, 30, 31, 32, 34, 35,
    36, 37, 38,
];

#[inline]
fn letter_value(c: u8) -> u32 {
    debug_assert!(c.is_ascii_uppercase());
    LETTER_VALUES[(c - b'A') as usize]
}

/// Computes the ISO 6346 check digit for a 4-letter owner code and a 6-digit
/// serial.
///
/// Fails with [`IdError::Format`] when `owner_code` is not exactly 4 ASCII
/// letters or `serial` is not exactly 6 ASCII digits. Lower-case letters are
/// accepted and valued as their upper-case form.
///
/// # Examples
///
/// ```rust
/// use twistlock_model::ident::check_digit;
///
/// // The canonical ISO 6346 example.
/// assert_eq!(check_digit("CSQU", "305438"), Ok(3));
/// ```
pub fn check_digit(owner_code: &str, serial: &str) -> Result<u8, IdError> {
    let owner = owner_code.as_bytes();
    let digits = serial.as_bytes();
    if owner.len() != 4 || !owner.iter().all(|b| b.is_ascii_alphabetic()) {
        return Err(IdError::Format);
    }
    if digits.len() != 6 || !digits.iter().all(|b| b.is_ascii_digit()) {
        return Err(IdError::Format);
    }

    let mut sum: u32 = 0;
    for (i, &b) in owner.iter().enumerate() {
        sum += letter_value(b.to_ascii_uppercase()) << i;
    }
    for (i, &b) in digits.iter().enumerate() {
        sum += u32::from(b - b'0') << (i + 4);
    }

    let rem = (sum % 11) as u8;
    Ok(if rem == 10 { 0 } else { rem })
}

/// A validated, immutable ISO 6346 container identifier.
///
/// Always stored upper-cased. Construction goes through [`ContainerId::parse`]
/// (or [`FromStr`]), so every value of this type satisfies the format,
/// category, and check-digit rules.
///
/// # Examples
///
/// ```rust
/// use twistlock_model::ContainerId;
///
/// let id: ContainerId = "csqu3054383".parse().unwrap();
/// assert_eq!(id.as_str(), "CSQU3054383");
/// assert_eq!(id.owner_code(), "CSQU");
/// assert_eq!(id.serial(), "305438");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContainerId([u8; 11]);

impl ContainerId {
    /// Parses and validates an identifier.
    ///
    /// Input is case-insensitive and surrounding whitespace is ignored;
    /// validation always runs against the upper-cased form.
    pub fn parse(input: &str) -> Result<Self, IdError> {
        let trimmed = input.trim();
        let bytes = trimmed.as_bytes();
        if bytes.len() != 11 {
            return Err(IdError::Format);
        }

        let mut buf = [0u8; 11];
        for (i, &b) in bytes.iter().enumerate() {
            let ok = if i < 4 {
                b.is_ascii_alphabetic()
            } else {
                b.is_ascii_digit()
            };
            if !ok {
                return Err(IdError::Format);
            }
            buf[i] = b.to_ascii_uppercase();
        }

        if buf[3] != b'U' {
            return Err(IdError::Category);
        }

        let expected = check_digit(&trimmed[..4], &trimmed[4..10])?;
        if buf[10] - b'0' != expected {
            return Err(IdError::CheckDigit { expected });
        }

        Ok(ContainerId(buf))
    }

    /// Generates a random, valid identifier: a random 3-letter prefix plus
    /// `U`, a random 6-digit serial, and the matching check digit.
    ///
    /// Uniqueness against existing containers is the caller's concern; see
    /// [`generate_unique`].
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut buf = [0u8; 11];
        for slot in buf.iter_mut().take(3) {
            *slot = b'A' + rng.random_range(0..26u8);
        }
        buf[3] = b'U';
        for slot in buf.iter_mut().take(10).skip(4) {
            *slot = b'0' + rng.random_range(0..10u8);
        }
        Self::finish(buf)
    }

    /// Fills in the check digit for a buffer holding a valid prefix + serial.
    fn finish(mut buf: [u8; 11]) -> Self {
        let owner = std::str::from_utf8(&buf[..4]).expect("owner code is ASCII");
        let serial = std::str::from_utf8(&buf[4..10]).expect("serial is ASCII");
        let digit = check_digit(owner, serial).expect("generated prefix and serial are well-formed");
        buf[10] = b'0' + digit;
        ContainerId(buf)
    }

    /// The full 11-character code.
    #[inline]
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).expect("container id is always ASCII")
    }

    /// The 4-letter owner code, including the category letter.
    #[inline]
    pub fn owner_code(&self) -> &str {
        &self.as_str()[..4]
    }

    /// The 6-digit serial.
    #[inline]
    pub fn serial(&self) -> &str {
        &self.as_str()[4..10]
    }

    /// The check digit.
    #[inline]
    pub fn check_digit(&self) -> u8 {
        self.0[10] - b'0'
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContainerId({})", self.as_str())
    }
}

impl FromStr for ContainerId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContainerId::parse(s)
    }
}

impl Serialize for ContainerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ContainerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ContainerId::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Generates an identifier that is not claimed by `is_taken`.
///
/// Tries up to `max_attempts` random identifiers. If every attempt collides,
/// falls back to a serial derived from the current timestamp (microseconds
/// modulo one million) under a random owner prefix, which is returned without
/// a further uniqueness check. This retry-then-fallback policy keeps the
/// helper total; collision handling beyond that belongs to the caller.
pub fn generate_unique<R, F>(rng: &mut R, mut is_taken: F, max_attempts: usize) -> ContainerId
where
    R: Rng + ?Sized,
    F: FnMut(&ContainerId) -> bool,
{
    for _ in 0..max_attempts {
        let candidate = ContainerId::random(rng);
        if !is_taken(&candidate) {
            return candidate;
        }
    }

    let micros = chrono::Utc::now().timestamp_micros().unsigned_abs() % 1_000_000;
    let mut buf = [0u8; 11];
    for slot in buf.iter_mut().take(3) {
        *slot = b'A' + rng.random_range(0..26u8);
    }
    buf[3] = b'U';
    for (i, slot) in buf.iter_mut().take(10).skip(4).enumerate() {
        *slot = b'0' + ((micros / 10u64.pow(5 - i as u32)) % 10) as u8;
    }
    ContainerId::finish(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_check_digit_canonical_example() {
        // CSQU3054383 is the ISO 6346 reference example.
        assert_eq!(check_digit("CSQU", "305438"), Ok(3));
        assert!(ContainerId::parse("CSQU3054383").is_ok());
    }

    #[test]
    fn test_check_digit_known_values() {
        assert_eq!(check_digit("MSKU", "123456"), Ok(5));
        assert!(ContainerId::parse("MSKU1234565").is_ok());
    }

    #[test]
    fn test_check_digit_ten_maps_to_zero() {
        // ABCU001000 sums to 406, and 406 % 11 == 10, which maps to 0.
        assert_eq!(check_digit("ABCU", "001000"), Ok(0));
        assert!(ContainerId::parse("ABCU0010000").is_ok());
    }

    #[test]
    fn test_check_digit_rejects_malformed_input() {
        assert_eq!(check_digit("CSQ", "305438"), Err(IdError::Format));
        assert_eq!(check_digit("CSQU", "30543"), Err(IdError::Format));
        assert_eq!(check_digit("CSQ1", "305438"), Err(IdError::Format));
        assert_eq!(check_digit("CSQU", "30543X"), Err(IdError::Format));
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let lower = ContainerId::parse("csqu3054383").unwrap();
        let upper = ContainerId::parse("CSQU3054383").unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower.as_str(), "CSQU3054383");
    }

    #[test]
    fn test_parse_rejects_bad_format() {
        assert_eq!(ContainerId::parse(""), Err(IdError::Format));
        assert_eq!(ContainerId::parse("CSQU305438"), Err(IdError::Format));
        assert_eq!(ContainerId::parse("CSQU30543833"), Err(IdError::Format));
        assert_eq!(ContainerId::parse("CS1U3054383"), Err(IdError::Format));
        assert_eq!(ContainerId::parse("CSQUA054383"), Err(IdError::Format));
    }

    #[test]
    fn test_parse_rejects_bad_category() {
        // Same letters, but the category position is not 'U'.
        assert_eq!(ContainerId::parse("CSQA3054383"), Err(IdError::Category));
    }

    #[test]
    fn test_parse_rejects_bad_check_digit() {
        assert_eq!(
            ContainerId::parse("CSQU3054384"),
            Err(IdError::CheckDigit { expected: 3 })
        );
    }

    #[test]
    fn test_single_character_mutations_never_validate() {
        let valid = "CSQU3054383";
        for pos in 0..valid.len() {
            let replacement = if pos < 4 { 'X' } else { '9' };
            if valid.as_bytes()[pos] == replacement as u8 {
                continue;
            }
            let mut mutated: Vec<u8> = valid.bytes().collect();
            mutated[pos] = replacement as u8;
            let mutated = String::from_utf8(mutated).unwrap();
            assert!(
                ContainerId::parse(&mutated).is_err(),
                "mutation at {} produced a valid id: {}",
                pos,
                mutated
            );
        }
    }

    #[test]
    fn test_random_ids_always_validate() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            let id = ContainerId::random(&mut rng);
            assert!(ContainerId::parse(id.as_str()).is_ok(), "invalid: {}", id);
            assert_eq!(&id.as_str()[3..4], "U");
        }
    }

    #[test]
    fn test_accessors() {
        let id = ContainerId::parse("MSKU1234565").unwrap();
        assert_eq!(id.owner_code(), "MSKU");
        assert_eq!(id.serial(), "123456");
        assert_eq!(id.check_digit(), 5);
        assert_eq!(format!("{}", id), "MSKU1234565");
    }

    #[test]
    fn test_generate_unique_retries_past_collisions() {
        let mut rng = StdRng::seed_from_u64(7);
        let taken = ContainerId::random(&mut rng);

        let mut rng = StdRng::seed_from_u64(7);
        let id = generate_unique(&mut rng, |c| *c == taken, 10);
        assert_ne!(id, taken);
        assert!(ContainerId::parse(id.as_str()).is_ok());
    }

    #[test]
    fn test_generate_unique_falls_back_when_exhausted() {
        let mut rng = StdRng::seed_from_u64(7);
        // Everything is taken; the timestamp fallback must still yield a
        // well-formed id.
        let id = generate_unique(&mut rng, |_| true, 3);
        assert!(ContainerId::parse(id.as_str()).is_ok());
    }
}
