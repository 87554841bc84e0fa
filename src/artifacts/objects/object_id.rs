//! Git object identifier (SHA-1 hash)
//!
//! Object IDs are 20 raw bytes, displayed as 40 lowercase hexadecimal
//! characters. They key the commit cache and are passed to git as arguments.
//!
//! ## Format
//!
//! - Full: 40 hex characters (e.g., "abc123...def")
//! - Short: First 7 characters (e.g., "abc123")
//!
//! Any other length, or a non-hex character, is a parse failure. Nothing is
//! ever truncated or padded.

use crate::artifacts::objects::{OBJECT_ID_BYTES, OBJECT_ID_LENGTH};
use crate::errors::{GitError, Result};
use std::str::FromStr;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Git object identifier (SHA-1 hash)
///
/// Immutable once built. Ordering and hashing follow the raw bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectId([u8; OBJECT_ID_BYTES]);

impl ObjectId {
    /// Build from raw bytes, which must be exactly 20 long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let raw: [u8; OBJECT_ID_BYTES] = bytes.try_into().map_err(|_| {
            GitError::parse(
                "object id",
                format!("expected {OBJECT_ID_BYTES} bytes, got {}", bytes.len()),
            )
        })?;

        Ok(Self(raw))
    }

    /// Parse and validate an object ID from its hex form
    ///
    /// # Arguments
    ///
    /// * `id` - 40-character hexadecimal string
    ///
    /// # Returns
    ///
    /// Validated ObjectId or error if invalid length/characters
    pub fn try_parse(id: &str) -> Result<Self> {
        if id.len() != OBJECT_ID_LENGTH {
            return Err(GitError::parse(
                "object id",
                format!("length {} in {id:?}", id.len()),
            ));
        }

        let mut raw = [0u8; OBJECT_ID_BYTES];
        for (byte, pair) in raw.iter_mut().zip(id.as_bytes().chunks_exact(2)) {
            let (Some(high), Some(low)) = (hex_value(pair[0]), hex_value(pair[1])) else {
                return Err(GitError::parse(
                    "object id",
                    format!("non-hex characters in {id:?}"),
                ));
            };
            *byte = (high << 4) | low;
        }

        Ok(Self(raw))
    }

    pub fn as_bytes(&self) -> &[u8; OBJECT_ID_BYTES] {
        &self.0
    }

    /// Lowercase 40-character hex form
    pub fn to_hex(&self) -> String {
        let mut hex = String::with_capacity(OBJECT_ID_LENGTH);
        for byte in self.0 {
            hex.push(HEX_DIGITS[(byte >> 4) as usize] as char);
            hex.push(HEX_DIGITS[(byte & 0x0f) as usize] as char);
        }
        hex
    }

    /// Get abbreviated form of the object ID
    ///
    /// # Returns
    ///
    /// First 7 characters of the hash (standard Git abbreviation)
    pub fn to_short_oid(&self) -> String {
        let mut hex = self.to_hex();
        hex.truncate(7);
        hex
    }
}

fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}

impl FromStr for ObjectId {
    type Err = GitError;

    fn from_str(s: &str) -> Result<Self> {
        Self::try_parse(s)
    }
}

impl TryFrom<&[u8]> for ObjectId {
    type Error = GitError;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes(bytes)
    }
}

impl AsRef<[u8]> for ObjectId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::proptest;

    proptest! {
        #[test]
        fn hex_round_trips_to_the_same_lowercase_string(id in "[0-9a-f]{40}") {
            let oid = ObjectId::try_parse(&id).unwrap();
            assert_eq!(oid.to_string(), id);
        }

        #[test]
        fn wrong_length_is_rejected(id in "[0-9a-f]{0,39}|[0-9a-f]{41,60}") {
            assert!(ObjectId::try_parse(&id).is_err());
        }

        #[test]
        fn non_hex_is_rejected(prefix in "[0-9a-f]{0,39}", bad in "[g-zG-Z_ -]") {
            let mut id = format!("{prefix}{bad}");
            while id.len() < OBJECT_ID_LENGTH {
                id.push('0');
            }
            assert!(ObjectId::try_parse(&id).is_err());
        }

        #[test]
        fn raw_bytes_round_trip(bytes in proptest::array::uniform20(0u8..)) {
            let oid = ObjectId::from_bytes(&bytes).unwrap();
            assert_eq!(oid.as_bytes(), &bytes);
            assert_eq!(ObjectId::try_parse(&oid.to_hex()).unwrap(), oid);
        }
    }

    #[test]
    fn raw_bytes_must_be_twenty_long() {
        assert!(ObjectId::from_bytes(&[0u8; 19]).is_err());
        assert!(ObjectId::from_bytes(&[0u8; 21]).is_err());
    }

    #[test]
    fn uppercase_input_is_normalized() {
        let oid = ObjectId::try_parse("D86A90F801DBE279DB095437A8C7EA42C60E8D98").unwrap();
        assert_eq!(oid.to_string(), "d86a90f801dbe279db095437a8c7ea42c60e8d98");
        assert_eq!(oid.to_short_oid(), "d86a90f");
    }
}
