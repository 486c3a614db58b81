//! MARC record leader.
//!
//! The MARC leader is a 24-byte fixed-length field at the start of every MARC record.
//! It contains metadata describing the record's structure, content type, and encoding.
//!
//! # Structure
//!
//! - Positions 0-4: Record length (5 digits)
//! - Position 5: Record status
//! - Position 6: Record type (a = language material, c = music, etc.)
//! - Position 7: Bibliographic level (m = monograph, s = serial, etc.)
//! - Position 8: Control record type
//! - Position 9: Character coding (space = MARC-8, a = UTF-8)
//! - Position 10: Indicator count (usually 2)
//! - Position 11: Subfield code count (usually 2)
//! - Positions 12-16: Base address of data (5 digits)
//! - Positions 17-19: Encoding level, cataloging form, multipart level
//! - Positions 20-23: Reserved (usually "4500")
//!
//! Unlike the reader, which insists on a well-formed 24-byte header, a
//! [`Leader`] held by an in-memory [`crate::Record`] may be any string. All
//! positional accessors return `None` rather than failing when the leader is
//! too short.

use std::fmt;

use crate::error::{MarcError, Result};
use serde::{Deserialize, Serialize};

/// Length of a well-formed leader in bytes.
pub const LEADER_LEN: usize = 24;

const BIBLIOGRAPHIC_LEVEL: usize = 7;

/// MARC Leader, kept verbatim as it appeared in the source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Leader(String);

impl Leader {
    /// Wrap a leader string without validating it.
    pub fn new(value: impl Into<String>) -> Self {
        Leader(value.into())
    }

    /// Parse a leader from the first 24 bytes of a binary record.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than 24 bytes are given, if any of them is
    /// not ASCII, or if the record length or base address slots are not
    /// numeric.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < LEADER_LEN {
            return Err(MarcError::InvalidLeader(format!(
                "Leader must be at least 24 bytes, got {}",
                bytes.len()
            )));
        }

        let bytes = &bytes[..LEADER_LEN];
        if let Some(pos) = bytes.iter().position(|b| !b.is_ascii()) {
            return Err(MarcError::InvalidLeader(format!(
                "Non-ASCII byte 0x{:02X} at leader position {pos}",
                bytes[pos]
            )));
        }
        parse_digits(&bytes[0..5])?;
        parse_digits(&bytes[12..17])?;

        Ok(Leader(bytes.iter().copied().map(char::from).collect()))
    }

    /// The leader text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Character at `position`, or `None` if the leader is shorter.
    #[must_use]
    pub fn char_at(&self, position: usize) -> Option<char> {
        self.0.chars().nth(position)
    }

    /// Bibliographic level (position 7).
    #[must_use]
    pub fn bibliographic_level(&self) -> Option<char> {
        self.char_at(BIBLIOGRAPHIC_LEVEL)
    }

    /// Record length (positions 0-4), if present and numeric.
    #[must_use]
    pub fn record_length(&self) -> Option<usize> {
        self.numeric_slot(0..5)
    }

    /// Base address of data (positions 12-16), if present and numeric.
    #[must_use]
    pub fn data_base_address(&self) -> Option<usize> {
        self.numeric_slot(12..17)
    }

    fn numeric_slot(&self, range: std::ops::Range<usize>) -> Option<usize> {
        self.0
            .as_bytes()
            .get(range)
            .and_then(|bytes| parse_digits(bytes).ok())
    }

    /// Validate that the leader is suitable for binary record reading.
    ///
    /// Returns the record length and base address of data. Both must be at
    /// least 24, and the base address cannot lie beyond the end of the record.
    ///
    /// # Errors
    ///
    /// Returns an error if either slot is missing, non-numeric or out of range.
    pub fn validate_for_reading(&self) -> Result<(usize, usize)> {
        let record_length = self.record_length().ok_or_else(|| {
            MarcError::InvalidLeader(format!("Invalid record length in '{}'", self.0))
        })?;
        let base_address = self.data_base_address().ok_or_else(|| {
            MarcError::InvalidLeader(format!("Invalid base address of data in '{}'", self.0))
        })?;

        if record_length < LEADER_LEN {
            return Err(MarcError::InvalidLeader(format!(
                "Record length must be at least 24, got {record_length}"
            )));
        }
        if base_address < LEADER_LEN {
            return Err(MarcError::InvalidLeader(format!(
                "Base address of data must be at least 24, got {base_address}"
            )));
        }
        if base_address > record_length {
            return Err(MarcError::InvalidLeader(format!(
                "Base address of data {base_address} exceeds record length {record_length}"
            )));
        }
        Ok((record_length, base_address))
    }
}

impl Default for Leader {
    fn default() -> Self {
        Leader("00000nam a2200000   4500".to_string())
    }
}

impl fmt::Display for Leader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Leader {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Leader {
    fn from(value: &str) -> Self {
        Leader::new(value)
    }
}

impl From<String> for Leader {
    fn from(value: String) -> Self {
        Leader(value)
    }
}

/// Parse 5-digit ASCII number from bytes
fn parse_digits(bytes: &[u8]) -> Result<usize> {
    if bytes.len() != 5 {
        return Err(MarcError::InvalidLeader(format!(
            "Expected 5-digit field, got {} bytes",
            bytes.len()
        )));
    }

    bytes.iter().try_fold(0usize, |acc, &byte| {
        if byte.is_ascii_digit() {
            Ok(acc * 10 + usize::from(byte - b'0'))
        } else {
            Err(MarcError::InvalidLeader(format!(
                "Invalid numeric field: '{}'",
                String::from_utf8_lossy(bytes)
            )))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_leader() {
        let leader = Leader::from_bytes(b"01234nam a2200289 i 4500").unwrap();
        assert_eq!(leader.record_length(), Some(1234));
        assert_eq!(leader.data_base_address(), Some(289));
        assert_eq!(leader.bibliographic_level(), Some('m'));
    }

    #[test]
    fn test_parse_leader_ignores_trailing_bytes() {
        let leader = Leader::from_bytes(b"00100cas a2200049   4500extra").unwrap();
        assert_eq!(leader.as_str(), "00100cas a2200049   4500");
        assert_eq!(leader.bibliographic_level(), Some('s'));
    }

    #[test]
    fn test_leader_too_short() {
        let err = Leader::from_bytes(b"00100nam").unwrap_err();
        assert!(err.to_string().contains("at least 24 bytes"));
    }

    #[test]
    fn test_non_ascii_leader_rejected() {
        let mut bytes = b"00100".to_vec();
        bytes.extend_from_slice("\u{e9}m a2200049   4500".as_bytes());
        let err = Leader::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, MarcError::InvalidLeader(_)));
        assert!(err.to_string().contains("position 5"));
    }

    #[test]
    fn test_non_numeric_length() {
        let err = Leader::from_bytes(b"0x100nam a2200049   4500").unwrap_err();
        assert!(matches!(err, MarcError::InvalidLeader(_)));
    }

    #[test]
    fn test_short_leader_accessors_return_none() {
        let leader = Leader::new("00");
        assert_eq!(leader.bibliographic_level(), None);
        assert_eq!(leader.record_length(), None);
        assert_eq!(leader.data_base_address(), None);
        assert!(leader.validate_for_reading().is_err());
    }

    #[test]
    fn test_validate_for_reading() {
        let leader = Leader::new("00050nam a2200025   4500");
        assert_eq!(leader.validate_for_reading().unwrap(), (50, 25));

        let err = Leader::new("00010nam a2200025   4500")
            .validate_for_reading()
            .unwrap_err();
        assert!(err.to_string().contains("Record length must be at least 24"));

        let err = Leader::new("00050nam a2200010   4500")
            .validate_for_reading()
            .unwrap_err();
        assert!(err
            .to_string()
            .contains("Base address of data must be at least 24"));

        let err = Leader::new("00030nam a2200040   4500")
            .validate_for_reading()
            .unwrap_err();
        assert!(err.to_string().contains("exceeds record length"));
    }

    #[test]
    fn test_default_leader_is_monograph() {
        let leader = Leader::default();
        assert_eq!(leader.as_str().len(), LEADER_LEN);
        assert_eq!(leader.bibliographic_level(), Some('m'));
    }
}
