//! Reading MARC records from binary streams.
//!
//! This module provides [`MarcReader`] for reading ISO 2709 formatted MARC records
//! from any source that implements [`std::io::Read`].
//!
//! The reader is strict: a stream that cannot be tokenized into records
//! (truncated data, non-numeric lengths, a directory pointing outside the
//! data area) yields an error, and callers converting a batch abandon the
//! whole batch. Field contents are never validated against MARC 21; missing
//! tags or subfields are the row mapper's concern.
//!
//! # Examples
//!
//! ```no_run
//! use marc_kbart::MarcReader;
//! use std::fs::File;
//!
//! let file = File::open("records.mrc")?;
//! let mut reader = MarcReader::new(file);
//!
//! while let Some(record) = reader.read_record()? {
//!     println!("Leader: {}", record.leader);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::error::{MarcError, Result};
use crate::leader::{Leader, LEADER_LEN};
use crate::record::{Field, Record};
use memchr::memchr2;
use std::io::Read;

/// Terminates the directory and every variable field.
pub const FIELD_TERMINATOR: u8 = 0x1E;
/// Introduces each subfield code.
pub const SUBFIELD_DELIMITER: u8 = 0x1F;
/// Terminates a record.
pub const RECORD_TERMINATOR: u8 = 0x1D;

const DIRECTORY_ENTRY_LEN: usize = 12;

/// Reader for ISO 2709 binary MARC format.
///
/// `MarcReader` reads one MARC record at a time from any source implementing [`std::io::Read`].
/// Records are fully parsed and returned as [`Record`] instances.
#[derive(Debug)]
pub struct MarcReader<R: Read> {
    reader: R,
    records_read: usize,
}

impl<R: Read> MarcReader<R> {
    /// Create a new MARC reader.
    pub fn new(reader: R) -> Self {
        MarcReader {
            reader,
            records_read: 0,
        }
    }

    /// Number of records successfully read so far.
    #[must_use]
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Read a single MARC record.
    ///
    /// Returns `Ok(Some(record))` if a record was successfully read, `Ok(None)` if
    /// the stream ended cleanly between records, or `Err` if a parsing error occurred.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The stream ends inside a record
    /// - The leader or directory is malformed
    /// - A field lies outside the data area or lacks subfield delimiters
    /// - An I/O error occurs
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        let mut leader_bytes = [0u8; LEADER_LEN];
        let got = read_up_to(&mut self.reader, &mut leader_bytes)?;
        if got == 0 {
            return Ok(None);
        }
        if got < LEADER_LEN {
            return Err(MarcError::TruncatedRecord(format!(
                "Record {} ends after {got} bytes of leader",
                self.records_read + 1
            )));
        }

        let leader = Leader::from_bytes(&leader_bytes)?;
        let (record_length, base_address) = leader.validate_for_reading()?;

        let mut record_data = vec![0u8; record_length - LEADER_LEN];
        let got = read_up_to(&mut self.reader, &mut record_data)?;
        if got < record_data.len() {
            return Err(MarcError::TruncatedRecord(format!(
                "Unexpected end of file while reading record {}: expected {} bytes, got {}",
                self.records_read + 1,
                record_length,
                LEADER_LEN + got
            )));
        }

        let record = parse_body(leader, &record_data, base_address - LEADER_LEN)?;
        self.records_read += 1;
        Ok(Some(record))
    }

    /// Read all remaining records into a vector.
    ///
    /// # Errors
    ///
    /// Returns the first decode error; records read before it are discarded.
    pub fn read_all(&mut self) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        while let Some(record) = self.read_record()? {
            records.push(record);
        }
        Ok(records)
    }

    /// Iterate over the remaining records.
    ///
    /// The iterator yields `Err` once and then stops.
    pub fn records(&mut self) -> Records<'_, R> {
        Records {
            reader: self,
            done: false,
        }
    }
}

/// Iterator over the records of a [`MarcReader`].
#[derive(Debug)]
pub struct Records<'a, R: Read> {
    reader: &'a mut MarcReader<R>,
    done: bool,
}

impl<R: Read> Iterator for Records<'_, R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            },
            Err(e) => {
                self.done = true;
                Some(Err(e))
            },
        }
    }
}

/// Decode every record in an in-memory buffer.
///
/// # Errors
///
/// Returns the first decode error encountered.
pub fn read_records(bytes: &[u8]) -> Result<Vec<Record>> {
    MarcReader::new(bytes).read_all()
}

/// Fill `buf` as far as the source allows, returning the number of bytes read.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {},
            Err(e) => return Err(MarcError::IoError(e)),
        }
    }
    Ok(filled)
}

/// Parse directory and data area of a record (everything after the leader).
fn parse_body(leader: Leader, body: &[u8], directory_size: usize) -> Result<Record> {
    let directory = &body[..directory_size];
    let data = &body[directory_size..];

    let mut record = Record::new(leader);

    // Directory entries are 12 bytes each: tag(3) + length(4) + start position(5)
    let mut pos = 0;
    while pos < directory.len() {
        if directory[pos] == FIELD_TERMINATOR {
            break;
        }

        if pos + DIRECTORY_ENTRY_LEN > directory.len() {
            return Err(MarcError::InvalidRecord(
                "Incomplete directory entry".to_string(),
            ));
        }

        let entry = &directory[pos..pos + DIRECTORY_ENTRY_LEN];
        let tag = String::from_utf8_lossy(&entry[0..3]).into_owned();
        let field_length = parse_number(&entry[3..7])?;
        let start_position = parse_number(&entry[7..12])?;
        pos += DIRECTORY_ENTRY_LEN;

        let end_position = start_position + field_length;
        if end_position > data.len() {
            return Err(MarcError::InvalidRecord(format!(
                "Field {tag} exceeds data area"
            )));
        }

        let field_data = &data[start_position..end_position];
        if is_control_tag(&tag) {
            let value = String::from_utf8_lossy(strip_terminator(field_data)).into_owned();
            record.add_control_field(tag, value);
        } else {
            let field = parse_data_field(field_data, &tag)
                .map_err(|e| MarcError::InvalidField(format!("Tag {tag}: {e}")))?;
            record.add_field(field);
        }
    }

    Ok(record)
}

/// Control fields are the numeric tags 001-009.
fn is_control_tag(tag: &str) -> bool {
    tag.len() == 3 && tag.starts_with("00") && tag.bytes().all(|b| b.is_ascii_digit())
}

fn strip_terminator(bytes: &[u8]) -> &[u8] {
    match bytes.split_last() {
        Some((&FIELD_TERMINATOR, rest)) => rest,
        _ => bytes,
    }
}

/// Parse a data field from raw bytes
fn parse_data_field(data: &[u8], tag: &str) -> std::result::Result<Field, String> {
    let data = strip_terminator(data);
    if data.len() < 2 {
        return Err("Data field too short (needs indicators)".to_string());
    }

    let mut field = Field::new(tag.to_string(), data[0] as char, data[1] as char);

    let mut rest = &data[2..];
    while let Some((&first, tail)) = rest.split_first() {
        if first != SUBFIELD_DELIMITER {
            return Err("Expected subfield delimiter".to_string());
        }
        let Some((&code, tail)) = tail.split_first() else {
            break;
        };

        let end = memchr2(SUBFIELD_DELIMITER, FIELD_TERMINATOR, tail).unwrap_or(tail.len());
        field.add_subfield(
            code as char,
            String::from_utf8_lossy(&tail[..end]).into_owned(),
        );

        rest = &tail[end..];
        if rest.first() == Some(&FIELD_TERMINATOR) {
            break;
        }
    }

    Ok(field)
}

/// Parse a fixed-width ASCII number from a directory entry
fn parse_number(bytes: &[u8]) -> Result<usize> {
    bytes.iter().try_fold(0usize, |acc, &byte| {
        if byte.is_ascii_digit() {
            Ok(acc * 10 + usize::from(byte - b'0'))
        } else {
            Err(MarcError::InvalidRecord(format!(
                "Invalid numeric field: expected digits, got byte {}",
                byte as char
            )))
        }
    })
}
