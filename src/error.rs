//! Error types for MARC decoding and KBART output.
//!
//! This module provides the [`MarcError`] type for all library operations
//! and the [`Result`] convenience type.
//!
//! Only two stages can fail: decoding a raw MARC stream into records, and
//! writing rows to an output format. Mapping a decoded record into a KBART
//! row never fails.

use thiserror::Error;

/// Error type for all library operations.
///
/// The decode variants are raised by [`crate::MarcReader`] when a stream
/// cannot be tokenized into records; the output variants come from the
/// KBART serializers.
#[derive(Error, Debug)]
pub enum MarcError {
    /// Error indicating an invalid or malformed MARC record.
    #[error("Invalid MARC record: {0}")]
    InvalidRecord(String),

    /// Error indicating an invalid leader (24-byte header).
    #[error("Invalid leader: {0}")]
    InvalidLeader(String),

    /// Error indicating an invalid field structure.
    #[error("Invalid field: {0}")]
    InvalidField(String),

    /// Error indicating a truncated or incomplete record.
    #[error("Truncated record: {0}")]
    TruncatedRecord(String),

    /// The requested output format name is not one of csv, tsv or xlsx.
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    /// Error from the delimited-text writer.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error from the spreadsheet writer.
    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// IO error from the underlying source/destination.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl MarcError {
    /// Whether this error was raised while decoding MARC input.
    ///
    /// Decode failures are fatal to the whole batch: no partial output is
    /// produced.
    #[must_use]
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            MarcError::InvalidRecord(_)
                | MarcError::InvalidLeader(_)
                | MarcError::InvalidField(_)
                | MarcError::TruncatedRecord(_)
        )
    }
}

/// Convenience type alias for [`std::result::Result`] with [`MarcError`].
pub type Result<T> = std::result::Result<T, MarcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_errors_are_classified() {
        assert!(MarcError::TruncatedRecord("eof".to_string()).is_decode_error());
        assert!(MarcError::InvalidLeader("short".to_string()).is_decode_error());
        assert!(!MarcError::UnsupportedFormat("pdf".to_string()).is_decode_error());
    }

    #[test]
    fn test_display_messages() {
        let err = MarcError::InvalidField("Tag 245: Expected subfield delimiter".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid field: Tag 245: Expected subfield delimiter"
        );
        let err = MarcError::UnsupportedFormat("pdf".to_string());
        assert_eq!(err.to_string(), "Unsupported output format: pdf");
    }
}
