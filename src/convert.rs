//! End-to-end conversion from a MARC stream to a KBART file.
//!
//! The pipeline decodes the whole input first, so a stream that fails to
//! decode produces an error and no output at all. Decoded records are then
//! mapped (optionally in parallel) and serialized as one batch.
//!
//! # Examples
//!
//! ```no_run
//! use marc_kbart::convert::{convert_bytes, ConvertConfig};
//! use marc_kbart::output::OutputFormat;
//!
//! let marc = std::fs::read("records.mrc")?;
//! let config = ConvertConfig::default().with_format(OutputFormat::Tsv);
//! let output = convert_bytes(&marc, &config)?;
//! std::fs::write("holdings.tsv", &output.bytes)?;
//! println!("{} titles", output.rows);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::io::Read;
use std::time::Instant;

use crate::error::Result;
use crate::kbart::{map_records, KbartRow};
use crate::output::{rows_to_bytes, OutputFormat};
use crate::reader::MarcReader;
use crate::record::Record;
use tracing::{debug, info, warn};

/// Settings for one conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertConfig {
    /// Output format
    pub format: OutputFormat,
    /// Map records on the rayon thread pool
    pub parallel: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        ConvertConfig {
            format: OutputFormat::Csv,
            parallel: true,
        }
    }
}

impl ConvertConfig {
    /// Set the output format.
    #[must_use]
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Enable or disable parallel mapping.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Result of a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutput {
    /// Number of data rows written (excluding the header)
    pub rows: usize,
    /// Serialized file contents
    pub bytes: Vec<u8>,
}

/// Decode every record from `source`.
///
/// # Errors
///
/// Returns the first decode error; no records are returned in that case.
pub fn read_batch<R: Read>(source: R) -> Result<Vec<Record>> {
    let started = Instant::now();
    let mut reader = MarcReader::new(source);
    let records = match reader.read_all() {
        Ok(records) => records,
        Err(e) => {
            warn!(
                records_read = reader.records_read(),
                error = %e,
                "MARC decode failed, abandoning batch"
            );
            return Err(e);
        },
    };
    debug!(
        records = records.len(),
        elapsed_ms = started.elapsed().as_millis(),
        "decoded MARC records"
    );
    Ok(records)
}

/// Map decoded records to KBART rows in source order.
#[must_use]
pub fn rows_from_records(records: &[Record], parallel: bool) -> Vec<KbartRow> {
    let started = Instant::now();
    let rows = map_records(records, parallel);

    let untitled = rows
        .iter()
        .filter(|row| row.publication_title.is_empty())
        .count();
    if untitled > 0 {
        warn!(untitled, "records without a 245 title");
    }
    debug!(
        rows = rows.len(),
        parallel,
        elapsed_ms = started.elapsed().as_millis(),
        "mapped records to KBART rows"
    );
    rows
}

/// Convert a MARC stream into a serialized KBART file.
///
/// # Errors
///
/// Returns an error if the stream cannot be decoded or the output cannot be
/// written.
pub fn convert_reader<R: Read>(source: R, config: &ConvertConfig) -> Result<ConversionOutput> {
    let records = read_batch(source)?;
    let rows = rows_from_records(&records, config.parallel);
    drop(records);

    let bytes = rows_to_bytes(&rows, config.format)?;
    info!(
        rows = rows.len(),
        format = %config.format,
        bytes = bytes.len(),
        "KBART conversion complete"
    );
    Ok(ConversionOutput {
        rows: rows.len(),
        bytes,
    })
}

/// Convert an in-memory MARC buffer into a serialized KBART file.
///
/// # Errors
///
/// See [`convert_reader`].
pub fn convert_bytes(marc: &[u8], config: &ConvertConfig) -> Result<ConversionOutput> {
    convert_reader(marc, config)
}
