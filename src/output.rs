//! KBART file serialization.
//!
//! Rows are written under the fixed 25-column KBART header in one of three
//! formats:
//!
//! - **CSV**: comma-delimited, quoted where needed
//! - **TSV**: tab-delimited, the usual KBART interchange form
//! - **XLSX**: a single-sheet Excel workbook
//!
//! Columns the row mapper does not fill are written with
//! [`KbartColumn::default_value`].
//!
//! # Examples
//!
//! ```
//! use marc_kbart::output::{rows_to_bytes, OutputFormat};
//! use marc_kbart::{marc_to_row, Leader, Record};
//!
//! let rows = vec![marc_to_row(&Record::new(Leader::default()))];
//! let tsv = rows_to_bytes(&rows, OutputFormat::Tsv)?;
//! assert!(tsv.starts_with(b"publication_title\tprint_identifier\t"));
//! # Ok::<(), marc_kbart::MarcError>(())
//! ```

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use crate::error::{MarcError, Result};
use crate::kbart::{header, KbartRow};
use csv::{QuoteStyle, WriterBuilder};
use rust_xlsxwriter::{Format, Workbook, XlsxError};

/// Name of the single worksheet in XLSX output.
pub const SHEET_NAME: &str = "KBART";

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// Comma-separated values
    #[default]
    Csv,
    /// Tab-separated values (KBART)
    Tsv,
    /// Excel workbook
    Xlsx,
}

impl OutputFormat {
    /// File extension for this format, without the dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Tsv => "tsv",
            OutputFormat::Xlsx => "xlsx",
        }
    }

    /// Whether the format is plain text that can be streamed to a terminal.
    #[must_use]
    pub fn is_text(self) -> bool {
        !matches!(self, OutputFormat::Xlsx)
    }

    fn delimiter(self) -> u8 {
        match self {
            OutputFormat::Tsv => b'\t',
            _ => b',',
        }
    }
}

impl FromStr for OutputFormat {
    type Err = MarcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "tsv" | "kbart" => Ok(OutputFormat::Tsv),
            "xlsx" | "excel" => Ok(OutputFormat::Xlsx),
            other => Err(MarcError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Write `rows` to `writer` in `format`, header first.
///
/// # Errors
///
/// Returns an error if the destination fails or the workbook cannot be
/// assembled (for example more rows than a worksheet holds).
pub fn write_rows<W: Write>(rows: &[KbartRow], format: OutputFormat, mut writer: W) -> Result<()> {
    match format {
        OutputFormat::Csv | OutputFormat::Tsv => write_delimited(rows, format.delimiter(), writer),
        OutputFormat::Xlsx => {
            let bytes = build_workbook(rows)?;
            writer.write_all(&bytes)?;
            writer.flush()?;
            Ok(())
        },
    }
}

/// Serialize `rows` into an in-memory buffer.
///
/// # Errors
///
/// See [`write_rows`].
pub fn rows_to_bytes(rows: &[KbartRow], format: OutputFormat) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_rows(rows, format, &mut buffer)?;
    Ok(buffer)
}

fn write_delimited<W: Write>(rows: &[KbartRow], delimiter: u8, writer: W) -> Result<()> {
    let mut csv_writer = WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .from_writer(writer);

    csv_writer.write_record(header())?;
    for row in rows {
        csv_writer.write_record(row.cells())?;
    }
    csv_writer.flush()?;
    Ok(())
}

fn build_workbook(rows: &[KbartRow]) -> std::result::Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, name) in (0u16..).zip(header()) {
        worksheet.write_string_with_format(0, col, name, &bold)?;
    }
    for (row_num, row) in (1u32..).zip(rows) {
        for (col, cell) in (0u16..).zip(row.cells()) {
            worksheet.write_string(row_num, col, cell)?;
        }
    }

    workbook.save_to_buffer()
}
