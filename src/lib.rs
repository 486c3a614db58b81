#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # marc-kbart
//!
//! Converts MARC bibliographic records in ISO 2709 binary format into KBART
//! holdings rows, and writes those rows as CSV, TSV or XLSX.
//!
//! ## Quick Start
//!
//! ```no_run
//! use marc_kbart::{marc_to_row, MarcReader};
//! use std::fs::File;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let file = File::open("records.mrc")?;
//! let mut reader = MarcReader::new(file);
//!
//! while let Some(record) = reader.read_record()? {
//!     let row = marc_to_row(&record);
//!     println!("{}\t{}", row.title_id, row.publication_title);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`record`]: MARC record structures (`Record`, `Field`, `Subfield`)
//! - [`leader`]: MARC record leader
//! - [`reader`]: Reading MARC records from binary data streams
//! - [`normalize`]: Text cleanup for output values
//! - [`extract`]: Publication type, access type and publisher extraction
//! - [`kbart`]: KBART columns and the record-to-row mapping
//! - [`output`]: CSV, TSV and XLSX serialization
//! - [`convert`]: End-to-end conversion pipeline
//! - [`error`]: Error types and result type

pub mod convert;
pub mod error;
pub mod extract;
pub mod kbart;
pub mod leader;
pub mod normalize;
pub mod output;
pub mod reader;
/// MARC record structures (`Record`, `Field`, `Subfield`)
pub mod record;

pub use convert::{convert_bytes, convert_reader, ConversionOutput, ConvertConfig};
pub use error::{MarcError, Result};
pub use extract::{
    classify_access_type, classify_publication_type, extract_publisher_info, AccessType,
    PublicationType, PublisherInfo,
};
pub use kbart::{map_records, marc_to_row, KbartColumn, KbartRow};
pub use leader::Leader;
pub use normalize::normalize;
pub use output::OutputFormat;
pub use reader::{read_records, MarcReader};
pub use record::{first_subfield, Field, FieldBuilder, Record, RecordBuilder, Subfield};
