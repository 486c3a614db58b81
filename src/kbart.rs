//! KBART row mapping.
//!
//! [`marc_to_row`] turns one MARC [`Record`] into a [`KbartRow`], the ten
//! attributes a KBART holdings file can be populated with from catalog data.
//! The remaining KBART columns have no MARC source here; they are filled with
//! [`KbartColumn::default_value`] when the rows are serialized.
//!
//! Mapping never fails. A field, subfield or leader position that is absent
//! resolves to the column's documented default, so one odd record cannot
//! abort a batch.
//!
//! # Examples
//!
//! ```
//! use marc_kbart::{marc_to_row, Field, Leader, Record};
//!
//! let record = Record::builder(Leader::default())
//!     .field(
//!         Field::builder("245".to_string(), '1', '0')
//!             .subfield_str('a', "Test Book")
//!             .subfield_str('b', "A Novel")
//!             .build(),
//!     )
//!     .build();
//!
//! let row = marc_to_row(&record);
//! assert_eq!(row.publication_title, "Test Book A Novel");
//! assert_eq!(row.title_id, "unknown");
//! assert_eq!(row.title_url, "N/A");
//! ```

use std::fmt;

use crate::extract::{classify_access_type, classify_publication_type, extract_publisher_info};
use crate::normalize::normalize;
use crate::record::{first_subfield, Record};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Tags searched for the first author, in priority order.
pub const AUTHOR_TAGS: &[&str] = &["100", "110", "111"];

/// `title_id` when the record has no 001.
pub const UNKNOWN_TITLE_ID: &str = "unknown";

/// `title_url` when no 856 carries a URL.
pub const MISSING_URL: &str = "N/A";

/// Separator between multiple online identifiers.
pub const IDENTIFIER_SEPARATOR: &str = "; ";

/// The 25 KBART columns, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum KbartColumn {
    PublicationTitle,
    PrintIdentifier,
    OnlineIdentifier,
    DateFirstIssueOnline,
    NumFirstVolOnline,
    NumFirstIssueOnline,
    DateLastIssueOnline,
    NumLastVolOnline,
    NumLastIssueOnline,
    TitleUrl,
    FirstAuthor,
    TitleId,
    EmbargoInfo,
    CoverageDepth,
    Notes,
    PublisherName,
    PublicationType,
    DateMonographPublishedPrint,
    DateMonographPublishedOnline,
    MonographVolume,
    MonographEdition,
    FirstEditor,
    ParentPublicationTitleId,
    PrecedingPublicationTitleId,
    AccessType,
}

impl KbartColumn {
    /// Every column in the order the header is written.
    pub const ALL: [KbartColumn; 25] = [
        KbartColumn::PublicationTitle,
        KbartColumn::PrintIdentifier,
        KbartColumn::OnlineIdentifier,
        KbartColumn::DateFirstIssueOnline,
        KbartColumn::NumFirstVolOnline,
        KbartColumn::NumFirstIssueOnline,
        KbartColumn::DateLastIssueOnline,
        KbartColumn::NumLastVolOnline,
        KbartColumn::NumLastIssueOnline,
        KbartColumn::TitleUrl,
        KbartColumn::FirstAuthor,
        KbartColumn::TitleId,
        KbartColumn::EmbargoInfo,
        KbartColumn::CoverageDepth,
        KbartColumn::Notes,
        KbartColumn::PublisherName,
        KbartColumn::PublicationType,
        KbartColumn::DateMonographPublishedPrint,
        KbartColumn::DateMonographPublishedOnline,
        KbartColumn::MonographVolume,
        KbartColumn::MonographEdition,
        KbartColumn::FirstEditor,
        KbartColumn::ParentPublicationTitleId,
        KbartColumn::PrecedingPublicationTitleId,
        KbartColumn::AccessType,
    ];

    /// Header name of the column.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            KbartColumn::PublicationTitle => "publication_title",
            KbartColumn::PrintIdentifier => "print_identifier",
            KbartColumn::OnlineIdentifier => "online_identifier",
            KbartColumn::DateFirstIssueOnline => "date_first_issue_online",
            KbartColumn::NumFirstVolOnline => "num_first_vol_online",
            KbartColumn::NumFirstIssueOnline => "num_first_issue_online",
            KbartColumn::DateLastIssueOnline => "date_last_issue_online",
            KbartColumn::NumLastVolOnline => "num_last_vol_online",
            KbartColumn::NumLastIssueOnline => "num_last_issue_online",
            KbartColumn::TitleUrl => "title_url",
            KbartColumn::FirstAuthor => "first_author",
            KbartColumn::TitleId => "title_id",
            KbartColumn::EmbargoInfo => "embargo_info",
            KbartColumn::CoverageDepth => "coverage_depth",
            KbartColumn::Notes => "notes",
            KbartColumn::PublisherName => "publisher_name",
            KbartColumn::PublicationType => "publication_type",
            KbartColumn::DateMonographPublishedPrint => "date_monograph_published_print",
            KbartColumn::DateMonographPublishedOnline => "date_monograph_published_online",
            KbartColumn::MonographVolume => "monograph_volume",
            KbartColumn::MonographEdition => "monograph_edition",
            KbartColumn::FirstEditor => "first_editor",
            KbartColumn::ParentPublicationTitleId => "parent_publication_title_id",
            KbartColumn::PrecedingPublicationTitleId => "preceding_publication_title_id",
            KbartColumn::AccessType => "access_type",
        }
    }

    /// Value written when a row has nothing for this column.
    ///
    /// Note that `publication_type` defaults to `monograph` here, while the
    /// classifier itself reports `other` for an unrecognised leader. Only an
    /// empty value is replaced.
    #[must_use]
    pub fn default_value(self) -> &'static str {
        match self {
            KbartColumn::CoverageDepth => "fulltext",
            KbartColumn::PublicationType => "monograph",
            KbartColumn::AccessType => "paid",
            _ => "",
        }
    }
}

impl fmt::Display for KbartColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The header row shared by every output format.
#[must_use]
pub fn header() -> [&'static str; 25] {
    KbartColumn::ALL.map(KbartColumn::name)
}

/// One KBART row mapped from a MARC record.
///
/// Every attribute is always present; absence is an empty string or the
/// documented literal, never a missing value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KbartRow {
    /// Control field 001, or `unknown`
    pub title_id: String,
    /// 245 $a and $b
    pub publication_title: String,
    /// First 100/110/111 $a
    pub first_author: String,
    /// First 700 $a whose relator ($e) mentions an editor
    pub first_editor: String,
    /// Every 020 $a, joined with `; `
    pub online_identifier: String,
    /// 264 (second indicator 1) or 260 $b
    pub publisher_name: String,
    /// 264 (second indicator 1) or 260 $c
    pub date_monograph_published_online: String,
    /// First 856 $u, or `N/A`
    pub title_url: String,
    /// `serial`, `monograph` or `other`
    pub publication_type: String,
    /// `openaccess` or `paid`
    pub access_type: String,
}

impl KbartRow {
    /// Value of `column`, or `None` for columns the mapper does not produce.
    #[must_use]
    pub fn get(&self, column: KbartColumn) -> Option<&str> {
        let value = match column {
            KbartColumn::TitleId => &self.title_id,
            KbartColumn::PublicationTitle => &self.publication_title,
            KbartColumn::FirstAuthor => &self.first_author,
            KbartColumn::FirstEditor => &self.first_editor,
            KbartColumn::OnlineIdentifier => &self.online_identifier,
            KbartColumn::PublisherName => &self.publisher_name,
            KbartColumn::DateMonographPublishedOnline => &self.date_monograph_published_online,
            KbartColumn::TitleUrl => &self.title_url,
            KbartColumn::PublicationType => &self.publication_type,
            KbartColumn::AccessType => &self.access_type,
            _ => return None,
        };
        Some(value)
    }

    /// Cell text for `column`, falling back to the column default.
    #[must_use]
    pub fn cell(&self, column: KbartColumn) -> &str {
        match self.get(column) {
            Some(value) if !value.is_empty() => value,
            _ => column.default_value(),
        }
    }

    /// All 25 cells in header order.
    #[must_use]
    pub fn cells(&self) -> [&str; 25] {
        KbartColumn::ALL.map(|column| self.cell(column))
    }
}

/// Map one MARC record to a KBART row.
#[must_use]
pub fn marc_to_row(record: &Record) -> KbartRow {
    let title_id = record
        .get_control_field("001")
        .map_or_else(|| UNKNOWN_TITLE_ID.to_string(), |id| normalize(Some(id)));

    let publisher = extract_publisher_info(record);

    KbartRow {
        title_id,
        publication_title: publication_title(record),
        first_author: first_author(record),
        first_editor: first_editor(record),
        online_identifier: online_identifier(record),
        publisher_name: normalize(Some(&publisher.publisher_name)),
        date_monograph_published_online: normalize(Some(&publisher.date_online)),
        title_url: title_url(record),
        publication_type: classify_publication_type(record).to_string(),
        access_type: classify_access_type(record).to_string(),
    }
}

/// Map a batch of records, preserving input order.
///
/// With `parallel` set, records are mapped on the rayon thread pool; the
/// returned rows still line up index-for-index with `records`.
#[must_use]
pub fn map_records(records: &[Record], parallel: bool) -> Vec<KbartRow> {
    if parallel {
        records.par_iter().map(marc_to_row).collect()
    } else {
        records.iter().map(marc_to_row).collect()
    }
}

fn publication_title(record: &Record) -> String {
    let field = record.get_field("245");
    let title = first_subfield(field, 'a').unwrap_or("");
    let remainder = first_subfield(field, 'b').unwrap_or("");
    normalize(Some(format!("{title} {remainder}").trim()))
}

fn first_author(record: &Record) -> String {
    for tag in AUTHOR_TAGS {
        for field in record.fields_by_tag(tag) {
            if let Some(name) = field.get_subfield('a').filter(|name| !name.is_empty()) {
                return normalize(Some(name));
            }
        }
    }
    String::new()
}

fn first_editor(record: &Record) -> String {
    record
        .fields_by_tag("700")
        .find(|field| {
            field.has_subfield('e') && field.joined_subfields('e').to_lowercase().contains("editor")
        })
        .map(|field| normalize(field.get_subfield('a')))
        .unwrap_or_default()
}

fn online_identifier(record: &Record) -> String {
    record
        .fields_by_tag("020")
        .filter_map(|field| field.get_subfield('a'))
        .filter(|isbn| !isbn.is_empty())
        .map(|isbn| normalize(Some(isbn)))
        .collect::<Vec<_>>()
        .join(IDENTIFIER_SEPARATOR)
}

fn title_url(record: &Record) -> String {
    record
        .fields_by_tag("856")
        .find_map(|field| field.get_subfield('u').filter(|url| !url.is_empty()))
        .map_or_else(|| MISSING_URL.to_string(), |url| normalize(Some(url)))
}
