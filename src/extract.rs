//! Derived classification fields of a bibliographic record.
//!
//! Each function here reads one [`Record`] and never fails: a record missing
//! the fields a rule looks at simply falls through to that rule's default.

use std::fmt;

use crate::record::{first_subfield, Record};
use serde::{Deserialize, Serialize};

/// Phrases in a 506 restriction note that mark a title as open access.
const OPEN_ACCESS_TERMS: &[&str] = &["unrestricted", "open", "no restrictions"];

/// KBART publication type derived from leader position 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicationType {
    /// Bibliographic level `s`
    Serial,
    /// Bibliographic level `m`
    Monograph,
    /// Any other level, or a leader too short to carry one
    Other,
}

impl PublicationType {
    /// KBART value for this type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PublicationType::Serial => "serial",
            PublicationType::Monograph => "monograph",
            PublicationType::Other => "other",
        }
    }
}

impl fmt::Display for PublicationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// KBART access type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessType {
    /// Freely available
    #[serde(rename = "openaccess")]
    OpenAccess,
    /// Requires a subscription or purchase
    #[serde(rename = "paid")]
    Paid,
}

impl AccessType {
    /// KBART value for this access type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AccessType::OpenAccess => "openaccess",
            AccessType::Paid => "paid",
        }
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Publisher name and publication date, taken from 264 or 260.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublisherInfo {
    /// Subfield 'b', trimmed
    pub publisher_name: String,
    /// Subfield 'c', trimmed
    pub date_online: String,
}

/// Classify a record by its bibliographic level.
///
/// ```
/// use marc_kbart::{classify_publication_type, Leader, PublicationType, Record};
///
/// let record = Record::new(Leader::new("00000cas a2200000   4500"));
/// assert_eq!(classify_publication_type(&record), PublicationType::Serial);
///
/// let short = Record::new(Leader::new("00000"));
/// assert_eq!(classify_publication_type(&short), PublicationType::Other);
/// ```
#[must_use]
pub fn classify_publication_type(record: &Record) -> PublicationType {
    match record.leader.bibliographic_level() {
        Some('s') => PublicationType::Serial,
        Some('m') => PublicationType::Monograph,
        _ => PublicationType::Other,
    }
}

/// Access rules in priority order; the first one that matches decides.
const ACCESS_RULES: &[(fn(&Record) -> bool, AccessType)] = &[
    (has_open_access_note, AccessType::OpenAccess),
    (has_open_access_link, AccessType::OpenAccess),
    (has_subscription_note, AccessType::Paid),
];

/// Classify a record as open access or paid.
///
/// Rules, first match wins:
/// 1. a 506 whose subfield 'a' text mentions "unrestricted", "open" or
///    "no restrictions" (case-insensitive)
/// 2. an 856 with second indicator `0`
/// 3. an 856 whose subfield 'z' mentions "subscription", which confirms paid
/// 4. paid
#[must_use]
pub fn classify_access_type(record: &Record) -> AccessType {
    ACCESS_RULES
        .iter()
        .find(|(matches, _)| matches(record))
        .map_or(AccessType::Paid, |&(_, access)| access)
}

fn has_open_access_note(record: &Record) -> bool {
    record.fields_by_tag("506").any(|field| {
        let note = field.joined_subfields('a').to_lowercase();
        OPEN_ACCESS_TERMS.iter().any(|term| note.contains(term))
    })
}

fn has_open_access_link(record: &Record) -> bool {
    record
        .fields_by_indicator("856", None, Some('0'))
        .next()
        .is_some()
}

fn has_subscription_note(record: &Record) -> bool {
    record.fields_by_tag("856").any(|field| {
        field.has_subfield('z')
            && field
                .joined_subfields('z')
                .to_lowercase()
                .contains("subscription")
    })
}

/// Extract publisher name and publication date.
///
/// Prefers the first 264 with second indicator `1` (publication), falling
/// back to the first 260. Later matching fields are ignored.
#[must_use]
pub fn extract_publisher_info(record: &Record) -> PublisherInfo {
    let source = record
        .fields_by_indicator("264", None, Some('1'))
        .next()
        .or_else(|| record.get_field("260"));

    PublisherInfo {
        publisher_name: first_subfield(source, 'b').unwrap_or("").trim().to_string(),
        date_online: first_subfield(source, 'c').unwrap_or("").trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leader::Leader;
    use crate::record::Field;

    fn record_with(fields: Vec<Field>) -> Record {
        let mut record = Record::new(Leader::default());
        for field in fields {
            record.add_field(field);
        }
        record
    }

    fn field(tag: &str, ind2: char, subfields: &[(char, &str)]) -> Field {
        let mut field = Field::new(tag.to_string(), ' ', ind2);
        for (code, value) in subfields {
            field.add_subfield_str(*code, value);
        }
        field
    }

    #[test]
    fn test_publication_type_from_leader() {
        let cases = [
            ("00000nam a2200000   4500", PublicationType::Monograph),
            ("00000nas a2200000   4500", PublicationType::Serial),
            ("00000nac a2200000   4500", PublicationType::Other),
            ("00000na  a2200000   4500", PublicationType::Other),
        ];
        for (leader, expected) in cases {
            let record = Record::new(Leader::new(leader));
            assert_eq!(classify_publication_type(&record), expected, "{leader}");
        }
    }

    #[test]
    fn test_publication_type_short_or_empty_leader() {
        for leader in ["", "0000", "0000nam"] {
            let record = Record::new(Leader::new(leader));
            assert_eq!(classify_publication_type(&record), PublicationType::Other);
        }
        // Exactly eight characters reaches position 7
        let record = Record::new(Leader::new("0000nams"));
        assert_eq!(classify_publication_type(&record), PublicationType::Serial);
    }

    #[test]
    fn test_access_type_default_paid() {
        assert_eq!(classify_access_type(&record_with(vec![])), AccessType::Paid);
    }

    #[test]
    fn test_access_type_506_terms() {
        for note in [
            "Unrestricted online access",
            "OPEN ACCESS",
            "No restrictions on access",
        ] {
            let record = record_with(vec![field("506", ' ', &[('a', note)])]);
            assert_eq!(classify_access_type(&record), AccessType::OpenAccess, "{note}");
        }

        let record = record_with(vec![field("506", ' ', &[('a', "Access restricted to members")])]);
        assert_eq!(classify_access_type(&record), AccessType::Paid);
    }

    #[test]
    fn test_access_type_506_joins_repeated_subfields() {
        let record = record_with(vec![field("506", ' ', &[('a', "No"), ('a', "restrictions")])]);
        assert_eq!(classify_access_type(&record), AccessType::OpenAccess);
    }

    #[test]
    fn test_access_type_506_outranks_856() {
        let record = record_with(vec![
            field("856", '1', &[('u', "http://x"), ('z', "Subscription required")]),
            field("506", ' ', &[('a', "No restrictions")]),
        ]);
        assert_eq!(classify_access_type(&record), AccessType::OpenAccess);
    }

    #[test]
    fn test_access_type_856_indicator() {
        let record = record_with(vec![
            field("856", '1', &[('u', "http://a")]),
            field("856", '0', &[('u', "http://b")]),
        ]);
        assert_eq!(classify_access_type(&record), AccessType::OpenAccess);
    }

    #[test]
    fn test_access_type_subscription_cannot_override_indicator() {
        let record = record_with(vec![
            field("856", '2', &[('z', "Subscription required")]),
            field("856", '0', &[('u', "http://b")]),
        ]);
        assert_eq!(classify_access_type(&record), AccessType::OpenAccess);
    }

    #[test]
    fn test_access_type_subscription_note() {
        let record = record_with(vec![field("856", '1', &[('z', "Available by SUBSCRIPTION")])]);
        assert_eq!(classify_access_type(&record), AccessType::Paid);
    }

    #[test]
    fn test_publisher_prefers_264_ind2_1() {
        let record = record_with(vec![
            field("260", ' ', &[('b', "Old Press"), ('c', "1999")]),
            field("264", '4', &[('c', "c2019")]),
            field("264", '1', &[('b', " Acme Press "), ('c', "2020 ")]),
            field("264", '1', &[('b', "Later Press"), ('c', "2021")]),
        ]);
        let info = extract_publisher_info(&record);
        assert_eq!(info.publisher_name, "Acme Press");
        assert_eq!(info.date_online, "2020");
    }

    #[test]
    fn test_publisher_falls_back_to_first_260() {
        let record = record_with(vec![
            field("264", '3', &[('b', "Printer")]),
            field("260", ' ', &[('b', "First"), ('c', "1990")]),
            field("260", ' ', &[('b', "Second"), ('c', "1991")]),
        ]);
        let info = extract_publisher_info(&record);
        assert_eq!(info.publisher_name, "First");
        assert_eq!(info.date_online, "1990");
    }

    #[test]
    fn test_publisher_missing_subfields_are_empty() {
        let record = record_with(vec![field("264", '1', &[('a', "New York")])]);
        assert_eq!(extract_publisher_info(&record), PublisherInfo::default());

        assert_eq!(
            extract_publisher_info(&record_with(vec![])),
            PublisherInfo::default()
        );
    }

    #[test]
    fn test_display_values() {
        assert_eq!(PublicationType::Other.to_string(), "other");
        assert_eq!(AccessType::OpenAccess.to_string(), "openaccess");
        assert_eq!(AccessType::Paid.as_str(), "paid");
    }
}
