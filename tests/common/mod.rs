//! Common test helpers shared across the integration test suite.

#![allow(dead_code)]

use marc_kbart::{Field, Leader, Record};

const FIELD_TERMINATOR: u8 = 0x1E;
const SUBFIELD_DELIMITER: u8 = 0x1F;
const RECORD_TERMINATOR: u8 = 0x1D;

/// Creates a monograph leader (`m` at position 7).
pub fn monograph_leader() -> Leader {
    Leader::new("00000nam a2200000 i 4500")
}

/// Creates a serial leader (`s` at position 7).
pub fn serial_leader() -> Leader {
    Leader::new("00000cas a2200000 i 4500")
}

/// Shorthand for a data field with blank first indicator.
pub fn field(tag: &str, ind2: char, subfields: &[(char, &str)]) -> Field {
    let mut field = Field::new(tag.to_string(), ' ', ind2);
    for (code, value) in subfields {
        field.add_subfield_str(*code, value);
    }
    field
}

/// The end-to-end example record: an open access monograph with every mapped
/// field present.
pub fn create_test_book() -> Record {
    Record::builder(monograph_leader())
        .control_field_str("001", "urn:uuid:0f6a1b2c")
        .field(field("020", ' ', &[('a', "978-0-00-000000-0")]))
        .field(field("100", ' ', &[('a', "Jane Doe")]))
        .field(field("245", '0', &[('a', "Test Book"), ('b', "A Novel")]))
        .field(field("264", '1', &[('b', "Acme Press"), ('c', "2020")]))
        .field(field("856", '0', &[('u', "http://example.org/book")]))
        .build()
}

/// A record carrying nothing but a leader.
pub fn create_bare_record(leader: &str) -> Record {
    Record::new(Leader::new(leader))
}

/// Encode a record as ISO 2709 bytes.
///
/// Control fields are written before data fields; data fields keep the
/// record's grouping order.
pub fn encode_record(record: &Record) -> Vec<u8> {
    let mut entries: Vec<(String, Vec<u8>)> = Vec::new();
    for (tag, value) in &record.control_fields {
        entries.push((tag.clone(), value.as_bytes().to_vec()));
    }
    for field in record.fields() {
        let mut body = Vec::new();
        body.extend_from_slice(field.indicator1.to_string().as_bytes());
        body.extend_from_slice(field.indicator2.to_string().as_bytes());
        for subfield in &field.subfields {
            body.push(SUBFIELD_DELIMITER);
            body.extend_from_slice(subfield.code.to_string().as_bytes());
            body.extend_from_slice(subfield.value.as_bytes());
        }
        entries.push((field.tag.clone(), body));
    }

    let mut directory = Vec::new();
    let mut data = Vec::new();
    for (tag, body) in &entries {
        let start = data.len();
        data.extend_from_slice(body);
        data.push(FIELD_TERMINATOR);
        directory.extend_from_slice(tag.as_bytes());
        directory.extend_from_slice(format!("{:04}", data.len() - start).as_bytes());
        directory.extend_from_slice(format!("{start:05}").as_bytes());
    }
    directory.push(FIELD_TERMINATOR);

    let base_address = 24 + directory.len();
    let record_length = base_address + data.len() + 1;

    let leader = record.leader.as_str();
    let mut bytes = Vec::with_capacity(record_length);
    bytes.extend_from_slice(format!("{record_length:05}").as_bytes());
    bytes.extend_from_slice(&leader.as_bytes()[5..12]);
    bytes.extend_from_slice(format!("{base_address:05}").as_bytes());
    bytes.extend_from_slice(&leader.as_bytes()[17..24]);
    bytes.extend_from_slice(&directory);
    bytes.extend_from_slice(&data);
    bytes.push(RECORD_TERMINATOR);
    bytes
}

/// Encode several records back to back.
pub fn encode_records(records: &[Record]) -> Vec<u8> {
    records.iter().flat_map(encode_record).collect()
}
