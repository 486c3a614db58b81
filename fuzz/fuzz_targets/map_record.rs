#![no_main]

use libfuzzer_sys::fuzz_target;
use marc_kbart::output::{rows_to_bytes, OutputFormat};
use marc_kbart::{map_records, MarcReader};

fuzz_target!(|data: &[u8]| {
    let mut reader = MarcReader::new(data);
    let records: Vec<_> = reader.records().map_while(Result::ok).collect();

    let rows = map_records(&records, false);
    assert_eq!(rows.len(), records.len());
    for row in &rows {
        assert!(!row.title_id.is_empty());
        assert!(!row.title_url.is_empty());
    }
    let _ = rows_to_bytes(&rows, OutputFormat::Tsv);
});
