#![no_main]

use exfor_doi::models::SourceRecord;
use exfor_doi::pipeline::retriever::build_query;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(records) = serde_json::from_slice::<Vec<SourceRecord>>(data) {
        for record in &records {
            let _ = build_query(record, 5);
        }
    }
});
