#![no_main]

use exfor_doi::models::WorksResponse;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Decoding may fail but must not panic, nor may candidate extraction
    if let Ok(response) = serde_json::from_slice::<WorksResponse>(data) {
        for item in response.into_items() {
            let _ = item.into_candidate();
        }
    }
});
