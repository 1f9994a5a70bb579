#![no_main]

use exfor_doi::pipeline::retriever::surname;
use exfor_doi::similarity::{similarity, title_case};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let (a, b) = text.split_at(text.char_indices().nth(text.chars().count() / 2).map_or(0, |(i, _)| i));

    let ratio = similarity(&title_case(a), b);
    assert!((0.0..=1.0).contains(&ratio));
    let _ = surname(a);
});
