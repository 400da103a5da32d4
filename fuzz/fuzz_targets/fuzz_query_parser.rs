#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parsing must never panic, and every kept term needs a non-empty stem
    let query = sphindex::query::parse_query(data);
    assert!(query.required.iter().all(|term| !term.stem.is_empty()));
});
