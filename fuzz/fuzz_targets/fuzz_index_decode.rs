#![no_main]

use libfuzzer_sys::fuzz_target;
use sphindex::index::{codec, validate};

fuzz_target!(|data: &str| {
    // Decoding arbitrary text either fails cleanly or yields an index the
    // validator and encoder can handle
    if let Ok(index) = codec::decode(data) {
        let _ = validate(&index);
        let _ = codec::encode(&index);
    }
});
