#![no_main]

use libfuzzer_sys::fuzz_target;
use std::path::Path;

fuzz_target!(|data: &str| {
    let _ = sphindex::source::parse_page(Path::new("page.md"), data);
    let _ = sphindex::source::parse_page(Path::new("page.rst"), data);
});
