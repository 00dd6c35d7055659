#![no_main]

use libfuzzer_sys::fuzz_target;
use mrdstore::document::HeaderDocument;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(document) = HeaderDocument::from_json(text) {
        // Value rules run on anything that parses
        let _ = document.violations();
    }
});
