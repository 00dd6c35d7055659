#![no_main]

use libfuzzer_sys::fuzz_target;
use mrdstore::acquisition::Acquisition;

fuzz_target!(|data: &[u8]| {
    // Decoding must either succeed or fail with an error, never panic
    if let Ok(acq) = Acquisition::decode(data) {
        // Reserved bytes are zeroed on encode, so compare decoded forms
        let encoded = acq.encode();
        assert_eq!(encoded.len(), data.len());
        let again = Acquisition::decode(&encoded).expect("re-encoded record decodes");
        assert_eq!(again.header().to_bytes(), acq.header().to_bytes());
    }
});
