#![no_main]

use libfuzzer_sys::fuzz_target;
use pystep::Emitter;

fuzz_target!(|data: &[u8]| {
    // Arbitrary documents must fail with an error, never panic
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = Emitter::new().generate_str(s);
    }
});
