#![no_main]
use libfuzzer_sys::fuzz_target;
use std::io::Write;
use tempfile::NamedTempFile;

fuzz_target!(|data: &[u8]| {
    // Write fuzz data to a temp file and try to parse it
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(data).unwrap();
    let path = f.path().to_path_buf();

    // Should not panic regardless of input
    if let Ok(codes) = wetspring_otolith::io::codes::read_codes(&path) {
        // Whatever parsed must survive a rewrite
        let out = NamedTempFile::new().unwrap();
        let _ = wetspring_otolith::io::codes::write_codes(&codes, out.path());
    }
});
