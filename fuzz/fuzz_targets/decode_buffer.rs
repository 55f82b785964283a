#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut d = jpegrs::image::Decoder::new(data.to_vec());
    let _ = d.decode();
});
