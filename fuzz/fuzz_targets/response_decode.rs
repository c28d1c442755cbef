#![no_main]

use libfuzzer_sys::fuzz_target;
use tss_wire::{decode_payload, decode_response, Request};

fuzz_target!(|data: &[u8]| {
    // Any datagram either decodes to a mapping or is rejected, never panics
    let strict = decode_response(data).ok();
    assert_eq!(strict, decode_payload(data));
    let _ = Request::decode(data);
});
