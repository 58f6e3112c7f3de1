//! Fuzz target for Datagram::decode
//!
//! This fuzzer tests datagram framing with arbitrary byte sequences to find:
//! - Parser crashes or panics
//! - Out-of-bounds slicing on short inputs
//! - Type bytes that bypass validation
//!
//! The fuzzer should NEVER panic. All invalid inputs should return an error.

#![no_main]

use libfuzzer_sys::fuzz_target;
use saltline_proto::Datagram;

fuzz_target!(|data: &[u8]| {
    // Attempt to decode arbitrary bytes as a datagram
    // This should never panic, only return Err for invalid data
    let _ = Datagram::decode(data);
});
