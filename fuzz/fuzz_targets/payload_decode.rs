//! Fuzz target for the typed payload parsers
//!
//! This fuzzer tests payload parsing with arbitrary bytes interpreted as
//! every payload kind in both directions of travel:
//! - Handshake requests with truncated keys or oversized identities
//! - Handshake replies of the wrong length
//! - Chat payloads too short to carry a nonce and tag
//!
//! The fuzzer should NEVER panic. All invalid inputs should return an error.

#![no_main]

use libfuzzer_sys::fuzz_target;
use saltline_proto::payloads::{ChatPayload, Disconnect, HandshakeReply, HandshakeRequest};

fuzz_target!(|data: &[u8]| {
    let _ = HandshakeRequest::decode(data);
    let _ = HandshakeReply::decode(data);
    let _ = ChatPayload::decode(data);
    let _ = Disconnect::decode(data);
});
