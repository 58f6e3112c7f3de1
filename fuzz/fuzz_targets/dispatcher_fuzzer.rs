//! Fuzz target for the server dispatcher
//!
//! Feeds arbitrary bytes straight into Dispatcher::dispatch as if they
//! arrived off the socket. The dispatcher must treat every input as
//! untrusted: no panics, no registry corruption, and at most protocol
//! replies for well-framed garbage.

#![no_main]

use std::net::SocketAddr;

use libfuzzer_sys::fuzz_target;
use saltline_server::Dispatcher;

fuzz_target!(|data: &[u8]| {
    let dispatcher = Dispatcher::new();
    let addr = SocketAddr::from(([127, 0, 0, 1], 4000));

    let _ = dispatcher.dispatch(addr, data);

    // A second datagram from another address exercises dispatch against a
    // possibly mutated registry.
    let other = SocketAddr::from(([127, 0, 0, 1], 4001));
    let _ = dispatcher.dispatch(other, data);
});
