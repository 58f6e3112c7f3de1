//! End-to-end chat flow: client sessions against the server dispatcher,
//! and the same flow over real UDP sockets.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use saltline_client::{ClientAction, ClientSession, ConnectedClient};
use saltline_server::{Dispatcher, Server, ServerConfig};

fn addr(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

/// Run a client's handshake against the dispatcher until established.
fn establish(dispatcher: &Dispatcher, session: &mut ClientSession, from: SocketAddr) {
    let handshake = session.handshake();
    let replies = dispatcher.dispatch(from, &handshake.to_vec());
    assert_eq!(replies.len(), 1, "handshake should get exactly one reply");
    assert_eq!(replies[0].addr, from);
    assert_eq!(replies[0].datagram.payload.len(), 32);

    let actions = session.handle_datagram(&replies[0].datagram.to_vec());
    assert!(actions.is_empty());
    assert!(session.is_established(), "both sides should now share a session key");
}

#[test]
fn full_chat_scenario() {
    let dispatcher = Dispatcher::new();

    let mut alice = ClientSession::new("alice").unwrap();
    let mut bob = ClientSession::new("bob").unwrap();

    establish(&dispatcher, &mut alice, addr(1000));
    establish(&dispatcher, &mut bob, addr(2000));
    assert_eq!(dispatcher.peer_count(), 2);

    // Alice's "hi" reaches bob (and only bob) as "alice: hi".
    let chat = alice.send_chat("hi").unwrap();
    let sends = dispatcher.dispatch(addr(1000), &chat.to_vec());

    let [send] = &sends[..] else { panic!("expected exactly one broadcast send") };
    assert_eq!(send.addr, addr(2000));

    let actions = bob.handle_datagram(&send.datagram.to_vec());
    assert!(
        matches!(&actions[..], [ClientAction::Deliver(line)] if line == "alice: hi"),
        "bob should decrypt alice's message"
    );
}

#[test]
fn client_recovers_after_server_restart() {
    let dispatcher = Dispatcher::new();
    let mut alice = ClientSession::new("alice").unwrap();
    establish(&dispatcher, &mut alice, addr(1000));

    // The server restarts: fresh keys, empty registry. Alice still holds
    // the old session key.
    let restarted = Dispatcher::new();

    let stale_chat = alice.send_chat("anyone there?").unwrap();
    let replies = restarted.dispatch(addr(1000), &stale_chat.to_vec());

    // Unregistered sender gets a disconnect, which drives an automatic
    // re-handshake on the client.
    assert_eq!(replies.len(), 1);
    let actions = alice.handle_datagram(&replies[0].datagram.to_vec());
    let [ClientAction::Send(handshake)] = &actions[..] else {
        panic!("disconnect should trigger a re-handshake")
    };
    assert!(!alice.is_established());

    // The re-handshake re-registers alice under the restarted server.
    let replies = restarted.dispatch(addr(1000), &handshake.to_vec());
    let actions = alice.handle_datagram(&replies[0].datagram.to_vec());
    assert!(actions.is_empty());
    assert!(alice.is_established());
    assert_eq!(restarted.peer_count(), 1);

    // Chat flows again under the new session key.
    let mut bob = ClientSession::new("bob").unwrap();
    establish(&restarted, &mut bob, addr(2000));

    let chat = alice.send_chat("back again").unwrap();
    let sends = restarted.dispatch(addr(1000), &chat.to_vec());
    assert_eq!(sends.len(), 1);

    let actions = bob.handle_datagram(&sends[0].datagram.to_vec());
    assert!(matches!(&actions[..], [ClientAction::Deliver(line)] if line == "alice: back again"));
}

async fn wait_established(client: &ConnectedClient) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !client.is_established() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("handshake should complete");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn chat_flows_over_udp() {
    let server =
        Server::bind(ServerConfig { bind_address: "127.0.0.1:0".to_string() }).await.unwrap();
    let server_addr = server.local_addr().unwrap();

    let server = Arc::new(server);
    tokio::spawn({
        let server = Arc::clone(&server);
        async move {
            let _ = server.run().await;
        }
    });

    let (alice, _alice_incoming) =
        ConnectedClient::connect("alice", &server_addr.to_string()).await.unwrap();
    let (bob, mut bob_incoming) =
        ConnectedClient::connect("bob", &server_addr.to_string()).await.unwrap();

    wait_established(&alice).await;
    wait_established(&bob).await;
    assert_eq!(server.dispatcher().peer_count(), 2);

    alice.send_chat("hi").await.unwrap();

    let line = tokio::time::timeout(Duration::from_secs(5), bob_incoming.recv())
        .await
        .expect("broadcast should arrive")
        .expect("channel should stay open");
    assert_eq!(line, "alice: hi");

    alice.stop();
    bob.stop();
}
