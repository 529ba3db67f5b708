//! End-to-end tests over loopback TCP: a real server polled manually, real
//! client sockets on the other end.

use std::io::{ErrorKind, Read, Write};
use std::net::TcpStream;
use std::time::{Duration, Instant};

use telmux::{ServerConfig, Session, SessionHandler, SessionId, SessionState, TelnetServer};
use telnet_proto::{IAC, IS, SB, SE, opt};

const WILL: u8 = 251;

/// Records lifecycle callbacks for assertions.
#[derive(Default)]
struct Recorder {
    connects: Vec<SessionId>,
    disconnects: Vec<SessionId>,
}

impl SessionHandler for Recorder {
    fn on_connect(&mut self, session: &mut Session) {
        self.connects.push(session.id());
    }

    fn on_disconnect(&mut self, session: &mut Session) {
        self.disconnects.push(session.id());
    }
}

fn test_config() -> ServerConfig {
    ServerConfig {
        port: 0,
        bind_address: "127.0.0.1".to_string(),
        max_connections: 1000,
        poll_timeout_ms: 10,
        autosense_timeout_secs: 15,
    }
}

fn start_server(config: ServerConfig) -> TelnetServer<Recorder> {
    TelnetServer::new(config, Recorder::default()).unwrap()
}

fn connect(server: &TelnetServer<Recorder>) -> TcpStream {
    let client = TcpStream::connect(server.local_addr()).unwrap();
    client
        .set_read_timeout(Some(Duration::from_millis(200)))
        .unwrap();
    client
}

/// Poll the server until the condition holds or five seconds pass.
fn spin_until<F>(server: &mut TelnetServer<Recorder>, mut cond: F)
where
    F: FnMut(&mut TelnetServer<Recorder>) -> bool,
{
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        server.poll().unwrap();
        if cond(server) {
            return;
        }
        assert!(Instant::now() < deadline, "condition not reached in time");
    }
}

/// Read whatever the client socket has buffered right now.
fn drain_client(client: &mut TcpStream) -> Vec<u8> {
    let mut collected = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        match client.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => collected.extend_from_slice(&chunk[..n]),
            Err(ref e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => {
                break;
            }
            Err(e) => panic!("client read failed: {e}"),
        }
    }
    collected
}

fn sole_session_id(server: &mut TelnetServer<Recorder>) -> SessionId {
    server.sessions().next().unwrap().id()
}

#[test]
fn test_connect_fires_callback_and_probes_terminal() {
    let mut server = start_server(test_config());
    let mut client = connect(&server);

    spin_until(&mut server, |s| s.client_count() == 1);
    assert_eq!(server.handler().connects.len(), 1);

    // Flush the greeting to the wire.
    spin_until(&mut server, |s| {
        s.sessions().next().is_none_or(|sess| !sess.send_pending())
    });

    let received = drain_client(&mut client);
    let text = String::from_utf8_lossy(&received);
    assert!(text.contains("Auto-Sensing Terminal.."));
    // All three probes went out.
    for option in [opt::TTYPE, opt::TSPEED, opt::NAWS] {
        let probe = [IAC, 253, option];
        assert!(
            received.windows(3).any(|w| w == probe.as_slice()),
            "missing DO {option}"
        );
    }
}

#[test]
fn test_line_split_across_writes_yields_one_command() {
    let mut server = start_server(test_config());
    let mut client = connect(&server);
    spin_until(&mut server, |s| s.client_count() == 1);
    let id = sole_session_id(&mut server);

    client.write_all(b"he").unwrap();
    spin_until(&mut server, |s| {
        s.session(id).unwrap().bytes_received() >= 2
    });
    assert!(!server.session(id).unwrap().command_ready());

    client.write_all(b"llo\n").unwrap();
    spin_until(&mut server, |s| s.session(id).unwrap().command_ready());

    let session = server.session_mut(id).unwrap();
    assert_eq!(session.next_command().as_deref(), Some("hello"));
    assert!(!session.command_ready());
    assert_eq!(session.next_command(), None);
}

#[test]
fn test_capacity_rejects_without_callback() {
    let mut config = test_config();
    config.max_connections = 1;
    let mut server = start_server(config);

    let _first = connect(&server);
    spin_until(&mut server, |s| s.client_count() == 1);

    let mut second = connect(&server);
    // The server closes the excess socket; the client sees EOF.
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut chunk = [0u8; 256];
    loop {
        server.poll().unwrap();
        match second.read(&mut chunk) {
            Ok(0) => break,
            Ok(_) => {}
            Err(ref e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => {}
            Err(_) => break,
        }
        assert!(Instant::now() < deadline, "rejected socket never closed");
    }

    assert_eq!(server.client_count(), 1);
    assert_eq!(server.handler().connects.len(), 1);
    assert!(server.handler().disconnects.is_empty());
}

#[test]
fn test_client_close_fires_disconnect_once() {
    let mut server = start_server(test_config());
    let client = connect(&server);
    spin_until(&mut server, |s| s.client_count() == 1);

    drop(client);
    spin_until(&mut server, |s| s.client_count() == 0);
    assert_eq!(server.handler().disconnects.len(), 1);

    for _ in 0..5 {
        server.poll().unwrap();
    }
    assert_eq!(server.handler().disconnects.len(), 1);
}

#[test]
fn test_deactivate_reaps_on_next_cycle() {
    let mut server = start_server(test_config());
    let mut client = connect(&server);
    spin_until(&mut server, |s| s.client_count() == 1);
    let id = sole_session_id(&mut server);

    server.session_mut(id).unwrap().deactivate();
    spin_until(&mut server, |s| s.client_count() == 0);
    assert_eq!(server.handler().disconnects, vec![id]);

    // The socket really closed under the client.
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut chunk = [0u8; 256];
    loop {
        match client.read(&mut chunk) {
            Ok(0) => break,
            Ok(_) => {}
            Err(ref e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => {}
            Err(_) => break,
        }
        assert!(Instant::now() < deadline, "socket never closed");
    }
}

#[test]
fn test_autosense_completes_with_ansi_terminal() {
    let mut server = start_server(test_config());
    let mut client = connect(&server);
    spin_until(&mut server, |s| s.client_count() == 1);
    let id = sole_session_id(&mut server);
    assert_eq!(server.session(id).unwrap().state(), SessionState::AutoSensing);

    // Agree to all three probes and report values.
    let mut reply = vec![IAC, WILL, opt::TTYPE, IAC, WILL, opt::TSPEED, IAC, WILL, opt::NAWS];
    reply.extend_from_slice(&[IAC, SB, opt::TTYPE, IS]);
    reply.extend_from_slice(b"XTERM");
    reply.extend_from_slice(&[IAC, SE]);
    reply.extend_from_slice(&[IAC, SB, opt::TSPEED, IS]);
    reply.extend_from_slice(b"38400,38400");
    reply.extend_from_slice(&[IAC, SE]);
    reply.extend_from_slice(&[IAC, SB, opt::NAWS, 0, 132, 0, 50, IAC, SE]);
    client.write_all(&reply).unwrap();

    spin_until(&mut server, |s| {
        s.session(id).unwrap().state() == SessionState::Authenticated
    });

    let session = server.session(id).unwrap();
    assert!(session.use_ansi());
    assert_eq!(session.terminal_type(), "XTERM");
    assert_eq!(session.terminal_speed(), "38400");
    assert_eq!(session.columns(), 132);
    assert_eq!(session.rows(), 50);

    // Keep the client alive until assertions are done.
    let _ = drain_client(&mut client);
}

#[test]
fn test_autosense_timeout_degrades_to_plain() {
    let mut config = test_config();
    config.autosense_timeout_secs = 0;
    let mut server = start_server(config);
    let mut client = connect(&server);
    spin_until(&mut server, |s| s.client_count() == 1);
    let id = sole_session_id(&mut server);

    spin_until(&mut server, |s| {
        s.session(id).unwrap().state() == SessionState::Authenticated
    });
    assert!(!server.session(id).unwrap().use_ansi());

    let received = drain_client(&mut client);
    let text = String::from_utf8_lossy(&received);
    assert!(text.contains("would not respond"));
}

#[test]
fn test_send_reaches_client() {
    let mut server = start_server(test_config());
    let mut client = connect(&server);
    spin_until(&mut server, |s| s.client_count() == 1);
    let id = sole_session_id(&mut server);

    server.session_mut(id).unwrap().send("line one\nline two\n");
    spin_until(&mut server, |s| !s.session(id).unwrap().send_pending());

    let received = drain_client(&mut client);
    let text = String::from_utf8_lossy(&received);
    assert!(text.contains("line one\r\nline two\r\n"));
}
