use std::collections::VecDeque;
use std::io::{ErrorKind, Read, Write};
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use mio::net::TcpStream;
use telnet_proto::{OptionRecord, TelnetMachine};
use tracing::{debug, error};

use crate::errors::ConnectionLost;
use crate::style::{colorize, word_wrap};

/// Opaque session identity assigned by the server on accept.
///
/// Identifies the session for the lifetime of its slot; the underlying
/// socket handle stays an internal detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub(crate) usize);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Session lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Probing the client's terminal capabilities.
    AutoSensing,
    /// Negotiation settled; the application owns the session.
    Authenticated,
}

/// One connected client: socket, buffers, protocol engine and line queue.
pub struct Session {
    id: SessionId,
    stream: TcpStream,
    peer: SocketAddr,
    pub(crate) state: SessionState,
    active: bool,
    machine: TelnetMachine,

    recv_accumulator: String,
    send_buffer: Vec<u8>,
    send_pending: bool,
    commands: VecDeque<String>,
    cmd_ready: bool,

    bytes_sent: u64,
    bytes_received: u64,
    connect_time: Instant,
    last_input_time: Instant,
    pub(crate) autosense_start: Instant,

    /// Auto-sensing flips this on when the terminal is a known ANSI type.
    use_ansi: bool,
    /// Echo '*' instead of the typed byte while collecting a password.
    echo_as_password: bool,
}

impl Session {
    pub(crate) fn new(id: SessionId, stream: TcpStream, peer: SocketAddr) -> Self {
        let now = Instant::now();
        Self {
            id,
            stream,
            peer,
            state: SessionState::AutoSensing,
            active: true,
            machine: TelnetMachine::new(),
            recv_accumulator: String::new(),
            send_buffer: Vec::new(),
            send_pending: false,
            commands: VecDeque::new(),
            cmd_ready: false,
            bytes_sent: 0,
            bytes_received: 0,
            connect_time: now,
            last_input_time: now,
            autosense_start: now,
            use_ansi: false,
            echo_as_password: false,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The client's IP address and port as a string.
    pub fn addrport(&self) -> String {
        self.peer.to_string()
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Mark the session for disconnect on the next server poll.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    //---[ Outbound ]----------------------------------------------------------

    /// Queue raw text for the client, normalizing `\n` to `\r\n`.
    pub fn send(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.send_buffer
            .extend_from_slice(text.replace('\n', "\r\n").as_bytes());
        self.send_pending = true;
    }

    /// Queue text with caret codes converted to ANSI, or stripped for
    /// clients without ANSI support.
    pub fn send_styled(&mut self, text: &str) {
        let rendered = colorize(text, self.use_ansi);
        self.send(&rendered);
    }

    /// Queue text wrapped to the client's screen width, one line at a time.
    pub fn send_wrapped(&mut self, text: &str) {
        for line in word_wrap(text, self.machine.columns() as usize) {
            self.send_styled(&(line + "\n"));
        }
    }

    /// Write as much buffered output as the socket accepts right now.
    ///
    /// Retains exactly the unsent suffix. A write error means the peer is
    /// gone and the caller deactivates the session.
    pub fn flush_outbound(&mut self) -> Result<(), ConnectionLost> {
        self.queue_protocol_replies();
        while !self.send_buffer.is_empty() {
            match self.stream.write(&self.send_buffer) {
                Ok(0) => return Err(ConnectionLost),
                Ok(n) => {
                    self.bytes_sent += n as u64;
                    self.send_buffer.drain(..n);
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    error!(session = %self.id, peer = %self.peer, error = %e, "send failed");
                    return Err(ConnectionLost);
                }
            }
        }
        self.send_pending = !self.send_buffer.is_empty();
        Ok(())
    }

    /// True when buffered output (or a pending protocol reply) is waiting.
    pub fn send_pending(&self) -> bool {
        self.send_pending || self.machine.has_replies()
    }

    //---[ Inbound ]-----------------------------------------------------------

    /// Read whatever the socket has, run it through the protocol engine and
    /// split completed lines into the command queue.
    ///
    /// A zero-byte read means the peer closed; bytes received before the
    /// close are still processed.
    pub fn pull_inbound(&mut self) -> Result<(), ConnectionLost> {
        let mut chunk = [0u8; 2048];
        let mut decoded = Vec::new();
        let mut total = 0usize;
        let mut closed = false;

        loop {
            match self.stream.read(&mut chunk) {
                Ok(0) => {
                    debug!(session = %self.id, "peer closed connection");
                    closed = true;
                    break;
                }
                Ok(n) => {
                    total += n;
                    self.bytes_received += n as u64;
                    self.machine.receive_all(&chunk[..n], &mut decoded);
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    error!(session = %self.id, peer = %self.peer, error = %e, "recv failed");
                    return Err(ConnectionLost);
                }
            }
        }

        if total > 0 {
            self.last_input_time = Instant::now();
            if self.machine.echo() {
                self.echo_bytes(&decoded);
            }
            self.recv_accumulator
                .push_str(&String::from_utf8_lossy(&decoded));
            self.split_lines();
        }
        self.queue_protocol_replies();

        if closed { Err(ConnectionLost) } else { Ok(()) }
    }

    /// Echo input back to the client, converting LF to CRLF and masking
    /// typed characters in password mode.
    fn echo_bytes(&mut self, decoded: &[u8]) {
        for &byte in decoded {
            if byte == b'\n' {
                self.send_buffer.push(b'\r');
            }
            if self.echo_as_password {
                self.send_buffer.push(b'*');
            } else {
                self.send_buffer.push(byte);
            }
        }
        if !decoded.is_empty() {
            self.send_pending = true;
        }
    }

    /// Move completed lines from the accumulator to the command queue.
    fn split_lines(&mut self) {
        while let Some(mark) = self.recv_accumulator.find('\n') {
            let line = self.recv_accumulator[..mark].trim().to_string();
            self.recv_accumulator.drain(..=mark);
            self.commands.push_back(line);
            self.cmd_ready = true;
        }
    }

    /// Pop the oldest complete input line, if any.
    pub fn next_command(&mut self) -> Option<String> {
        let cmd = self.commands.pop_front();
        if self.commands.is_empty() {
            self.cmd_ready = false;
        }
        cmd
    }

    /// True while complete input lines are queued.
    pub fn command_ready(&self) -> bool {
        self.cmd_ready
    }

    //---[ Echo and password mode ]--------------------------------------------

    /// Ask to echo the client's input back to them.
    pub fn request_will_echo(&mut self) {
        self.machine.request_will_echo();
        self.queue_protocol_replies();
    }

    /// Stop echoing the client's input.
    pub fn request_wont_echo(&mut self) {
        self.machine.request_wont_echo();
        self.queue_protocol_replies();
    }

    /// Claim we will echo, without doing so, to hide typed passwords.
    pub fn password_mode_on(&mut self) {
        self.machine.password_mode_on();
        self.echo_as_password = true;
        self.queue_protocol_replies();
    }

    /// Retract the password-mode claim and show typing again.
    pub fn password_mode_off(&mut self) {
        self.machine.password_mode_off();
        self.echo_as_password = false;
        self.queue_protocol_replies();
    }

    /// Move protocol bytes the engine generated into the outbound buffer.
    pub(crate) fn queue_protocol_replies(&mut self) {
        if self.machine.has_replies() {
            let replies = self.machine.take_replies();
            self.send_buffer.extend_from_slice(&replies);
            self.send_pending = true;
        }
    }

    //---[ Terminal metadata and statistics ]----------------------------------

    pub fn terminal_type(&self) -> &str {
        self.machine.terminal_type()
    }

    pub fn terminal_speed(&self) -> &str {
        self.machine.terminal_speed()
    }

    pub fn columns(&self) -> u16 {
        self.machine.columns()
    }

    pub fn rows(&self) -> u16 {
        self.machine.rows()
    }

    pub fn use_ansi(&self) -> bool {
        self.use_ansi
    }

    pub(crate) fn set_use_ansi(&mut self, on: bool) {
        self.use_ansi = on;
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    pub fn bytes_received(&self) -> u64 {
        self.bytes_received
    }

    /// Seconds since the client last sent input.
    pub fn idle(&self) -> Duration {
        self.last_input_time.elapsed()
    }

    /// Seconds since the client connected.
    pub fn duration(&self) -> Duration {
        self.connect_time.elapsed()
    }

    /// Per-option negotiation state, for diagnostics.
    pub fn option_states(&self) -> Vec<(u8, OptionRecord)> {
        self.machine.options().entries()
    }

    pub(crate) fn machine(&mut self) -> &mut TelnetMachine {
        &mut self.machine
    }

    pub(crate) fn stream(&mut self) -> &mut TcpStream {
        &mut self.stream
    }
}
