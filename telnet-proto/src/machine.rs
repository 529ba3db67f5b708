//! Per-byte telnet state machine.
//!
//! [`TelnetMachine`] consumes a raw byte stream one byte at a time, separating
//! application data from embedded IAC command sequences. Negotiation verbs
//! drive the per-option [`OptionTable`](crate::OptionTable); subnegotiations
//! for terminal type, terminal speed and window size update the machine's
//! terminal metadata. Any protocol bytes the machine needs to transmit in
//! reply accumulate in an internal buffer the owner drains with
//! [`take_replies`](TelnetMachine::take_replies).
//!
//! The parser state is a single tagged variant, so "saw IAC while also inside
//! a subnegotiation while also expecting an option byte" and similar illegal
//! flag combinations cannot be represented.

use tracing::{debug, warn};

use crate::option_table::{OptionFlag, OptionTable};
use crate::protocol::{self, IAC, IS, SB, SE, SEND, Verb, opt};

/// Subnegotiation buffers longer than this are assumed unterminated and are
/// discarded wholesale.
const SUBNEG_MAX: usize = 64;

/// Parser position within the byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    /// Plain application data.
    Data,
    /// Saw IAC in plain data; the next byte selects the command.
    Escape,
    /// Saw IAC plus a negotiation verb; the next byte is the option code.
    Verb(Verb),
    /// Inside `IAC SB ...`, accumulating the subnegotiation buffer.
    Subneg,
    /// Saw IAC inside a subnegotiation; expecting SE or an escaped 255.
    SubnegEscape,
}

/// Telnet protocol engine for one session.
pub struct TelnetMachine {
    state: ParserState,
    subneg: Vec<u8>,
    options: OptionTable,
    /// Protocol bytes queued for transmission to the client.
    replies: Vec<u8>,
    terminal_type: String,
    terminal_speed: String,
    columns: u16,
    rows: u16,
    /// True when we are committed to echoing client input back.
    echo: bool,
}

impl Default for TelnetMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl TelnetMachine {
    pub fn new() -> Self {
        Self {
            state: ParserState::Data,
            subneg: Vec::new(),
            options: OptionTable::new(),
            replies: Vec::new(),
            terminal_type: "UNKNOWN".to_string(),
            terminal_speed: "UNKNOWN".to_string(),
            columns: 80,
            rows: 24,
            echo: false,
        }
    }

    /// Feed one received byte through the parser.
    ///
    /// Decoded application bytes are appended to `out`; everything else is
    /// consumed by the protocol layer.
    pub fn receive(&mut self, byte: u8, out: &mut Vec<u8>) {
        match self.state {
            ParserState::Data => {
                if byte == IAC {
                    self.state = ParserState::Escape;
                } else {
                    out.push(byte);
                }
            }
            ParserState::Escape => {
                if byte == IAC {
                    // Escaped literal 255 in plain data.
                    out.push(IAC);
                    self.state = ParserState::Data;
                } else {
                    self.dispatch_command(byte);
                }
            }
            ParserState::Verb(verb) => {
                self.negotiate(verb, byte);
                self.state = ParserState::Data;
            }
            ParserState::Subneg => {
                if byte == IAC {
                    self.state = ParserState::SubnegEscape;
                } else {
                    self.push_subneg(byte);
                }
            }
            ParserState::SubnegEscape => match byte {
                IAC => {
                    // IAC IAC inside a subnegotiation: escaped literal 255.
                    self.push_subneg(IAC);
                    if self.state == ParserState::SubnegEscape {
                        self.state = ParserState::Subneg;
                    }
                }
                SE => {
                    self.state = ParserState::Data;
                    self.decode_subneg();
                }
                _ => {
                    // Anything else aborts the subnegotiation; the byte is
                    // then handled as an ordinary post-IAC command byte.
                    warn!(byte, "subnegotiation aborted by unexpected command");
                    self.subneg.clear();
                    self.dispatch_command(byte);
                }
            },
        }
    }

    /// Convenience wrapper feeding a whole chunk through [`receive`](Self::receive).
    pub fn receive_all(&mut self, bytes: &[u8], out: &mut Vec<u8>) {
        for &byte in bytes {
            self.receive(byte, out);
        }
    }

    /// Handle the byte following an IAC that is not an escaped 255.
    fn dispatch_command(&mut self, byte: u8) {
        if let Some(verb) = Verb::from_byte(byte) {
            self.state = ParserState::Verb(verb);
            return;
        }
        self.state = ParserState::Data;
        match byte {
            SB => {
                self.subneg.clear();
                self.state = ParserState::Subneg;
            }
            SE => {
                // SE without a matching SB; the empty buffer decodes to nothing.
                debug!("subnegotiation end with no subnegotiation open");
                self.decode_subneg();
            }
            _ if protocol::is_simple_command(byte) => {
                debug!(byte, "discarding two-byte command");
            }
            _ => {
                warn!(byte, "unrecognized two-byte command");
            }
        }
    }

    fn push_subneg(&mut self, byte: u8) {
        if self.subneg.len() >= SUBNEG_MAX {
            warn!(
                limit = SUBNEG_MAX,
                "oversized subnegotiation buffer discarded"
            );
            self.subneg.clear();
            self.state = ParserState::Data;
        } else {
            self.subneg.push(byte);
        }
    }

    /// Dispatch a complete `IAC <verb> <option>` sequence.
    fn negotiate(&mut self, verb: Verb, option: u8) {
        match verb {
            // Incoming DO/DONT refer to the status of our end.
            Verb::Do => match option {
                opt::BINARY | opt::SGA | opt::ECHO => {
                    if self.options.reply_pending(option) {
                        // Expected reply to our own WILL; don't re-announce.
                        self.options.set_reply_pending(option, false);
                        self.options.set_local(option, OptionFlag::Enabled);
                    } else if self.options.local(option) != OptionFlag::Enabled {
                        self.options.set_local(option, OptionFlag::Enabled);
                        self.iac_will(option);
                        if option == opt::ECHO {
                            self.echo = true;
                        }
                    }
                    // Already enabled and nothing pending: stay quiet.
                }
                _ => {
                    // All other options: refuse once.
                    if self.options.local(option) == OptionFlag::Unknown {
                        self.options.set_local(option, OptionFlag::Disabled);
                        self.iac_wont(option);
                    }
                }
            },
            Verb::Dont => match option {
                opt::BINARY | opt::SGA | opt::ECHO => {
                    if self.options.reply_pending(option) {
                        self.options.set_reply_pending(option, false);
                        self.options.set_local(option, OptionFlag::Disabled);
                    } else if self.options.local(option) != OptionFlag::Disabled {
                        self.options.set_local(option, OptionFlag::Disabled);
                        self.iac_wont(option);
                        if option == opt::ECHO {
                            self.echo = false;
                        }
                    }
                }
                _ => {
                    if self.options.local(option) == OptionFlag::Unknown {
                        self.options.set_local(option, OptionFlag::Disabled);
                        self.iac_wont(option);
                    }
                }
            },

            // Incoming WILL/WONT refer to the status of the client.
            Verb::Will => match option {
                opt::ECHO => {
                    // A client offering to echo the server is refused once.
                    if self.options.remote(opt::ECHO) == OptionFlag::Unknown {
                        self.options.set_remote(opt::ECHO, OptionFlag::Disabled);
                        self.iac_dont(opt::ECHO);
                    }
                }
                opt::NAWS | opt::SGA => {
                    if self.options.reply_pending(option) {
                        self.options.set_reply_pending(option, false);
                        self.options.set_remote(option, OptionFlag::Enabled);
                    } else if self.options.remote(option) != OptionFlag::Enabled {
                        self.options.set_remote(option, OptionFlag::Enabled);
                        self.iac_do(option);
                    }
                }
                opt::TTYPE => {
                    if self.options.reply_pending(opt::TTYPE) {
                        // Pending stays set until the IS reply names the type.
                        self.options.set_remote(opt::TTYPE, OptionFlag::Enabled);
                        self.send_subneg_request(opt::TTYPE);
                    } else if self.options.remote(opt::TTYPE) != OptionFlag::Enabled {
                        self.options.set_remote(opt::TTYPE, OptionFlag::Enabled);
                        self.iac_do(opt::TTYPE);
                    }
                }
                opt::TSPEED => {
                    if self.options.reply_pending(opt::TSPEED) {
                        self.options.set_reply_pending(opt::TSPEED, false);
                        self.options.set_remote(opt::TSPEED, OptionFlag::Enabled);
                        self.send_subneg_request(opt::TSPEED);
                    } else if self.options.remote(opt::TSPEED) != OptionFlag::Enabled {
                        self.options.set_remote(opt::TSPEED, OptionFlag::Enabled);
                        self.iac_do(opt::TSPEED);
                    }
                }
                _ => {
                    if self.options.remote(option) == OptionFlag::Unknown {
                        self.options.set_remote(option, OptionFlag::Disabled);
                        self.iac_dont(option);
                    }
                }
            },
            Verb::Wont => match option {
                opt::ECHO => {
                    // Client states it won't echo us; accept once.
                    if self.options.remote(opt::ECHO) == OptionFlag::Unknown {
                        self.options.set_remote(opt::ECHO, OptionFlag::Disabled);
                        self.iac_dont(opt::ECHO);
                    }
                }
                opt::TSPEED => {
                    if self.options.reply_pending(opt::TSPEED) {
                        self.options.set_reply_pending(opt::TSPEED, false);
                        self.options.set_remote(opt::TSPEED, OptionFlag::Disabled);
                    } else if self.options.remote(opt::TSPEED) != OptionFlag::Disabled {
                        self.options.set_remote(opt::TSPEED, OptionFlag::Disabled);
                        self.iac_dont(opt::TSPEED);
                    }
                    self.terminal_speed = "Not Supported".to_string();
                }
                opt::SGA | opt::TTYPE => {
                    if self.options.reply_pending(option) {
                        self.options.set_reply_pending(option, false);
                        self.options.set_remote(option, OptionFlag::Disabled);
                    } else if self.options.remote(option) != OptionFlag::Disabled {
                        self.options.set_remote(option, OptionFlag::Disabled);
                        self.iac_dont(option);
                    }
                }
                _ => {
                    debug!(option, "ignoring WONT for unhandled option");
                }
            },
        }
    }

    /// Decode a completed subnegotiation buffer.
    fn decode_subneg(&mut self) {
        let block = std::mem::take(&mut self.subneg);
        if block.len() <= 2 {
            return;
        }

        match block[0] {
            opt::TTYPE if block[1] == IS => {
                self.terminal_type = String::from_utf8_lossy(&block[2..]).into_owned();
                self.options.set_reply_pending(opt::TTYPE, false);
                debug!(terminal_type = %self.terminal_type, "terminal type received");
            }
            opt::TSPEED if block[1] == IS => {
                let fields = String::from_utf8_lossy(&block[2..]).into_owned();
                // Transmit speed is the first comma-delimited field.
                if let Some(speed) = fields.split(',').next() {
                    self.terminal_speed = speed.to_string();
                }
                debug!(terminal_speed = %self.terminal_speed, "terminal speed received");
            }
            opt::NAWS => {
                if block.len() != 5 {
                    warn!(length = block.len(), "bad length on NAWS subnegotiation");
                } else {
                    self.columns = u16::from_be_bytes([block[1], block[2]]);
                    self.rows = u16::from_be_bytes([block[3], block[4]]);
                    debug!(
                        columns = self.columns,
                        rows = self.rows,
                        "window size received"
                    );
                }
            }
            _ => {
                debug!(option = block[0], "ignoring subnegotiation");
            }
        }
    }

    //---[ Requests we initiate ]----------------------------------------------

    /// Ask the client to suppress Go-Ahead signals (RFC 858).
    pub fn request_suppress_go_ahead(&mut self) {
        self.iac_do(opt::SGA);
        self.options.set_reply_pending(opt::SGA, true);
    }

    /// Begin negotiation for the client's terminal type (RFC 1091).
    pub fn request_terminal_type(&mut self) {
        self.iac_do(opt::TTYPE);
        self.options.set_reply_pending(opt::TTYPE, true);
    }

    /// Begin negotiation for the client's terminal speed (RFC 1079).
    pub fn request_terminal_speed(&mut self) {
        self.iac_do(opt::TSPEED);
        self.options.set_reply_pending(opt::TSPEED, true);
    }

    /// Ask the client to report its window size (RFC 1073).
    pub fn request_window_size(&mut self) {
        self.iac_do(opt::NAWS);
        self.options.set_reply_pending(opt::NAWS, true);
    }

    /// Tell the client we would like to echo their input (RFC 857).
    pub fn request_will_echo(&mut self) {
        self.iac_will(opt::ECHO);
        self.options.set_reply_pending(opt::ECHO, true);
        self.echo = true;
    }

    /// Tell the client we are done echoing their input.
    pub fn request_wont_echo(&mut self) {
        self.iac_wont(opt::ECHO);
        self.options.set_reply_pending(opt::ECHO, true);
        self.echo = false;
    }

    /// Announce WILL ECHO without actually echoing, so the client stops
    /// local echo of sensitive input.
    pub fn password_mode_on(&mut self) {
        self.iac_will(opt::ECHO);
        self.options.set_reply_pending(opt::ECHO, true);
    }

    /// Retract the password-mode echo announcement.
    pub fn password_mode_off(&mut self) {
        self.iac_wont(opt::ECHO);
        self.options.set_reply_pending(opt::ECHO, true);
    }

    //---[ Wire shortcuts ]----------------------------------------------------

    fn iac_do(&mut self, option: u8) {
        self.replies.extend_from_slice(&[IAC, protocol::DO, option]);
    }

    fn iac_dont(&mut self, option: u8) {
        self.replies.extend_from_slice(&[IAC, protocol::DONT, option]);
    }

    fn iac_will(&mut self, option: u8) {
        self.replies.extend_from_slice(&[IAC, protocol::WILL, option]);
    }

    fn iac_wont(&mut self, option: u8) {
        self.replies.extend_from_slice(&[IAC, protocol::WONT, option]);
    }

    fn send_subneg_request(&mut self, option: u8) {
        self.replies
            .extend_from_slice(&[IAC, SB, option, SEND, IAC, SE]);
    }

    //---[ Accessors ]---------------------------------------------------------

    /// Drain the protocol bytes queued for transmission.
    pub fn take_replies(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.replies)
    }

    /// True when protocol bytes are waiting to be transmitted.
    pub fn has_replies(&self) -> bool {
        !self.replies.is_empty()
    }

    /// Negotiated terminal type, or "UNKNOWN".
    pub fn terminal_type(&self) -> &str {
        &self.terminal_type
    }

    /// Negotiated terminal speed, "UNKNOWN", or "Not Supported".
    pub fn terminal_speed(&self) -> &str {
        &self.terminal_speed
    }

    /// Reported window width in characters (default 80).
    pub fn columns(&self) -> u16 {
        self.columns
    }

    /// Reported window height in lines (default 24).
    pub fn rows(&self) -> u16 {
        self.rows
    }

    /// Whether server-side echo is currently on.
    pub fn echo(&self) -> bool {
        self.echo
    }

    /// True while a reply is pending for the given option code.
    pub fn reply_pending(&mut self, option: u8) -> bool {
        self.options.reply_pending(option)
    }

    /// The per-option negotiation table, for diagnostics.
    pub fn options(&self) -> &OptionTable {
        &self.options
    }

    #[cfg(test)]
    fn options_mut(&mut self) -> &mut OptionTable {
        &mut self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{DO, DONT, WILL, WONT};

    fn feed(machine: &mut TelnetMachine, bytes: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        machine.receive_all(bytes, &mut out);
        out
    }

    #[test]
    fn test_plain_data_passes_through() {
        let mut machine = TelnetMachine::new();
        let out = feed(&mut machine, b"Hello, World!");
        assert_eq!(out, b"Hello, World!");
        assert!(machine.take_replies().is_empty());
    }

    #[test]
    fn test_doubled_iac_in_data_is_literal() {
        let mut machine = TelnetMachine::new();
        let out = feed(&mut machine, &[b'a', IAC, IAC, b'b']);
        assert_eq!(out, vec![b'a', 255, b'b']);
        assert!(machine.take_replies().is_empty());
    }

    #[test]
    fn test_do_echo_replies_will_once() {
        let mut machine = TelnetMachine::new();

        feed(&mut machine, &[IAC, DO, opt::ECHO]);
        assert_eq!(machine.take_replies(), vec![IAC, WILL, opt::ECHO]);
        assert!(machine.echo());
        assert_eq!(machine.options_mut().local(opt::ECHO), OptionFlag::Enabled);

        // Identical DO while already enabled: loop avoidance, no reply.
        feed(&mut machine, &[IAC, DO, opt::ECHO]);
        assert!(machine.take_replies().is_empty());
    }

    #[test]
    fn test_do_echo_while_pending_is_expected_reply() {
        let mut machine = TelnetMachine::new();
        machine.request_will_echo();
        machine.take_replies();

        feed(&mut machine, &[IAC, DO, opt::ECHO]);
        // Expected reply to our WILL: state recorded, nothing re-announced.
        assert!(machine.take_replies().is_empty());
        assert!(!machine.reply_pending(opt::ECHO));
        assert_eq!(machine.options_mut().local(opt::ECHO), OptionFlag::Enabled);
    }

    #[test]
    fn test_dont_echo_disables_and_acks() {
        let mut machine = TelnetMachine::new();
        feed(&mut machine, &[IAC, DO, opt::ECHO]);
        machine.take_replies();
        assert!(machine.echo());

        feed(&mut machine, &[IAC, DONT, opt::ECHO]);
        assert_eq!(machine.take_replies(), vec![IAC, WONT, opt::ECHO]);
        assert!(!machine.echo());
    }

    #[test]
    fn test_unknown_option_refused_once() {
        let mut machine = TelnetMachine::new();

        feed(&mut machine, &[IAC, DO, opt::LINEMODE]);
        assert_eq!(machine.take_replies(), vec![IAC, WONT, opt::LINEMODE]);

        // Second request is ignored.
        feed(&mut machine, &[IAC, DO, opt::LINEMODE]);
        assert!(machine.take_replies().is_empty());
    }

    #[test]
    fn test_will_echo_from_client_refused() {
        let mut machine = TelnetMachine::new();
        feed(&mut machine, &[IAC, WILL, opt::ECHO]);
        assert_eq!(machine.take_replies(), vec![IAC, DONT, opt::ECHO]);
        assert_eq!(
            machine.options_mut().remote(opt::ECHO),
            OptionFlag::Disabled
        );
    }

    #[test]
    fn test_will_ttype_keeps_pending_until_is_reply() {
        let mut machine = TelnetMachine::new();
        machine.request_terminal_type();
        assert_eq!(machine.take_replies(), vec![IAC, DO, opt::TTYPE]);

        feed(&mut machine, &[IAC, WILL, opt::TTYPE]);
        // Asked the client to send its type; still awaiting the value.
        assert_eq!(
            machine.take_replies(),
            vec![IAC, SB, opt::TTYPE, SEND, IAC, SE]
        );
        assert!(machine.reply_pending(opt::TTYPE));

        let mut reply = vec![IAC, SB, opt::TTYPE, IS];
        reply.extend_from_slice(b"XTERM");
        reply.extend_from_slice(&[IAC, SE]);
        feed(&mut machine, &reply);

        assert_eq!(machine.terminal_type(), "XTERM");
        assert!(!machine.reply_pending(opt::TTYPE));
    }

    #[test]
    fn test_will_tspeed_clears_pending_immediately() {
        let mut machine = TelnetMachine::new();
        machine.request_terminal_speed();
        machine.take_replies();

        feed(&mut machine, &[IAC, WILL, opt::TSPEED]);
        assert_eq!(
            machine.take_replies(),
            vec![IAC, SB, opt::TSPEED, SEND, IAC, SE]
        );
        assert!(!machine.reply_pending(opt::TSPEED));

        let mut reply = vec![IAC, SB, opt::TSPEED, IS];
        reply.extend_from_slice(b"38400,38400");
        reply.extend_from_slice(&[IAC, SE]);
        feed(&mut machine, &reply);
        assert_eq!(machine.terminal_speed(), "38400");
    }

    #[test]
    fn test_wont_tspeed_records_not_supported() {
        let mut machine = TelnetMachine::new();
        machine.request_terminal_speed();
        machine.take_replies();

        feed(&mut machine, &[IAC, WONT, opt::TSPEED]);
        assert!(machine.take_replies().is_empty());
        assert!(!machine.reply_pending(opt::TSPEED));
        assert_eq!(machine.terminal_speed(), "Not Supported");
    }

    #[test]
    fn test_naws_subnegotiation_sets_window_size() {
        let mut machine = TelnetMachine::new();
        machine.request_window_size();
        machine.take_replies();

        feed(&mut machine, &[IAC, WILL, opt::NAWS]);
        assert!(!machine.reply_pending(opt::NAWS));

        feed(&mut machine, &[IAC, SB, opt::NAWS, 0, 80, 0, 24, IAC, SE]);
        assert_eq!(machine.columns(), 80);
        assert_eq!(machine.rows(), 24);
    }

    #[test]
    fn test_naws_wide_window_big_endian() {
        let mut machine = TelnetMachine::new();
        feed(&mut machine, &[IAC, SB, opt::NAWS, 1, 4, 0, 50, IAC, SE]);
        assert_eq!(machine.columns(), 260);
        assert_eq!(machine.rows(), 50);
    }

    #[test]
    fn test_naws_bad_length_leaves_size_unchanged() {
        let mut machine = TelnetMachine::new();
        feed(&mut machine, &[IAC, SB, opt::NAWS, 0, 80, 0, IAC, SE]);
        assert_eq!(machine.columns(), 80);
        assert_eq!(machine.rows(), 24);

        feed(&mut machine, &[IAC, SB, opt::NAWS, 0, 80, 0, 24, 1, IAC, SE]);
        assert_eq!(machine.columns(), 80);
        assert_eq!(machine.rows(), 24);
    }

    #[test]
    fn test_escaped_iac_inside_subnegotiation() {
        let mut machine = TelnetMachine::new();
        // Width 255 requires an escaped low byte: 0, IAC IAC.
        feed(
            &mut machine,
            &[IAC, SB, opt::NAWS, 0, IAC, IAC, 0, 24, IAC, SE],
        );
        assert_eq!(machine.columns(), 255);
        assert_eq!(machine.rows(), 24);
    }

    #[test]
    fn test_oversized_subnegotiation_discarded() {
        let mut machine = TelnetMachine::new();
        let mut input = vec![IAC, SB, opt::TTYPE, IS];
        input.extend(std::iter::repeat(b'x').take(100));
        let out = feed(&mut machine, &input);
        assert!(out.is_empty());

        // Parser has reset to Data; plain text flows again.
        let out = feed(&mut machine, b"after");
        assert_eq!(out, b"after");
        assert_eq!(machine.terminal_type(), "UNKNOWN");
    }

    #[test]
    fn test_short_subnegotiation_ignored() {
        let mut machine = TelnetMachine::new();
        // Two bytes or fewer decode to nothing.
        feed(&mut machine, &[IAC, SB, opt::TTYPE, IS, IAC, SE]);
        assert_eq!(machine.terminal_type(), "UNKNOWN");
    }

    #[test]
    fn test_simple_commands_discarded() {
        let mut machine = TelnetMachine::new();
        let out = feed(
            &mut machine,
            &[b'a', IAC, protocol::NOP, b'b', IAC, protocol::AYT, b'c'],
        );
        assert_eq!(out, b"abc");
        assert!(machine.take_replies().is_empty());
    }

    #[test]
    fn test_unrecognized_two_byte_command_discarded() {
        let mut machine = TelnetMachine::new();
        let out = feed(&mut machine, &[b'a', IAC, 239, b'b']);
        assert_eq!(out, b"ab");
    }

    #[test]
    fn test_sequence_split_across_reads() {
        let mut machine = TelnetMachine::new();

        let out = feed(&mut machine, &[IAC]);
        assert!(out.is_empty());
        let out = feed(&mut machine, &[DO]);
        assert!(out.is_empty());
        let out = feed(&mut machine, &[opt::ECHO]);
        assert!(out.is_empty());

        assert_eq!(machine.take_replies(), vec![IAC, WILL, opt::ECHO]);
    }

    #[test]
    fn test_mixed_data_and_commands() {
        let mut machine = TelnetMachine::new();
        let mut input = Vec::new();
        input.extend_from_slice(b"hello");
        input.extend_from_slice(&[IAC, WILL, opt::SGA]);
        input.extend_from_slice(b"world");

        let out = feed(&mut machine, &input);
        assert_eq!(out, b"helloworld");
        assert_eq!(machine.take_replies(), vec![IAC, DO, opt::SGA]);
    }

    #[test]
    fn test_password_mode_announces_without_echoing() {
        let mut machine = TelnetMachine::new();
        machine.password_mode_on();
        assert_eq!(machine.take_replies(), vec![IAC, WILL, opt::ECHO]);
        assert!(!machine.echo());

        machine.password_mode_off();
        assert_eq!(machine.take_replies(), vec![IAC, WONT, opt::ECHO]);
        assert!(!machine.echo());
    }
}
