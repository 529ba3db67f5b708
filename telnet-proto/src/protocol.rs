//! Telnet protocol constants (RFC 854, RFC 855).
//!
//! The IAC byte (255) marks the start of a command sequence inside an
//! otherwise free-form data stream. Commands take one of three shapes:
//!
//! - `IAC <cmd>` — a two-byte command (NOP, AYT, ...)
//! - `IAC <verb> <option>` — option negotiation (WILL/WONT/DO/DONT)
//! - `IAC SB <option> <data...> IAC SE` — a bracketed subnegotiation
//!
//! A data byte of value 255 is escaped on the wire as `IAC IAC`.

/// Interpret As Command — the escape byte introducing every command sequence.
pub const IAC: u8 = 255;

/// End of subnegotiation parameters.
pub const SE: u8 = 240;
/// No operation; sometimes used as a keepalive.
pub const NOP: u8 = 241;
/// Data mark (Synch event position).
pub const DM: u8 = 242;
/// NVT break character.
pub const BRK: u8 = 243;
/// Interrupt process.
pub const IP: u8 = 244;
/// Abort output.
pub const AO: u8 = 245;
/// Are you there.
pub const AYT: u8 = 246;
/// Erase character.
pub const EC: u8 = 247;
/// Erase line.
pub const EL: u8 = 248;
/// Go ahead (half-duplex turn-taking).
pub const GA: u8 = 249;
/// Subnegotiation begin.
pub const SB: u8 = 250;
/// Will: request or confirm option begin.
pub const WILL: u8 = 251;
/// Won't: deny an option request.
pub const WONT: u8 = 252;
/// Do: request or confirm a remote option.
pub const DO: u8 = 253;
/// Don't: demand or confirm option halt.
pub const DONT: u8 = 254;

/// Subnegotiation SEND tag ("please send me the value").
pub const SEND: u8 = 1;
/// Subnegotiation IS tag ("the value follows").
pub const IS: u8 = 0;

/// Telnet option codes actively negotiated (or at least named) by this crate.
pub mod opt {
    /// Binary transmission (RFC 856).
    pub const BINARY: u8 = 0;
    /// Echo (RFC 857).
    pub const ECHO: u8 = 1;
    /// Reconnection.
    pub const RECON: u8 = 2;
    /// Suppress Go-Ahead (RFC 858).
    pub const SGA: u8 = 3;
    /// Status of telnet options (RFC 859).
    pub const STATUS: u8 = 5;
    /// Terminal type (RFC 1091).
    pub const TTYPE: u8 = 24;
    /// Negotiate About Window Size (RFC 1073).
    pub const NAWS: u8 = 31;
    /// Terminal speed (RFC 1079).
    pub const TSPEED: u8 = 32;
    /// Line mode (RFC 1184).
    pub const LINEMODE: u8 = 34;
}

/// The four option-negotiation verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    /// `IAC WILL <opt>` — sender wants to enable the option on its side.
    Will,
    /// `IAC WONT <opt>` — sender refuses or disables the option on its side.
    Wont,
    /// `IAC DO <opt>` — sender asks the receiver to enable the option.
    Do,
    /// `IAC DONT <opt>` — sender asks the receiver to disable the option.
    Dont,
}

impl Verb {
    /// Convert a wire byte to a negotiation verb, if it is one.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            WILL => Some(Verb::Will),
            WONT => Some(Verb::Wont),
            DO => Some(Verb::Do),
            DONT => Some(Verb::Dont),
            _ => None,
        }
    }

    /// The verb's wire byte.
    pub fn to_byte(self) -> u8 {
        match self {
            Verb::Will => WILL,
            Verb::Wont => WONT,
            Verb::Do => DO,
            Verb::Dont => DONT,
        }
    }
}

/// True for commands that are complete as `IAC <cmd>` with no option byte.
pub fn is_simple_command(byte: u8) -> bool {
    matches!(byte, NOP | DM | BRK | IP | AO | AYT | EC | EL | GA)
}

/// Friendly name for an option code, for diagnostics.
///
/// Unknown codes map to "Unknown", matching the default description of a
/// freshly created option record.
pub fn option_name(code: u8) -> &'static str {
    match code {
        opt::BINARY => "Binary representation",
        opt::ECHO => "Server Echo",
        opt::RECON => "Reconnection",
        opt::SGA => "Suppress Go Ahead (SGA)",
        opt::STATUS => "Status",
        opt::TTYPE => "Terminal Type",
        opt::NAWS => "Negotiate About Window Size (NAWS)",
        opt::TSPEED => "Terminal Speed",
        opt::LINEMODE => "Line Mode",
        _ => "Unknown",
    }
}
