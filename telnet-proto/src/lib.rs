//! # Telnet Protocol Engine
//!
//! A transport-agnostic Telnet protocol implementation as defined in:
//! - RFC 854: Telnet Protocol Specification (https://tools.ietf.org/html/rfc854)
//! - Option-specific RFCs (857, 858, 1073, 1079, 1091)
//!
//! This library is designed to be:
//! - **Transport-agnostic**: Bytes in, bytes out; no sockets or I/O here
//! - **Incremental**: Feed one byte at a time, sequences may split across reads
//! - **Loop-safe**: Per-option state tracking prevents negotiation echo storms
//!
//! ## Architecture Overview
//!
//! The library is organized into several modules:
//! - `protocol`: Basic Telnet protocol constants and types (RFC 854)
//! - `option_table`: Per-option negotiation state (local, remote, pending)
//! - `machine`: The per-byte parser and negotiation engine
//!
//! The owner feeds received bytes to [`TelnetMachine::receive`], collects
//! decoded application data, and transmits whatever
//! [`TelnetMachine::take_replies`] returns.

mod machine;
mod option_table;
mod protocol;

pub use machine::TelnetMachine;
pub use option_table::{OptionFlag, OptionRecord, OptionTable};
pub use protocol::{IAC, IS, SB, SE, SEND, Verb, opt, option_name};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
