//! # telmux
//!
//! A line-oriented telnet connection server engine. Raw byte streams from
//! many simultaneous TCP clients become clean, line-framed, option-negotiated
//! sessions suitable for chat rooms, MUD-style consoles and remote admin
//! shells.
//!
//! The pieces:
//! - [`TelnetServer`]: accepts connections and multiplexes every session
//!   through a single readiness-polling loop.
//! - [`Session`]: per-client buffers, line queue, terminal metadata and the
//!   send API. New sessions auto-sense terminal capabilities before the
//!   application sees input from them.
//! - [`SessionHandler`]: the application's connect/disconnect hooks.
//! - `telnet_proto`: the wire-protocol state machine underneath it all.
//!
//! ## Usage
//!
//! ```no_run
//! use telmux::{ServerConfig, Session, SessionHandler, TelnetServer};
//!
//! struct Greeter;
//!
//! impl SessionHandler for Greeter {
//!     fn on_connect(&mut self, session: &mut Session) {
//!         session.send("Welcome!\n");
//!     }
//!     fn on_disconnect(&mut self, _session: &mut Session) {}
//! }
//!
//! let mut server = TelnetServer::new(ServerConfig::default(), Greeter)?;
//! loop {
//!     server.poll()?;
//!     for session in server.sessions() {
//!         while let Some(line) = session.next_command() {
//!             session.send(&format!("you said: {line}\n"));
//!         }
//!     }
//! }
//! # Ok::<(), telmux::ServerError>(())
//! ```

mod autosense;
mod config;
mod errors;
mod server;
mod session;
pub mod style;

pub use config::ServerConfig;
pub use errors::{ConnectionLost, ServerError, ServerResult};
pub use server::{SessionHandler, TelnetServer};
pub use session::{Session, SessionId, SessionState};
