//! Terminal capability probing for new sessions.
//!
//! Every accepted connection starts in the `AutoSensing` state. The server
//! asks for terminal type, terminal speed and window size, then watches for
//! the replies each polling cycle. Once all three negotiations settle (or a
//! deadline passes for clients that never answer) the session moves to
//! `Authenticated` with its ANSI capability decided.

use std::time::Duration;

use telnet_proto::opt;
use tracing::{debug, info};

use crate::session::{Session, SessionState};

/// Terminal types known to render ANSI escape sequences.
const ANSI_TERMINAL_TYPES: &[&str] = &["ANSI", "XTERM", "TINYFUGUE", "ZMUD", "VT100"];

impl Session {
    /// Kick off the capability probe: greet the client and request terminal
    /// type, speed and window size.
    pub(crate) fn begin_autosense(&mut self) {
        self.send("Auto-Sensing Terminal..");
        {
            let machine = self.machine();
            machine.request_terminal_type();
            machine.request_terminal_speed();
            machine.request_window_size();
        }
        self.queue_protocol_replies();
        self.autosense_start = std::time::Instant::now();
    }

    /// Check whether the probe has settled; called once per polling cycle
    /// while the session is still `AutoSensing`.
    ///
    /// Returns true when the session transitioned to `Authenticated`.
    pub(crate) fn check_autosense(&mut self, deadline: Duration) -> bool {
        let settled = {
            let machine = self.machine();
            !machine.reply_pending(opt::TTYPE)
                && !machine.reply_pending(opt::TSPEED)
                && !machine.reply_pending(opt::NAWS)
        };

        if settled {
            let known = ANSI_TERMINAL_TYPES
                .iter()
                .any(|t| t.eq_ignore_ascii_case(self.terminal_type()));
            self.set_use_ansi(known);
            if known {
                self.send_styled("\n\r^YYour telnet client ^Gsupports^Y ANSI colors!^d\n\r");
            } else {
                self.send("\n\rYour client does not support ANSI colors, color turned off.\n\r");
            }
            info!(
                session = %self.id(),
                terminal_type = self.terminal_type(),
                ansi = known,
                "auto-sense complete"
            );
            self.state = SessionState::Authenticated;
            return true;
        }

        if self.autosense_start.elapsed() > deadline {
            // Client never answered; degrade gracefully.
            self.set_use_ansi(false);
            self.send_styled("\n\rYour telnet client would not respond to our telnet negotiations.\n\r");
            debug!(session = %self.id(), "auto-sense timed out");
            self.state = SessionState::Authenticated;
            return true;
        }

        // Still waiting; nudge the client so it sees progress.
        self.send_styled("..");
        false
    }
}
