//! Per-option negotiation state.
//!
//! Each telnet option a session has touched gets one [`OptionRecord`] holding
//! the negotiated state of both ends plus a reply-pending flag used for loop
//! avoidance: it marks that we initiated the negotiation and the next matching
//! verb from the peer is an expected reply, not an unsolicited announcement.
//!
//! Records are created lazily on first reference to an option code, but are
//! always fully default-constructed at that moment — there is no such thing
//! as a partially initialized record.

use std::collections::HashMap;

use crate::protocol::option_name;

/// Tri-state status of an option on one side of the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptionFlag {
    /// Never negotiated.
    #[default]
    Unknown,
    /// Negotiated on.
    Enabled,
    /// Negotiated off (or refused).
    Disabled,
}

/// Tracked status of a single telnet option for one session.
#[derive(Debug, Clone)]
pub struct OptionRecord {
    /// State of the option on our side.
    pub local: OptionFlag,
    /// State of the option on the client's side.
    pub remote: OptionFlag,
    /// True while we are awaiting the peer's reply to a request we sent.
    pub reply_pending: bool,
    /// Friendly text for debug or display.
    pub description: &'static str,
}

impl Default for OptionRecord {
    fn default() -> Self {
        Self {
            local: OptionFlag::Unknown,
            remote: OptionFlag::Unknown,
            reply_pending: false,
            description: "Unknown",
        }
    }
}

/// Mapping of raw option code to negotiation record, up to 256 per session.
///
/// Accessors take `&mut self` because checking an unseen code materializes
/// its default record first; a code is never referenced without a record
/// existing at the moment of reference.
#[derive(Debug, Default)]
pub struct OptionTable {
    records: HashMap<u8, OptionRecord>,
}

impl OptionTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn record_mut(&mut self, code: u8) -> &mut OptionRecord {
        self.records.entry(code).or_default()
    }

    /// Check the local state of an option.
    pub fn local(&mut self, code: u8) -> OptionFlag {
        self.record_mut(code).local
    }

    /// Record the local state of an option.
    pub fn set_local(&mut self, code: u8, flag: OptionFlag) {
        let record = self.record_mut(code);
        record.local = flag;
        record.description = option_name(code);
    }

    /// Check the remote state of an option.
    pub fn remote(&mut self, code: u8) -> OptionFlag {
        self.record_mut(code).remote
    }

    /// Record the remote state of an option.
    pub fn set_remote(&mut self, code: u8, flag: OptionFlag) {
        let record = self.record_mut(code);
        record.remote = flag;
        record.description = option_name(code);
    }

    /// Check whether a reply is pending for an option.
    pub fn reply_pending(&mut self, code: u8) -> bool {
        self.record_mut(code).reply_pending
    }

    /// Record whether a reply is pending for an option.
    pub fn set_reply_pending(&mut self, code: u8, pending: bool) {
        self.record_mut(code).reply_pending = pending;
    }

    /// Friendly description of an option.
    pub fn description(&mut self, code: u8) -> &'static str {
        self.record_mut(code).description
    }

    /// Snapshot of every record touched so far, ordered by option code.
    /// Intended for diagnostics ("stat"-style output).
    pub fn entries(&self) -> Vec<(u8, OptionRecord)> {
        let mut entries: Vec<_> = self
            .records
            .iter()
            .map(|(code, record)| (*code, record.clone()))
            .collect();
        entries.sort_by_key(|(code, _)| *code);
        entries
    }
}
