//! Single-threaded telnet connection server.
//!
//! Readiness-based model: one `poll` call per cycle tells us which sockets
//! are ready, then non-blocking read/write syscalls do the work. Uses epoll
//! on Linux, kqueue on macOS. All session state is touched only from inside
//! a polling cycle, so there is no locking anywhere.

use std::io;
use std::net::SocketAddr;

use mio::net::TcpListener;
use mio::{Events, Interest, Poll, Token};
use slab::Slab;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::errors::{ServerError, ServerResult};
use crate::session::{Session, SessionId, SessionState};

const LISTENER_TOKEN: Token = Token(usize::MAX);

/// Application hooks for session lifecycle.
///
/// `on_disconnect` fires on the polling cycle after a session was
/// deactivated, once its transport is known closed.
pub trait SessionHandler {
    fn on_connect(&mut self, session: &mut Session);
    fn on_disconnect(&mut self, session: &mut Session);
}

/// Owns the listener and the full session set; applications drive it by
/// calling [`poll`](TelnetServer::poll) in a loop.
pub struct TelnetServer<H: SessionHandler> {
    config: ServerConfig,
    handler: H,
    poll: Poll,
    events: Events,
    listener: TcpListener,
    local_addr: SocketAddr,
    sessions: Slab<Session>,
}

impl<H: SessionHandler> TelnetServer<H> {
    /// Bind the listening socket and prepare the polling loop.
    ///
    /// Bind failure is fatal before any serving begins.
    pub fn new(config: ServerConfig, handler: H) -> ServerResult<Self> {
        let address = config.listen_address();
        let addr: SocketAddr = address.parse().map_err(|e| ServerError::Bind {
            address: address.clone(),
            source: io::Error::new(io::ErrorKind::InvalidInput, e),
        })?;

        let mut listener = TcpListener::bind(addr).map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;
        let local_addr = listener.local_addr()?;

        let poll = Poll::new().map_err(ServerError::Poll)?;
        poll.registry()
            .register(&mut listener, LISTENER_TOKEN, Interest::READABLE)?;

        info!(addr = %local_addr, max_connections = config.max_connections, "listening");

        Ok(Self {
            config,
            handler,
            poll,
            events: Events::with_capacity(256),
            listener,
            local_addr,
            sessions: Slab::new(),
        })
    }

    /// Run one polling cycle: reap dead sessions, wait for readiness,
    /// accept and dispatch I/O, drive capability probes.
    ///
    /// A failure of the polling primitive itself is fatal and propagates.
    pub fn poll(&mut self) -> ServerResult<()> {
        self.reap_inactive();
        self.rearm_interest()?;

        match self
            .poll
            .poll(&mut self.events, Some(self.config.poll_timeout()))
        {
            Ok(()) => {}
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => return Ok(()),
            Err(e) => return Err(ServerError::Poll(e)),
        }

        let ready: Vec<(Token, bool, bool)> = self
            .events
            .iter()
            .map(|event| (event.token(), event.is_readable(), event.is_writable()))
            .collect();

        for (token, readable, writable) in ready {
            if token == LISTENER_TOKEN {
                self.accept_pending()?;
                continue;
            }
            let key = token.0;
            let Some(session) = self.sessions.get_mut(key) else {
                continue;
            };
            if readable && session.pull_inbound().is_err() {
                session.deactivate();
            }
            if writable && session.is_active() && session.flush_outbound().is_err() {
                session.deactivate();
            }
        }

        self.drive_autosense();
        Ok(())
    }

    /// Remove sessions deactivated during the previous cycle's I/O or by
    /// the application between cycles. Buffered output gets one last
    /// best-effort flush before the socket is released.
    fn reap_inactive(&mut self) {
        let dead: Vec<usize> = self
            .sessions
            .iter()
            .filter(|(_, s)| !s.is_active())
            .map(|(key, _)| key)
            .collect();

        for key in dead {
            let mut session = self.sessions.remove(key);
            let _ = session.flush_outbound();
            self.handler.on_disconnect(&mut session);
            if let Err(e) = self.poll.registry().deregister(session.stream()) {
                debug!(session = %session.id(), error = %e, "deregister failed");
            }
            info!(session = %session.id(), peer = %session.addrport(), "disconnected");
        }
    }

    /// Refresh each active session's interest set: always readable, plus
    /// writable while output is pending. Reregistering every cycle keeps
    /// edge-triggered readiness equivalent to per-cycle interest sets.
    fn rearm_interest(&mut self) -> ServerResult<()> {
        let registry = self.poll.registry();
        for (key, session) in self.sessions.iter_mut() {
            let interest = if session.send_pending() {
                Interest::READABLE | Interest::WRITABLE
            } else {
                Interest::READABLE
            };
            registry.reregister(session.stream(), Token(key), interest)?;
        }
        Ok(())
    }

    /// Accept every connection waiting on the listener.
    ///
    /// At capacity the accepted socket is dropped with no session and no
    /// callback.
    fn accept_pending(&mut self) -> ServerResult<()> {
        loop {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    if self.sessions.len() >= self.config.max_connections {
                        warn!(peer = %peer, "refusing connection, at capacity");
                        drop(stream);
                        continue;
                    }

                    let entry = self.sessions.vacant_entry();
                    let key = entry.key();
                    let mut session = Session::new(SessionId(key), stream, peer);
                    self.poll.registry().register(
                        session.stream(),
                        Token(key),
                        Interest::READABLE | Interest::WRITABLE,
                    )?;
                    let session = entry.insert(session);

                    info!(session = %session.id(), peer = %session.addrport(), "connected");
                    session.begin_autosense();
                    self.handler.on_connect(session);
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(ServerError::Io(e)),
            }
        }
        Ok(())
    }

    /// Advance the capability probe for sessions still auto-sensing.
    fn drive_autosense(&mut self) {
        let deadline = self.config.autosense_timeout();
        for (_, session) in self.sessions.iter_mut() {
            if session.is_active() && session.state() == SessionState::AutoSensing {
                session.check_autosense(deadline);
            }
        }
    }

    //---[ Accessors ]---------------------------------------------------------

    /// Number of live sessions.
    pub fn client_count(&self) -> usize {
        self.sessions.len()
    }

    /// The address the listener actually bound (useful with port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn session(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(id.0)
    }

    pub fn session_mut(&mut self, id: SessionId) -> Option<&mut Session> {
        self.sessions.get_mut(id.0)
    }

    /// Iterate over all sessions.
    pub fn sessions(&mut self) -> impl Iterator<Item = &mut Session> {
        self.sessions.iter_mut().map(|(_, s)| s)
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }
}
