//! One sync exchange with the amp.
//!
//! The protocol is one request and one reply per TCP connection: connect,
//! send a single line, read until the device goes quiet, apply, tear down.
//! The session owns the connection for the whole exchange and closes it on
//! every exit path, so a failure never leaves the store half-updated or a
//! socket behind.

use std::fmt;
use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use log::{debug, info, warn};

use ampctl_types::AmpSettings;

use crate::wire::{self, ProtocolError};

/// Default connect/read/write timeout. The protocol itself specifies
/// none, but a silent device must not hang the caller.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Why a sync failed. Transport and protocol failures are reported
/// distinctly and neither is retried automatically.
#[derive(Debug)]
pub enum SyncError {
    /// Connection refused, dropped mid-exchange, or timed out.
    Transport(io::Error),
    /// The reply was received but could not be decoded.
    Protocol(ProtocolError),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Transport(e) => write!(f, "connection failed: {}", e),
            SyncError::Protocol(e) => write!(f, "bad reply from amp: {}", e),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::Transport(e) => Some(e),
            SyncError::Protocol(e) => Some(e),
        }
    }
}

impl From<io::Error> for SyncError {
    fn from(e: io::Error) -> SyncError {
        SyncError::Transport(e)
    }
}

impl From<ProtocolError> for SyncError {
    fn from(e: ProtocolError) -> SyncError {
        SyncError::Protocol(e)
    }
}

/// Outcome of a sync trigger that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The device replied and the settings store was replaced.
    Applied,
    /// A connection was already open; it was torn down instead.
    Disconnected,
}

/// Session phase, logged across transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Connecting,
    AwaitingResponse,
    Applying,
    Failed,
}

/// Drives sync exchanges against one device address.
///
/// Blocking and strictly sequential: one exchange at a time, and the
/// session returns to idle after every call, success or not.
pub struct SyncSession {
    addr: String,
    timeout: Duration,
    /// Set once the first connection of the process lifetime has carried
    /// a request; before that, sync sends the fetch request instead of a
    /// push-update.
    first_sync_done: bool,
    conn: Option<TcpStream>,
    phase: Phase,
}

impl SyncSession {
    pub fn new(addr: impl Into<String>, timeout: Duration) -> SyncSession {
        SyncSession {
            addr: addr.into(),
            timeout,
            first_sync_done: false,
            conn: None,
            phase: Phase::Idle,
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Run one exchange: serialize, send, receive, apply.
    ///
    /// Acts as a toggle: if a connection is already open the call tears it
    /// down and returns [`SyncOutcome::Disconnected`] without touching the
    /// store. The first exchange of the process lifetime asks the device
    /// to dump its settings; every later one pushes the store's values.
    /// On any error the store is left unchanged and the session is
    /// immediately ready for another attempt.
    pub fn sync(&mut self, settings: &mut AmpSettings) -> Result<SyncOutcome, SyncError> {
        if self.conn.is_some() {
            info!("sync triggered while connected; disconnecting from {}", self.addr);
            self.teardown();
            self.set_phase(Phase::Idle);
            return Ok(SyncOutcome::Disconnected);
        }

        let result = self.exchange(settings);
        self.teardown();
        match result {
            Ok(()) => {
                self.set_phase(Phase::Idle);
                Ok(SyncOutcome::Applied)
            }
            Err(e) => {
                self.set_phase(Phase::Failed);
                warn!("sync with {} failed: {}", self.addr, e);
                self.set_phase(Phase::Idle);
                Err(e)
            }
        }
    }

    fn exchange(&mut self, settings: &mut AmpSettings) -> Result<(), SyncError> {
        self.set_phase(Phase::Connecting);
        let mut stream = self.connect()?;

        let fetch = !self.first_sync_done;
        let request = if fetch {
            wire::FETCH_REQUEST.to_string()
        } else {
            wire::update_request(settings)
        };
        stream.write_all(request.as_bytes())?;
        stream.flush()?;
        // The first connection has carried its request; from here on the
        // device's dump has been asked for and updates are pushed.
        self.first_sync_done = true;
        debug!(
            "sent {} request ({} bytes)",
            if fetch { "fetch" } else { "update" },
            request.len()
        );

        self.set_phase(Phase::AwaitingResponse);
        let reply = read_reply(&mut stream)?;
        self.conn = Some(stream);
        debug!("received {} bytes", reply.len());

        self.set_phase(Phase::Applying);
        *settings = wire::parse_response(&reply)?;
        info!("settings applied from {}", self.addr);
        Ok(())
    }

    fn connect(&self) -> Result<TcpStream, SyncError> {
        let addr = self
            .addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "address resolved to nothing")
            })?;
        let stream = TcpStream::connect_timeout(&addr, self.timeout)?;
        stream.set_read_timeout(Some(self.timeout))?;
        stream.set_write_timeout(Some(self.timeout))?;
        debug!("connected to {}", addr);
        Ok(stream)
    }

    fn teardown(&mut self) {
        if self.conn.take().is_some() {
            debug!("connection to {} closed", self.addr);
        }
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            debug!("session {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }
}

/// Read until the device closes the connection or goes quiet.
///
/// The stream's read timeout is already set; expiry before any byte has
/// arrived is a transport error, while expiry after data marks the end of
/// the reply, which is how the device frames its one-record response.
fn read_reply(stream: &mut TcpStream) -> Result<String, SyncError> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e)
                if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) =>
            {
                if buf.is_empty() {
                    return Err(SyncError::Transport(e));
                }
                break;
            }
            Err(e) => return Err(SyncError::Transport(e)),
        }
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
