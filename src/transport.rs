//! TCP session layer for the Aquos IP control protocol.
//!
//! This module provides [`Session`], which owns one TCP connection to the
//! TV for the duration of a single command: connect, log in, send one
//! line, read one line, close. It knows about sockets, prompts and line
//! terminators, but nothing about the command table.
//!
//! # Design
//!
//! - **One command per connection** - the TV drops idle sessions and does
//!   not cope well with long-lived ones, so nothing is pooled or reused
//! - **Synchronous** - blocking reads and writes bounded by timeouts
//! - **Always closed** - the socket is shut down on every exit path,
//!   either explicitly by [`Session::close`] or when the session is dropped
//!
//! # Login Handshake
//!
//! When login is enabled on the TV it greets each connection with prompts
//! terminated by `:`:
//!
//! ```text
//! TV:     Login:
//! client: <username>\r
//! TV:     Password:
//! client: <password>\r
//! TV:     \r\n            (accepted; any other text means rejected)
//! ```
//!
//! A TV with login disabled sends no prompt at all, so a client with
//! credentials configured waits at most the prompt timeout before sending
//! its command anyway.
//!
//! # Constants
//!
//! - [`DEFAULT_PORT`] - Default IP control port (10002)
//! - [`DEFAULT_TIMEOUT`] - Default read/write timeout (5 seconds)
//! - [`DEFAULT_CONNECT_TIMEOUT`] - Default connect timeout (2 seconds)
//! - [`DEFAULT_PROMPT_TIMEOUT`] - Default wait for a login prompt (1 second)

use std::io::{self, BufReader, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::client::ClientConfig;
use crate::command::LINE_TERMINATOR;
use crate::error::{AquosError, Phase, Result};
use crate::response::ACK_TOKEN;

/// Default TCP port of the IP control service.
pub const DEFAULT_PORT: u16 = 10002;

/// Default read/write timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Default wait for the first login prompt before assuming login is
/// disabled on the TV.
pub const DEFAULT_PROMPT_TIMEOUT: Duration = Duration::from_secs(1);

/// Longest line or prompt accepted from the TV.
pub const MAX_LINE_LENGTH: usize = 1024;

const PROMPT_TERMINATOR: u8 = b':';

/// A single authenticated connection to the TV.
pub struct Session {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
    peer: SocketAddr,
    timeout: Duration,
    // Set after a '\r' so that a following '\n' is not read as an empty line.
    skip_newline: bool,
    closed: bool,
}

impl Session {
    /// Connects to `host:port`.
    ///
    /// Every address `host` resolves to is tried in turn, each bounded by
    /// `connect_timeout`. Reads and writes on the resulting session are
    /// bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// - `Connection` if the name does not resolve or every address refuses
    /// - `Timeout` (phase `connect`) if the last attempt timed out
    pub fn open(
        host: &str,
        port: u16,
        connect_timeout: Duration,
        timeout: Duration,
    ) -> Result<Self> {
        let address = format!("{}:{}", host, port);
        let candidates = (host, port)
            .to_socket_addrs()
            .map_err(|e| AquosError::connection(&address, e))?;

        let mut last_error = io::Error::new(io::ErrorKind::NotFound, "no addresses resolved");
        for candidate in candidates {
            tracing::debug!(%candidate, "connecting");
            match TcpStream::connect_timeout(&candidate, connect_timeout) {
                Ok(stream) => return Self::from_stream(stream, timeout),
                Err(e) => last_error = e,
            }
        }

        Err(connect_failure(address, last_error))
    }

    fn from_stream(stream: TcpStream, timeout: Duration) -> Result<Self> {
        stream.set_nodelay(true)?;
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;
        let peer = stream.peer_addr()?;
        let reader = BufReader::new(stream.try_clone()?);

        tracing::debug!(%peer, "connected");
        Ok(Self {
            reader,
            writer: stream,
            peer,
            timeout,
            skip_newline: false,
            closed: false,
        })
    }

    /// Answers the TV's login prompts.
    ///
    /// Waits up to `prompt_timeout` for the first prompt. A TV with login
    /// disabled sends none, in which case nothing is written and `false` is
    /// returned so the caller can go straight to its command.
    ///
    /// Otherwise each prompt is answered with the credential it asks for,
    /// in the order the TV asks. Once both have been sent the TV's
    /// confirmation line is read: an empty line or `OK` means the login was
    /// accepted.
    ///
    /// # Errors
    ///
    /// - `Authentication` if the TV rejects the credentials, prompts for
    ///   something unexpected, or hangs up after a credential was sent
    /// - `Transport` if the TV hangs up before prompting at all
    /// - `Timeout` / `Transport` on other socket failures
    pub fn authenticate(
        &mut self,
        username: &str,
        password: &str,
        prompt_timeout: Duration,
    ) -> Result<bool> {
        let mut prompt = match self.read_first_prompt(prompt_timeout)? {
            Some(prompt) => prompt,
            None => {
                tracing::debug!(peer = %self.peer, "no login prompt, login disabled");
                return Ok(false);
            }
        };
        let mut sent_username = false;
        let mut sent_password = false;

        loop {
            let lowered = prompt.trim().to_ascii_lowercase();
            if lowered.contains("pass") && !sent_password {
                self.write_line(password)?;
                sent_password = true;
            } else if (lowered.contains("login") || lowered.contains("user")) && !sent_username {
                self.write_line(username)?;
                sent_username = true;
            } else {
                tracing::warn!(peer = %self.peer, prompt = %lowered, "unexpected login prompt");
                return Err(AquosError::authentication(format!(
                    "unexpected prompt {:?}",
                    lowered
                )));
            }

            if sent_username && sent_password {
                break;
            }
            // A credential is on the wire now, so a hang-up means rejection.
            let (next, _) = self
                .read_token(&[PROMPT_TERMINATOR])
                .map_err(hangup_is_rejection)?;
            prompt = next;
        }

        let (confirmation, terminator) = self
            .read_token(&[b'\r', b'\n', PROMPT_TERMINATOR])
            .map_err(hangup_is_rejection)?;
        let confirmation = confirmation.trim();
        if terminator == PROMPT_TERMINATOR {
            tracing::warn!(peer = %self.peer, "login prompt repeated, credentials rejected");
            return Err(AquosError::authentication(format!(
                "device prompted again: {:?}",
                confirmation
            )));
        }
        if !confirmation.is_empty() && confirmation != ACK_TOKEN {
            tracing::warn!(peer = %self.peer, reply = confirmation, "credentials rejected");
            return Err(AquosError::authentication(format!(
                "device rejected credentials: {:?}",
                confirmation
            )));
        }

        tracing::debug!(peer = %self.peer, %username, "authenticated");
        Ok(true)
    }

    /// Reads the first prompt, bounded by `wait` instead of the session
    /// timeout. Blank lines are skipped. Returns `None` if nothing arrives
    /// in time or the TV sends a plain line rather than a prompt.
    fn read_first_prompt(&mut self, wait: Duration) -> Result<Option<String>> {
        self.reader
            .get_ref()
            .set_read_timeout(Some(wait.min(self.timeout)))?;
        let result = loop {
            match self.read_token(&[b'\r', b'\n', PROMPT_TERMINATOR]) {
                Ok((line, terminator))
                    if terminator != PROMPT_TERMINATOR && line.trim().is_empty() =>
                {
                    continue
                }
                other => break other,
            }
        };
        self.reader.get_ref().set_read_timeout(Some(self.timeout))?;

        match result {
            Ok((prompt, PROMPT_TERMINATOR)) => Ok(Some(prompt)),
            Ok((line, _)) => {
                tracing::debug!(peer = %self.peer, %line, "greeting is not a prompt");
                Ok(None)
            }
            Err(AquosError::Timeout { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Sends `line` followed by the terminator and returns the reply line.
    ///
    /// The returned line has its terminator removed but is otherwise raw.
    ///
    /// # Errors
    ///
    /// - `Timeout` if the write or the reply exceeds the session timeout
    /// - `Transport` on reset, premature EOF, or other I/O failure
    pub fn send_line(&mut self, line: &str) -> Result<String> {
        self.write_line(line)?;
        tracing::debug!(peer = %self.peer, frame = line, "sent");

        let (reply, _) = self.read_token(&[b'\r', b'\n'])?;
        tracing::trace!(peer = %self.peer, %reply, "received");
        Ok(reply)
    }

    /// Shuts the connection down.
    pub fn close(mut self) {
        self.shutdown();
    }

    /// Returns the TV's socket address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        // NotConnected just means the TV hung up first.
        if let Err(e) = self.writer.shutdown(Shutdown::Both) {
            if e.kind() != io::ErrorKind::NotConnected {
                tracing::debug!(peer = %self.peer, error = %e, "shutdown failed");
            }
        }
        tracing::debug!(peer = %self.peer, "closed");
    }

    fn write_line(&mut self, text: &str) -> Result<()> {
        let mut bytes = Vec::with_capacity(text.len() + 1);
        bytes.extend_from_slice(text.as_bytes());
        bytes.push(LINE_TERMINATOR);

        self.writer
            .write_all(&bytes)
            .and_then(|_| self.writer.flush())
            .map_err(|e| AquosError::from_io(e, Phase::Write))
    }

    /// Reads up to any of `terminators`, returning the text and the
    /// terminator that ended it.
    fn read_token(&mut self, terminators: &[u8]) -> Result<(String, u8)> {
        let mut buffer = Vec::new();
        loop {
            let mut byte = [0u8; 1];
            match self.reader.read(&mut byte) {
                Ok(0) => {
                    return Err(AquosError::Transport(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "connection closed by device",
                    )))
                }
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(AquosError::from_io(e, Phase::Read)),
            }

            let byte = byte[0];
            if std::mem::take(&mut self.skip_newline) && byte == b'\n' {
                continue;
            }
            if terminators.contains(&byte) {
                self.skip_newline = byte == b'\r';
                return Ok((String::from_utf8_lossy(&buffer).into_owned(), byte));
            }

            buffer.push(byte);
            if buffer.len() > MAX_LINE_LENGTH {
                return Err(AquosError::protocol(format!(
                    "line exceeds {} bytes",
                    MAX_LINE_LENGTH
                )));
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("peer", &self.peer)
            .field("local_addr", &self.writer.local_addr().ok())
            .field("closed", &self.closed)
            .finish()
    }
}

fn connect_failure(address: String, err: io::Error) -> AquosError {
    match err.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => AquosError::Timeout {
            phase: Phase::Connect,
        },
        _ => AquosError::connection(address, err),
    }
}

fn hangup_is_rejection(err: AquosError) -> AquosError {
    match err {
        AquosError::Transport(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            AquosError::authentication("device closed the connection during login")
        }
        other => other,
    }
}

/// Runs `f` inside a fresh session: open, log in, `f`, close.
///
/// The socket is released whether `f` succeeds or fails, and also when
/// opening or logging in fails part-way. An empty username skips the login
/// handshake entirely; otherwise a TV that sends no prompt within the
/// prompt timeout is treated as having login disabled.
pub(crate) fn with_session<T>(
    config: &ClientConfig,
    f: impl FnOnce(&mut Session) -> Result<T>,
) -> Result<T> {
    let mut session = Session::open(
        &config.host,
        config.port,
        config.connect_timeout,
        config.timeout,
    )?;
    if !config.username.is_empty() {
        session.authenticate(&config.username, &config.password, config.prompt_timeout)?;
    }
    let result = f(&mut session);
    session.close();
    result
}
