//! Error types for the Aquos IP control protocol.

use std::fmt;
use std::io;
use thiserror::Error;

/// Result type alias for Aquos operations.
pub type Result<T> = std::result::Result<T, AquosError>;

/// Phase of a call in which a deadline expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Establishing the TCP connection.
    Connect,
    /// Waiting for a prompt or reply from the TV.
    Read,
    /// Writing credentials or a command frame.
    Write,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Connect => write!(f, "connect"),
            Phase::Read => write!(f, "read"),
            Phase::Write => write!(f, "write"),
        }
    }
}

/// Errors that can occur while talking to an Aquos TV.
#[derive(Debug, Error)]
pub enum AquosError {
    /// The TV could not be reached (DNS failure, refused, unreachable).
    #[error("Cannot connect to {address}: {source}")]
    Connection {
        /// Address that was being connected to.
        address: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The TV rejected the credentials or the login handshake went wrong.
    #[error("Authentication failed: {reason}")]
    Authentication {
        /// Description of the failure, including the TV's text if any.
        reason: String,
    },

    /// I/O failure in the middle of an exchange.
    #[error("Transport error: {0}")]
    Transport(#[from] io::Error),

    /// A connect, read or write deadline expired.
    #[error("Timed out during {phase}")]
    Timeout {
        /// Phase that exceeded its deadline.
        phase: Phase,
    },

    /// The caller supplied a value the command table does not allow.
    #[error("Invalid argument '{parameter}': {reason}")]
    InvalidArgument {
        /// Name of the invalid parameter.
        parameter: String,
        /// Description of why the parameter is invalid.
        reason: String,
    },

    /// The TV answered with an error token.
    #[error("Device rejected command: {token}")]
    DeviceRejected {
        /// Raw token returned by the TV.
        token: String,
    },

    /// The reply could not be interpreted as expected.
    #[error("Protocol error: {reason}")]
    Protocol {
        /// Description of the malformed reply.
        reason: String,
    },
}

impl AquosError {
    /// Creates a new `Connection` error.
    pub fn connection(address: impl Into<String>, source: io::Error) -> Self {
        Self::Connection {
            address: address.into(),
            source,
        }
    }

    /// Creates a new `Authentication` error.
    ///
    /// # Example
    ///
    /// ```
    /// use aquos_rc::AquosError;
    ///
    /// let err = AquosError::authentication("device closed the connection");
    /// ```
    pub fn authentication(reason: impl Into<String>) -> Self {
        Self::Authentication {
            reason: reason.into(),
        }
    }

    /// Creates a new `InvalidArgument` error.
    ///
    /// # Example
    ///
    /// ```
    /// use aquos_rc::AquosError;
    ///
    /// let err = AquosError::invalid_argument("volume", "must be 0-100");
    /// ```
    pub fn invalid_argument(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new `DeviceRejected` error.
    pub fn device_rejected(token: impl Into<String>) -> Self {
        Self::DeviceRejected {
            token: token.into(),
        }
    }

    /// Creates a new `Protocol` error.
    ///
    /// # Example
    ///
    /// ```
    /// use aquos_rc::AquosError;
    ///
    /// let err = AquosError::protocol("expected an integer, got \"abc\"");
    /// ```
    pub fn protocol(reason: impl Into<String>) -> Self {
        Self::Protocol {
            reason: reason.into(),
        }
    }

    /// Maps an I/O error raised during `phase` to the matching variant.
    ///
    /// Socket timeouts surface as `WouldBlock` on Unix and `TimedOut` on
    /// Windows; both become [`AquosError::Timeout`].
    pub(crate) fn from_io(err: io::Error, phase: Phase) -> Self {
        match err.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => Self::Timeout { phase },
            _ => Self::Transport(err),
        }
    }

    /// Returns true if this error was raised before any network activity.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }
}
