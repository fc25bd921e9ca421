//! Reply classification and decoding.
//!
//! The TV answers every command with a single text line:
//!
//! | Reply | Meaning |
//! |-------|---------|
//! | `OK` | A write was accepted |
//! | `ERR` | The command was rejected (unsupported, out of range, wrong state) |
//! | anything else | The payload of a query: a number or a text label |
//!
//! Surrounding whitespace is not significant; some firmwares pad replies
//! with trailing spaces.
//!
//! # Example
//!
//! ```
//! use aquos_rc::{Operation, Reply, Value};
//!
//! let reply = Reply::parse("1 ");
//! assert_eq!(reply.into_value(Operation::Power).unwrap(), Value::Integer(1));
//!
//! assert!(Reply::parse("OK").into_ack(Operation::Volume).is_ok());
//! assert!(Reply::parse("ERR").into_ack(Operation::Volume).is_err());
//! ```

use std::fmt;

use crate::command::{Operation, ValueKind};
use crate::error::{AquosError, Result};

/// Token acknowledging a write.
pub const ACK_TOKEN: &str = "OK";

/// Token the TV uses to reject a command.
pub const ERROR_TOKEN: &str = "ERR";

/// A classified reply line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The write was accepted.
    Ack,
    /// The TV rejected the command; carries the raw token.
    Rejected(String),
    /// Query payload, trimmed.
    Payload(String),
}

impl Reply {
    /// Classifies a raw reply line.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line == ACK_TOKEN {
            Reply::Ack
        } else if is_error_token(line) {
            Reply::Rejected(line.to_string())
        } else {
            Reply::Payload(line.to_string())
        }
    }

    /// Interprets the reply to a write of `operation`.
    ///
    /// # Errors
    ///
    /// - `DeviceRejected` if the TV answered with an error token
    /// - `Protocol` if the TV answered with anything but an acknowledgement
    pub fn into_ack(self, operation: Operation) -> Result<()> {
        match self {
            Reply::Ack => Ok(()),
            Reply::Rejected(token) => Err(AquosError::device_rejected(token)),
            Reply::Payload(text) => Err(AquosError::protocol(format!(
                "expected acknowledgement for {}, got {:?}",
                operation, text
            ))),
        }
    }

    /// Interprets the reply to a query of `operation`, typed by its table row.
    ///
    /// # Errors
    ///
    /// - `DeviceRejected` if the TV answered with an error token
    /// - `Protocol` if the reply is empty, an acknowledgement, or does not
    ///   parse as the operation's value kind
    pub fn into_value(self, operation: Operation) -> Result<Value> {
        let text = match self {
            Reply::Payload(text) => text,
            Reply::Rejected(token) => return Err(AquosError::device_rejected(token)),
            Reply::Ack => {
                return Err(AquosError::protocol(format!(
                    "expected a value for {}, got acknowledgement",
                    operation
                )))
            }
        };
        if text.is_empty() {
            return Err(AquosError::protocol(format!(
                "empty reply to {} query",
                operation
            )));
        }

        match operation.spec().kind {
            ValueKind::Integer => text.parse::<u32>().map(Value::Integer).map_err(|_| {
                AquosError::protocol(format!(
                    "expected an integer for {}, got {:?}",
                    operation, text
                ))
            }),
            ValueKind::Text => Ok(Value::Text(text)),
        }
    }
}

/// A decoded query result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Numeric state.
    Integer(u32),
    /// Text label.
    Text(String),
}

impl Value {
    /// Returns the integer, if this is one.
    pub fn as_integer(&self) -> Option<u32> {
        match self {
            Value::Integer(value) => Some(*value),
            Value::Text(_) => None,
        }
    }

    /// Returns the text, if this is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Integer(_) => None,
            Value::Text(text) => Some(text),
        }
    }

    pub(crate) fn into_integer(self) -> Result<u32> {
        match self {
            Value::Integer(value) => Ok(value),
            Value::Text(text) => Err(AquosError::protocol(format!(
                "expected an integer, got {:?}",
                text
            ))),
        }
    }

    pub(crate) fn into_text(self) -> Result<String> {
        match self {
            Value::Text(text) => Ok(text),
            Value::Integer(value) => Ok(value.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(value) => write!(f, "{}", value),
            Value::Text(text) => f.write_str(text),
        }
    }
}

/// `ERR` alone or followed by a separator, e.g. `ERR 1`. A payload that
/// merely begins with the letters (a TV named "ERRAND") is not a rejection.
fn is_error_token(line: &str) -> bool {
    match line.strip_prefix(ERROR_TOKEN) {
        Some(rest) => rest.chars().next().map_or(true, |c| !c.is_alphanumeric()),
        None => false,
    }
}
