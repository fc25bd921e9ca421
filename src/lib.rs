//! # Aquos IP Control Library
//!
//! A Rust library for controlling Sharp Aquos TVs through their IP control
//! interface: a line-oriented, password-protected command protocol on TCP
//! port 10002.
//!
//! This is a **protocol-only** library. Each call opens one connection,
//! logs in, sends one command, reads one reply and closes the connection.
//! No automatic retries, caching, or session reuse.
//!
//! ## Features
//!
//! - **Explicit operations** — `get_power()` reads, `set_power(1)` writes
//! - **Table-driven** — every command's mnemonic, direction and value range
//!   live in one static table ([`COMMAND_TABLE`])
//! - **Validated before I/O** — out-of-range values never reach the wire
//! - **No leaked sockets** — the connection is closed on every exit path
//! - **No panics** — all errors returned as `Result<T, AquosError>`
//!
//! ## Quick Start
//!
//! ```no_run
//! use aquos_rc::{Client, ClientConfig, DEFAULT_PORT};
//!
//! fn main() -> aquos_rc::Result<()> {
//!     let config = ClientConfig::new("192.168.1.40", DEFAULT_PORT, "admin", "secret");
//!     let client = Client::new(config)?;
//!
//!     // Query: no argument
//!     println!("power = {}", client.get_power()?);
//!
//!     // Write: one argument
//!     client.set_power(1)?;
//!     client.set_input(2)?;
//!     client.set_volume(20)?;
//!
//!     let info = client.info()?;
//!     println!("{} ({}), firmware {}", info.name, info.model, info.version);
//!     Ok(())
//! }
//! ```
//!
//! ## Wire Format
//!
//! Commands are a 4-character mnemonic, a 4-character space-padded
//! parameter and a carriage return. A parameter of `?` asks for the
//! current state:
//!
//! | Call | Frame |
//! |------|-------|
//! | `set_power(1)` | `POWR1   \r` |
//! | `get_power()` | `POWR?   \r` |
//! | `set_input(2)` | `IAVD2   \r` |
//! | `set_input(0)` | `ITVD0   \r` |
//! | `set_digital_channel_cable(7, 1)` | `DC2U007 \r`, `DC2L001 \r` |
//!
//! The TV replies `OK` to an accepted write, `ERR` to a rejected command,
//! or the requested value.
//!
//! ## Error Handling
//!
//! ```no_run
//! use aquos_rc::{AquosError, Client, ClientConfig, DEFAULT_PORT};
//!
//! let client = Client::new(ClientConfig::new("tv.local", DEFAULT_PORT, "admin", "secret"))?;
//!
//! match client.set_av_mode(3) {
//!     Ok(()) => println!("game mode"),
//!     Err(AquosError::DeviceRejected { token }) => println!("TV refused: {}", token),
//!     Err(AquosError::Timeout { phase }) => println!("timed out during {}", phase),
//!     Err(AquosError::Authentication { reason }) => println!("login failed: {}", reason),
//!     Err(e) => println!("error: {}", e),
//! }
//! # Ok::<(), AquosError>(())
//! ```
//!
//! ## Logging
//!
//! The library logs through [`tracing`]: connections, logins and frames at
//! `debug`, raw replies at `trace`, rejections at `warn`. Passwords are
//! never logged. Install any subscriber to see them.

#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod client;
mod command;
mod error;
mod response;
mod transport;

// Public re-exports
pub use client::{Client, ClientConfig, DeviceInfo};
pub use command::{
    encode_query, encode_write, Access, CommandFrame, CommandSpec, Operation, ValueKind,
    ValueRule, COMMAND_TABLE, LINE_TERMINATOR, MNEMONIC_WIDTH, PARAMETER_WIDTH,
    QUERY_PARAMETER,
};
pub use error::{AquosError, Phase, Result};
pub use response::{Reply, Value, ACK_TOKEN, ERROR_TOKEN};
pub use transport::{
    Session, DEFAULT_CONNECT_TIMEOUT, DEFAULT_PORT, DEFAULT_PROMPT_TIMEOUT, DEFAULT_TIMEOUT,
    MAX_LINE_LENGTH,
};
