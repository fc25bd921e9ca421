//! High-level client for controlling an Aquos TV.
//!
//! This module provides the [`Client`] struct, the primary interface for
//! controlling a TV over the IP control protocol.
//!
//! # Overview
//!
//! Every operation has an explicit getter and/or setter (`get_power`,
//! `set_power`, ...). They all go through two dispatch methods,
//! [`Client::query`] and [`Client::write`], which:
//! - validate and encode the command from the command table (no I/O yet)
//! - open a fresh connection and log in
//! - send the frame and read the reply
//! - close the connection
//! - decode the reply into a value or an error
//!
//! # Example
//!
//! ```no_run
//! use aquos_rc::{Client, ClientConfig, DEFAULT_PORT};
//!
//! let config = ClientConfig::new("192.168.1.40", DEFAULT_PORT, "admin", "secret");
//! let client = Client::new(config)?;
//!
//! if client.get_power()? == 0 {
//!     client.set_power(1)?;
//! }
//! client.set_input(2)?;
//! client.set_volume(18)?;
//! # Ok::<(), aquos_rc::AquosError>(())
//! ```
//!
//! # Thread Safety
//!
//! `Client` holds only its configuration, so it can be shared between
//! threads freely. Concurrent calls open concurrent connections; whether
//! the TV accepts several at once depends on the model.

use std::time::Duration;

use crate::command::{encode_query, encode_write, CommandFrame, Operation};
use crate::error::{AquosError, Result};
use crate::response::{Reply, Value};
use crate::transport::{
    with_session, DEFAULT_CONNECT_TIMEOUT, DEFAULT_PROMPT_TIMEOUT, DEFAULT_TIMEOUT,
};

/// Configuration for creating a client.
#[derive(Clone)]
pub struct ClientConfig {
    /// TV host name or IP address.
    pub host: String,
    /// IP control port.
    pub port: u16,
    /// Login name. Leave empty if login is disabled on the TV.
    pub username: String,
    /// Login password.
    pub password: String,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// Read/write timeout for prompts, commands and replies.
    pub timeout: Duration,
    /// How long to wait for the first login prompt before assuming login
    /// is disabled on the TV. Capped at `timeout`.
    pub prompt_timeout: Duration,
}

impl ClientConfig {
    /// Creates a new configuration with default timeouts.
    ///
    /// # Example
    ///
    /// ```
    /// use aquos_rc::{ClientConfig, DEFAULT_PORT};
    ///
    /// let config = ClientConfig::new("192.168.1.40", DEFAULT_PORT, "admin", "secret");
    /// assert_eq!(config.address(), "192.168.1.40:10002");
    /// ```
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            password: password.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            timeout: DEFAULT_TIMEOUT,
            prompt_timeout: DEFAULT_PROMPT_TIMEOUT,
        }
    }

    /// Sets the read/write timeout (default is 5 seconds).
    ///
    /// # Example
    ///
    /// ```
    /// use aquos_rc::{ClientConfig, DEFAULT_PORT};
    /// use std::time::Duration;
    ///
    /// let config = ClientConfig::new("192.168.1.40", DEFAULT_PORT, "admin", "secret")
    ///     .with_timeout(Duration::from_secs(10));
    /// ```
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the connect timeout (default is 2 seconds).
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the wait for the first login prompt (default is 1 second).
    pub fn with_prompt_timeout(mut self, timeout: Duration) -> Self {
        self.prompt_timeout = timeout;
        self
    }

    /// Returns `host:port`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("connect_timeout", &self.connect_timeout)
            .field("timeout", &self.timeout)
            .field("prompt_timeout", &self.prompt_timeout)
            .finish()
    }
}

/// Name, model and software version reported by the TV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// TV name.
    pub name: String,
    /// Model name.
    pub model: String,
    /// Software version.
    pub version: String,
}

/// Client for an Aquos TV.
///
/// Each call produces exactly one connection, one command and one reply.
/// No retries, caching or session reuse.
///
/// # Example
///
/// ```no_run
/// use aquos_rc::{Client, ClientConfig, DEFAULT_PORT};
///
/// let client = Client::new(ClientConfig::new("tv.local", DEFAULT_PORT, "admin", "secret")).unwrap();
///
/// let volume = client.get_volume().unwrap();
/// client.set_volume(volume + 1).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    config: ClientConfig,
}

impl Client {
    /// Creates a new client. No connection is made until the first call.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the host is empty or any timeout is zero.
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.host.trim().is_empty() {
            return Err(AquosError::invalid_argument("host", "must not be empty"));
        }
        if config.timeout.is_zero() {
            return Err(AquosError::invalid_argument("timeout", "must be non-zero"));
        }
        if config.connect_timeout.is_zero() {
            return Err(AquosError::invalid_argument(
                "connect_timeout",
                "must be non-zero",
            ));
        }
        if config.prompt_timeout.is_zero() {
            return Err(AquosError::invalid_argument(
                "prompt_timeout",
                "must be non-zero",
            ));
        }
        Ok(Self { config })
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Queries the current state of `operation`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The operation cannot be queried (before any I/O)
    /// - The TV cannot be reached, rejects the login, or times out
    /// - The TV answers with an error token or an unparseable reply
    pub fn query(&self, operation: Operation) -> Result<Value> {
        let frame = encode_query(operation)?;
        let reply = self.exchange(operation, &frame)?;
        Reply::parse(&reply)
            .into_value(operation)
            .map_err(|e| log_failure(operation, e))
    }

    /// Sets `operation` to `value`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The operation is read-only or `value` is out of range (before any I/O)
    /// - The TV cannot be reached, rejects the login, or times out
    /// - The TV does not acknowledge the command
    pub fn write(&self, operation: Operation, value: u32) -> Result<()> {
        let frame = encode_write(operation, value)?;
        self.send_frame(operation, &frame)
    }

    fn send_frame(&self, operation: Operation, frame: &CommandFrame) -> Result<()> {
        let reply = self.exchange(operation, frame)?;
        Reply::parse(&reply)
            .into_ack(operation)
            .map_err(|e| log_failure(operation, e))
    }

    fn exchange(&self, operation: Operation, frame: &CommandFrame) -> Result<String> {
        let _span = tracing::debug_span!("command", op = %operation, host = %self.config.host)
            .entered();
        with_session(&self.config, |session| session.send_line(&frame.to_string()))
            .map_err(|e| log_failure(operation, e))
    }

    fn query_integer(&self, operation: Operation) -> Result<u32> {
        self.query(operation)?.into_integer()
    }

    fn query_text(&self, operation: Operation) -> Result<String> {
        self.query(operation)?.into_text()
    }

    /// Returns whether the TV accepts power-on commands (0 off, 1 RS-232C, 2 IP).
    pub fn get_power_on_command_settings(&self) -> Result<u32> {
        self.query_integer(Operation::PowerOnCommandSettings)
    }

    /// Sets whether the TV accepts power-on commands.
    ///
    /// # Arguments
    ///
    /// * `setting` - 0 disabled, 1 accepted via RS-232C, 2 accepted via IP
    pub fn set_power_on_command_settings(&self, setting: u32) -> Result<()> {
        self.write(Operation::PowerOnCommandSettings, setting)
    }

    /// Returns the power state (0 standby, 1 on).
    ///
    /// # Example
    ///
    /// ```no_run
    /// use aquos_rc::{Client, ClientConfig, DEFAULT_PORT};
    ///
    /// let client = Client::new(ClientConfig::new("tv.local", DEFAULT_PORT, "admin", "secret")).unwrap();
    /// println!("power = {}", client.get_power().unwrap());
    /// ```
    pub fn get_power(&self) -> Result<u32> {
        self.query_integer(Operation::Power)
    }

    /// Switches the TV to standby (0) or on (1).
    pub fn set_power(&self, state: u32) -> Result<()> {
        self.write(Operation::Power, state)
    }

    /// Returns the selected input.
    pub fn get_input(&self) -> Result<u32> {
        self.query_integer(Operation::Input)
    }

    /// Selects an input.
    ///
    /// # Arguments
    ///
    /// * `input` - 0 TV/antenna, 1-4 HDMI 1-4, 5 component, 6-7 video 1-2,
    ///   8 PC, 9 model specific
    pub fn set_input(&self, input: u32) -> Result<()> {
        self.write(Operation::Input, input)
    }

    /// Returns the AV mode.
    pub fn get_av_mode(&self) -> Result<u32> {
        self.query_integer(Operation::AvMode)
    }

    /// Sets the AV mode.
    ///
    /// # Arguments
    ///
    /// * `mode` - 0 toggle, 1 standard, 2 movie, 3 game, 4 user,
    ///   5 dynamic (fixed), 6 dynamic, 7 PC, 8 x.v.Color, 13 vintage movie,
    ///   14 standard 3D, 15 movie 3D, 16 game 3D, 17 movie THX, 100 auto
    pub fn set_av_mode(&self, mode: u32) -> Result<()> {
        self.write(Operation::AvMode, mode)
    }

    /// Returns the volume (0-100).
    pub fn get_volume(&self) -> Result<u32> {
        self.query_integer(Operation::Volume)
    }

    /// Sets the volume (0-100).
    pub fn set_volume(&self, level: u32) -> Result<()> {
        self.write(Operation::Volume, level)
    }

    /// Returns the view mode.
    pub fn get_view_mode(&self) -> Result<u32> {
        self.query_integer(Operation::ViewMode)
    }

    /// Sets the view mode.
    ///
    /// # Arguments
    ///
    /// * `mode` - 0 toggle, 1 side bar, 2 S. stretch, 3 zoom, 4 stretch,
    ///   5 normal (PC), 6 zoom (PC), 7 stretch (PC), 8 dot by dot,
    ///   9 full screen, 10 auto, 11 original
    pub fn set_view_mode(&self, mode: u32) -> Result<()> {
        self.write(Operation::ViewMode, mode)
    }

    /// Returns the mute state.
    pub fn get_mute(&self) -> Result<u32> {
        self.query_integer(Operation::Mute)
    }

    /// Mutes (1), unmutes (2) or toggles (0) the sound.
    pub fn set_mute(&self, state: u32) -> Result<()> {
        self.write(Operation::Mute, state)
    }

    /// Returns the surround mode.
    pub fn get_surround(&self) -> Result<u32> {
        self.query_integer(Operation::Surround)
    }

    /// Sets the surround mode.
    ///
    /// # Arguments
    ///
    /// * `mode` - 0 toggle, 1 on, 2 off, 4 3D hall, 5 3D movie,
    ///   6 3D standard, 7 3D stadium
    pub fn set_surround(&self, mode: u32) -> Result<()> {
        self.write(Operation::Surround, mode)
    }

    /// Returns the minutes left on the sleep timer.
    pub fn get_sleep_timer(&self) -> Result<u32> {
        self.query_integer(Operation::Sleep)
    }

    /// Sets the sleep timer: 0 off, 1-4 for 30, 60, 90 or 120 minutes.
    pub fn set_sleep_timer(&self, setting: u32) -> Result<()> {
        self.write(Operation::Sleep, setting)
    }

    /// Returns the analog channel.
    pub fn get_analog_channel(&self) -> Result<u32> {
        self.query_integer(Operation::AnalogChannel)
    }

    /// Tunes an analog channel (1-135).
    pub fn set_analog_channel(&self, channel: u32) -> Result<()> {
        self.write(Operation::AnalogChannel, channel)
    }

    /// Returns the digital air channel as reported, `major * 100 + minor`.
    pub fn get_digital_channel_air(&self) -> Result<u32> {
        self.query_integer(Operation::DigitalChannelAir)
    }

    /// Tunes digital air channel `major.minor`.
    ///
    /// # Arguments
    ///
    /// * `major` - Major channel (1-99)
    /// * `minor` - Minor channel (1-99)
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use aquos_rc::{Client, ClientConfig, DEFAULT_PORT};
    /// # let client = Client::new(ClientConfig::new("tv.local", DEFAULT_PORT, "admin", "secret")).unwrap();
    /// // Channel 12.3
    /// client.set_digital_channel_air(12, 3)?;
    /// # Ok::<(), aquos_rc::AquosError>(())
    /// ```
    pub fn set_digital_channel_air(&self, major: u32, minor: u32) -> Result<()> {
        if !(1..=99).contains(&major) {
            return Err(AquosError::invalid_argument("major", "must be 1-99"));
        }
        if !(1..=99).contains(&minor) {
            return Err(AquosError::invalid_argument("minor", "must be 1-99"));
        }
        self.write(Operation::DigitalChannelAir, major * 100 + minor)
    }

    /// Returns the major half of the digital cable channel.
    pub fn get_digital_channel_cable(&self) -> Result<u32> {
        self.query_integer(Operation::DigitalChannelCableMajor)
    }

    /// Tunes digital cable channel `major.minor`.
    ///
    /// The TV takes the two halves as separate commands, so this makes two
    /// connections. Both values are validated before the first one.
    ///
    /// # Arguments
    ///
    /// * `major` - Major channel (1-999)
    /// * `minor` - Minor channel (0-999)
    pub fn set_digital_channel_cable(&self, major: u32, minor: u32) -> Result<()> {
        let major_frame = encode_write(Operation::DigitalChannelCableMajor, major)?;
        let minor_frame = encode_write(Operation::DigitalChannelCableMinor, minor)?;
        self.send_frame(Operation::DigitalChannelCableMajor, &major_frame)?;
        self.send_frame(Operation::DigitalChannelCableMinor, &minor_frame)
    }

    /// Changes the channel +1.
    pub fn channel_up(&self) -> Result<()> {
        self.write(Operation::ChannelUp, 1)
    }

    /// Changes the channel -1.
    pub fn channel_down(&self) -> Result<()> {
        self.write(Operation::ChannelDown, 1)
    }

    /// Simulates a remote control key press.
    ///
    /// # Arguments
    ///
    /// * `code` - Key code: 0-9 digits, 10 dot, 11 ent, 12 power,
    ///   13 display, 14 power (source), 15-21 transport keys, 23 option,
    ///   24 sleep, 27 CC, 28 AV mode, 29 view mode, 30 flashback, 31 mute,
    ///   32/33 vol -/+, 34/35 ch up/down, 36 input, 38 menu,
    ///   39 SmartCentral, 40 enter, 41-44 up/down/left/right, 45 return,
    ///   46 exit, 47 favorite ch, 49 audio, 50-53 A-D, 54 freeze,
    ///   55-57 fav app 1-3, 58 2D/3D, 59 Netflix, 60 AAL, 61 manual
    pub fn remote_button(&self, code: u32) -> Result<()> {
        self.write(Operation::RemoteButton, code)
    }

    /// Returns the TV name.
    pub fn get_tv_name(&self) -> Result<String> {
        self.query_text(Operation::TvName)
    }

    /// Returns the model name.
    pub fn get_model_name(&self) -> Result<String> {
        self.query_text(Operation::ModelName)
    }

    /// Returns the software version.
    pub fn get_software_version(&self) -> Result<String> {
        self.query_text(Operation::SoftwareVersion)
    }

    /// Returns name, model and software version (three connections).
    pub fn info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo {
            name: self.get_tv_name()?,
            model: self.get_model_name()?,
            version: self.get_software_version()?,
        })
    }
}

fn log_failure(operation: Operation, err: AquosError) -> AquosError {
    match &err {
        AquosError::DeviceRejected { token } => {
            tracing::warn!(op = %operation, %token, "device rejected command")
        }
        _ => tracing::debug!(op = %operation, error = %err, "command failed"),
    }
    err
}
