//! Command table and wire-frame encoding.
//!
//! Every logical operation the TV understands is described by one row of a
//! static table: its 4-character mnemonic, whether it can be read and/or
//! written, the values a write accepts, and how a query reply is typed.
//! Encoding is driven entirely by that table, so adding an operation means
//! adding a row.
//!
//! # Frame Layout
//!
//! | Bytes | Field | Description |
//! |-------|-------|-------------|
//! | 0-3 | Mnemonic | Command code, e.g. `POWR` |
//! | 4-7 | Parameter | Left-justified, space-padded value or `?` |
//! | 8 | Terminator | Carriage return (`\r`) |
//!
//! # Example
//!
//! ```
//! use aquos_rc::{encode_query, encode_write, Operation};
//!
//! let frame = encode_write(Operation::Input, 2).unwrap();
//! assert_eq!(frame.to_bytes(), b"IAVD2   \r");
//!
//! let frame = encode_query(Operation::Power).unwrap();
//! assert_eq!(frame.to_bytes(), b"POWR?   \r");
//!
//! // Out-of-range values never reach the wire
//! assert!(encode_write(Operation::Power, 2).is_err());
//! ```

use std::fmt;

use crate::error::{AquosError, Result};

/// Length of a command mnemonic.
pub const MNEMONIC_WIDTH: usize = 4;

/// Width of the parameter field that follows the mnemonic.
pub const PARAMETER_WIDTH: usize = 4;

/// Line terminator used in both directions.
pub const LINE_TERMINATOR: u8 = b'\r';

/// Parameter asking the TV to report its current setting.
pub const QUERY_PARAMETER: &str = "?";

/// Whether an operation can be queried, written, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Query and write.
    ReadWrite,
    /// Query only (device information).
    ReadOnly,
    /// Write only (actions such as channel up).
    WriteOnly,
}

impl Access {
    /// Returns true if the operation can be queried.
    pub fn can_read(self) -> bool {
        matches!(self, Access::ReadWrite | Access::ReadOnly)
    }

    /// Returns true if the operation can be written.
    pub fn can_write(self) -> bool {
        matches!(self, Access::ReadWrite | Access::WriteOnly)
    }
}

/// Type of the payload a query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Unsigned decimal number.
    Integer,
    /// Free-form text such as a model name.
    Text,
}

/// Logical operations supported by the TV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Whether the TV accepts power-on commands (0 off, 1 RS-232C, 2 IP).
    PowerOnCommandSettings,
    /// Power state (0 off, 1 on).
    Power,
    /// Input selection (0 TV, 1-9 external inputs).
    Input,
    /// AV mode.
    AvMode,
    /// Volume level (0-100).
    Volume,
    /// View (wide) mode.
    ViewMode,
    /// Mute (0 toggle, 1 on, 2 off).
    Mute,
    /// Surround mode.
    Surround,
    /// Sleep timer. Queries report the minutes left.
    Sleep,
    /// Analog channel (1-135).
    AnalogChannel,
    /// Digital air channel, encoded as `major * 100 + minor`.
    DigitalChannelAir,
    /// Major half of a digital cable channel.
    DigitalChannelCableMajor,
    /// Minor half of a digital cable channel.
    DigitalChannelCableMinor,
    /// Channel +1.
    ChannelUp,
    /// Channel -1.
    ChannelDown,
    /// Simulated remote control key press.
    RemoteButton,
    /// TV name.
    TvName,
    /// Model name.
    ModelName,
    /// Software version.
    SoftwareVersion,
}

/// Extra condition a write value must meet on top of its spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueRule {
    /// `major * 100 + minor` encoding; the minor half must be 1-99.
    NonZeroMinor,
}

impl ValueRule {
    /// Returns true if `value` satisfies the rule.
    pub fn allows(self, value: u32) -> bool {
        match self {
            ValueRule::NonZeroMinor => value % 100 != 0,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            ValueRule::NonZeroMinor => "minor channel 01-99",
        }
    }
}

/// One row of the command table.
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    /// Operation described by this row.
    pub operation: Operation,
    /// Human-readable name, used in errors and logs.
    pub name: &'static str,
    /// Wire mnemonic.
    pub mnemonic: &'static str,
    /// Mnemonic used instead of `mnemonic` when writing 0.
    pub zero_mnemonic: Option<&'static str>,
    /// Read/write direction.
    pub access: Access,
    /// Inclusive value spans accepted by a write.
    pub values: &'static [(u32, u32)],
    /// Condition applied after the span check.
    pub rule: Option<ValueRule>,
    /// Minimum digit count; values are zero-padded to it before space padding.
    pub digits: usize,
    /// Parameter sent for a query.
    pub query_parameter: &'static str,
    /// Type of a query reply.
    pub kind: ValueKind,
}

impl CommandSpec {
    /// Returns true if `value` is inside one of the declared spans and
    /// satisfies the row's rule, if any.
    pub fn accepts(&self, value: u32) -> bool {
        self.values
            .iter()
            .any(|&(low, high)| (low..=high).contains(&value))
            && self.rule.map_or(true, |rule| rule.allows(value))
    }

    /// Formats the accepted values, e.g. `0-8, 13-17, 100`.
    pub fn describe_values(&self) -> String {
        let spans = self
            .values
            .iter()
            .map(|&(low, high)| {
                if low == high {
                    low.to_string()
                } else {
                    format!("{}-{}", low, high)
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        match self.rule {
            Some(rule) => format!("{} ({})", spans, rule.describe()),
            None => spans,
        }
    }
}

const fn read_write(
    operation: Operation,
    name: &'static str,
    mnemonic: &'static str,
    values: &'static [(u32, u32)],
) -> CommandSpec {
    CommandSpec {
        operation,
        name,
        mnemonic,
        zero_mnemonic: None,
        access: Access::ReadWrite,
        values,
        rule: None,
        digits: 0,
        query_parameter: QUERY_PARAMETER,
        kind: ValueKind::Integer,
    }
}

const fn write_only(
    operation: Operation,
    name: &'static str,
    mnemonic: &'static str,
    values: &'static [(u32, u32)],
) -> CommandSpec {
    CommandSpec {
        access: Access::WriteOnly,
        ..read_write(operation, name, mnemonic, values)
    }
}

// Device information queries take "1" rather than "?".
const fn info(operation: Operation, name: &'static str, mnemonic: &'static str) -> CommandSpec {
    CommandSpec {
        access: Access::ReadOnly,
        query_parameter: "1",
        kind: ValueKind::Text,
        ..read_write(operation, name, mnemonic, &[])
    }
}

/// The command table, in `Operation` declaration order.
pub static COMMAND_TABLE: [CommandSpec; 19] = [
    read_write(Operation::PowerOnCommandSettings, "power_on_command_settings", "RSPW", &[(0, 2)]),
    read_write(Operation::Power, "power", "POWR", &[(0, 1)]),
    CommandSpec {
        zero_mnemonic: Some("ITVD"),
        ..read_write(Operation::Input, "input", "IAVD", &[(0, 9)])
    },
    read_write(Operation::AvMode, "av_mode", "AVMD", &[(0, 8), (13, 17), (100, 100)]),
    read_write(Operation::Volume, "volume", "VOLM", &[(0, 100)]),
    read_write(Operation::ViewMode, "view_mode", "WIDE", &[(0, 11)]),
    read_write(Operation::Mute, "mute", "MUTE", &[(0, 2)]),
    read_write(Operation::Surround, "surround", "ACSU", &[(0, 2), (4, 7)]),
    read_write(Operation::Sleep, "sleep", "OFTM", &[(0, 4)]),
    read_write(Operation::AnalogChannel, "analog_channel", "DCCH", &[(1, 135)]),
    CommandSpec {
        rule: Some(ValueRule::NonZeroMinor),
        ..read_write(Operation::DigitalChannelAir, "digital_channel_air", "DA2P", &[(101, 9999)])
    },
    CommandSpec {
        digits: 3,
        ..read_write(
            Operation::DigitalChannelCableMajor,
            "digital_channel_cable_major",
            "DC2U",
            &[(1, 999)],
        )
    },
    CommandSpec {
        digits: 3,
        ..write_only(
            Operation::DigitalChannelCableMinor,
            "digital_channel_cable_minor",
            "DC2L",
            &[(0, 999)],
        )
    },
    write_only(Operation::ChannelUp, "channel_up", "CHUP", &[(1, 1)]),
    write_only(Operation::ChannelDown, "channel_down", "CHDW", &[(1, 1)]),
    write_only(
        Operation::RemoteButton,
        "remote_button",
        "RCKY",
        &[(0, 21), (23, 24), (27, 36), (38, 47), (49, 61)],
    ),
    info(Operation::TvName, "tv_name", "TVNM"),
    info(Operation::ModelName, "model_name", "MNRD"),
    info(Operation::SoftwareVersion, "software_version", "SWVN"),
];

impl Operation {
    /// Every operation, in table order.
    pub const ALL: [Operation; 19] = [
        Operation::PowerOnCommandSettings,
        Operation::Power,
        Operation::Input,
        Operation::AvMode,
        Operation::Volume,
        Operation::ViewMode,
        Operation::Mute,
        Operation::Surround,
        Operation::Sleep,
        Operation::AnalogChannel,
        Operation::DigitalChannelAir,
        Operation::DigitalChannelCableMajor,
        Operation::DigitalChannelCableMinor,
        Operation::ChannelUp,
        Operation::ChannelDown,
        Operation::RemoteButton,
        Operation::TvName,
        Operation::ModelName,
        Operation::SoftwareVersion,
    ];

    /// Returns the table row describing this operation.
    pub fn spec(self) -> &'static CommandSpec {
        &COMMAND_TABLE[self as usize]
    }

    /// Returns the operation's name.
    pub fn name(self) -> &'static str {
        self.spec().name
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An encoded command: mnemonic plus fixed-width parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFrame {
    mnemonic: String,
    parameter: String,
}

impl CommandFrame {
    /// Builds a frame from a raw mnemonic and parameter.
    ///
    /// The parameter is left-justified and space-padded to
    /// [`PARAMETER_WIDTH`]; longer parameters are truncated.
    ///
    /// # Errors
    ///
    /// Returns an error if the mnemonic is not exactly 4 ASCII alphanumeric
    /// characters, or if the parameter contains non-printable or non-ASCII
    /// characters.
    ///
    /// # Example
    ///
    /// ```
    /// use aquos_rc::CommandFrame;
    ///
    /// let frame = CommandFrame::new("VOLM", "15").unwrap();
    /// assert_eq!(frame.to_string(), "VOLM15  ");
    ///
    /// let frame = CommandFrame::new("VOLM", "123456").unwrap();
    /// assert_eq!(frame.parameter(), "1234");
    /// ```
    pub fn new(mnemonic: &str, parameter: &str) -> Result<Self> {
        if mnemonic.len() != MNEMONIC_WIDTH || !mnemonic.bytes().all(|b| b.is_ascii_alphanumeric())
        {
            return Err(AquosError::invalid_argument(
                "mnemonic",
                format!("must be {} ASCII alphanumeric characters", MNEMONIC_WIDTH),
            ));
        }
        if !parameter.bytes().all(|b| b.is_ascii_graphic() || b == b' ') {
            return Err(AquosError::invalid_argument(
                "parameter",
                "must contain printable ASCII only",
            ));
        }

        let truncated = &parameter[..parameter.len().min(PARAMETER_WIDTH)];
        Ok(Self {
            mnemonic: mnemonic.to_string(),
            parameter: format!("{:<width$}", truncated, width = PARAMETER_WIDTH),
        })
    }

    /// Returns the mnemonic.
    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    /// Returns the padded parameter field.
    pub fn parameter(&self) -> &str {
        &self.parameter
    }

    /// Serializes the frame, including the line terminator.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(MNEMONIC_WIDTH + PARAMETER_WIDTH + 1);
        bytes.extend_from_slice(self.mnemonic.as_bytes());
        bytes.extend_from_slice(self.parameter.as_bytes());
        bytes.push(LINE_TERMINATOR);
        bytes
    }
}

impl fmt::Display for CommandFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.mnemonic, self.parameter)
    }
}

/// Encodes a query asking the TV for the current state of `operation`.
///
/// # Errors
///
/// Returns `InvalidArgument` if the operation cannot be queried.
pub fn encode_query(operation: Operation) -> Result<CommandFrame> {
    let spec = operation.spec();
    if !spec.access.can_read() {
        return Err(AquosError::invalid_argument(
            spec.name,
            "operation cannot be queried",
        ));
    }
    CommandFrame::new(spec.mnemonic, spec.query_parameter)
}

/// Encodes a write setting `operation` to `value`.
///
/// # Errors
///
/// Returns `InvalidArgument` if the operation cannot be written or `value`
/// is outside the operation's declared range.
pub fn encode_write(operation: Operation, value: u32) -> Result<CommandFrame> {
    let spec = operation.spec();
    if !spec.access.can_write() {
        return Err(AquosError::invalid_argument(
            spec.name,
            "operation is read-only",
        ));
    }
    if !spec.accepts(value) {
        return Err(AquosError::invalid_argument(
            spec.name,
            format!("{} is not one of {}", value, spec.describe_values()),
        ));
    }

    let mnemonic = match spec.zero_mnemonic {
        Some(zero) if value == 0 => zero,
        _ => spec.mnemonic,
    };
    let parameter = format!("{:0digits$}", value, digits = spec.digits);
    CommandFrame::new(mnemonic, &parameter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_matches_operation_order() {
        for (index, operation) in Operation::ALL.iter().enumerate() {
            assert_eq!(COMMAND_TABLE[index].operation, *operation);
            assert_eq!(operation.spec().operation, *operation);
        }
    }

    #[test]
    fn test_table_mnemonics_are_well_formed() {
        for spec in COMMAND_TABLE.iter() {
            assert_eq!(spec.mnemonic.len(), MNEMONIC_WIDTH, "{}", spec.name);
            assert!(spec.mnemonic.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
            if spec.access.can_write() {
                assert!(!spec.values.is_empty(), "{} has no values", spec.name);
            }
        }
    }

    #[test]
    fn test_every_write_encodes_to_fixed_width() {
        for spec in COMMAND_TABLE.iter().filter(|s| s.access.can_write()) {
            for &(low, high) in spec.values {
                for value in [low, high] {
                    let frame = encode_write(spec.operation, value).unwrap();
                    assert_eq!(frame.to_bytes().len(), 9, "{} {}", spec.name, value);
                    assert_eq!(frame.to_bytes()[8], LINE_TERMINATOR);
                }
            }
        }
    }

    #[test]
    fn test_every_write_rejects_value_past_range() {
        for spec in COMMAND_TABLE.iter().filter(|s| s.access.can_write()) {
            let (_, high) = spec.values[spec.values.len() - 1];
            let result = encode_write(spec.operation, high + 1);
            assert!(
                matches!(result, Err(AquosError::InvalidArgument { .. })),
                "{} accepted {}",
                spec.name,
                high + 1
            );
        }
    }

    #[test]
    fn test_every_query_encodes() {
        for spec in COMMAND_TABLE.iter() {
            let result = encode_query(spec.operation);
            if spec.access.can_read() {
                let frame = result.unwrap();
                assert_eq!(frame.mnemonic(), spec.mnemonic);
                assert_eq!(frame.parameter().trim_end(), spec.query_parameter);
            } else {
                assert!(result.is_err(), "{} should not be queryable", spec.name);
            }
        }
    }

    #[test]
    fn test_power_frames() {
        assert_eq!(encode_write(Operation::Power, 1).unwrap().to_bytes(), b"POWR1   \r");
        assert_eq!(encode_write(Operation::Power, 0).unwrap().to_bytes(), b"POWR0   \r");
        assert_eq!(encode_query(Operation::Power).unwrap().to_bytes(), b"POWR?   \r");
    }

    #[test]
    fn test_input_zero_uses_tv_mnemonic() {
        assert_eq!(encode_write(Operation::Input, 0).unwrap().to_string(), "ITVD0   ");
        assert_eq!(encode_write(Operation::Input, 2).unwrap().to_string(), "IAVD2   ");
        assert_eq!(encode_query(Operation::Input).unwrap().to_string(), "IAVD?   ");
    }

    #[test]
    fn test_av_mode_gaps() {
        assert!(encode_write(Operation::AvMode, 8).is_ok());
        assert!(encode_write(Operation::AvMode, 9).is_err());
        assert!(encode_write(Operation::AvMode, 12).is_err());
        assert!(encode_write(Operation::AvMode, 13).is_ok());
        assert!(encode_write(Operation::AvMode, 100).is_ok());
    }

    #[test]
    fn test_surround_skips_three() {
        assert!(encode_write(Operation::Surround, 3).is_err());
        assert!(encode_write(Operation::Surround, 4).is_ok());
    }

    #[test]
    fn test_remote_button_gaps() {
        for missing in [22, 25, 26, 37, 48, 62] {
            assert!(encode_write(Operation::RemoteButton, missing).is_err(), "{}", missing);
        }
        assert_eq!(
            encode_write(Operation::RemoteButton, 33).unwrap().to_string(),
            "RCKY33  "
        );
    }

    #[test]
    fn test_cable_channel_zero_padding() {
        assert_eq!(
            encode_write(Operation::DigitalChannelCableMajor, 7).unwrap().to_string(),
            "DC2U007 "
        );
        assert_eq!(
            encode_write(Operation::DigitalChannelCableMinor, 0).unwrap().to_string(),
            "DC2L000 "
        );
        assert_eq!(
            encode_write(Operation::DigitalChannelCableMinor, 123).unwrap().to_string(),
            "DC2L123 "
        );
    }

    #[test]
    fn test_digital_air_four_digits() {
        let frame = encode_write(Operation::DigitalChannelAir, 1203).unwrap();
        assert_eq!(hex::encode(frame.to_bytes()), "44413250313230330d");
    }

    #[test]
    fn test_digital_air_rejects_zero_minor() {
        for value in [200, 1000, 9900] {
            let err = encode_write(Operation::DigitalChannelAir, value).unwrap_err();
            assert!(matches!(err, AquosError::InvalidArgument { .. }), "{}", value);
            assert!(err.to_string().contains("minor channel 01-99"), "{}", err);
        }
        assert!(encode_write(Operation::DigitalChannelAir, 201).is_ok());
        assert!(!Operation::DigitalChannelAir.spec().accepts(500));
    }

    #[test]
    fn test_info_queries_use_one() {
        assert_eq!(encode_query(Operation::TvName).unwrap().to_string(), "TVNM1   ");
        assert_eq!(encode_query(Operation::ModelName).unwrap().to_string(), "MNRD1   ");
        assert_eq!(encode_query(Operation::SoftwareVersion).unwrap().to_string(), "SWVN1   ");
    }

    #[test]
    fn test_read_only_write_rejected() {
        let err = encode_write(Operation::TvName, 1).unwrap_err();
        assert!(err.to_string().contains("read-only"));
    }

    #[test]
    fn test_write_only_query_rejected() {
        assert!(encode_query(Operation::ChannelUp).is_err());
        assert!(encode_query(Operation::DigitalChannelCableMinor).is_err());
    }

    #[test]
    fn test_error_lists_allowed_values() {
        let err = encode_write(Operation::AvMode, 50).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid argument 'av_mode': 50 is not one of 0-8, 13-17, 100"
        );
    }

    #[test]
    fn test_frame_truncates_long_parameter() {
        let frame = CommandFrame::new("VOLM", "123456").unwrap();
        assert_eq!(frame.to_string(), "VOLM1234");
    }

    #[test]
    fn test_frame_rejects_bad_mnemonic() {
        assert!(CommandFrame::new("POW", "1").is_err());
        assert!(CommandFrame::new("POWRX", "1").is_err());
        assert!(CommandFrame::new("PO\rR", "1").is_err());
    }

    #[test]
    fn test_frame_rejects_control_characters() {
        assert!(CommandFrame::new("POWR", "1\r").is_err());
        assert!(CommandFrame::new("POWR", "é").is_err());
    }

    #[test]
    fn test_empty_parameter_is_all_spaces() {
        let frame = CommandFrame::new("CHUP", "").unwrap();
        assert_eq!(frame.to_bytes(), b"CHUP    \r");
    }
}
