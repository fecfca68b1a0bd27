use std::fmt;

use crate::error::Error;

/// Logical mode last applied to the transceiver by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RadioMode {
    /// Unknown or unconfigured (initial state, and after a reset).
    #[default]
    None,
    /// OOK legacy socket control (transmit).
    Control,
    /// FSK sensor telemetry (receive).
    Monitor,
}

/// Transceiver operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransceiverMode {
    Sleep,
    Standby,
    FrequencySynth,
    Tx,
    Rx,
}

/// Transceiver modulation scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modulation {
    Fsk,
    Ook,
}

/// Legacy OOK command byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    None = 0x00,
    OnAll = 0x0D,
    OffAll = 0x0C,
    On1 = 0x0F,
    Off1 = 0x0E,
    On2 = 0x07,
    Off2 = 0x06,
    On3 = 0x0B,
    Off3 = 0x0A,
    On4 = 0x03,
    Off4 = 0x02,
}

impl Command {
    /// The byte sent over the air.
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Command {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        let cmd = match value {
            0x00 => Command::None,
            0x0D => Command::OnAll,
            0x0C => Command::OffAll,
            0x0F => Command::On1,
            0x0E => Command::Off1,
            0x07 => Command::On2,
            0x06 => Command::Off2,
            0x0B => Command::On3,
            0x0A => Command::Off3,
            0x03 => Command::On4,
            0x02 => Command::Off4,
            other => {
                return Err(Error::InvalidParameter(format!(
                    "unknown OOK command byte 0x{other:02X}"
                )));
            }
        };
        Ok(cmd)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Command::None => "NONE",
            Command::OnAll => "ON_ALL",
            Command::OffAll => "OFF_ALL",
            Command::On1 => "ON_1",
            Command::Off1 => "OFF_1",
            Command::On2 => "ON_2",
            Command::Off2 => "OFF_2",
            Command::On3 => "ON_3",
            Command::Off3 => "OFF_3",
            Command::On4 => "ON_4",
            Command::Off4 => "OFF_4",
        };
        f.write_str(name)
    }
}

/// Logical indicator LED role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    /// Both physical LEDs.
    All,
    /// LED1 (green on the ENER314-RT).
    Primary,
    /// LED2 (red on the ENER314-RT).
    Secondary,
    /// Receive activity.
    Rx,
    /// Transmit activity.
    Tx,
}

/// Logical GPIO pin number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pin(pub u8);

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPIO{}", self.0)
    }
}

/// Digital output level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinState {
    Low,
    High,
}

/// GPIO pin direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}
