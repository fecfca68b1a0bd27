//! MiHomeBuilder: configure a MiHome driver.

use tracing::info;

use crate::control::{DeviceCapabilities, DeviceInfo};
use crate::decoder::Decoder;
use crate::device::MiHomeDevice;
use crate::error::{Error, Result};
use crate::event::{DEFAULT_EVENT_CAPACITY, EventBus};
use crate::gpio::Gpio;
use crate::indicator::Indicators;
use crate::mode::RadioModeController;
use crate::protocol::{DEFAULT_CID, DEVICE_ADDRESS_LEN, DeviceAddress};
use crate::transceiver::Transceiver;
use crate::types::Pin;

/// Default number of times each OOK command is transmitted.
pub const DEFAULT_REPEAT: u32 = 8;

/// Builder for a [`MiHomeDevice`].
///
/// # Example
///
/// ```
/// # use mihome::{MiHomeBuilder, MockGpio, MockTransceiver, Decoder, DecodeError};
/// # struct Raw;
/// # impl Decoder for Raw {
/// #     type Message = Vec<u8>;
/// #     fn decode(&self, data: &[u8]) -> (Option<Vec<u8>>, Option<DecodeError>) {
/// #         (Some(data.to_vec()), None)
/// #     }
/// # }
/// # fn example() -> mihome::Result<()> {
/// let _device = MiHomeBuilder::ener314rt()
///     .cid("6C6C6")
///     .repeat(10)
///     .build(MockTransceiver::new(), MockGpio::new(), Raw)?;
/// # Ok(())
/// # }
/// ```
pub struct MiHomeBuilder {
    name: String,
    cid: String,
    repeat: u32,
    temp_offset: f32,
    reset_pin: Option<Pin>,
    led1_pin: Option<Pin>,
    led2_pin: Option<Pin>,
    event_capacity: usize,
}

impl MiHomeBuilder {
    /// A builder with no GPIO lines wired.
    pub fn new() -> Self {
        Self {
            name: "mihome".to_string(),
            cid: DEFAULT_CID.to_string(),
            repeat: DEFAULT_REPEAT,
            temp_offset: 0.0,
            reset_pin: None,
            led1_pin: None,
            led2_pin: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    /// A builder wired like the ENER314-RT Raspberry Pi board:
    /// reset on GPIO25, green LED on GPIO27, red LED on GPIO22.
    pub fn ener314rt() -> Self {
        Self::new()
            .name("ener314rt")
            .reset_pin(Some(Pin(25)))
            .led1_pin(Some(Pin(27)))
            .led2_pin(Some(Pin(22)))
    }

    /// Source name attached to received events (default: `mihome`).
    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Legacy device address in hexadecimal (default: `6C6C6`).
    pub fn cid(mut self, cid: &str) -> Self {
        self.cid = cid.to_string();
        self
    }

    /// Transmit repeat count for [`on`](crate::MiHome::on) / [`off`](crate::MiHome::off) (default: 8).
    pub fn repeat(mut self, repeat: u32) -> Self {
        self.repeat = repeat;
        self
    }

    /// Temperature calibration offset in degrees Celsius (default: 0).
    pub fn temp_offset(mut self, offset: f32) -> Self {
        self.temp_offset = offset;
        self
    }

    pub fn reset_pin(mut self, pin: Option<Pin>) -> Self {
        self.reset_pin = pin;
        self
    }

    /// LED1; also the RX indicator.
    pub fn led1_pin(mut self, pin: Option<Pin>) -> Self {
        self.led1_pin = pin;
        self
    }

    /// LED2; also the TX indicator.
    pub fn led2_pin(mut self, pin: Option<Pin>) -> Self {
        self.led2_pin = pin;
        self
    }

    /// Per-subscriber event queue depth (default: 64).
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Build the driver around the given collaborators.
    ///
    /// No hardware I/O happens here; the radio is configured lazily by the
    /// first operation that needs it.
    pub fn build<R, G, D>(self, radio: R, gpio: G, decoder: D) -> Result<MiHomeDevice<R, G, D>>
    where
        R: Transceiver,
        G: Gpio,
        D: Decoder,
    {
        if self.repeat == 0 {
            return Err(Error::InvalidParameter(
                "repeat count must be at least 1".into(),
            ));
        }
        let cid: DeviceAddress = self.cid.parse()?;
        if cid.as_bytes().len() != DEVICE_ADDRESS_LEN {
            return Err(Error::InvalidParameter(format!(
                "device address must be {DEVICE_ADDRESS_LEN} bytes, got {} ({cid})",
                cid.as_bytes().len()
            )));
        }

        info!(
            name = %self.name,
            cid = %cid,
            repeat = self.repeat,
            reset = ?self.reset_pin,
            led1 = ?self.led1_pin,
            led2 = ?self.led2_pin,
            "MiHome driver ready"
        );

        Ok(MiHomeDevice {
            radio,
            gpio,
            decoder,
            controller: RadioModeController::new(),
            indicators: Indicators::new(self.led1_pin, self.led2_pin),
            reset_pin: self.reset_pin,
            temp_offset: self.temp_offset,
            info: DeviceInfo {
                name: self.name,
                cid,
                repeat: self.repeat,
            },
            capabilities: DeviceCapabilities {
                reset: self.reset_pin.is_some(),
                led1: self.led1_pin.is_some(),
                led2: self.led2_pin.is_some(),
            },
            bus: EventBus::new(self.event_capacity),
        })
    }
}

impl Default for MiHomeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
