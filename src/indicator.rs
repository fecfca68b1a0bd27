//! Indicator LED wiring and control.

use tracing::trace;

use crate::error::{Error, Result};
use crate::gpio::Gpio;
use crate::types::{Direction, Indicator, Pin, PinState};

/// Physical pin assigned to each indicator role.
///
/// RX defaults to LED1 and TX to LED2. On a board with a single LED both
/// roles fall back to whichever LED is wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Indicators {
    led1: Option<Pin>,
    led2: Option<Pin>,
    rx: Option<Pin>,
    tx: Option<Pin>,
}

impl Indicators {
    pub fn new(led1: Option<Pin>, led2: Option<Pin>) -> Self {
        let mut rx = led1;
        let mut tx = led2;
        if tx.is_none() {
            tx = led1;
        } else if rx.is_none() {
            rx = led2;
        }
        Self { led1, led2, rx, tx }
    }

    /// Pin driven for `role`, if any. `All` has no single pin.
    pub fn pin(&self, role: Indicator) -> Option<Pin> {
        match role {
            Indicator::All => None,
            Indicator::Primary => self.led1,
            Indicator::Secondary => self.led2,
            Indicator::Rx => self.rx,
            Indicator::Tx => self.tx,
        }
    }

    /// Drive the LED(s) for `role`.
    ///
    /// Primary and Secondary are deliberate addressing and fail when
    /// unwired; Rx and Tx are best-effort and silently do nothing.
    pub fn set<G: Gpio>(&self, gpio: &mut G, role: Indicator, state: PinState) -> Result<()> {
        match role {
            Indicator::All => {
                if self.led1.is_some() {
                    self.set(gpio, Indicator::Primary, state)?;
                }
                if self.led2.is_some() {
                    self.set(gpio, Indicator::Secondary, state)?;
                }
                Ok(())
            }
            Indicator::Primary | Indicator::Secondary => match self.pin(role) {
                Some(pin) => drive(gpio, pin, state),
                None => Err(Error::Unsupported(format!("no pin wired for {role:?} LED"))),
            },
            Indicator::Rx | Indicator::Tx => match self.pin(role) {
                Some(pin) => drive(gpio, pin, state),
                None => Ok(()),
            },
        }
    }
}

fn drive<G: Gpio>(gpio: &mut G, pin: Pin, state: PinState) -> Result<()> {
    trace!(%pin, ?state, "indicator");
    gpio.set_direction(pin, Direction::Output)?;
    gpio.write(pin, state)
}
