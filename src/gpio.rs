use crate::error::Result;
use crate::types::{Direction, Pin, PinState};

/// Digital GPIO access used for the reset line and indicator LEDs.
///
/// Pin writes are non-blocking, so this trait is synchronous.
pub trait Gpio: Send {
    /// Configure `pin` as input or output.
    fn set_direction(&mut self, pin: Pin, direction: Direction) -> Result<()>;

    /// Drive `pin` to `state`.
    fn write(&mut self, pin: Pin, state: PinState) -> Result<()>;
}
