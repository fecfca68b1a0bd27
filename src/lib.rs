pub mod builder;
pub mod control;
pub mod decoder;
pub mod device;
pub mod error;
pub mod event;
pub mod gpio;
pub mod indicator;
pub mod mock;
pub mod mode;
pub mod protocol;
pub mod transceiver;
pub mod types;

pub use builder::MiHomeBuilder;
pub use control::{DeviceCapabilities, DeviceInfo, MiHome};
pub use decoder::Decoder;
pub use device::MiHomeDevice;
pub use error::{DecodeError, Error, Result};
pub use event::{EventBus, ReceivedEvent, SubscriberId, Subscription};
pub use gpio::Gpio;
pub use mock::{GpioCall, MockGpio, MockTransceiver, RadioCall};
pub use protocol::DeviceAddress;
pub use transceiver::Transceiver;
pub use types::{Command, Direction, Indicator, Modulation, Pin, PinState, RadioMode, TransceiverMode};
