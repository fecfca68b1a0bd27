use std::fmt::Debug;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::event::{SubscriberId, Subscription};
use crate::protocol::DeviceAddress;
use crate::types::{Command, Indicator, PinState, RadioMode};

/// Identity and defaults of a MiHome driver.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    /// Source name attached to received events.
    pub name: String,
    /// Default legacy device address for [`MiHome::on`] / [`MiHome::off`].
    pub cid: DeviceAddress,
    /// Default transmit repeat count.
    pub repeat: u32,
}

/// Optional hardware wired on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceCapabilities {
    /// Whether a radio reset line is wired.
    pub reset: bool,
    /// Whether LED1 is wired.
    pub led1: bool,
    /// Whether LED2 is wired.
    pub led2: bool,
}

/// Backend-agnostic control of a MiHome radio board.
///
/// Implemented by [`MiHomeDevice`](crate::MiHomeDevice). Every operation takes
/// `&mut self`: one owner drives the radio at a time, and a long-running
/// [`receive`](MiHome::receive) is usually given its own task while other
/// tasks read events from a [`Subscription`].
#[async_trait]
pub trait MiHome: Send {
    /// Decoded telemetry message type.
    type Message: Debug + Send + Sync + 'static;

    /// Get device info.
    fn info(&self) -> &DeviceInfo;

    /// Get device capabilities.
    fn capabilities(&self) -> &DeviceCapabilities;

    /// Logical radio mode last applied.
    fn mode(&self) -> RadioMode;

    /// Pulse the reset line and forget the applied radio mode.
    async fn reset_radio(&mut self) -> Result<()>;

    /// Drive an indicator LED.
    fn set_indicator(&mut self, led: Indicator, state: PinState) -> Result<()>;

    /// Transmit a legacy OOK command `repeat` times.
    async fn send_control(
        &mut self,
        address: &DeviceAddress,
        command: Command,
        repeat: u32,
    ) -> Result<()>;

    /// Switch sockets on. An empty slice addresses all sockets at once.
    async fn on(&mut self, sockets: &[u8]) -> Result<()>;

    /// Switch sockets off. An empty slice addresses all sockets at once.
    async fn off(&mut self, sockets: &[u8]) -> Result<()>;

    /// Receive and publish telemetry until `cancel` fires.
    async fn receive(&mut self, mode: RadioMode, cancel: CancellationToken) -> Result<()>;

    /// Read the transceiver's temperature sensor in degrees Celsius.
    async fn measure_temperature(&mut self) -> Result<f32>;

    /// Subscribe to received events.
    fn subscribe(&self) -> Subscription<Self::Message>;

    /// Remove a subscription.
    fn unsubscribe(&self, id: SubscriberId) -> bool;

    /// Shut down the event bus; all subscriptions end.
    async fn close(&mut self) -> Result<()>;
}
