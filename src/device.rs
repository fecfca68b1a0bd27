use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::control::{DeviceCapabilities, DeviceInfo, MiHome};
use crate::decoder::Decoder;
use crate::error::{Error, Result};
use crate::event::{EventBus, ReceivedEvent, SubscriberId, Subscription};
use crate::gpio::Gpio;
use crate::indicator::Indicators;
use crate::mode::RadioModeController;
use crate::protocol::{self, DeviceAddress};
use crate::transceiver::Transceiver;
use crate::types::{Command, Direction, Indicator, Pin, PinState, RadioMode, TransceiverMode};

/// How long the reset line is held high.
pub const RESET_PULSE: Duration = Duration::from_millis(100);

/// Settling time after the reset line is released.
pub const RESET_SETTLE: Duration = Duration::from_millis(5);

/// A MiHome radio board: transceiver, GPIO lines and telemetry decoder.
///
/// Implements [`MiHome`]. Created via [`MiHomeBuilder`](crate::MiHomeBuilder).
pub struct MiHomeDevice<R, G, D: Decoder> {
    pub(crate) radio: R,
    pub(crate) gpio: G,
    pub(crate) decoder: D,
    pub(crate) controller: RadioModeController,
    pub(crate) indicators: Indicators,
    pub(crate) reset_pin: Option<Pin>,
    pub(crate) temp_offset: f32,
    pub(crate) info: DeviceInfo,
    pub(crate) capabilities: DeviceCapabilities,
    pub(crate) bus: EventBus<D::Message>,
}

impl<R, G, D> MiHomeDevice<R, G, D>
where
    R: Transceiver,
    G: Gpio,
    D: Decoder,
{
    /// Get a reference to the device info.
    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    /// Get a reference to the device capabilities.
    pub fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    /// The event bus, for handing to consumers on other tasks.
    pub fn bus(&self) -> &EventBus<D::Message> {
        &self.bus
    }

    /// Best-effort activity LED; failures are logged, never returned.
    fn flash(&mut self, led: Indicator, state: PinState) {
        if let Err(e) = self.indicators.set(&mut self.gpio, led, state) {
            warn!(?led, ?state, "indicator update failed: {e}");
        }
    }

    async fn transmit(&mut self, address: &DeviceAddress, command: Command, repeat: u32) -> Result<()> {
        debug!(cid = %address, %command, repeat, "send control");
        if repeat == 0 {
            return Err(Error::InvalidParameter("repeat count must be at least 1".into()));
        }
        if address.is_empty() {
            return Err(Error::InvalidParameter("missing device address".into()));
        }

        let payload = protocol::build_payload(address.as_bytes(), command)?;
        self.controller
            .ensure_mode(&mut self.radio, RadioMode::Control)
            .await?;

        self.flash(Indicator::Tx, PinState::High);
        trace!("writing {} bytes: {:02X?}", payload.len(), payload);
        let result = self.radio.write_payload(&payload, repeat).await;
        self.flash(Indicator::Tx, PinState::Low);
        result
    }

    async fn switch_sockets(&mut self, sockets: &[u8], on: bool) -> Result<()> {
        let commands = if sockets.is_empty() {
            vec![if on { Command::OnAll } else { Command::OffAll }]
        } else {
            let resolve = if on {
                protocol::resolve_on
            } else {
                protocol::resolve_off
            };
            sockets
                .iter()
                .map(|&socket| resolve(socket))
                .collect::<Result<Vec<_>>>()?
        };

        let address = self.info.cid.clone();
        let repeat = self.info.repeat;
        for command in commands {
            self.transmit(&address, command, repeat).await?;
        }
        Ok(())
    }

    /// Decode one frame and publish the outcome.
    async fn handle_frame(&mut self, data: &[u8]) {
        trace!("received {} bytes: {:02X?}", data.len(), data);
        self.flash(Indicator::Rx, PinState::High);

        let (message, failure) = self.decoder.decode(data);
        if let Some(reason) = &failure {
            warn!("{reason}");
        }

        if message.is_some() {
            let event = ReceivedEvent::new(message, failure.clone(), &self.info.name);
            if let Err(e) = self.bus.publish(event) {
                debug!("event not published: {e}");
            }
        }

        if failure.is_some() {
            if let Err(e) = self.radio.clear_fifo().await {
                error!("clear FIFO failed: {e}");
            }
        }

        self.flash(Indicator::Rx, PinState::Low);
    }
}

#[async_trait]
impl<R, G, D> MiHome for MiHomeDevice<R, G, D>
where
    R: Transceiver,
    G: Gpio,
    D: Decoder,
{
    type Message = D::Message;

    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    fn mode(&self) -> RadioMode {
        self.controller.mode()
    }

    async fn reset_radio(&mut self) -> Result<()> {
        let pin = self
            .reset_pin
            .ok_or_else(|| Error::Unsupported("no reset pin wired".into()))?;
        info!(%pin, "resetting radio");

        self.gpio.set_direction(pin, Direction::Output)?;
        self.indicators
            .set(&mut self.gpio, Indicator::All, PinState::High)?;

        self.gpio.write(pin, PinState::High)?;
        tokio::time::sleep(RESET_PULSE).await;
        self.gpio.write(pin, PinState::Low)?;
        tokio::time::sleep(RESET_SETTLE).await;

        self.indicators
            .set(&mut self.gpio, Indicator::All, PinState::Low)?;
        self.controller.invalidate();
        Ok(())
    }

    fn set_indicator(&mut self, led: Indicator, state: PinState) -> Result<()> {
        self.indicators.set(&mut self.gpio, led, state)
    }

    async fn send_control(
        &mut self,
        address: &DeviceAddress,
        command: Command,
        repeat: u32,
    ) -> Result<()> {
        self.transmit(address, command, repeat).await
    }

    async fn on(&mut self, sockets: &[u8]) -> Result<()> {
        self.switch_sockets(sockets, true).await
    }

    async fn off(&mut self, sockets: &[u8]) -> Result<()> {
        self.switch_sockets(sockets, false).await
    }

    async fn receive(&mut self, mode: RadioMode, cancel: CancellationToken) -> Result<()> {
        if mode != RadioMode::Monitor {
            return Err(Error::InvalidParameter(format!(
                "receive is not implemented for {mode:?} mode"
            )));
        }

        self.controller
            .ensure_mode(&mut self.radio, RadioMode::Monitor)
            .await?;
        debug!("receive loop started");

        loop {
            let read = tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    debug!("receive loop cancelled");
                    break;
                }

                read = self.radio.read_payload(&cancel) => read,
            };

            match read {
                Ok(Some(data)) if !data.is_empty() => self.handle_frame(&data).await,
                Ok(_) => {}
                Err(e) => {
                    error!("read error: {e}");
                    return Err(e);
                }
            }
        }

        Ok(())
    }

    async fn measure_temperature(&mut self) -> Result<f32> {
        let previous = self.radio.mode();
        debug!(?previous, "measuring temperature");
        if previous != TransceiverMode::Standby {
            self.radio.set_mode(TransceiverMode::Standby).await?;
        }

        let value = self.radio.measure_temperature(self.temp_offset).await;

        if previous != TransceiverMode::Standby {
            if let Err(e) = self.radio.set_mode(previous).await {
                // Hardware state is unknown; make the next operation reconfigure.
                self.controller.invalidate();
                return Err(e);
            }
        }
        value
    }

    fn subscribe(&self) -> Subscription<Self::Message> {
        self.bus.subscribe()
    }

    fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.bus.unsubscribe(id)
    }

    async fn close(&mut self) -> Result<()> {
        debug!(cid = %self.info.cid, "closing");
        self.bus.shutdown();
        Ok(())
    }
}
