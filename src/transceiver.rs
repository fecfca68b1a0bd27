//! Transceiver capability consumed by the driver.
//!
//! The register-level driver (SPI access, register maps) lives outside this
//! crate; it implements [`Transceiver`] and reports its own failures as
//! [`Error::Io`](crate::Error::Io) or [`Error::Transport`](crate::Error::Transport).

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::types::{Modulation, TransceiverMode};

/// Automatic frequency correction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfcMode {
    Off,
    On,
    AutoClear,
}

/// AFC routine used when AFC runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfcRoutine {
    Standard,
    Improved,
}

/// LNA input impedance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LnaImpedance {
    Ohm50,
    Ohm200,
}

/// LNA gain selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LnaGain {
    Auto,
    Max,
    Max6,
    Max12,
    Max24,
    Max36,
    Max48,
}

/// Receiver channel filter bandwidth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxBandwidth {
    Fsk31p3,
    Fsk41p7,
    Fsk62p5,
    Fsk83p3,
    Fsk125,
}

/// DC canceller cutoff, as a fraction of the channel filter bandwidth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxCutoff {
    Cutoff16,
    Cutoff8,
    Cutoff4,
    Cutoff2,
    Cutoff1,
}

/// Data processing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataMode {
    Packet,
    ContinuousSync,
    Continuous,
}

/// Packet length framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketFormat {
    Fixed,
    Variable,
}

/// Line coding applied to packet bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketCoding {
    None,
    Manchester,
    Whitening,
}

/// Hardware address filtering on receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketFilter {
    None,
    Node,
    NodeOrBroadcast,
}

/// Hardware CRC generation and checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketCrc {
    Off,
    On,
}

/// Register-level transceiver operations.
///
/// `mode()` and `modulation()` report the state last applied to the chip.
#[async_trait]
pub trait Transceiver: Send {
    fn mode(&self) -> TransceiverMode;
    fn modulation(&self) -> Modulation;

    async fn set_mode(&mut self, mode: TransceiverMode) -> Result<()>;
    async fn set_modulation(&mut self, modulation: Modulation) -> Result<()>;
    async fn set_sequencer(&mut self, enabled: bool) -> Result<()>;
    async fn set_bitrate(&mut self, bps: u32) -> Result<()>;
    async fn set_freq_carrier(&mut self, hz: u32) -> Result<()>;
    async fn set_freq_deviation(&mut self, hz: u32) -> Result<()>;
    async fn set_afc_mode(&mut self, mode: AfcMode) -> Result<()>;
    async fn set_afc_routine(&mut self, routine: AfcRoutine) -> Result<()>;
    async fn set_lna(&mut self, impedance: LnaImpedance, gain: LnaGain) -> Result<()>;
    async fn set_rx_filter(&mut self, bandwidth: RxBandwidth, cutoff: RxCutoff) -> Result<()>;
    async fn set_data_mode(&mut self, mode: DataMode) -> Result<()>;
    async fn set_packet_format(&mut self, format: PacketFormat) -> Result<()>;
    async fn set_packet_coding(&mut self, coding: PacketCoding) -> Result<()>;
    async fn set_packet_filter(&mut self, filter: PacketFilter) -> Result<()>;
    async fn set_packet_crc(&mut self, crc: PacketCrc) -> Result<()>;
    async fn set_preamble_size(&mut self, bytes: u16) -> Result<()>;
    async fn set_payload_size(&mut self, bytes: u8) -> Result<()>;
    /// An empty sync word disables sync word detection.
    async fn set_sync_word(&mut self, word: &[u8]) -> Result<()>;
    async fn set_sync_tolerance(&mut self, bits: u8) -> Result<()>;
    async fn set_node_address(&mut self, address: u8) -> Result<()>;
    async fn set_broadcast_address(&mut self, address: u8) -> Result<()>;
    /// `None` disables AES.
    async fn set_aes_key(&mut self, key: Option<&[u8]>) -> Result<()>;
    async fn set_fifo_threshold(&mut self, bytes: u8) -> Result<()>;
    async fn clear_fifo(&mut self) -> Result<()>;

    /// Block until a payload arrives or `cancel` fires.
    ///
    /// Returns `Ok(None)` when cancelled or when the read yielded nothing.
    /// Implementations must return promptly once `cancel` fires.
    async fn read_payload(&mut self, cancel: &CancellationToken) -> Result<Option<Vec<u8>>>;

    /// Transmit `payload` back-to-back `repeat` times.
    async fn write_payload(&mut self, payload: &[u8], repeat: u32) -> Result<()>;

    /// Read the on-die temperature sensor in degrees Celsius.
    async fn measure_temperature(&mut self, offset: f32) -> Result<f32>;
}
