//! Radio mode bookkeeping and the OOK / FSK configuration sequences.

use tracing::{debug, trace};

use crate::error::Result;
use crate::transceiver::{
    AfcMode, AfcRoutine, DataMode, LnaGain, LnaImpedance, PacketCoding, PacketCrc, PacketFilter,
    PacketFormat, RxBandwidth, RxCutoff, Transceiver,
};
use crate::types::{Modulation, RadioMode, TransceiverMode};

/// Bit rate shared by both modes.
pub const BITRATE: u32 = 4800;

/// Carrier for legacy OOK sockets.
pub const CONTROL_CARRIER_HZ: u32 = 433_920_000;

/// Carrier for FSK telemetry.
pub const MONITOR_CARRIER_HZ: u32 = 434_300_000;

/// FSK frequency deviation.
pub const MONITOR_DEVIATION_HZ: u32 = 30_000;

/// FSK sync word.
pub const MONITOR_SYNC_WORD: [u8; 2] = [0x2D, 0xD4];

/// Tracks the logical mode applied to the transceiver and switches between
/// control (OOK transmit) and monitor (FSK receive).
#[derive(Debug, Default)]
pub struct RadioModeController {
    mode: RadioMode,
}

impl RadioModeController {
    pub fn new() -> Self {
        Self::default()
    }

    /// The logical mode last applied successfully.
    pub fn mode(&self) -> RadioMode {
        self.mode
    }

    /// Forget the applied mode so the next [`ensure_mode`](Self::ensure_mode)
    /// reconfigures from scratch.
    pub fn invalidate(&mut self) {
        self.mode = RadioMode::None;
    }

    /// Put the transceiver in `target` mode and arm it.
    ///
    /// The configuration sequence runs only when the modulation or logical
    /// mode differ from `target`. Arming always runs: control sets TX with
    /// the sequencer enabled, monitor enters RX or clears the FIFO if
    /// already receiving.
    pub async fn ensure_mode<R: Transceiver>(
        &mut self,
        radio: &mut R,
        target: RadioMode,
    ) -> Result<()> {
        let modulation = match target {
            RadioMode::Control => Modulation::Ook,
            RadioMode::Monitor => Modulation::Fsk,
            RadioMode::None => return Ok(()),
        };

        if self.mode != target || radio.modulation() != modulation {
            debug!(from = ?self.mode, to = ?target, "reconfiguring radio");
            self.mode = RadioMode::None;
            match target {
                RadioMode::Control => configure_control(radio).await?,
                RadioMode::Monitor => configure_monitor(radio).await?,
                RadioMode::None => {}
            }
            self.mode = target;
        }

        match target {
            RadioMode::Control => {
                radio.set_mode(TransceiverMode::Tx).await?;
                radio.set_sequencer(true).await?;
            }
            RadioMode::Monitor => {
                if radio.mode() == TransceiverMode::Rx {
                    radio.clear_fifo().await?;
                } else {
                    radio.set_mode(TransceiverMode::Rx).await?;
                }
            }
            RadioMode::None => {}
        }
        Ok(())
    }
}

async fn configure_control<R: Transceiver>(radio: &mut R) -> Result<()> {
    trace!("applying OOK control configuration");
    radio.set_mode(TransceiverMode::Standby).await?;
    radio.set_modulation(Modulation::Ook).await?;
    radio.set_sequencer(true).await?;
    radio.set_bitrate(BITRATE).await?;
    radio.set_freq_carrier(CONTROL_CARRIER_HZ).await?;
    radio.set_freq_deviation(0).await?;
    radio.set_afc_mode(AfcMode::Off).await?;
    radio.set_data_mode(DataMode::Packet).await?;
    radio.set_packet_format(PacketFormat::Variable).await?;
    radio.set_packet_coding(PacketCoding::None).await?;
    radio.set_packet_filter(PacketFilter::None).await?;
    radio.set_packet_crc(PacketCrc::Off).await?;
    radio.set_preamble_size(0).await?;
    radio.set_payload_size(0).await?;
    radio.set_sync_word(&[]).await?;
    radio.set_aes_key(None).await?;
    radio.set_fifo_threshold(1).await
}

async fn configure_monitor<R: Transceiver>(radio: &mut R) -> Result<()> {
    trace!("applying FSK monitor configuration");
    radio.set_mode(TransceiverMode::Standby).await?;
    radio.set_modulation(Modulation::Fsk).await?;
    radio.set_sequencer(true).await?;
    radio.set_bitrate(BITRATE).await?;
    radio.set_freq_carrier(MONITOR_CARRIER_HZ).await?;
    radio.set_freq_deviation(MONITOR_DEVIATION_HZ).await?;
    radio.set_afc_mode(AfcMode::Off).await?;
    radio.set_afc_routine(AfcRoutine::Standard).await?;
    radio.set_lna(LnaImpedance::Ohm50, LnaGain::Auto).await?;
    radio
        .set_rx_filter(RxBandwidth::Fsk62p5, RxCutoff::Cutoff4)
        .await?;
    radio.set_data_mode(DataMode::Packet).await?;
    radio.set_packet_format(PacketFormat::Variable).await?;
    radio.set_packet_coding(PacketCoding::Manchester).await?;
    radio.set_packet_filter(PacketFilter::None).await?;
    radio.set_packet_crc(PacketCrc::Off).await?;
    radio.set_preamble_size(3).await?;
    radio.set_payload_size(0x40).await?;
    radio.set_sync_word(&MONITOR_SYNC_WORD).await?;
    radio.set_sync_tolerance(0).await?;
    radio.set_node_address(0x04).await?;
    radio.set_broadcast_address(0xFF).await?;
    radio.set_aes_key(None).await?;
    radio.set_fifo_threshold(1).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockTransceiver, RadioCall};

    #[tokio::test]
    async fn test_control_sequence() {
        let mut radio = MockTransceiver::new();
        let mut ctl = RadioModeController::new();
        ctl.ensure_mode(&mut radio, RadioMode::Control).await.unwrap();

        assert_eq!(ctl.mode(), RadioMode::Control);
        assert_eq!(
            radio.calls(),
            vec![
                RadioCall::SetMode(TransceiverMode::Standby),
                RadioCall::SetModulation(Modulation::Ook),
                RadioCall::SetSequencer(true),
                RadioCall::SetBitrate(4800),
                RadioCall::SetFreqCarrier(433_920_000),
                RadioCall::SetFreqDeviation(0),
                RadioCall::SetAfcMode(AfcMode::Off),
                RadioCall::SetDataMode(DataMode::Packet),
                RadioCall::SetPacketFormat(PacketFormat::Variable),
                RadioCall::SetPacketCoding(PacketCoding::None),
                RadioCall::SetPacketFilter(PacketFilter::None),
                RadioCall::SetPacketCrc(PacketCrc::Off),
                RadioCall::SetPreambleSize(0),
                RadioCall::SetPayloadSize(0),
                RadioCall::SetSyncWord(vec![]),
                RadioCall::SetAesKey(None),
                RadioCall::SetFifoThreshold(1),
                RadioCall::SetMode(TransceiverMode::Tx),
                RadioCall::SetSequencer(true),
            ]
        );
    }

    #[tokio::test]
    async fn test_monitor_sequence() {
        let mut radio = MockTransceiver::new();
        let mut ctl = RadioModeController::new();
        ctl.ensure_mode(&mut radio, RadioMode::Monitor).await.unwrap();

        assert_eq!(ctl.mode(), RadioMode::Monitor);
        assert_eq!(
            radio.calls(),
            vec![
                RadioCall::SetMode(TransceiverMode::Standby),
                RadioCall::SetModulation(Modulation::Fsk),
                RadioCall::SetSequencer(true),
                RadioCall::SetBitrate(4800),
                RadioCall::SetFreqCarrier(434_300_000),
                RadioCall::SetFreqDeviation(30_000),
                RadioCall::SetAfcMode(AfcMode::Off),
                RadioCall::SetAfcRoutine(AfcRoutine::Standard),
                RadioCall::SetLna(LnaImpedance::Ohm50, LnaGain::Auto),
                RadioCall::SetRxFilter(RxBandwidth::Fsk62p5, RxCutoff::Cutoff4),
                RadioCall::SetDataMode(DataMode::Packet),
                RadioCall::SetPacketFormat(PacketFormat::Variable),
                RadioCall::SetPacketCoding(PacketCoding::Manchester),
                RadioCall::SetPacketFilter(PacketFilter::None),
                RadioCall::SetPacketCrc(PacketCrc::Off),
                RadioCall::SetPreambleSize(3),
                RadioCall::SetPayloadSize(0x40),
                RadioCall::SetSyncWord(vec![0x2D, 0xD4]),
                RadioCall::SetSyncTolerance(0),
                RadioCall::SetNodeAddress(0x04),
                RadioCall::SetBroadcastAddress(0xFF),
                RadioCall::SetAesKey(None),
                RadioCall::SetFifoThreshold(1),
                RadioCall::SetMode(TransceiverMode::Rx),
            ]
        );
    }

    #[tokio::test]
    async fn test_control_is_idempotent_but_rearms_tx() {
        let mut radio = MockTransceiver::new();
        let mut ctl = RadioModeController::new();
        ctl.ensure_mode(&mut radio, RadioMode::Control).await.unwrap();
        radio.clear_calls();

        ctl.ensure_mode(&mut radio, RadioMode::Control).await.unwrap();
        assert_eq!(
            radio.calls(),
            vec![
                RadioCall::SetMode(TransceiverMode::Tx),
                RadioCall::SetSequencer(true),
            ]
        );
    }

    #[tokio::test]
    async fn test_monitor_again_clears_fifo() {
        let mut radio = MockTransceiver::new();
        let mut ctl = RadioModeController::new();
        ctl.ensure_mode(&mut radio, RadioMode::Monitor).await.unwrap();
        radio.clear_calls();

        ctl.ensure_mode(&mut radio, RadioMode::Monitor).await.unwrap();
        assert_eq!(radio.calls(), vec![RadioCall::ClearFifo]);
    }

    #[tokio::test]
    async fn test_modulation_mismatch_forces_reconfigure() {
        let mut radio = MockTransceiver::new();
        let mut ctl = RadioModeController::new();
        ctl.ensure_mode(&mut radio, RadioMode::Control).await.unwrap();
        // Someone else switched the chip back to FSK behind our back.
        radio.set_modulation(Modulation::Fsk).await.unwrap();
        radio.clear_calls();

        ctl.ensure_mode(&mut radio, RadioMode::Control).await.unwrap();
        assert_eq!(radio.count(&RadioCall::SetModulation(Modulation::Ook)), 1);
    }

    #[tokio::test]
    async fn test_failed_sequence_leaves_mode_unset() {
        let mut radio = MockTransceiver::new();
        let mut ctl = RadioModeController::new();
        radio.fail_on(RadioCall::SetFreqCarrier(CONTROL_CARRIER_HZ));

        let err = ctl.ensure_mode(&mut radio, RadioMode::Control).await;
        assert!(matches!(err, Err(crate::Error::Io(_))));
        assert_eq!(ctl.mode(), RadioMode::None);
        // Sequence stopped at the failing step.
        assert_eq!(radio.count(&RadioCall::SetFreqDeviation(0)), 0);

        radio.clear_failures();
        radio.clear_calls();
        ctl.ensure_mode(&mut radio, RadioMode::Control).await.unwrap();
        assert_eq!(ctl.mode(), RadioMode::Control);
        assert_eq!(radio.count(&RadioCall::SetModulation(Modulation::Ook)), 1);
    }

    #[tokio::test]
    async fn test_none_target_is_noop() {
        let mut radio = MockTransceiver::new();
        let mut ctl = RadioModeController::new();
        ctl.ensure_mode(&mut radio, RadioMode::None).await.unwrap();
        assert!(radio.calls().is_empty());
    }
}
