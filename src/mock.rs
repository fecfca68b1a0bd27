//! In-memory transceiver and GPIO doubles for testing.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::gpio::Gpio;
use crate::transceiver::{
    AfcMode, AfcRoutine, DataMode, LnaGain, LnaImpedance, PacketCoding, PacketCrc, PacketFilter,
    PacketFormat, RxBandwidth, RxCutoff, Transceiver,
};
use crate::types::{Direction, Modulation, Pin, PinState, TransceiverMode};

// ---------------------------------------------------------------------------
// MockTransceiver
// ---------------------------------------------------------------------------

/// One recorded transceiver operation.
#[derive(Debug, Clone, PartialEq)]
pub enum RadioCall {
    SetMode(TransceiverMode),
    SetModulation(Modulation),
    SetSequencer(bool),
    SetBitrate(u32),
    SetFreqCarrier(u32),
    SetFreqDeviation(u32),
    SetAfcMode(AfcMode),
    SetAfcRoutine(AfcRoutine),
    SetLna(LnaImpedance, LnaGain),
    SetRxFilter(RxBandwidth, RxCutoff),
    SetDataMode(DataMode),
    SetPacketFormat(PacketFormat),
    SetPacketCoding(PacketCoding),
    SetPacketFilter(PacketFilter),
    SetPacketCrc(PacketCrc),
    SetPreambleSize(u16),
    SetPayloadSize(u8),
    SetSyncWord(Vec<u8>),
    SetSyncTolerance(u8),
    SetNodeAddress(u8),
    SetBroadcastAddress(u8),
    SetAesKey(Option<Vec<u8>>),
    SetFifoThreshold(u8),
    ClearFifo,
    ReadPayload,
    WritePayload { payload: Vec<u8>, repeat: u32 },
    MeasureTemperature(f32),
}

enum QueuedRead {
    Payload(Vec<u8>),
    Empty,
    Error(io::ErrorKind),
}

struct RadioState {
    mode: TransceiverMode,
    modulation: Modulation,
    calls: Vec<RadioCall>,
    reads: VecDeque<QueuedRead>,
    failing: Vec<RadioCall>,
    temperature: f32,
}

/// A mock transceiver recording every operation.
///
/// Queue received frames with [`queue_payload()`](MockTransceiver::queue_payload),
/// inject failures with [`fail_on()`](MockTransceiver::fail_on), then inspect
/// what the driver did with [`calls()`](MockTransceiver::calls). Clones share
/// state, so a test keeps one clone while the driver owns another.
#[derive(Clone)]
pub struct MockTransceiver {
    state: Arc<Mutex<RadioState>>,
    data_ready: Arc<Notify>,
}

impl MockTransceiver {
    /// A transceiver in standby with FSK modulation (power-on defaults).
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(RadioState {
                mode: TransceiverMode::Standby,
                modulation: Modulation::Fsk,
                calls: Vec::new(),
                reads: VecDeque::new(),
                failing: Vec::new(),
                temperature: 20.0,
            })),
            data_ready: Arc::new(Notify::new()),
        }
    }

    /// Queue a frame to be returned by the next read.
    pub fn queue_payload(&self, data: &[u8]) {
        self.push_read(QueuedRead::Payload(data.to_vec()));
    }

    /// Queue a read that completes without data.
    pub fn queue_empty_read(&self) {
        self.push_read(QueuedRead::Empty);
    }

    /// Queue a read that fails with an I/O error.
    pub fn queue_read_error(&self, kind: io::ErrorKind) {
        self.push_read(QueuedRead::Error(kind));
    }

    fn push_read(&self, read: QueuedRead) {
        self.state.lock().unwrap().reads.push_back(read);
        self.data_ready.notify_one();
    }

    /// Make every operation equal to `call` fail with an I/O error.
    pub fn fail_on(&self, call: RadioCall) {
        self.state.lock().unwrap().failing.push(call);
    }

    /// Remove all injected failures.
    pub fn clear_failures(&self) {
        self.state.lock().unwrap().failing.clear();
    }

    /// Set the value reported by the temperature sensor.
    pub fn set_temperature(&self, celsius: f32) {
        self.state.lock().unwrap().temperature = celsius;
    }

    /// All operations recorded so far, in order.
    pub fn calls(&self) -> Vec<RadioCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of recorded operations equal to `call`.
    pub fn count(&self, call: &RadioCall) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| *c == call)
            .count()
    }

    /// Forget recorded operations.
    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    fn record(&self, call: RadioCall) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let fails = state.failing.contains(&call);
        state.calls.push(call.clone());
        if fails {
            return Err(Error::Io(io::Error::other(format!(
                "injected failure on {call:?}"
            ))));
        }
        Ok(())
    }
}

impl Default for MockTransceiver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transceiver for MockTransceiver {
    fn mode(&self) -> TransceiverMode {
        self.state.lock().unwrap().mode
    }

    fn modulation(&self) -> Modulation {
        self.state.lock().unwrap().modulation
    }

    async fn set_mode(&mut self, mode: TransceiverMode) -> Result<()> {
        self.record(RadioCall::SetMode(mode))?;
        self.state.lock().unwrap().mode = mode;
        Ok(())
    }

    async fn set_modulation(&mut self, modulation: Modulation) -> Result<()> {
        self.record(RadioCall::SetModulation(modulation))?;
        self.state.lock().unwrap().modulation = modulation;
        Ok(())
    }

    async fn set_sequencer(&mut self, enabled: bool) -> Result<()> {
        self.record(RadioCall::SetSequencer(enabled))
    }

    async fn set_bitrate(&mut self, bps: u32) -> Result<()> {
        self.record(RadioCall::SetBitrate(bps))
    }

    async fn set_freq_carrier(&mut self, hz: u32) -> Result<()> {
        self.record(RadioCall::SetFreqCarrier(hz))
    }

    async fn set_freq_deviation(&mut self, hz: u32) -> Result<()> {
        self.record(RadioCall::SetFreqDeviation(hz))
    }

    async fn set_afc_mode(&mut self, mode: AfcMode) -> Result<()> {
        self.record(RadioCall::SetAfcMode(mode))
    }

    async fn set_afc_routine(&mut self, routine: AfcRoutine) -> Result<()> {
        self.record(RadioCall::SetAfcRoutine(routine))
    }

    async fn set_lna(&mut self, impedance: LnaImpedance, gain: LnaGain) -> Result<()> {
        self.record(RadioCall::SetLna(impedance, gain))
    }

    async fn set_rx_filter(&mut self, bandwidth: RxBandwidth, cutoff: RxCutoff) -> Result<()> {
        self.record(RadioCall::SetRxFilter(bandwidth, cutoff))
    }

    async fn set_data_mode(&mut self, mode: DataMode) -> Result<()> {
        self.record(RadioCall::SetDataMode(mode))
    }

    async fn set_packet_format(&mut self, format: PacketFormat) -> Result<()> {
        self.record(RadioCall::SetPacketFormat(format))
    }

    async fn set_packet_coding(&mut self, coding: PacketCoding) -> Result<()> {
        self.record(RadioCall::SetPacketCoding(coding))
    }

    async fn set_packet_filter(&mut self, filter: PacketFilter) -> Result<()> {
        self.record(RadioCall::SetPacketFilter(filter))
    }

    async fn set_packet_crc(&mut self, crc: PacketCrc) -> Result<()> {
        self.record(RadioCall::SetPacketCrc(crc))
    }

    async fn set_preamble_size(&mut self, bytes: u16) -> Result<()> {
        self.record(RadioCall::SetPreambleSize(bytes))
    }

    async fn set_payload_size(&mut self, bytes: u8) -> Result<()> {
        self.record(RadioCall::SetPayloadSize(bytes))
    }

    async fn set_sync_word(&mut self, word: &[u8]) -> Result<()> {
        self.record(RadioCall::SetSyncWord(word.to_vec()))
    }

    async fn set_sync_tolerance(&mut self, bits: u8) -> Result<()> {
        self.record(RadioCall::SetSyncTolerance(bits))
    }

    async fn set_node_address(&mut self, address: u8) -> Result<()> {
        self.record(RadioCall::SetNodeAddress(address))
    }

    async fn set_broadcast_address(&mut self, address: u8) -> Result<()> {
        self.record(RadioCall::SetBroadcastAddress(address))
    }

    async fn set_aes_key(&mut self, key: Option<&[u8]>) -> Result<()> {
        self.record(RadioCall::SetAesKey(key.map(<[u8]>::to_vec)))
    }

    async fn set_fifo_threshold(&mut self, bytes: u8) -> Result<()> {
        self.record(RadioCall::SetFifoThreshold(bytes))
    }

    async fn clear_fifo(&mut self) -> Result<()> {
        self.record(RadioCall::ClearFifo)
    }

    async fn read_payload(&mut self, cancel: &CancellationToken) -> Result<Option<Vec<u8>>> {
        self.record(RadioCall::ReadPayload)?;
        loop {
            let next = self.state.lock().unwrap().reads.pop_front();
            match next {
                Some(QueuedRead::Payload(data)) => return Ok(Some(data)),
                Some(QueuedRead::Empty) => return Ok(None),
                Some(QueuedRead::Error(kind)) => {
                    return Err(Error::Io(io::Error::new(kind, "mock read failed")));
                }
                None => {}
            }

            tokio::select! {
                _ = cancel.cancelled() => return Ok(None),
                _ = self.data_ready.notified() => {}
            }
        }
    }

    async fn write_payload(&mut self, payload: &[u8], repeat: u32) -> Result<()> {
        self.record(RadioCall::WritePayload {
            payload: payload.to_vec(),
            repeat,
        })
    }

    async fn measure_temperature(&mut self, offset: f32) -> Result<f32> {
        self.record(RadioCall::MeasureTemperature(offset))?;
        Ok(self.state.lock().unwrap().temperature + offset)
    }
}

// ---------------------------------------------------------------------------
// MockGpio
// ---------------------------------------------------------------------------

/// One recorded GPIO operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioCall {
    SetDirection(Pin, Direction),
    Write(Pin, PinState),
}

#[derive(Default)]
struct GpioState {
    calls: Vec<GpioCall>,
    levels: HashMap<Pin, PinState>,
    fail_writes: bool,
}

/// A mock GPIO controller recording every operation.
#[derive(Clone, Default)]
pub struct MockGpio {
    state: Arc<Mutex<GpioState>>,
}

impl MockGpio {
    pub fn new() -> Self {
        Self::default()
    }

    /// All operations recorded so far, in order.
    pub fn calls(&self) -> Vec<GpioCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Writes recorded for `pin`, in order.
    pub fn writes(&self, pin: Pin) -> Vec<PinState> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter_map(|c| match c {
                GpioCall::Write(p, s) if *p == pin => Some(*s),
                _ => None,
            })
            .collect()
    }

    /// Last level written to `pin`.
    pub fn level(&self, pin: Pin) -> Option<PinState> {
        self.state.lock().unwrap().levels.get(&pin).copied()
    }

    /// Make subsequent writes fail with an I/O error.
    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().unwrap().fail_writes = fail;
    }
}

impl Gpio for MockGpio {
    fn set_direction(&mut self, pin: Pin, direction: Direction) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .calls
            .push(GpioCall::SetDirection(pin, direction));
        Ok(())
    }

    fn write(&mut self, pin: Pin, state: PinState) -> Result<()> {
        let mut gpio = self.state.lock().unwrap();
        gpio.calls.push(GpioCall::Write(pin, state));
        if gpio.fail_writes {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "mock gpio write failed",
            )));
        }
        gpio.levels.insert(pin, state);
        Ok(())
    }
}
