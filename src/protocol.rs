//! Legacy OOK command encoding and socket command lookup.
//!
//! All functions are pure (no I/O), fully unit-testable.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::types::Command;

/// Preamble sent ahead of every legacy OOK command.
pub const OOK_PREAMBLE: [u8; 4] = [0x80, 0x00, 0x00, 0x00];

/// Nibble transmitted for a `0` bit (short pulse).
pub const OOK_ZERO: u8 = 0x08;

/// Nibble transmitted for a `1` bit (long pulse).
pub const OOK_ONE: u8 = 0x0E;

/// Length in bytes of an encoded command payload.
pub const OOK_PAYLOAD_LEN: usize = 16;

/// Length in bytes of a legacy device address.
pub const DEVICE_ADDRESS_LEN: usize = 3;

/// Default legacy device address.
pub const DEFAULT_CID: &str = "6C6C6";

/// Encode one byte as four pulse-width bytes, most significant bit first.
pub fn encode_byte(value: u8) -> [u8; 4] {
    let mut encoded = [0u8; 4];
    for (i, out) in encoded.iter_mut().enumerate() {
        let hi = bit_nibble(value, 7 - 2 * i);
        let lo = bit_nibble(value, 6 - 2 * i);
        *out = (hi << 4) | lo;
    }
    encoded
}

fn bit_nibble(value: u8, bit: usize) -> u8 {
    if value & (1 << bit) == 0 {
        OOK_ZERO
    } else {
        OOK_ONE
    }
}

/// Encode every byte of `address`, producing `4 * address.len()` bytes.
pub fn encode_address(address: &[u8]) -> Vec<u8> {
    address.iter().flat_map(|&b| encode_byte(b)).collect()
}

/// Build the 16-byte OOK payload for `command` addressed to `address`.
///
/// The first two bytes of each encoded field are dropped; they carry bits
/// that are always zero in this protocol family's framing.
pub fn build_payload(address: &[u8], command: Command) -> Result<Vec<u8>> {
    let encoded_address = encode_address(address);
    let encoded_command = encode_byte(command.as_byte());
    if encoded_address.len() != 4 * DEVICE_ADDRESS_LEN {
        return Err(Error::Internal(format!(
            "encoded address is {} bytes, expected {}",
            encoded_address.len(),
            4 * DEVICE_ADDRESS_LEN
        )));
    }

    let mut payload = Vec::with_capacity(OOK_PAYLOAD_LEN);
    payload.extend_from_slice(&OOK_PREAMBLE);
    payload.extend_from_slice(&encoded_address[2..]);
    payload.extend_from_slice(&encoded_command[2..]);
    debug_assert_eq!(payload.len(), OOK_PAYLOAD_LEN);
    Ok(payload)
}

/// Command byte that switches `socket` (1-4) on.
pub fn resolve_on(socket: u8) -> Result<Command> {
    match socket {
        1 => Ok(Command::On1),
        2 => Ok(Command::On2),
        3 => Ok(Command::On3),
        4 => Ok(Command::On4),
        _ => Err(Error::InvalidParameter(format!(
            "socket must be 1-4, got {socket}"
        ))),
    }
}

/// Command byte that switches `socket` (1-4) off.
pub fn resolve_off(socket: u8) -> Result<Command> {
    match socket {
        1 => Ok(Command::Off1),
        2 => Ok(Command::Off2),
        3 => Ok(Command::Off3),
        4 => Ok(Command::Off4),
        _ => Err(Error::InvalidParameter(format!(
            "socket must be 1-4, got {socket}"
        ))),
    }
}

/// Address of a group of legacy sockets.
///
/// Parsed from hexadecimal; odd-length strings are left-padded with `0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceAddress(Vec<u8>);

impl DeviceAddress {
    /// Wrap raw address bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for DeviceAddress {
    fn default() -> Self {
        Self(vec![0x06, 0xC6, 0xC6])
    }
}

impl FromStr for DeviceAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidParameter("empty device address".into()));
        }
        let padded = if s.len() % 2 != 0 {
            format!("0{s}")
        } else {
            s.to_string()
        };
        let bytes = hex::decode(&padded)
            .map_err(|e| Error::InvalidParameter(format!("invalid device address {s:?}: {e}")))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_byte(encoded: &[u8]) -> Option<u8> {
        let mut value = 0u8;
        for byte in encoded {
            for nibble in [byte >> 4, byte & 0x0F] {
                value <<= 1;
                match nibble {
                    OOK_ZERO => {}
                    OOK_ONE => value |= 1,
                    _ => return None,
                }
            }
        }
        Some(value)
    }

    #[test]
    fn test_encode_byte_patterns() {
        assert_eq!(encode_byte(0x00), [0x88, 0x88, 0x88, 0x88]);
        assert_eq!(encode_byte(0xFF), [0xEE, 0xEE, 0xEE, 0xEE]);
        assert_eq!(encode_byte(0x80), [0xE8, 0x88, 0x88, 0x88]);
        assert_eq!(encode_byte(0x0D), [0x88, 0x88, 0xEE, 0x8E]);
    }

    #[test]
    fn test_encode_byte_round_trips_every_value() {
        for b in 0..=u8::MAX {
            let encoded = encode_byte(b);
            assert_eq!(encoded.len(), 4);
            assert_eq!(decode_byte(&encoded), Some(b), "byte 0x{b:02X}");
        }
    }

    #[test]
    fn test_encode_address_length() {
        assert!(encode_address(&[]).is_empty());
        assert_eq!(encode_address(&[0x06, 0xC6, 0xC6]).len(), 12);
        assert_eq!(
            encode_address(&[0x06, 0xC6]),
            vec![0x88, 0x88, 0x8E, 0xE8, 0xEE, 0x88, 0x8E, 0xE8]
        );
    }

    #[test]
    fn test_build_payload_golden() {
        let payload = build_payload(&[0x06, 0xC6, 0xC6], Command::OnAll).unwrap();
        assert_eq!(
            payload,
            vec![
                0x80, 0x00, 0x00, 0x00, 0x8E, 0xE8, 0xEE, 0x88, 0x8E, 0xE8, 0xEE, 0x88, 0x8E, 0xE8,
                0xEE, 0x8E,
            ]
        );
    }

    #[test]
    fn test_build_payload_shape_for_all_commands() {
        let commands = [
            Command::OnAll,
            Command::OffAll,
            Command::On1,
            Command::Off1,
            Command::On2,
            Command::Off2,
            Command::On3,
            Command::Off3,
            Command::On4,
            Command::Off4,
        ];
        for address in [[0x00, 0x00, 0x00], [0x12, 0x34, 0x56], [0xFF, 0xFF, 0xFF]] {
            for cmd in commands {
                let payload = build_payload(&address, cmd).unwrap();
                assert_eq!(payload.len(), OOK_PAYLOAD_LEN);
                assert_eq!(&payload[..4], &OOK_PREAMBLE);
            }
        }
    }

    #[test]
    fn test_build_payload_rejects_wrong_address_length() {
        assert!(matches!(
            build_payload(&[0x06, 0xC6], Command::OnAll),
            Err(Error::Internal(_))
        ));
        assert!(matches!(
            build_payload(&[0x00, 0x06, 0xC6, 0xC6], Command::OnAll),
            Err(Error::Internal(_))
        ));
    }

    #[test]
    fn test_resolve_sockets() {
        assert_eq!(resolve_on(1).unwrap(), Command::On1);
        assert_eq!(resolve_on(2).unwrap(), Command::On2);
        assert_eq!(resolve_on(3).unwrap(), Command::On3);
        assert_eq!(resolve_on(4).unwrap(), Command::On4);
        assert_eq!(resolve_off(1).unwrap(), Command::Off1);
        assert_eq!(resolve_off(2).unwrap(), Command::Off2);
        assert_eq!(resolve_off(3).unwrap(), Command::Off3);
        assert_eq!(resolve_off(4).unwrap(), Command::Off4);
    }

    #[test]
    fn test_resolve_sockets_out_of_range() {
        for socket in [0, 5, 9, 255] {
            assert!(matches!(resolve_on(socket), Err(Error::InvalidParameter(_))));
            assert!(matches!(resolve_off(socket), Err(Error::InvalidParameter(_))));
        }
    }

    #[test]
    fn test_parse_device_address_pads_odd_length() {
        let addr: DeviceAddress = "6C6C6".parse().unwrap();
        assert_eq!(addr.as_bytes(), &[0x06, 0xC6, 0xC6]);
        assert_eq!(addr, DeviceAddress::default());
        assert_eq!(addr.to_string(), "06C6C6");
    }

    #[test]
    fn test_parse_device_address_even_length() {
        let addr: DeviceAddress = "abcdef".parse().unwrap();
        assert_eq!(addr.as_bytes(), &[0xAB, 0xCD, 0xEF]);
    }

    #[test]
    fn test_parse_device_address_invalid() {
        assert!("".parse::<DeviceAddress>().is_err());
        assert!("XYZ".parse::<DeviceAddress>().is_err());
    }
}
