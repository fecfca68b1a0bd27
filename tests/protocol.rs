use mihome::protocol::{self, OOK_PAYLOAD_LEN, OOK_PREAMBLE};
use mihome::{Command, DeviceAddress, Error};

#[test]
fn default_cid_decodes_to_three_bytes() {
    let addr: DeviceAddress = protocol::DEFAULT_CID.parse().unwrap();
    assert_eq!(addr.as_bytes(), &[0x06, 0xC6, 0xC6]);
}

#[test]
fn cid_parsing_is_case_insensitive_and_trims() {
    let lower: DeviceAddress = " 6c6c6 ".parse().unwrap();
    let upper: DeviceAddress = "06C6C6".parse().unwrap();
    assert_eq!(lower, upper);
    assert_eq!(upper.to_string(), "06C6C6");
}

#[test]
fn golden_on_all_payload() {
    let addr: DeviceAddress = "6C6C6".parse().unwrap();
    let payload = protocol::build_payload(addr.as_bytes(), Command::OnAll).unwrap();
    assert_eq!(
        payload,
        [
            0x80, 0x00, 0x00, 0x00, 0x8E, 0xE8, 0xEE, 0x88, 0x8E, 0xE8, 0xEE, 0x88, 0x8E, 0xE8,
            0xEE, 0x8E,
        ]
    );
}

#[test]
fn payload_tail_carries_command_bits() {
    let addr = [0x06, 0xC6, 0xC6];
    let on = protocol::build_payload(&addr, Command::On1).unwrap();
    let off = protocol::build_payload(&addr, Command::Off1).unwrap();

    assert_eq!(on.len(), OOK_PAYLOAD_LEN);
    assert_eq!(&on[..4], &OOK_PREAMBLE);
    // Address part is shared; only the last nibble pair differs (0x0F vs 0x0E)
    assert_eq!(on[..14], off[..14]);
    assert_eq!(&on[14..], &[0xEE, 0xEE]);
    assert_eq!(&off[14..], &[0xEE, 0xE8]);
}

#[test]
fn socket_table_is_total_over_one_to_four() {
    let on: Vec<u8> = (1..=4)
        .map(|s| protocol::resolve_on(s).unwrap().as_byte())
        .collect();
    let off: Vec<u8> = (1..=4)
        .map(|s| protocol::resolve_off(s).unwrap().as_byte())
        .collect();
    assert_eq!(on, vec![0x0F, 0x07, 0x0B, 0x03]);
    assert_eq!(off, vec![0x0E, 0x06, 0x0A, 0x02]);
}

#[test]
fn socket_table_rejects_zero_and_above_four() {
    assert!(matches!(
        protocol::resolve_on(0),
        Err(Error::InvalidParameter(_))
    ));
    assert!(matches!(
        protocol::resolve_off(5),
        Err(Error::InvalidParameter(_))
    ));
}

#[test]
fn twenty_bit_cid_still_needs_three_bytes_on_the_wire() {
    let short: DeviceAddress = "C6".parse().unwrap();
    assert!(matches!(
        protocol::build_payload(short.as_bytes(), Command::OnAll),
        Err(Error::Internal(_))
    ));
}
