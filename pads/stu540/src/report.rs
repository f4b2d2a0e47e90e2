//! Pure decoders for STU-540 report payloads.
//!
//! Feature-report payloads arrive without their report id (the transport
//! strips it); pen input reports keep the id at byte 0 as delivered by the
//! HID read. All multi-byte fields are little-endian. Reserved trailing
//! bytes are ignored so newer firmware responses still parse.

use stu_sync_core::{PadError, PenSample, Result};

use crate::abi::report;

/// Parsed capability block (report 0x09)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capability {
    pub tablet_width: u16,
    pub tablet_height: u16,
    pub pressure_max: u16,
    pub screen_width: u16,
    pub screen_height: u16,
    pub refresh_rate: u8,
}

fn le16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

/// Parse a capability response.
///
/// Layout: tablet_width u16 @0, tablet_height u16 @2, pressure_max u16 @4,
/// screen_width u16 @6, screen_height u16 @8, refresh_rate u8 @10.
/// A zero screen width or pressure range makes the profile unusable and is
/// rejected here, before anything derives a scale factor from it.
pub fn parse_capability(data: &[u8]) -> Result<Capability> {
    if data.len() < 11 {
        return Err(PadError::Protocol("capability"));
    }
    let capability = Capability {
        tablet_width: le16(data, 0),
        tablet_height: le16(data, 2),
        pressure_max: le16(data, 4),
        screen_width: le16(data, 6),
        screen_height: le16(data, 8),
        refresh_rate: data[10],
    };
    if capability.screen_width == 0 || capability.pressure_max == 0 {
        return Err(PadError::Protocol("capability"));
    }
    Ok(capability)
}

/// Parse an information response into `(device_name, firmware_version)`.
///
/// Layout: NUL-terminated ASCII name in a 7 byte window @0..7, then four
/// firmware version bytes formatted as "a.b.c.d".
pub fn parse_information(data: &[u8]) -> Result<(String, String)> {
    if data.len() < 11 {
        return Err(PadError::Protocol("information"));
    }
    let name = ascii_until_nul(&data[..7]);
    let [a, b, c, d] = [data[7], data[8], data[9], data[10]];
    Ok((name, format!("{a}.{b}.{c}.{d}")))
}

/// Parse a serial response: NUL-terminated ASCII, variable length
pub fn parse_serial(data: &[u8]) -> Result<String> {
    if data.is_empty() {
        return Err(PadError::Protocol("serial"));
    }
    Ok(ascii_until_nul(data))
}

fn ascii_until_nul(window: &[u8]) -> String {
    window
        .iter()
        .take_while(|&&b| b != 0)
        .map(|&b| b as char)
        .collect()
}

/// Decode one pen input report (`data[0]` is the report id).
///
/// The status byte shares its storage with the pressure magnitude: bits 0/1
/// are proximity/contact, and after masking the byte with 0x0F it becomes
/// the low byte of the little-endian pressure field. The two reads happen in
/// that order on purpose; this is the wire format, not packing convenience.
///
/// Returns `None` for unrecognized report ids and for reports shorter than
/// their layout requires.
pub fn decode_pen(data: &[u8], scale_factor: f64, pressure_max: f64) -> Option<PenSample> {
    let (&id, body) = data.split_first()?;
    let timing = match id {
        report::PEN_DATA => false,
        report::PEN_DATA_TIMING => true,
        _ => return None,
    };
    if body.len() < if timing { 10 } else { 6 } {
        return None;
    }

    let status = body[0];
    let proximity = status & 0x01 != 0;
    let contact = status & 0x02 != 0;

    let raw_x = u16::from_le_bytes([body[2], body[3]]);
    let raw_y = u16::from_le_bytes([body[4], body[5]]);
    let raw_pressure = u16::from_le_bytes([status & 0x0F, body[1]]);

    let (timestamp, sequence) = if timing {
        (
            Some(u16::from_le_bytes([body[6], body[7]])),
            Some(u16::from_le_bytes([body[8], body[9]])),
        )
    } else {
        (None, None)
    };

    Some(PenSample {
        proximity,
        contact,
        raw_x,
        raw_y,
        display_x: (raw_x as f64 / scale_factor).trunc() as i32,
        display_y: (raw_y as f64 / scale_factor).trunc() as i32,
        pressure: (raw_pressure as f64 / pressure_max).clamp(0.0, 1.0),
        timestamp,
        sequence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // 21000x15000 units, 1023 max pressure, 800x480 px, 60hz
    const CAPABILITY: [u8; 11] = [0x08, 0x52, 0x98, 0x3A, 0xFF, 0x03, 0x20, 0x03, 0xE0, 0x01, 60];

    fn basic_report(status: u8, pressure_hi: u8, x: u16, y: u16) -> Vec<u8> {
        let mut data = vec![report::PEN_DATA, status, pressure_hi];
        data.extend_from_slice(&x.to_le_bytes());
        data.extend_from_slice(&y.to_le_bytes());
        data
    }

    #[test]
    fn capability_fields() {
        let cap = parse_capability(&CAPABILITY).unwrap();
        assert_eq!(cap.tablet_width, 21000);
        assert_eq!(cap.tablet_height, 15000);
        assert_eq!(cap.pressure_max, 1023);
        assert_eq!(cap.screen_width, 800);
        assert_eq!(cap.screen_height, 480);
        assert_eq!(cap.refresh_rate, 60);
    }

    #[test]
    fn capability_ignores_trailing_bytes() {
        let mut data = CAPABILITY.to_vec();
        data.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(parse_capability(&data).unwrap(), parse_capability(&CAPABILITY).unwrap());
    }

    #[test]
    fn capability_rejects_short_and_zeroed() {
        assert!(parse_capability(&CAPABILITY[..10]).is_err());
        let mut zero_screen = CAPABILITY;
        zero_screen[6] = 0;
        zero_screen[7] = 0;
        assert!(parse_capability(&zero_screen).is_err());
    }

    #[test]
    fn information_name_and_firmware() {
        let mut data = *b"STU540\0????";
        data[7..11].copy_from_slice(&[1, 2, 30, 4]);
        let (name, firmware) = parse_information(&data).unwrap();
        assert_eq!(name, "STU540");
        assert_eq!(firmware, "1.2.30.4");
    }

    #[test]
    fn serial_stops_at_nul() {
        assert_eq!(parse_serial(b"4QBB0100\0\0\0").unwrap(), "4QBB0100");
        assert!(parse_serial(b"").is_err());
    }

    #[test]
    fn status_bits() {
        let sample = decode_pen(&basic_report(0b0000_0011, 0, 0, 0), 13.5, 1024.0).unwrap();
        assert!(sample.proximity);
        assert!(sample.contact);

        let sample = decode_pen(&basic_report(0b0000_0000, 0, 0, 0), 13.5, 1024.0).unwrap();
        assert!(!sample.proximity);
        assert!(!sample.contact);
    }

    #[test]
    fn pressure_shares_status_byte() {
        // top nibble of the status byte is cleared before the reinterpret,
        // bits 0-3 survive as the low byte of the pressure field
        let sample = decode_pen(&basic_report(0xF4, 0x01, 0, 0), 13.5, 1024.0).unwrap();
        assert!(!sample.proximity);
        assert!(!sample.contact);
        assert_eq!(sample.pressure, 0x0104 as f64 / 1024.0);
    }

    #[test]
    fn pressure_is_normalized() {
        let sample = decode_pen(&basic_report(0x03, 0x01, 0, 0), 26.25, 1023.0).unwrap();
        // raw 0x0103 = 259
        assert!((sample.pressure - 259.0 / 1023.0).abs() < 1e-9);
        assert!(sample.pressure >= 0.0 && sample.pressure <= 1.0);

        // raw beyond the negotiated maximum clamps instead of exceeding 1
        let sample = decode_pen(&basic_report(0x0F, 0xFF, 0, 0), 26.25, 1023.0).unwrap();
        assert_eq!(sample.pressure, 1.0);
    }

    #[test]
    fn coordinates_scale_to_display() {
        let sample = decode_pen(&basic_report(0x01, 0, 13125, 6563), 21000.0 / 800.0, 1023.0)
            .unwrap();
        assert_eq!(sample.raw_x, 13125);
        assert_eq!(sample.display_x, 500);
        assert_eq!(sample.display_y, 250);
    }

    #[test]
    fn timing_variant_extra_fields() {
        let mut data = basic_report(0x03, 0, 100, 200);
        data[0] = report::PEN_DATA_TIMING;
        data.extend_from_slice(&0x1234u16.to_le_bytes());
        data.extend_from_slice(&0x0042u16.to_le_bytes());
        let sample = decode_pen(&data, 13.5, 1024.0).unwrap();
        assert_eq!(sample.timestamp, Some(0x1234));
        assert_eq!(sample.sequence, Some(0x0042));

        // basic variant carries neither
        let sample = decode_pen(&basic_report(0x03, 0, 100, 200), 13.5, 1024.0).unwrap();
        assert_eq!(sample.timestamp, None);
        assert_eq!(sample.sequence, None);
    }

    #[test]
    fn short_and_foreign_reports_are_dropped() {
        assert!(decode_pen(&[report::PEN_DATA, 0x03, 0, 0], 13.5, 1024.0).is_none());
        let mut timing_short = basic_report(0x03, 0, 1, 2);
        timing_short[0] = report::PEN_DATA_TIMING;
        assert!(decode_pen(&timing_short, 13.5, 1024.0).is_none());
        assert!(decode_pen(&[0x7F, 0, 0, 0, 0, 0, 0], 13.5, 1024.0).is_none());
        assert!(decode_pen(&[], 13.5, 1024.0).is_none());
    }
}
