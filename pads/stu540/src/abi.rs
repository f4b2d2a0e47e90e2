//! Feature-report payload builders for the STU-540.
//!
//! Every command is one feature report: a one-byte report id plus a small
//! fixed payload. Payloads here exclude the report id; the transport prepends
//! it. Multi-byte fields are little-endian.

use crate::types::{WritingArea, WritingMode};

/// Report identifiers
pub mod report {
    /// Basic pen sample input report
    pub const PEN_DATA: u8 = 0x01;
    /// Device name and firmware version (read)
    pub const INFORMATION: u8 = 0x08;
    /// Digitizer/screen capability block (read)
    pub const CAPABILITY: u8 = 0x09;
    /// Pen report mode select
    pub const WRITING_MODE: u8 = 0x0E;
    /// Serial number string (read)
    pub const E_SERIAL: u8 = 0x0F;
    /// Clear screen to background color
    pub const CLEAR_SCREEN: u8 = 0x20;
    /// Enable/disable inking
    pub const INK_MODE: u8 = 0x21;
    /// Image transfer: format selector
    pub const WRITE_IMAGE_START: u8 = 0x25;
    /// Image transfer: one framed chunk
    pub const WRITE_IMAGE_DATA: u8 = 0x26;
    /// Image transfer: end marker
    pub const WRITE_IMAGE_END: u8 = 0x27;
    /// Writing area bounds
    pub const WRITING_AREA: u8 = 0x2A;
    /// Backlight intensity
    pub const BRIGHTNESS: u8 = 0x2B;
    /// Pen ink color and width
    pub const PEN_COLOR_AND_WIDTH: u8 = 0x2D;
    /// Background color
    pub const BACKGROUND_COLOR: u8 = 0x2E;
    /// Pen sample input report with timestamp and sequence
    pub const PEN_DATA_TIMING: u8 = 0x34;
}

/// Maximum image chunk payload per data report
pub const CHUNK_SIZE: usize = 253;

/// Image format selector for raw 24-bit BGR frames
pub const IMAGE_FORMAT_24BGR: u8 = 0x04;

/// Payload: `[r, g, b, width]`, width 0-5
pub fn pen_color_and_width(color: [u8; 3], width: u8) -> [u8; 4] {
    let [r, g, b] = color;
    [r, g, b, width]
}

/// Payload: `[intensity, 0]`, intensity 0-3 written as a short
pub fn brightness(intensity: u8) -> [u8; 2] {
    [intensity, 0]
}

/// Payload: `[r, g, b]`
pub fn background_color(color: [u8; 3]) -> [u8; 3] {
    color
}

/// Payload: four u16 corner coordinates, little-endian
pub fn writing_area(area: WritingArea) -> [u8; 8] {
    let [x1l, x1h] = area.x1.to_le_bytes();
    let [y1l, y1h] = area.y1.to_le_bytes();
    let [x2l, x2h] = area.x2.to_le_bytes();
    let [y2l, y2h] = area.y2.to_le_bytes();
    [x1l, x1h, y1l, y1h, x2l, x2h, y2l, y2h]
}

/// Payload: `[mode]`
pub fn writing_mode(mode: WritingMode) -> [u8; 1] {
    [mode as u8]
}

/// Payload: `[0 or 1]`
pub fn ink_mode(enabled: bool) -> [u8; 1] {
    [enabled as u8]
}

/// Payload: `[0]`
pub fn clear_screen() -> [u8; 1] {
    [0]
}

/// Payload: `[format]`
pub fn image_start() -> [u8; 1] {
    [IMAGE_FORMAT_24BGR]
}

/// Payload: `[len, 0, ..chunk]`, chunk at most [`CHUNK_SIZE`] bytes
pub fn image_chunk(chunk: &[u8]) -> Vec<u8> {
    debug_assert!(chunk.len() <= CHUNK_SIZE);
    let mut buf = Vec::with_capacity(chunk.len() + 2);
    buf.push(chunk.len() as u8);
    buf.push(0);
    buf.extend_from_slice(chunk);
    buf
}

/// Payload: `[0]`
pub fn image_end() -> [u8; 1] {
    [0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writing_area_is_little_endian() {
        let payload = writing_area(WritingArea {
            x1: 0x0102,
            y1: 0x0304,
            x2: 0x0506,
            y2: 0x0708,
        });
        assert_eq!(payload, [0x02, 0x01, 0x04, 0x03, 0x06, 0x05, 0x08, 0x07]);
    }

    #[test]
    fn image_chunk_framing() {
        let chunk = [0xAA; 10];
        let payload = image_chunk(&chunk);
        assert_eq!(payload[0], 10);
        assert_eq!(payload[1], 0);
        assert_eq!(&payload[2..], &chunk);
    }

    #[test]
    fn brightness_is_written_as_short() {
        assert_eq!(brightness(3), [3, 0]);
    }

    #[test]
    fn pen_payload_order() {
        assert_eq!(pen_color_and_width([1, 2, 3], 5), [1, 2, 3, 5]);
        assert_eq!(ink_mode(true), [1]);
        assert_eq!(ink_mode(false), [0]);
    }
}
