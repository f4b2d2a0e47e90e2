//! Type definitions for the STU-540 driver.

/// Device capabilities negotiated once per connection.
///
/// Installed on the session after the capability, information and serial
/// reads all succeed, and immutable until disconnect.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceProfile {
    /// Digitizer resolution in tablet units
    pub tablet_width: u16,
    pub tablet_height: u16,
    /// Display resolution in pixels
    pub screen_width: u16,
    pub screen_height: u16,
    /// Maximum raw pressure value reported by the hardware
    pub pressure_max: u16,
    pub refresh_rate: u8,
    /// Tablet units per display pixel: `tablet_width / screen_width`
    pub scale_factor: f64,
    pub device_name: String,
    /// Formatted "a.b.c.d" from four firmware bytes
    pub firmware_version: String,
    pub serial: String,
}

impl DeviceProfile {
    /// Byte length of a full-screen 24-bit BGR frame
    pub fn image_len(&self) -> usize {
        self.screen_width as usize * self.screen_height as usize * 3
    }
}

/// Session lifecycle state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Negotiating,
    Ready,
}

/// Pen report mode (0: basic, 1: reports carry timestamp and sequence)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum WritingMode {
    #[default]
    Basic = 0,
    Timing = 1,
}

/// Active writing area. x1,y1 = left top, x2,y2 = right bottom, tablet units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WritingArea {
    pub x1: u16,
    pub y1: u16,
    pub x2: u16,
    pub y2: u16,
}
