//! Feature traits for pad capabilities.
//!
//! Pads opt-in to features by implementing these traits and returning
//! `Some(self)` from the corresponding `as_*()` method in the Pad trait.

use std::sync::mpsc::Receiver;

/// Errors that can occur during pad operations
#[derive(Debug, thiserror::Error)]
pub enum PadError {
    /// Device was not found
    #[error("device not found")]
    DeviceNotFound,

    /// Command issued while no session is established
    #[error("not connected")]
    NotConnected,

    /// Input rejected before reaching the transport
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    /// Malformed or short device response
    #[error("malformed {0} response")]
    Protocol(&'static str),

    /// HID communication error
    #[error("hid error: {0}")]
    Hid(#[from] hidapi::HidError),

    /// Generic IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PadError>;

/// One decoded pen input report.
///
/// `display_x`/`display_y` are the raw digitizer coordinates divided by the
/// profile scale factor and truncated. `pressure` is normalized to `[0, 1]`.
/// `timestamp` and `sequence` are only present for timing-mode reports.
#[derive(Debug, Clone, PartialEq)]
pub struct PenSample {
    pub proximity: bool,
    pub contact: bool,
    pub raw_x: u16,
    pub raw_y: u16,
    pub display_x: i32,
    pub display_y: i32,
    pub pressure: f64,
    pub timestamp: Option<u16>,
    pub sequence: Option<u16>,
}

/// Ink and screen-surface control capability
pub trait HasInk {
    /// Set pen ink color and width (width 0-5)
    fn set_pen(&mut self, color: [u8; 3], width: u8) -> Result<()>;
    /// Set background color. Takes effect on the next clear.
    fn set_background(&mut self, color: [u8; 3]) -> Result<()>;
    /// Enable or disable inking the screen. Does not stop pen events.
    fn set_inking(&mut self, enabled: bool) -> Result<()>;
    /// Clear the screen to the background color
    fn clear_screen(&mut self) -> Result<()>;
}

/// Backlight intensity control capability
pub trait HasBacklight {
    fn set_backlight(&mut self, intensity: u8) -> Result<()>;
}

/// Raw image upload capability
pub trait HasImage {
    fn upload_image(&mut self, data: &[u8], progress: &mut dyn FnMut(usize)) -> Result<()>;
    /// Replay the last uploaded image from the session cache
    fn resend_image(&mut self, progress: &mut dyn FnMut(usize)) -> Result<()>;
}

/// Pen input stream capability
pub trait HasPenInput {
    /// Select between basic reports and reports with timing data
    fn set_writing_mode(&mut self, timing: bool) -> Result<()>;
    /// Restrict the active writing area (left-top, right-bottom corners)
    fn set_writing_area(&mut self, x1: u16, y1: u16, x2: u16, y2: u16) -> Result<()>;
    /// Register a sample receiver. Every registered receiver gets every
    /// sample; dropped receivers are pruned on delivery.
    fn subscribe(&mut self) -> Receiver<PenSample>;
    /// Read and decode at most one pending input report
    fn poll(&mut self, timeout_ms: i32) -> Result<Option<PenSample>>;
}
