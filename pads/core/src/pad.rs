//! Core Pad trait and related types.

use crate::features::{HasBacklight, HasImage, HasInk, HasPenInput};

/// Static information about a pad type for detection and CLI
#[derive(Debug, Clone, Copy)]
pub struct PadInfo {
    pub name: &'static str,
    pub cli_name: &'static str,
    pub vendor_id: Option<u16>,
    pub product_id: Option<u16>,
    pub usage_page: Option<u16>,
    pub usage: Option<u16>,
}

/// Core pad trait - object-safe for `dyn Pad`
///
/// Instance methods (`info`, `describe`, `as_*`) are object-safe.
/// Pads should provide a static `INFO` constant and `open()` method separately.
pub trait Pad: Send {
    // === Object-safe instance methods ===

    /// Get pad info (instance method for object safety)
    fn info(&self) -> &'static PadInfo;

    /// Negotiated device fields as label/value pairs, for display
    fn describe(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Feature opt-in methods - override to return `Some(self)` if feature is supported
    fn as_ink(&mut self) -> Option<&mut dyn HasInk> {
        None
    }
    fn as_backlight(&mut self) -> Option<&mut dyn HasBacklight> {
        None
    }
    fn as_image(&mut self) -> Option<&mut dyn HasImage> {
        None
    }
    fn as_pen_input(&mut self) -> Option<&mut dyn HasPenInput> {
        None
    }
    fn as_screen_size(&self) -> Option<(u32, u32)> {
        None
    }
}
