//! Pad detection and selection logic.

use std::str::FromStr;

use bpaf::Bpaf;
use hidapi::HidApi;
use stu540::{Stu540, INFO as STU540_INFO};
use stu_sync_core::{Pad, PadError, PadInfo};

/// Supported pad types
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Bpaf)]
#[bpaf(fallback(PadKind::Auto), group_help("Pad selection:"))]
pub enum PadKind {
    /// Auto-detect connected pad (default)
    #[default]
    Auto,
    /// Wacom STU-540
    Stu540,
}

impl FromStr for PadKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "stu540" => Ok(Self::Stu540),
            _ => Err(format!("unknown pad: {s}. Available: auto, stu540")),
        }
    }
}

impl std::fmt::Display for PadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Stu540 => write!(f, "stu540"),
        }
    }
}

/// Check if a HID device matches the pad info
fn matches(device: &hidapi::DeviceInfo, info: &PadInfo) -> bool {
    info.vendor_id.is_none_or(|vid| device.vendor_id() == vid)
        && info.product_id.is_none_or(|pid| device.product_id() == pid)
        && info.usage_page.is_none_or(|up| device.usage_page() == up)
        && info.usage.is_none_or(|u| device.usage() == u)
}

impl PadKind {
    /// Open the specified pad, or auto-detect if Auto
    pub fn as_pad(&self) -> Result<Box<dyn Pad>, PadError> {
        match self {
            PadKind::Auto => {
                // Single HID iteration, check each pad's INFO
                let api = HidApi::new()?;
                for device in api.device_list() {
                    if matches(device, &STU540_INFO) {
                        return Ok(Box::new(Stu540::open()?));
                    }
                    // Add more pads here as they're implemented
                }
                Err(PadError::DeviceNotFound)
            },
            PadKind::Stu540 => Ok(Box::new(Stu540::open()?)),
        }
    }

    /// List all supported pad CLI names
    #[allow(dead_code)]
    pub fn supported_pads() -> &'static [&'static str] {
        &["auto", "stu540"]
    }
}
