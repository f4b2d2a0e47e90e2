//! Core traits and types for the stu-sync pad abstraction.
//!
//! This crate provides:
//! - The `Transport` trait over raw HID feature/input reports, plus the
//!   default `HidTransport` implementation backed by hidapi
//! - Feature traits (`HasInk`, `HasPenInput`, etc.) that pads can implement
//! - The `Pad` trait with `as_*()` methods for feature discovery
//! - `PenSample`, `PadError` and the poll-based `HotplugWatcher`

mod features;
mod pad;
mod transport;
mod watch;

pub use features::{
    HasBacklight, HasImage, HasInk, HasPenInput, PadError, PenSample, Result,
};
pub use pad::{Pad, PadInfo};
pub use transport::{device_present, DeviceIdentity, HidTransport, Transport};
pub use watch::{HotplugEvent, HotplugWatcher};
