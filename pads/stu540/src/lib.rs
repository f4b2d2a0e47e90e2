//! High level hidapi abstraction for interacting with Wacom STU-540 signature pads.
//!
//! The device speaks a small feature-report protocol: one-byte report ids
//! with fixed payloads for commands and queries, and unsolicited input
//! reports streaming pen samples. Capabilities (digitizer resolution, screen
//! size, pressure range) are negotiated once per connection and drive the
//! unit conversions for decoded samples.
//!
//! The session borrows itself mutably for every exchange, which serializes
//! outbound traffic; the device handles one feature transaction at a time.

use std::sync::mpsc::{channel, Receiver, Sender};

use stu_sync_core::{
    HasBacklight, HasImage, HasInk, HasPenInput, HidTransport, Pad, PadError, PadInfo, PenSample,
    Result, Transport,
};
use types::{ConnectionState, DeviceProfile, WritingArea, WritingMode};

pub mod abi;
pub mod report;
pub mod types;

pub mod consts {
    use stu_sync_core::DeviceIdentity;

    pub const STU540_VENDOR_ID: u16 = 0x056A;
    pub const STU540_PRODUCT_ID: u16 = 0x00A8;

    pub const IDENTITY: DeviceIdentity = DeviceIdentity {
        vendor_id: STU540_VENDOR_ID,
        product_id: STU540_PRODUCT_ID,
    };

    /// Legacy conversion constants, used to decode pen reports that arrive
    /// before a profile is negotiated. The negotiated values win once known.
    pub const FALLBACK_SCALE: f64 = 13.5;
    pub const FALLBACK_PRESSURE_MAX: f64 = 1024.0;
}

/// Static pad info for detection
pub static INFO: PadInfo = PadInfo {
    name: "Wacom STU-540",
    cli_name: "stu540",
    vendor_id: Some(consts::STU540_VENDOR_ID),
    product_id: Some(consts::STU540_PRODUCT_ID),
    usage_page: None,
    usage: None,
};

/// Screen dimensions, until negotiation overrides them
pub const SCREEN_WIDTH: u32 = 800;
pub const SCREEN_HEIGHT: u32 = 480;

/// Run the three capability reads, strictly in sequence.
///
/// Any failure aborts the whole negotiation; the caller reverts the session
/// to disconnected and surfaces the error.
fn negotiate<T: Transport>(transport: &mut T) -> Result<DeviceProfile> {
    let capability =
        report::parse_capability(&transport.get_feature_report(abi::report::CAPABILITY)?)?;
    let (device_name, firmware_version) =
        report::parse_information(&transport.get_feature_report(abi::report::INFORMATION)?)?;
    let serial = report::parse_serial(&transport.get_feature_report(abi::report::E_SERIAL)?)?;

    Ok(DeviceProfile {
        tablet_width: capability.tablet_width,
        tablet_height: capability.tablet_height,
        screen_width: capability.screen_width,
        screen_height: capability.screen_height,
        pressure_max: capability.pressure_max,
        refresh_rate: capability.refresh_rate,
        // parse_capability rejects a zero screen width before we get here
        scale_factor: capability.tablet_width as f64 / capability.screen_width as f64,
        device_name,
        firmware_version,
        serial,
    })
}

fn stream_chunks<T: Transport>(
    transport: &mut T,
    chunks: &[Vec<u8>],
    progress: &mut dyn FnMut(usize),
) -> Result<()> {
    transport.send_feature_report(abi::report::WRITE_IMAGE_START, &abi::image_start())?;
    for (i, chunk) in chunks.iter().enumerate() {
        progress(i);
        transport.send_feature_report(abi::report::WRITE_IMAGE_DATA, &abi::image_chunk(chunk))?;
    }
    transport.send_feature_report(abi::report::WRITE_IMAGE_END, &abi::image_end())
}

/// High level abstraction for managing an STU-540 signature pad
pub struct Stu540<T: Transport = HidTransport> {
    transport: Option<T>,
    state: ConnectionState,
    profile: Option<DeviceProfile>,
    /// Chunked copy of the last uploaded image, kept for resends
    chunks: Vec<Vec<u8>>,
    pen_subs: Vec<Sender<PenSample>>,
}

impl Stu540<HidTransport> {
    /// Find, open and negotiate with the first attached pad
    pub fn open() -> Result<Self> {
        let mut this = Self::new();
        this.connect()?
            .then_some(())
            .ok_or(PadError::DeviceNotFound)?;
        Ok(this)
    }
}

impl<T: Transport> Default for Stu540<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> Stu540<T> {
    /// Create a disconnected session; call [`connect`](Self::connect) to use it
    pub fn new() -> Self {
        Self {
            transport: None,
            state: ConnectionState::Disconnected,
            profile: None,
            chunks: Vec::new(),
            pen_subs: Vec::new(),
        }
    }

    /// Create a disconnected session over an already-opened transport
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport: Some(transport),
            ..Self::new()
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// The negotiated profile, present while connected
    pub fn profile(&self) -> Option<&DeviceProfile> {
        self.profile.as_ref()
    }

    /// Check if a matching pad is attached, without opening it
    pub fn check_available(&self) -> Result<bool> {
        if self.state == ConnectionState::Ready {
            return Ok(true);
        }
        stu_sync_core::device_present(&consts::IDENTITY)
    }

    /// Open the device and negotiate capabilities.
    ///
    /// Returns `Ok(false)` when no matching device is attached. Idempotent:
    /// an already-connected session succeeds without renegotiating. If any
    /// negotiation read fails the session reverts to disconnected and the
    /// error is surfaced.
    pub fn connect(&mut self) -> Result<bool> {
        if self.state == ConnectionState::Ready {
            return Ok(true);
        }
        let mut transport = match self.transport.take() {
            Some(transport) => transport,
            None => match T::acquire(&consts::IDENTITY)? {
                Some(transport) => transport,
                None => return Ok(false),
            },
        };

        self.state = ConnectionState::Negotiating;
        match negotiate(&mut transport) {
            Ok(profile) => {
                self.profile = Some(profile);
                self.transport = Some(transport);
                self.state = ConnectionState::Ready;
                Ok(true)
            },
            Err(e) => {
                self.state = ConnectionState::Disconnected;
                Err(e)
            },
        }
    }

    /// Close the device and discard the profile and image cache. Idempotent.
    pub fn disconnect(&mut self) {
        self.transport = None;
        self.profile = None;
        self.chunks.clear();
        self.state = ConnectionState::Disconnected;
    }

    fn transport(&mut self) -> Result<&mut T> {
        if self.state != ConnectionState::Ready {
            return Err(PadError::NotConnected);
        }
        self.transport.as_mut().ok_or(PadError::NotConnected)
    }

    /// Set pen ink color and width. Width can be 0-5.
    pub fn set_pen(&mut self, color: [u8; 3], width: u8) -> Result<()> {
        if width > 5 {
            return Err(PadError::InvalidInput("pen width must be 0-5"));
        }
        self.transport()?.send_feature_report(
            abi::report::PEN_COLOR_AND_WIDTH,
            &abi::pen_color_and_width(color, width),
        )
    }

    /// Set backlight intensity, 0-3.
    ///
    /// Reads the current value first and skips the write when unchanged;
    /// repeated backlight writes degrade the panel over time.
    pub fn set_backlight(&mut self, intensity: u8) -> Result<()> {
        if intensity > 3 {
            return Err(PadError::InvalidInput("backlight intensity must be 0-3"));
        }
        let transport = self.transport()?;
        let current = transport.get_feature_report(abi::report::BRIGHTNESS)?;
        if current.first() == Some(&intensity) {
            return Ok(());
        }
        transport.send_feature_report(abi::report::BRIGHTNESS, &abi::brightness(intensity))
    }

    /// Set background color. The screen must be cleared for it to show.
    ///
    /// Same read-before-write guard as the backlight; both settings wear the
    /// panel when rewritten needlessly.
    pub fn set_background(&mut self, color: [u8; 3]) -> Result<()> {
        let transport = self.transport()?;
        let current = transport.get_feature_report(abi::report::BACKGROUND_COLOR)?;
        if current.get(..3) == Some(color.as_slice()) {
            return Ok(());
        }
        transport
            .send_feature_report(abi::report::BACKGROUND_COLOR, &abi::background_color(color))
    }

    /// Restrict the writing area of the tablet
    pub fn set_writing_area(&mut self, area: WritingArea) -> Result<()> {
        self.transport()?
            .send_feature_report(abi::report::WRITING_AREA, &abi::writing_area(area))
    }

    /// Select basic pen reports or the timing variant
    pub fn set_writing_mode(&mut self, mode: WritingMode) -> Result<()> {
        self.transport()?
            .send_feature_report(abi::report::WRITING_MODE, &abi::writing_mode(mode))
    }

    /// Enable or disable inking the screen. Does not stop pen events.
    pub fn set_inking(&mut self, enabled: bool) -> Result<()> {
        self.transport()?
            .send_feature_report(abi::report::INK_MODE, &abi::ink_mode(enabled))
    }

    /// Clear the screen to the background color
    pub fn clear_screen(&mut self) -> Result<()> {
        self.transport()?
            .send_feature_report(abi::report::CLEAR_SCREEN, &abi::clear_screen())
    }

    /// Upload a raw image to the pad as format selector, ordered data
    /// chunks, then an end marker.
    ///
    /// The buffer must hold screen_width x screen_height pixels of 24-bit
    /// BGR, row-major with no padding; the caller is responsible for sizing.
    /// The chunked copy is cached for [`resend_image`](Self::resend_image).
    pub fn upload_image(&mut self, data: &[u8], progress: &mut dyn FnMut(usize)) -> Result<()> {
        if self.state != ConnectionState::Ready {
            return Err(PadError::NotConnected);
        }
        let chunks: Vec<Vec<u8>> = data.chunks(abi::CHUNK_SIZE).map(<[u8]>::to_vec).collect();
        let transport = self.transport.as_mut().ok_or(PadError::NotConnected)?;
        let result = stream_chunks(transport, &chunks, progress);
        self.chunks = chunks;
        result
    }

    /// Send the last uploaded image again without resupplying pixel data.
    /// Does nothing when no image has been uploaded this session.
    pub fn resend_image(&mut self, progress: &mut dyn FnMut(usize)) -> Result<()> {
        if self.chunks.is_empty() {
            return Ok(());
        }
        let chunks = std::mem::take(&mut self.chunks);
        let result = self
            .transport()
            .and_then(|transport| stream_chunks(transport, &chunks, progress));
        self.chunks = chunks;
        result
    }

    /// Register a pen sample receiver. Every registered receiver gets every
    /// decoded sample; dropped receivers are pruned on delivery.
    pub fn subscribe(&mut self) -> Receiver<PenSample> {
        let (tx, rx) = channel();
        self.pen_subs.push(tx);
        rx
    }

    /// Read and decode at most one pending input report, fanning the sample
    /// out to subscribers. Returns `None` on timeout and for reports that
    /// are not pen data (short, or a foreign report id).
    ///
    /// A transport failure here means the device went away mid-stream, so
    /// the session tears down before surfacing the error.
    pub fn poll_pen(&mut self, timeout_ms: i32) -> Result<Option<PenSample>> {
        let (scale_factor, pressure_max) = match &self.profile {
            Some(p) => (p.scale_factor, p.pressure_max as f64),
            None => (consts::FALLBACK_SCALE, consts::FALLBACK_PRESSURE_MAX),
        };

        let mut buf = [0u8; 16];
        let read = self.transport()?.read_input_report(&mut buf, timeout_ms);
        let len = match read {
            Ok(len) => len,
            Err(e) => {
                self.disconnect();
                return Err(e);
            },
        };
        if len == 0 {
            return Ok(None);
        }

        let Some(sample) = report::decode_pen(&buf[..len], scale_factor, pressure_max) else {
            return Ok(None);
        };
        self.pen_subs.retain(|tx| tx.send(sample.clone()).is_ok());
        Ok(Some(sample))
    }
}

// === Trait Implementations ===

impl<T: Transport> Pad for Stu540<T> {
    fn info(&self) -> &'static PadInfo {
        &INFO
    }

    fn describe(&self) -> Vec<(&'static str, String)> {
        let Some(p) = &self.profile else {
            return Vec::new();
        };
        vec![
            ("device", p.device_name.clone()),
            ("firmware", p.firmware_version.clone()),
            ("serial", p.serial.clone()),
            ("tablet units", format!("{}x{}", p.tablet_width, p.tablet_height)),
            ("screen px", format!("{}x{}", p.screen_width, p.screen_height)),
            ("pressure max", p.pressure_max.to_string()),
            ("refresh rate", format!("{}hz", p.refresh_rate)),
            ("scale factor", p.scale_factor.to_string()),
        ]
    }

    fn as_ink(&mut self) -> Option<&mut dyn HasInk> {
        Some(self)
    }

    fn as_backlight(&mut self) -> Option<&mut dyn HasBacklight> {
        Some(self)
    }

    fn as_image(&mut self) -> Option<&mut dyn HasImage> {
        Some(self)
    }

    fn as_pen_input(&mut self) -> Option<&mut dyn HasPenInput> {
        Some(self)
    }

    fn as_screen_size(&self) -> Option<(u32, u32)> {
        match &self.profile {
            Some(p) => Some((p.screen_width as u32, p.screen_height as u32)),
            None => Some((SCREEN_WIDTH, SCREEN_HEIGHT)),
        }
    }
}

impl<T: Transport> HasInk for Stu540<T> {
    fn set_pen(&mut self, color: [u8; 3], width: u8) -> Result<()> {
        Stu540::set_pen(self, color, width)
    }

    fn set_background(&mut self, color: [u8; 3]) -> Result<()> {
        Stu540::set_background(self, color)
    }

    fn set_inking(&mut self, enabled: bool) -> Result<()> {
        Stu540::set_inking(self, enabled)
    }

    fn clear_screen(&mut self) -> Result<()> {
        Stu540::clear_screen(self)
    }
}

impl<T: Transport> HasBacklight for Stu540<T> {
    fn set_backlight(&mut self, intensity: u8) -> Result<()> {
        Stu540::set_backlight(self, intensity)
    }
}

impl<T: Transport> HasImage for Stu540<T> {
    fn upload_image(&mut self, data: &[u8], progress: &mut dyn FnMut(usize)) -> Result<()> {
        Stu540::upload_image(self, data, progress)
    }

    fn resend_image(&mut self, progress: &mut dyn FnMut(usize)) -> Result<()> {
        Stu540::resend_image(self, progress)
    }
}

impl<T: Transport> HasPenInput for Stu540<T> {
    fn set_writing_mode(&mut self, timing: bool) -> Result<()> {
        Stu540::set_writing_mode(
            self,
            if timing { WritingMode::Timing } else { WritingMode::Basic },
        )
    }

    fn set_writing_area(&mut self, x1: u16, y1: u16, x2: u16, y2: u16) -> Result<()> {
        Stu540::set_writing_area(self, WritingArea { x1, y1, x2, y2 })
    }

    fn subscribe(&mut self) -> Receiver<PenSample> {
        Stu540::subscribe(self)
    }

    fn poll(&mut self, timeout_ms: i32) -> Result<Option<PenSample>> {
        Stu540::poll_pen(self, timeout_ms)
    }
}
