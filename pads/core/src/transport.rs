//! HID transport abstraction.
//!
//! All device traffic goes through the [`Transport`] trait so sessions can be
//! exercised against a mock in tests. [`HidTransport`] is the hidapi-backed
//! implementation used by real pads.

use std::sync::{LazyLock, RwLock};

use hidapi::{HidApi, HidDevice};

use crate::features::Result;

/// Lazy handle to hidapi
static API: LazyLock<RwLock<HidApi>> =
    LazyLock::new(|| RwLock::new(HidApi::new().expect("failed to init hidapi")));

/// Vendor and product id pair identifying a device family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceIdentity {
    pub vendor_id: u16,
    pub product_id: u16,
}

/// Raw report exchange with one opened HID device.
///
/// The device handles exactly one feature-report transaction at a time, so
/// all methods take `&mut self`; holders must not interleave exchanges.
pub trait Transport: Send {
    /// Find and open the first attached device matching `identity`.
    /// Returns `None` when no matching device is present.
    fn acquire(identity: &DeviceIdentity) -> Result<Option<Self>>
    where
        Self: Sized;

    /// Send a feature report. `payload` excludes the report id.
    fn send_feature_report(&mut self, report_id: u8, payload: &[u8]) -> Result<()>;

    /// Read a feature report, returning its payload without the report id.
    fn get_feature_report(&mut self, report_id: u8) -> Result<Vec<u8>>;

    /// Read one raw input report into `buf` (report id at byte 0).
    /// Returns 0 when the timeout elapses with no report pending.
    fn read_input_report(&mut self, buf: &mut [u8], timeout_ms: i32) -> Result<usize>;
}

/// Default transport over a hidapi device handle
pub struct HidTransport {
    device: HidDevice,
}

impl Transport for HidTransport {
    fn acquire(identity: &DeviceIdentity) -> Result<Option<Self>> {
        API.write().unwrap().refresh_devices()?;
        let api = API.read().unwrap();
        let Some(info) = api.device_list().find(|d| {
            d.vendor_id() == identity.vendor_id && d.product_id() == identity.product_id
        }) else {
            return Ok(None);
        };
        Ok(Some(Self {
            device: info.open_device(&api)?,
        }))
    }

    fn send_feature_report(&mut self, report_id: u8, payload: &[u8]) -> Result<()> {
        let mut buf = Vec::with_capacity(payload.len() + 1);
        buf.push(report_id);
        buf.extend_from_slice(payload);
        self.device.send_feature_report(&buf)?;
        Ok(())
    }

    fn get_feature_report(&mut self, report_id: u8) -> Result<Vec<u8>> {
        let mut buf = [0u8; 64];
        buf[0] = report_id;
        let len = self.device.get_feature_report(&mut buf)?;
        // response includes the report id prefix, strip it
        Ok(buf[1..len.max(1)].to_vec())
    }

    fn read_input_report(&mut self, buf: &mut [u8], timeout_ms: i32) -> Result<usize> {
        Ok(self.device.read_timeout(buf, timeout_ms)?)
    }
}

/// Check if a device matching the identity is attached, without opening it
pub fn device_present(identity: &DeviceIdentity) -> Result<bool> {
    API.write().unwrap().refresh_devices()?;
    Ok(API.read().unwrap().device_list().any(|d| {
        d.vendor_id() == identity.vendor_id && d.product_id() == identity.product_id
    }))
}
