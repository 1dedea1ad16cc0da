//! hidapi-backed device transport.
//!
//! # hidapi backends
//!
//! On Linux the crate is built with the `linux-native-basic-udev` backend,
//! which talks to `/dev/hidraw*` directly and needs neither the C hidapi
//! library nor libudev at build time.  The calling user needs read/write
//! permission on the hidraw node; a udev rule such as
//!
//! ```text
//! SUBSYSTEM=="hidraw", ATTRS{idVendor}=="0483", ATTRS{idProduct}=="6611", MODE="0660", GROUP="plugdev"
//! ```
//!
//! grants it.

use hidapi::{HidApi, HidDevice, HidError};
use tracing::debug;

use crate::application::device_session::{
    DeviceConnector, DeviceDescription, DeviceError, HidTransport, TransportError,
};

fn transport_error(err: HidError) -> TransportError {
    TransportError(err.to_string())
}

/// Opens the first device matching a vendor/product id pair.
pub struct HidapiConnector {
    api: HidApi,
    vendor_id: u16,
    product_id: u16,
}

impl HidapiConnector {
    /// Initialises hidapi.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::NotFound`] if the HID subsystem cannot be
    /// initialised; no device can be found in that case either.
    pub fn new(vendor_id: u16, product_id: u16) -> Result<Self, DeviceError> {
        let api = HidApi::new().map_err(|e| DeviceError::NotFound {
            vendor_id,
            product_id,
            reason: format!("HID subsystem unavailable: {e}"),
        })?;
        Ok(Self {
            api,
            vendor_id,
            product_id,
        })
    }

    fn not_found(&self, err: HidError) -> DeviceError {
        DeviceError::NotFound {
            vendor_id: self.vendor_id,
            product_id: self.product_id,
            reason: err.to_string(),
        }
    }
}

impl DeviceConnector for HidapiConnector {
    fn open(&mut self) -> Result<Box<dyn HidTransport>, DeviceError> {
        // The device list is cached by HidApi; refresh it so a re-plugged
        // transceiver is visible to the reconnection loop.
        if let Err(e) = self.api.refresh_devices() {
            debug!("refreshing the HID device list failed: {e}");
        }
        let device = self
            .api
            .open(self.vendor_id, self.product_id)
            .map_err(|e| self.not_found(e))?;
        device.set_blocking_mode(false).map_err(|e| self.not_found(e))?;
        Ok(Box::new(HidapiTransport { device }))
    }
}

/// One open hidapi device handle.  Dropping it closes the device.
pub struct HidapiTransport {
    device: HidDevice,
}

impl HidTransport for HidapiTransport {
    fn get_feature_report(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        self.device.get_feature_report(buf).map_err(transport_error)
    }

    fn send_feature_report(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        self.device
            .send_feature_report(data)
            .map(|()| data.len())
            .map_err(transport_error)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        self.device.write(data).map_err(transport_error)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        self.device.read(buf).map_err(transport_error)
    }

    fn describe(&self) -> DeviceDescription {
        DeviceDescription {
            manufacturer: self.device.get_manufacturer_string().ok().flatten(),
            product: self.device.get_product_string().ok().flatten(),
            serial_number: self.device.get_serial_number_string().ok().flatten(),
        }
    }
}
