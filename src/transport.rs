//! Binding of a relay board to a raw HID device.

use std::ffi::CString;

use hidapi::HidApi;
use hidapi::HidDevice;
use log::debug;
use log::trace;

use crate::error::RelayError;
use crate::frame::Frame;
use crate::frame::ACK_LEN;
use crate::frame::FRAME_LEN;

/// A HID device as reported by enumeration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceEntry {
    pub path: String,
    pub vendor_id: u16,
    pub product_id: u16,
    pub product: Option<String>,
    pub serial_number: Option<String>,
}

/// Raw report I/O on an opened HID device.
pub trait HidLink {
    /// Writes one output report, returns the number of bytes accepted.
    fn write(&mut self, data: &[u8]) -> Result<usize, RelayError>;

    /// Blocks until an input report arrives, returns the number of bytes read.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, RelayError>;
}

/// Enumerates and opens HID devices.
pub trait HidBackend {
    type Link: HidLink;

    /// Lists HID devices, all of them if `ids` is `None`, otherwise only
    /// the ones matching the (vendor id, product id) pair.
    fn enumerate(&self, ids: Option<(u16, u16)>) -> Result<Vec<DeviceEntry>, RelayError>;

    fn open_path(&self, path: &str) -> Result<Self::Link, RelayError>;
}

impl HidLink for HidDevice {
    fn write(&mut self, data: &[u8]) -> Result<usize, RelayError> {
        Ok(HidDevice::write(self, data)?)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, RelayError> {
        Ok(HidDevice::read(self, buf)?)
    }
}

/// [`HidBackend`] on top of the system HID library.
pub struct HidApiBackend {
    api: HidApi,
}

impl HidApiBackend {
    pub fn new() -> Result<HidApiBackend, RelayError> {
        let api = HidApi::new()?;
        Ok(HidApiBackend { api })
    }
}

impl HidBackend for HidApiBackend {
    type Link = HidDevice;

    fn enumerate(&self, ids: Option<(u16, u16)>) -> Result<Vec<DeviceEntry>, RelayError> {
        let devices = self
            .api
            .device_list()
            .filter(|d| match ids {
                Some((vid, pid)) => d.vendor_id() == vid && d.product_id() == pid,
                None => true,
            })
            .map(|d| DeviceEntry {
                path: d.path().to_string_lossy().to_string(),
                vendor_id: d.vendor_id(),
                product_id: d.product_id(),
                product: d.product_string().map(|s| s.to_string()),
                serial_number: d.serial_number().map(|s| s.to_string()),
            })
            .collect();
        Ok(devices)
    }

    fn open_path(&self, path: &str) -> Result<HidDevice, RelayError> {
        let c_path = match CString::new(path) {
            Ok(c_path) => c_path,
            Err(_) => {
                return Err(RelayError::DeviceNotFound(format!(
                    "Invalid device path '{}'",
                    path
                )))
            }
        };
        Ok(self.api.open_path(&c_path)?)
    }
}

/// Lists the boards matching `vendor_id`/`product_id`.
///
/// The boards carry no serial number, and the order is whatever the
/// platform enumerates. To drive more than one board, pin each by path.
pub fn list_devices<B: HidBackend>(
    backend: &B,
    vendor_id: u16,
    product_id: u16,
) -> Result<Vec<DeviceEntry>, RelayError> {
    backend.enumerate(Some((vendor_id, product_id)))
}

/// An open HID device bound to one relay board.
pub struct HidTransport<L: HidLink> {
    link: L,
    path: String,
}

impl<L: HidLink> HidTransport<L> {
    /// Binds to the device at `path`, or to the first enumerated device
    /// with the given ids if no path is given.
    pub fn open<B>(
        backend: &B,
        path: Option<&str>,
        vendor_id: u16,
        product_id: u16,
    ) -> Result<HidTransport<L>, RelayError>
    where
        B: HidBackend<Link = L>,
    {
        let path = match path {
            Some(path) => {
                let devices = backend.enumerate(None)?;
                if !devices.iter().any(|d| d.path == path) {
                    return Err(RelayError::DeviceNotFound(format!(
                        "No HID device at path '{}'",
                        path
                    )));
                }
                path.to_string()
            }
            None => {
                let mut devices = backend.enumerate(Some((vendor_id, product_id)))?;
                if devices.is_empty() {
                    return Err(RelayError::DeviceNotFound(format!(
                        "No device with VID {:04X} and PID {:04X}",
                        vendor_id, product_id
                    )));
                }
                if devices.len() > 1 {
                    debug!(
                        "Found {} matching devices, binding the first one",
                        devices.len()
                    );
                }
                devices.remove(0).path
            }
        };

        debug!("Opening relay board at '{}'", path);
        let link = backend.open_path(&path)?;
        Ok(HidTransport { link, path })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn write_frame(&mut self, frame: &Frame) -> Result<(), RelayError> {
        trace!("Writing frame {:02X?}", frame);
        let written = self.link.write(frame)?;
        if written < FRAME_LEN {
            return Err(RelayError::Transport(format!(
                "Short write: {} of {} bytes",
                written, FRAME_LEN
            )));
        }
        Ok(())
    }

    /// Reads the acknowledgement following a command. Its content carries
    /// no information, it only signals that the board processed the frame.
    pub fn read_ack(&mut self) -> Result<(), RelayError> {
        let mut ack = [0u8; ACK_LEN];
        let read = self.link.read(&mut ack)?;
        trace!("Read ack {:02X?}", &ack[..read.min(ACK_LEN)]);
        Ok(())
    }
}
