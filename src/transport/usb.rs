// src/transport/usb.rs

//! The panel's USB side: a HID-class SET_REPORT control transfer per frame.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use rusb::{DeviceHandle, GlobalContext, UsbContext};
use std::time::Duration;

use super::Endpoint;
use crate::error::VfdError;
use crate::protocol::PACKET_SIZE;

/// Host-to-device, class request, recipient interface.
const REQUEST_TYPE: u8 = 0x21;
/// HID SET_REPORT.
const REQUEST: u8 = 0x09;
/// Output report, id 0.
const VALUE: u16 = 0x0200;
const INDEX: u16 = 0x0001;

pub struct UsbEndpoint {
    handle: DeviceHandle<GlobalContext>,
    interface: u8,
}

impl UsbEndpoint {
    /// Opens the first attached device matching `vendor_id:product_id` and
    /// claims `interface` on it.
    pub fn open(vendor_id: u16, product_id: u16, interface: u8) -> Result<Self, VfdError> {
        let context = GlobalContext::default();
        let device = context
            .devices()?
            .iter()
            .find(|device| match device.device_descriptor() {
                Ok(desc) => desc.vendor_id() == vendor_id && desc.product_id() == product_id,
                Err(e) => {
                    debug!(
                        "Skipping device at bus {} address {}: {}",
                        device.bus_number(),
                        device.address(),
                        e
                    );
                    false
                }
            })
            .ok_or(VfdError::DeviceNotFound {
                vendor_id,
                product_id,
            })?;

        info!(
            "Found {:04x}:{:04x} at bus {} address {}",
            vendor_id,
            product_id,
            device.bus_number(),
            device.address()
        );
        let handle = device.open()?;

        if let Err(e) = handle.set_auto_detach_kernel_driver(true) {
            debug!("Kernel driver auto-detach unavailable: {}", e);
        }

        handle
            .claim_interface(interface)
            .map_err(|source| VfdError::InterfaceClaimFailed { interface, source })?;
        debug!("Claimed interface {}", interface);

        Ok(UsbEndpoint { handle, interface })
    }

    /// Releases the interface. The handle itself is closed when dropped.
    pub fn close(self) -> Result<(), VfdError> {
        let interface = self.interface;
        let released = self
            .handle
            .release_interface(interface)
            .map_err(|source| VfdError::ReleaseFailed { interface, source });
        match &released {
            Ok(()) => debug!("Released interface {}", interface),
            Err(e) => warn!("{}", e),
        }
        released
    }
}

impl Endpoint for UsbEndpoint {
    fn write_control(&mut self, data: &[u8; PACKET_SIZE], timeout: Duration) -> Result<usize> {
        self.handle
            .write_control(REQUEST_TYPE, REQUEST, VALUE, INDEX, data, timeout)
            .context("control transfer failed")
    }
}
