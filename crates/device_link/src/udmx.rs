use std::time::Duration;

use rusb::{Context, DeviceHandle, UsbContext};
use shared::domain::ChannelIndex;
use tracing::{debug, info};

use crate::{DeviceLink, LinkError};

pub const UDMX_VENDOR_ID: u16 = 0x16c0;
pub const UDMX_PRODUCT_ID: u16 = 0x05dc;

// Vendor | Device | Host-to-Device
const REQUEST_TYPE_OUT: u8 = 0x40;
const SET_SINGLE_CHANNEL: u8 = 1;
const USB_TIMEOUT: Duration = Duration::from_millis(500);

/// Anyma uDMX style interface driven with one vendor control transfer per
/// channel value.
pub struct UdmxLink {
    vendor_id: u16,
    product_id: u16,
    handle: Option<DeviceHandle<Context>>,
}

impl Default for UdmxLink {
    fn default() -> Self {
        Self::new(UDMX_VENDOR_ID, UDMX_PRODUCT_ID)
    }
}

impl UdmxLink {
    pub fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
            handle: None,
        }
    }
}

impl DeviceLink for UdmxLink {
    fn open(&mut self) -> Result<(), LinkError> {
        let context = Context::new().map_err(|e| LinkError::Device(e.to_string()))?;
        let handle = context
            .open_device_with_vid_pid(self.vendor_id, self.product_id)
            .ok_or(LinkError::DeviceNotFound {
                vendor_id: self.vendor_id,
                product_id: self.product_id,
            })?;
        info!(
            vendor_id = self.vendor_id,
            product_id = self.product_id,
            "uDMX interface opened"
        );
        self.handle = Some(handle);
        Ok(())
    }

    fn send(&mut self, channel: ChannelIndex, value: u8) -> Result<(), LinkError> {
        let handle = self.handle.as_ref().ok_or(LinkError::NotOpen)?;
        // wValue carries the level, wIndex the channel; no data stage.
        handle
            .write_control(
                REQUEST_TYPE_OUT,
                SET_SINGLE_CHANNEL,
                u16::from(value),
                channel.0,
                &[],
                USB_TIMEOUT,
            )
            .map_err(|e| LinkError::Transfer {
                channel,
                message: e.to_string(),
            })?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), LinkError> {
        if self.handle.take().is_some() {
            debug!("uDMX interface closed");
        }
        Ok(())
    }
}
