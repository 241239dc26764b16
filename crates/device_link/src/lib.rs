use shared::domain::ChannelIndex;
use thiserror::Error;

mod dry_run;
#[cfg(feature = "udmx")]
mod udmx;

pub use dry_run::DryRunLink;
#[cfg(feature = "udmx")]
pub use udmx::UdmxLink;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("output device not found (vid {vendor_id:04x} pid {product_id:04x})")]
    DeviceNotFound { vendor_id: u16, product_id: u16 },
    #[error("output device is not open")]
    NotOpen,
    #[error("transfer to channel {channel} failed: {message}")]
    Transfer { channel: ChannelIndex, message: String },
    #[error("output device error: {0}")]
    Device(String),
}

/// A fire-and-forget output link. There is no acknowledgement channel: `Ok`
/// only means the operation did not report an error.
pub trait DeviceLink {
    fn open(&mut self) -> Result<(), LinkError>;
    fn send(&mut self, channel: ChannelIndex, value: u8) -> Result<(), LinkError>;
    fn close(&mut self) -> Result<(), LinkError>;

    /// Closes and opens again. The open is attempted even if close failed.
    fn reopen(&mut self) -> Result<(), LinkError> {
        let closed = self.close();
        self.open()?;
        closed
    }
}

impl<L: DeviceLink + ?Sized> DeviceLink for Box<L> {
    fn open(&mut self) -> Result<(), LinkError> {
        (**self).open()
    }

    fn send(&mut self, channel: ChannelIndex, value: u8) -> Result<(), LinkError> {
        (**self).send(channel, value)
    }

    fn close(&mut self) -> Result<(), LinkError> {
        (**self).close()
    }

    fn reopen(&mut self) -> Result<(), LinkError> {
        (**self).reopen()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    DryRun,
    Udmx,
}

impl LinkKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "dry-run" | "dry_run" | "dryrun" | "none" => Some(Self::DryRun),
            "udmx" | "usb" => Some(Self::Udmx),
            _ => None,
        }
    }
}

/// Builds the link selected by `kind`. The link is returned unopened.
pub fn build_link(kind: LinkKind) -> Result<Box<dyn DeviceLink + Send>, LinkError> {
    match kind {
        LinkKind::DryRun => Ok(Box::new(DryRunLink::default())),
        #[cfg(feature = "udmx")]
        LinkKind::Udmx => Ok(Box::new(UdmxLink::default())),
        #[cfg(not(feature = "udmx"))]
        LinkKind::Udmx => Err(LinkError::Device(
            "built without the `udmx` feature".to_string(),
        )),
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
