// src/error.rs

//! Error taxonomy shared by the transport, the order queue and the icon table.
//!
//! Everything in here is reported through `log` by whoever receives it; only
//! the device open/claim failures abort the process (see `main.rs`).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VfdError {
    #[error("no USB device {vendor_id:04x}:{product_id:04x} attached")]
    DeviceNotFound { vendor_id: u16, product_id: u16 },

    /// Usually a permissions problem; retrying as root tends to help.
    #[error("unable to claim interface {interface}: {source}")]
    InterfaceClaimFailed {
        interface: u8,
        #[source]
        source: rusb::Error,
    },

    #[error("unable to release interface {interface}: {source}")]
    ReleaseFailed {
        interface: u8,
        #[source]
        source: rusb::Error,
    },

    #[error("packet transfer failed after {attempts} attempt(s)")]
    TransferFailed { attempts: u32 },

    #[error("order queue is full ({capacity} orders)")]
    QueueFull { capacity: usize },

    #[error("unknown icon '{0}'")]
    IconNameUnrecognized(String),

    #[error(transparent)]
    Protocol(#[from] crate::protocol::ProtocolError),

    #[error("USB error: {0}")]
    Usb(#[from] rusb::Error),
}

impl VfdError {
    /// Process exit status for failures that abort before the scheduler starts.
    pub fn exit_code(&self) -> i32 {
        match self {
            VfdError::DeviceNotFound { .. } => -1,
            VfdError::InterfaceClaimFailed { .. } => -2,
            _ => 1,
        }
    }
}
