// src/transport/mod.rs

//! Delivery of frames to the controller.
//!
//! [`Endpoint`] is the raw "send these 8 bytes" primitive; [`Transport`]
//! adds the retry and settle timing the controller needs. The transport owns
//! its endpoint for the whole process, so every send is serialized.

pub mod usb;

#[cfg(test)]
pub mod mock;

use anyhow::Result;
use log::{trace, warn};
use std::time::Duration;

use crate::config::TimingConfig;
use crate::error::VfdError;
use crate::protocol::{Packet, PACKET_SIZE};

/// A device that accepts one frame per control transfer.
pub trait Endpoint {
    /// Writes one frame, returning the number of bytes the device accepted.
    fn write_control(&mut self, data: &[u8; PACKET_SIZE], timeout: Duration) -> Result<usize>;
}

pub struct Transport<E: Endpoint> {
    endpoint: E,
    attempts: u32,
    settle_delay: Duration,
    retry_delay: Duration,
    transfer_timeout: Duration,
}

impl<E: Endpoint> Transport<E> {
    pub fn new(endpoint: E, timing: &TimingConfig) -> Self {
        Transport {
            endpoint,
            attempts: timing.write_attempts.max(1),
            settle_delay: timing.settle_delay(),
            retry_delay: timing.retry_delay(),
            transfer_timeout: timing.transfer_timeout(),
        }
    }

    /// Sends one frame, retrying short or failed transfers.
    ///
    /// On success the settle delay has already elapsed when this returns.
    pub fn send(&mut self, packet: &Packet) -> Result<(), VfdError> {
        for attempt in 1..=self.attempts {
            match self
                .endpoint
                .write_control(packet.as_bytes(), self.transfer_timeout)
            {
                Ok(PACKET_SIZE) => {
                    trace!("Sent {:?} {:?} (attempt {})", packet.command(), packet, attempt);
                    std::thread::sleep(self.settle_delay);
                    return Ok(());
                }
                Ok(written) => {
                    warn!(
                        "Short write ({} of {} bytes), retrying...",
                        written, PACKET_SIZE
                    );
                }
                Err(e) => {
                    warn!("Write failed ({:#}), retrying...", e);
                }
            }
            std::thread::sleep(self.retry_delay);
        }
        Err(VfdError::TransferFailed {
            attempts: self.attempts,
        })
    }

    /// Sends every frame even if some fail, returning the first failure.
    pub fn send_all(&mut self, packets: &[Packet]) -> Result<(), VfdError> {
        let mut outcome = Ok(());
        for packet in packets {
            if let Err(e) = self.send(packet) {
                warn!("Dropping {:?}: {}", packet, e);
                if outcome.is_ok() {
                    outcome = Err(e);
                }
            }
        }
        outcome
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    pub fn endpoint_mut(&mut self) -> &mut E {
        &mut self.endpoint
    }

    pub fn into_endpoint(self) -> E {
        self.endpoint
    }
}
