// src/transport/mock.rs

use crate::os::CancellationToken;
use crate::protocol::{Packet, PACKET_SIZE};
use crate::transport::Endpoint;
use anyhow::{bail, Result};
use std::collections::VecDeque;
use std::time::Duration;

/// What the mock does with the next write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Accept,
    Fail,
    Short(usize),
}

/// Records accepted frames. Writes are accepted unless an outcome was
/// scripted with [`MockEndpoint::push_outcome`].
#[derive(Debug, Default)]
pub struct MockEndpoint {
    outcomes: VecDeque<WriteOutcome>,
    sent: Vec<[u8; PACKET_SIZE]>,
    attempts: usize,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl MockEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_outcome(&mut self, outcome: WriteOutcome) {
        self.outcomes.push_back(outcome);
    }

    /// Cancels `token` once `writes` frames were accepted.
    pub fn cancel_after(&mut self, writes: usize, token: CancellationToken) {
        self.cancel_after = Some((writes, token));
    }

    pub fn sent(&self) -> &[[u8; PACKET_SIZE]] {
        &self.sent
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Concatenated payloads of every text frame, in order.
    pub fn text(&self) -> Vec<u8> {
        self.sent
            .iter()
            .filter(|frame| frame[0] >> 4 == 0x9)
            .flat_map(|frame| frame[1..=(frame[0] & 0x0F) as usize].to_vec())
            .collect()
    }

    pub fn contains(&self, packet: &Packet) -> bool {
        self.sent.iter().any(|frame| frame == packet.as_bytes())
    }
}

impl Endpoint for MockEndpoint {
    fn write_control(&mut self, data: &[u8; PACKET_SIZE], _timeout: Duration) -> Result<usize> {
        self.attempts += 1;
        match self.outcomes.pop_front().unwrap_or(WriteOutcome::Accept) {
            WriteOutcome::Accept => {
                self.sent.push(*data);
                if let Some((writes, token)) = &self.cancel_after {
                    if self.sent.len() >= *writes {
                        token.cancel();
                    }
                }
                Ok(PACKET_SIZE)
            }
            WriteOutcome::Short(written) => Ok(written),
            WriteOutcome::Fail => bail!("mock transfer failure"),
        }
    }
}

/// Controller timing with every delay removed.
pub fn instant_timing() -> crate::config::TimingConfig {
    crate::config::TimingConfig {
        settle_delay_us: 0,
        retry_delay_us: 0,
        scroll_step_ms: 0,
        page_step_ms: 0,
        cycle_delay_ms: 0,
        ..Default::default()
    }
}
