// src/scheduler.rs

//! Cooperative loop replaying the blocking orders.
//!
//! The scheduler is `Idle` until the first order is registered and `Running`
//! from then on. A running scheduler walks the queue oldest to newest,
//! renders every order to completion, pauses, and starts over until the
//! cancellation token is set. Orders never interleave: they share the one
//! physical row.

use log::{debug, info, trace, warn};

use crate::config::{Config, TimingConfig};
use crate::display::Display;
use crate::error::VfdError;
use crate::orders::{Order, OrderQueue, RenderContext, RenderOutcome};
use crate::os::CancellationToken;
use crate::transport::Endpoint;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SchedulerState {
    /// No orders; the process only performs one-shot requests.
    Idle,
    Running,
}

/// What the caller should do after one pass over the queue.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CycleStatus {
    Continue,
    /// Cancellation was observed; stop looping.
    Shutdown,
}

pub struct Scheduler {
    queue: OrderQueue,
    state: SchedulerState,
    timing: TimingConfig,
    default_clock_format: String,
    max_message_len: usize,
}

impl Scheduler {
    pub fn new(config: &Config) -> Self {
        Scheduler {
            queue: OrderQueue::new(),
            state: SchedulerState::Idle,
            timing: config.timing.clone(),
            default_clock_format: config.clock.default_format.clone(),
            max_message_len: config.message.max_len,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn queue(&self) -> &OrderQueue {
        &self.queue
    }

    /// Queues `order` for every future pass. When the queue is full the new
    /// order is dropped and the ones already queued keep running.
    pub fn register(&mut self, order: Order) -> Result<(), VfdError> {
        let kind = order.kind();
        match self.queue.add(order) {
            Ok(_) => {
                debug!(
                    "Registered {} order ({} of {})",
                    kind,
                    self.queue.count(),
                    OrderQueue::capacity()
                );
                self.state = SchedulerState::Running;
                Ok(())
            }
            Err(_full) => {
                let err = VfdError::QueueFull {
                    capacity: OrderQueue::capacity(),
                };
                warn!("Can't add {} order: {}", kind, err);
                Err(err)
            }
        }
    }

    /// Renders every queued order once, then waits out the cycle delay.
    pub fn run_cycle<E: Endpoint>(
        &self,
        display: &mut Display<E>,
        cancel: &CancellationToken,
    ) -> CycleStatus {
        let ctx = RenderContext {
            cancel,
            timing: &self.timing,
            default_clock_format: &self.default_clock_format,
            max_message_len: self.max_message_len,
        };

        for index in 0..self.queue.count() {
            let order = match self.queue.get(index as isize) {
                Ok(order) => order,
                Err(e) => {
                    warn!("Order {} vanished from the queue: {}", index, e);
                    continue;
                }
            };
            if order.render(display, &ctx) == RenderOutcome::Cancelled {
                trace!("Cancelled while rendering order {}", index);
                return CycleStatus::Shutdown;
            }
        }

        if cancel.sleep(self.timing.cycle_delay()) {
            CycleStatus::Continue
        } else {
            CycleStatus::Shutdown
        }
    }

    /// Loops until `cancel` is set. Returns the number of completed passes;
    /// an idle scheduler returns immediately.
    pub fn run<E: Endpoint>(&self, display: &mut Display<E>, cancel: &CancellationToken) -> usize {
        if self.state == SchedulerState::Idle {
            debug!("No blocking orders registered");
            return 0;
        }

        info!("Processing {} blocking order(s)", self.queue.count());
        for order in self.queue.iter() {
            debug!("  {:?}", order);
        }
        let mut passes = 0;
        while !cancel.is_cancelled() {
            match self.run_cycle(display, cancel) {
                CycleStatus::Continue => passes += 1,
                CycleStatus::Shutdown => break,
            }
        }
        info!("Quitting after {} complete pass(es)", passes);
        passes
    }
}
