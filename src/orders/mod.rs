// src/orders/mod.rs

//! Blocking orders: display tasks that are registered once and replayed on
//! every scheduler pass.
//!
//! Each order renders with its own payload. Rendering runs to completion
//! unless the cancellation token is set; long renders (scrolling, pages)
//! check the token before every frame and sleep through it.

pub mod queue;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, TimeZone};
use log::{debug, warn};
use std::fmt::{self, Write};
use std::time::Duration;
use thiserror::Error;

use crate::config::TimingConfig;
use crate::display::{to_cells, Display};
use crate::os::{uptime, CancellationToken};
use crate::protocol::ClearMode;
use crate::transport::Endpoint;

pub use queue::{OrderQueue, QueueError, ORDER_QUEUE_CAPACITY};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    #[error("invalid clock format '{0}'")]
    InvalidClockFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStyle {
    /// Slides through the row one character per step.
    Scroll,
    /// Shows one full row per step.
    Paginate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Order {
    /// Local time, centered. `None` uses the configured default format.
    Clock { format: Option<String> },
    Message { text: String, style: MessageStyle },
    /// "Uptime: HH:MM", scrolled.
    Uptime,
}

/// How a single render ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Completed,
    Cancelled,
}

/// Everything a render needs besides the display.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub cancel: &'a CancellationToken,
    pub timing: &'a TimingConfig,
    pub default_clock_format: &'a str,
    pub max_message_len: usize,
}

impl Order {
    pub fn clock(format: Option<String>) -> Result<Self, OrderError> {
        if let Some(format) = &format {
            validate_clock_format(format)?;
        }
        Ok(Order::Clock { format })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Order::Clock { .. } => "clock",
            Order::Message {
                style: MessageStyle::Scroll,
                ..
            } => "message",
            Order::Message {
                style: MessageStyle::Paginate,
                ..
            } => "paged message",
            Order::Uptime => "uptime",
        }
    }

    /// One scheduler pass worth of this order. Transfer failures are logged
    /// by the transport and do not end the render.
    pub fn render<E: Endpoint>(
        &self,
        display: &mut Display<E>,
        ctx: &RenderContext,
    ) -> RenderOutcome {
        if ctx.cancel.is_cancelled() {
            return RenderOutcome::Cancelled;
        }
        debug!("Rendering {} order", self.kind());
        match self {
            Order::Clock { format } => {
                let format = format.as_deref().unwrap_or(ctx.default_clock_format);
                render_clock(display, &Local::now(), format);
                RenderOutcome::Completed
            }
            Order::Message { text, style } => {
                let cells = limit_message(text, ctx.max_message_len);
                match style {
                    MessageStyle::Scroll => {
                        scroll(display, &cells, ctx.timing.scroll_step(), ctx.cancel)
                    }
                    MessageStyle::Paginate => {
                        paginate(display, &cells, ctx.timing.page_step(), ctx.cancel)
                    }
                }
            }
            Order::Uptime => match uptime::uptime() {
                Ok(elapsed) => {
                    let cells = to_cells(&format_uptime(elapsed));
                    scroll(display, &cells, ctx.timing.scroll_step(), ctx.cancel)
                }
                Err(e) => {
                    warn!("Skipping uptime order: {:#}", e);
                    RenderOutcome::Completed
                }
            },
        }
    }
}

/// Rejects formats chrono cannot render, so a bad format fails at
/// registration instead of on every pass.
pub fn validate_clock_format(format: &str) -> Result<(), OrderError> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(OrderError::InvalidClockFormat(format.to_string()));
    }
    Ok(())
}

pub fn format_time<Tz: TimeZone>(now: &DateTime<Tz>, format: &str) -> Result<String, OrderError>
where
    Tz::Offset: fmt::Display,
{
    let mut text = String::new();
    write!(text, "{}", now.format(format))
        .map_err(|_| OrderError::InvalidClockFormat(format.to_string()))?;
    Ok(text)
}

pub fn format_uptime(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("Uptime: {:02}:{:02}", secs / 3600, (secs % 3600) / 60)
}

fn render_clock<E: Endpoint, Tz: TimeZone>(
    display: &mut Display<E>,
    now: &DateTime<Tz>,
    format: &str,
) where
    Tz::Offset: fmt::Display,
{
    match format_time(now, format) {
        Ok(text) => {
            let _ = display.show_centered(&text);
        }
        Err(e) => warn!("Skipping clock order: {}", e),
    }
}

fn limit_message(text: &str, max_len: usize) -> Vec<u8> {
    let mut cells = to_cells(text);
    if cells.len() > max_len {
        warn!("Truncating message to {} characters", max_len);
        cells.truncate(max_len);
    }
    cells
}

/// `width` blanks, the message, `width` blanks.
fn padded_line(message: &[u8], width: usize) -> Vec<u8> {
    let mut line = vec![b' '; message.len() + 2 * width];
    line[width..width + message.len()].copy_from_slice(message);
    line
}

/// Slides a row-sized window over the padded line, one character per step,
/// from all blanks to all blanks.
fn scroll<E: Endpoint>(
    display: &mut Display<E>,
    message: &[u8],
    step: Duration,
    cancel: &CancellationToken,
) -> RenderOutcome {
    let width = display.width();
    let line = padded_line(message, width);
    let _ = display.clear(ClearMode::ResetCursor);
    for offset in 0..=message.len() + width {
        if cancel.is_cancelled() {
            return RenderOutcome::Cancelled;
        }
        let _ = display.write_row(&line[offset..offset + width]);
        if !cancel.sleep(step) {
            return RenderOutcome::Cancelled;
        }
    }
    RenderOutcome::Completed
}

/// Shows the message one full row at a time.
fn paginate<E: Endpoint>(
    display: &mut Display<E>,
    message: &[u8],
    step: Duration,
    cancel: &CancellationToken,
) -> RenderOutcome {
    let width = display.width();
    let line = padded_line(message, width);
    let pages = message.len().div_ceil(width).max(1);
    let _ = display.clear(ClearMode::ResetCursor);
    for page in 1..=pages {
        if cancel.is_cancelled() {
            return RenderOutcome::Cancelled;
        }
        let start = page * width;
        let _ = display.write_row(&line[start..start + width]);
        if !cancel.sleep(step) {
            return RenderOutcome::Cancelled;
        }
    }
    RenderOutcome::Completed
}
