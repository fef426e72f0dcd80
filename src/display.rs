// src/display.rs

//! Row-level operations on the panel.
//!
//! The panel has one row of `width` character cells and no addressable
//! cursor: every text write starts at the home position, so a row is always
//! written whole after a cursor reset.

use chrono::{Datelike, Timelike};
use log::{debug, warn};

use crate::error::VfdError;
use crate::protocol::{self, ClearMode, Packet};
use crate::transport::{Endpoint, Transport};

const BLANK: u8 = b' ';

/// One byte per character. Latin-1 code points map to themselves, anything
/// the controller cannot show becomes `?`.
pub fn to_cells(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

pub struct Display<E: Endpoint> {
    transport: Transport<E>,
    width: usize,
}

impl<E: Endpoint> Display<E> {
    pub fn new(transport: Transport<E>, width: usize) -> Self {
        Display { transport, width }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn transport(&self) -> &Transport<E> {
        &self.transport
    }

    pub fn into_transport(self) -> Transport<E> {
        self.transport
    }

    pub fn clear(&mut self, mode: ClearMode) -> Result<(), VfdError> {
        debug!("Clearing display ({:?})", mode);
        self.transport.send(&protocol::clear(mode))
    }

    /// Writes `cells` from the home position. Anything past the display
    /// width is dropped with a warning.
    pub fn write_row(&mut self, cells: &[u8]) -> Result<(), VfdError> {
        let frames = protocol::encode_text(cells, self.width);
        self.transport.send_all(&frames)
    }

    /// Left-aligned text, blank padded to the full width.
    pub fn show_text(&mut self, text: &str) -> Result<(), VfdError> {
        let cells = self.fit(text);
        let mut row = vec![BLANK; self.width];
        row[..cells.len()].copy_from_slice(&cells);
        self.rewrite_row(&row)
    }

    /// Text centered in the row, blank padded on both sides.
    pub fn show_centered(&mut self, text: &str) -> Result<(), VfdError> {
        let cells = self.fit(text);
        let offset = (self.width - cells.len()) / 2;
        let mut row = vec![BLANK; self.width];
        row[offset..offset + cells.len()].copy_from_slice(&cells);
        self.rewrite_row(&row)
    }

    pub fn show_icons(&mut self, mask: u32) -> Result<(), VfdError> {
        debug!("Showing icon mask {:#07x}", mask);
        let frame = protocol::icons(mask)?;
        self.transport.send(&frame)
    }

    /// Hands `now` to the controller and lets its firmware draw the clock.
    pub fn show_builtin_clock<T: Datelike + Timelike>(&mut self, now: &T) -> Result<(), VfdError> {
        self.transport.send_all(&protocol::builtin_clock(now))
    }

    /// Cursor reset followed by the row, sent as one batch.
    fn rewrite_row(&mut self, row: &[u8]) -> Result<(), VfdError> {
        let mut frames: Vec<Packet> = vec![protocol::clear(ClearMode::ResetCursor)];
        frames.extend(protocol::encode_text(row, self.width));
        self.transport.send_all(&frames)
    }

    fn fit(&self, text: &str) -> Vec<u8> {
        let mut cells = to_cells(text);
        if cells.len() > self.width {
            warn!("Truncating text '{}' to {} characters", text, self.width);
            cells.truncate(self.width);
        }
        cells
    }
}
