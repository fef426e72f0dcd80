// src/protocol/mod.rs

//! Wire format of the VFD controller.
//!
//! Every message is exactly [`PACKET_SIZE`] bytes. The high nibble of byte 0
//! carries the [`Command`], the low nibble the payload length (0-7); bytes
//! 1..=len carry the payload and the rest is zero.
//!
//! Everything here is pure: frames are built and handed to the transport,
//! nothing in this module touches the device.

use chrono::{Datelike, Timelike};
use log::{trace, warn};
use thiserror::Error;

pub const PACKET_SIZE: usize = 8;
/// Payload bytes available after the header byte.
pub const PAYLOAD_SIZE: usize = PACKET_SIZE - 1;

/// Highest value the icon frame can carry: four 5-bit groups.
pub const ICON_MASK_LIMIT: u32 = (1 << 20) - 1;
const ICON_GROUP_BITS: u32 = 5;
const ICON_GROUP_MASK: u32 = 0x1F;

/// Payload of the builtin clock trigger frame.
const BUILTIN_CLOCK_MODE: u8 = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("icon mask {0:#x} does not fit in 20 bits")]
    IconMaskOutOfRange(u32),
}

/// Command nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    Clear = 0x1,
    BuiltinClock = 0x3,
    Icons = 0x7,
    Text = 0x9,
    ClockData = 0xD,
}

impl Command {
    fn from_nibble(nibble: u8) -> Option<Self> {
        match nibble {
            0x1 => Some(Command::Clear),
            0x3 => Some(Command::BuiltinClock),
            0x7 => Some(Command::Icons),
            0x9 => Some(Command::Text),
            0xD => Some(Command::ClockData),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Packet([u8; PACKET_SIZE]);

impl Packet {
    fn new(command: Command, payload: &[u8]) -> Self {
        debug_assert!(payload.len() <= PAYLOAD_SIZE);
        let len = payload.len().min(PAYLOAD_SIZE);
        let mut bytes = [0u8; PACKET_SIZE];
        bytes[0] = ((command as u8) << 4) | len as u8;
        bytes[1..=len].copy_from_slice(&payload[..len]);
        Packet(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PACKET_SIZE] {
        &self.0
    }

    pub fn header(&self) -> u8 {
        self.0[0]
    }

    pub fn command(&self) -> Option<Command> {
        Command::from_nibble(self.0[0] >> 4)
    }

    pub fn payload_len(&self) -> usize {
        (self.0[0] & 0x0F) as usize
    }

    pub fn payload(&self) -> &[u8] {
        &self.0[1..=self.payload_len().min(PAYLOAD_SIZE)]
    }
}

impl std::fmt::Debug for Packet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Packet(")?;
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        write!(f, ")")
    }
}

/// What a clear frame wipes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ClearMode {
    /// Text and icons.
    Full = 1,
    /// Only moves the text cursor home; icons stay lit.
    ResetCursor = 2,
}

pub fn clear(mode: ClearMode) -> Packet {
    Packet::new(Command::Clear, &[mode as u8])
}

/// Broken-down local time as the controller wants it.
///
/// `weekday` counts from Sunday = 0, `month` is 1-12 and `year` is the full
/// year; it is sent as an offset from 2000.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockData {
    pub second: u8,
    pub minute: u8,
    pub hour: u8,
    pub weekday: u8,
    pub day: u8,
    pub month: u8,
    pub year: i32,
}

impl ClockData {
    pub fn from_datetime<T: Datelike + Timelike>(now: &T) -> Self {
        ClockData {
            // Leap seconds show up as 60.
            second: now.second().min(59) as u8,
            minute: now.minute() as u8,
            hour: now.hour() as u8,
            weekday: now.weekday().num_days_from_sunday() as u8,
            day: now.day() as u8,
            month: now.month() as u8,
            year: now.year(),
        }
    }
}

/// Packs a two-digit decimal value so that it reads as decimal in hex
/// (14 -> 0x14). The controller expects this, it is not BCD arithmetic.
fn dec_as_hex(value: u8) -> u8 {
    let value = value.min(99);
    ((value / 10) << 4) | (value % 10)
}

pub fn clock_data(data: &ClockData) -> Packet {
    let year_offset = (data.year - 2000).clamp(0, 99) as u8;
    Packet::new(
        Command::ClockData,
        &[
            dec_as_hex(data.second),
            dec_as_hex(data.minute),
            dec_as_hex(data.hour),
            data.weekday,
            dec_as_hex(data.day),
            dec_as_hex(data.month),
            dec_as_hex(year_offset),
        ],
    )
}

/// Asks the firmware to render its own clock from the last clock data.
pub fn trigger_builtin_clock() -> Packet {
    Packet::new(Command::BuiltinClock, &[BUILTIN_CLOCK_MODE])
}

/// Clock data for `now` followed by the trigger.
pub fn builtin_clock<T: Datelike + Timelike>(now: &T) -> [Packet; 2] {
    [
        clock_data(&ClockData::from_datetime(now)),
        trigger_builtin_clock(),
    ]
}

/// Splits raw display cells into text frames of at most [`PAYLOAD_SIZE`]
/// bytes. An empty slice yields no frames.
pub fn text(cells: &[u8]) -> Vec<Packet> {
    let frames: Vec<Packet> = cells
        .chunks(PAYLOAD_SIZE)
        .map(|chunk| Packet::new(Command::Text, chunk))
        .collect();
    trace!("{} cell(s) encoded into {} text frame(s)", cells.len(), frames.len());
    frames
}

/// Like [`text`], but never writes past `width` cells.
pub fn encode_text(cells: &[u8], width: usize) -> Vec<Packet> {
    if cells.len() > width {
        warn!(
            "Truncating text of {} cells to display width {}",
            cells.len(),
            width
        );
        return text(&cells[..width]);
    }
    text(cells)
}

/// Icon frame: the 20-bit mask split into four 5-bit groups, most
/// significant group first.
pub fn icons(mask: u32) -> Result<Packet, ProtocolError> {
    if mask > ICON_MASK_LIMIT {
        return Err(ProtocolError::IconMaskOutOfRange(mask));
    }
    let group = |n: u32| ((mask >> (ICON_GROUP_BITS * n)) & ICON_GROUP_MASK) as u8;
    Ok(Packet::new(
        Command::Icons,
        &[group(3), group(2), group(1), group(0)],
    ))
}

#[cfg(test)]
mod tests;
