// src/icons.rs

//! Icon names and the 20-bit mask they light.
//!
//! Bits 0-14 are individual icons. Bits 15-19 hold the volume bar as a step
//! count from 1 to 12.

use bitflags::bitflags;
use log::warn;

use crate::error::VfdError;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Icons: u32 {
        const TELEVISION  = 1 << 0;
        const CD_DVD      = 1 << 1;
        const MUSIC       = 1 << 2;
        const RADIO       = 1 << 3;
        const CLOCK       = 1 << 4;
        const PAUSE       = 1 << 5;
        const PLAY        = 1 << 6;
        const RECORD      = 1 << 7;
        const REWIND      = 1 << 8;
        const CAMERA      = 1 << 9;
        const MUTE        = 1 << 10;
        const REPEAT      = 1 << 11;
        const REVERSE     = 1 << 12;
        const FASTFORWARD = 1 << 13;
        const STOP        = 1 << 14;
        const VOLUME      = 0x1F << VOLUME_SHIFT;
    }
}

pub const VOLUME_SHIFT: u32 = 15;
pub const VOLUME_STEPS: u32 = 12;

/// Every icon plus a full volume bar.
pub const ALL_ICONS: u32 = 0x7FFF | (VOLUME_STEPS << VOLUME_SHIFT);

/// `(name, alternate name, mask)`.
const ICON_TABLE: &[(&str, Option<&str>, u32)] = &[
    ("clk", Some("clock"), Icons::CLOCK.bits()),
    ("rad", Some("radio"), Icons::RADIO.bits()),
    ("mus", Some("music"), Icons::MUSIC.bits()),
    ("cd", Some("dvd"), Icons::CD_DVD.bits()),
    ("tv", Some("tele"), Icons::TELEVISION.bits()),
    ("cam", Some("camera"), Icons::CAMERA.bits()),
    ("rew", Some("rewind"), Icons::REWIND.bits()),
    ("rec", Some("record"), Icons::RECORD.bits()),
    ("pl", Some("play"), Icons::PLAY.bits()),
    ("pa", Some("pause"), Icons::PAUSE.bits()),
    ("st", Some("stop"), Icons::STOP.bits()),
    ("ff", None, Icons::FASTFORWARD.bits()),
    ("rev", Some("reverse"), Icons::REVERSE.bits()),
    ("rep", Some("repeat"), Icons::REPEAT.bits()),
    ("mute", Some("vol0"), Icons::MUTE.bits()),
    ("all", Some("world"), ALL_ICONS),
];

/// Volume bar lit up to `step` (clamped to 12).
pub fn volume(step: u32) -> u32 {
    step.min(VOLUME_STEPS) << VOLUME_SHIFT
}

/// `volN` for N in 1..=12.
fn volume_step(name: &str) -> Option<u32> {
    let digits = name.strip_prefix("vol")?;
    if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let step: u32 = digits.parse().ok()?;
    (1..=VOLUME_STEPS)
        .contains(&step)
        .then_some(step)
        .filter(|_| !digits.starts_with('0'))
}

/// Resolves one icon name.
///
/// A zero mask never comes back as `Ok`: zero is what the device shows for
/// "nothing lit", so it is treated as a lookup failure.
pub fn lookup(name: &str) -> Result<u32, VfdError> {
    let mask = ICON_TABLE
        .iter()
        .find(|(short, long, _)| *short == name || *long == Some(name))
        .map(|(_, _, mask)| *mask)
        .or_else(|| volume_step(name).map(volume))
        .unwrap_or(0);

    if mask == 0 {
        return Err(VfdError::IconNameUnrecognized(name.to_string()));
    }
    Ok(mask)
}

/// ORs together a comma separated list of icon names. Unknown names are
/// logged and skipped.
pub fn parse_list(list: &str) -> u32 {
    list.split(',')
        .filter(|name| !name.is_empty())
        .fold(0, |acc, name| match lookup(name) {
            Ok(mask) => acc | mask,
            Err(e) => {
                warn!("{}, ignoring", e);
                acc
            }
        })
}

/// Maps a 0-100 percentage onto the volume bar. Zero lights mute instead.
pub fn volume_from_percent(percent: u32) -> u32 {
    if percent == 0 {
        return Icons::MUTE.bits();
    }
    let percent = percent.min(100);
    volume(3 * percent / 25 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_and_volume_combine() {
        assert_eq!(parse_list("clk,vol5"), (1 << 4) | (5 << 15));
    }

    #[test]
    fn alternate_names_match_short_names() {
        assert_eq!(lookup("clock").unwrap(), lookup("clk").unwrap());
        assert_eq!(lookup("world").unwrap(), ALL_ICONS);
        assert_eq!(lookup("ff").unwrap(), Icons::FASTFORWARD.bits());
    }

    #[test_log::test]
    fn unknown_name_contributes_nothing() {
        assert_eq!(parse_list("xyz"), 0);
        assert!(matches!(
            lookup("xyz"),
            Err(VfdError::IconNameUnrecognized(name)) if name == "xyz"
        ));
        assert_eq!(parse_list("xyz,tv"), Icons::TELEVISION.bits());
    }

    #[test]
    fn volume_names_cover_one_to_twelve() {
        assert_eq!(lookup("vol1").unwrap(), 1 << 15);
        assert_eq!(lookup("vol9").unwrap(), 9 << 15);
        assert_eq!(lookup("vol12").unwrap(), 12 << 15);
        assert!(lookup("vol13").is_err());
        assert!(lookup("vol01").is_err());
        assert!(lookup("vol").is_err());
    }

    #[test]
    fn vol0_is_the_mute_icon() {
        assert_eq!(lookup("vol0").unwrap(), Icons::MUTE.bits());
    }

    #[test]
    fn all_icons_fit_the_wire_format() {
        assert!(ALL_ICONS <= crate::protocol::ICON_MASK_LIMIT);
        assert_eq!(ALL_ICONS & Icons::VOLUME.bits(), 12 << 15);
    }

    #[test]
    fn percentage_maps_onto_twelve_steps() {
        assert_eq!(volume_from_percent(0), Icons::MUTE.bits());
        assert_eq!(volume_from_percent(1), 1 << 15);
        assert_eq!(volume_from_percent(50), 7 << 15);
        assert_eq!(volume_from_percent(100), 12 << 15);
        assert_eq!(volume_from_percent(250), 12 << 15);
    }
}
