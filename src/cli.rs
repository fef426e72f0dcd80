// src/cli.rs

//! Command line surface.
//!
//! Options are split into one-shot requests, executed immediately, and
//! blocking orders, registered with the scheduler. Both run in the order
//! they appear on the command line, so `-c -m hi` and `-m hi -c` differ.

use clap::{ArgAction, ArgMatches, Parser};
use std::path::PathBuf;

use crate::orders::{MessageStyle, Order, OrderError};

#[derive(Parser, Debug)]
#[command(
    name = "vfdctl",
    version,
    about = "Shuttle SG33G5M VFD manager",
    after_help = "Icons: all, clk, rad, mus, cd, tv, cam, rew, rec, pl, pa, st, ff, rev, rep, mute.\n\
                  Volume: vol0 (mute), vol1 ... vol12."
)]
pub struct Cli {
    /// Configuration file (default: $XDG_CONFIG_HOME/vfdctl/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Clear text and icons
    #[arg(
        short = 'c',
        long,
        num_args = 0,
        default_missing_value = "true",
        action = ArgAction::Append,
        help_heading = "One-shot requests"
    )]
    pub clean: Vec<bool>,

    /// Display a message (truncated to the display width)
    #[arg(short = 'm', long, value_name = "TEXT", help_heading = "One-shot requests")]
    pub message: Vec<String>,

    /// Display icons from a comma separated list; without a list, clear icons
    #[arg(
        short = 'i',
        long,
        value_name = "LIST",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "",
        help_heading = "One-shot requests"
    )]
    pub icons: Vec<String>,

    /// Set the volume bar from a percentage (0 lights mute)
    #[arg(
        long = "vol",
        value_name = "PERCENT",
        value_parser = parse_number,
        help_heading = "One-shot requests"
    )]
    pub volume: Vec<u32>,

    /// Let the controller draw its builtin clock
    #[arg(
        long,
        num_args = 0,
        default_missing_value = "true",
        action = ArgAction::Append,
        help_heading = "One-shot requests"
    )]
    pub clock: Vec<bool>,

    /// Light every icon and fill the row with a test string
    #[arg(
        long,
        num_args = 0,
        default_missing_value = "true",
        action = ArgAction::Append,
        help_heading = "One-shot requests"
    )]
    pub test: Vec<bool>,

    /// Display date and time, optionally with a strftime FORMAT
    #[arg(
        short = 't',
        long = "time",
        value_name = "FORMAT",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "",
        help_heading = "Blocking orders"
    )]
    pub time: Vec<String>,

    /// Display a message, scrolling
    #[arg(long = "msg", value_name = "TEXT", help_heading = "Blocking orders")]
    pub scroll: Vec<String>,

    /// Display a message, one page at a time
    #[arg(long = "msg2", value_name = "TEXT", help_heading = "Blocking orders")]
    pub paginate: Vec<String>,

    /// Display system uptime, scrolling
    #[arg(
        long = "msg-uptime",
        alias = "msg_uptime",
        num_args = 0,
        default_missing_value = "true",
        action = ArgAction::Append,
        help_heading = "Blocking orders"
    )]
    pub uptime: Vec<bool>,
}

/// One command line request, in the order it was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Clean,
    Message(String),
    /// `None` clears the icons.
    Icons(Option<String>),
    VolumePercent(u32),
    BuiltinClock,
    Test,
    Register(Order),
}

/// Decimal, or hexadecimal with a `0x` prefix.
pub fn parse_number(text: &str) -> Result<u32, String> {
    let parsed = match text.strip_prefix("0x") {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|e| format!("'{}' is not a number: {}", text, e))
}

fn valued(matches: &ArgMatches, id: &str) -> Vec<(usize, String)> {
    match (matches.indices_of(id), matches.get_many::<String>(id)) {
        (Some(indices), Some(values)) => indices.zip(values.cloned()).collect(),
        _ => Vec::new(),
    }
}

/// Positions of a repeatable switch, one per occurrence.
fn flagged(matches: &ArgMatches, id: &str) -> Vec<usize> {
    match (matches.indices_of(id), matches.get_many::<bool>(id)) {
        (Some(indices), Some(values)) => indices
            .zip(values)
            .filter(|(_, on)| **on)
            .map(|(index, _)| index)
            .collect(),
        _ => Vec::new(),
    }
}

/// Flattens the parsed options into requests sorted by position.
pub fn requests(matches: &ArgMatches) -> Result<Vec<Request>, OrderError> {
    let mut requests: Vec<(usize, Request)> = Vec::new();

    requests.extend(
        flagged(matches, "clean")
            .into_iter()
            .map(|i| (i, Request::Clean)),
    );
    requests.extend(
        valued(matches, "message")
            .into_iter()
            .map(|(i, text)| (i, Request::Message(text))),
    );
    requests.extend(valued(matches, "icons").into_iter().map(|(i, list)| {
        let list = (!list.is_empty()).then_some(list);
        (i, Request::Icons(list))
    }));
    if let (Some(indices), Some(values)) = (
        matches.indices_of("volume"),
        matches.get_many::<u32>("volume"),
    ) {
        requests.extend(indices.zip(values.map(|p| Request::VolumePercent(*p))));
    }
    requests.extend(
        flagged(matches, "clock")
            .into_iter()
            .map(|i| (i, Request::BuiltinClock)),
    );
    requests.extend(
        flagged(matches, "test")
            .into_iter()
            .map(|i| (i, Request::Test)),
    );

    for (i, format) in valued(matches, "time") {
        let format = (!format.is_empty()).then_some(format);
        requests.push((i, Request::Register(Order::clock(format)?)));
    }
    requests.extend(valued(matches, "scroll").into_iter().map(|(i, text)| {
        let order = Order::Message {
            text,
            style: MessageStyle::Scroll,
        };
        (i, Request::Register(order))
    }));
    requests.extend(valued(matches, "paginate").into_iter().map(|(i, text)| {
        let order = Order::Message {
            text,
            style: MessageStyle::Paginate,
        };
        (i, Request::Register(order))
    }));
    requests.extend(
        flagged(matches, "uptime")
            .into_iter()
            .map(|i| (i, Request::Register(Order::Uptime))),
    );

    requests.sort_by_key(|(index, _)| *index);
    Ok(requests.into_iter().map(|(_, request)| request).collect())
}
