// src/main.rs

//! `vfdctl`: drives the single-line VFD on the Shuttle SG33G5M front panel.

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod icons;
pub mod orders;
pub mod os;
pub mod protocol;
pub mod scheduler;
pub mod transport;

use crate::{
    cli::{Cli, Request},
    config::Config,
    display::Display,
    error::VfdError,
    os::{signals, CancellationToken},
    protocol::ClearMode,
    scheduler::{Scheduler, SchedulerState},
    transport::{usb::UsbEndpoint, Endpoint, Transport},
};

use anyhow::Context;
use chrono::Local;
use clap::{CommandFactory, FromArgMatches};
use log::{error, info, warn};

const TEST_MESSAGE: &str = "### Hello  World ###";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    let requests = match cli::requests(&matches) {
        Ok(requests) => requests,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let code = match run(&cli, requests) {
        Ok(()) => 0,
        Err(e) => {
            error!("{:#}", e);
            e.downcast_ref::<VfdError>().map_or(1, VfdError::exit_code)
        }
    };
    std::process::exit(code);
}

fn run(cli: &Cli, requests: Vec<Request>) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let device = &config.device;

    let endpoint = UsbEndpoint::open(device.vendor_id, device.product_id, device.interface)?;
    info!(
        "Opened VFD {:04x}:{:04x} on interface {}",
        device.vendor_id, device.product_id, device.interface
    );
    let mut display = Display::new(Transport::new(endpoint, &config.timing), device.width);
    let mut scheduler = Scheduler::new(&config);

    for request in requests {
        execute(&mut display, &mut scheduler, request);
    }

    if scheduler.state() == SchedulerState::Running {
        let cancel = CancellationToken::new();
        if let Err(e) = signals::install(&cancel) {
            warn!("{:#}; quit signals will end the process abruptly", e);
        }
        scheduler.run(&mut display, &cancel);
    }

    // Release failures are logged by close and do not change the exit status.
    let _ = display.into_transport().into_endpoint().close();
    Ok(())
}

/// Performs a one-shot request or registers a blocking order. Failures are
/// logged and the remaining requests still run.
fn execute<E: Endpoint>(display: &mut Display<E>, scheduler: &mut Scheduler, request: Request) {
    let result = match &request {
        Request::Clean => display.clear(ClearMode::Full),
        Request::Message(text) => display.show_text(text),
        Request::Icons(None) => display.show_icons(0),
        Request::Icons(Some(list)) => display.show_icons(icons::parse_list(list)),
        Request::VolumePercent(percent) => display.show_icons(icons::volume_from_percent(*percent)),
        Request::BuiltinClock => display.show_builtin_clock(&Local::now()),
        Request::Test => display
            .show_text(TEST_MESSAGE)
            .and(display.show_icons(icons::ALL_ICONS)),
        Request::Register(order) => scheduler.register(order.clone()),
    };
    if let Err(e) = result {
        warn!("{:?} failed: {}", request, e);
    }
}
