// src/config.rs

//! Configuration for `vfdctl`.
//!
//! The file is optional TOML. Every section and every field falls back to
//! the defaults below, which match the Shuttle SG33G5M panel: a 20x1 VFD
//! behind a Cypress USB controller.
//!
//! ```toml
//! [device]
//! vendor_id = 0x051C
//! product_id = 0x0005
//!
//! [timing]
//! scroll_step_ms = 300
//! ```

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_DIR_NAME: &str = "vfdctl";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub device: DeviceConfig,
    pub timing: TimingConfig,
    pub clock: ClockConfig,
    pub message: MessageConfig,
}

// --- Device ---

/// Identity and geometry of the panel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeviceConfig {
    pub vendor_id: u16,
    /// 0x0005 is the variant with the IR receiver.
    pub product_id: u16,
    pub interface: u8,
    /// Character cells on the single row.
    pub width: usize,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        DeviceConfig {
            vendor_id: 0x051C,
            product_id: 0x0005,
            interface: 1,
            width: 20,
        }
    }
}

// --- Timing ---

/// Delays required by the controller plus the pacing of blocking orders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    pub write_attempts: u32,
    /// Pause after a frame was accepted, before the next one may be sent.
    pub settle_delay_us: u64,
    pub retry_delay_us: u64,
    pub transfer_timeout_ms: u64,
    /// One character shift of a scrolling message.
    pub scroll_step_ms: u64,
    /// One page of a paginated message.
    pub page_step_ms: u64,
    /// Pause between two passes over the order queue.
    pub cycle_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            write_attempts: 2,
            settle_delay_us: 25_600,
            retry_delay_us: 25_600,
            transfer_timeout_ms: 100,
            scroll_step_ms: 400,
            page_step_ms: 2_000,
            cycle_delay_ms: 400,
        }
    }
}

impl TimingConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_micros(self.settle_delay_us)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_micros(self.retry_delay_us)
    }

    pub fn transfer_timeout(&self) -> Duration {
        Duration::from_millis(self.transfer_timeout_ms)
    }

    pub fn scroll_step(&self) -> Duration {
        Duration::from_millis(self.scroll_step_ms)
    }

    pub fn page_step(&self) -> Duration {
        Duration::from_millis(self.page_step_ms)
    }

    pub fn cycle_delay(&self) -> Duration {
        Duration::from_millis(self.cycle_delay_ms)
    }
}

// --- Clock ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClockConfig {
    /// strftime format used by clock orders registered without one.
    pub default_format: String,
}

impl Default for ClockConfig {
    fn default() -> Self {
        ClockConfig {
            default_format: "%X (%a %d)".to_string(),
        }
    }
}

// --- Messages ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MessageConfig {
    /// Longest message a blocking order will scroll; longer ones are cut.
    pub max_len: usize,
}

impl Default for MessageConfig {
    fn default() -> Self {
        MessageConfig { max_len: 60 }
    }
}

impl Config {
    /// Loads `path` if given, otherwise the per-user file if it exists,
    /// otherwise the defaults. An explicit path that does not exist is an
    /// error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path),
                None => {
                    debug!("No configuration file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = Self::from_toml(&text)
            .with_context(|| format!("invalid configuration in {}", path.display()))?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.device.width > 0, "device.width must be at least 1");
        anyhow::ensure!(
            self.timing.write_attempts > 0,
            "timing.write_attempts must be at least 1"
        );
        Ok(())
    }
}

/// `$XDG_CONFIG_HOME/vfdctl/config.toml`, falling back to `~/.config`.
fn default_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}
