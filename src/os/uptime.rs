// src/os/uptime.rs

use anyhow::{Context, Result};
use std::io;
use std::time::Duration;

/// Time since boot, from `sysinfo(2)`.
pub fn uptime() -> Result<Duration> {
    let mut info: libc::sysinfo = unsafe { std::mem::zeroed() };
    if unsafe { libc::sysinfo(&mut info) } == -1 {
        return Err(io::Error::last_os_error()).context("sysinfo failed");
    }
    Ok(Duration::from_secs(info.uptime.max(0) as u64))
}
