// src/os/mod.rs

//! Thin wrappers over the OS facilities the scheduler needs.

pub mod signals;
pub mod uptime;

pub use signals::CancellationToken;
