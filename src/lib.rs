// src/lib.rs
pub mod check;
pub mod config;
pub mod metrics;
pub mod monitor;
pub mod notification;
pub mod probe;
pub mod scheduler;
pub mod version;

pub use monitor::{Monitor, MonitorError, RunningMonitor};
