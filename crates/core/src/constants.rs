//! Shared constants for the application

use std::time::Duration;

/// Time messages are received between two screen refreshes
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Shown instead of an address when the host has no route
pub const NO_NETWORK: &str = "No network";
