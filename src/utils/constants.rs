//! Shared constants and invariants

pub const DEFAULT_CHECK_INTERVAL_MINUTES: u64 = 10;
pub const DEFAULT_CONFIG_PATH: &str = "/app/config/token-machine.yaml";

pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 1982;
pub const DEFAULT_METRICS_PATH: &str = "/metrics";

/// Capacity of the token store mailbox.
pub const STORE_MAILBOX_SIZE: usize = 64;
