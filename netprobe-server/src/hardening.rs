use std::time::Duration;

/// Maximum length of a single client line, terminator included
pub const MAX_LINE_BYTES: usize = 1024;
/// Pause after a failed accept before trying again
pub const ACCEPT_BACKOFF: Duration = Duration::from_millis(200);
/// Upper bound on simultaneous connection attempts during a port scan
pub const MAX_SCAN_CONCURRENCY: usize = 64;
/// Upper bound on the per-command request count a client may ask for
pub const MAX_NUM_REQUESTS: u32 = 100;
