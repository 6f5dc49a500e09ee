//! Two clock sources: a monotonic one for TTL deadlines and heartbeat
//! bookkeeping, and a wall-clock one for timestamps that leave the
//! process (`time`/`ctime` on published alerts). `monotonic_seconds` is
//! relative to process start rather than system boot, which is fine:
//! every consumer (TTL deadlines, `last_sent`) only ever compares two
//! readings taken within the same process lifetime.

use std::sync::OnceLock;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

static START: OnceLock<Instant> = OnceLock::new();

pub fn monotonic_seconds() -> u64 {
    START.get_or_init(Instant::now).elapsed().as_secs()
}

pub fn wall_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
