//! Token bucket guarding the mutating RPC methods.
//!
//! Bucket state lives in one `AtomicU64` so concurrent handlers never block
//! on each other: the upper half holds milli-tokens, the lower half the
//! milliseconds since the limiter was created at the last refill.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

const MILLI: u64 = 1000;

pub struct RateLimiter {
    packed: AtomicU64,
    started: Instant,
    burst: u32,
    per_second: u32,
}

fn pack(milli_tokens: u64, at_ms: u32) -> u64 {
    (milli_tokens << 32) | at_ms as u64
}

fn unpack(packed: u64) -> (u64, u32) {
    (packed >> 32, (packed & 0xFFFF_FFFF) as u32)
}

impl RateLimiter {
    /// `burst` requests at once, refilled at `per_second`
    pub fn new(burst: u32, per_second: u32) -> Self {
        let burst = burst.clamp(1, 1_000_000);
        Self {
            packed: AtomicU64::new(pack(burst as u64 * MILLI, 0)),
            started: Instant::now(),
            burst,
            per_second,
        }
    }

    /// Take one token; false when the bucket is empty
    pub fn try_acquire(&self) -> bool {
        let now_ms = self.started.elapsed().as_millis().min(u32::MAX as u128) as u32;
        let cap = self.burst as u64 * MILLI;

        let mut current = self.packed.load(Ordering::Acquire);
        loop {
            let (milli_tokens, last_ms) = unpack(current);
            // Elapsed ms times tokens/s is exactly the milli-tokens earned
            let earned = now_ms.saturating_sub(last_ms) as u64 * self.per_second as u64;
            let available = (milli_tokens + earned).min(cap);

            let (next, allowed) = if available >= MILLI {
                (pack(available - MILLI, now_ms), true)
            } else {
                (pack(available, now_ms), false)
            };

            match self.packed.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return allowed,
                Err(actual) => current = actual,
            }
        }
    }

    /// Whole tokens left
    pub fn remaining(&self) -> u32 {
        (unpack(self.packed.load(Ordering::Acquire)).0 / MILLI) as u32
    }
}
