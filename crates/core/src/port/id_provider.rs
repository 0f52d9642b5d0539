// ID Provider Port (for deterministic testing)

use crate::port::TimeProvider;
use rand::distributions::Uniform;
use rand::Rng;
use std::sync::Arc;

const SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// ID provider interface (allows deterministic IDs in tests)
pub trait IdProvider: Send + Sync {
    /// Generate a new unique ID of the form `<prefix>_<millis>_<suffix>`
    fn generate_id(&self, prefix: &str) -> String;
}

/// Timestamp + random base36 suffix (production)
pub struct PrefixedIdProvider {
    time_provider: Arc<dyn TimeProvider>,
}

impl PrefixedIdProvider {
    pub fn new(time_provider: Arc<dyn TimeProvider>) -> Self {
        Self { time_provider }
    }
}

impl IdProvider for PrefixedIdProvider {
    fn generate_id(&self, prefix: &str) -> String {
        let range = Uniform::from(0..BASE36.len());
        let suffix: String = rand::thread_rng()
            .sample_iter(range)
            .take(SUFFIX_LEN)
            .map(|i| BASE36[i] as char)
            .collect();

        format!("{}_{}_{}", prefix, self.time_provider.now_millis(), suffix)
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Deterministic IDs: `<prefix>_1`, `<prefix>_2`, ...
    #[derive(Default)]
    pub struct SequentialIdProvider {
        counter: AtomicU64,
    }

    impl SequentialIdProvider {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl IdProvider for SequentialIdProvider {
        fn generate_id(&self, prefix: &str) -> String {
            let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
            format!("{}_{}", prefix, n)
        }
    }
}
