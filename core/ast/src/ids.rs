//! Node identity generation.
//!
//! IDs are stamped on nodes when they are allocated and survive cloning, so
//! a node and its clones share one logical identity across tree versions.
//! The generator is an explicit object rather than a process global: every
//! [`crate::arena::Arena`] holds an `Arc<IdGenerator>`, arenas produced by
//! cloning share their source's generator, and tests can create isolated
//! generators with a tiny range to exercise the wraparound.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::warn;

use crate::config::IdPolicy;

#[derive(Debug)]
pub struct IdGenerator {
    policy: IdPolicy,
    // Wider than the ID so that `max + 1` is representable as "exhausted".
    next: AtomicU64,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(IdPolicy::default())
    }
}

impl IdGenerator {
    /// Creates a generator for `policy`. A policy with `max < start` is
    /// treated as the single-value range `start..=start`.
    #[must_use]
    pub fn new(policy: IdPolicy) -> Self {
        let policy = IdPolicy {
            start: policy.start,
            max: policy.max.max(policy.start),
        };
        Self {
            policy,
            next: AtomicU64::new(u64::from(policy.start)),
        }
    }

    #[must_use]
    pub fn policy(&self) -> IdPolicy {
        self.policy
    }

    /// Returns the next ID. Increment and read happen in one atomic step,
    /// so concurrent callers never observe the same value within a pass.
    pub fn next_id(&self) -> u32 {
        let start = u64::from(self.policy.start);
        let max = u64::from(self.policy.max);
        let previous = self
            .next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                Some(if current > max { start + 1 } else { current + 1 })
            })
            .unwrap_or(start);
        if previous > max {
            warn!(start, max, "node id range exhausted, restarting");
            return self.policy.start;
        }
        // `previous <= max <= u32::MAX` here.
        u32::try_from(previous).unwrap_or(self.policy.start)
    }

    /// Peeks at the value the next call to [`IdGenerator::next_id`] would
    /// return, without consuming it.
    #[must_use]
    pub fn peek(&self) -> u32 {
        let current = self.next.load(Ordering::Relaxed);
        if current > u64::from(self.policy.max) {
            self.policy.start
        } else {
            u32::try_from(current).unwrap_or(self.policy.start)
        }
    }
}
