//! Auto-generated project names
//!
//! - Adopted work: `"<adopted prefix><local timestamp>"`, e.g. `Design from 3:04:05 PM`
//! - Fresh project: `"<bootstrap prefix><n>"`, e.g. `New Design #1739999999123`
//!
//! `<n>` is wall-clock milliseconds, bumped so it strictly increases within a
//! process. Nothing is coordinated across clients.

use crate::config::{is_valid_timestamp_format, SessionConfig, DEFAULT_TIMESTAMP_FORMAT};
use chrono::{DateTime, Local, Utc};
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Source of the current time
pub trait Clock: Send + Sync + Debug {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Generates project names per the session config
#[derive(Debug)]
pub struct ProjectNamer {
    adopted_prefix: String,
    bootstrap_prefix: String,
    timestamp_format: String,
    clock: Arc<dyn Clock>,
    last_suffix: AtomicU64,
}

impl ProjectNamer {
    /// Create namer on the system clock
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create namer on an explicit clock
    ///
    /// A timestamp format chrono cannot render is replaced by
    /// [`DEFAULT_TIMESTAMP_FORMAT`].
    #[must_use]
    pub fn with_clock(config: &SessionConfig, clock: Arc<dyn Clock>) -> Self {
        let timestamp_format = if is_valid_timestamp_format(&config.timestamp_format) {
            config.timestamp_format.clone()
        } else {
            tracing::warn!(
                format = %config.timestamp_format,
                "invalid timestamp format, using default"
            );
            DEFAULT_TIMESTAMP_FORMAT.to_string()
        };
        Self {
            adopted_prefix: config.adopted_name_prefix.clone(),
            bootstrap_prefix: config.bootstrap_name_prefix.clone(),
            timestamp_format,
            clock,
            last_suffix: AtomicU64::new(0),
        }
    }

    /// The clock this namer reads
    #[inline]
    #[must_use]
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// Name for a project adopted from anonymous work
    #[must_use]
    pub fn adopted_name(&self) -> String {
        let local = self.clock.now().with_timezone(&Local);
        format!("{}{}", self.adopted_prefix, local.format(&self.timestamp_format))
    }

    /// Name for a fresh project
    #[must_use]
    pub fn bootstrap_name(&self) -> String {
        format!("{}{}", self.bootstrap_prefix, self.next_suffix())
    }

    /// Time-derived suffix, strictly greater than any previously issued one
    fn next_suffix(&self) -> u64 {
        let now = u64::try_from(self.clock.now().timestamp_millis()).unwrap_or(0);
        let mut prev = self.last_suffix.load(Ordering::Relaxed);
        loop {
            let next = now.max(prev + 1);
            match self.last_suffix.compare_exchange_weak(
                prev,
                next,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return next,
                Err(actual) => prev = actual,
            }
        }
    }
}
