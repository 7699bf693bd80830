//! Incremental transformation pipeline
//!
//! Owns the run state of one document: the enabled flag, the live policy
//! snapshot, the rate limiter and the debounced pass scheduler. Every entry
//! point takes the current time in milliseconds so the state machine is
//! driven entirely by its caller.
//!
//! ```text
//!            enable (permitted)            mutations
//!  Disabled ───────────────────▶ Enabled ───────────▶ pass pending
//!     ▲                             │  ▲                   │ poll (due)
//!     └──── disable / policy ───────┘  └──── pass runs ────┘
//! ```

mod context;
mod scheduler;

pub use context::Stats;
pub use scheduler::Scheduler;

use crate::config::Config;
use crate::dom::Document;
use crate::error::{Error, Result};
use crate::messages::{Message, Response};
use crate::policy::{Permission, PolicySnapshot, StorageChange};
use crate::ratelimit::RateLimiter;
use crate::transform::{PassReport, Transformer};
use tracing::{debug, info, instrument, warn};

/// Run state and machinery for one document
#[derive(Debug)]
pub struct Pipeline {
    document: Document,
    hostname: String,
    policy: PolicySnapshot,
    limiter: RateLimiter,
    scheduler: Scheduler,
    transformer: Transformer,
    enabled: bool,
    enable_on_load: bool,
    stats: Stats,
}

impl Pipeline {
    /// Create a disabled pipeline for `document` served from `hostname`
    pub fn new(document: Document, hostname: &str, policy: PolicySnapshot, config: &Config) -> Self {
        Self {
            document,
            hostname: crate::policy::host::normalize_host(hostname),
            policy: policy.sanitized(),
            limiter: RateLimiter::new(config.pipeline.min_interval_ms),
            scheduler: Scheduler::new(config.pipeline.debounce_ms),
            transformer: Transformer::new(config.transform.clone()),
            enabled: false,
            enable_on_load: config.pipeline.enable_on_load,
            stats: Stats::default(),
        }
    }

    /// The document
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable access to the document, standing in for the host page
    ///
    /// Changes made here are seen through [`Pipeline::on_mutations`].
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Give the document back
    pub fn into_document(self) -> Document {
        self.document
    }

    /// Normalized hostname of the page
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Live policy snapshot
    pub fn policy(&self) -> &PolicySnapshot {
        &self.policy
    }

    /// Current permission of the page
    pub fn permission(&self) -> Permission {
        self.policy.evaluate(&self.hostname)
    }

    /// Whether the pipeline is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// When the pending pass is due, if one is pending
    pub fn next_deadline(&self) -> Option<u64> {
        self.scheduler.deadline()
    }

    /// Counters
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Page-load hook: enables the pipeline if configured to
    pub fn start(&mut self, now_ms: u64) -> bool {
        if self.enable_on_load {
            self.enable(now_ms)
        } else {
            false
        }
    }

    /// Enable the pipeline if the page is permitted
    ///
    /// Runs one pass immediately and starts observing the document.
    /// Returns whether the pipeline is enabled afterwards.
    #[instrument(skip(self), fields(host = %self.hostname))]
    pub fn enable(&mut self, now_ms: u64) -> bool {
        if self.enabled {
            return true;
        }
        let permission = self.permission();
        if !permission.is_allowed() {
            debug!(?permission, "Not enabling");
            return false;
        }

        self.enabled = true;
        self.run_pass(now_ms);
        self.document.observe();
        info!("Pipeline enabled");
        true
    }

    /// Disable the pipeline: cancel the pending pass, stop observing and
    /// turn every processed region back into text. Idempotent.
    #[instrument(skip(self), fields(host = %self.hostname))]
    pub fn disable(&mut self) {
        if self.scheduler.cancel() {
            debug!("Cancelled pending pass");
        }
        self.document.disconnect();

        match self.transformer.revert(&mut self.document) {
            Ok(reverted) => self.stats.regions_reverted += reverted as u64,
            Err(e) => self.absorb(e),
        }

        if self.enabled {
            self.enabled = false;
            info!("Pipeline disabled");
        }
    }

    /// Flip the enabled state; returns the new state
    pub fn toggle(&mut self, now_ms: u64) -> bool {
        if self.enabled {
            self.disable();
            false
        } else {
            self.enable(now_ms)
        }
    }

    /// Handle a runtime message
    pub fn handle_message(&mut self, message: Message, now_ms: u64) -> Response {
        let enabled = match message {
            Message::Toggle => self.toggle(now_ms),
            Message::State => self.enabled,
        };
        Response { enabled }
    }

    /// Drain pending mutation records and schedule a pass if warranted
    ///
    /// Returns whether a pass was scheduled.
    pub fn on_mutations(&mut self, now_ms: u64) -> bool {
        let records = self.document.take_records();
        if !self.enabled || records.is_empty() {
            return false;
        }
        self.stats.mutation_batches += 1;

        if self.scheduler.is_pending() {
            return false;
        }
        if !self.limiter.permits(now_ms) {
            debug!(now_ms, last = ?self.limiter.last(), "Mutation pass suppressed by rate limit");
            self.stats.passes_suppressed += 1;
            return false;
        }
        self.scheduler.schedule(now_ms)
    }

    /// Run the pending pass if it is due; returns whether a pass ran
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if !self.scheduler.take_due(now_ms) {
            return false;
        }
        if !self.enabled || !self.permission().is_allowed() {
            return false;
        }
        if !self.limiter.permits(now_ms) {
            self.stats.passes_suppressed += 1;
            return false;
        }
        self.run_pass(now_ms);
        true
    }

    /// Deliver a new policy snapshot
    ///
    /// Forces a disable when the page is no longer permitted.
    #[instrument(skip_all, fields(host = %self.hostname))]
    pub fn update_policy(&mut self, snapshot: PolicySnapshot) {
        self.policy = snapshot.sanitized();
        if self.enabled && !self.permission().is_allowed() {
            info!(permission = ?self.permission(), "Policy no longer permits this page");
            self.disable();
        }
    }

    /// Deliver a storage change notification
    pub fn apply_change(&mut self, change: &StorageChange) {
        if change.touches_lists() {
            let snapshot = change.apply_to(&self.policy);
            self.update_policy(snapshot);
        }
    }

    fn run_pass(&mut self, now_ms: u64) {
        self.limiter.record(now_ms);
        let result = self.transformer.apply(&mut self.document);
        // Our own replacements must not re-trigger a pass
        self.document.take_records();

        match result {
            Ok(PassReport { transformed, .. }) => {
                self.stats.passes_run += 1;
                self.stats.leaves_transformed += transformed as u64;
            }
            Err(e) => self.absorb(e),
        }
    }

    fn absorb(&mut self, error: Error) {
        if error.is_access_denied() {
            self.stats.access_denied += 1;
            debug!("Host refused modification: {}", error);
        } else {
            warn!("Transformation failed: {}", error);
        }
    }

    /// Run a pass outside the scheduler, ignoring the rate limit
    ///
    /// For one-shot rendering where no mutation stream exists.
    pub fn force_pass(&mut self, now_ms: u64) -> Result<PassReport> {
        self.limiter.record(now_ms);
        let report = self.transformer.apply(&mut self.document)?;
        self.document.take_records();
        self.stats.passes_run += 1;
        self.stats.leaves_transformed += report.transformed as u64;
        Ok(report)
    }
}
