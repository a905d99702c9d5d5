// Executor - bounded worker pool that drives probes to completion

mod cancel;
pub mod constants;
mod panic_guard;

pub use cancel::{cancel_channel, CancelSender, CancelToken};
pub use panic_guard::{execute_guarded_async, PanicGuardResult};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::{sleep, sleep_until, Instant};
use tracing::{debug, error, info, warn};

use super::aggregator::{aggregate, OutcomeMap};
use super::config::ExecutorConfig;
use super::registry::{Probe, ProbeContext, ProbeRegistry};
use crate::domain::{OutcomeStatus, ProbeError, ProbeOutcome, Report, RunMetadata, RunStatus};
use crate::port::{CommandRunner, TimeProvider};

/// State shared by all workers of one run
struct RunShared {
    probes: Vec<Probe>,
    timeouts: Vec<Duration>,
    /// Index of the next unclaimed probe
    cursor: AtomicUsize,
    runner: Arc<dyn CommandRunner>,
    time_provider: Arc<dyn TimeProvider>,
}

/// Runs every probe of a registry exactly once and builds the report
///
/// - At most `concurrency_limit` probes run at a time
/// - A probe error, panic or timeout only affects that probe's outcome
/// - No retries
/// - Cancellation (token or run deadline) stops new probes from starting,
///   gives in-flight ones `grace_period`, then drops them
pub struct Executor {
    runner: Arc<dyn CommandRunner>,
    config: ExecutorConfig,
    time_provider: Arc<dyn TimeProvider>,
}

impl Executor {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        config: ExecutorConfig,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            runner,
            config,
            time_provider,
        }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Run without an external cancellation signal
    pub async fn run_to_completion(&self, registry: &ProbeRegistry) -> Report {
        self.run(registry, CancelToken::never()).await
    }

    /// Run all probes and aggregate the report
    pub async fn run(&self, registry: &ProbeRegistry, mut cancel: CancelToken) -> Report {
        let generated_at = self.time_provider.now();
        let probes = registry.all().to_vec();
        let total = probes.len();
        let worker_count = self.config.concurrency_limit.max(1).min(total);

        info!(
            probes = total,
            workers = worker_count,
            default_timeout_secs = self.config.default_timeout.as_secs_f64(),
            run_deadline_secs = ?self.config.run_deadline.map(|d| d.as_secs_f64()),
            "Starting audit run"
        );

        let shared = Arc::new(RunShared {
            timeouts: probes
                .iter()
                .map(|p| self.config.timeout_for(p.category()))
                .collect(),
            probes,
            cursor: AtomicUsize::new(0),
            runner: Arc::clone(&self.runner),
            time_provider: Arc::clone(&self.time_provider),
        });

        let (stop_tx, stop_rx) = cancel_channel();
        if cancel.is_cancelled() {
            stop_tx.cancel();
        }

        let (tx, mut rx) = mpsc::unbounded_channel::<(usize, ProbeOutcome)>();
        let mut workers = JoinSet::new();
        for worker_id in 0..worker_count {
            workers.spawn(worker_loop(
                worker_id,
                Arc::clone(&shared),
                stop_rx.clone(),
                tx.clone(),
            ));
        }
        drop(tx);

        let mut slots: Vec<Option<ProbeOutcome>> = vec![None; total];
        let deadline = self.config.run_deadline.map(|d| Instant::now() + d);
        let mut status = if cancel.is_cancelled() {
            RunStatus::Cancelled
        } else {
            RunStatus::Completed
        };

        while status == RunStatus::Completed {
            tokio::select! {
                received = rx.recv() => match received {
                    Some((slot, outcome)) => store(&mut slots, &shared, slot, outcome),
                    None => break,
                },
                _ = cancel.cancelled() => {
                    warn!("Cancellation requested, stopping audit run");
                    status = RunStatus::Cancelled;
                    break;
                }
                _ = deadline_elapsed(deadline) => {
                    warn!("Run deadline reached, stopping audit run");
                    status = RunStatus::Cancelled;
                    break;
                }
            }
        }

        if status == RunStatus::Cancelled {
            stop_tx.cancel();
            let grace = sleep(self.config.grace_period);
            tokio::pin!(grace);

            loop {
                tokio::select! {
                    received = rx.recv() => match received {
                        Some((slot, outcome)) => store(&mut slots, &shared, slot, outcome),
                        None => break,
                    },
                    _ = &mut grace => {
                        warn!(
                            grace_period_secs = self.config.grace_period.as_secs_f64(),
                            "Grace period over, dropping in-flight probes"
                        );
                        workers.abort_all();
                        break;
                    }
                }
            }
        }

        // Aborted workers drop their probe futures here, which kills their commands
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                if !e.is_cancelled() {
                    error!(error = ?e, "Worker task failed");
                }
            }
        }
        while let Ok((slot, outcome)) = rx.try_recv() {
            store(&mut slots, &shared, slot, outcome);
        }

        let outcomes: OutcomeMap = slots
            .into_iter()
            .enumerate()
            .filter_map(|(slot, outcome)| {
                outcome.map(|o| (shared.probes[slot].key().clone(), o))
            })
            .collect();

        let metadata = RunMetadata {
            generated_at,
            finished_at: self.time_provider.now(),
            status,
        };
        let report = aggregate(registry, &outcomes, metadata);
        let summary = report.summary();

        info!(
            status = %report.status(),
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            timed_out = summary.timed_out,
            "Audit run finished"
        );

        report
    }
}

/// Write an outcome into its slot (each slot is written once)
fn store(slots: &mut [Option<ProbeOutcome>], shared: &RunShared, slot: usize, outcome: ProbeOutcome) {
    match slots.get_mut(slot) {
        Some(entry @ None) => *entry = Some(outcome),
        Some(Some(_)) => warn!(
            probe = %shared.probes[slot].key(),
            "Duplicate outcome ignored"
        ),
        None => error!(slot = slot, "Outcome for unknown slot ignored"),
    }
}

async fn deadline_elapsed(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending::<()>().await,
    }
}

/// Worker: claim the next probe, run it, hand the outcome over, repeat
async fn worker_loop(
    worker_id: usize,
    shared: Arc<RunShared>,
    stop: CancelToken,
    tx: mpsc::UnboundedSender<(usize, ProbeOutcome)>,
) {
    debug!(worker_id = worker_id, "Worker started");
    loop {
        if stop.is_cancelled() {
            debug!(worker_id = worker_id, "Worker stopping on cancellation");
            break;
        }

        let slot = shared.cursor.fetch_add(1, Ordering::SeqCst);
        let Some(probe) = shared.probes.get(slot) else {
            break;
        };

        let outcome = run_probe(&shared, probe, shared.timeouts[slot]).await;
        if tx.send((slot, outcome)).is_err() {
            break;
        }
    }
    debug!(worker_id = worker_id, "Worker stopped");
}

/// Run one probe inside the failure boundary
async fn run_probe(shared: &RunShared, probe: &Probe, timeout: Duration) -> ProbeOutcome {
    let ctx = ProbeContext::new(probe.key().clone(), Arc::clone(&shared.runner), timeout);
    let start = shared.time_provider.now_millis();

    debug!(
        category = %probe.category(),
        probe = %probe.name(),
        timeout_secs = timeout.as_secs_f64(),
        "Running probe"
    );

    let guarded = execute_guarded_async(probe.capability().run(ctx)).await;
    let duration_ms = shared.time_provider.now_millis() - start;

    let outcome = match guarded {
        PanicGuardResult::Success(result) => ProbeOutcome::from_result(result, duration_ms),
        PanicGuardResult::Panicked(msg) => {
            ProbeOutcome::failure(ProbeError::Panicked(msg).to_string(), duration_ms)
        }
    };

    match outcome.status() {
        OutcomeStatus::Success => info!(
            category = %probe.category(),
            probe = %probe.name(),
            duration_ms = duration_ms,
            "Probe succeeded"
        ),
        status => warn!(
            category = %probe.category(),
            probe = %probe.name(),
            duration_ms = duration_ms,
            status = %status,
            error = outcome.error_message().unwrap_or_default(),
            "Probe did not succeed"
        ),
    }

    outcome
}
