use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use super::{BulkResult, PoolError, VerificationResult, Verifier};
use crate::address::parse_address;
use crate::scoring::Reason;

enum Wait {
    Deadline,
    Disconnected,
}

impl Verifier {
    /// Verify every address, at most `max_concurrency` at a time (default
    /// and cap come from the options). `results[i]` always answers
    /// `addresses[i]`. Malformed entries are answered without a worker.
    pub fn verify_bulk<S: AsRef<str>>(
        &self,
        addresses: &[S],
        max_concurrency: Option<usize>,
    ) -> BulkResult {
        let started = Instant::now();
        let options = &self.engine.options;
        let deadline = options.request_timeout.map(|timeout| started + timeout);
        let concurrency = options
            .effective_concurrency(max_concurrency)
            .min(self.pool.size());

        let mut slots: Vec<Option<VerificationResult>> = Vec::with_capacity(addresses.len());
        let mut pending = VecDeque::new();
        for (index, raw) in addresses.iter().enumerate() {
            let raw = raw.as_ref();
            match parse_address(raw) {
                Ok(parsed) => {
                    slots.push(None);
                    pending.push_back((index, (raw.to_string(), parsed)));
                }
                Err(_) => slots.push(Some(VerificationResult::invalid(raw, Duration::ZERO))),
            }
        }

        tracing::info!(
            target: "verifier",
            total = addresses.len(),
            dispatched = pending.len(),
            concurrency,
            "bulk verification started"
        );

        let engine = &self.engine;
        let stopped = run_window(
            pending,
            &mut slots,
            concurrency,
            deadline,
            |index, (input, parsed), tx| {
                let engine = Arc::clone(engine);
                self.pool.execute(move || {
                    let result = engine.verify_guarded(&input, &parsed);
                    // receiver gone means the request already gave up
                    let _ = tx.send((index, result));
                })
            },
        );

        let missing = stopped.unwrap_or(Reason::ProcessingError);
        let elapsed = started.elapsed();
        let results = slots
            .into_iter()
            .zip(addresses)
            .map(|(slot, raw)| {
                slot.unwrap_or_else(|| VerificationResult::failed(raw.as_ref(), missing, elapsed))
            })
            .collect();

        let bulk = BulkResult::new(results, elapsed);
        tracing::info!(
            target: "verifier",
            total = bulk.total,
            deliverable = bulk.counts.deliverable,
            risky = bulk.counts.risky,
            undeliverable = bulk.counts.undeliverable,
            invalid = bulk.counts.invalid,
            elapsed_ms = bulk.processing_time_ms,
            "bulk verification finished"
        );
        bulk
    }
}

type Outcome = (usize, VerificationResult);

/// Keep at most `concurrency` jobs in flight until `pending` drains, filling
/// `slots` as results arrive. Returns why collection stopped early, if it did.
///
/// Each dispatched job owns a sender. The local one is dropped once nothing
/// is left to dispatch, so a job that dies without answering ends the wait
/// instead of blocking it.
fn run_window<T, D>(
    mut pending: VecDeque<(usize, T)>,
    slots: &mut [Option<VerificationResult>],
    concurrency: usize,
    deadline: Option<Instant>,
    mut dispatch: D,
) -> Option<Reason>
where
    D: FnMut(usize, T, Sender<Outcome>) -> Result<(), PoolError>,
{
    let (tx, rx) = mpsc::channel::<Outcome>();
    let mut tx = Some(tx);
    let mut in_flight = 0usize;

    loop {
        while in_flight < concurrency {
            let Some(sender) = tx.as_ref() else {
                break;
            };
            let Some((index, item)) = pending.pop_front() else {
                break;
            };
            match dispatch(index, item, sender.clone()) {
                Ok(()) => in_flight += 1,
                Err(err) => {
                    tracing::error!(target: "verifier", error = %err, "could not dispatch");
                    return Some(Reason::ProcessingError);
                }
            }
        }
        if pending.is_empty() {
            tx = None;
        }
        if in_flight == 0 {
            return None;
        }

        let received = match deadline {
            Some(deadline) => rx
                .recv_timeout(deadline.saturating_duration_since(Instant::now()))
                .map_err(|err| match err {
                    RecvTimeoutError::Timeout => Wait::Deadline,
                    RecvTimeoutError::Disconnected => Wait::Disconnected,
                }),
            None => rx.recv().map_err(|_| Wait::Disconnected),
        };
        match received {
            Ok((index, result)) => {
                slots[index] = Some(result);
                in_flight -= 1;
            }
            Err(Wait::Deadline) => {
                tracing::warn!(
                    target: "verifier",
                    in_flight,
                    queued = pending.len(),
                    "bulk deadline reached"
                );
                return Some(Reason::RequestTimeout);
            }
            Err(Wait::Disconnected) => {
                tracing::warn!(target: "verifier", in_flight, "worker dropped a job unanswered");
                return Some(Reason::ProcessingError);
            }
        }
    }
}
