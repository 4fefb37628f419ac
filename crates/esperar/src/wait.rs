//! The wait primitive: policy, condition contract and the poll engine.
//!
//! One generic engine serves every condition shape. A [`Condition`] owns the
//! domain interpretation ("found", "visible", "stale"); [`WaitOptions`] owns
//! timing and error tolerance; [`wait`] owns the loop. Both the root driver
//! and an element-scoped sub-context go through the same engine, so there is
//! exactly one place where timing and error classification live.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::context::{ContextError, ContextErrorKind, SearchContext};
use crate::result::{EsperarError, EsperarResult};

/// Default timeout for wait operations (30 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for one wait invocation: timeout, polling interval and the set of
/// error kinds tolerated during polling.
///
/// The engine additionally always tolerates [`ContextErrorKind::NotFound`],
/// matching classic wait helpers where a momentarily absent target drives
/// another tick rather than a failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
    /// Error kinds to absorb as "not yet satisfied" during polling
    pub tolerated: Vec<ContextErrorKind>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            tolerated: Vec::new(),
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Add an error kind to tolerate during polling
    #[must_use]
    pub fn tolerating(mut self, kind: ContextErrorKind) -> Self {
        self.tolerated.push(kind);
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Whether an error of this kind is absorbed as "not yet satisfied"
    #[must_use]
    pub fn tolerates(&self, kind: ContextErrorKind) -> bool {
        kind == ContextErrorKind::NotFound || self.tolerated.contains(&kind)
    }

    /// Reject configurations that can never poll usefully.
    ///
    /// # Errors
    ///
    /// Returns [`EsperarError::Configuration`] for a zero timeout or a zero
    /// polling interval.
    pub fn validate(&self) -> EsperarResult<()> {
        if self.timeout_ms == 0 {
            return Err(EsperarError::configuration(
                "timeout must be greater than zero",
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(EsperarError::configuration(
                "polling interval must be greater than zero",
            ));
        }
        Ok(())
    }
}

// =============================================================================
// CONDITION CONTRACT
// =============================================================================

/// Outcome of a single condition evaluation.
///
/// `Ok(Some(value))` is success, `Ok(None)` is "not yet satisfied" (the
/// null/false/empty case), and `Err` is classified by the engine against the
/// tolerated kinds. Boolean-valued conditions only ever produce
/// `Ok(Some(true))`; a false observation is expressed as `Ok(None)` so it
/// drives another tick.
pub type ConditionOutcome<T> = Result<Option<T>, ContextError>;

/// A pure, re-evaluatable predicate/extractor over a context.
///
/// Conditions capture their parameters (a locator, expected text, an element
/// handle) at construction time and hold no mutable state; the engine
/// re-evaluates them on every poll tick. A condition never mutates the
/// context, with the single documented exception of the frame-switch
/// condition whose side effect is its success contract.
pub trait Condition<C: ?Sized> {
    /// The success value produced on a satisfied evaluation
    type Output;

    /// Evaluate the condition against the context
    fn evaluate(&self, context: &C) -> ConditionOutcome<Self::Output>;

    /// Get description for error messages
    fn description(&self) -> String;
}

/// A function-based condition
pub struct FnCondition<F> {
    func: F,
    description: String,
}

impl<F> std::fmt::Debug for FnCondition<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnCondition")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<F> FnCondition<F> {
    /// Create a new function condition
    pub fn new(func: F, description: impl Into<String>) -> Self {
        Self {
            func,
            description: description.into(),
        }
    }
}

impl<C: ?Sized, T, F> Condition<C> for FnCondition<F>
where
    F: Fn(&C) -> ConditionOutcome<T>,
{
    type Output = T;

    fn evaluate(&self, context: &C) -> ConditionOutcome<T> {
        (self.func)(context)
    }

    fn description(&self) -> String {
        self.description.clone()
    }
}

// =============================================================================
// POLL ENGINE
// =============================================================================

/// Repeatedly evaluate `condition` against `context` until it produces a
/// value, raises an intolerable error, or the timeout elapses.
///
/// The loop is single-threaded and blocking: it occupies the calling thread
/// for up to the configured timeout, sleeping one polling interval between
/// ticks. Evaluation always happens before the deadline check, so a
/// condition that becomes satisfiable exactly at the boundary still gets a
/// last-chance tick. A success value returns immediately regardless of
/// elapsed time; the first-tick success path performs zero sleeps.
///
/// # Errors
///
/// - [`EsperarError::Configuration`] for an invalid policy, before any
///   evaluation.
/// - [`EsperarError::Propagated`] as soon as an evaluation error's kind is
///   neither the built-in `NotFound` tolerance nor in the policy's set.
/// - [`EsperarError::Timeout`] when the deadline elapses, carrying the last
///   observed non-success state.
pub fn wait<C, K>(context: &C, condition: &K, options: &WaitOptions) -> EsperarResult<K::Output>
where
    C: ?Sized,
    K: Condition<C> + ?Sized,
{
    options.validate()?;

    let timeout = options.timeout();
    let poll_interval = options.poll_interval();
    let start = Instant::now();

    loop {
        // Every fall-through arm yields this tick's non-success rendering,
        // which the deadline check below may fold into the timeout error.
        let last_outcome = match condition.evaluate(context) {
            Ok(Some(value)) => {
                debug!(
                    condition = %condition.description(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "condition satisfied"
                );
                return Ok(value);
            }
            Ok(None) => {
                trace!(condition = %condition.description(), "condition not satisfied");
                String::from("condition not satisfied")
            }
            Err(err) if options.tolerates(err.kind()) => {
                trace!(condition = %condition.description(), error = %err, "tolerated error");
                format!("tolerated error: {err}")
            }
            Err(err) => {
                debug!(condition = %condition.description(), error = %err, "propagating error");
                return Err(EsperarError::Propagated(err));
            }
        };

        if start.elapsed() >= timeout {
            debug!(
                condition = %condition.description(),
                timeout_ms = options.timeout_ms,
                "wait timed out"
            );
            return Err(EsperarError::Timeout {
                timeout_ms: options.timeout_ms,
                condition: condition.description(),
                last_outcome,
            });
        }

        std::thread::sleep(poll_interval);
    }
}

// =============================================================================
// CONTEXT ADAPTER
// =============================================================================

/// Wait methods available on every search context (driver or element).
pub trait WaitUntil: SearchContext + Sized {
    /// Wait for the condition with the default options (30s / 50ms).
    ///
    /// # Errors
    ///
    /// See [`wait`].
    fn wait_until<K: Condition<Self>>(&self, condition: &K) -> EsperarResult<K::Output> {
        wait(self, condition, &WaitOptions::default())
    }

    /// Wait for the condition with an explicit timeout and the default
    /// polling interval.
    ///
    /// # Errors
    ///
    /// See [`wait`].
    fn wait_until_for<K: Condition<Self>>(
        &self,
        condition: &K,
        timeout: Duration,
    ) -> EsperarResult<K::Output> {
        let options = WaitOptions::new().with_timeout(timeout.as_millis() as u64);
        wait(self, condition, &options)
    }

    /// Wait for the condition with explicit options.
    ///
    /// # Errors
    ///
    /// See [`wait`].
    fn wait_until_with<K: Condition<Self>>(
        &self,
        condition: &K,
        options: &WaitOptions,
    ) -> EsperarResult<K::Output> {
        wait(self, condition, options)
    }
}

impl<C: SearchContext> WaitUntil for C {}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn count_up(counter: &Arc<AtomicUsize>) -> usize {
        counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    mod options_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let opts = WaitOptions::default();
            assert_eq!(opts.timeout_ms, DEFAULT_WAIT_TIMEOUT_MS);
            assert_eq!(opts.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
            assert!(opts.tolerated.is_empty());
        }

        #[test]
        fn test_builders_chained() {
            let opts = WaitOptions::new()
                .with_timeout(5000)
                .with_poll_interval(100)
                .tolerating(ContextErrorKind::StaleReference);
            assert_eq!(opts.timeout(), Duration::from_millis(5000));
            assert_eq!(opts.poll_interval(), Duration::from_millis(100));
            assert!(opts.tolerates(ContextErrorKind::StaleReference));
        }

        #[test]
        fn test_not_found_always_tolerated() {
            let opts = WaitOptions::default();
            assert!(opts.tolerates(ContextErrorKind::NotFound));
            assert!(!opts.tolerates(ContextErrorKind::StaleReference));
            assert!(!opts.tolerates(ContextErrorKind::NoSuchFrame));
        }

        #[test]
        fn test_validate_rejects_zero_timeout() {
            let result = WaitOptions::new().with_timeout(0).validate();
            assert!(matches!(result, Err(EsperarError::Configuration { .. })));
        }

        #[test]
        fn test_validate_rejects_zero_interval() {
            let result = WaitOptions::new().with_poll_interval(0).validate();
            assert!(matches!(result, Err(EsperarError::Configuration { .. })));
        }

        #[test]
        fn test_validate_accepts_defaults() {
            assert!(WaitOptions::default().validate().is_ok());
        }
    }

    mod fn_condition_tests {
        use super::*;

        #[test]
        fn test_description() {
            let condition = FnCondition::new(|_: &()| Ok(Some(true)), "always true");
            assert_eq!(condition.description(), "always true");
        }

        #[test]
        fn test_debug_shows_description() {
            // Nothing here evaluates the condition, so the closure's outcome
            // type must be spelled out.
            let condition = FnCondition::new(
                |_: &()| -> ConditionOutcome<bool> { Ok(Some(true)) },
                "my condition",
            );
            assert!(format!("{condition:?}").contains("my condition"));
        }

        #[test]
        fn test_purity_same_result_twice() {
            let condition = FnCondition::new(|_: &()| Ok(Some(7)), "seven");
            assert_eq!(condition.evaluate(&()).unwrap(), Some(7));
            assert_eq!(condition.evaluate(&()).unwrap(), Some(7));
        }
    }

    mod engine_tests {
        use super::*;

        #[test]
        fn test_first_tick_success_returns_immediately() {
            let evals = Arc::new(AtomicUsize::new(0));
            let evals_in = evals.clone();
            let condition = FnCondition::new(
                move |_: &()| {
                    count_up(&evals_in);
                    Ok(Some(42))
                },
                "immediate",
            );
            // A long poll interval would be visible if any sleep happened.
            let options = WaitOptions::new().with_timeout(5000).with_poll_interval(1000);
            let start = Instant::now();
            let result = wait(&(), &condition, &options);
            assert_eq!(result.unwrap(), 42);
            assert_eq!(evals.load(Ordering::SeqCst), 1);
            assert!(start.elapsed() < Duration::from_millis(500));
        }

        #[test]
        fn test_never_satisfied_times_out_with_diagnostics() {
            let condition =
                FnCondition::new(|_: &()| Ok(None::<bool>), "element css=#gone to be visible");
            let options = WaitOptions::new().with_timeout(100).with_poll_interval(20);
            let start = Instant::now();
            let result = wait(&(), &condition, &options);
            assert!(start.elapsed() >= Duration::from_millis(100));
            match result {
                Err(EsperarError::Timeout {
                    timeout_ms,
                    condition,
                    last_outcome,
                }) => {
                    assert_eq!(timeout_ms, 100);
                    assert!(condition.contains("css=#gone"));
                    assert_eq!(last_outcome, "condition not satisfied");
                }
                other => panic!("expected Timeout, got {other:?}"),
            }
        }

        #[test]
        fn test_evaluation_count_is_floor_ratio_plus_one() {
            let evals = Arc::new(AtomicUsize::new(0));
            let evals_in = evals.clone();
            let condition = FnCondition::new(
                move |_: &()| {
                    count_up(&evals_in);
                    Ok(None::<bool>)
                },
                "never",
            );
            let options = WaitOptions::new().with_timeout(100).with_poll_interval(20);
            let _ = wait(&(), &condition, &options);
            // floor(100 / 20) + 1 = 6, with generous jitter allowance
            let count = evals.load(Ordering::SeqCst);
            assert!((4..=8).contains(&count), "unexpected evaluation count {count}");
        }

        #[test]
        fn test_tolerated_errors_absorbed_until_success() {
            let evals = Arc::new(AtomicUsize::new(0));
            let evals_in = evals.clone();
            let condition = FnCondition::new(
                move |_: &()| {
                    if count_up(&evals_in) <= 2 {
                        Err(ContextError::new(
                            ContextErrorKind::StaleReference,
                            "element went stale",
                        ))
                    } else {
                        Ok(Some("ready"))
                    }
                },
                "eventually ready",
            );
            let options = WaitOptions::new()
                .with_timeout(2000)
                .with_poll_interval(10)
                .tolerating(ContextErrorKind::StaleReference);
            assert_eq!(wait(&(), &condition, &options).unwrap(), "ready");
            assert_eq!(evals.load(Ordering::SeqCst), 3);
        }

        #[test]
        fn test_not_found_tolerated_without_opt_in() {
            let evals = Arc::new(AtomicUsize::new(0));
            let evals_in = evals.clone();
            let condition = FnCondition::new(
                move |_: &()| {
                    if count_up(&evals_in) <= 2 {
                        Err(ContextError::new(ContextErrorKind::NotFound, "not there yet"))
                    } else {
                        Ok(Some(true))
                    }
                },
                "appears later",
            );
            let options = WaitOptions::new().with_timeout(2000).with_poll_interval(10);
            assert_eq!(wait(&(), &condition, &options).unwrap(), true);
        }

        #[test]
        fn test_intolerable_error_short_circuits() {
            let condition = FnCondition::new(
                |_: &()| -> ConditionOutcome<bool> {
                    Err(ContextError::new(
                        ContextErrorKind::NoSuchFrame,
                        "frame \"nav\" not found",
                    ))
                },
                "frame available",
            );
            let options = WaitOptions::new().with_timeout(5000).with_poll_interval(50);
            let start = Instant::now();
            let result = wait(&(), &condition, &options);
            assert!(start.elapsed() < Duration::from_millis(1000));
            assert!(matches!(
                result,
                Err(EsperarError::Propagated(ref e)) if e.is(ContextErrorKind::NoSuchFrame)
            ));
        }

        #[test]
        fn test_timeout_reports_last_tolerated_error() {
            let condition = FnCondition::new(
                |_: &()| -> ConditionOutcome<bool> {
                    Err(ContextError::new(ContextErrorKind::NotFound, "no element matching css=#x"))
                },
                "element css=#x to exist",
            );
            let options = WaitOptions::new().with_timeout(60).with_poll_interval(20);
            match wait(&(), &condition, &options) {
                Err(EsperarError::Timeout { last_outcome, .. }) => {
                    assert!(last_outcome.contains("not found"));
                }
                other => panic!("expected Timeout, got {other:?}"),
            }
        }

        #[test]
        fn test_invalid_options_fail_before_any_evaluation() {
            let evals = Arc::new(AtomicUsize::new(0));
            let evals_in = evals.clone();
            let condition = FnCondition::new(
                move |_: &()| {
                    count_up(&evals_in);
                    Ok(Some(true))
                },
                "never reached",
            );
            let options = WaitOptions::new().with_timeout(0);
            let result = wait(&(), &condition, &options);
            assert!(matches!(result, Err(EsperarError::Configuration { .. })));
            assert_eq!(evals.load(Ordering::SeqCst), 0);
        }
    }

    mod integration_tests {
        use super::*;
        use std::sync::atomic::AtomicBool;

        #[test]
        fn test_condition_becomes_true_mid_wait() {
            let flag = Arc::new(AtomicBool::new(false));
            let flag_writer = flag.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(50));
                flag_writer.store(true, Ordering::SeqCst);
            });

            let flag_reader = flag.clone();
            let condition = FnCondition::new(
                move |_: &()| {
                    if flag_reader.load(Ordering::SeqCst) {
                        Ok(Some(true))
                    } else {
                        Ok(None)
                    }
                },
                "flag set",
            );
            let options = WaitOptions::new().with_timeout(2000).with_poll_interval(10);
            assert_eq!(wait(&(), &condition, &options).unwrap(), true);
        }
    }
}
