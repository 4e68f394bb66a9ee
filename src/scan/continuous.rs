//! Continuous scanning over a live frame source.
//!
//! The loop is tick-driven: a periodic driver calls the tick core,
//! which gates decode attempts to a minimum interval and runs at most
//! one attempt at a time. The tick core is independent of the driving
//! primitive, so tests feed it timestamps directly while production
//! use runs it on a dedicated thread.
//!
//! Cancellation is cooperative: `stop()` prevents any further
//! delivery immediately, but cannot abort a decode already handed to
//! the engine — its outcome, when it arrives, is discarded. A hung
//! engine call therefore stalls its loop (no timeout layer here);
//! callers needing hard deadlines must enforce them inside their
//! engine.

use super::{FrameScanner, ScanOptions};
use crate::error::ScanError;
use crate::result::ScanResult;
use crate::source::PixelSource;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Cadence of the thread driver between gating checks. Stands in for
/// the display-refresh tick of an animation-callback environment.
const DRIVER_TICK: Duration = Duration::from_millis(5);

/// Observable state of a continuous scan loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LoopState {
    /// Created, no decode attempt made yet.
    Idle = 0,
    /// Waiting for the next tick to pass interval gating.
    Scheduled = 1,
    /// A decode attempt is in flight.
    Running = 2,
    /// Terminal; no further attempts will be scheduled.
    Stopped = 3,
}

impl LoopState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Idle,
            1 => Self::Scheduled,
            2 => Self::Running,
            _ => Self::Stopped,
        }
    }
}

/// State shared between the loop driver and its handle.
struct LoopShared {
    state: AtomicU8,
    /// Held around every callback delivery. `stop()` acquires it once
    /// after flipping the state, so that by the time `stop()` returns
    /// any in-progress delivery has finished and no new one can start.
    delivery: Mutex<()>,
}

impl LoopShared {
    fn new() -> Self {
        Self {
            state: AtomicU8::new(LoopState::Idle as u8),
            delivery: Mutex::new(()),
        }
    }

    fn state(&self) -> LoopState {
        LoopState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: LoopState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn is_stopped(&self) -> bool {
        self.state() == LoopState::Stopped
    }
}

/// Outcome of one tick of the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tick {
    /// Interval gating skipped this tick.
    Skipped,
    /// One decode attempt ran to completion.
    Scanned,
    /// The loop is stopped; the driver should exit.
    Stopped,
}

type ResultSink = Box<dyn FnMut(Vec<ScanResult>) + Send>;
type DiagnosticSink = Box<dyn FnMut(&ScanError) + Send>;

/// The scheduling core: interval gating, sequential attempts, result
/// and failure routing. Driven by `tick(now)` calls.
struct LoopCore {
    scanner: FrameScanner,
    source: Box<dyn PixelSource + Send>,
    on_result: ResultSink,
    on_error: DiagnosticSink,
    options: ScanOptions,
    shared: Arc<LoopShared>,
    last_sample: Option<Instant>,
}

impl LoopCore {
    fn new(
        scanner: FrameScanner,
        source: Box<dyn PixelSource + Send>,
        on_result: ResultSink,
        on_error: DiagnosticSink,
        options: ScanOptions,
        shared: Arc<LoopShared>,
    ) -> Self {
        Self {
            scanner,
            source,
            on_result,
            on_error,
            options,
            shared,
            last_sample: None,
        }
    }

    /// Runs one tick at timestamp `now`.
    ///
    /// The attempt runs to completion within the tick, so attempt
    /// *n+1* can never start before attempt *n* resolved, regardless
    /// of tick cadence.
    fn tick(&mut self, now: Instant) -> Tick {
        if self.shared.is_stopped() {
            return Tick::Stopped;
        }

        if let Some(last) = self.last_sample {
            if now.duration_since(last) < self.options.interval() {
                return Tick::Skipped;
            }
        }
        self.last_sample = Some(now);

        self.shared.set_state(LoopState::Running);
        let outcome = self.scanner.scan(self.source.as_mut());

        let _gate = self
            .shared
            .delivery
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        // Stopped while the attempt was in flight: discard its outcome.
        if self.shared.is_stopped() {
            return Tick::Stopped;
        }

        match outcome {
            Ok(results) => {
                if !results.is_empty() {
                    tracing::debug!(count = results.len(), "symbols decoded");
                    (self.on_result)(results);
                    if self.options.stop_on_result {
                        self.shared.set_state(LoopState::Stopped);
                        return Tick::Stopped;
                    }
                }
            }
            Err(e) if e.is_per_frame() => {
                // Transient per-frame failure: report and keep going.
                tracing::warn!(error = %e, "scan attempt failed");
                (self.on_error)(&e);
            }
            Err(e) => {
                // Engine gone: every further attempt would fail the
                // same way, so the loop reaches a terminal condition.
                tracing::warn!(error = %e, "scan loop terminating");
                (self.on_error)(&e);
                self.shared.set_state(LoopState::Stopped);
                return Tick::Stopped;
            }
        }

        self.shared.set_state(LoopState::Scheduled);
        Tick::Scanned
    }
}

/// Handle to a running continuous scan loop.
///
/// Dropping the handle stops the loop.
pub struct ScanHandle {
    shared: Arc<LoopShared>,
}

impl ScanHandle {
    /// Stops the loop.
    ///
    /// Idempotent. Once this returns, no further result or diagnostic
    /// callback will fire for this loop; an attempt in flight at the
    /// moment of cancellation has its outcome discarded.
    pub fn stop(&self) {
        self.shared.set_state(LoopState::Stopped);
        // Wait out any delivery already in progress.
        drop(
            self.shared
                .delivery
                .lock()
                .unwrap_or_else(|e| e.into_inner()),
        );
        tracing::debug!("scan loop stopped");
    }

    /// Current loop state.
    pub fn state(&self) -> LoopState {
        self.shared.state()
    }

    /// True once the loop has reached its terminal state.
    pub fn is_stopped(&self) -> bool {
        self.shared.is_stopped()
    }
}

impl Drop for ScanHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Continuous scan entry points.
pub struct ContinuousScan;

impl ContinuousScan {
    /// Starts a continuous scan loop over `source` on a dedicated
    /// driver thread. Per-frame failures go to a `tracing` warn sink.
    pub fn start(
        scanner: FrameScanner,
        source: impl PixelSource + Send + 'static,
        on_result: impl FnMut(Vec<ScanResult>) + Send + 'static,
        options: ScanOptions,
    ) -> ScanHandle {
        Self::start_with_diagnostics(scanner, source, on_result, |_e: &ScanError| {}, options)
    }

    /// Starts a continuous scan loop with an explicit diagnostic sink
    /// for per-frame failures.
    pub fn start_with_diagnostics(
        scanner: FrameScanner,
        source: impl PixelSource + Send + 'static,
        on_result: impl FnMut(Vec<ScanResult>) + Send + 'static,
        on_error: impl FnMut(&ScanError) + Send + 'static,
        options: ScanOptions,
    ) -> ScanHandle {
        let shared = Arc::new(LoopShared::new());
        let mut core = LoopCore::new(
            scanner,
            Box::new(source),
            Box::new(on_result),
            Box::new(on_error),
            options,
            Arc::clone(&shared),
        );

        shared.set_state(LoopState::Scheduled);
        tracing::info!(
            interval_ms = core.options.interval_ms,
            stop_on_result = core.options.stop_on_result,
            "continuous scan started"
        );

        std::thread::spawn(move || loop {
            match core.tick(Instant::now()) {
                Tick::Stopped => break,
                Tick::Skipped | Tick::Scanned => std::thread::sleep(DRIVER_TICK),
            }
        });

        ScanHandle { shared }
    }
}
