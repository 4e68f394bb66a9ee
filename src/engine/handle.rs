//! Single-flight lazy engine initialization.
//!
//! Multiple scan calls can race on first use (a fast continuous loop
//! issues the next scan before the first finished initializing). The
//! handle collapses those races into exactly one initialization
//! handshake: concurrent callers attach to the in-flight attempt and
//! all observe the same outcome.

use super::{DecodeEngine, NativeSymbol};
use crate::error::ScanError;
use std::sync::{Condvar, Mutex, MutexGuard};

/// Initialization state of the wrapped engine.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Readiness {
    Uninitialized,
    Initializing,
    Ready,
    /// Terminal. The recorded reason is re-raised on every later call
    /// without re-attempting the handshake.
    Failed(String),
}

struct Inner {
    readiness: Readiness,
    /// Taken out of the slot for the duration of the handshake so the
    /// lock is not held across it.
    engine: Option<Box<dyn DecodeEngine>>,
}

/// Concurrency-safe wrapper around a [`DecodeEngine`] providing
/// single-flight lazy initialization and decode delegation.
///
/// One handle is created per scanner instance; clones of an `Arc`
/// around it may be shared where callers want to split the
/// initialization cost across scanners.
pub struct EngineHandle {
    inner: Mutex<Inner>,
    cond: Condvar,
}

impl EngineHandle {
    /// Wraps an engine without initializing it. The handshake runs
    /// lazily on first [`ensure_ready`](Self::ensure_ready) or
    /// [`decode`](Self::decode) call.
    pub fn new(engine: impl DecodeEngine + 'static) -> Self {
        Self {
            inner: Mutex::new(Inner {
                readiness: Readiness::Uninitialized,
                engine: Some(Box::new(engine)),
            }),
            cond: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Idempotent initialization trigger.
    ///
    /// - Ready: returns immediately.
    /// - Initializing: waits for the in-flight attempt and receives
    ///   its outcome; never starts a second handshake.
    /// - Uninitialized: runs the handshake; on failure the handle
    ///   becomes terminally `Failed` and every waiter (and every
    ///   later caller) gets the same [`ScanError::EngineUnavailable`].
    pub fn ensure_ready(&self) -> Result<(), ScanError> {
        let mut inner = self.lock();
        loop {
            match &inner.readiness {
                Readiness::Ready => return Ok(()),
                Readiness::Failed(reason) => {
                    return Err(ScanError::EngineUnavailable(reason.clone()));
                }
                Readiness::Initializing => {
                    inner = self
                        .cond
                        .wait(inner)
                        .unwrap_or_else(|e| e.into_inner());
                }
                Readiness::Uninitialized => break,
            }
        }

        inner.readiness = Readiness::Initializing;
        let mut engine = match inner.engine.take() {
            Some(engine) => engine,
            None => {
                // The slot is only empty while readiness is
                // Initializing, which we are not in here.
                inner.readiness = Readiness::Failed("engine slot empty".into());
                self.cond.notify_all();
                return Err(ScanError::EngineUnavailable("engine slot empty".into()));
            }
        };
        drop(inner);

        let outcome = engine.initialize();

        let mut inner = self.lock();
        inner.engine = Some(engine);
        let result = match outcome {
            Ok(()) => {
                inner.readiness = Readiness::Ready;
                tracing::info!("decoding engine initialized");
                Ok(())
            }
            Err(e) => {
                let reason = e.to_string();
                inner.readiness = Readiness::Failed(reason.clone());
                tracing::warn!(error = %reason, "decoding engine initialization failed");
                Err(ScanError::EngineUnavailable(reason))
            }
        };
        self.cond.notify_all();
        result
    }

    /// Decodes one grayscale frame, initializing the engine first if
    /// needed. Engine rejection surfaces as
    /// [`ScanError::DecodeFailure`].
    pub fn decode(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<NativeSymbol>, ScanError> {
        self.ensure_ready()?;

        let mut inner = self.lock();
        match inner.engine.as_mut() {
            Some(engine) => engine
                .decode(pixels, width, height)
                .map_err(|e| ScanError::DecodeFailure(e.to_string())),
            // ensure_ready() returned Ok, so the slot is occupied.
            None => Err(ScanError::EngineUnavailable("engine slot empty".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MockEngine;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_ensure_ready_initializes_once() {
        let engine = MockEngine::new();
        let stats = engine.stats();
        let handle = EngineHandle::new(engine);

        handle.ensure_ready().unwrap();
        handle.ensure_ready().unwrap();
        handle.ensure_ready().unwrap();

        assert_eq!(stats.lock().unwrap().init_attempts, 1);
    }

    #[test]
    fn test_concurrent_callers_share_one_handshake() {
        let engine = MockEngine::new().with_init_delay(Duration::from_millis(50));
        let stats = engine.stats();
        let handle = Arc::new(EngineHandle::new(engine));

        let threads: Vec<_> = (0..8)
            .map(|_| {
                let handle = Arc::clone(&handle);
                std::thread::spawn(move || handle.ensure_ready())
            })
            .collect();

        for t in threads {
            t.join().unwrap().unwrap();
        }
        assert_eq!(stats.lock().unwrap().init_attempts, 1);
    }

    #[test]
    fn test_failed_init_is_terminal_and_reproducible() {
        let engine = MockEngine::new().failing_init();
        let stats = engine.stats();
        let handle = EngineHandle::new(engine);

        let first = handle.ensure_ready();
        assert!(matches!(first, Err(ScanError::EngineUnavailable(_))));

        // Second call re-raises the same kind without a new handshake.
        let second = handle.ensure_ready();
        assert!(matches!(second, Err(ScanError::EngineUnavailable(_))));
        assert_eq!(stats.lock().unwrap().init_attempts, 1);
    }

    #[test]
    fn test_concurrent_failed_init_all_observe_failure() {
        let engine = MockEngine::new()
            .failing_init()
            .with_init_delay(Duration::from_millis(20));
        let stats = engine.stats();
        let handle = Arc::new(EngineHandle::new(engine));

        let threads: Vec<_> = (0..4)
            .map(|_| {
                let handle = Arc::clone(&handle);
                std::thread::spawn(move || handle.ensure_ready())
            })
            .collect();

        for t in threads {
            let outcome = t.join().unwrap();
            assert!(matches!(outcome, Err(ScanError::EngineUnavailable(_))));
        }
        assert_eq!(stats.lock().unwrap().init_attempts, 1);
    }

    #[test]
    fn test_decode_initializes_lazily() {
        let engine = MockEngine::new();
        let stats = engine.stats();
        let handle = EngineHandle::new(engine);

        let symbols = handle.decode(&[255u8; 16], 4, 4).unwrap();
        assert_eq!(symbols.len(), 1);

        let stats = stats.lock().unwrap();
        assert_eq!(stats.init_attempts, 1);
        assert_eq!(stats.decode_calls, 1);
    }

    #[test]
    fn test_decode_rejection_maps_to_decode_failure() {
        let handle = EngineHandle::new(MockEngine::new().failing_decode());
        assert!(matches!(
            handle.decode(&[255u8; 16], 4, 4),
            Err(ScanError::DecodeFailure(_))
        ));
    }

    #[test]
    fn test_decode_after_failed_init_is_engine_unavailable() {
        let handle = EngineHandle::new(MockEngine::new().failing_init());
        assert!(matches!(
            handle.decode(&[255u8; 16], 4, 4),
            Err(ScanError::EngineUnavailable(_))
        ));
    }
}
