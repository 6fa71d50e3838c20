//! Map-provider script load lifecycle.
//!
//! Loading the external provider script happens once per process no matter
//! how many widget instances mount concurrently: the first caller to
//! [`ProviderLoader::begin`] owns the actual load, everyone else subscribes
//! to the shared outcome. The lifecycle is `Uninitialized -> Loading ->
//! Ready | Failed`; both end states are terminal and every subscriber is
//! notified exactly once.

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoaderPhase {
    Uninitialized,
    Loading,
    Ready,
    Failed,
}

impl LoaderPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, LoaderPhase::Ready | LoaderPhase::Failed)
    }
}

type ReadyCallback = Box<dyn FnOnce(bool) + Send>;

pub struct ProviderLoader {
    inner: Mutex<Inner>,
}

struct Inner {
    phase: LoaderPhase,
    waiters: Vec<ReadyCallback>,
}

impl ProviderLoader {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                phase: LoaderPhase::Uninitialized,
                waiters: Vec::new(),
            }),
        }
    }

    /// Claims ownership of the script load.
    ///
    /// Returns `true` only for the caller that moves the lifecycle from
    /// `Uninitialized` to `Loading`; that caller must eventually call
    /// [`ProviderLoader::resolve`]. Every other caller gets `false` and
    /// should subscribe instead.
    pub fn begin(&self) -> bool {
        let mut inner = self.inner.lock();
        if inner.phase != LoaderPhase::Uninitialized {
            return false;
        }
        inner.phase = LoaderPhase::Loading;
        true
    }

    /// Moves to the terminal phase and notifies all waiters exactly once.
    ///
    /// Calls after the first terminal transition are ignored.
    pub fn resolve(&self, success: bool) {
        let waiters = {
            let mut inner = self.inner.lock();
            if inner.phase.is_terminal() {
                return;
            }
            inner.phase = if success {
                LoaderPhase::Ready
            } else {
                LoaderPhase::Failed
            };
            std::mem::take(&mut inner.waiters)
        };
        for waiter in waiters {
            waiter(success);
        }
    }

    /// Registers interest in the outcome.
    ///
    /// In a terminal phase the callback runs immediately with the terminal
    /// value; otherwise it is queued for the transition.
    pub fn subscribe<F>(&self, callback: F)
    where
        F: FnOnce(bool) + Send + 'static,
    {
        let terminal = {
            let mut inner = self.inner.lock();
            match inner.phase {
                LoaderPhase::Ready => Some(true),
                LoaderPhase::Failed => Some(false),
                _ => {
                    inner.waiters.push(Box::new(callback));
                    return;
                }
            }
        };
        if let Some(success) = terminal {
            callback(success);
        }
    }

    pub fn phase(&self) -> LoaderPhase {
        self.inner.lock().phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase() == LoaderPhase::Ready
    }
}

impl Default for ProviderLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProviderLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderLoader")
            .field("phase", &self.phase())
            .finish()
    }
}

static GLOBAL: Lazy<Arc<ProviderLoader>> = Lazy::new(|| Arc::new(ProviderLoader::new()));

/// The process-wide loader shared by all widget instances.
pub fn global_loader() -> Arc<ProviderLoader> {
    GLOBAL.clone()
}
