// src/load.rs
//! Cancellation for document loads.
//!
//! A load that has been superseded or aborted must never write its result
//! back, even when its outbound calls finish afterwards. [`LoadSlot`] keeps
//! the current state plus a generation counter; each [`LoadTicket`] carries
//! the generation it was issued for and an [`AbortSignal`] the fetch code
//! checks before every outbound call.

use crate::error::AppError;
use parking_lot::Mutex;
use std::future::Future;
use tokio::sync::watch;

/// Owning side of an abort flag.
#[derive(Debug)]
pub struct AbortHandle {
    sender: watch::Sender<bool>,
}

/// Observing side of an abort flag. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AbortSignal {
    receiver: watch::Receiver<bool>,
}

impl AbortHandle {
    pub fn new() -> (Self, AbortSignal) {
        let (sender, receiver) = watch::channel(false);
        (Self { sender }, AbortSignal { receiver })
    }

    pub fn abort(&self) {
        self.sender.send_replace(true);
    }

    pub fn signal(&self) -> AbortSignal {
        AbortSignal {
            receiver: self.sender.subscribe(),
        }
    }
}

impl AbortSignal {
    /// A signal that is never raised, for callers with nothing to cancel.
    pub fn never() -> Self {
        AbortHandle::new().1
    }

    pub fn is_aborted(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Fails with [`AppError::Aborted`] once the load has been aborted.
    pub fn check(&self) -> Result<(), AppError> {
        if self.is_aborted() {
            Err(AppError::Aborted)
        } else {
            Ok(())
        }
    }
}

/// What a [`LoadSlot`] currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

/// Permission to publish one load's result.
#[derive(Debug, Clone)]
pub struct LoadTicket {
    generation: u64,
    signal: AbortSignal,
}

impl LoadTicket {
    pub fn signal(&self) -> &AbortSignal {
        &self.signal
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

struct SlotInner<T> {
    generation: u64,
    state: LoadState<T>,
    current: Option<AbortHandle>,
}

/// Holds the result of the latest load; older loads can't overwrite it.
pub struct LoadSlot<T> {
    inner: Mutex<SlotInner<T>>,
}

impl<T> Default for LoadSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LoadSlot<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(SlotInner {
                generation: 0,
                state: LoadState::Idle,
                current: None,
            }),
        }
    }

    /// Starts a new load, aborting whichever load was in progress.
    pub fn begin(&self) -> LoadTicket {
        let mut inner = self.inner.lock();
        if let Some(previous) = inner.current.take() {
            log::debug!("Load {} superseded", inner.generation);
            previous.abort();
        }

        inner.generation += 1;
        inner.state = LoadState::Loading;
        let (handle, signal) = AbortHandle::new();
        inner.current = Some(handle);

        LoadTicket {
            generation: inner.generation,
            signal,
        }
    }

    /// Publishes a finished load. Returns `false`, leaving the slot untouched,
    /// when the ticket was superseded or aborted.
    pub fn complete(&self, ticket: &LoadTicket, result: Result<T, AppError>) -> bool {
        let mut inner = self.inner.lock();
        if ticket.generation != inner.generation || ticket.signal.is_aborted() {
            log::debug!(
                "Discarding result of load {} (current is {})",
                ticket.generation,
                inner.generation
            );
            return false;
        }

        inner.state = match result {
            Ok(value) => LoadState::Ready(value),
            Err(e) => LoadState::Failed(e.to_string()),
        };
        inner.current = None;
        true
    }

    /// Aborts the load in progress, if any. A slot that was loading goes back
    /// to `Idle`; a published result stays.
    pub fn abort(&self) {
        let mut inner = self.inner.lock();
        if let Some(handle) = inner.current.take() {
            log::debug!("Load {} aborted", inner.generation);
            handle.abort();
            if matches!(inner.state, LoadState::Loading) {
                inner.state = LoadState::Idle;
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.inner.lock().state, LoadState::Loading)
    }

    /// Runs `load` under a fresh ticket and publishes its result if it is
    /// still current when it finishes. Returns whether it was published.
    pub async fn run<F, Fut>(&self, load: F) -> bool
    where
        F: FnOnce(AbortSignal) -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        let ticket = self.begin();
        let result = load(ticket.signal().clone()).await;
        self.complete(&ticket, result)
    }
}

impl<T: Clone> LoadSlot<T> {
    pub fn state(&self) -> LoadState<T> {
        self.inner.lock().state.clone()
    }
}
