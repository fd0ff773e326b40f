//! Background autosave worker.
//!
//! # Responsibility
//! - Host a store behind a lock and flush due saves from a worker thread.
//! - Guarantee a final flush on shutdown.
//!
//! # Invariants
//! - Writes happen only while holding the store lock, so at most one write
//!   is in flight and writes apply in mutation order.
//! - `shutdown` (or drop) stops the worker before the final flush.

use crate::repo::kv_repo::KvRepository;
use crate::store::Store;
use log::{info, warn};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

/// Shared store plus the thread that ticks it.
pub struct AutosaveHandle<R: KvRepository + Send + 'static> {
    store: Arc<Mutex<Store<R>>>,
    stop_tx: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl<R: KvRepository + Send + 'static> AutosaveHandle<R> {
    /// Moves `store` behind a lock and starts ticking it every
    /// `config().autosave_poll_interval`.
    pub fn spawn(store: Store<R>) -> std::io::Result<Self> {
        let poll_interval = store.config().autosave_poll_interval;
        let store = Arc::new(Mutex::new(store));
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let worker_store = Arc::clone(&store);
        let worker = std::thread::Builder::new()
            .name("routine-autosave".to_string())
            .spawn(move || loop {
                match stop_rx.recv_timeout(poll_interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        lock_store(&worker_store).tick();
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;

        info!(
            "event=autosave_start module=autosave status=ok poll_ms={}",
            poll_interval.as_millis()
        );
        Ok(Self {
            store,
            stop_tx: Some(stop_tx),
            worker: Some(worker),
        })
    }

    /// Runs `f` with exclusive access to the store.
    pub fn with_store<T>(&self, f: impl FnOnce(&mut Store<R>) -> T) -> T {
        f(&mut lock_store(&self.store))
    }

    /// Stops the worker and forces a final flush.
    ///
    /// Returns whether the final flush wrote anything.
    pub fn shutdown(mut self) -> bool {
        self.stop_worker()
    }

    fn stop_worker(&mut self) -> bool {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("event=autosave_stop module=autosave status=error error=worker_panicked");
            }
        }
        let flushed = lock_store(&self.store).flush_now();
        info!(
            "event=autosave_stop module=autosave status=ok final_flush={}",
            flushed
        );
        flushed
    }
}

impl<R: KvRepository + Send + 'static> Drop for AutosaveHandle<R> {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.stop_worker();
        }
    }
}

fn lock_store<R: KvRepository>(store: &Mutex<Store<R>>) -> MutexGuard<'_, Store<R>> {
    // A panic inside `with_store` must not lose the data still in memory.
    store.lock().unwrap_or_else(PoisonError::into_inner)
}
