//! Mutex whose wait can be abandoned.
//!
//! A caller holds a [`CancelToken`]; cancelling it makes any lock wait on
//! behalf of that caller return [`HangmanError::Interrupted`]. An
//! uncontended lock is always granted, even with the token cancelled.
//!
//! Waiters queue in arrival order and sleep until the holder hands the lock
//! to the front of the queue, or until their token is cancelled.

use crate::error::{HangmanError, Result};
use std::collections::VecDeque;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, Thread};

#[derive(Debug, Default)]
struct TokenState {
    cancelled: AtomicBool,
    // Threads currently waiting on a lock with this token.
    sleepers: Mutex<Vec<Thread>>,
}

/// Shared cancellation flag for one caller.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    state: Arc<TokenState>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag and wake every wait made with this token.
    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::SeqCst);
        for sleeper in lock_ignoring_poison(&self.state.sleepers).iter() {
            sleeper.unpark();
        }
    }

    /// Clear a previous cancellation so the caller can retry.
    pub fn reset(&self) {
        self.state.cancelled.store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }

    fn register(&self) -> Registration<'_> {
        let current = thread::current();
        let id = current.id();
        lock_ignoring_poison(&self.state.sleepers).push(current);
        Registration { token: self, id }
    }
}

// Removes the current thread from the token's wake list when dropped.
struct Registration<'a> {
    token: &'a CancelToken,
    id: thread::ThreadId,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        let mut sleepers = lock_ignoring_poison(&self.token.state.sleepers);
        if let Some(pos) = sleepers.iter().position(|t| t.id() == self.id) {
            sleepers.swap_remove(pos);
        }
    }
}

#[derive(Debug)]
struct Waiter {
    thread: Thread,
    granted: AtomicBool,
}

#[derive(Debug, Default)]
struct Gate {
    held: bool,
    queue: VecDeque<Arc<Waiter>>,
}

/// FIFO mutex with cancellable waits.
///
/// Ownership passes straight from the releasing holder to the oldest
/// waiter, so a late arrival can never overtake a queued one.
#[derive(Debug, Default)]
pub struct InterruptibleMutex<T> {
    gate: Mutex<Gate>,
    value: Mutex<T>,
}

/// Exclusive access to the value of an [`InterruptibleMutex`].
#[derive(Debug)]
pub struct LockGuard<'a, T> {
    value: MutexGuard<'a, T>,
    gate: &'a Mutex<Gate>,
}

impl<T> InterruptibleMutex<T> {
    pub fn new(value: T) -> Self {
        Self {
            gate: Mutex::new(Gate::default()),
            value: Mutex::new(value),
        }
    }

    /// Block until the lock is handed over or `cancel` fires.
    ///
    /// A poisoned lock is recovered: holders only ever commit by replacing
    /// whole values, so a panic cannot leave the data half-written.
    pub fn lock(&self, cancel: &CancelToken) -> Result<LockGuard<'_, T>> {
        let waiter = {
            let mut gate = lock_ignoring_poison(&self.gate);
            if !gate.held {
                gate.held = true;
                return Ok(self.admit());
            }
            let waiter = Arc::new(Waiter {
                thread: thread::current(),
                granted: AtomicBool::new(false),
            });
            gate.queue.push_back(Arc::clone(&waiter));
            waiter
        };

        let _registration = cancel.register();
        loop {
            if waiter.granted.load(Ordering::Acquire) {
                return Ok(self.admit());
            }
            if cancel.is_cancelled() {
                return self.abandon(&waiter);
            }
            thread::park();
        }
    }

    // Grants happen under the gate lock, so checking again under it
    // settles a cancel that races with a hand-over.
    fn abandon(&self, waiter: &Arc<Waiter>) -> Result<LockGuard<'_, T>> {
        let mut gate = lock_ignoring_poison(&self.gate);
        if waiter.granted.load(Ordering::Acquire) {
            drop(gate);
            return Ok(self.admit());
        }
        gate.queue.retain(|queued| !Arc::ptr_eq(queued, waiter));
        Err(HangmanError::Interrupted)
    }

    fn admit(&self) -> LockGuard<'_, T> {
        LockGuard {
            value: lock_ignoring_poison(&self.value),
            gate: &self.gate,
        }
    }

    #[cfg(test)]
    pub(crate) fn queued(&self) -> usize {
        lock_ignoring_poison(&self.gate).queue.len()
    }

    pub fn into_inner(self) -> T {
        self.value.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Deref for LockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> DerefMut for LockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T> Drop for LockGuard<'_, T> {
    fn drop(&mut self) {
        let mut gate = lock_ignoring_poison(self.gate);
        match gate.queue.pop_front() {
            Some(next) => {
                next.granted.store(true, Ordering::Release);
                next.thread.unpark();
            }
            None => gate.held = false,
        }
    }
}

fn lock_ignoring_poison<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wait_for_queue<T>(mutex: &InterruptibleMutex<T>, len: usize) {
        while mutex.queued() < len {
            thread::yield_now();
        }
    }

    #[test]
    fn test_uncontended_lock_ignores_cancellation() {
        let mutex = InterruptibleMutex::new(5);
        let cancel = CancelToken::new();
        cancel.cancel();
        assert_eq!(*mutex.lock(&cancel).unwrap(), 5);
    }

    #[test]
    fn test_cancel_aborts_wait() {
        let mutex = InterruptibleMutex::new(0);
        let holder = CancelToken::new();
        let waiter = CancelToken::new();
        let guard = mutex.lock(&holder).unwrap();

        thread::scope(|s| {
            let (mutex, waiter) = (&mutex, &waiter);
            let handle = s.spawn(move || mutex.lock(waiter).map(|_| ()));
            wait_for_queue(mutex, 1);
            waiter.cancel();
            assert_eq!(handle.join().unwrap(), Err(HangmanError::Interrupted));
        });

        assert_eq!(mutex.queued(), 0);
        drop(guard);
        waiter.reset();
        assert!(mutex.lock(&waiter).is_ok());
    }

    #[test]
    fn test_waiters_are_served_in_arrival_order() {
        let mutex = InterruptibleMutex::new(Vec::new());
        let cancel = CancelToken::new();
        let guard = mutex.lock(&cancel).unwrap();

        thread::scope(|s| {
            for i in 0..3 {
                let (mutex, cancel) = (&mutex, &cancel);
                s.spawn(move || mutex.lock(cancel).unwrap().push(i));
                wait_for_queue(mutex, i + 1);
            }
            drop(guard);
        });

        assert_eq!(mutex.into_inner(), vec![0, 1, 2]);
    }

    #[test]
    fn test_cancelled_waiter_leaves_queue() {
        let mutex = InterruptibleMutex::new(Vec::new());
        let holder = CancelToken::new();
        let quitter = CancelToken::new();
        let guard = mutex.lock(&holder).unwrap();

        thread::scope(|s| {
            let (mutex, quitter, holder) = (&mutex, &quitter, &holder);
            let first = s.spawn(move || mutex.lock(quitter).map(|mut g| g.push("quitter")));
            wait_for_queue(mutex, 1);
            let second = s.spawn(move || mutex.lock(holder).map(|mut g| g.push("patient")));
            wait_for_queue(mutex, 2);

            quitter.cancel();
            assert_eq!(first.join().unwrap(), Err(HangmanError::Interrupted));
            drop(guard);
            assert_eq!(second.join().unwrap(), Ok(()));
        });

        assert_eq!(mutex.into_inner(), vec!["patient"]);
    }

    #[test]
    fn test_contended_lock_counts_every_push() {
        let mutex = InterruptibleMutex::new(Vec::new());
        let cancel = CancelToken::new();

        thread::scope(|s| {
            for i in 0..4 {
                let mutex = &mutex;
                let cancel = &cancel;
                s.spawn(move || {
                    for j in 0..25 {
                        mutex.lock(cancel).unwrap().push(i * 100 + j);
                    }
                });
            }
        });

        assert_eq!(mutex.into_inner().len(), 100);
    }

    #[test]
    fn test_poisoned_lock_recovers() {
        let mutex = InterruptibleMutex::new(1);
        let cancel = CancelToken::new();
        let _ = thread::scope(|s| {
            s.spawn(|| {
                let _guard = mutex.lock(&cancel).unwrap();
                panic!("poison the lock");
            })
            .join()
        });
        assert_eq!(*mutex.lock(&cancel).unwrap(), 1);
    }

    #[test]
    fn test_cancel_before_wait_returns_promptly() {
        let mutex = InterruptibleMutex::new(());
        let holder = CancelToken::new();
        let waiter = CancelToken::new();
        let _guard = mutex.lock(&holder).unwrap();
        waiter.cancel();

        thread::scope(|s| {
            let handle = s.spawn(|| mutex.lock(&waiter).map(|_| ()));
            assert_eq!(handle.join().unwrap(), Err(HangmanError::Interrupted));
        });
    }
}
