//! Cooperative suspension and cancellation primitives.
//!
//! Both are shared between the foreground session and its worker thread and
//! are the only state legitimately touched from both sides.
//!
//! - [`PauseGate`]: binary open/closed signal; the worker blocks on
//!   [`PauseGate::wait_open`] at generation boundaries.
//! - [`CancelToken`]: one-shot stop flag checked right after the gate.
//!
//! Stopping a paused run must raise the token *before* opening the gate so
//! the woken worker observes cancellation instead of starting another
//! generation. [`stop`] does exactly that.

use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct GateInner {
    open: Mutex<bool>,
    cond: Condvar,
}

/// Binary suspend/resume signal, initially open.
///
/// Cloning yields another handle to the same gate.
#[derive(Debug, Clone)]
pub struct PauseGate {
    inner: Arc<GateInner>,
}

impl Default for PauseGate {
    fn default() -> Self {
        Self::new()
    }
}

impl PauseGate {
    /// Creates an open gate.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(GateInner {
                open: Mutex::new(true),
                cond: Condvar::new(),
            }),
        }
    }

    /// Closes the gate; waiters block from their next call on.
    pub fn close(&self) {
        *self.inner.open.lock() = false;
    }

    /// Opens the gate and wakes every waiter.
    pub fn open(&self) {
        let mut open = self.inner.open.lock();
        *open = true;
        self.inner.cond.notify_all();
    }

    pub fn is_open(&self) -> bool {
        *self.inner.open.lock()
    }

    /// Blocks the calling thread until the gate is open.
    pub fn wait_open(&self) {
        let mut open = self.inner.open.lock();
        while !*open {
            self.inner.cond.wait(&mut open);
        }
    }
}

/// One-shot cooperative stop flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Raises `cancel`, then opens `gate`, so a paused worker wakes into a
/// cancelled state.
pub fn stop(cancel: &CancelToken, gate: &PauseGate) {
    cancel.cancel();
    gate.open();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_gate_starts_open() {
        let gate = PauseGate::new();
        assert!(gate.is_open());
        gate.wait_open();
    }

    #[test]
    fn test_gate_blocks_until_opened_from_other_thread() {
        let gate = PauseGate::new();
        gate.close();
        let passed = Arc::new(AtomicUsize::new(0));

        let waiter = {
            let gate = gate.clone();
            let passed = passed.clone();
            thread::spawn(move || {
                gate.wait_open();
                passed.fetch_add(1, Ordering::SeqCst);
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert_eq!(passed.load(Ordering::SeqCst), 0, "waiter passed a closed gate");

        gate.open();
        waiter.join().unwrap();
        assert_eq!(passed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancel_token_shared_between_clones() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn test_stop_wakes_paused_waiter_into_cancellation() {
        let gate = PauseGate::new();
        let cancel = CancelToken::new();
        gate.close();

        let waiter = {
            let gate = gate.clone();
            let cancel = cancel.clone();
            thread::spawn(move || {
                gate.wait_open();
                cancel.is_cancelled()
            })
        };

        thread::sleep(Duration::from_millis(20));
        stop(&cancel, &gate);
        assert!(waiter.join().unwrap(), "woken waiter must see cancellation");
    }
}
