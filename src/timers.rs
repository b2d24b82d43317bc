use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};
use tracing::trace;

static NEXT_TIMER_ID: AtomicU32 = AtomicU32::new(1);

pub type TimerId = u32;

struct TimerHandle {
    cancel_tx: mpsc::UnboundedSender<()>,
}

/// One-shot timers with host-pumped delivery. A scheduled timeout stays
/// registered until it is drained or cleared; clearing always wins, even
/// when the clear lands after the sleep completed but before the next
/// drain.
pub struct TimerRegistry {
    tokio_handle: Handle,
    timers: Mutex<HashMap<TimerId, TimerHandle>>,
    fired_tx: mpsc::UnboundedSender<TimerId>,
    fired_rx: Mutex<mpsc::UnboundedReceiver<TimerId>>,
}

impl TimerRegistry {
    /// Must be called from within a tokio runtime.
    pub fn new() -> Self {
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();
        Self {
            tokio_handle: Handle::current(),
            timers: Mutex::new(HashMap::new()),
            fired_tx,
            fired_rx: Mutex::new(fired_rx),
        }
    }

    /// Schedule a one-shot timer.
    pub fn set_timeout(&self, delay: Duration) -> TimerId {
        let timer_id = NEXT_TIMER_ID.fetch_add(1, Ordering::SeqCst);
        let fired_tx = self.fired_tx.clone();
        let (cancel_tx, mut cancel_rx) = mpsc::unbounded_channel();

        self.tokio_handle.spawn(async move {
            tokio::select! {
                _ = sleep(delay) => {
                    let _ = fired_tx.send(timer_id);
                }
                _ = cancel_rx.recv() => {
                    // Timer was cancelled
                }
            }
        });

        self.timers
            .lock()
            .unwrap()
            .insert(timer_id, TimerHandle { cancel_tx });
        trace!(target = "timers", timer_id, delay_ms = delay.as_millis() as u64, "armed timeout");
        timer_id
    }

    pub fn clear(&self, timer_id: TimerId) {
        if let Some(handle) = self
            .timers
            .lock()
            .unwrap()
            .remove(&timer_id)
        {
            let _ = handle.cancel_tx.send(());
            trace!(target = "timers", timer_id, "cleared timeout");
        }
    }

    /// Collect the timers that have fired since the last drain. Ids cleared
    /// after firing are skipped, so a cancelled timer is never observed as
    /// due. Drained ids are unregistered.
    pub fn drain_fired(&self) -> Vec<TimerId> {
        let mut fired = Vec::new();
        let mut rx = self
            .fired_rx
            .lock()
            .unwrap();
        while let Ok(timer_id) = rx.try_recv() {
            if self
                .timers
                .lock()
                .unwrap()
                .remove(&timer_id)
                .is_some()
            {
                fired.push(timer_id);
            }
        }
        fired
    }

    pub fn pending_count(&self) -> usize {
        self.timers
            .lock()
            .unwrap()
            .len()
    }

    pub fn clear_all(&self) {
        let mut timers = self.timers.lock().unwrap();
        for (_, handle) in timers.drain() {
            let _ = handle.cancel_tx.send(());
        }
    }
}

impl Default for TimerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TimerRegistry {
    fn drop(&mut self) {
        self.clear_all();
    }
}
