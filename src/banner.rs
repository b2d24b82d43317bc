use tokio::time::Duration;
use tracing::{debug, trace};

use crate::dom::{DomAdapter, NodeId};
use crate::events::{BannerAction, EventKind, ListenerRegistry};
use crate::store::{ClientStore, StoreError};
use crate::timers::{TimerId, TimerRegistry};

/// Element id of the dismissible error panel.
pub const BANNER_ID: &str = "error-message-div";
/// Class naming the banner's close control.
pub const CLOSE_CONTROL_CLASS: &str = "close-error-div";
/// Data flag marking the close control's click listener as attached.
pub const LISTENER_BOUND_FLAG: &str = "listenerAdded";
/// How long the banner stays up without interaction.
pub const DISMISS_DELAY: Duration = Duration::from_millis(5000);
/// Cadence at which hosts are expected to run the synchronization pass.
pub const SYNC_INTERVAL: Duration = Duration::from_millis(500);

/// Result of a synchronization pass. `NoUpdate` tells the host to skip
/// re-rendering; `Updated` carries the new serialized blob to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    NoUpdate,
    Updated(String),
}

/// Client-side intent shared between DOM callbacks and the poll loop: the
/// pending-dismiss flag and the armed countdown timer. The flag is
/// OR-accumulated and consumed exactly once per synchronization read.
#[derive(Debug, Default)]
pub struct DismissState {
    pending: bool,
    armed_timer: Option<TimerId>,
}

impl DismissState {
    pub fn request_dismiss(&mut self) {
        self.pending = true;
    }

    pub fn consume_dismiss_request(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    pub fn is_dismiss_requested(&self) -> bool {
        self.pending
    }

    /// Arm a fresh countdown, cancelling any previous one so at most one
    /// timer is outstanding.
    pub fn arm_timer(&mut self, timers: &TimerRegistry, delay: Duration) -> TimerId {
        self.cancel_timer(timers);
        let timer_id = timers.set_timeout(delay);
        self.armed_timer = Some(timer_id);
        timer_id
    }

    pub fn cancel_timer(&mut self, timers: &TimerRegistry) {
        if let Some(timer_id) = self.armed_timer.take() {
            timers.clear(timer_id);
        }
    }

    pub fn armed_timer(&self) -> Option<TimerId> {
        self.armed_timer
    }

    fn take_armed(&mut self) -> Option<TimerId> {
        self.armed_timer.take()
    }
}

/// Per-page singleton driving the visibility lifecycle of the error banner.
///
/// The host calls in on four occasions: when the banner's class name changes
/// ([`refresh_banner`](Self::refresh_banner)), when a DOM event lands on a
/// bound element ([`handle_event`](Self::handle_event)), when it pumps
/// deferred callbacks ([`poll_timers`](Self::poll_timers)), and on the
/// periodic synchronization tick ([`sync`](Self::sync)).
pub struct DismissController {
    state: DismissState,
    timers: TimerRegistry,
    listeners: ListenerRegistry,
}

impl DismissController {
    /// Must be called from within a tokio runtime.
    pub fn new() -> Self {
        Self {
            state: DismissState::default(),
            timers: TimerRegistry::new(),
            listeners: ListenerRegistry::new(),
        }
    }

    /// Re-arm the auto-dismiss countdown and refresh listener bindings.
    ///
    /// The host invokes this on every visibility-relevant render pass with
    /// the banner's current class name. The argument is only a change
    /// trigger; the live tree is re-read. Does nothing when the banner is
    /// absent or already hidden.
    pub fn refresh_banner(&mut self, dom: &mut dyn DomAdapter, class_name: &str) {
        trace!(target = "banner", class_name, "binder invoked");

        let Some(banner) = dom.element_by_id(BANNER_ID) else {
            return;
        };
        if dom.is_hidden(banner) {
            return;
        }

        self.state.arm_timer(&self.timers, DISMISS_DELAY);

        // Hovering holds the banner open; leaving restarts a full countdown.
        self.listeners
            .bind(banner, EventKind::PointerEnter, BannerAction::PauseCountdown);
        self.listeners
            .bind(banner, EventKind::PointerLeave, BannerAction::RestartCountdown);

        let Some(close) = dom.descendant_with_class(banner, CLOSE_CONTROL_CLASS) else {
            return;
        };
        if dom.data_flag(close, LISTENER_BOUND_FLAG) {
            return;
        }
        self.listeners
            .bind(close, EventKind::Click, BannerAction::RequestDismiss);
        dom.set_data_flag(close, LISTENER_BOUND_FLAG);
        debug!(target = "banner", node = close, "bound close control");
    }

    /// Deliver a DOM event that landed on `node`. Events on elements
    /// without a bound listener are ignored.
    pub fn handle_event(&mut self, dom: &dyn DomAdapter, node: NodeId, kind: EventKind) {
        let Some(action) = self.listeners.dispatch(node, kind) else {
            return;
        };
        match action {
            BannerAction::RequestDismiss => {
                if !banner_hidden(dom) {
                    self.state.request_dismiss();
                    debug!(target = "banner", "close clicked, dismissal requested");
                }
            }
            BannerAction::PauseCountdown => self.state.cancel_timer(&self.timers),
            BannerAction::RestartCountdown => {
                self.state.arm_timer(&self.timers, DISMISS_DELAY);
            }
        }
    }

    /// Pump fired countdown timers. A countdown that fires only requests a
    /// dismissal if the banner is still visible at pump time. Returns the
    /// number of countdowns that ran.
    pub fn poll_timers(&mut self, dom: &dyn DomAdapter) -> usize {
        let mut ran = 0;
        for timer_id in self.timers.drain_fired() {
            if self.state.armed_timer() != Some(timer_id) {
                continue;
            }
            self.state.take_armed();
            ran += 1;
            if !banner_hidden(dom) {
                self.state.request_dismiss();
                debug!(target = "banner", timer_id, "countdown elapsed, dismissal requested");
            }
        }
        ran
    }

    /// The periodic synchronization pass: merge any pending dismissal into
    /// the shared state blob.
    ///
    /// The blob is parsed first, so malformed text fails fatally and leaves
    /// the pending flag intact. With no dismissal pending the blob is left
    /// untouched and [`SyncOutcome::NoUpdate`] tells the host to skip
    /// re-rendering. Otherwise the flag is consumed exactly once and the
    /// banner's entry gains the hidden token. No DOM access happens here;
    /// applying the returned blob is the host's render step.
    pub fn sync(&mut self, tick: u64, store_blob: &str) -> Result<SyncOutcome, StoreError> {
        let mut store = ClientStore::parse(store_blob)?;

        if !self.state.consume_dismiss_request() {
            return Ok(SyncOutcome::NoUpdate);
        }

        store.mark_hidden(BANNER_ID);
        debug!(target = "banner", tick, "dismissal merged into shared state");
        Ok(SyncOutcome::Updated(store.to_json()?))
    }

    pub fn dismiss_requested(&self) -> bool {
        self.state.is_dismiss_requested()
    }

    pub fn countdown_armed(&self) -> bool {
        self.state.armed_timer().is_some()
    }

    /// Outstanding timers in the underlying registry. At most one, by
    /// construction.
    pub fn pending_timer_count(&self) -> usize {
        self.timers.pending_count()
    }
}

impl Default for DismissController {
    fn default() -> Self {
        Self::new()
    }
}

fn banner_hidden(dom: &dyn DomAdapter) -> bool {
    match dom.element_by_id(BANNER_ID) {
        Some(banner) => dom.is_hidden(banner),
        None => true,
    }
}
