use std::collections::HashMap;

use crate::dom::NodeId;

/// DOM event kinds the banner lifecycle reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    PointerEnter,
    PointerLeave,
}

/// What a bound listener asks the dismiss state machine to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerAction {
    RequestDismiss,
    PauseCountdown,
    RestartCountdown,
}

/// (node, event kind) → action bindings. A slot holds at most one listener;
/// rebinding an occupied slot is a no-op, so repeated render passes never
/// accumulate duplicates.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    listeners: HashMap<(NodeId, EventKind), BannerAction>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `action` to (`node`, `kind`). Returns whether a new binding
    /// was installed.
    pub fn bind(&mut self, node: NodeId, kind: EventKind, action: BannerAction) -> bool {
        if self.listeners.contains_key(&(node, kind)) {
            return false;
        }
        self.listeners.insert((node, kind), action);
        true
    }

    pub fn is_bound(&self, node: NodeId, kind: EventKind) -> bool {
        self.listeners.contains_key(&(node, kind))
    }

    /// Resolve an event delivered by the host to the bound action, if any.
    pub fn dispatch(&self, node: NodeId, kind: EventKind) -> Option<BannerAction> {
        self.listeners.get(&(node, kind)).copied()
    }
}
