//! # Builder Events
//!
//! Typed events emitted by the builder and a synchronous bus to deliver them.
//!
//! Listeners for the same [`EventKind`] run in registration order. A listener
//! that returns an error or panics is logged and skipped; the remaining
//! listeners still run and the emitting operation is unaffected.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use wb_common::ComponentNode;

/// Events emitted by the builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BuilderEvent {
    /// Default components and plugins are loaded
    Initialized,

    /// A node (and its subtree) was inserted
    NodeAdded { node: ComponentNode },

    /// A node and all of its descendants were removed
    #[serde(rename_all = "camelCase")]
    NodeRemoved { id: String, removed_ids: Vec<String> },

    /// A node's fields were replaced
    NodeUpdated { node: ComponentNode },

    /// A node changed parent or position
    #[serde(rename_all = "camelCase")]
    NodeMoved {
        id: String,
        parent_id: Option<String>,
        index: usize,
    },

    SelectionChanged {
        selected: Vec<String>,
        active: Option<String>,
    },

    /// State was replaced wholesale (undo/redo, rollback)
    #[serde(rename_all = "camelCase")]
    StateChanged { can_undo: bool, can_redo: bool },

    TreeCleared,

    #[serde(rename_all = "camelCase")]
    TemplateLoaded { template_id: String },

    ComponentsImported { ids: Vec<String> },

    CanvasChanged,

    PluginActivated { id: String },

    Destroyed,
}

/// Discriminant used to subscribe to a family of events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Initialized,
    NodeAdded,
    NodeRemoved,
    NodeUpdated,
    NodeMoved,
    SelectionChanged,
    StateChanged,
    TreeCleared,
    TemplateLoaded,
    ComponentsImported,
    CanvasChanged,
    PluginActivated,
    Destroyed,
}

impl BuilderEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            BuilderEvent::Initialized => EventKind::Initialized,
            BuilderEvent::NodeAdded { .. } => EventKind::NodeAdded,
            BuilderEvent::NodeRemoved { .. } => EventKind::NodeRemoved,
            BuilderEvent::NodeUpdated { .. } => EventKind::NodeUpdated,
            BuilderEvent::NodeMoved { .. } => EventKind::NodeMoved,
            BuilderEvent::SelectionChanged { .. } => EventKind::SelectionChanged,
            BuilderEvent::StateChanged { .. } => EventKind::StateChanged,
            BuilderEvent::TreeCleared => EventKind::TreeCleared,
            BuilderEvent::TemplateLoaded { .. } => EventKind::TemplateLoaded,
            BuilderEvent::ComponentsImported { .. } => EventKind::ComponentsImported,
            BuilderEvent::CanvasChanged => EventKind::CanvasChanged,
            BuilderEvent::PluginActivated { .. } => EventKind::PluginActivated,
            BuilderEvent::Destroyed => EventKind::Destroyed,
        }
    }
}

/// Boxed event listener
pub type Listener = Box<dyn FnMut(&BuilderEvent) -> anyhow::Result<()>>;

/// Handle returned by [`EventBus::on`] and [`EventBus::once`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Registration {
    id: ListenerId,
    once: bool,
    listener: Listener,
}

/// Synchronous publish/subscribe bus
#[derive(Default)]
pub struct EventBus {
    listeners: HashMap<EventKind, Vec<Registration>>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to every event of `kind`
    pub fn on<F>(&mut self, kind: EventKind, listener: F) -> ListenerId
    where
        F: FnMut(&BuilderEvent) -> anyhow::Result<()> + 'static,
    {
        self.register(kind, false, Box::new(listener))
    }

    /// Subscribe to the next event of `kind` only
    pub fn once<F>(&mut self, kind: EventKind, listener: F) -> ListenerId
    where
        F: FnMut(&BuilderEvent) -> anyhow::Result<()> + 'static,
    {
        self.register(kind, true, Box::new(listener))
    }

    /// Unsubscribe. Returns false if the listener was not registered.
    pub fn off(&mut self, kind: EventKind, id: ListenerId) -> bool {
        let Some(registrations) = self.listeners.get_mut(&kind) else {
            return false;
        };
        let before = registrations.len();
        registrations.retain(|registration| registration.id != id);
        before != registrations.len()
    }

    /// Deliver `event` to its listeners, returning how many were called
    pub fn emit(&mut self, event: &BuilderEvent) -> usize {
        let kind = event.kind();
        let Some(registrations) = self.listeners.get_mut(&kind) else {
            return 0;
        };

        for registration in registrations.iter_mut() {
            let listener = &mut registration.listener;
            match panic::catch_unwind(AssertUnwindSafe(|| listener(event))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    warn!(event = ?kind, listener = registration.id.0, error = %err, "Event listener failed");
                }
                Err(_) => {
                    error!(event = ?kind, listener = registration.id.0, "Event listener panicked");
                }
            }
        }

        let delivered = registrations.len();
        registrations.retain(|registration| !registration.once);
        delivered
    }

    /// Clear listeners for one event kind, or for all kinds
    pub fn remove_all_listeners(&mut self, kind: Option<EventKind>) {
        match kind {
            Some(kind) => {
                self.listeners.remove(&kind);
            }
            None => self.listeners.clear(),
        }
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }

    fn register(&mut self, kind: EventKind, once: bool, listener: Listener) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.entry(kind).or_default().push(Registration { id, once, listener });
        id
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<&EventKind, usize> =
            self.listeners.iter().map(|(kind, list)| (kind, list.len())).collect();
        f.debug_struct("EventBus").field("listeners", &counts).finish()
    }
}
