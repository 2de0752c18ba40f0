//! Service registry: candidate services and their keywords.
//!
//! The registry keeps definitions in insertion order and fans mutation
//! events out to listeners. Mutations and their notifications are
//! serialized under a single notify lock, so every listener observes a
//! `register` for an id before any subsequent `deregister` of that id.

use crate::error::{RouterError, RouterResult};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Registry record describing a candidate downstream service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    id: String,
    display_name: String,
    keywords: Vec<String>,
}

impl ServiceDefinition {
    /// Create a definition.
    ///
    /// # Errors
    /// Returns `Configuration` if the id is blank or any keyword is blank.
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        keywords: Vec<String>,
    ) -> RouterResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(RouterError::configuration("service id must not be blank"));
        }
        if keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(RouterError::configuration(format!(
                "service '{id}' has a blank keyword"
            )));
        }
        Ok(Self {
            id,
            display_name: display_name.into(),
            keywords,
        })
    }

    /// Unique service id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human-readable display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Keywords associated with the service, in declaration order.
    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

/// Callback capability for registry mutations.
///
/// Callbacks run after the mutation is visible to readers and must not
/// mutate the registry re-entrantly (they would deadlock on the notify
/// lock).
pub trait RegistryListener: Send + Sync {
    /// A definition was registered (or replaced).
    fn on_register(&self, definition: &ServiceDefinition);

    /// A definition was removed.
    fn on_deregister(&self, id: &str);
}

#[derive(Default)]
struct RegistryState {
    // Insertion-ordered definitions plus an id -> position index.
    definitions: Vec<ServiceDefinition>,
    index: HashMap<String, usize>,
}

/// Thread-safe, insertion-ordered service registry.
#[derive(Default)]
pub struct ServiceRegistry {
    state: RwLock<RegistryState>,
    listeners: RwLock<Vec<Arc<dyn RegistryListener>>>,
    // Serializes mutation + notification so listeners observe events in
    // mutation order.
    notify_lock: Mutex<()>,
}

impl ServiceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with definitions.
    ///
    /// # Errors
    /// Returns `Configuration` if two definitions share an id.
    pub fn with_definitions(definitions: Vec<ServiceDefinition>) -> RouterResult<Self> {
        let registry = Self::new();
        {
            let mut state = registry.state.write();
            for def in definitions {
                if state.index.contains_key(def.id()) {
                    return Err(RouterError::configuration(format!(
                        "duplicate service id '{}'",
                        def.id()
                    )));
                }
                let pos = state.definitions.len();
                state.index.insert(def.id().to_string(), pos);
                state.definitions.push(def);
            }
        }
        Ok(registry)
    }

    /// All definitions in insertion order.
    #[must_use]
    pub fn list(&self) -> Vec<ServiceDefinition> {
        self.state.read().definitions.clone()
    }

    /// Look up a definition by id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<ServiceDefinition> {
        let state = self.state.read();
        state.index.get(id).map(|&pos| state.definitions[pos].clone())
    }

    /// Number of registered services.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().definitions.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.read().definitions.is_empty()
    }

    /// Register a definition, replacing any existing one with the same id
    /// (the replacement keeps its insertion position). Fires `on_register`.
    pub fn register(&self, definition: ServiceDefinition) {
        let _serial = self.notify_lock.lock();
        {
            let mut state = self.state.write();
            match state.index.get(definition.id()).copied() {
                Some(pos) => {
                    debug!(service = %definition.id(), "replacing service definition");
                    state.definitions[pos] = definition.clone();
                }
                None => {
                    let pos = state.definitions.len();
                    state.index.insert(definition.id().to_string(), pos);
                    state.definitions.push(definition.clone());
                }
            }
        }
        info!(service = %definition.id(), keywords = definition.keywords().len(), "service registered");
        for listener in self.listeners.read().iter() {
            listener.on_register(&definition);
        }
    }

    /// Remove a definition by id. Fires `on_deregister` when something was
    /// removed; a miss is a no-op.
    pub fn deregister(&self, id: &str) -> bool {
        let _serial = self.notify_lock.lock();
        let removed = {
            let mut state = self.state.write();
            match state.index.remove(id) {
                Some(pos) => {
                    state.definitions.remove(pos);
                    for slot in state.index.values_mut() {
                        if *slot > pos {
                            *slot -= 1;
                        }
                    }
                    true
                }
                None => false,
            }
        };
        if removed {
            info!(service = %id, "service deregistered");
            for listener in self.listeners.read().iter() {
                listener.on_deregister(id);
            }
        }
        removed
    }

    /// Attach a listener. It will observe mutations from this point on.
    pub fn subscribe(&self, listener: Arc<dyn RegistryListener>) {
        self.listeners.write().push(listener);
    }
}

impl std::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("services", &self.len())
            .field("listeners", &self.listeners.read().len())
            .finish()
    }
}
