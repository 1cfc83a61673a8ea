use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use super::command::{CommandDefinition, CommandSpec};
use super::handler::GuardedHandler;

/// A command as stored in the registry. Only the guarded handler is kept;
/// the raw handler is not reachable from here.
pub struct RegisteredCommand {
    spec: CommandSpec,
    handler: GuardedHandler,
    /// Position in listing order, fixed when the name is first registered.
    seq: u64,
}

impl RegisteredCommand {
    pub fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn handler(&self) -> &GuardedHandler {
        &self.handler
    }
}

/// Process-wide map from command name to command.
///
/// Each slot holds an `Arc` that is swapped whole on re-registration, so a
/// reader holding a looked-up command keeps a consistent view even while the
/// name is replaced.
pub struct CommandRegistry {
    commands: DashMap<String, Arc<RegisteredCommand>>,
    next_seq: AtomicU64,
    handler_timeout: Option<Duration>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::with_handler_timeout(None)
    }

    /// Handlers registered here are bounded by `timeout`.
    pub fn with_handler_timeout(timeout: Option<Duration>) -> Self {
        Self {
            commands: DashMap::new(),
            next_seq: AtomicU64::new(0),
            handler_timeout: timeout,
        }
    }

    /// Insert or replace by name. A replaced command keeps its listing position.
    pub fn register(&self, definition: CommandDefinition) {
        let CommandDefinition { spec, handler } = definition;
        let handler = GuardedHandler::new(spec.name.clone(), handler, self.handler_timeout);

        match self.commands.entry(spec.name.clone()) {
            Entry::Occupied(mut slot) => {
                let seq = slot.get().seq;
                debug!(command = %spec.name, "replacing registered command");
                slot.insert(Arc::new(RegisteredCommand { spec, handler, seq }));
            }
            Entry::Vacant(slot) => {
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                debug!(command = %spec.name, "registering command");
                slot.insert(Arc::new(RegisteredCommand { spec, handler, seq }));
            }
        }
    }

    /// Register in order; a later definition with the same name wins.
    pub fn register_many(&self, definitions: impl IntoIterator<Item = CommandDefinition>) {
        for definition in definitions {
            self.register(definition);
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn lookup(&self, name: &str) -> Option<Arc<RegisteredCommand>> {
        self.commands.get(name).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Snapshot of every command in registration order.
    pub fn list_all(&self) -> Vec<Arc<RegisteredCommand>> {
        let mut all: Vec<_> = self
            .commands
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        all.sort_by_key(|c| c.seq);
        all
    }

    pub fn specs(&self) -> Vec<CommandSpec> {
        self.list_all().iter().map(|c| c.spec.clone()).collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.list_all().iter().map(|c| c.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
