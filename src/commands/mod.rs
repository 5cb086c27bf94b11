//! Command registry and the built-in catalogue.
//!
//! Public and hidden commands live in one map and share one handler
//! contract. Visibility only decides whether `help` and Tab completion can
//! see a command.

mod pages;
mod system;

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::api::IpLookup;
use crate::guard::RateSnapshot;
use crate::history::HistoryNavigator;
use crate::output::OutputSurface;

pub use pages::print_welcome;

/// Command handler. Receives the lowercased arguments after the name and
/// writes straight to the output surface.
pub type Handler = fn(&mut CommandContext<'_>, &[String]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Hidden,
}

/// Requests a handler makes of whoever hosts the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostAction {
    OpenContactForm,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("command name must be a single non-empty word")]
    InvalidName,
    #[error("command '{0}' is already registered")]
    Duplicate(String),
}

pub struct CommandEntry {
    pub name: String,
    /// Present for public commands only.
    pub description: Option<String>,
    pub visibility: Visibility,
    pub handler: Handler,
}

/// Everything a handler may read or touch while it runs.
pub struct CommandContext<'a> {
    pub output: &'a OutputSurface,
    pub registry: &'a CommandRegistry,
    pub history: &'a HistoryNavigator,
    pub rate: RateSnapshot,
    pub started_at: Instant,
    pub ip_lookup: Option<Arc<dyn IpLookup>>,
    actions: Vec<HostAction>,
    spawned: Vec<JoinHandle<()>>,
}

impl<'a> CommandContext<'a> {
    pub fn new(
        output: &'a OutputSurface,
        registry: &'a CommandRegistry,
        history: &'a HistoryNavigator,
        rate: RateSnapshot,
        started_at: Instant,
    ) -> Self {
        Self {
            output,
            registry,
            history,
            rate,
            started_at,
            ip_lookup: None,
            actions: Vec::new(),
            spawned: Vec::new(),
        }
    }

    pub fn with_ip_lookup(mut self, lookup: Option<Arc<dyn IpLookup>>) -> Self {
        self.ip_lookup = lookup;
        self
    }

    pub fn request(&mut self, action: HostAction) {
        self.actions.push(action);
    }

    /// Run background work whose continuation appends output later.
    /// Returns false when no runtime is available to run it.
    pub fn spawn<F>(&mut self, work: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match Handle::try_current() {
            Ok(handle) => {
                self.spawned.push(handle.spawn(work));
                true
            }
            Err(_) => false,
        }
    }

    /// Split into requested host actions and spawned tasks.
    pub fn finish(self) -> (Vec<HostAction>, Vec<JoinHandle<()>>) {
        (self.actions, self.spawned)
    }
}

/// Name to command map, iterated in registration order.
#[derive(Default)]
pub struct CommandRegistry {
    entries: Vec<CommandEntry>,
    index: HashMap<String, usize>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The full catalogue shipped with the terminal.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for (name, description, handler) in system::PUBLIC {
            registry.insert(name, Some(*description), Visibility::Public, *handler);
        }
        for (name, handler) in system::HIDDEN.iter().chain(pages::HIDDEN) {
            registry.insert(name, None, Visibility::Hidden, *handler);
        }
        debug!(commands = registry.len(), "command registry built");
        registry
    }

    pub fn register_public(
        &mut self,
        name: &str,
        description: &str,
        handler: Handler,
    ) -> Result<(), RegistryError> {
        self.register(name, Some(description), Visibility::Public, handler)
    }

    pub fn register_hidden(&mut self, name: &str, handler: Handler) -> Result<(), RegistryError> {
        self.register(name, None, Visibility::Hidden, handler)
    }

    fn register(
        &mut self,
        name: &str,
        description: Option<&str>,
        visibility: Visibility,
        handler: Handler,
    ) -> Result<(), RegistryError> {
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(RegistryError::InvalidName);
        }
        if self.exists(name) {
            return Err(RegistryError::Duplicate(name.to_lowercase()));
        }
        self.insert(name, description, visibility, handler);
        Ok(())
    }

    fn insert(
        &mut self,
        name: &str,
        description: Option<&str>,
        visibility: Visibility,
        handler: Handler,
    ) {
        let name = name.to_lowercase();
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push(CommandEntry {
            name,
            description: description.map(str::to_string),
            visibility,
            handler,
        });
    }

    pub fn exists(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&CommandEntry> {
        self.index
            .get(&name.to_lowercase())
            .and_then(|&i| self.entries.get(i))
    }

    /// Run the handler for `name`. Returns false, doing nothing, when the
    /// name is unknown.
    pub fn dispatch(&self, name: &str, ctx: &mut CommandContext<'_>, args: &[String]) -> bool {
        match self.get(name) {
            Some(entry) => {
                debug!(command = %entry.name, args = args.len(), "dispatching command");
                (entry.handler)(ctx, args);
                true
            }
            None => false,
        }
    }

    /// Public commands as `(name, description)` in registration order.
    pub fn list_public(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter(|e| e.visibility == Visibility::Public)
            .map(|e| (e.name.as_str(), e.description.as_deref().unwrap_or("")))
    }

    /// Public names starting with `partial` (case-insensitive).
    pub fn complete(&self, partial: &str) -> Vec<&str> {
        let partial = partial.to_lowercase();
        self.list_public()
            .map(|(name, _)| name)
            .filter(|name| name.starts_with(&partial))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
