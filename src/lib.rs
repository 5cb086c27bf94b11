pub mod api;
pub mod commands;
pub mod config;
pub mod console;
pub mod contact;
pub mod guard;
pub mod history;
/// Keystroke-driven interpreter tying the guard, registry, history and
/// telemetry together.
pub mod interpreter;
pub mod output;
pub mod reporter;
