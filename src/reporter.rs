//! Best-effort session telemetry.
//!
//! A session id is requested once at startup; every accepted command is then
//! reported with a timestamp. Delivery is at most once: nothing is retried,
//! and commands issued before the id arrives are never sent. Failures are
//! traced at debug level and otherwise dropped.

use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::{Arc, OnceLock};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::api::{ApiError, BackendApi, LogEntry, SessionTicket};

/// Server-issued session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Accept a ticket only if its id is safe to embed in a file name.
    pub fn from_ticket(ticket: SessionTicket) -> Result<Self, ApiError> {
        let id = ticket.session_id;
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(ApiError::Malformed(format!("invalid session id '{id}'")));
        }
        Ok(Self {
            id,
            created_at: Utc::now(),
        })
    }
}

/// Current time in the wire format used by the log endpoint.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Owns the session slot and fires log calls at the backend.
#[derive(Clone)]
pub struct SessionReporter {
    api: Option<Arc<dyn BackendApi>>,
    session: Arc<OnceLock<Session>>,
}

impl SessionReporter {
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        Self {
            api: Some(api),
            session: Arc::new(OnceLock::new()),
        }
    }

    /// A reporter that never starts a session, so every `log` is a no-op.
    pub fn disabled() -> Self {
        Self {
            api: None,
            session: Arc::new(OnceLock::new()),
        }
    }

    /// Request a session id in the background.
    pub fn start(&self) -> Option<JoinHandle<()>> {
        let api = self.api.clone()?;
        let handle = Handle::try_current().ok()?;
        let slot = Arc::clone(&self.session);

        Some(handle.spawn(async move {
            let session = api
                .start_session()
                .await
                .and_then(Session::from_ticket);
            match session {
                Ok(session) => {
                    debug!(session_id = %session.id, "telemetry session started");
                    let _ = slot.set(session);
                }
                Err(e) => debug!(error = %e, "telemetry session unavailable"),
            }
        }))
    }

    /// Report one accepted command. Does nothing until a session exists.
    pub fn log(&self, command: &str) -> Option<JoinHandle<()>> {
        let api = self.api.clone()?;
        let session = self.session.get()?;
        let handle = Handle::try_current().ok()?;

        let entry = LogEntry {
            session_id: session.id.clone(),
            command: command.to_string(),
            timestamp: timestamp_now(),
        };

        Some(handle.spawn(async move {
            if let Err(e) = api.log_command(&entry).await {
                debug!(error = %e, "command log dropped");
            }
        }))
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.get()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session.get().map(|s| s.id.as_str())
    }
}
