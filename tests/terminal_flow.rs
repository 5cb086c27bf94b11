use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use webterm::api::{ApiError, BackendApi, ContactReceipt, IpLookup, LogEntry, SessionTicket};
use webterm::config::Config;
use webterm::contact::ContactRequest;
use webterm::interpreter::{Interpreter, Key};
use webterm::reporter::SessionReporter;

/// Backend that records every call and answers from fixed settings.
#[derive(Default)]
struct RecordingBackend {
    session_id: Option<String>,
    fail_contact: bool,
    logs: Mutex<Vec<LogEntry>>,
    contacts: Mutex<Vec<ContactRequest>>,
}

impl RecordingBackend {
    fn with_session(id: &str) -> Self {
        Self {
            session_id: Some(id.to_string()),
            ..Default::default()
        }
    }

    fn logged_commands(&self) -> Vec<String> {
        self.logs
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.command.clone())
            .collect()
    }
}

#[async_trait]
impl BackendApi for RecordingBackend {
    async fn start_session(&self) -> Result<SessionTicket, ApiError> {
        match &self.session_id {
            Some(id) => Ok(SessionTicket {
                session_id: id.clone(),
            }),
            None => Err(ApiError::Status {
                status: 500,
                message: "Failed to create session".to_string(),
            }),
        }
    }

    async fn log_command(&self, entry: &LogEntry) -> Result<(), ApiError> {
        self.logs.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn submit_contact(&self, request: &ContactRequest) -> Result<ContactReceipt, ApiError> {
        self.contacts.lock().unwrap().push(request.clone());
        if self.fail_contact {
            return Err(ApiError::Status {
                status: 400,
                message: "Invalid email".to_string(),
            });
        }
        Ok(ContactReceipt {
            id: "contact_1".to_string(),
        })
    }
}

struct FixedIp(&'static str);

#[async_trait]
impl IpLookup for FixedIp {
    async fn lookup(&self) -> Result<String, ApiError> {
        Ok(self.0.to_string())
    }
}

fn config() -> Config {
    let mut config = Config::default();
    config.terminal.show_welcome = false;
    config
}

fn type_line(term: &mut Interpreter, line: &str) {
    for c in line.chars() {
        term.handle_key(Key::Char(c));
    }
    term.handle_key(Key::Enter);
}

async fn logged_terminal(backend: &Arc<RecordingBackend>) -> Interpreter {
    let api: Arc<dyn BackendApi> = backend.clone();
    let mut term = Interpreter::new(&config())
        .unwrap()
        .with_backend(Arc::clone(&api))
        .with_reporter(SessionReporter::new(api));
    term.start_session();
    term.settle().await;
    term
}

#[tokio::test]
async fn test_only_accepted_commands_are_logged() {
    let backend = Arc::new(RecordingBackend::with_session("lx4k2a9f"));
    let mut term = logged_terminal(&backend).await;
    assert_eq!(term.reporter().session_id(), Some("lx4k2a9f"));

    type_line(&mut term, "help");
    type_line(&mut term, &"x".repeat(201));
    type_line(&mut term, "cat ../secret");
    type_line(&mut term, "foobar");
    type_line(&mut term, "");
    term.settle().await;

    assert_eq!(backend.logged_commands(), vec!["help", "foobar"]);
    let entry = &backend.logs.lock().unwrap()[0];
    assert_eq!(entry.session_id, "lx4k2a9f");
    assert!(entry.timestamp.ends_with('Z'));
}

#[tokio::test]
async fn test_failed_session_never_logs() {
    let backend = Arc::new(RecordingBackend::default());
    let mut term = logged_terminal(&backend).await;
    assert!(term.reporter().session_id().is_none());

    type_line(&mut term, "whoami");
    term.settle().await;

    assert!(backend.logged_commands().is_empty());
    assert_eq!(term.output().texts().last().unwrap(), "guest");
}

#[tokio::test]
async fn test_contact_form_round_trip() {
    let backend = Arc::new(RecordingBackend::with_session("s1"));
    let mut term = logged_terminal(&backend).await;

    type_line(&mut term, "contact-form");
    assert!(term.form_open());
    for value in [
        "Ada Lovelace",
        "ada@example.com",
        "",
        "data-recovery",
        "urgent",
        "Disk clicks on boot",
        "",
    ] {
        type_line(&mut term, value);
    }
    assert!(!term.form_open());
    term.settle().await;

    let contacts = backend.contacts.lock().unwrap().clone();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].service, "data-recovery");
    assert_eq!(contacts[0].contact_method, "email");
    assert!(contacts[0].timestamp.is_some());
    assert_eq!(
        term.output().texts().last().unwrap(),
        "Message sent successfully! We will contact you soon."
    );
    // Form values are neither recorded nor logged.
    assert_eq!(term.history().len(), 1);
    assert_eq!(backend.logged_commands(), vec!["contact-form"]);
}

#[tokio::test]
async fn test_contact_form_rejected_by_server() {
    let backend = Arc::new(RecordingBackend {
        session_id: Some("s1".to_string()),
        fail_contact: true,
        ..Default::default()
    });
    let mut term = logged_terminal(&backend).await;

    type_line(&mut term, "contact-form");
    for value in ["Ada", "ada@example.com", "", "3", "", "Hi", "2"] {
        type_line(&mut term, value);
    }
    term.settle().await;

    assert_eq!(
        term.output().texts().last().unwrap(),
        "Error sending message. Please try again or contact directly."
    );
}

#[tokio::test]
async fn test_myip_appends_after_settle() {
    let mut term = Interpreter::new(&config())
        .unwrap()
        .with_ip_lookup(Arc::new(FixedIp("198.51.100.4")));

    type_line(&mut term, "myip");
    assert_eq!(
        term.output().texts().last().unwrap(),
        "Fetching IP information..."
    );
    term.settle().await;
    assert!(term
        .output()
        .texts()
        .contains(&"  Your IP: 198.51.100.4".to_string()));
}

#[test]
fn test_rejected_lines_still_count_against_rate() {
    let t0 = Instant::now();
    let mut term = Interpreter::with_clock(&config(), t0).unwrap();
    for _ in 0..30 {
        term.input("<script>");
        term.submit_at(t0);
    }
    term.input("help");
    term.submit_at(t0 + Duration::from_secs(5));

    assert_eq!(
        term.output().texts().last().unwrap(),
        "Too many commands. Temporarily blocked."
    );
    assert!(term.history().is_empty());
}

#[test]
fn test_history_bounded_to_fifty() {
    let mut term = Interpreter::new(&config()).unwrap();
    let t0 = Instant::now();
    for i in 0..51 {
        term.input(&format!("echo {i}"));
        // Spread across windows so the rate limiter stays quiet.
        term.submit_at(t0 + Duration::from_secs(61 * (i / 25 + 1)));
    }
    let entries: Vec<&str> = term.history().entries().collect();
    assert_eq!(entries.len(), 50);
    assert_eq!(entries[0], "echo 1");
    assert_eq!(entries[49], "echo 50");
}

#[test]
fn test_help_output_hides_hidden_commands() {
    let mut term = Interpreter::new(&config()).unwrap();
    type_line(&mut term, "help");
    let out = term.output().texts().join("\n");
    assert!(out.contains("consultation"));
    assert!(!out.contains("myip"));
    assert!(!out.contains("contact-form"));
}
