//! The terminal interpreter: input buffer, submission pipeline, history
//! navigation, autocomplete and the contact form.

use std::sync::Arc;
use std::time::Instant;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::api::{BackendApi, IpLookup};
use crate::commands::{print_welcome, CommandContext, CommandRegistry, HostAction};
use crate::config::{Config, ConfigError};
use crate::contact::{ContactForm, ContactRequest, FormStep};
use crate::guard::InputGuard;
use crate::history::HistoryNavigator;
use crate::output::{escape_html, LineClass, OutputSurface};
use crate::reporter::{timestamp_now, SessionReporter};

const CONTACT_SENT: &str = "Message sent successfully! We will contact you soon.";
const CONTACT_FAILED: &str = "Error sending message. Please try again or contact directly.";
const CONTACT_CLOSED: &str = "Contact form closed.";

/// A keystroke the interpreter understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Up,
    Down,
    Tab,
    CtrlC,
    CtrlL,
    Esc,
    Backspace,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpreterState {
    Idle,
    Validating,
    Executing,
}

pub struct Interpreter {
    prompt: String,
    guard: InputGuard,
    history: HistoryNavigator,
    registry: Arc<CommandRegistry>,
    reporter: SessionReporter,
    backend: Option<Arc<dyn BackendApi>>,
    ip_lookup: Option<Arc<dyn IpLookup>>,
    output: OutputSurface,
    buffer: String,
    state: InterpreterState,
    started_at: Instant,
    form: Option<ContactForm>,
    exited: bool,
    pending: Vec<JoinHandle<()>>,
}

impl Interpreter {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        Self::with_clock(config, Instant::now())
    }

    /// Build an interpreter whose rate window and uptime start at `now`.
    pub fn with_clock(config: &Config, now: Instant) -> Result<Self, ConfigError> {
        let guard = InputGuard::with_clock(&config.guard, now)?;
        let output = OutputSurface::new();
        if config.terminal.show_welcome {
            print_welcome(&output);
        }

        Ok(Self {
            prompt: config.terminal.prompt.clone(),
            guard,
            history: HistoryNavigator::new(config.terminal.max_history),
            registry: Arc::new(CommandRegistry::builtin()),
            reporter: SessionReporter::disabled(),
            backend: None,
            ip_lookup: None,
            output,
            buffer: String::new(),
            state: InterpreterState::Idle,
            started_at: now,
            form: None,
            exited: false,
            pending: Vec::new(),
        })
    }

    /// Backend used for contact submissions.
    pub fn with_backend(mut self, backend: Arc<dyn BackendApi>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn with_reporter(mut self, reporter: SessionReporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_ip_lookup(mut self, lookup: Arc<dyn IpLookup>) -> Self {
        self.ip_lookup = Some(lookup);
        self
    }

    pub fn with_registry(mut self, registry: CommandRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// Ask the backend for a telemetry session in the background.
    pub fn start_session(&mut self) {
        if let Some(handle) = self.reporter.start() {
            self.pending.push(handle);
        }
    }

    pub fn handle_key(&mut self, key: Key) {
        match key {
            Key::Enter => self.submit(),
            Key::Up => self.navigate_history(-1),
            Key::Down => self.navigate_history(1),
            Key::Tab => self.autocomplete(),
            Key::CtrlC if self.form.is_some() => self.close_form(),
            Key::CtrlC => {
                self.buffer.clear();
                self.output.print("^C", LineClass::Dim);
            }
            Key::CtrlL => self.output.clear(),
            Key::Esc => {
                if self.form.is_some() {
                    self.close_form();
                }
            }
            Key::Backspace => {
                self.buffer.pop();
            }
            Key::Char(c) => self.buffer.push(c),
        }
    }

    /// Append typed text to the buffer.
    pub fn input(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    pub fn submit(&mut self) {
        self.submit_at(Instant::now());
    }

    /// Submit the buffer as if Enter was pressed at `now`.
    pub fn submit_at(&mut self, now: Instant) {
        self.pending.retain(|task| !task.is_finished());
        let raw = std::mem::take(&mut self.buffer);

        if self.form.is_some() {
            self.submit_form_value(raw.trim());
            return;
        }

        let line = raw.trim();
        self.output.print(
            format!("{}{}", escape_html(&self.prompt), escape_html(line)),
            LineClass::Command,
        );
        if line.is_empty() {
            return;
        }

        self.state = InterpreterState::Validating;
        let checked = self
            .guard
            .check_rate(now)
            .and_then(|()| self.guard.sanitize(line));
        if let Err(e) = checked {
            debug!(error = %e, "submission rejected");
            self.output.text(&e.to_string(), LineClass::Error);
            self.state = InterpreterState::Idle;
            return;
        }

        self.history.record(line);
        if let Some(task) = self.reporter.log(line) {
            self.pending.push(task);
        }

        self.state = InterpreterState::Executing;
        self.execute(line);
        self.state = InterpreterState::Idle;
    }

    fn execute(&mut self, line: &str) {
        let lowered = line.to_lowercase();
        let mut tokens = lowered.split_whitespace().map(str::to_string);
        let Some(name) = tokens.next() else {
            return;
        };
        let args: Vec<String> = tokens.collect();

        let mut ctx = CommandContext::new(
            &self.output,
            &self.registry,
            &self.history,
            self.guard.rate_snapshot(),
            self.started_at,
        )
        .with_ip_lookup(self.ip_lookup.clone());
        let found = self.registry.dispatch(&name, &mut ctx, &args);
        let (actions, spawned) = ctx.finish();
        self.pending.extend(spawned);

        if !found {
            debug!(command = %name, "unknown command");
            self.output.print(
                format!(
                    "Command not found: {}. Type 'help' for available commands.",
                    escape_html(&name)
                ),
                LineClass::Error,
            );
        }

        for action in actions {
            self.apply(action);
        }
    }

    fn apply(&mut self, action: HostAction) {
        match action {
            HostAction::OpenContactForm => {
                self.form = Some(ContactForm::new());
                self.output
                    .text("  Press Esc or Ctrl+C to cancel.", LineClass::Dim);
                self.prompt_form_field();
            }
            HostAction::Exit => {
                info!("exit requested");
                self.exited = true;
            }
        }
    }

    fn prompt_form_field(&self) {
        let Some(form) = &self.form else {
            return;
        };
        self.output.blank();
        self.output
            .text(&format!("{}:", form.prompt()), LineClass::Info);
        if let Some(options) = form.options() {
            for (i, (value, label)) in options.iter().enumerate() {
                self.output
                    .text(&format!("  {}. {value} - {label}", i + 1), LineClass::Dim);
            }
        }
    }

    fn submit_form_value(&mut self, value: &str) {
        self.output
            .print(format!("&gt; {}", escape_html(value)), LineClass::Command);

        let Some(form) = self.form.as_mut() else {
            return;
        };
        match form.submit(value) {
            FormStep::Next => self.prompt_form_field(),
            FormStep::Retry(e) => {
                self.output.text(&e.to_string(), LineClass::Error);
                self.prompt_form_field();
            }
            FormStep::Complete(mut request) => {
                self.form = None;
                request.timestamp = Some(timestamp_now());
                self.send_contact(request);
            }
        }
    }

    fn send_contact(&mut self, request: ContactRequest) {
        self.output.text("Sending...", LineClass::Dim);

        if let Err(e) = request.validate() {
            debug!(error = %e, "contact request failed validation");
            self.output.text(CONTACT_FAILED, LineClass::Error);
            return;
        }
        let (Some(backend), Ok(handle)) = (self.backend.clone(), Handle::try_current()) else {
            debug!("contact backend unavailable");
            self.output.text(CONTACT_FAILED, LineClass::Error);
            return;
        };

        let out = self.output.clone();
        self.pending.push(handle.spawn(async move {
            match backend.submit_contact(&request).await {
                Ok(receipt) => {
                    info!(id = %receipt.id, service = %request.service, "contact request stored");
                    out.text(CONTACT_SENT, LineClass::Success);
                }
                Err(e) => {
                    debug!(error = %e, "contact submission failed");
                    out.text(CONTACT_FAILED, LineClass::Error);
                }
            }
        }));
    }

    fn close_form(&mut self) {
        self.form = None;
        self.buffer.clear();
        self.output.text(CONTACT_CLOSED, LineClass::Dim);
    }

    /// Complete the buffer against public command names.
    pub fn autocomplete(&mut self) {
        if self.form.is_some() {
            return;
        }
        let partial = self.buffer.trim();
        if partial.is_empty() {
            return;
        }
        let matches = self.registry.complete(partial);
        match matches.as_slice() {
            [] => {}
            [only] => self.buffer = only.to_string(),
            many => self.output.text(&many.join("  "), LineClass::Info),
        }
    }

    /// Move through history; `-1` is older, `1` is newer.
    pub fn navigate_history(&mut self, direction: i32) {
        if self.form.is_some() {
            return;
        }
        if let Some(entry) = self.history.navigate(direction) {
            self.buffer = entry.to_string();
        }
    }

    /// Wait for every background task started so far.
    pub async fn settle(&mut self) {
        for task in std::mem::take(&mut self.pending) {
            if let Err(e) = task.await {
                debug!(error = %e, "background task failed");
            }
        }
    }

    pub fn output(&self) -> &OutputSurface {
        &self.output
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn history(&self) -> &HistoryNavigator {
        &self.history
    }

    pub fn guard(&self) -> &InputGuard {
        &self.guard
    }

    pub fn reporter(&self) -> &SessionReporter {
        &self.reporter
    }

    pub fn state(&self) -> InterpreterState {
        self.state
    }

    /// Prompt to draw before the buffer.
    pub fn prompt(&self) -> &str {
        if self.form.is_some() {
            "> "
        } else {
            &self.prompt
        }
    }

    pub fn form_open(&self) -> bool {
        self.form.is_some()
    }

    pub fn has_exited(&self) -> bool {
        self.exited
    }
}
