use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Visual class of an output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineClass {
    Command,
    Response,
    Error,
    Warning,
    Info,
    Success,
    Dim,
    Header,
    Ascii,
}

impl LineClass {
    /// CSS class used by the browser front end.
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Command => "output-command",
            Self::Response => "output-response",
            Self::Error => "output-error",
            Self::Warning => "output-warning",
            Self::Info => "output-info",
            Self::Success => "output-success",
            Self::Dim => "output-dim",
            Self::Header => "output-header",
            Self::Ascii => "ascii-art",
        }
    }
}

/// One rendered line. `text` is always markup-safe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub text: String,
    pub class: LineClass,
}

#[derive(Debug, Default)]
struct Inner {
    lines: Vec<OutputLine>,
    epoch: u64,
}

/// Lines appended since a [`Cursor`] was taken.
#[derive(Debug, Clone)]
pub struct Delta {
    /// The surface was cleared since the cursor; redraw from scratch.
    pub cleared: bool,
    pub lines: Vec<OutputLine>,
    pub cursor: Cursor,
}

/// Position in the surface as seen by a renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    epoch: u64,
    offset: usize,
}

/// Shared, clearable output surface.
///
/// Cloning yields another handle to the same surface, which is how
/// background continuations append their results.
#[derive(Debug, Clone, Default)]
pub struct OutputSurface {
    inner: Arc<Mutex<Inner>>,
}

impl OutputSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a line that is already markup-safe.
    pub fn print(&self, text: impl Into<String>, class: LineClass) {
        self.lock().lines.push(OutputLine {
            text: text.into(),
            class,
        });
    }

    /// Append plain text, escaping it first.
    pub fn text(&self, text: &str, class: LineClass) {
        self.print(escape_html(text), class);
    }

    pub fn response(&self, text: impl Into<String>) {
        self.print(text, LineClass::Response);
    }

    pub fn blank(&self) {
        self.print("", LineClass::Response);
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.lines.clear();
        inner.epoch += 1;
    }

    pub fn lines(&self) -> Vec<OutputLine> {
        self.lock().lines.clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.lock().lines.iter().map(|l| l.text.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().lines.is_empty()
    }

    /// Everything appended after `cursor`.
    pub fn since(&self, cursor: Cursor) -> Delta {
        let inner = self.lock();
        let cleared = inner.epoch != cursor.epoch;
        let start = if cleared {
            0
        } else {
            cursor.offset.min(inner.lines.len())
        };
        Delta {
            cleared,
            lines: inner.lines[start..].to_vec(),
            cursor: Cursor {
                epoch: inner.epoch,
                offset: inner.lines.len(),
            },
        }
    }
}

/// Entity-escape the five HTML-special characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverse of [`escape_html`], for renderers that are not HTML.
pub fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&amp;", "&")
}
