//! Local terminal front end: maps crossterm key events onto interpreter keys
//! and draws the output surface incrementally.

use std::io::{self, Write};
use std::time::Duration;

use crossterm::cursor::{MoveTo, MoveToColumn};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Attribute, Color, ContentStyle, Print, PrintStyledContent};
use crossterm::terminal::{Clear, ClearType};
use crossterm::queue;

use crate::interpreter::Key;
use crate::output::{unescape_html, Cursor, LineClass, OutputSurface};

/// What the key reader hands to the main loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleEvent {
    Key(Key),
    Paste(String),
    /// Ctrl+D: leave the terminal.
    Quit,
}

/// Translate one crossterm key event. Releases and unmapped keys yield
/// `None`.
pub fn map_key(key: KeyEvent) -> Option<ConsoleEvent> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let mapped = match key.code {
        KeyCode::Char('c') if ctrl => Key::CtrlC,
        KeyCode::Char('l') if ctrl => Key::CtrlL,
        KeyCode::Char('d') if ctrl => return Some(ConsoleEvent::Quit),
        KeyCode::Char(_) if ctrl => return None,
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Tab => Key::Tab,
        KeyCode::Esc => Key::Esc,
        KeyCode::Backspace => Key::Backspace,
        _ => return None,
    };
    Some(ConsoleEvent::Key(mapped))
}

/// Block up to `timeout` for the next mappable terminal event.
pub fn poll_event(timeout: Duration) -> io::Result<Option<ConsoleEvent>> {
    if !event::poll(timeout)? {
        return Ok(None);
    }
    Ok(match event::read()? {
        Event::Key(key) => map_key(key),
        Event::Paste(text) => Some(ConsoleEvent::Paste(text)),
        _ => None,
    })
}

pub fn style_for(class: LineClass) -> ContentStyle {
    let (color, bold) = match class {
        LineClass::Command => (Some(Color::White), true),
        LineClass::Response => (None, false),
        LineClass::Error => (Some(Color::Red), false),
        LineClass::Warning => (Some(Color::Yellow), false),
        LineClass::Info => (Some(Color::Cyan), false),
        LineClass::Success | LineClass::Ascii => (Some(Color::Green), false),
        LineClass::Dim => (Some(Color::DarkGrey), false),
        LineClass::Header => (Some(Color::Magenta), true),
    };
    let mut style = ContentStyle {
        foreground_color: color,
        ..ContentStyle::default()
    };
    if bold {
        style.attributes.set(Attribute::Bold);
    }
    style
}

/// Incremental renderer. Only lines appended since the last draw are
/// written; a cleared surface redraws from the top.
#[derive(Debug, Default)]
pub struct Renderer {
    cursor: Cursor,
    last_prompt: String,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw<W: Write>(
        &mut self,
        out: &mut W,
        surface: &OutputSurface,
        prompt: &str,
        buffer: &str,
    ) -> io::Result<()> {
        let delta = surface.since(self.cursor);
        let prompt_line = format!("{prompt}{buffer}");
        if !delta.cleared && delta.lines.is_empty() && prompt_line == self.last_prompt {
            return Ok(());
        }

        if delta.cleared {
            queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
        }
        queue!(out, MoveToColumn(0), Clear(ClearType::CurrentLine))?;

        for line in &delta.lines {
            let style = style_for(line.class);
            for part in unescape_html(&line.text).split('\n') {
                queue!(
                    out,
                    PrintStyledContent(style.apply(part.to_string())),
                    Print("\r\n")
                )?;
            }
        }

        queue!(out, Print(&prompt_line))?;
        out.flush()?;

        self.cursor = delta.cursor;
        self.last_prompt = prompt_line;
        Ok(())
    }
}
