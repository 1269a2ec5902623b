//! Reading secrets from the terminal without echo.

use std::io;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

/// What a keystroke does to a hidden line being typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Edit {
    /// Keep reading.
    Continue,
    /// Line complete.
    Done,
    /// Ctrl-C.
    Cancelled,
}

/// Apply one key event to `buffer`.
pub(crate) fn apply_key(buffer: &mut String, key: KeyEvent) -> Edit {
    if key.kind == KeyEventKind::Release {
        return Edit::Continue;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => Edit::Done,
        KeyCode::Char('c') if ctrl => Edit::Cancelled,
        KeyCode::Char('u') if ctrl => {
            buffer.clear();
            Edit::Continue
        }
        KeyCode::Backspace => {
            buffer.pop();
            Edit::Continue
        }
        KeyCode::Char(c) if !ctrl => {
            buffer.push(c);
            Edit::Continue
        }
        _ => Edit::Continue,
    }
}

/// Raw mode for as long as the guard lives.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Read one line from the terminal without echoing it.
///
/// # Errors
///
/// Returns an error if the terminal cannot be switched to raw mode, or
/// [`io::ErrorKind::Interrupted`] when the user presses Ctrl-C.
pub(crate) fn read_hidden_line() -> io::Result<String> {
    let _raw = RawMode::enable()?;
    let mut buffer = String::new();
    loop {
        if let Event::Key(key) = event::read()? {
            match apply_key(&mut buffer, key) {
                Edit::Continue => {}
                Edit::Done => return Ok(buffer),
                Edit::Cancelled => {
                    return Err(io::Error::new(io::ErrorKind::Interrupted, "input cancelled"));
                }
            }
        }
    }
}
