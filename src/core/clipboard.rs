//! # Clipboard Bridge
//!
//! Pasted text is literal input only: carriage returns and line feeds are
//! stripped before the text reaches the line buffer, so a paste can never
//! behave like an Enter keypress. Tabs become spaces and every other control
//! character is dropped, so nothing pasted reaches the terminal as an escape
//! sequence.
//!
//! Reading the system clipboard is fallible (no display server, access
//! denied, nothing text-shaped on it). The read itself lives behind
//! [`ClipboardSource`] so the TUI can run it off the event loop and tests can
//! substitute a fake.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::line_buffer::{LineBuffer, Redraw};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    /// No clipboard could be opened (headless session, unsupported platform).
    Unavailable(String),
    /// The clipboard exists but refused access.
    Denied(String),
    /// The clipboard holds nothing representable as text.
    Empty,
}

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipboardError::Unavailable(msg) => write!(f, "clipboard unavailable: {msg}"),
            ClipboardError::Denied(msg) => write!(f, "clipboard access denied: {msg}"),
            ClipboardError::Empty => write!(f, "clipboard holds no text"),
        }
    }
}

impl std::error::Error for ClipboardError {}

/// What to do when a paste cannot be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipboardPolicy {
    /// Print a one-line diagnostic and keep editing.
    #[default]
    Report,
    /// Drop the failure (it is still logged).
    Silent,
}

/// A place pasted text can be read from.
pub trait ClipboardSource: Send + Sync {
    fn read_text(&self) -> Result<String, ClipboardError>;
}

/// Reduces pasted text to printable characters on the current line.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\t' => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect()
}

/// Inserts a clipboard read into `buffer` as a single edit.
///
/// Failures are handed back untouched; the buffer is only modified on success.
pub fn paste_into(
    buffer: &mut LineBuffer,
    read: Result<String, ClipboardError>,
) -> Result<Redraw, ClipboardError> {
    let text = read?;
    Ok(buffer.insert(&sanitize(&text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_line_breaks() {
        assert_eq!(sanitize("cat\r\nfile\n.txt"), "catfile.txt");
        assert_eq!(sanitize("\n\r\n"), "");
    }

    #[test]
    fn test_sanitize_drops_control_chars() {
        assert_eq!(sanitize("echo\thi"), "echo hi");
        assert_eq!(sanitize("a\tb\x1b[2Jc"), "a b[2Jc");
        assert_eq!(sanitize("rm\x7f\x08\x07 -i"), "rm -i");
        assert_eq!(sanitize("caf\u{e9} \u{9b}31m"), "caf\u{e9} 31m");
    }

    #[test]
    fn test_paste_inserts_at_cursor_in_one_edit() {
        let mut buf = LineBuffer::new();
        buf.insert("[]");
        buf.move_left();

        let redraw = paste_into(&mut buf, Ok("cat\r\nfile\n.txt".to_string())).unwrap();
        assert_eq!(
            redraw,
            Redraw::Insert {
                text: "catfile.txt".to_string(),
                tail: "]".to_string()
            }
        );
        assert_eq!(buf.as_str(), "[catfile.txt]");
    }

    #[test]
    fn test_paste_into_empty_buffer() {
        let mut buf = LineBuffer::new();
        paste_into(&mut buf, Ok("cat\r\nfile\n.txt".to_string())).unwrap();
        assert_eq!(buf.as_str(), "catfile.txt");
        assert_eq!(buf.cursor(), 11);
    }

    #[test]
    fn test_failed_read_leaves_buffer_alone() {
        let mut buf = LineBuffer::new();
        buf.insert("ls");
        let err = paste_into(&mut buf, Err(ClipboardError::Denied("nope".into()))).unwrap_err();
        assert_eq!(err, ClipboardError::Denied("nope".into()));
        assert_eq!(buf.as_str(), "ls");
    }
}
