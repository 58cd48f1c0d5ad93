//! # Render Adapter
//!
//! Turns line-buffer edits and session output into the handful of
//! primitives the terminal understands. Ops are queued here and flushed by
//! the TUI loop; the adapter keeps no state about the screen beyond the
//! queue itself.
//!
//! Distances are terminal columns (`unicode-width`), which is the same as
//! character count for ASCII.

use unicode_width::UnicodeWidthStr;

use crate::core::line_buffer::{LineBuffer, Redraw};

const PROMPT_IDENTITY: &str = "student@trainer";

/// Formats the shell prompt for `cwd`. No trailing newline.
pub fn prompt(cwd: &str) -> String {
    format!("{PROMPT_IDENTITY}:{cwd}$ ")
}

/// A single terminal directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermOp {
    Write(String),
    CursorLeft(usize),
    CursorRight(usize),
    ClearToEnd,
    Newline,
}

#[derive(Debug, Default)]
pub struct RenderAdapter {
    ops: Vec<TermOp>,
}

impl RenderAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the minimal ops for a buffer mutation.
    pub fn apply(&mut self, redraw: &Redraw) {
        match redraw {
            Redraw::None => {}
            Redraw::Insert { text, tail } => {
                self.write(text);
                self.write(tail);
                self.left(tail.width());
            }
            Redraw::Backspace { removed, tail } => {
                self.left(removed.to_string().width());
                self.write(tail);
                self.push(TermOp::ClearToEnd);
                self.left(tail.width());
            }
            Redraw::Delete { tail } => {
                self.write(tail);
                self.push(TermOp::ClearToEnd);
                self.left(tail.width());
            }
            Redraw::MoveLeft(crossed) => self.left(crossed.width()),
            Redraw::MoveRight(crossed) => self.right(crossed.width()),
            Redraw::Replace { cleared, text } => {
                self.left(cleared.width());
                self.push(TermOp::ClearToEnd);
                self.write(text);
            }
        }
    }

    /// Writes `text` followed by a line feed.
    pub fn line(&mut self, text: &str) {
        self.write(text);
        self.push(TermOp::Newline);
    }

    pub fn blank_line(&mut self) {
        self.push(TermOp::Newline);
    }

    pub fn prompt(&mut self, cwd: &str) {
        self.write(&prompt(cwd));
    }

    /// Leaves the live input line: cursor to its end, then a line feed.
    /// What was typed stays visible above.
    pub fn detach(&mut self, buffer: &LineBuffer) {
        self.right(buffer.tail().width());
        self.push(TermOp::Newline);
    }

    /// Re-prints the prompt and the live buffer with the cursor restored.
    pub fn reattach(&mut self, cwd: &str, buffer: &LineBuffer) {
        self.prompt(cwd);
        self.write(buffer.as_str());
        self.left(buffer.tail().width());
    }

    pub fn pending(&self) -> &[TermOp] {
        &self.ops
    }

    /// Hands the queued ops to the caller, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<TermOp> {
        std::mem::take(&mut self.ops)
    }

    fn write(&mut self, text: &str) {
        if !text.is_empty() {
            self.push(TermOp::Write(text.to_string()));
        }
    }

    fn left(&mut self, cols: usize) {
        if cols > 0 {
            self.push(TermOp::CursorLeft(cols));
        }
    }

    fn right(&mut self, cols: usize) {
        if cols > 0 {
            self.push(TermOp::CursorRight(cols));
        }
    }

    fn push(&mut self, op: TermOp) {
        self.ops.push(op);
    }
}
