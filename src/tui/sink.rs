//! Writes queued [`TermOp`]s to a real terminal with crossterm.
//!
//! The terminal is in raw mode, so a line feed needs an explicit carriage
//! return.

use crossterm::cursor::{MoveLeft, MoveRight};
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType, SetTitle};
use crossterm::queue;
use std::io::{self, Write};

use crate::core::render::TermOp;

pub struct CrosstermSink<W: Write> {
    out: W,
}

impl<W: Write> CrosstermSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Queues every op, then flushes once.
    pub fn emit(&mut self, ops: &[TermOp]) -> io::Result<()> {
        if ops.is_empty() {
            return Ok(());
        }
        for op in ops {
            match op {
                TermOp::Write(text) => queue!(self.out, Print(text))?,
                TermOp::CursorLeft(cols) => queue!(self.out, MoveLeft(columns(*cols)))?,
                TermOp::CursorRight(cols) => queue!(self.out, MoveRight(columns(*cols)))?,
                TermOp::ClearToEnd => queue!(self.out, Clear(ClearType::UntilNewLine))?,
                TermOp::Newline => queue!(self.out, Print("\r\n"))?,
            }
        }
        self.out.flush()
    }

    pub fn set_title(&mut self, title: &str) -> io::Result<()> {
        queue!(self.out, SetTitle(title))?;
        self.out.flush()
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

fn columns(cols: usize) -> u16 {
    u16::try_from(cols).unwrap_or(u16::MAX)
}
