//! # Line Buffer
//!
//! The command line being edited: its text and a cursor.
//!
//! Every mutation returns a [`Redraw`] describing the smallest change the
//! terminal needs to catch up. Nothing left of the cursor is ever repainted,
//! so the visual cost of an edit depends on the edit and the tail after it,
//! never on the whole line.
//!
//! The cursor is stored as a byte offset that always sits on a char
//! boundary; [`LineBuffer::cursor`] reports it in characters.

/// What the terminal has to do after a buffer mutation.
///
/// Variants carry the text the cursor crosses so the render layer can
/// measure distances in terminal columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redraw {
    /// Nothing changed on screen.
    None,
    /// `text` was spliced in at the old cursor and `tail` follows it.
    Insert { text: String, tail: String },
    /// `removed` sat just before the cursor; `tail` follows the new cursor.
    Backspace { removed: char, tail: String },
    /// The character under the cursor is gone; the cursor did not move.
    Delete { tail: String },
    /// Cursor stepped left across the contained text.
    MoveLeft(String),
    /// Cursor stepped right across the contained text.
    MoveRight(String),
    /// The whole line was swapped: step back across `cleared`, clear, write `text`.
    Replace { cleared: String, text: String },
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LineBuffer {
    text: String,
    /// Byte offset into `text` (0..=text.len()), always on a char boundary
    pos: usize,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Cursor position in characters, `0..=len()`.
    pub fn cursor(&self) -> usize {
        self.text[..self.pos].chars().count()
    }

    /// Text from the cursor to the end of the line.
    pub fn tail(&self) -> &str {
        &self.text[self.pos..]
    }

    /// Splices `text` in at the cursor and advances past it.
    pub fn insert(&mut self, text: &str) -> Redraw {
        if text.is_empty() {
            return Redraw::None;
        }
        self.text.insert_str(self.pos, text);
        self.pos += text.len();
        Redraw::Insert {
            text: text.to_string(),
            tail: self.tail().to_string(),
        }
    }

    pub fn backspace(&mut self) -> Redraw {
        if self.pos == 0 {
            return Redraw::None;
        }
        let prev = prev_char_boundary(&self.text, self.pos);
        let removed = self.text.remove(prev);
        self.pos = prev;
        Redraw::Backspace {
            removed,
            tail: self.tail().to_string(),
        }
    }

    pub fn delete(&mut self) -> Redraw {
        if self.pos == self.text.len() {
            return Redraw::None;
        }
        self.text.remove(self.pos);
        Redraw::Delete {
            tail: self.tail().to_string(),
        }
    }

    pub fn move_left(&mut self) -> Redraw {
        if self.pos == 0 {
            return Redraw::None;
        }
        let prev = prev_char_boundary(&self.text, self.pos);
        let crossed = self.text[prev..self.pos].to_string();
        self.pos = prev;
        Redraw::MoveLeft(crossed)
    }

    pub fn move_right(&mut self) -> Redraw {
        if self.pos == self.text.len() {
            return Redraw::None;
        }
        let next = next_char_boundary(&self.text, self.pos);
        let crossed = self.text[self.pos..next].to_string();
        self.pos = next;
        Redraw::MoveRight(crossed)
    }

    pub fn move_home(&mut self) -> Redraw {
        if self.pos == 0 {
            return Redraw::None;
        }
        let crossed = self.text[..self.pos].to_string();
        self.pos = 0;
        Redraw::MoveLeft(crossed)
    }

    pub fn move_end(&mut self) -> Redraw {
        if self.pos == self.text.len() {
            return Redraw::None;
        }
        let crossed = self.text[self.pos..].to_string();
        self.pos = self.text.len();
        Redraw::MoveRight(crossed)
    }

    /// Swaps in a whole new line with the cursor at its end (history recall).
    pub fn replace_all(&mut self, text: &str) -> Redraw {
        let cleared = self.text[..self.pos].to_string();
        self.text = text.to_string();
        self.pos = self.text.len();
        Redraw::Replace {
            cleared,
            text: self.text.clone(),
        }
    }

    /// Empties the buffer and returns what it held. No redraw: the caller
    /// has already moved the terminal off this line.
    pub fn take(&mut self) -> String {
        self.pos = 0;
        std::mem::take(&mut self.text)
    }
}

/// Byte offset of the character boundary before `pos`.
fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Byte offset of the character boundary after `pos`.
fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(1)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}
