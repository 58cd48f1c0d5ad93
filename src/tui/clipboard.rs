//! System clipboard access through arboard (X11/Wayland).
//!
//! Reads block on the display server, so the event loop calls
//! [`ClipboardSource::read_text`] from `spawn_blocking`.

use log::debug;
use std::sync::Mutex;

use crate::core::clipboard::{ClipboardError, ClipboardSource};

static SYSTEM_CLIPBOARD: Mutex<Option<arboard::Clipboard>> = Mutex::new(None);

pub struct SystemClipboard;

impl ClipboardSource for SystemClipboard {
    fn read_text(&self) -> Result<String, ClipboardError> {
        let mut guard = SYSTEM_CLIPBOARD
            .lock()
            .map_err(|_| ClipboardError::Unavailable("clipboard lock poisoned".into()))?;

        if guard.is_none() {
            let clipboard = arboard::Clipboard::new().map_err(map_error)?;
            *guard = Some(clipboard);
        }
        let Some(clipboard) = guard.as_mut() else {
            return Err(ClipboardError::Unavailable("no clipboard".into()));
        };

        match clipboard.get_text() {
            Ok(text) if text.is_empty() => Err(ClipboardError::Empty),
            Ok(text) => {
                debug!("Read {} bytes from system clipboard", text.len());
                Ok(text)
            }
            Err(e) => {
                // A dead connection stays dead; reconnect on the next read.
                *guard = None;
                Err(map_error(e))
            }
        }
    }
}

fn map_error(err: arboard::Error) -> ClipboardError {
    match err {
        arboard::Error::ContentNotAvailable | arboard::Error::ConversionFailure => {
            ClipboardError::Empty
        }
        arboard::Error::ClipboardNotSupported => {
            ClipboardError::Unavailable("no clipboard on this display".into())
        }
        arboard::Error::ClipboardOccupied => {
            ClipboardError::Unavailable("clipboard is busy".into())
        }
        arboard::Error::Unknown { description } => ClipboardError::Denied(description),
        other => ClipboardError::Unavailable(other.to_string()),
    }
}
