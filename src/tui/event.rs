//! Keyboard and paste events → `Action`.
//!
//! Only key presses count; repeats and releases (reported when the
//! keyboard enhancement protocol is on) are dropped so a key never acts
//! twice.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{debug, warn};
use std::time::Duration;

use crate::core::action::Action;

/// Poll for an event with timeout. `None` on timeout or for unmapped input.
pub fn poll_event_timeout(timeout: Duration) -> Option<Action> {
    match event::poll(timeout) {
        Ok(true) => {}
        Ok(false) => return None,
        Err(e) => {
            warn!("Event poll failed: {}", e);
            return None;
        }
    }
    match event::read() {
        Ok(event) => map_event(event),
        Err(e) => {
            warn!("Event read failed: {}", e);
            None
        }
    }
}

/// Every action already waiting, without blocking. Events that map to
/// nothing (resize, focus, unbound keys) are skipped, not treated as the end
/// of the queue.
pub fn drain_pending() -> Vec<Action> {
    map_events(std::iter::from_fn(read_pending))
}

fn read_pending() -> Option<Event> {
    match event::poll(Duration::ZERO) {
        Ok(true) => {}
        Ok(false) => return None,
        Err(e) => {
            warn!("Event poll failed: {}", e);
            return None;
        }
    }
    event::read()
        .inspect_err(|e| warn!("Event read failed: {}", e))
        .ok()
}

pub fn map_events(events: impl IntoIterator<Item = Event>) -> Vec<Action> {
    events.into_iter().filter_map(map_event).collect()
}

pub fn map_event(event: Event) -> Option<Action> {
    match event {
        Event::Key(key) => map_key(key),
        Event::Paste(data) => Some(Action::Paste(data)),
        _ => None,
    }
}

fn map_key(key: KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    debug!("Key event: {:?} with modifiers {:?}", key.code, key.modifiers);

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    match key.code {
        KeyCode::Char('d') if ctrl => Some(Action::EndOfInput),
        KeyCode::Char('q') if ctrl => Some(Action::Quit),
        KeyCode::Char('v') if ctrl => Some(Action::PasteRequested),
        KeyCode::Char('a') if ctrl => Some(Action::CursorHome),
        KeyCode::Char('e') if ctrl => Some(Action::CursorEnd),
        // Ctrl+C belongs to the shell being imitated, and there is no
        // local process to interrupt.
        KeyCode::Char(_) if ctrl || alt => None,
        KeyCode::Char(c) => Some(Action::InsertChar(c)),

        KeyCode::Insert if key.modifiers.contains(KeyModifiers::SHIFT) => {
            Some(Action::PasteRequested)
        }
        KeyCode::Enter => Some(Action::Submit),
        KeyCode::Backspace => Some(Action::Backspace),
        KeyCode::Delete => Some(Action::Delete),
        KeyCode::Left => Some(Action::CursorLeft),
        KeyCode::Right => Some(Action::CursorRight),
        KeyCode::Home => Some(Action::CursorHome),
        KeyCode::End => Some(Action::CursorEnd),
        KeyCode::Up => Some(Action::HistoryPrevious),
        KeyCode::Down => Some(Action::HistoryNext),

        KeyCode::F(1) => Some(Action::RequestHint),
        KeyCode::F(2) => Some(Action::ListLessons),
        KeyCode::F(3) => Some(Action::ShowTask),
        KeyCode::F(4) => Some(Action::SelectNextLesson),
        KeyCode::F(5) => Some(Action::ContinueLesson),
        KeyCode::F(6) => Some(Action::StartNewLesson),
        KeyCode::F(8) => Some(Action::ResetProgress),
        KeyCode::F(9) => Some(Action::CheckSave),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> Option<Action> {
        map_event(Event::Key(KeyEvent::new(code, modifiers)))
    }

    #[test]
    fn test_printable_chars_insert() {
        assert_eq!(
            press(KeyCode::Char('l'), KeyModifiers::NONE),
            Some(Action::InsertChar('l'))
        );
        assert_eq!(
            press(KeyCode::Char('L'), KeyModifiers::SHIFT),
            Some(Action::InsertChar('L'))
        );
        assert_eq!(
            press(KeyCode::Char('é'), KeyModifiers::NONE),
            Some(Action::InsertChar('é'))
        );
    }

    #[test]
    fn test_editing_keys() {
        assert_eq!(press(KeyCode::Enter, KeyModifiers::NONE), Some(Action::Submit));
        assert_eq!(
            press(KeyCode::Backspace, KeyModifiers::NONE),
            Some(Action::Backspace)
        );
        assert_eq!(press(KeyCode::Delete, KeyModifiers::NONE), Some(Action::Delete));
        assert_eq!(
            press(KeyCode::Up, KeyModifiers::NONE),
            Some(Action::HistoryPrevious)
        );
        assert_eq!(
            press(KeyCode::Down, KeyModifiers::NONE),
            Some(Action::HistoryNext)
        );
        assert_eq!(press(KeyCode::Home, KeyModifiers::NONE), Some(Action::CursorHome));
        assert_eq!(press(KeyCode::End, KeyModifiers::NONE), Some(Action::CursorEnd));
    }

    #[test]
    fn test_paste_shortcuts() {
        assert_eq!(
            press(KeyCode::Char('v'), KeyModifiers::CONTROL),
            Some(Action::PasteRequested)
        );
        assert_eq!(
            press(KeyCode::Insert, KeyModifiers::SHIFT),
            Some(Action::PasteRequested)
        );
        assert_eq!(press(KeyCode::Insert, KeyModifiers::NONE), None);
        assert_eq!(
            map_event(Event::Paste("ls\n".into())),
            Some(Action::Paste("ls\n".into()))
        );
    }

    #[test]
    fn test_control_chords() {
        assert_eq!(press(KeyCode::Char('c'), KeyModifiers::CONTROL), None);
        assert_eq!(
            press(KeyCode::Char('d'), KeyModifiers::CONTROL),
            Some(Action::EndOfInput)
        );
        assert_eq!(
            press(KeyCode::Char('q'), KeyModifiers::CONTROL),
            Some(Action::Quit)
        );
        assert_eq!(press(KeyCode::Char('x'), KeyModifiers::ALT), None);
    }

    #[test]
    fn test_lesson_function_keys() {
        let expected = [
            (1, Action::RequestHint),
            (2, Action::ListLessons),
            (3, Action::ShowTask),
            (4, Action::SelectNextLesson),
            (5, Action::ContinueLesson),
            (6, Action::StartNewLesson),
            (8, Action::ResetProgress),
            (9, Action::CheckSave),
        ];
        for (n, action) in expected {
            assert_eq!(press(KeyCode::F(n), KeyModifiers::NONE), Some(action), "F{n}");
        }
        assert_eq!(press(KeyCode::F(7), KeyModifiers::NONE), None);
    }

    #[test]
    fn test_releases_and_repeats_ignored() {
        for kind in [KeyEventKind::Release, KeyEventKind::Repeat] {
            let event = Event::Key(KeyEvent::new_with_kind(
                KeyCode::Char('a'),
                KeyModifiers::NONE,
                kind,
            ));
            assert_eq!(map_event(event), None);
        }
    }

    #[test]
    fn test_resize_ignored() {
        assert_eq!(map_event(Event::Resize(80, 24)), None);
    }

    #[test]
    fn test_unmapped_events_do_not_stop_a_batch() {
        let key = |c| Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        let batch = [
            key('l'),
            Event::Resize(100, 30),
            Event::Key(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE)),
            key('s'),
            Event::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)),
        ];
        assert_eq!(
            map_events(batch),
            vec![Action::InsertChar('l'), Action::InsertChar('s'), Action::Submit]
        );
    }
}
