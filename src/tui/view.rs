//! Overlay view state and its key/mouse handling.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};

use crate::editor::{CloseReason, EditorSession, SessionState};

/// What the runtime must do after an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Nothing beyond a redraw.
    None,
    /// Submit the current inputs.
    Save,
    /// The overlay was closed.
    Closed(CloseReason),
}

/// Editor session plus what the terminal needs to show it.
#[derive(Debug, Default)]
pub struct EditorView {
    /// Session driven by this view.
    pub session: EditorSession,
    /// Flat index of the highlighted row.
    pub selected: usize,
    /// Whether typing edits the highlighted row.
    pub editing: bool,
    /// Caret as a char index into the highlighted row's input.
    pub caret: usize,
    /// Overlay area of the last frame; clicks outside it close the editor.
    pub overlay: Option<Rect>,
    /// Anti-forgery token read from the host page.
    pub token: Option<String>,
}

impl EditorView {
    /// What: Fresh view over a closed session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// What: Reset the selection after new tables arrived.
    pub fn reset_cursor(&mut self) {
        self.selected = 0;
        self.editing = false;
        self.caret = 0;
    }

    fn selected_input(&self) -> Option<&str> {
        self.session
            .row(self.selected)
            .map(|(_, row)| row.input.as_str())
    }

    /// What: Handle a key press.
    ///
    /// Inputs:
    /// - `ke`: Key event from crossterm
    ///
    /// Output:
    /// - Follow-up action for the runtime
    ///
    /// Details:
    /// - A pending alert swallows Enter/Esc to dismiss itself.
    /// - While editing, Esc and Enter leave edit mode instead of closing.
    /// - Esc does not close while a save is in flight.
    pub fn handle_key(&mut self, ke: KeyEvent) -> Action {
        if ke.kind != KeyEventKind::Press {
            return Action::None;
        }
        if self.session.alert().is_some() && matches!(ke.code, KeyCode::Esc | KeyCode::Enter) {
            self.session.dismiss_alert();
            return Action::None;
        }
        if ke.code == KeyCode::Char('s') && ke.modifiers.contains(KeyModifiers::CONTROL) {
            self.editing = false;
            return if self.session.state() == SessionState::Loaded {
                Action::Save
            } else {
                Action::None
            };
        }
        if self.editing {
            self.handle_edit_key(ke);
            return Action::None;
        }
        match ke.code {
            KeyCode::Esc => {
                if self.session.close(CloseReason::Escape) {
                    Action::Closed(CloseReason::Escape)
                } else {
                    Action::None
                }
            }
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                Action::None
            }
            KeyCode::Down => {
                if self.selected + 1 < self.session.row_count() {
                    self.selected += 1;
                }
                Action::None
            }
            KeyCode::Enter => {
                if self.session.state() == SessionState::Loaded
                    && let Some(len) = self.selected_input().map(|input| input.chars().count())
                {
                    self.caret = len;
                    self.editing = true;
                }
                Action::None
            }
            _ => Action::None,
        }
    }

    fn handle_edit_key(&mut self, ke: KeyEvent) {
        let Some(mut input) = self.selected_input().map(str::to_string) else {
            self.editing = false;
            return;
        };
        let len = input.chars().count();
        self.caret = self.caret.min(len);
        match ke.code {
            KeyCode::Esc | KeyCode::Enter => {
                self.editing = false;
                return;
            }
            KeyCode::Left => self.caret = self.caret.saturating_sub(1),
            KeyCode::Right => self.caret = (self.caret + 1).min(len),
            KeyCode::Home => self.caret = 0,
            KeyCode::End => self.caret = len,
            KeyCode::Backspace => {
                if self.caret > 0 {
                    let at = byte_index(&input, self.caret - 1);
                    input.remove(at);
                    self.caret -= 1;
                }
            }
            KeyCode::Delete => {
                if self.caret < len {
                    let at = byte_index(&input, self.caret);
                    input.remove(at);
                }
            }
            KeyCode::Char(c) if !ke.modifiers.contains(KeyModifiers::CONTROL) => {
                let at = byte_index(&input, self.caret);
                input.insert(at, c);
                self.caret += 1;
            }
            _ => return,
        }
        self.session.set_input(self.selected, input);
    }

    /// What: Handle a mouse event; a left click outside the overlay closes it unless a save is in flight.
    pub fn handle_mouse(&mut self, me: MouseEvent) -> Action {
        if !matches!(me.kind, MouseEventKind::Down(MouseButton::Left)) || !self.session.is_open() {
            return Action::None;
        }
        let inside = self
            .overlay
            .is_some_and(|area| area.contains(Position::new(me.column, me.row)));
        if inside {
            return Action::None;
        }
        if self.session.close(CloseReason::BackgroundClick) {
            Action::Closed(CloseReason::BackgroundClick)
        } else {
            Action::None
        }
    }
}

/// What: Byte offset of the `char_index`-th char, or the string length past the end.
fn byte_index(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map_or(text.len(), |(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{Accumulator, Interpolations};
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::empty(),
            kind: KeyEventKind::Press,
            state: KeyEventState::empty(),
        }
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::empty(),
        }
    }

    fn loaded_view() -> EditorView {
        let acc = Accumulator::new();
        acc.record("en", "greeting", "Hello".into(), Interpolations::new());
        acc.record("en", "farewell", "Bye".into(), Interpolations::new());
        let mut view = EditorView::new();
        let ticket = view.session.open();
        view.session.apply_snapshot(ticket, &acc.snapshot());
        view
    }

    #[test]
    /// What: Typing in edit mode changes the selected row at the caret.
    fn edits_selected_row() {
        let mut view = loaded_view();
        view.handle_key(key(KeyCode::Down));
        view.handle_key(key(KeyCode::Enter));
        assert!(view.editing);
        view.handle_key(key(KeyCode::Backspace));
        view.handle_key(key(KeyCode::Char('é')));
        view.handle_key(key(KeyCode::Home));
        view.handle_key(key(KeyCode::Char('¡')));
        assert_eq!(
            view.session.row(1).map(|(_, r)| r.input.as_str()),
            Some("¡Byé")
        );
        assert_eq!(view.handle_key(key(KeyCode::Esc)), Action::None);
        assert!(!view.editing);
        assert!(view.session.is_open());
    }

    #[test]
    /// What: Ctrl+S asks for a save only while loaded.
    fn ctrl_s_saves() {
        let mut view = loaded_view();
        let ctrl_s = KeyEvent {
            modifiers: KeyModifiers::CONTROL,
            ..key(KeyCode::Char('s'))
        };
        assert_eq!(view.handle_key(ctrl_s), Action::Save);
        assert!(view.session.close(CloseReason::Escape));
        assert_eq!(view.handle_key(ctrl_s), Action::None);
    }

    #[test]
    /// What: Esc outside edit mode and clicks outside the overlay close the session.
    fn escape_and_background_click_close() {
        let mut view = loaded_view();
        assert_eq!(
            view.handle_key(key(KeyCode::Esc)),
            Action::Closed(CloseReason::Escape)
        );
        assert!(!view.session.key_listener_active());

        let mut view = loaded_view();
        view.overlay = Some(Rect::new(10, 5, 40, 10));
        assert_eq!(view.handle_mouse(click(20, 8)), Action::None);
        assert_eq!(
            view.handle_mouse(click(2, 2)),
            Action::Closed(CloseReason::BackgroundClick)
        );
        assert!(!view.session.is_open());
    }

    #[test]
    /// What: Esc and background clicks leave the overlay up while saving.
    fn close_ignored_while_saving() {
        let mut view = loaded_view();
        view.overlay = Some(Rect::new(10, 5, 40, 10));
        view.session.begin_save(Some("token")).expect("save starts");
        assert_eq!(view.handle_key(key(KeyCode::Esc)), Action::None);
        assert_eq!(view.handle_mouse(click(2, 2)), Action::None);
        assert_eq!(view.session.state(), SessionState::Saving);
        assert!(view.session.is_open());
    }

    #[test]
    /// What: An alert is dismissed before Esc can close the overlay.
    fn alert_swallows_escape() {
        let mut view = loaded_view();
        let _ = view.session.begin_save(None);
        assert!(view.session.alert().is_some());
        assert_eq!(view.handle_key(key(KeyCode::Esc)), Action::None);
        assert!(view.session.alert().is_none());
        assert!(view.session.is_open());
    }
}
