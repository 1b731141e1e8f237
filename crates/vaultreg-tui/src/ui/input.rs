//! Keyboard input handling for the TUI.
//!
//! This module translates keyboard events into calls on `App`, which in turn
//! drives the form controller.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use vaultreg_core::Field;

use crate::app::{App, AppState};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    if matches!(app.state, AppState::ConfirmingQuit) {
        return Ok(handle_confirm_quit(app, key));
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('s') => app.start_submit(),
            KeyCode::Char('r') => app.reset_form(),
            _ => {}
        }
        return Ok(false);
    }

    match key.code {
        KeyCode::Esc => {
            // Going back discards the draft; ask first if there is anything to lose
            if app.has_unsaved_input() {
                app.state = AppState::ConfirmingQuit;
            } else {
                app.discard_and_quit();
                return Ok(true);
            }
        }
        KeyCode::Down | KeyCode::Tab => app.focus_next(),
        KeyCode::Up | KeyCode::BackTab => app.focus_prev(),
        KeyCode::Enter => app.activate(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Left if app.focused_field() == Some(Field::Group) => app.cycle_group(false),
        KeyCode::Right if app.focused_field() == Some(Field::Group) => app.cycle_group(true),
        KeyCode::Char(c) => app.type_char(c),
        _ => {}
    }
    Ok(false)
}

fn handle_confirm_quit(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            app.discard_and_quit();
            true
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.state = AppState::Editing;
            false
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use vaultreg_core::api::BoxFuture;
    use vaultreg_core::{ApiError, MemberPayload, MemberRegistrar};

    use super::*;
    use crate::app::FormFocus;

    struct NoopRegistrar;

    impl MemberRegistrar for NoopRegistrar {
        fn register<'a>(&'a self, _payload: &'a MemberPayload) -> BoxFuture<'a, Result<(), ApiError>> {
            Box::pin(async { Ok::<(), ApiError>(()) })
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn app() -> App {
        App::with_registrar("http://localhost:8080/adminregistry", Arc::new(NoopRegistrar))
    }

    #[test]
    fn test_esc_on_empty_form_quits() {
        let mut app = app();
        assert!(handle_input(&mut app, key(KeyCode::Esc)).unwrap());
        assert_eq!(app.state, AppState::Quitting);
    }

    #[test]
    fn test_esc_with_input_asks_first() {
        let mut app = app();
        handle_input(&mut app, key(KeyCode::Char('A'))).unwrap();
        assert!(!handle_input(&mut app, key(KeyCode::Esc)).unwrap());
        assert_eq!(app.state, AppState::ConfirmingQuit);

        // Typing while the dialog is up does not reach the form
        assert!(!handle_input(&mut app, key(KeyCode::Char('b'))).unwrap());
        assert_eq!(app.form.values().first_name, "A");

        assert!(!handle_input(&mut app, key(KeyCode::Char('n'))).unwrap());
        assert_eq!(app.state, AppState::Editing);

        handle_input(&mut app, key(KeyCode::Esc)).unwrap();
        assert!(handle_input(&mut app, key(KeyCode::Char('y'))).unwrap());
        assert!(!app.has_unsaved_input());
    }

    #[test]
    fn test_tab_and_typing() {
        let mut app = app();
        handle_input(&mut app, key(KeyCode::Tab)).unwrap();
        assert_eq!(app.focus, FormFocus::Field(Field::LastName));
        for c in "Ofori".chars() {
            handle_input(&mut app, key(KeyCode::Char(c))).unwrap();
        }
        assert_eq!(app.form.values().last_name, "Ofori");
    }

    #[test]
    fn test_space_toggles_flag() {
        let mut app = app();
        app.focus = FormFocus::Field(Field::IsLeader);
        handle_input(&mut app, key(KeyCode::Char(' '))).unwrap();
        assert!(app.form.values().is_leader);
        handle_input(&mut app, key(KeyCode::Enter)).unwrap();
        assert!(!app.form.values().is_leader);
    }

    #[test]
    fn test_arrows_cycle_group_only_when_focused() {
        let mut app = app();
        handle_input(&mut app, key(KeyCode::Right)).unwrap();
        assert_eq!(app.form.values().group, "");

        app.focus = FormFocus::Field(Field::Group);
        handle_input(&mut app, key(KeyCode::Right)).unwrap();
        handle_input(&mut app, key(KeyCode::Right)).unwrap();
        assert_eq!(app.form.values().group, "2");
        handle_input(&mut app, key(KeyCode::Left)).unwrap();
        assert_eq!(app.form.values().group, "1");
    }

    #[test]
    fn test_ctrl_r_clears() {
        let mut app = app();
        handle_input(&mut app, key(KeyCode::Char('Z'))).unwrap();
        handle_input(&mut app, ctrl('r')).unwrap();
        assert!(!app.has_unsaved_input());
        assert!(app.form.touched().is_empty());
    }

    #[tokio::test]
    async fn test_ctrl_s_on_empty_form_shows_errors() {
        let mut app = app();
        handle_input(&mut app, ctrl('s')).unwrap();
        assert!(!app.form.phase().is_submitting());
        assert!(app.form.visible_error(Field::Phone).is_some());
    }
}
