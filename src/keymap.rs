use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{Action, App, AppMode};
use crate::remote::prompt::SourceMode;
use crate::store::Storage;

/// Translate a key press into an [`Action`]. Keys that only edit a focused
/// text field are applied in place and yield `None`.
pub fn map_key<S: Storage>(app: &mut App<S>, key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }
    if app.notice.is_some() {
        return Some(Action::DismissNotice);
    }
    if app.settings.is_some() {
        return settings_key(app, key);
    }
    if app.chat.open {
        return match key.code {
            KeyCode::Esc => Some(Action::CloseChat),
            KeyCode::Enter => Some(Action::SendChat),
            _ => {
                app.chat.input.handle(key);
                None
            }
        };
    }

    match app.mode {
        AppMode::Create => create_key(app, key),
        AppMode::Loading => None,
        AppMode::Study => study_key(key),
        AppMode::History => history_key(app, key),
        AppMode::Home => home_key(app, key),
        AppMode::Cards => cards_key(key),
    }
}

/// Bracketed paste goes to whichever text field has focus.
pub fn map_paste<S: Storage>(app: &mut App<S>, text: &str) {
    if let Some(panel) = app.settings.as_mut() {
        if panel.selected == 1 {
            panel.api_key.insert_str(text.trim());
        }
    } else if app.chat.open {
        app.chat.input.insert_str(text);
    } else if app.mode == AppMode::Create {
        app.topic.insert_str(text);
    }
}

fn settings_key<S: Storage>(app: &mut App<S>, key: KeyEvent) -> Option<Action> {
    let selected = app.settings.as_ref().map_or(0, |p| p.selected);
    match key.code {
        KeyCode::Esc => Some(Action::CloseSettings),
        KeyCode::Enter => Some(Action::SaveSettings),
        KeyCode::Up | KeyCode::BackTab => Some(Action::SettingsMove(-1)),
        KeyCode::Down | KeyCode::Tab => Some(Action::SettingsMove(1)),
        KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') if selected == 0 => {
            Some(Action::SettingsToggleTransport)
        }
        _ => {
            if let Some(panel) = app.settings.as_mut().filter(|p| p.selected == 1) {
                panel.api_key.handle(key);
            }
            None
        }
    }
}

fn create_key<S: Storage>(app: &mut App<S>, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Esc => Some(Action::Quit),
        KeyCode::Tab => Some(Action::ToggleSourceMode),
        KeyCode::F(2) => Some(Action::OpenSettings),
        KeyCode::F(3) => Some(Action::OpenHistory),
        // Alt+Enter inserts a line break while pasting text by hand.
        KeyCode::Enter
            if app.source_mode == SourceMode::Paste
                && key.modifiers.contains(KeyModifiers::ALT) =>
        {
            app.topic.insert_str("\n");
            None
        }
        KeyCode::Enter => Some(Action::Submit),
        _ => {
            app.topic.handle(key);
            None
        }
    }
}

fn study_key(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Left => Some(Action::Navigate(-1)),
        KeyCode::Right => Some(Action::Navigate(1)),
        KeyCode::Up | KeyCode::Down | KeyCode::Char(' ') => Some(Action::Flip),
        KeyCode::Char('s') => Some(Action::Save),
        KeyCode::Char('n') => Some(Action::NewTopic),
        KeyCode::Char('h') => Some(Action::OpenHistory),
        KeyCode::Esc => Some(Action::Back),
        KeyCode::Char('q') => Some(Action::Quit),
        _ => None,
    }
}

fn history_key<S: Storage>(app: &App<S>, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(Action::HistoryMove(-1)),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::HistoryMove(1)),
        KeyCode::Enter => Some(Action::OpenSavedSet),
        KeyCode::Char('d') | KeyCode::Delete => app
            .selected_history_id()
            .map(|id| Action::RequestDelete(id.to_string())),
        KeyCode::Esc | KeyCode::Char('b') => Some(Action::Back),
        KeyCode::Char('q') => Some(Action::Quit),
        _ => Some(Action::ClearDeleteConfirm),
    }
}

fn home_key<S: Storage>(app: &App<S>, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(Action::CategoryMove(-1)),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::CategoryMove(1)),
        KeyCode::Enter => Some(Action::OpenCategory(app.category_selected)),
        KeyCode::Char(c @ '1'..='9') => {
            let index = c as usize - '1' as usize;
            (index < app.categories.len()).then_some(Action::OpenCategory(index))
        }
        KeyCode::Char('c') => Some(Action::OpenChat),
        KeyCode::Char('r') => Some(Action::ResetProgress),
        KeyCode::Char('h') => Some(Action::OpenHistory),
        KeyCode::F(2) => Some(Action::OpenSettings),
        KeyCode::Esc | KeyCode::Char('q') => Some(Action::Quit),
        _ => None,
    }
}

fn cards_key(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Left => Some(Action::Navigate(-1)),
        KeyCode::Right => Some(Action::Navigate(1)),
        KeyCode::Up | KeyCode::Down | KeyCode::Char(' ') => Some(Action::Flip),
        KeyCode::Char('k') | KeyCode::Enter => Some(Action::ToggleKnown),
        KeyCode::Char('x') => Some(Action::Shuffle),
        KeyCode::Char('c') => Some(Action::OpenChat),
        KeyCode::Char('r') => Some(Action::ResetProgress),
        KeyCode::F(2) => Some(Action::OpenSettings),
        KeyCode::Esc => Some(Action::Back),
        KeyCode::Char('q') => Some(Action::Quit),
        _ => None,
    }
}
