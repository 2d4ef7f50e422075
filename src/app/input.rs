use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::{Mode, action::Action, state::App, state::Dialog};

impl App {
    pub fn actions_from_event(&mut self, ev: Event) -> Vec<Action> {
        match ev {
            Event::Key(key) => self.actions_from_key(key),
            Event::Paste(text) => vec![Action::Paste(text)],
            Event::Resize(_, _) => Vec::new(),
            _ => Vec::new(),
        }
    }

    pub fn actions_from_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.kind == KeyEventKind::Repeat {
            let repeat_ok = matches!(
                key.code,
                KeyCode::Up
                    | KeyCode::Down
                    | KeyCode::Left
                    | KeyCode::Right
                    | KeyCode::Char('j')
                    | KeyCode::Char('k')
            );
            let input_repeat_ok = self.mode == Mode::EditQuery
                && matches!(key.code, KeyCode::Char(_) | KeyCode::Backspace);
            if !repeat_ok && !input_repeat_ok {
                return Vec::new();
            }
        } else if key.kind != KeyEventKind::Press {
            return Vec::new();
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return vec![Action::Quit];
        }
        if self.mode == Mode::EditQuery {
            return match key.code {
                KeyCode::Esc => vec![Action::InputCancel],
                KeyCode::Enter => vec![Action::InputEnter],
                KeyCode::Backspace => vec![Action::InputBackspace],
                KeyCode::Delete => vec![Action::InputDelete],
                KeyCode::Left => vec![Action::InputLeft],
                KeyCode::Right => vec![Action::InputRight],
                KeyCode::Home => vec![Action::InputHome],
                KeyCode::End => vec![Action::InputEnd],
                KeyCode::Char(c) => vec![Action::InputChar(c)],
                _ => Vec::new(),
            };
        }
        match self.dialog {
            Dialog::Help => match key.code {
                KeyCode::Char('?') | KeyCode::Char('x') | KeyCode::Char('q') | KeyCode::Esc => {
                    vec![Action::HelpClose]
                }
                KeyCode::Up | KeyCode::Char('k') => vec![Action::HelpScroll(-1)],
                KeyCode::Down | KeyCode::Char('j') => vec![Action::HelpScroll(1)],
                _ => Vec::new(),
            },
            Dialog::ConfirmDelete => match key.code {
                KeyCode::Left | KeyCode::Char('h') => vec![Action::ConfirmDeleteSelect(true)],
                KeyCode::Right | KeyCode::Char('l') => vec![Action::ConfirmDeleteSelect(false)],
                KeyCode::Char('y') | KeyCode::Char('Y') => vec![Action::ConfirmDeleteSelect(true)],
                KeyCode::Char('n') | KeyCode::Char('N') => {
                    vec![Action::ConfirmDeleteSelect(false)]
                }
                KeyCode::Esc => vec![Action::ConfirmDeleteCancel],
                KeyCode::Enter => vec![Action::ConfirmDeleteConfirm],
                _ => Vec::new(),
            },
            Dialog::Detail => match key.code {
                KeyCode::Esc | KeyCode::Char('x') | KeyCode::Char('q') => {
                    vec![Action::DetailClose]
                }
                KeyCode::Down | KeyCode::Char('j') => vec![Action::TreeMove(1)],
                KeyCode::Up | KeyCode::Char('k') => vec![Action::TreeMove(-1)],
                KeyCode::PageDown => vec![Action::TreeMove(10)],
                KeyCode::PageUp => vec![Action::TreeMove(-10)],
                KeyCode::Enter | KeyCode::Char(' ') => vec![Action::TreeToggle],
                KeyCode::Char('m') => vec![Action::OpenMagnet],
                KeyCode::Char('t') => vec![Action::SaveTorrentFile],
                KeyCode::Char('d') => vec![Action::ConfirmDeleteOpen],
                KeyCode::Char('?') => vec![Action::HelpOpen],
                _ => Vec::new(),
            },
            Dialog::None => match key.code {
                KeyCode::Char('/') | KeyCode::Char('s') => vec![Action::EditQueryOpen],
                KeyCode::Char('a') => vec![Action::BrowseAll],
                KeyCode::Char('r') => vec![Action::Refresh],
                KeyCode::Down | KeyCode::Char('j') => vec![Action::MoveSelection(1)],
                KeyCode::Up | KeyCode::Char('k') => vec![Action::MoveSelection(-1)],
                KeyCode::Right | KeyCode::PageDown | KeyCode::Char('n') => {
                    vec![Action::PageMove(1)]
                }
                KeyCode::Left | KeyCode::PageUp | KeyCode::Char('p') => {
                    vec![Action::PageMove(-1)]
                }
                KeyCode::Enter => vec![Action::OpenSelected],
                KeyCode::Char('m') => vec![Action::OpenMagnet],
                KeyCode::Char('t') => vec![Action::SaveTorrentFile],
                KeyCode::Char('d') => vec![Action::ConfirmDeleteOpen],
                KeyCode::Char('x') | KeyCode::Esc if self.last_error.is_some() => {
                    vec![Action::ErrorClear]
                }
                KeyCode::Char('?') => vec![Action::HelpOpen],
                KeyCode::Char('q') => vec![Action::Quit],
                _ => Vec::new(),
            },
        }
    }
}
