//! 键盘事件映射 (Input -> Action)
//!
//! 将按键事件转换为 Action

use crossterm::event::KeyCode;

use super::actions::Action;
use super::state::{App, AppMode};

/// 根据当前模式和按键获取对应的 Action
pub fn get_action(mode: &AppMode, key: KeyCode) -> Option<Action> {
    match mode {
        AppMode::Normal => match key {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('h') | KeyCode::Left => Some(Action::FocusLeft),
            KeyCode::Char('l') | KeyCode::Right => Some(Action::FocusRight),
            KeyCode::Char('j') | KeyCode::Down => Some(Action::MoveSelectionDown),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::MoveSelectionUp),
            KeyCode::Char('a') => Some(Action::StartAddItem),
            KeyCode::Char('c') => Some(Action::StartAddColumn),
            KeyCode::Char('t') => Some(Action::StartAddMini),
            KeyCode::Char('x') => Some(Action::StartRemoveMini),
            KeyCode::Char(' ') | KeyCode::Char('m') => Some(Action::LiftItem),
            KeyCode::Char('M') => Some(Action::LiftColumn),
            KeyCode::Char('d') => Some(Action::StartDeleteItem),
            KeyCode::Char('D') => Some(Action::StartDeleteColumn),
            KeyCode::Char('s') => Some(Action::Save),
            _ => None,
        },
        AppMode::AddingItem(_) | AppMode::AddingColumn | AppMode::AddingMini(_) => match key {
            KeyCode::Esc => Some(Action::Cancel),
            KeyCode::Enter => Some(Action::Submit),
            KeyCode::Backspace => Some(Action::DeleteChar),
            KeyCode::Char(c) => Some(Action::Input(c)),
            _ => None,
        },
        AppMode::DraggingItem | AppMode::DraggingColumn => match key {
            KeyCode::Esc => Some(Action::Cancel),
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('m') | KeyCode::Char('M') => {
                Some(Action::Submit)
            }
            KeyCode::Char('h') | KeyCode::Left => Some(Action::FocusLeft),
            KeyCode::Char('l') | KeyCode::Right => Some(Action::FocusRight),
            KeyCode::Char('j') | KeyCode::Down => Some(Action::MoveSelectionDown),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::MoveSelectionUp),
            _ => None,
        },
        AppMode::RemovingMini { .. } => match key {
            KeyCode::Esc => Some(Action::Cancel),
            KeyCode::Enter | KeyCode::Char('x') | KeyCode::Char('d') => Some(Action::Submit),
            KeyCode::Char('h') | KeyCode::Left => Some(Action::FocusLeft),
            KeyCode::Char('l') | KeyCode::Right => Some(Action::FocusRight),
            _ => None,
        },
        AppMode::Confirm(_) => match key {
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(Action::Submit),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(Action::Cancel),
            _ => None,
        },
    }
}

/// 处理按键事件，返回是否退出
pub fn handle_key_event(app: &mut App, key: KeyCode) -> bool {
    match get_action(&app.mode, key) {
        Some(action) => app.dispatch(action),
        None => false,
    }
}
