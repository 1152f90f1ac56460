//! 视图层模块
//!
//! 包含主渲染入口和各种视图组件

pub mod components;
pub mod layouts;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use super::state::{App, AppMode, ConfirmAction};
use crate::models::{ContainerRef, DragSubject};
use components::{mini_badges, render_dialog_framework, render_input_widget};
use layouts::centered_rect;

const POOL_WIDTH: u16 = 32;

/// 渲染 UI
pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // 标题
            Constraint::Min(10),   // 看板
            Constraint::Length(4), // 详情
            Constraint::Length(3), // 帮助
        ])
        .split(frame.area());

    render_title(frame, chunks[0]);
    render_board(frame, app, chunks[1]);
    render_details(frame, app, chunks[2]);
    render_help(frame, app, chunks[3]);

    // 渲染弹窗
    match &app.mode {
        AppMode::AddingItem(container) => {
            let title = match container {
                ContainerRef::Pool => "添加条目到未分配池".to_string(),
                ContainerRef::Named(id) => format!("添加条目到 {}", column_name(app, id)),
            };
            render_text_dialog(frame, &title, "名称", &app.input_buffer);
        }
        AppMode::AddingColumn => render_text_dialog(frame, "添加新列", "列名", &app.input_buffer),
        AppMode::AddingMini(id) => {
            let title = format!("给 {} 添加标签", column_name(app, id));
            render_text_dialog(frame, &title, "标签", &app.input_buffer);
        }
        AppMode::Confirm(action) => render_confirm_dialog(frame, action),
        // 拖拽模式下不需要额外弹窗，使用高亮和底部提示
        AppMode::Normal
        | AppMode::DraggingItem
        | AppMode::DraggingColumn
        | AppMode::RemovingMini { .. } => {}
    }
}

fn column_name<'a>(app: &'a App, column_id: &'a str) -> &'a str {
    app.board
        .columns()
        .iter()
        .find(|c| c.id == column_id)
        .map_or(column_id, |c| c.name.as_str())
}

fn render_title(frame: &mut Frame, area: Rect) {
    let title = Paragraph::new("📌 Corkboard 看板")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, area);
}

fn render_board(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(POOL_WIDTH)])
        .split(area);

    let holders = app.board.holders();
    let columns = &holders[..holders.len() - 1];

    if columns.is_empty() {
        let hint = Paragraph::new("暂无列，按 'c' 添加第一列")
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(hint, chunks[0]);
    } else {
        let n = u32::try_from(columns.len()).unwrap_or(u32::MAX);
        let areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(columns.iter().map(|_| Constraint::Ratio(1, n)))
            .split(chunks[0]);
        for (index, (container, column_area)) in columns.iter().zip(areas.iter()).enumerate() {
            render_holder(frame, app, *column_area, container, index);
        }
    }

    render_holder(frame, app, chunks[1], &ContainerRef::Pool, columns.len());
}

fn render_holder(frame: &mut Frame, app: &App, area: Rect, container: &ContainerRef, index: usize) {
    let items = app.board.items_in(container);
    let focused = index == app.focused_holder;
    let dragged = app.board.active_drag();

    let title = match container {
        ContainerRef::Pool => Line::from(format!("未分配池 ({})", items.len())),
        ContainerRef::Named(id) => {
            let selected = match &app.mode {
                AppMode::RemovingMini { column_id, index } if column_id == id => Some(*index),
                _ => None,
            };
            let mut spans = vec![Span::raw(format!("{} ({})", column_name(app, id), items.len()))];
            spans.extend(mini_badges(
                app.board.minis_of(id).iter().map(|m| m.name.as_str()),
                selected,
            ));
            Line::from(spans)
        }
    };

    let lifted_column = matches!(
        (dragged, container),
        (Some(DragSubject::Column { column_id }), ContainerRef::Named(id)) if column_id == id
    );
    let border_style = if lifted_column {
        Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD)
    } else if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let list_items: Vec<ListItem> = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let is_dragged = dragged.is_some_and(|s| s.id() == item.id);
            let prefix = if is_dragged { "⇅ " } else { "• " };
            let style = if focused && i == app.selected_index {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else if is_dragged {
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Green)
            };
            ListItem::new(Line::from(vec![Span::styled(
                format!("{prefix}{}", item.name),
                style,
            )]))
        })
        .collect();

    let list = List::new(list_items).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style),
    );

    let mut state = ListState::default();
    if focused && !items.is_empty() {
        state.select(Some(app.selected_index));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_details(frame: &mut Frame, app: &App, area: Rect) {
    let holder_name = match app.focused_container() {
        ContainerRef::Pool => "未分配池".to_string(),
        ContainerRef::Named(id) => column_name(app, &id).to_string(),
    };

    let content = match (app.board.active_drag(), app.selected_item()) {
        (Some(DragSubject::Column { column_id }), _) => {
            format!("正在移动列: {}\n目标位置: {}", column_name(app, column_id), holder_name)
        }
        (Some(DragSubject::Item { item_id, .. }), hovered) => {
            let name = app
                .board
                .locate(item_id)
                .and_then(|(c, i)| app.board.items_in(&c).get(i))
                .map_or("?", |item| item.name.as_str());
            let spot = hovered.map_or("末尾".to_string(), |h| format!("{} 的位置", h.name));
            format!("正在拖拽: {name}\n落点: {holder_name} / {spot}")
        }
        (None, Some(item)) => format!("条目: {}\n所在: {holder_name}  ID: {}", item.name, item.id),
        (None, None) if app.board.item_count() == 0 => {
            "暂无条目，按 'a' 添加第一个条目".to_string()
        }
        (None, None) => format!("{holder_name} 为空"),
    };

    let details = Paragraph::new(content)
        .block(Block::default().title("详情").borders(Borders::ALL))
        .wrap(Wrap { trim: true });

    frame.render_widget(details, area);
}

fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = match &app.mode {
        AppMode::Normal => {
            "[a] 添加条目  [c] 添加列  [t] 加标签  [x] 删标签  [space] 拿起  [M] 移动列  [d/D] 删除  [s] 保存  [q] 退出"
        }
        AppMode::AddingItem(_) | AppMode::AddingColumn | AppMode::AddingMini(_) => {
            "输入后按 [Enter] 完成  [Esc] 取消"
        }
        AppMode::DraggingItem => "[h/l] 换列  [j/k] 选择落点  [space] 放下  [Esc] 取消",
        AppMode::DraggingColumn => "[h/l] 选择位置  [space] 放下  [Esc] 取消",
        AppMode::RemovingMini { .. } => "[h/l] 选择标签  [Enter/x] 删除  [Esc] 取消",
        AppMode::Confirm(_) => "[y] 确认  [n] 取消",
    };

    let mut text = help_text.to_string();
    if let Some(message) = app.message.as_deref().filter(|m| !m.is_empty()) {
        text = format!("{text}  |  {message}");
    }
    if app.board.dirty {
        text.push_str("  *");
    }

    let help = Paragraph::new(text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(help, area);
}

fn render_text_dialog(frame: &mut Frame, title: &str, label: &str, value: &str) {
    let area = centered_rect(60, 30, frame.area());
    let inner = render_dialog_framework(frame, area, title);
    render_input_widget(frame, inner, label, value);
}

fn render_confirm_dialog(frame: &mut Frame, action: &ConfirmAction) {
    let area = centered_rect(50, 20, frame.area());
    frame.render_widget(Clear, area);

    let message = match action {
        ConfirmAction::DeleteItem(_) => "确认删除该条目？",
        ConfirmAction::DeleteColumn(_) => "确认删除该列？列中的条目将按配置移入未分配池或丢弃",
    };

    let dialog = Paragraph::new(format!("{}\n\n[y] 确认  [n] 取消", message))
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: true })
        .block(Block::default().title("⚠️ 确认操作").borders(Borders::ALL));

    frame.render_widget(dialog, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::config::Config;
    use crate::storage::JsonStore;
    use crate::ui::actions::Action;
    use ratatui::{Terminal, backend::TestBackend};

    fn screen_text(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_render_board_with_columns_and_pool() {
        let dir = tempfile::tempdir().unwrap();
        let mut board = Board::new();
        let todo = board.add_column("Todo").unwrap();
        board.add_item("alpha", &ContainerRef::Named(todo.clone()));
        board.add_pool_item("beta");
        board.add_mini(&todo, "p1");
        let mut app = App::new(board, JsonStore::new(dir.path()), &Config::default());

        let text = screen_text(&mut app);
        assert!(text.contains("Todo"));
        assert!(text.contains("alpha"));
        assert!(text.contains("beta"));
        assert!(text.contains("[p1]"));
    }

    #[test]
    fn test_render_every_mode() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::new(Board::new(), JsonStore::new(dir.path()), &Config::default());
        screen_text(&mut app);

        app.dispatch(Action::StartAddColumn);
        screen_text(&mut app);
        for c in "Doing".chars() {
            app.dispatch(Action::Input(c));
        }
        app.dispatch(Action::Submit);
        app.dispatch(Action::StartAddItem);
        screen_text(&mut app);
        app.dispatch(Action::Input('z'));
        app.dispatch(Action::Submit);

        app.dispatch(Action::LiftItem);
        assert!(screen_text(&mut app).contains("z"));
        app.dispatch(Action::FocusRight);
        screen_text(&mut app);
        app.dispatch(Action::Submit);

        app.focused_holder = 0;
        app.dispatch(Action::LiftColumn);
        screen_text(&mut app);
        app.dispatch(Action::Cancel);

        app.dispatch(Action::StartAddMini);
        app.dispatch(Action::Input('q'));
        app.dispatch(Action::Submit);
        app.dispatch(Action::StartRemoveMini);
        let text = screen_text(&mut app);
        assert!(text.contains("[q]"));
        assert!(text.contains("[Enter/x]"));
        app.dispatch(Action::Cancel);

        app.dispatch(Action::StartDeleteColumn);
        let text = screen_text(&mut app);
        assert!(text.contains("[y]"));
    }
}
