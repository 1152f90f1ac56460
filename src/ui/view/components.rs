//! 通用 UI 组件

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

/// [组件] 清空区域并画出带标题的弹窗边框，返回内部可用区域
pub fn render_dialog_framework(frame: &mut Frame, area: Rect, title: &str) -> Rect {
    frame.render_widget(Clear, area);
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

/// [组件] 单行输入框，下方附带操作提示
pub fn render_input_widget(frame: &mut Frame, area: Rect, label: &str, value: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let input = Paragraph::new(format!("{value}▏"))
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .wrap(Wrap { trim: false })
        .block(Block::default().title(label).borders(Borders::ALL));
    frame.render_widget(input, chunks[0]);

    let hint = Paragraph::new("按 Enter 确认，Esc 取消").style(Style::default().fg(Color::Gray));
    frame.render_widget(hint, chunks[1]);
}

/// [组件] 列标题后面的小标签，`selected` 为正在选择删除的那个
pub fn mini_badges<'a>(
    names: impl Iterator<Item = &'a str>,
    selected: Option<usize>,
) -> Vec<Span<'static>> {
    names
        .enumerate()
        .map(|(i, name)| {
            let text = format!(" [{name}]");
            if selected == Some(i) {
                Span::styled(
                    text,
                    Style::default()
                        .fg(Color::Red)
                        .add_modifier(Modifier::BOLD | Modifier::REVERSED),
                )
            } else {
                Span::styled(text, Style::default().fg(Color::Cyan))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mini_badges() {
        let badges = mini_badges(["a", "bc"].into_iter(), Some(1));
        let text: String = badges.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, " [a] [bc]");
        assert!(badges[1].style.add_modifier.contains(Modifier::REVERSED));
        assert!(!badges[0].style.add_modifier.contains(Modifier::REVERSED));
        assert!(mini_badges(std::iter::empty(), None).is_empty());
    }
}
