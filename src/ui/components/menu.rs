use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use rekiken::engine::segment::SEGMENTS;

use crate::app::MenuFocus;
use crate::ui::theme::Theme;

pub struct LevelItem {
    pub key: String,
    pub label: String,
    /// Question count, or `None` when the bank failed to load.
    pub count: Option<usize>,
}

/// Level picker beside the range picker. The focused list gets the accent border.
pub struct QuizMenu<'a> {
    pub levels: Vec<LevelItem>,
    pub level_selected: usize,
    pub range_selected: usize,
    pub focus: MenuFocus,
    pub theme: &'a Theme,
}

impl<'a> QuizMenu<'a> {
    pub fn new(
        levels: Vec<LevelItem>,
        level_selected: usize,
        range_selected: usize,
        focus: MenuFocus,
        theme: &'a Theme,
    ) -> Self {
        Self {
            levels,
            level_selected,
            range_selected,
            focus,
            theme,
        }
    }

    fn item_line(&self, text: String, selected: bool, focused: bool) -> Line<'static> {
        let colors = &self.theme.colors;
        let indicator = if selected { ">" } else { " " };
        let style = if selected && focused {
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD)
        } else if selected {
            Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.muted())
        };
        Line::from(Span::styled(format!(" {indicator} {text}"), style))
    }

    fn list_block(&self, title: &'static str, focused: bool) -> Block<'static> {
        let colors = &self.theme.colors;
        let border = if focused {
            colors.border_focused()
        } else {
            colors.border()
        };
        Block::bordered()
            .title(title)
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.bg()))
    }
}

impl Widget for &QuizMenu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(self.levels.len().max(1) as u16 + 2),
                Constraint::Length(SEGMENTS.len() as u16 + 2),
                Constraint::Min(0),
            ])
            .split(area);

        let title = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "日本史 記述式クイズ",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "級と出題範囲を選んでください",
                Style::default().fg(colors.fg()),
            )),
        ])
        .alignment(Alignment::Center);
        title.render(layout[0], buf);

        let level_focused = self.focus == MenuFocus::Level;
        let level_lines: Vec<Line> = if self.levels.is_empty() {
            vec![Line::from(Span::styled(
                "  問題データがありません",
                Style::default().fg(colors.warning()),
            ))]
        } else {
            self.levels
                .iter()
                .enumerate()
                .map(|(i, level)| {
                    let detail = match level.count {
                        Some(n) => format!("{n}問"),
                        None => "読み込み失敗".to_string(),
                    };
                    self.item_line(
                        format!("[{}] {} ({detail})", level.key, level.label),
                        i == self.level_selected,
                        level_focused,
                    )
                })
                .collect()
        };
        Paragraph::new(level_lines)
            .block(self.list_block(" 級 ", level_focused))
            .render(layout[1], buf);

        let range_focused = self.focus == MenuFocus::Range;
        let range_lines: Vec<Line> = SEGMENTS
            .iter()
            .enumerate()
            .map(|(i, seg)| {
                self.item_line(seg.label.to_string(), i == self.range_selected, range_focused)
            })
            .collect();
        Paragraph::new(range_lines)
            .block(self.list_block(" 出題範囲 ", range_focused))
            .render(layout[2], buf);
    }
}
