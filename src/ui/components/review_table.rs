use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Cell, Row, Table, Widget};

use rekiken::session::quiz::ReviewRow;

use crate::ui::theme::Theme;

const PROMPT_PREVIEW_CHARS: usize = 28;

/// Per-question results shown after the last answer.
pub struct ReviewTable<'a> {
    pub rows: &'a [ReviewRow],
    pub scroll: usize,
    pub theme: &'a Theme,
}

impl<'a> ReviewTable<'a> {
    pub fn new(rows: &'a [ReviewRow], scroll: usize, theme: &'a Theme) -> Self {
        Self {
            rows,
            scroll,
            theme,
        }
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

impl Widget for ReviewTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let header = Row::new(["#", "問題", "あなたの解答", "正解", "判定"]).style(
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        );

        let rows = self.rows.iter().skip(self.scroll).map(|row| {
            let (mark, mark_color) = if row.correct {
                ("○", colors.correct())
            } else {
                ("×", colors.incorrect())
            };
            let input = match &row.input {
                Some(s) if !s.trim().is_empty() => s.clone(),
                Some(_) => "（空欄）".to_string(),
                None => "—".to_string(),
            };
            Row::new(vec![
                Cell::from(row.number.to_string()),
                Cell::from(preview(&row.prompt, PROMPT_PREVIEW_CHARS)),
                Cell::from(input),
                Cell::from(row.canonical.clone()),
                Cell::from(mark).style(Style::default().fg(mark_color)),
            ])
            .style(Style::default().fg(colors.fg()))
        });

        let table = Table::new(
            rows,
            [
                Constraint::Length(3),
                Constraint::Percentage(50),
                Constraint::Percentage(22),
                Constraint::Percentage(22),
                Constraint::Length(4),
            ],
        )
        .header(header)
        .block(
            Block::bordered()
                .title(" 解答一覧 ")
                .border_style(Style::default().fg(colors.border())),
        );
        table.render(area, buf);
    }
}
