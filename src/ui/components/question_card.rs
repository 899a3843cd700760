use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use rekiken::session::quiz::Verdict;

use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

pub struct QuestionCard<'a> {
    pub prompt: &'a str,
    pub input: &'a LineInput,
    pub verdict: Option<&'a Verdict>,
    pub theme: &'a Theme,
}

impl<'a> QuestionCard<'a> {
    pub fn new(
        prompt: &'a str,
        input: &'a LineInput,
        verdict: Option<&'a Verdict>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            prompt,
            input,
            verdict,
            theme,
        }
    }

    fn input_line(&self) -> Line<'a> {
        let colors = &self.theme.colors;
        let (before, cursor, after) = self.input.render_parts();
        let text_style = Style::default().fg(colors.fg());

        // Once judged the input is read-only, so the cursor is hidden.
        if self.verdict.is_some() {
            return Line::from(Span::styled(format!(" {}", self.input.value()), text_style));
        }

        let cursor_style = Style::default()
            .fg(colors.input_cursor_fg())
            .bg(colors.input_cursor_bg());
        let cursor_text = cursor.map(String::from).unwrap_or_else(|| " ".to_string());
        Line::from(vec![
            Span::styled(format!(" {before}"), text_style),
            Span::styled(cursor_text, cursor_style),
            Span::styled(after.to_string(), text_style),
        ])
    }
}

impl Widget for QuestionCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(4),
                Constraint::Length(3),
                Constraint::Length(2),
            ])
            .split(area);

        let prompt = Paragraph::new(Line::from(Span::styled(
            self.prompt,
            Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
        )))
        .wrap(Wrap { trim: false })
        .block(
            Block::bordered()
                .title(" 問題 ")
                .border_style(Style::default().fg(colors.border())),
        );
        prompt.render(layout[0], buf);

        let input_border = if self.verdict.is_some() {
            colors.border()
        } else {
            colors.border_focused()
        };
        Paragraph::new(self.input_line())
            .block(
                Block::bordered()
                    .title(" 解答 ")
                    .border_style(Style::default().fg(input_border)),
            )
            .render(layout[1], buf);

        if let Some(verdict) = self.verdict {
            let color = if verdict.correct {
                colors.correct()
            } else {
                colors.incorrect()
            };
            Paragraph::new(Line::from(Span::styled(
                format!(" {}", verdict.feedback()),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )))
            .wrap(Wrap { trim: false })
            .render(layout[2], buf);
        }
    }
}
