//! Read-only cards for the configured stages and their activities.

use std::str::FromStr;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};

use crate::core::panel::Stage;
use crate::tui::component::Component;

const DEFAULT_ACCENT: Color = Color::Magenta;

fn accent(stage: &Stage) -> Color {
    stage
        .accent_color
        .as_deref()
        .and_then(|c| Color::from_str(c).ok())
        .unwrap_or(DEFAULT_ACCENT)
}

/// One stage: title in the border, description, then a numbered activity list.
#[derive(Clone, Copy)]
pub struct StageCard<'a> {
    pub stage: &'a Stage,
}

impl<'a> StageCard<'a> {
    pub fn new(stage: &'a Stage) -> Self {
        Self { stage }
    }

    fn lines(&self) -> Vec<Line<'a>> {
        let color = accent(self.stage);
        let mut lines = Vec::new();
        if !self.stage.description.is_empty() {
            lines.push(Line::styled(
                self.stage.description.as_str(),
                Style::default().fg(Color::Gray),
            ));
        }
        for (i, activity) in self.stage.activities.iter().enumerate() {
            lines.push(Line::from(vec![
                Span::styled(format!("{}. ", i + 1), Style::default().fg(color)),
                Span::styled(
                    activity.name.as_str(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ]));
            if !activity.description.is_empty() {
                lines.push(Line::raw(format!("   {}", activity.description)));
            }
            if let Some(impact) = &activity.impact {
                lines.push(Line::styled(
                    format!("   Impact: {impact}"),
                    Style::default().fg(Color::DarkGray),
                ));
            }
        }
        lines
    }

    fn paragraph(&self) -> Paragraph<'a> {
        Paragraph::new(self.lines()).wrap(Wrap { trim: false })
    }

    /// Rows this card needs at `width`, borders included.
    pub fn calculate_height(stage: &Stage, width: u16) -> u16 {
        let content_width = width.saturating_sub(4);
        if content_width == 0 {
            return 2;
        }
        StageCard::new(stage).paragraph().line_count(content_width) as u16 + 2
    }
}

impl Widget for StageCard<'_> {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        let color = accent(self.stage);
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(color))
            .title(Span::styled(
                self.stage.title.as_str(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))
            .padding(Padding::horizontal(1));

        self.paragraph().block(block).render(area, buf);
    }
}

/// Vertical stack of stage cards. Cards that do not fit are cut off.
pub struct StageList<'a> {
    pub stages: &'a [Stage],
}

impl<'a> StageList<'a> {
    pub fn new(stages: &'a [Stage]) -> Self {
        Self { stages }
    }
}

impl Component for StageList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let mut y = area.y;
        for stage in self.stages {
            let remaining = area.bottom().saturating_sub(y);
            if remaining == 0 {
                break;
            }
            let height = StageCard::calculate_height(stage, area.width).min(remaining);
            frame.render_widget(StageCard::new(stage), Rect::new(area.x, y, area.width, height));
            y += height;
        }
    }
}
