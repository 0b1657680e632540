//! # SendControls Component
//!
//! The button row under the text field: "Attach", the send control and the
//! permanently disabled "Analyze" affordance.
//!
//! Buttons are plain spans; the rendered row records each button's screen
//! area so the event loop can hit-test mouse clicks against them.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

use crate::tui::component::Component;

const ATTACH_LABEL: &str = "Attach";
const ANALYZE_LABEL: &str = "Analyze";
const BUTTON_GAP: u16 = 1;

/// Screen areas of the clickable buttons after the last render.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ButtonAreas {
    pub attach: Option<Rect>,
    pub send: Option<Rect>,
}

/// Which button a click landed on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Button {
    Attach,
    Send,
}

impl ButtonAreas {
    pub fn hit(&self, column: u16, row: u16) -> Option<Button> {
        let inside = |r: &Rect| r.contains((column, row).into());
        if self.attach.as_ref().is_some_and(inside) {
            Some(Button::Attach)
        } else if self.send.as_ref().is_some_and(inside) {
            Some(Button::Send)
        } else {
            None
        }
    }
}

pub struct SendControls<'a> {
    pub send_label: &'a str,
    pub send_enabled: bool,
    pub analyze_enabled: bool,
    pub areas: ButtonAreas,
}

impl<'a> SendControls<'a> {
    pub fn new(send_label: &'a str, send_enabled: bool, analyze_enabled: bool) -> Self {
        Self {
            send_label,
            send_enabled,
            analyze_enabled,
            areas: ButtonAreas::default(),
        }
    }
}

fn button(label: &str, enabled: bool, accent: Color) -> Span<'static> {
    let style = if enabled {
        Style::default()
            .fg(Color::Black)
            .bg(accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray).bg(Color::Black)
    };
    Span::styled(format!(" {label} "), style)
}

impl Component for SendControls<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let buttons = [
            button(ATTACH_LABEL, true, Color::Cyan),
            button(self.send_label, self.send_enabled, Color::Green),
            button(ANALYZE_LABEL, self.analyze_enabled, Color::Magenta),
        ];

        let mut spans = Vec::with_capacity(buttons.len() * 2);
        let mut rects = Vec::with_capacity(buttons.len());
        let mut x = area.x;
        for span in buttons {
            let width = span.content.width() as u16;
            let visible = width.min(area.right().saturating_sub(x));
            rects.push((visible > 0).then(|| Rect::new(x, area.y, visible, 1)));
            x = x.saturating_add(width + BUTTON_GAP);
            spans.push(span);
            spans.push(Span::raw(" ".repeat(BUTTON_GAP as usize)));
        }

        self.areas = ButtonAreas {
            attach: rects[0],
            // A disabled send control is not clickable.
            send: rects[1].filter(|_| self.send_enabled),
        };

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}
