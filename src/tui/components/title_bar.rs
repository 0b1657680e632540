//! # TitleBar Component
//!
//! Top status line showing the active model and the panel status.
//!
//! TitleBar is purely presentational: it receives all data as props and has
//! no internal state.
//!
//! ```text
//! Assistant Panel (model: qwen2.5-7b-instruct) | Waiting for reply
//! ```
//!
//! Session errors land in the status slot ("Error: …") and are shown in red.

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Span;

pub struct TitleBar {
    pub model_name: String,
    pub status_message: String,
}

impl TitleBar {
    pub fn new(model_name: String, status_message: String) -> Self {
        Self {
            model_name,
            status_message,
        }
    }

    fn is_error(&self) -> bool {
        self.status_message.starts_with("Error")
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let title_text = if self.status_message.is_empty() {
            format!("Assistant Panel (model: {})", self.model_name)
        } else {
            format!(
                "Assistant Panel (model: {}) | {}",
                self.model_name, self.status_message
            )
        };

        let style = if self.is_error() {
            Style::default().fg(Color::Red)
        } else {
            Style::default()
        };

        frame.render_widget(Span::styled(title_text, style), area);
    }
}
