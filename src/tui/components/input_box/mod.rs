//! # InputBox Component
//!
//! The text field of the panel.
//!
//! ## Responsibilities
//!
//! - Capture text input and editing (backspace, delete, cursor movement, paste)
//! - Insert newlines on Shift+Enter / Ctrl+J
//! - Report Enter as a submit request, without touching the draft
//!
//! ## State Management
//!
//! The text is the Submission Controller's draft, borrowed for the duration
//! of one event or one frame. Only the cursor lives here (`InputBoxState`).
//! Clearing the draft is the controller's job; it happens when a dispatch
//! settles, not when Enter is pressed.

mod cursor;
mod text_wrap;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

use cursor::CursorState;
use text_wrap::{
    MAX_VISIBLE_LINES, VERTICAL_OVERHEAD, inner_width, next_char_boundary, prev_char_boundary,
    wrap_line_count, wrap_rows,
};

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Enter pressed without Shift.
    SubmitRequested,
    /// Text or cursor changed.
    ContentChanged,
}

/// Persistent cursor state for the text field.
#[derive(Debug, Default)]
pub struct InputBoxState {
    cursor: CursorState,
}

impl InputBoxState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset after the draft has been cleared.
    pub fn reset(&mut self) {
        self.cursor.reset();
    }

    /// Required height for `draft`, clamped to the visible line limit.
    pub fn calculate_height(draft: &str, area_width: u16) -> u16 {
        let lines = wrap_line_count(draft, inner_width(area_width));
        lines.min(MAX_VISIBLE_LINES) + VERTICAL_OVERHEAD
    }
}

/// Transient wrapper pairing the cursor with the borrowed draft.
pub struct InputBox<'a> {
    pub state: &'a mut InputBoxState,
    pub draft: &'a mut String,
    /// Dim the field while a dispatch is pending (typing is still allowed).
    pub pending: bool,
}

impl<'a> InputBox<'a> {
    pub fn new(state: &'a mut InputBoxState, draft: &'a mut String, pending: bool) -> Self {
        Self {
            state,
            draft,
            pending,
        }
    }

    fn insert_str(&mut self, text: &str) {
        self.draft.insert_str(self.state.cursor.pos, text);
        self.state.cursor.pos += text.len();
    }

    /// Rows currently in view, honoring the scroll offset.
    fn visible_text(&self, area_width: u16) -> String {
        if self.state.cursor.scroll_offset == 0 {
            return self.draft.clone();
        }
        let rows = wrap_rows(self.draft.as_str(), inner_width(area_width));
        rows.iter()
            .skip(self.state.cursor.scroll_offset as usize)
            .take(MAX_VISIBLE_LINES as usize)
            .cloned()
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Component for InputBox<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.state.cursor.clamp(self.draft.as_str());
        self.state.cursor.update_scroll_offset(self.draft.as_str(), area.width);

        let border_style = if self.pending {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Green)
        };

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title("Message")
            .padding(Padding::horizontal(1));

        let paragraph = if self.draft.is_empty() {
            Paragraph::new("Ask the assistant…").style(
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )
        } else {
            Paragraph::new(self.visible_text(area.width)).style(Style::default().fg(Color::Green))
        };

        frame.render_widget(paragraph.block(block), area);

        let (x, y) = self.state.cursor.screen_pos(self.draft.as_str(), area);
        frame.set_cursor_position((x, y));
    }
}

impl EventHandler for InputBox<'_> {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        self.state.cursor.clamp(self.draft.as_str());
        let cursor = &mut self.state.cursor;

        match event {
            TuiEvent::Submit => Some(InputEvent::SubmitRequested),
            TuiEvent::InputChar(c) => {
                self.insert_str(c.encode_utf8(&mut [0; 4]));
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Newline => {
                self.insert_str("\n");
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                self.insert_str(text);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Backspace => (cursor.pos > 0).then(|| {
                let prev = prev_char_boundary(self.draft.as_str(), cursor.pos);
                self.draft.drain(prev..cursor.pos);
                cursor.pos = prev;
                InputEvent::ContentChanged
            }),
            TuiEvent::Delete => (cursor.pos < self.draft.len()).then(|| {
                let next = next_char_boundary(self.draft.as_str(), cursor.pos);
                self.draft.drain(cursor.pos..next);
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorLeft => (cursor.pos > 0).then(|| {
                cursor.pos = prev_char_boundary(self.draft.as_str(), cursor.pos);
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorRight => (cursor.pos < self.draft.len()).then(|| {
                cursor.pos = next_char_boundary(self.draft.as_str(), cursor.pos);
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorHome => {
                let line_start = self.draft[..cursor.pos]
                    .rfind('\n')
                    .map(|i| i + 1)
                    .unwrap_or(0);
                (cursor.pos != line_start).then(|| {
                    cursor.pos = line_start;
                    InputEvent::ContentChanged
                })
            }
            TuiEvent::CursorEnd => {
                let line_end = self.draft[cursor.pos..]
                    .find('\n')
                    .map(|i| cursor.pos + i)
                    .unwrap_or(self.draft.len());
                (cursor.pos != line_end).then(|| {
                    cursor.pos = line_end;
                    InputEvent::ContentChanged
                })
            }
            TuiEvent::CursorUp => cursor
                .move_line(self.draft.as_str(), true)
                .then_some(InputEvent::ContentChanged),
            TuiEvent::CursorDown => cursor
                .move_line(self.draft.as_str(), false)
                .then_some(InputEvent::ContentChanged),
            _ => None,
        }
    }
}
