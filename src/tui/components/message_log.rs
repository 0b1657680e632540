//! # MessageLog Component
//!
//! Scrollable view of the conversation history.
//!
//! ## Responsibilities
//!
//! - Render every message, oldest first, with its role label
//! - Stick to the bottom while new content arrives
//! - Detach on scroll up, re-attach when scrolled back to the end
//!
//! ## Architecture
//!
//! `MessageLog` is a transient component (created each frame) that wraps
//! `&'a mut MessageLogState` (persistent scroll state) and a message
//! snapshot (props). The whole history is measured and rendered every
//! frame; there is no virtualization. Past `u16::MAX` rows of content the
//! oldest messages drop out of the view.

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Paragraph;
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::inference::Message;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::MessageView;
use crate::tui::event::TuiEvent;

const EMPTY_PLACEHOLDER: &str = "No messages yet. Type below and press Enter.";

/// Scroll state for the message log.
/// Must be persisted in the parent TuiState.
pub struct MessageLogState {
    pub scroll_state: ScrollViewState,
    /// When true, auto-scroll to bottom on new content
    pub stick_to_bottom: bool,
    /// Content height measured during the last render
    pub content_height: u16,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
}

impl Default for MessageLogState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageLogState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            stick_to_bottom: true,
            content_height: 0,
            viewport_height: 0,
        }
    }

    fn max_offset(&self) -> u16 {
        self.content_height.saturating_sub(self.viewport_height)
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Re-engage auto-scroll if the user has reached the bottom.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }
}

pub struct MessageLog<'a> {
    pub state: &'a mut MessageLogState,
    pub messages: &'a [Message],
}

impl<'a> MessageLog<'a> {
    pub fn new(state: &'a mut MessageLogState, messages: &'a [Message]) -> Self {
        Self { state, messages }
    }
}

impl Component for MessageLog<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.state.viewport_height = area.height;

        if self.messages.is_empty() {
            self.state.content_height = 0;
            let placeholder = Paragraph::new(EMPTY_PLACEHOLDER).style(
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            );
            frame.render_widget(placeholder, area);
            return;
        }

        let content_width = area.width.saturating_sub(1); // -1 for scrollbar
        let heights: Vec<u16> = self
            .messages
            .iter()
            .map(|m| MessageView::calculate_height(m, content_width))
            .collect();
        let (first, total) = newest_fitting(&heights);
        self.state.content_height = total;

        if !self.state.stick_to_bottom {
            self.state.clamp_scroll();
        }

        let mut scroll_view = ScrollView::new(Size::new(content_width, self.state.content_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y_offset: u16 = 0;
        for (message, &height) in self.messages[first..].iter().zip(&heights[first..]) {
            let rect = Rect::new(0, y_offset, content_width, height);
            scroll_view.render_widget(MessageView::new(message), rect);
            y_offset = y_offset.saturating_add(height);
        }

        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

/// Index of the oldest message that still fits in a `u16` tall scroll view
/// when stacking from the newest, plus the total height from there.
///
/// Scroll coordinates are `u16`, so a history taller than `u16::MAX` rows
/// loses its oldest messages from the view.
fn newest_fitting(heights: &[u16]) -> (usize, u16) {
    let mut total: u16 = 0;
    let mut first = heights.len();
    for (i, &height) in heights.iter().enumerate().rev() {
        match total.checked_add(height) {
            Some(sum) => {
                total = sum;
                first = i;
            }
            None => break,
        }
    }
    (first, total)
}

/// Implemented on the state: scrolling outlives the per-frame component.
impl EventHandler for MessageLogState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            _ => {}
        }
        None
    }
}
