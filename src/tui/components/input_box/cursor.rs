//! Cursor position tracking for the InputBox.
//!
//! `CursorState` owns the cursor byte offset and the row scroll offset.
//! The text itself is the controller's draft, passed in explicitly, so the
//! cursor must tolerate the draft changing underneath it (e.g. being
//! cleared when a dispatch settles).

use ratatui::layout::Rect;
use unicode_width::UnicodeWidthStr;

use super::text_wrap::{CONTENT_OFFSET, MAX_VISIBLE_LINES, inner_width, wrap_line_count, wrap_rows};

#[derive(Debug, Default)]
pub(super) struct CursorState {
    /// Cursor position as byte offset in the draft (0..=draft.len())
    pub pos: usize,
    /// First visible wrapped row (0 when content fits)
    pub scroll_offset: u16,
}

impl CursorState {
    pub fn reset(&mut self) {
        self.pos = 0;
        self.scroll_offset = 0;
    }

    /// Pull the cursor back onto a valid char boundary of `buffer`.
    pub fn clamp(&mut self, buffer: &str) {
        self.pos = self.pos.min(buffer.len());
        while !buffer.is_char_boundary(self.pos) {
            self.pos -= 1;
        }
    }

    /// Move to the same character column on the previous/next logical line.
    /// Returns `false` at the first/last line.
    pub fn move_line(&mut self, buffer: &str, up: bool) -> bool {
        let line_start = buffer[..self.pos].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = buffer[line_start..self.pos].chars().count();

        let target_start = if up {
            if line_start == 0 {
                return false;
            }
            buffer[..line_start - 1].rfind('\n').map(|i| i + 1).unwrap_or(0)
        } else {
            match buffer[self.pos..].find('\n') {
                Some(i) => self.pos + i + 1,
                None => return false,
            }
        };

        let target_line = buffer[target_start..].split('\n').next().unwrap_or("");
        let offset: usize = target_line.chars().take(column).map(char::len_utf8).sum();
        self.pos = target_start + offset;
        true
    }

    /// Wrapped (row, column) of the cursor inside an inner width.
    fn row_col(&self, buffer: &str, width: u16) -> (u16, u16) {
        let rows = wrap_rows(&buffer[..self.pos], width);
        let row = rows.len().saturating_sub(1) as u16;

        // textwrap trims trailing spaces, so measure the raw tail of the
        // current logical line past the rows already consumed.
        let line_start = buffer[..self.pos].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let logical = &buffer[line_start..self.pos];
        let logical_rows = wrap_rows(logical, width);
        let consumed: usize = logical_rows
            .iter()
            .take(logical_rows.len().saturating_sub(1))
            .map(|r| r.chars().count())
            .sum();
        let tail: String = logical.chars().skip(consumed).collect();
        // The space textwrap broke on belongs to neither row.
        let col = if consumed == 0 {
            tail.width()
        } else {
            tail.trim_start().width()
        };
        (row, (col as u16).min(width))
    }

    /// Keep the cursor row within the visible window.
    pub fn update_scroll_offset(&mut self, buffer: &str, area_width: u16) {
        let width = inner_width(area_width);
        if wrap_line_count(buffer, width) <= MAX_VISIBLE_LINES {
            self.scroll_offset = 0;
            return;
        }
        let (row, _) = self.row_col(buffer, width);
        if row < self.scroll_offset {
            self.scroll_offset = row;
        } else if row >= self.scroll_offset + MAX_VISIBLE_LINES {
            self.scroll_offset = row + 1 - MAX_VISIBLE_LINES;
        }
    }

    /// Screen coordinates of the cursor inside `area`.
    pub fn screen_pos(&self, buffer: &str, area: Rect) -> (u16, u16) {
        let width = inner_width(area.width);
        if width == 0 {
            return (area.x + 1, area.y + 1);
        }
        let (row, col) = self.row_col(buffer, width);
        (
            area.x + CONTENT_OFFSET + col,
            area.y + 1 + row.saturating_sub(self.scroll_offset),
        )
    }
}
