//! # TipBanner Component
//!
//! A one-line informational banner above the panel, with an optional
//! "[x]" dismiss control.
//!
//! Dismissal is one-way: once dismissed the banner stays hidden and the
//! `on_dismiss` callback has run exactly once. Banners configured as
//! non-dismissible ignore dismissal entirely.
//!
//! The panel itself installs no `on_dismiss` callback; the slot exists for
//! embedders that want to react to dismissal.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::core::panel::{Tip, TipVariant};
use crate::tui::component::Component;

pub const DISMISS_LABEL: &str = "[x]";

pub type DismissCallback = Box<dyn FnMut() + Send>;

/// Persistent banner state.
#[derive(Default)]
pub struct TipBannerState {
    pub tip: Option<Tip>,
    dismissed: bool,
    on_dismiss: Option<DismissCallback>,
}

impl TipBannerState {
    pub fn new(tip: Option<Tip>) -> Self {
        Self {
            tip,
            dismissed: false,
            on_dismiss: None,
        }
    }

    pub fn with_on_dismiss(mut self, callback: DismissCallback) -> Self {
        self.on_dismiss = Some(callback);
        self
    }

    pub fn is_visible(&self) -> bool {
        self.tip.is_some() && !self.dismissed
    }

    /// Hide the banner. Returns `true` only on the call that hid it.
    pub fn dismiss(&mut self) -> bool {
        let Some(tip) = &self.tip else {
            return false;
        };
        if !tip.dismissible || self.dismissed {
            return false;
        }
        self.dismissed = true;
        log::debug!("Tip banner dismissed");
        if let Some(callback) = self.on_dismiss.as_mut() {
            callback();
        }
        true
    }
}

fn variant_color(variant: TipVariant) -> Color {
    match variant {
        TipVariant::Info => Color::Cyan,
        TipVariant::Success => Color::Green,
        TipVariant::Warning => Color::Yellow,
    }
}

/// Cut `text` to at most `max` columns, ending in "…" when shortened.
fn truncate_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        used += w;
        out.push(ch);
    }
    if max > 0 {
        out.push('…');
    }
    out
}

/// Transient render wrapper. Records the dismiss hitbox while rendering.
pub struct TipBanner<'a> {
    state: &'a TipBannerState,
    /// Screen area of the "[x]" control after the last render.
    pub dismiss_area: Option<Rect>,
}

impl<'a> TipBanner<'a> {
    pub fn new(state: &'a TipBannerState) -> Self {
        Self {
            state,
            dismiss_area: None,
        }
    }
}

impl Component for TipBanner<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.dismiss_area = None;
        let Some(tip) = self.state.tip.as_ref().filter(|_| self.state.is_visible()) else {
            return;
        };

        let color = variant_color(tip.variant);
        let mut spans = vec![
            Span::styled(
                format!(" {} ", tip.variant.label()),
                Style::default()
                    .fg(Color::Black)
                    .bg(color)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(tip.text.as_str(), Style::default().fg(color)),
        ];

        if tip.dismissible {
            let label_width = DISMISS_LABEL.width() as u16;
            let x = area.right().saturating_sub(label_width);
            // Keep one blank column before the control.
            let room = (x.saturating_sub(area.x) as usize).saturating_sub(1);
            let prefix: usize = spans[..2].iter().map(|s| s.content.width()).sum();
            if prefix > room {
                spans.clear();
            } else {
                spans[2] = Span::styled(
                    truncate_to_width(&tip.text, room - prefix),
                    Style::default().fg(color),
                );
            }
            let used: usize = spans.iter().map(|s| s.content.width()).sum();
            let gap = (x.saturating_sub(area.x) as usize).saturating_sub(used);
            spans.push(Span::raw(" ".repeat(gap)));
            spans.push(Span::styled(
                DISMISS_LABEL,
                Style::default().fg(Color::DarkGray),
            ));
            self.dismiss_area = Some(Rect::new(x.max(area.x), area.y, label_width, 1));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}
