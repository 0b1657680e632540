//! Frame layout for the panel.
//!
//! ```text
//! ┌ tip banner (hidden once dismissed) ─────────────────┐
//! │ title bar                                            │
//! │ message log                      │ stage list        │
//! │ input box (grows to 5 lines)                         │
//! │ [Attach] [Send] [Analyze]                            │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! The file picker, when open, is drawn last as an overlay.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use crate::core::action::PLAN_REQUEST_ENABLED;
use crate::core::state::App;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{
    FilePicker, InputBox, InputBoxState, MessageLog, SendControls, StageList, TipBanner, TitleBar,
};

/// Share of the main row given to the stage column when stages exist.
const STAGE_COLUMN_PERCENT: u16 = 35;

pub const RECEIVING_STATUS: &str = "Receiving reply";

/// A settled session error wins, then a reply still streaming in.
fn title_status(app: &App) -> String {
    match app.session.error() {
        Some(error) if !app.controller.is_pending() => format!("Error: {error}"),
        _ if app.session.loading() => String::from(RECEIVING_STATUS),
        _ => app.status_message.clone(),
    }
}

pub fn draw_ui(frame: &mut Frame, app: &mut App, tui: &mut TuiState) {
    use Constraint::{Length, Min, Percentage};

    let area = frame.area();
    let tip_height = u16::from(tui.tip_banner.is_visible());
    let input_height = InputBoxState::calculate_height(app.controller.draft(), area.width);

    let [tip_area, title_area, main_area, input_area, buttons_area] = Layout::vertical([
        Length(tip_height),
        Length(1),
        Min(0),
        Length(input_height),
        Length(1),
    ])
    .areas(area);

    let mut banner = TipBanner::new(&tui.tip_banner);
    banner.render(frame, tip_area);
    tui.tip_dismiss_area = banner.dismiss_area;

    TitleBar::new(app.model_name.clone(), title_status(app)).render(frame, title_area);

    let (log_area, stage_area) = if app.stages.is_empty() {
        (main_area, None)
    } else {
        let [log, stages] = Layout::horizontal([
            Percentage(100 - STAGE_COLUMN_PERCENT),
            Percentage(STAGE_COLUMN_PERCENT),
        ])
        .areas(main_area);
        (log, Some(stages))
    };

    let messages = app.session.messages();
    MessageLog::new(&mut tui.message_log, &messages).render(frame, log_area);
    if let Some(stage_area) = stage_area {
        StageList::new(&app.stages).render(frame, stage_area);
    }

    let pending = app.controller.is_pending();
    let send_label = app.controller.send_label();
    let send_enabled = app.controller.send_enabled();
    InputBox::new(&mut tui.input_box, app.controller.draft_mut(), pending)
        .render(frame, input_area);

    let mut controls = SendControls::new(send_label, send_enabled, PLAN_REQUEST_ENABLED);
    controls.render(frame, buttons_area);
    tui.buttons = controls.areas;

    if tui.file_picker.visible {
        FilePicker::new(&mut tui.file_picker).render(frame, area);
    }
}
