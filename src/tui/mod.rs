//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the panel,
//! and translates keyboard and mouse events into core `Action` values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Dispatch
//!
//! The event loop is synchronous. A dispatch runs on the tokio runtime and
//! reports back through an `mpsc` channel:
//!
//! ```text
//! Enter ─▶ update(Submit) ─▶ Effect::Dispatch ─▶ tokio::spawn(send_message)
//!                                                        │
//! update(DispatchSettled) ◀──── Action::DispatchSettled ◀┘
//!        │
//!        └─▶ Effect::ResetInputs (clear cursor + file picker)
//! ```
//!
//! ## Redraw Strategy
//!
//! While a reply is pending the loop redraws every ~80ms so streamed text
//! shows up. When idle it sleeps up to 500ms and only redraws on events.

mod component;
pub mod components;
pub mod event;
mod ui;

use log::{debug, info, warn};
use std::io::{self, stdout};
use std::sync::{Arc, mpsc};
use std::time::Duration;

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use ratatui::layout::Rect;

use crate::core::action::{Action, Effect, update};
use crate::core::chat::SendCapability;
use crate::core::config::ResolvedConfig;
use crate::core::state::App;
use crate::core::submission::Dispatch;
use crate::inference::{CompletionProvider, ProviderError, ResponsesProvider};
use crate::tui::component::EventHandler;
use crate::tui::components::{
    Button, ButtonAreas, FilePickerEvent, FilePickerState, InputBox, InputBoxState, InputEvent,
    MessageLogState, TipBannerState,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// TUI-specific presentation state (not part of core panel logic)
pub struct TuiState {
    pub message_log: MessageLogState,
    pub input_box: InputBoxState,
    pub file_picker: FilePickerState,
    pub tip_banner: TipBannerState,
    // Hitboxes recorded during the last draw
    pub buttons: ButtonAreas,
    pub tip_dismiss_area: Option<Rect>,
}

impl TuiState {
    pub fn new(app: &App) -> Self {
        Self {
            message_log: MessageLogState::new(),
            input_box: InputBoxState::new(),
            file_picker: FilePickerState::new(),
            tip_banner: TipBannerState::new(app.tip.clone()),
            buttons: ButtonAreas::default(),
            tip_dismiss_area: None,
        }
    }

    /// The dispatch settled: reset the text field and the file picker.
    pub fn reset_inputs(&mut self) {
        self.input_box.reset();
        self.file_picker.clear();
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> io::Result<Self> {
        // Kitty keyboard protocol lets Shift+Enter be told apart from Enter.
        // Terminals that don't support it ignore the request.
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

/// Build a provider from a resolved config's provider name and credentials.
pub fn build_provider(config: &ResolvedConfig) -> Result<Arc<dyn CompletionProvider>, ProviderError> {
    match config.provider.as_str() {
        "lmstudio" => Ok(Arc::new(ResponsesProvider::new(
            "lmstudio",
            config.lmstudio_base_url.clone(),
            None,
        ))),
        "openrouter" => {
            let Some(api_key) = config.openrouter_api_key.clone() else {
                return Err(ProviderError::Config(
                    "OpenRouter API key must be set (config file, OPENROUTER_API_KEY env var, or --provider lmstudio)".into(),
                ));
            };
            Ok(Arc::new(ResponsesProvider::new(
                "openrouter",
                config.openrouter_base_url.clone(),
                Some(api_key),
            )))
        }
        other => Err(ProviderError::Config(format!(
            "unknown provider '{other}' (expected lmstudio or openrouter)"
        ))),
    }
}

/// Route one terminal event through the panel. Returns the effect the event
/// loop must carry out.
pub fn handle_event(app: &mut App, tui: &mut TuiState, event: &TuiEvent) -> Effect {
    match event {
        TuiEvent::Resize => return Effect::None,
        TuiEvent::ForceQuit => return update(app, Action::Quit),
        _ => {}
    }

    // An open picker takes every other event
    if tui.file_picker.visible {
        return match tui.file_picker.handle_event(event) {
            Some(FilePickerEvent::Changed(files)) => {
                info!("File selection changed ({} file(s))", files.len());
                update(app, Action::Submit { attachments: Some(files) })
            }
            Some(FilePickerEvent::Dismiss) | None => Effect::None,
        };
    }

    match event {
        TuiEvent::OpenFilePicker => {
            tui.file_picker.open();
            Effect::None
        }
        TuiEvent::DismissTip => {
            tui.tip_banner.dismiss();
            Effect::None
        }
        TuiEvent::MouseClick(column, row) => handle_click(app, tui, *column, *row),
        TuiEvent::ScrollUp
        | TuiEvent::ScrollDown
        | TuiEvent::ScrollPageUp
        | TuiEvent::ScrollPageDown => {
            tui.message_log.handle_event(event);
            Effect::None
        }
        TuiEvent::Escape => Effect::None,
        _ => {
            let pending = app.controller.is_pending();
            let mut input = InputBox::new(&mut tui.input_box, app.controller.draft_mut(), pending);
            match input.handle_event(event) {
                Some(InputEvent::SubmitRequested) => update(app, Action::Submit { attachments: None }),
                Some(InputEvent::ContentChanged) | None => Effect::None,
            }
        }
    }
}

fn handle_click(app: &mut App, tui: &mut TuiState, column: u16, row: u16) -> Effect {
    if tui
        .tip_dismiss_area
        .is_some_and(|r| r.contains((column, row).into()))
    {
        tui.tip_banner.dismiss();
        return Effect::None;
    }
    match tui.buttons.hit(column, row) {
        Some(Button::Attach) => {
            tui.file_picker.open();
            Effect::None
        }
        Some(Button::Send) => update(app, Action::Submit { attachments: None }),
        None => Effect::None,
    }
}

/// Carries out an effect. Returns `false` when the loop should stop.
fn apply_effect(
    effect: Effect,
    app: &App,
    tui: &mut TuiState,
    tx: &mpsc::Sender<Action>,
) -> bool {
    match effect {
        Effect::None => {}
        Effect::Dispatch(dispatch) => spawn_dispatch(app.session.clone(), dispatch, tx.clone()),
        Effect::ResetInputs => tui.reset_inputs(),
        Effect::Quit => return false,
    }
    true
}

pub fn run(config: ResolvedConfig) -> io::Result<()> {
    let provider = build_provider(&config)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let mut app = App::from_config(provider, &config);
    let mut tui = TuiState::new(&app);

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();

    let mut needs_redraw = true;
    let mut running = true;

    while running {
        let animating = app.controller.is_pending();
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            terminal.draw(|f| ui::draw_ui(f, &mut app, &mut tui))?;
            needs_redraw = false;
        }

        let timeout = if animating {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain all pending events before next draw
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            let effect = handle_event(&mut app, &mut tui, &event);
            if !apply_effect(effect, &app, &mut tui, &tx) {
                running = false;
                break;
            }
        }

        // Settlements from dispatch tasks
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            let effect = update(&mut app, action);
            if !apply_effect(effect, &app, &mut tui, &tx) {
                running = false;
            }
        }
    }

    ratatui::restore();
    Ok(())
}

fn spawn_dispatch(session: Arc<dyn SendCapability>, dispatch: Dispatch, tx: mpsc::Sender<Action>) {
    info!("Spawning dispatch (len={})", dispatch.text.len());
    tokio::spawn(async move {
        let result = session.send_message(&dispatch.text).await;
        if let Err(e) = &result {
            warn!("Send failed: {}", e);
        }
        if tx.send(Action::DispatchSettled(result)).is_err() {
            warn!("Failed to report settled dispatch: receiver dropped");
        }
    });
}
