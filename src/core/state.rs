//! # Application State
//!
//! Core panel state. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── session: Arc<dyn SendCapability>   // messages, loading, error (not ours)
//! ├── controller: SubmissionController   // draft + pending flag (ours)
//! ├── model_name: String                 // shown in the title bar
//! ├── status_message: String             // status bar text
//! ├── tip: Option<Tip>                   // banner content
//! └── stages: Vec<Stage>                 // stage list content
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::sync::Arc;

use crate::core::chat::{ChatSession, SendCapability};
use crate::core::config::ResolvedConfig;
use crate::core::panel::{Stage, Tip};
use crate::core::submission::{PanelCallbacks, SubmissionController};
use crate::inference::CompletionProvider;

pub struct App {
    pub session: Arc<dyn SendCapability>,
    pub controller: SubmissionController,
    pub model_name: String,
    pub status_message: String,
    pub tip: Option<Tip>,
    pub stages: Vec<Stage>,
}

impl App {
    pub fn new(session: Arc<dyn SendCapability>, model_name: String) -> Self {
        Self {
            session,
            controller: SubmissionController::new(PanelCallbacks::default()),
            model_name,
            status_message: String::from("Ready"),
            tip: None,
            stages: Vec::new(),
        }
    }

    /// Builds the panel around a fresh chat session for `provider`.
    pub fn from_config(provider: Arc<dyn CompletionProvider>, config: &ResolvedConfig) -> Self {
        let session = ChatSession::new(
            provider,
            config.model_name.clone(),
            config.system_prompt.clone(),
        );
        let mut app = Self::new(Arc::new(session), config.model_name.clone());
        app.tip = config.tip.clone();
        app.stages = config.stages.clone();
        app
    }
}
