//! # Actions
//!
//! Everything that can happen to the panel becomes an `Action`.
//! User presses Enter? That's `Action::Submit`.
//! The send capability settles? That's `Action::DispatchSettled(result)`.
//!
//! `update()` applies an action to the state and returns an `Effect` the
//! event loop must carry out. No I/O happens here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```

use log::{debug, info};

use crate::core::chat::SendError;
use crate::core::state::App;
use crate::core::submission::{Attachment, Dispatch};

/// The "Analyze" control is shown but never wired.
pub const PLAN_REQUEST_ENABLED: bool = false;

#[derive(Debug)]
pub enum Action {
    /// Submit the current draft, optionally with files from the picker.
    Submit { attachments: Option<Vec<Attachment>> },
    /// The send capability's future resolved.
    DispatchSettled(Result<(), SendError>),
    /// The disabled "Analyze" control was activated.
    RequestPlan,
    Quit,
}

#[derive(Debug, PartialEq)]
pub enum Effect {
    None,
    /// Run this dispatch against the send capability.
    Dispatch(Dispatch),
    /// Clear the text field cursor and the file picker selection.
    ResetInputs,
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Submit { attachments } => match app.controller.begin(attachments) {
            Some(dispatch) => {
                app.status_message = String::from("Waiting for reply");
                Effect::Dispatch(dispatch)
            }
            None => Effect::None,
        },
        Action::DispatchSettled(result) => {
            app.status_message = match &result {
                Ok(()) => String::from("Ready"),
                Err(e) => format!("Error: {e}"),
            };
            app.controller.settle(&result);
            Effect::ResetInputs
        }
        Action::RequestPlan => {
            if PLAN_REQUEST_ENABLED
                && let Some(callback) = &app.controller.callbacks().on_plan_request
            {
                callback();
            } else {
                debug!("Plan request ignored: control is disabled");
            }
            Effect::None
        }
        Action::Quit => {
            info!("Quit requested");
            Effect::Quit
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::submission::PanelCallbacks;
    use crate::core::submission::SubmissionController;
    use crate::inference::ProviderError;
    use crate::test_support::test_app;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn submit_with_text_dispatches() {
        let mut app = test_app();
        app.controller.set_draft("hello");

        let effect = update(&mut app, Action::Submit { attachments: None });

        assert_eq!(
            effect,
            Effect::Dispatch(Dispatch {
                text: "hello".into(),
                attachments: vec![],
            })
        );
        assert!(app.controller.is_pending());
    }

    #[test]
    fn submit_with_nothing_is_a_silent_no_op() {
        let mut app = test_app();
        app.controller.set_draft("  ");

        let effect = update(&mut app, Action::Submit { attachments: Some(vec![]) });

        assert_eq!(effect, Effect::None);
        assert_eq!(app.controller.draft(), "  ");
        assert_eq!(app.status_message, "Ready");
    }

    #[test]
    fn settled_resets_inputs_even_on_error() {
        let mut app = test_app();
        app.controller.set_draft("hello");
        update(&mut app, Action::Submit { attachments: None });

        let effect = update(
            &mut app,
            Action::DispatchSettled(Err(SendError::Provider(ProviderError::Network(
                "down".into(),
            )))),
        );

        assert_eq!(effect, Effect::ResetInputs);
        assert!(app.controller.draft().is_empty());
        assert!(!app.controller.is_pending());
        assert!(app.status_message.starts_with("Error:"));
    }

    #[test]
    fn files_with_empty_draft_dispatch_once() {
        let mut app = test_app();
        let files = vec![Attachment {
            path: PathBuf::from("/tmp/plan.pdf"),
            name: "plan.pdf".into(),
            size: 10,
        }];

        let effect = update(&mut app, Action::Submit { attachments: Some(files) });

        assert!(matches!(effect, Effect::Dispatch(_)));
    }

    #[test]
    fn plan_request_never_reaches_callback() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let mut app = test_app();
        app.controller = SubmissionController::new(PanelCallbacks {
            on_context: None,
            on_plan_request: Some(Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })),
        });

        assert_eq!(update(&mut app, Action::RequestPlan), Effect::None);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn quit_returns_quit_effect() {
        let mut app = test_app();
        assert_eq!(update(&mut app, Action::Quit), Effect::Quit);
    }
}
