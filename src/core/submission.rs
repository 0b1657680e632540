//! # Submission Controller
//!
//! Gates, performs and finalizes one submission attempt.
//!
//! ```text
//!            begin()                     settle()
//!   Idle ──────────────▶ Pending ──────────────────▶ Idle
//!    │  guard rejects      (send disabled,           (draft cleared,
//!    └──▶ no-op            label "Thinking…")         picker cleared)
//! ```
//!
//! The draft is cleared when the dispatch settles, whatever the outcome.
//! A failed send loses the submitted text. The input stays editable while
//! pending, and anything typed in that window is lost on settle as well.

use std::fmt;
use std::path::PathBuf;

use log::{debug, info, warn};
use serde_json::{Map, Value};

use crate::core::chat::{SendCapability, SendError};

/// Label on the send control while idle.
pub const SEND_LABEL: &str = "Send";
/// Label on the send control while a dispatch is in flight.
pub const PENDING_LABEL: &str = "Thinking…";

/// A file chosen through the attachment trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
}

/// Payload handed to the send capability.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub text: String,
    /// Accepted from the trigger but not forwarded to the transport.
    pub attachments: Vec<Attachment>,
}

pub type ContextCallback = Box<dyn Fn(&Map<String, Value>) + Send>;
pub type PlanRequestCallback = Box<dyn Fn() + Send>;

/// Optional extension points. Both slots are accepted and held, but nothing
/// in the panel invokes them yet.
#[derive(Default)]
pub struct PanelCallbacks {
    pub on_context: Option<ContextCallback>,
    pub on_plan_request: Option<PlanRequestCallback>,
}

impl fmt::Debug for PanelCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelCallbacks")
            .field("on_context", &self.on_context.is_some())
            .field("on_plan_request", &self.on_plan_request.is_some())
            .finish()
    }
}

/// Result of driving a full submit cycle.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Guard rejected the attempt; nothing was sent.
    Rejected,
    /// The send capability was invoked and has settled.
    Settled(Result<(), SendError>),
}

/// Owns the draft and the pending flag for one panel.
#[derive(Debug, Default)]
pub struct SubmissionController {
    draft: String,
    pending: bool,
    callbacks: PanelCallbacks,
}

impl SubmissionController {
    pub fn new(callbacks: PanelCallbacks) -> Self {
        Self {
            draft: String::new(),
            pending: false,
            callbacks,
        }
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Mutable access for the text field editor.
    pub fn draft_mut(&mut self) -> &mut String {
        &mut self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// The send control is disabled exactly while a dispatch is pending.
    pub fn send_enabled(&self) -> bool {
        !self.pending
    }

    pub fn send_label(&self) -> &'static str {
        if self.pending { PENDING_LABEL } else { SEND_LABEL }
    }

    pub fn callbacks(&self) -> &PanelCallbacks {
        &self.callbacks
    }

    /// Whether a draft/attachment pair may be dispatched.
    pub fn is_submittable(draft: &str, attachments: Option<&[Attachment]>) -> bool {
        !draft.trim().is_empty() || attachments.is_some_and(|a| !a.is_empty())
    }

    /// Starts a dispatch if the guard passes.
    ///
    /// Returns `None` (leaving the draft untouched) when there is nothing to
    /// send, or when a dispatch is already in flight.
    pub fn begin(&mut self, attachments: Option<Vec<Attachment>>) -> Option<Dispatch> {
        if !Self::is_submittable(&self.draft, attachments.as_deref()) {
            debug!("Submit ignored: empty draft and no attachments");
            return None;
        }
        if self.pending {
            warn!("Submit ignored: a dispatch is already in flight");
            return None;
        }

        let attachments = attachments.unwrap_or_default();
        if !attachments.is_empty() {
            info!(
                "{} attachment(s) accepted; forwarding to the transport is not implemented",
                attachments.len()
            );
        }

        self.pending = true;
        info!("Dispatch started (len={})", self.draft.len());
        Some(Dispatch {
            text: self.draft.clone(),
            attachments,
        })
    }

    /// Finalizes the in-flight dispatch. Runs on success and failure alike,
    /// and clears the whole draft, including text typed while pending.
    pub fn settle(&mut self, outcome: &Result<(), SendError>) {
        match outcome {
            Ok(()) => info!("Dispatch settled"),
            Err(e) => info!("Dispatch settled with error: {}", e),
        }
        self.draft.clear();
        self.pending = false;
    }

    /// Drives `begin`, the send, and `settle` in one call.
    pub async fn submit<S>(
        &mut self,
        sender: &S,
        attachments: Option<Vec<Attachment>>,
    ) -> SubmitOutcome
    where
        S: SendCapability + ?Sized,
    {
        let Some(dispatch) = self.begin(attachments) else {
            return SubmitOutcome::Rejected;
        };
        let result = sender.send_message(&dispatch.text).await;
        self.settle(&result);
        SubmitOutcome::Settled(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::ProviderError;
    use crate::test_support::RecordingSender;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn attachment(name: &str) -> Attachment {
        Attachment {
            path: PathBuf::from(name),
            name: name.to_string(),
            size: 3,
        }
    }

    #[test]
    fn blank_draft_without_attachments_is_rejected() {
        for draft in ["", " ", "\n\t  "] {
            for attachments in [None, Some(vec![])] {
                let mut controller = SubmissionController::default();
                controller.set_draft(draft);

                assert!(controller.begin(attachments).is_none());
                assert_eq!(controller.draft(), draft);
                assert!(!controller.is_pending());
            }
        }
    }

    #[test]
    fn begin_marks_pending_and_keeps_draft() {
        let mut controller = SubmissionController::default();
        controller.set_draft("hello");

        let dispatch = controller.begin(None).expect("guard should pass");

        assert_eq!(dispatch.text, "hello");
        assert!(controller.is_pending());
        assert!(!controller.send_enabled());
        assert_eq!(controller.send_label(), PENDING_LABEL);
        assert_eq!(controller.draft(), "hello", "draft survives until settle");
    }

    #[test]
    fn settle_clears_draft_on_success_and_failure() {
        let outcomes = [
            Ok(()),
            Err(SendError::Provider(ProviderError::ChannelClosed)),
        ];
        for outcome in outcomes {
            let mut controller = SubmissionController::default();
            controller.set_draft("hello");
            controller.begin(None);

            controller.settle(&outcome);

            assert_eq!(controller.draft(), "");
            assert!(!controller.is_pending());
            assert!(controller.send_enabled());
            assert_eq!(controller.send_label(), SEND_LABEL);
        }
    }

    #[test]
    fn settle_discards_text_typed_while_pending() {
        let mut controller = SubmissionController::default();
        controller.set_draft("first");
        controller.begin(None);

        controller.draft_mut().push_str(" and more");
        controller.settle(&Ok(()));

        assert_eq!(controller.draft(), "");
    }

    #[test]
    fn attachments_alone_pass_the_guard() {
        let mut controller = SubmissionController::default();

        let dispatch = controller
            .begin(Some(vec![attachment("notes.txt")]))
            .expect("attachments satisfy the guard");

        assert_eq!(dispatch.text, "");
        assert_eq!(dispatch.attachments.len(), 1);
        assert!(controller.is_pending());
    }

    #[test]
    fn second_begin_while_pending_is_ignored() {
        let mut controller = SubmissionController::default();
        controller.set_draft("one");
        assert!(controller.begin(None).is_some());

        controller.set_draft("two");
        assert!(controller.begin(None).is_none());
        assert_eq!(controller.draft(), "two");
        assert!(controller.is_pending());
    }

    #[tokio::test]
    async fn submit_sends_text_only_and_resets() {
        let sender = RecordingSender::default();
        let mut controller = SubmissionController::default();
        controller.set_draft("look at this");

        let outcome = controller
            .submit(&sender, Some(vec![attachment("a.png")]))
            .await;

        assert!(matches!(outcome, SubmitOutcome::Settled(Ok(()))));
        assert_eq!(sender.calls(), vec!["look at this".to_string()]);
        assert_eq!(controller.draft(), "");
        assert!(!controller.is_pending());
    }

    #[tokio::test]
    async fn failed_submit_still_clears_draft() {
        let sender = RecordingSender::failing();
        let mut controller = SubmissionController::default();
        controller.set_draft("will fail");

        let outcome = controller.submit(&sender, None).await;

        assert!(matches!(outcome, SubmitOutcome::Settled(Err(_))));
        assert_eq!(sender.calls().len(), 1);
        assert_eq!(controller.draft(), "");
        assert!(!controller.is_pending());
    }

    #[tokio::test]
    async fn rejected_submit_never_reaches_sender() {
        let sender = RecordingSender::default();
        let mut controller = SubmissionController::default();
        controller.set_draft("   ");

        let outcome = controller.submit(&sender, None).await;

        assert!(matches!(outcome, SubmitOutcome::Rejected));
        assert!(sender.calls().is_empty());
        assert_eq!(controller.draft(), "   ");
    }

    #[test]
    fn callbacks_are_held_but_not_invoked() {
        let hits = Arc::new(AtomicUsize::new(0));
        let context_hits = hits.clone();
        let plan_hits = hits.clone();
        let mut controller = SubmissionController::new(PanelCallbacks {
            on_context: Some(Box::new(move |_| {
                context_hits.fetch_add(1, Ordering::SeqCst);
            })),
            on_plan_request: Some(Box::new(move || {
                plan_hits.fetch_add(1, Ordering::SeqCst);
            })),
        });

        controller.set_draft("hi");
        let outcome = controller.begin(None);
        controller.settle(&Ok(()));

        assert!(outcome.is_some());
        assert!(controller.callbacks().on_context.is_some());
        assert!(controller.callbacks().on_plan_request.is_some());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
