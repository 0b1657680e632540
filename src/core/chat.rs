//! # Chat Session
//!
//! The send capability the panel consumes, plus the session that backs it.
//!
//! ```text
//! SubmissionController ──send_message(text)──▶ ChatSession ──▶ CompletionProvider
//!          ▲                                      │
//!          └──── messages() / loading() ◀─────────┘   (render loop reads snapshots)
//! ```
//!
//! The session owns the message history, the loading flag and the last
//! error. The controller never touches history directly.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use log::{debug, info, warn};

use crate::inference::{
    CompletionProvider, CompletionRequest, Message, ProviderError, Role, StreamChunk,
};
use crate::inference::types::replace_typography;

/// Failure reported by a send capability.
#[derive(Debug)]
pub enum SendError {
    /// The transport failed to produce a response.
    Provider(ProviderError),
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendError::Provider(e) => write!(f, "send failed: {e}"),
        }
    }
}

impl std::error::Error for SendError {}

impl From<ProviderError> for SendError {
    fn from(e: ProviderError) -> Self {
        SendError::Provider(e)
    }
}

/// The external collaborator that transports a message and produces replies.
#[async_trait]
pub trait SendCapability: Send + Sync {
    /// Sends `text` and resolves once the reply has settled.
    async fn send_message(&self, text: &str) -> Result<(), SendError>;

    /// Snapshot of the conversation, oldest first.
    fn messages(&self) -> Vec<Message>;

    /// True while a send is being processed.
    fn loading(&self) -> bool;

    /// The most recent send failure, if any.
    fn error(&self) -> Option<String> {
        None
    }
}

#[derive(Default)]
struct SessionState {
    messages: Vec<Message>,
    loading: bool,
    error: Option<String>,
}

/// Conversation backed by a completion provider.
pub struct ChatSession {
    provider: Arc<dyn CompletionProvider>,
    model: String,
    system_prompt: String,
    state: Mutex<SessionState>,
}

impl ChatSession {
    pub fn new(provider: Arc<dyn CompletionProvider>, model: String, system_prompt: String) -> Self {
        Self {
            provider,
            model,
            system_prompt,
            state: Mutex::new(SessionState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends streamed text to the trailing assistant message, creating it
    /// on the first chunk.
    fn append_assistant_text(&self, text: &str) {
        let normalized = replace_typography(text);
        let mut state = self.state();
        match state.messages.last_mut() {
            Some(last) if last.role == Role::Assistant => last.content.push_str(&normalized),
            _ => state.messages.push(Message::assistant(normalized)),
        }
    }
}

#[async_trait]
impl SendCapability for ChatSession {
    async fn send_message(&self, text: &str) -> Result<(), SendError> {
        let history = {
            let mut state = self.state();
            state.messages.push(Message::user(text));
            state.loading = true;
            state.error = None;
            state.messages.clone()
        };

        info!(
            "Sending message via {} (history={}, len={})",
            self.provider.name(),
            history.len(),
            text.len()
        );

        let (chunk_tx, mut chunk_rx) = tokio::sync::mpsc::channel::<StreamChunk>(100);
        let request = CompletionRequest {
            system_prompt: &self.system_prompt,
            messages: &history,
            model: &self.model,
        };

        let stream = self.provider.stream_completion(request, chunk_tx);
        let drain = async {
            let mut received = 0usize;
            while let Some(chunk) = chunk_rx.recv().await {
                match chunk {
                    StreamChunk::Content(text) => {
                        received += text.len();
                        self.append_assistant_text(&text);
                    }
                }
            }
            received
        };

        let (result, received) = futures::join!(stream, drain);
        debug!("Drained {} content bytes", received);

        let mut state = self.state();
        state.loading = false;
        match result {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("Send failed: {}", e);
                state.error = Some(e.to_string());
                Err(SendError::Provider(e))
            }
        }
    }

    fn messages(&self) -> Vec<Message> {
        self.state().messages.clone()
    }

    fn loading(&self) -> bool {
        self.state().loading
    }

    fn error(&self) -> Option<String> {
        self.state().error.clone()
    }
}
