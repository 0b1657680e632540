//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc::Sender;

use crate::core::chat::{SendCapability, SendError};
use crate::inference::{
    CompletionProvider, CompletionRequest, Message, ProviderError, StreamChunk,
};

/// Send capability that records every text it receives.
#[derive(Default)]
pub struct RecordingSender {
    calls: Mutex<Vec<String>>,
    fail: bool,
    loading: AtomicBool,
}

impl RecordingSender {
    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
            loading: AtomicBool::new(false),
        }
    }

    pub fn set_loading(&self, loading: bool) {
        self.loading.store(loading, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SendCapability for RecordingSender {
    async fn send_message(&self, text: &str) -> Result<(), SendError> {
        self.calls.lock().unwrap().push(text.to_string());
        if self.fail {
            Err(SendError::Provider(ProviderError::Network("refused".into())))
        } else {
            Ok(())
        }
    }

    fn messages(&self) -> Vec<Message> {
        self.calls().into_iter().map(Message::user).collect()
    }

    fn loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }
}

/// Owned copy of a `CompletionRequest` as the provider saw it.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub system_prompt: String,
    pub messages: Vec<Message>,
}

/// Provider that streams canned chunks, or fails.
pub struct ScriptedProvider {
    chunks: Vec<String>,
    failure: Option<String>,
    seen: Mutex<Vec<SeenRequest>>,
}

impl ScriptedProvider {
    pub fn replying(chunks: &[&str]) -> Self {
        Self {
            chunks: chunks.iter().map(|c| c.to_string()).collect(),
            failure: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            chunks: Vec::new(),
            failure: Some(message.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn stream_completion(
        &self,
        request: CompletionRequest<'_>,
        sender: Sender<StreamChunk>,
    ) -> Result<(), ProviderError> {
        self.seen.lock().unwrap().push(SeenRequest {
            system_prompt: request.system_prompt.to_string(),
            messages: request.messages.to_vec(),
        });
        if let Some(message) = &self.failure {
            return Err(ProviderError::Network(message.clone()));
        }
        for chunk in &self.chunks {
            sender
                .send(StreamChunk::Content(chunk.clone()))
                .await
                .map_err(|_| ProviderError::ChannelClosed)?;
        }
        Ok(())
    }
}

/// Creates a test App backed by a RecordingSender.
pub fn test_app() -> crate::core::state::App {
    crate::core::state::App::new(Arc::new(RecordingSender::default()), "test-model".to_string())
}
