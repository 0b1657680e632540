//! Streaming client for the OpenAI-style Responses API.
//!
//! Both LM Studio (v0.3.29+, no auth) and OpenRouter (bearer key) expose
//! `/responses` with SSE streaming, so one client covers both:
//! - LM Studio announces the event with an `event:` line before `data:`.
//! - OpenRouter embeds the event name in the JSON `type` field.
//!
//! Only text deltas are consumed; reasoning and tool events are ignored.

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::Sender;

use crate::inference::{
    CompletionProvider, CompletionRequest, Message, ProviderError, Role, StreamChunk,
};

// ============================================================================
// Responses API Types
// ============================================================================

/// Role in an input message (OpenAI terminology)
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
enum InputRole {
    System,
    User,
    Assistant,
}

/// A single message in the input array
#[derive(Serialize, Debug, Clone)]
struct InputMessage {
    role: InputRole,
    content: String,
}

/// The request body for the Responses API
#[derive(Serialize, Debug)]
struct ResponsesRequest {
    model: String,
    input: Vec<InputMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

/// Generic SSE payload. `type` is only present on OpenRouter streams.
#[derive(Deserialize, Debug, Default)]
struct EventPayload {
    #[serde(rename = "type")]
    event_type: Option<String>,
    #[serde(default)]
    delta: String,
    #[serde(default)]
    error: Option<ErrorPayload>,
}

#[derive(Deserialize, Debug)]
struct ErrorPayload {
    #[serde(default)]
    message: String,
}

// ============================================================================
// Translation Layer
// ============================================================================

/// Prepends the system prompt and maps panel roles onto API roles.
fn messages_to_input(system_prompt: &str, messages: &[Message]) -> Vec<InputMessage> {
    let system = (!system_prompt.is_empty()).then(|| InputMessage {
        role: InputRole::System,
        content: system_prompt.to_string(),
    });

    system
        .into_iter()
        .chain(messages.iter().map(|m| InputMessage {
            role: match m.role {
                Role::User => InputRole::User,
                Role::Assistant => InputRole::Assistant,
            },
            content: m.content.clone(),
        }))
        .collect()
}

// ============================================================================
// SSE Decoding
// ============================================================================

/// What a complete SSE record means to us.
#[derive(Debug, PartialEq)]
enum SseEvent {
    Delta(String),
    Completed,
    Failed(String),
}

/// Line-buffered SSE decoder. Network chunks may split anywhere, even inside
/// a UTF-8 sequence, so raw bytes stay in `buffer` until their newline
/// arrives and only whole lines are decoded.
#[derive(Default)]
struct SseDecoder {
    buffer: Vec<u8>,
    current_event_type: Option<String>,
}

impl SseDecoder {
    fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();

        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw).trim().to_string();

            if let Some(event_type) = line.strip_prefix("event:") {
                self.current_event_type = Some(event_type.trim().to_string());
                continue;
            }

            let Some(data) = line.strip_prefix("data:") else {
                continue;
            };
            let data = data.trim();
            let announced = self.current_event_type.take();

            if data == "[DONE]" {
                events.push(SseEvent::Completed);
                continue;
            }

            let payload: EventPayload = match serde_json::from_str(data) {
                Ok(p) => p,
                Err(e) => {
                    debug!("Skipping unparseable SSE data ({}): {}", e, data);
                    continue;
                }
            };

            let kind = announced.or_else(|| payload.event_type.clone());
            match kind.as_deref() {
                Some("response.output_text.delta") => {
                    if !payload.delta.is_empty() {
                        events.push(SseEvent::Delta(payload.delta));
                    }
                }
                Some("response.completed") => events.push(SseEvent::Completed),
                Some("response.failed") | Some("error") => {
                    let message = payload
                        .error
                        .map(|e| e.message)
                        .filter(|m| !m.is_empty())
                        .unwrap_or_else(|| "response failed".to_string());
                    events.push(SseEvent::Failed(message));
                }
                Some(other) => debug!("Ignoring SSE event type '{}'", other),
                None => debug!("Data without event type: {}", data),
            }
        }

        events
    }
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Responses API provider. `api_key` is sent as a bearer token when present.
pub struct ResponsesProvider {
    name: String,
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl ResponsesProvider {
    pub fn new(name: impl Into<String>, base_url: String, api_key: Option<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl CompletionProvider for ResponsesProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn stream_completion(
        &self,
        request: CompletionRequest<'_>,
        sender: Sender<StreamChunk>,
    ) -> Result<(), ProviderError> {
        let body = ResponsesRequest {
            model: request.model.to_string(),
            input: messages_to_input(request.system_prompt, request.messages),
            stream: Some(true),
        };

        info!(
            "{} Responses API request: model={}, input_count={}",
            self.name,
            request.model,
            body.input.len()
        );

        let mut builder = self
            .client
            .post(format!("{}/responses", self.base_url))
            .json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let mut response = builder
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        debug!("{} response status: {}", self.name, status);

        if !status.is_success() {
            let err_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("{} API error: {} - {}", self.name, status, err_body);
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: err_body,
            });
        }

        let mut decoder = SseDecoder::default();
        let mut total_content_len = 0usize;
        let mut chunk_count = 0usize;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?
        {
            debug!("Raw chunk received: {} bytes", chunk.len());
            for event in decoder.push(&chunk) {
                match event {
                    SseEvent::Delta(text) => {
                        chunk_count += 1;
                        total_content_len += text.len();
                        if sender.send(StreamChunk::Content(text)).await.is_err() {
                            warn!("Content chunk send failed: receiver dropped");
                            return Err(ProviderError::ChannelClosed);
                        }
                    }
                    SseEvent::Completed => {
                        info!(
                            "Stream complete: {} chunks, {} total content bytes",
                            chunk_count, total_content_len
                        );
                        return Ok(());
                    }
                    SseEvent::Failed(message) => {
                        warn!("{} stream reported failure: {}", self.name, message);
                        return Err(ProviderError::Api {
                            status: status.as_u16(),
                            message,
                        });
                    }
                }
            }
        }

        info!(
            "Stream ended: {} chunks processed, {} total content bytes",
            chunk_count, total_content_len
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_starts_with_system_prompt() {
        let input = messages_to_input(
            "Be brief.",
            &[Message::user("hi"), Message::assistant("hello")],
        );
        assert_eq!(input.len(), 3);
        assert_eq!(input[0].role, InputRole::System);
        assert_eq!(input[1].role, InputRole::User);
        assert_eq!(input[2].role, InputRole::Assistant);
        assert_eq!(input[2].content, "hello");
    }

    #[test]
    fn empty_system_prompt_is_omitted() {
        let input = messages_to_input("", &[Message::user("hi")]);
        assert_eq!(input.len(), 1);
        assert_eq!(input[0].role, InputRole::User);
    }

    #[test]
    fn decoder_handles_event_lines() {
        let mut decoder = SseDecoder::default();
        let events = decoder.push(
            b"event: response.output_text.delta\n\
              data: {\"delta\":\"Hel\"}\n\n\
              event: response.completed\n\
              data: {}\n",
        );
        assert_eq!(
            events,
            vec![SseEvent::Delta("Hel".into()), SseEvent::Completed]
        );
    }

    #[test]
    fn decoder_reads_embedded_type_field() {
        let mut decoder = SseDecoder::default();
        let events = decoder.push(
            b"data: {\"type\":\"response.output_text.delta\",\"delta\":\"lo\"}\n",
        );
        assert_eq!(events, vec![SseEvent::Delta("lo".into())]);
    }

    #[test]
    fn decoder_buffers_split_lines() {
        let mut decoder = SseDecoder::default();
        assert!(decoder
            .push(b"data: {\"type\":\"response.output_te")
            .is_empty());
        let events = decoder.push(b"xt.delta\",\"delta\":\"x\"}\n");
        assert_eq!(events, vec![SseEvent::Delta("x".into())]);
    }

    #[test]
    fn decoder_surfaces_failures() {
        let mut decoder = SseDecoder::default();
        let events = decoder.push(
            b"data: {\"type\":\"error\",\"error\":{\"message\":\"rate limited\"}}\n",
        );
        assert_eq!(events, vec![SseEvent::Failed("rate limited".into())]);
    }

    #[test]
    fn decoder_ignores_unknown_events() {
        let mut decoder = SseDecoder::default();
        let events = decoder.push(
            b"event: response.reasoning_text.delta\ndata: {\"delta\":\"hmm\"}\n",
        );
        assert!(events.is_empty());
    }

    #[test]
    fn decoder_keeps_characters_split_across_chunks() {
        let mut decoder = SseDecoder::default();
        let line = "data: {\"type\":\"response.output_text.delta\",\"delta\":\"café\"}\n";
        let bytes = line.as_bytes();
        // split between the two bytes of 'é'
        let split = line.find('é').unwrap() + 1;

        assert!(decoder.push(&bytes[..split]).is_empty());
        let events = decoder.push(&bytes[split..]);

        assert_eq!(events, vec![SseEvent::Delta("café".into())]);
    }
}
