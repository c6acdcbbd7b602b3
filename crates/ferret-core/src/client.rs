use anyhow::{anyhow, Context, Result};
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::frame::FrameDecoder;

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    response: String,
}

/// What the network task reports back to the UI loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyEvent {
    Fragment(String),
    Done,
    Failed(String),
}

#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    endpoint: String,
    typing_delay: Duration,
}

impl ChatClient {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
            typing_delay: Duration::ZERO,
        }
    }

    /// Reveal whole (non-streamed) replies one character at a time
    pub fn with_typing_delay(mut self, delay: Duration) -> Self {
        self.typing_delay = delay;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Post `message` and hand every piece of the reply to `on_fragment`.
    ///
    /// A JSON body is treated as one whole `{response}` reply; any other body
    /// is read incrementally as `data: {"content": ...}` lines until the
    /// connection closes.
    pub async fn send<F>(&self, message: &str, mut on_fragment: F) -> Result<()>
    where
        F: FnMut(String),
    {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ChatRequest { message })
            .send()
            .await
            .with_context(|| format!("POST {}", self.endpoint))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Chat request failed with status: {}",
                response.status()
            ));
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("application/json"))
            .unwrap_or(false);

        if is_json {
            let chat_response: ChatResponse = response.json().await?;
            self.type_out(&chat_response.response, &mut on_fragment).await;
            return Ok(());
        }

        let mut decoder = FrameDecoder::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("reading reply stream")?;
            for fragment in decoder.push(&chunk) {
                on_fragment(fragment);
            }
        }
        for fragment in decoder.finish() {
            on_fragment(fragment);
        }

        if decoder.malformed_lines() > 0 {
            tracing::debug!(
                skipped = decoder.malformed_lines(),
                "Reply stream had malformed lines"
            );
        }
        Ok(())
    }

    async fn type_out<F>(&self, text: &str, on_fragment: &mut F)
    where
        F: FnMut(String),
    {
        if self.typing_delay.is_zero() {
            on_fragment(text.to_string());
            return;
        }
        for c in text.chars() {
            on_fragment(c.to_string());
            tokio::time::sleep(self.typing_delay).await;
        }
    }

    /// `send`, reported as a sequence of events ending in `Done` or `Failed`
    pub async fn send_events<F>(&self, message: &str, mut emit: F)
    where
        F: FnMut(ReplyEvent),
    {
        let result = self
            .send(message, |fragment| emit(ReplyEvent::Fragment(fragment)))
            .await;
        match result {
            Ok(()) => emit(ReplyEvent::Done),
            Err(e) => {
                tracing::error!("Chat request failed: {e:#}");
                emit(ReplyEvent::Failed(e.to_string()));
            }
        }
    }
}
