use super::sse::{SseDecoder, SseEvent};
use super::{CompletionConnector, FragmentStream};
use crate::connectors::config::CompletionServiceConfig;
use crate::connectors::errors::ConnectorError;
use crate::models::MessageContent;
use actix_web::web::Bytes;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use serde::Serialize;
use std::collections::VecDeque;
use std::time::Duration;

type ByteStream = BoxStream<'static, reqwest::Result<Bytes>>;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [MessageContent],
    stream: bool,
}

/// HTTP client for any OpenAI-compatible `/chat/completions` endpoint
pub struct OpenAiCompletionClient {
    endpoint: String,
    api_key: Option<String>,
    http_client: reqwest::Client,
}

impl OpenAiCompletionClient {
    pub fn new(config: CompletionServiceConfig) -> Result<Self, ConnectorError> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|err| ConnectorError::Internal(format!("Failed to build HTTP client: {}", err)))?;

        Ok(Self {
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key,
            http_client,
        })
    }
}

#[async_trait]
impl CompletionConnector for OpenAiCompletionClient {
    #[tracing::instrument(name = "Open completion stream", skip(self, context), fields(messages = context.len()))]
    async fn stream_completion(
        &self,
        context: Vec<MessageContent>,
        model_version: &str,
    ) -> Result<FragmentStream, ConnectorError> {
        let body = ChatCompletionRequest {
            model: model_version,
            messages: &context,
            stream: true,
        };

        let mut request = self
            .http_client
            .post(&self.endpoint)
            .header("Accept", "text/event-stream")
            .json(&body);
        if let Some(api_key) = self.api_key.as_ref() {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|err| {
            tracing::error!("Completion request failed: {:?}", err);
            ConnectorError::from(err)
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::error!("Completion provider returned {}", status);
            return Err(ConnectorError::from_status(status, text));
        }

        Ok(fragments(response.bytes_stream().boxed()))
    }
}

struct StreamState {
    body: ByteStream,
    decoder: SseDecoder,
    pending: VecDeque<Result<String, ConnectorError>>,
    finished: bool,
}

impl StreamState {
    fn queue(&mut self, event: Result<SseEvent, ConnectorError>) {
        match event {
            Ok(SseEvent::Fragment(text)) => self.pending.push_back(Ok(text)),
            Ok(SseEvent::Done) => self.finished = true,
            Err(err) => {
                self.pending.push_back(Err(err));
                self.finished = true;
            }
        }
    }
}

/// Turn a raw SSE body into text fragments. Anything after `[DONE]` or the
/// first error is ignored.
fn fragments(body: ByteStream) -> FragmentStream {
    let state = StreamState {
        body,
        decoder: SseDecoder::default(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }

            match state.body.next().await {
                Some(Ok(bytes)) => {
                    for event in state.decoder.push(&bytes) {
                        if state.finished {
                            break;
                        }
                        state.queue(event);
                    }
                }
                Some(Err(err)) => {
                    tracing::warn!("Completion stream interrupted: {:?}", err);
                    state.pending.push_back(Err(ConnectorError::from(err)));
                    state.finished = true;
                }
                None => {
                    if let Some(event) = state.decoder.finish() {
                        state.queue(event);
                    }
                    state.finished = true;
                }
            }
        }
    })
    .boxed()
}
