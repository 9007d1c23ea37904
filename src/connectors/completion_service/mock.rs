use super::{CompletionConnector, FragmentStream};
use crate::connectors::errors::ConnectorError;
use crate::models::MessageContent;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum ScriptStep {
    Fragment(&'static str),
    Fail(ConnectorError),
    Stall(Duration),
}

/// Replays a fixed script and records every call it receives.
pub struct MockCompletionConnector {
    script: Vec<ScriptStep>,
    open_error: Option<ConnectorError>,
    calls: Mutex<Vec<(Vec<MessageContent>, String)>>,
}

impl MockCompletionConnector {
    pub fn replying(fragments: &[&'static str]) -> Self {
        Self::scripted(fragments.iter().map(|f| ScriptStep::Fragment(*f)).collect())
    }

    pub fn scripted(script: Vec<ScriptStep>) -> Self {
        Self {
            script,
            open_error: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_to_open(err: ConnectorError) -> Self {
        Self {
            script: Vec::new(),
            open_error: Some(err),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(Vec<MessageContent>, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionConnector for MockCompletionConnector {
    async fn stream_completion(
        &self,
        context: Vec<MessageContent>,
        model_version: &str,
    ) -> Result<FragmentStream, ConnectorError> {
        self.calls
            .lock()
            .unwrap()
            .push((context, model_version.to_string()));

        if let Some(err) = self.open_error.clone() {
            return Err(err);
        }

        let steps = self.script.clone();
        let stream = stream::iter(steps)
            .then(|step| async move {
                match step {
                    ScriptStep::Fragment(text) => Some(Ok(text.to_string())),
                    ScriptStep::Fail(err) => Some(Err(err)),
                    ScriptStep::Stall(delay) => {
                        tokio::time::sleep(delay).await;
                        None
                    }
                }
            })
            .filter_map(|item| async move { item });

        Ok(stream.boxed())
    }
}
