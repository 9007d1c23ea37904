use super::finalize::Finalizer;
use crate::connectors::FragmentStream;
use crate::services::ServiceError;
use actix_web::web::Bytes;
use futures::stream::{self, BoxStream, StreamExt};
use tokio::time::{timeout_at, Instant};

pub type BodyStream = BoxStream<'static, Result<Bytes, ServiceError>>;

/// Forwards fragments to the client and accumulates them for the
/// finalizer. Ending the upstream hands the buffer over; any other exit
/// discards it.
struct Relay {
    upstream: FragmentStream,
    first: Option<String>,
    buffer: String,
    deadline: Instant,
    finalizer: Option<Finalizer>,
}

impl Relay {
    fn forward(mut self, fragment: String) -> Option<(Result<Bytes, ServiceError>, Self)> {
        self.buffer.push_str(&fragment);
        Some((Ok(Bytes::from(fragment)), self))
    }

    async fn fail(mut self, err: ServiceError) -> Option<(Result<Bytes, ServiceError>, Self)> {
        self.finalizer = None;
        // a body error drops the connection without flushing, so hand control
        // back once to let already forwarded chunks reach the client
        tokio::task::yield_now().await;
        tracing::error!(
            code = "c-014",
            discarded_bytes = self.buffer.len(),
            "Completion stream failed after output: {}",
            err
        );
        Some((Err(err), self))
    }

    async fn step(mut self) -> Option<(Result<Bytes, ServiceError>, Self)> {
        self.finalizer.as_ref()?;

        if let Some(first) = self.first.take() {
            return self.forward(first);
        }

        loop {
            match timeout_at(self.deadline, self.upstream.next()).await {
                Ok(Some(Ok(fragment))) if fragment.is_empty() => continue,
                Ok(Some(Ok(fragment))) => return self.forward(fragment),
                Ok(Some(Err(err))) => {
                    return self
                        .fail(ServiceError::upstream("c-014", err.to_string()))
                        .await
                }
                Err(_) => {
                    return self
                        .fail(ServiceError::timeout(
                            "c-012",
                            "Completion deadline passed mid-stream",
                        ))
                        .await
                }
                Ok(None) => {
                    if let Some(finalizer) = self.finalizer.take() {
                        finalizer.spawn(std::mem::take(&mut self.buffer));
                    }
                    return None;
                }
            }
        }
    }
}

impl Drop for Relay {
    fn drop(&mut self) {
        if self.finalizer.is_some() {
            tracing::warn!(
                code = "c-017",
                discarded_bytes = self.buffer.len(),
                "Client disconnected before the stream finished"
            );
        }
    }
}

/// Body of a committed turn. `first` is the fragment already taken from
/// `upstream` while deciding whether to commit.
pub fn relay(
    upstream: FragmentStream,
    first: Option<String>,
    deadline: Instant,
    finalizer: Finalizer,
) -> BodyStream {
    let state = Relay {
        upstream,
        first,
        buffer: String::new(),
        deadline,
        finalizer: Some(finalizer),
    };
    stream::unfold(state, Relay::step).boxed()
}
