use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use super::{HistoryError, HistoryOracle, HistorySource};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BackgroundRequest {
    #[serde(rename = "visited?")]
    Visited { url: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitedResponse {
    pub visited: bool,
}

type Reply = oneshot::Sender<Result<VisitedResponse, HistoryError>>;

struct Envelope {
    request: BackgroundRequest,
    reply: Reply,
}

/// Each request is served on its own task and answered on its own reply
/// channel, so a slow lookup never holds up the others.
pub struct HistoryService;

impl HistoryService {
    pub fn spawn(source: Arc<dyn HistorySource>) -> (HistoryClient, JoinHandle<()>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = tokio::spawn(serve(source, receiver));
        (HistoryClient { sender }, handle)
    }
}

async fn serve(source: Arc<dyn HistorySource>, mut receiver: mpsc::UnboundedReceiver<Envelope>) {
    while let Some(Envelope { request, reply }) = receiver.recv().await {
        let source = source.clone();
        tokio::spawn(async move {
            let result = match request {
                BackgroundRequest::Visited { url } => {
                    let result = source.has_visits(&url).await;
                    if let Err(err) = &result {
                        tracing::warn!(target: "history", error = %err, url = %url, "history lookup failed");
                    }
                    result.map(|visited| VisitedResponse { visited })
                }
            };
            if reply.send(result).is_err() {
                tracing::debug!(target: "history", "requester went away before the reply");
            }
        });
    }
    tracing::debug!(target: "history", "history service stopped");
}

#[derive(Clone)]
pub struct HistoryClient {
    sender: mpsc::UnboundedSender<Envelope>,
}

impl HistoryClient {
    pub async fn request(&self, request: BackgroundRequest) -> Result<VisitedResponse, HistoryError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(Envelope { request, reply })
            .map_err(|_| HistoryError::Disconnected)?;
        response.await.map_err(|_| HistoryError::Disconnected)?
    }
}

#[async_trait]
impl HistoryOracle for HistoryClient {
    async fn is_visited(&self, url: &str) -> Result<bool, HistoryError> {
        let response = self
            .request(BackgroundRequest::Visited {
                url: url.to_string(),
            })
            .await?;
        Ok(response.visited)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::Notify;

    use super::*;
    use crate::history::VisitedUrls;

    #[test]
    fn request_uses_type_tag() {
        let request = BackgroundRequest::Visited {
            url: "https://example.com/a".into(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "visited?", "url": "https://example.com/a"})
        );
    }

    #[tokio::test]
    async fn answers_from_source() {
        let source = Arc::new(VisitedUrls::new(["https://example.com/seen"]));
        let (client, _handle) = HistoryService::spawn(source);

        assert!(client.is_visited("https://example.com/seen").await.unwrap());
        assert!(!client.is_visited("https://example.com/new").await.unwrap());
    }

    /// Blocks lookups for one URL until released.
    struct GatedSource {
        gated: &'static str,
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl HistorySource for GatedSource {
        async fn has_visits(&self, url: &str) -> Result<bool, HistoryError> {
            if url == self.gated {
                self.gate.notified().await;
                return Ok(true);
            }
            Ok(false)
        }
    }

    #[tokio::test]
    async fn slow_request_does_not_block_others() {
        let gate = Arc::new(Notify::new());
        let source = Arc::new(GatedSource {
            gated: "https://example.com/slow",
            gate: gate.clone(),
        });
        let (client, _handle) = HistoryService::spawn(source);

        let slow_client = client.clone();
        let slow = tokio::spawn(async move { slow_client.is_visited("https://example.com/slow").await });

        let fast = tokio::time::timeout(
            Duration::from_secs(5),
            client.is_visited("https://example.com/fast"),
        )
        .await
        .expect("fast request answered while slow one is pending");
        assert!(!fast.unwrap());

        gate.notify_one();
        assert!(slow.await.unwrap().unwrap());
    }

    #[tokio::test]
    async fn stopped_service_reports_disconnected() {
        let source = Arc::new(VisitedUrls::new(["https://example.com/seen"]));
        let (client, handle) = HistoryService::spawn(source);
        handle.abort();
        let _ = handle.await;

        let err = client
            .is_visited("https://example.com/seen")
            .await
            .expect_err("service is gone");
        assert!(matches!(err, HistoryError::Disconnected));
    }
}
