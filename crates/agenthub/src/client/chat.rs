use std::future::Future;
use std::time::Duration;

use futures::{Stream, StreamExt};
use reqwest::Method;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::http::{check_status, Access, ApiClient};
use super::sse::{self, LineDecoder, StreamFrame};
use crate::errors::{ChatError, ChatResult};
use crate::models::message::{ChatHistory, ChatMessage, ChatRequest};

pub type AgentId = i64;

/// Sends chat turns to an agent and follows the streamed reply.
#[derive(Debug, Clone)]
pub struct StreamingChatClient {
    api: ApiClient,
}

impl StreamingChatClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Sends `message` and returns the final assistant text.
    ///
    /// `on_progress` receives the full reply text each time a new snapshot
    /// arrives; every call supersedes the previous one.
    pub async fn send<F>(&self, agent_id: AgentId, message: &str, on_progress: F) -> ChatResult<String>
    where
        F: FnMut(&str),
    {
        self.send_with_cancel(agent_id, message, &CancellationToken::new(), on_progress)
            .await
    }

    /// Like [`send`](Self::send), failing with [`ChatError::Cancelled`] as soon
    /// as `cancel` fires.
    pub async fn send_with_cancel<F>(
        &self,
        agent_id: AgentId,
        message: &str,
        cancel: &CancellationToken,
        on_progress: F,
    ) -> ChatResult<String>
    where
        F: FnMut(&str),
    {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let idle_timeout = self.api.config().idle_timeout;
        let request = self
            .api
            .request(Method::POST, &format!("agents/{}/chat", agent_id), Access::Required)?
            .header("Accept", "text/event-stream")
            .json(&ChatRequest { message });

        debug!(agent_id, "opening chat stream");
        let response = guarded(request.send(), idle_timeout, cancel).await??;
        let response = check_status(response).await?;

        let body = response.bytes_stream();
        tokio::pin!(body);
        let reply = consume_stream(body, idle_timeout, cancel, on_progress).await?;
        debug!(agent_id, chars = reply.chars().count(), "chat stream finished");
        Ok(reply)
    }

    pub async fn history(&self, agent_id: AgentId) -> ChatResult<Vec<ChatMessage>> {
        let history: ChatHistory = self
            .api
            .get(&format!("agents/{}/history", agent_id), Access::Required)
            .await?;
        Ok(history.messages)
    }

    pub async fn clear_history(&self, agent_id: AgentId) -> ChatResult<()> {
        let request = self.api.request(
            Method::DELETE,
            &format!("agents/{}/history", agent_id),
            Access::Required,
        )?;
        self.api.send_empty(request).await?;
        info!(agent_id, "chat history cleared");
        Ok(())
    }
}

/// Awaits `fut` unless `cancel` fires or `idle_timeout` elapses first.
async fn guarded<T>(
    fut: impl Future<Output = T>,
    idle_timeout: Option<Duration>,
    cancel: &CancellationToken,
) -> ChatResult<T> {
    let bounded = async {
        match idle_timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| ChatError::Timeout(limit)),
            None => Ok(fut.await),
        }
    };

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ChatError::Cancelled),
        result = bounded => result,
    }
}

/// Drives the read loop over a response body until `[DONE]`, an error frame
/// or the end of the stream.
pub(crate) async fn consume_stream<S, B, E, F>(
    mut body: S,
    idle_timeout: Option<Duration>,
    cancel: &CancellationToken,
    mut on_progress: F,
) -> ChatResult<String>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Into<ChatError>,
    F: FnMut(&str),
{
    let mut decoder = LineDecoder::new();
    let mut full_text = String::new();

    loop {
        let lines = match guarded(body.next(), idle_timeout, cancel).await? {
            Some(chunk) => {
                let chunk = chunk.map_err(Into::<ChatError>::into)?;
                decoder.push(chunk.as_ref())
            }
            None => {
                // Closed without the sentinel: whatever arrived is the reply.
                if let Some(tail) = decoder.finish() {
                    apply_line(&tail, &mut full_text, &mut on_progress)?;
                }
                return Ok(full_text);
            }
        };

        for line in lines {
            if apply_line(&line, &mut full_text, &mut on_progress)? {
                return Ok(full_text);
            }
        }
    }
}

/// Applies one line to the accumulated reply; returns true on `[DONE]`.
fn apply_line<F: FnMut(&str)>(
    line: &str,
    full_text: &mut String,
    on_progress: &mut F,
) -> ChatResult<bool> {
    match sse::parse_line(line) {
        Ok(Some(StreamFrame::Done)) => Ok(true),
        Ok(Some(StreamFrame::Content(snapshot))) => {
            *full_text = snapshot;
            on_progress(full_text);
            Ok(false)
        }
        Ok(Some(StreamFrame::Error(message))) => Err(ChatError::Stream(message)),
        Ok(None) => Ok(false),
        Err(malformed) => {
            debug!("skipping frame: {}", malformed);
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::stream;

    type Chunk = Result<Bytes, ChatError>;

    fn chunks(parts: &[&str]) -> Vec<Chunk> {
        parts
            .iter()
            .map(|p| Ok(Bytes::copy_from_slice(p.as_bytes())))
            .collect()
    }

    async fn run(parts: &[&str]) -> (ChatResult<String>, Vec<String>) {
        let mut seen = Vec::new();
        let result = consume_stream(
            stream::iter(chunks(parts)),
            None,
            &CancellationToken::new(),
            |text: &str| seen.push(text.to_string()),
        )
        .await;
        (result, seen)
    }

    #[tokio::test]
    async fn test_snapshots_replace_rather_than_append() {
        let (result, seen) = run(&[
            "data: {\"content\":\"Hi\"}\n",
            "data: {\"content\":\"Hi there\"}\n",
            "data: [DONE]\n",
        ])
        .await;

        assert_eq!(result.unwrap(), "Hi there");
        assert_eq!(seen, vec!["Hi", "Hi there"]);
    }

    #[tokio::test]
    async fn test_nothing_after_done_is_read() {
        let (result, seen) = run(&[
            "data: {\"content\":\"A\"}\ndata: [DONE]\ndata: {\"content\":\"B\"}\n",
            "data: {\"error\":\"late\"}\n",
        ])
        .await;

        assert_eq!(result.unwrap(), "A");
        assert_eq!(seen, vec!["A"]);
    }

    #[tokio::test]
    async fn test_end_without_done_is_soft_success() {
        let (result, seen) = run(&["data: {\"content\":\"Partial\"}\n"]).await;
        assert_eq!(result.unwrap(), "Partial");
        assert_eq!(seen, vec!["Partial"]);
    }

    #[tokio::test]
    async fn test_unterminated_last_line_is_flushed() {
        let (result, _) = run(&["data: {\"content\":\"one\"}\n", "data: {\"content\":\"two\"}"]).await;
        assert_eq!(result.unwrap(), "two");
    }

    #[tokio::test]
    async fn test_error_frame_stops_progress() {
        let (result, seen) = run(&[
            "data: {\"content\":\"c1\"}\ndata: {\"content\":\"c2\"}\n",
            "data: {\"error\":\"upstream failed\"}\n",
            "data: {\"content\":\"c3\"}\n",
        ])
        .await;

        assert_eq!(result, Err(ChatError::Stream("upstream failed".to_string())));
        assert_eq!(seen, vec!["c1", "c2"]);
    }

    #[tokio::test]
    async fn test_malformed_lines_are_skipped() {
        let (result, seen) = run(&[
            "data: {\"content\":\"first\"}\n",
            "data: {not json}\nstray text\n: ping\n",
            "data: {\"content\":\"second\"}\ndata: [DONE]\n",
        ])
        .await;

        assert_eq!(result.unwrap(), "second");
        assert_eq!(seen, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_frame_split_across_chunks() {
        let (result, seen) = run(&[
            "data: {\"content\":\"Hel",
            "lo\"}\r\n\r\ndata: [DO",
            "NE]\r\n",
        ])
        .await;

        assert_eq!(result.unwrap(), "Hello");
        assert_eq!(seen, vec!["Hello"]);
    }

    #[tokio::test]
    async fn test_empty_stream_returns_empty_text() {
        let (result, seen) = run(&[]).await;
        assert_eq!(result.unwrap(), "");
        assert!(seen.is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_mid_stream() {
        let parts: Vec<Chunk> = vec![
            Ok(Bytes::from_static(b"data: {\"content\":\"so far\"}\n")),
            Err(ChatError::transport(None, "connection reset")),
        ];
        let mut seen = Vec::new();
        let result = consume_stream(stream::iter(parts), None, &CancellationToken::new(), |t: &str| {
            seen.push(t.to_string())
        })
        .await;

        assert_eq!(result, Err(ChatError::transport(None, "connection reset")));
        assert_eq!(seen, vec!["so far"]);
    }

    #[tokio::test]
    async fn test_stalled_stream_times_out() {
        let body = stream::iter(chunks(&["data: {\"content\":\"waiting\"}\n"])).chain(stream::pending());
        tokio::pin!(body);
        let mut seen = Vec::new();
        let limit = Duration::from_millis(50);

        let result = consume_stream(body, Some(limit), &CancellationToken::new(), |t: &str| {
            seen.push(t.to_string())
        })
        .await;

        assert_eq!(result, Err(ChatError::Timeout(limit)));
        assert_eq!(seen, vec!["waiting"]);
    }

    #[tokio::test]
    async fn test_cancel_mid_stream() {
        let body = stream::iter(chunks(&["data: {\"content\":\"partial\"}\n"])).chain(stream::pending());
        tokio::pin!(body);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let mut seen = Vec::new();

        let result = consume_stream(body, None, &cancel, |t: &str| {
            seen.push(t.to_string());
            trigger.cancel();
        })
        .await;

        assert_eq!(result, Err(ChatError::Cancelled));
        assert_eq!(seen, vec!["partial"]);
    }
}
