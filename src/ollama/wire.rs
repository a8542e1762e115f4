use std::collections::VecDeque;
use std::marker::PhantomData;

use bytes::Bytes;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::{ChatMessage, FragmentStream};
use crate::utils::{Result, TermchatError};

// Request bodies

#[derive(Debug, Clone, Default, Serialize)]
pub(super) struct GenerationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl GenerationOptions {
    pub fn is_empty(&self) -> bool {
        self.temperature.is_none()
    }
}

#[derive(Debug, Serialize)]
pub(super) struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<&'a GenerationOptions>,
}

#[derive(Debug, Serialize)]
pub(super) struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<&'a GenerationOptions>,
}

#[derive(Debug, Serialize)]
pub(super) struct ShowRequest<'a> {
    pub model: &'a str,
}

// Response bodies

#[derive(Debug, Deserialize)]
pub(super) struct TagsResponse {
    #[serde(default)]
    pub models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TagEntry {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl TagEntry {
    /// Older hosts only report `name`
    pub fn into_identifier(self) -> Option<String> {
        self.model.or(self.name)
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorBody {
    pub error: String,
}

pub(super) type ShowResponse = Map<String, Value>;

/// One decoded line of a streamed reply
pub(super) trait StreamLine: DeserializeOwned {
    fn error(&self) -> Option<&str>;
    fn is_done(&self) -> bool;
    fn into_text(self) -> String;
}

#[derive(Debug, Deserialize)]
pub(super) struct ChatChunk {
    #[serde(default)]
    message: Option<ChunkMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChunkMessage {
    #[serde(default)]
    content: String,
}

impl StreamLine for ChatChunk {
    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn into_text(self) -> String {
        self.message.map(|m| m.content).unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct GenerateChunk {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

impl StreamLine for GenerateChunk {
    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn into_text(self) -> String {
        self.response
    }
}

/// Incremental newline-delimited JSON decoder over a byte stream
struct NdjsonDecoder<L> {
    body: BoxStream<'static, Result<Bytes>>,
    buffer: Vec<u8>,
    pending: VecDeque<Result<String>>,
    done: bool,
    failed: bool,
    _line: PhantomData<fn() -> L>,
}

impl<L: StreamLine> NdjsonDecoder<L> {
    fn finished(&self) -> bool {
        self.done || self.failed
    }

    fn fail(&mut self, err: TermchatError) {
        self.pending.push_back(Err(err));
        self.failed = true;
    }

    fn drain_complete_lines(&mut self) {
        while !self.finished() {
            let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') else {
                break;
            };
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.process_line(&line);
        }
    }

    fn process_line(&mut self, raw: &[u8]) {
        let line = raw.trim_ascii();
        if line.is_empty() {
            return;
        }
        match serde_json::from_slice::<L>(line) {
            Ok(decoded) => {
                if let Some(message) = decoded.error() {
                    let message = message.to_string();
                    self.fail(TermchatError::UpstreamError(message));
                    return;
                }
                let done = decoded.is_done();
                let text = decoded.into_text();
                if !text.is_empty() {
                    self.pending.push_back(Ok(text));
                }
                self.done = done;
            }
            Err(e) => self.fail(TermchatError::UpstreamError(format!(
                "undecodable stream line: {}",
                e
            ))),
        }
    }

    fn finish_body(&mut self) {
        let rest = std::mem::take(&mut self.buffer);
        self.process_line(&rest);
        if !self.finished() {
            self.fail(TermchatError::UpstreamError(
                "reply stream ended before the model finished".to_string(),
            ));
        }
    }
}

/// Turn a streamed NDJSON body into text fragments
pub(super) fn decode_ndjson<S, L>(body: S) -> FragmentStream
where
    S: Stream<Item = Result<Bytes>> + Send + 'static,
    L: StreamLine + 'static,
{
    let decoder = NdjsonDecoder::<L> {
        body: body.boxed(),
        buffer: Vec::new(),
        pending: VecDeque::new(),
        done: false,
        failed: false,
        _line: PhantomData,
    };

    stream::unfold(decoder, |mut decoder| async move {
        loop {
            if let Some(item) = decoder.pending.pop_front() {
                return Some((item, decoder));
            }
            if decoder.finished() {
                return None;
            }
            match decoder.body.next().await {
                Some(Ok(chunk)) => {
                    decoder.buffer.extend_from_slice(&chunk);
                    decoder.drain_complete_lines();
                }
                Some(Err(e)) => decoder.fail(e),
                None => decoder.finish_body(),
            }
        }
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn body(chunks: &[&str]) -> impl Stream<Item = Result<Bytes>> + Send + 'static {
        let chunks: Vec<Result<Bytes>> = chunks
            .iter()
            .map(|c| Ok(Bytes::from(c.to_string())))
            .collect();
        stream::iter(chunks)
    }

    async fn collect(stream: FragmentStream) -> Vec<std::result::Result<String, String>> {
        stream
            .map(|item| item.map_err(|e| e.to_string()))
            .collect()
            .await
    }

    #[tokio::test]
    async fn test_chat_fragments_in_order() {
        let stream = decode_ndjson::<_, ChatChunk>(body(&[
            "{\"message\":{\"role\":\"assistant\",\"content\":\"Hi\"},\"done\":false}\n",
            "{\"message\":{\"role\":\"assistant\",\"content\":\" there\"},\"done\":false}\n",
            "{\"message\":{\"role\":\"assistant\",\"content\":\"!\"},\"done\":false}\n",
            "{\"message\":{\"role\":\"assistant\",\"content\":\"\"},\"done\":true}\n",
        ]));

        assert_eq!(
            collect(stream).await,
            vec![Ok("Hi".to_string()), Ok(" there".to_string()), Ok("!".to_string())]
        );
    }

    #[tokio::test]
    async fn test_lines_split_across_chunks() {
        let stream = decode_ndjson::<_, GenerateChunk>(body(&[
            "{\"response\":\"Hel",
            "lo\",\"done\":false}\n{\"resp",
            "onse\":\" world\",\"done\":false}\n{\"response\":\"\",\"done\":true}",
        ]));

        assert_eq!(
            collect(stream).await,
            vec![Ok("Hello".to_string()), Ok(" world".to_string())]
        );
    }

    #[tokio::test]
    async fn test_error_line_ends_stream() {
        let stream = decode_ndjson::<_, ChatChunk>(body(&[
            "{\"message\":{\"content\":\"partial\"},\"done\":false}\n",
            "{\"error\":\"model runner has unexpectedly stopped\"}\n",
            "{\"message\":{\"content\":\"never seen\"},\"done\":false}\n",
        ]));

        let items = collect(stream).await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], Ok("partial".to_string()));
        assert!(items[1]
            .as_ref()
            .unwrap_err()
            .contains("model runner has unexpectedly stopped"));
    }

    #[tokio::test]
    async fn test_truncated_body_is_an_error() {
        let stream = decode_ndjson::<_, ChatChunk>(body(&[
            "{\"message\":{\"content\":\"Hi\"},\"done\":false}\n",
        ]));

        let items = collect(stream).await;
        assert_eq!(items[0], Ok("Hi".to_string()));
        assert!(items[1].as_ref().unwrap_err().contains("ended before"));
    }

    #[tokio::test]
    async fn test_transport_error_is_forwarded() {
        let chunks: Vec<Result<Bytes>> = vec![
            Ok(Bytes::from("{\"response\":\"a\",\"done\":false}\n")),
            Err(TermchatError::UpstreamError("connection reset".to_string())),
        ];
        let stream = decode_ndjson::<_, GenerateChunk>(stream::iter(chunks));

        let items = collect(stream).await;
        assert_eq!(
            items,
            vec![
                Ok("a".to_string()),
                Err("upstream error: connection reset".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_garbage_line() {
        let stream = decode_ndjson::<_, ChatChunk>(body(&["not json\n"]));
        let items = collect(stream).await;
        assert_eq!(items.len(), 1);
        assert!(items[0].as_ref().unwrap_err().contains("undecodable"));
    }

    #[test]
    fn test_tag_entry_falls_back_to_name() {
        let tags: TagsResponse = serde_json::from_str(
            r#"{"models":[{"model":"llama3:latest","name":"llama3:latest"},{"name":"mistral:latest"}]}"#,
        )
        .unwrap();
        let ids: Vec<String> = tags
            .models
            .into_iter()
            .filter_map(TagEntry::into_identifier)
            .collect();
        assert_eq!(ids, vec!["llama3:latest", "mistral:latest"]);
    }
}
