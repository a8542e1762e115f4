use futures::StreamExt;

use crate::models::FragmentStream;
use crate::render::{RenderMode, Renderer};
use crate::utils::Result;

const WAITING_NOTICE: &str = "Waiting for the model to generate...";

/// Drain one reply stream into a single string
///
/// In plain mode every fragment is also written out as it arrives. On a
/// failure the partial text is dropped and the error returned.
pub async fn drain_reply<R>(
    mut stream: FragmentStream,
    mode: RenderMode,
    renderer: &mut R,
) -> Result<String>
where
    R: Renderer + ?Sized,
{
    if mode.is_markdown() {
        renderer.notice(WAITING_NOTICE)?;
    }

    let mut reply = String::new();
    while let Some(fragment) = stream.next().await {
        let fragment = match fragment {
            Ok(fragment) => fragment,
            Err(e) => {
                if !mode.is_markdown() && !reply.is_empty() {
                    // keep the prompt off the end of the half-printed line;
                    // the stream error is the one reported
                    let _ = renderer.finish_reply();
                }
                return Err(e);
            }
        };
        if !mode.is_markdown() {
            renderer.render_incremental(&fragment)?;
        }
        reply.push_str(&fragment);
    }
    Ok(reply)
}

/// Final display of a completed reply
pub fn present_reply<R>(reply: &str, mode: RenderMode, renderer: &mut R) -> Result<()>
where
    R: Renderer + ?Sized,
{
    match mode {
        RenderMode::Plain => renderer.finish_reply()?,
        RenderMode::Markdown => renderer.render_formatted(reply)?,
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingRenderer;
    use super::*;
    use crate::utils::TermchatError;
    use futures::stream;
    use pretty_assertions::assert_eq;

    fn fragments(items: Vec<Result<String>>) -> FragmentStream {
        stream::iter(items).boxed()
    }

    #[tokio::test]
    async fn test_plain_mode_streams_every_fragment() {
        let mut renderer = RecordingRenderer::default();
        let reply = drain_reply(
            fragments(vec![Ok("Hi".into()), Ok(" there".into()), Ok("!".into())]),
            RenderMode::Plain,
            &mut renderer,
        )
        .await
        .unwrap();

        assert_eq!(reply, "Hi there!");
        assert_eq!(renderer.incremental.concat(), reply);
        assert!(renderer.notices.is_empty());
    }

    #[tokio::test]
    async fn test_markdown_mode_buffers() {
        let mut renderer = RecordingRenderer::default();
        let reply = drain_reply(
            fragments(vec![Ok("# Hi".into()), Ok("\n\nthere".into())]),
            RenderMode::Markdown,
            &mut renderer,
        )
        .await
        .unwrap();

        assert_eq!(reply, "# Hi\n\nthere");
        assert!(renderer.incremental.is_empty());
        assert_eq!(renderer.notices.len(), 1);

        present_reply(&reply, RenderMode::Markdown, &mut renderer).unwrap();
        assert_eq!(renderer.formatted, vec![reply]);
    }

    #[tokio::test]
    async fn test_failure_drops_partial_reply() {
        let mut renderer = RecordingRenderer::default();
        let err = drain_reply(
            fragments(vec![
                Ok("Hi".into()),
                Err(TermchatError::UpstreamError("connection reset".into())),
            ]),
            RenderMode::Plain,
            &mut renderer,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, TermchatError::UpstreamError(_)));
        assert_eq!(renderer.finished, 1);
    }
}
