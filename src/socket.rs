// WebSocket transport: one client connection to the draft server.

use futures_util::{SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{info, warn};

/// Events surfaced by the transport to the engine event loop.
#[derive(Debug, PartialEq)]
pub enum SocketEvent {
    /// The connection is established.
    Connected,
    /// The connection closed. Reconnecting (and building a fresh session) is
    /// the channel owner's concern.
    Disconnected,
    /// A text frame arrived (raw JSON).
    Message(String),
}

/// Connect to `url` and pump the connection until it closes.
///
/// Inbound text frames are forwarded through `tx` as
/// [`SocketEvent::Message`]; strings received on `out_rx` are written to the
/// server as text frames. Returns after emitting `Disconnected`, once the
/// server closes the connection or the engine drops its channel ends.
pub async fn run(
    url: &str,
    tx: mpsc::Sender<SocketEvent>,
    mut out_rx: mpsc::Receiver<String>,
) -> anyhow::Result<()> {
    let (stream, _response) = connect_async(url).await?;
    info!("connected to {url}");

    if tx.send(SocketEvent::Connected).await.is_err() {
        return Ok(());
    }

    let (mut write, read) = stream.split();
    let writer = tokio::spawn(async move {
        while let Some(text) = out_rx.recv().await {
            if let Err(e) = write.send(Message::Text(text.into())).await {
                warn!("websocket write failed: {e}");
                break;
            }
        }
    });

    let _ = forward_frames(read, &tx).await;
    writer.abort();
    let _ = tx.send(SocketEvent::Disconnected).await;
    Ok(())
}

/// Forward text frames from any frame stream into the event channel.
///
/// Stops on a close frame or a read error. Returns `Err(())` if the event
/// channel is closed (receiver dropped), signalling the caller that nobody is
/// listening anymore. Generic over the stream type so the forwarding logic is
/// testable with in-memory frames, no sockets involved.
pub async fn forward_frames<St>(mut stream: St, tx: &mpsc::Sender<SocketEvent>) -> Result<(), ()>
where
    St: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                if tx.send(SocketEvent::Message(text.to_string())).await.is_err() {
                    return Err(());
                }
            }
            Ok(Message::Close(_)) => {
                info!("server sent close frame");
                break;
            }
            Err(e) => {
                warn!("websocket read error: {e}");
                break;
            }
            _ => {
                // Binary, Ping, Pong, Frame: nothing for the engine.
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use tokio_tungstenite::tungstenite::Error as WsError;

    fn frames(
        items: Vec<Result<Message, WsError>>,
    ) -> impl Stream<Item = Result<Message, WsError>> + Unpin {
        stream::iter(items)
    }

    #[tokio::test]
    async fn text_frames_forwarded_in_order() {
        let (tx, mut rx) = mpsc::channel(16);
        let items = vec![
            Ok(Message::Text("first".into())),
            Ok(Message::Text("second".into())),
        ];
        forward_frames(frames(items), &tx).await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), SocketEvent::Message("first".into()));
        assert_eq!(rx.recv().await.unwrap(), SocketEvent::Message("second".into()));
    }

    #[tokio::test]
    async fn close_frame_stops_forwarding() {
        let (tx, mut rx) = mpsc::channel(16);
        let items = vec![
            Ok(Message::Text("kept".into())),
            Ok(Message::Close(None)),
            Ok(Message::Text("dropped".into())),
        ];
        forward_frames(frames(items), &tx).await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), SocketEvent::Message("kept".into()));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn read_error_stops_forwarding() {
        let (tx, mut rx) = mpsc::channel(16);
        let items = vec![
            Ok(Message::Text("kept".into())),
            Err(WsError::ConnectionClosed),
            Ok(Message::Text("dropped".into())),
        ];
        forward_frames(frames(items), &tx).await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), SocketEvent::Message("kept".into()));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn non_text_frames_are_ignored() {
        let (tx, mut rx) = mpsc::channel(16);
        let items = vec![
            Ok(Message::Binary(vec![1, 2, 3].into())),
            Ok(Message::Ping(vec![].into())),
            Ok(Message::Pong(vec![].into())),
            Ok(Message::Text("after".into())),
        ];
        forward_frames(frames(items), &tx).await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), SocketEvent::Message("after".into()));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn closed_event_channel_reports_err() {
        let (tx, rx) = mpsc::channel(16);
        drop(rx);
        let items = vec![Ok(Message::Text("orphan".into()))];
        assert!(forward_frames(frames(items), &tx).await.is_err());
    }

    #[tokio::test]
    async fn json_payload_is_preserved_verbatim() {
        let (tx, mut rx) = mpsc::channel(16);
        let payload = r#"{"type":"WaitingForPick","data":{"team":1}}"#;
        let items = vec![Ok(Message::Text(payload.into()))];
        forward_frames(frames(items), &tx).await.unwrap();
        assert_eq!(
            rx.recv().await.unwrap(),
            SocketEvent::Message(payload.to_string())
        );
    }
}
