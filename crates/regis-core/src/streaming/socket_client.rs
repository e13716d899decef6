use async_trait::async_trait;
use futures::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::PushTransport;
use crate::error::ChannelError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Push channel over a WebSocket connection
#[derive(Default)]
pub struct WebSocketTransport {
    stream: Option<WsStream>,
}

impl WebSocketTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}

#[async_trait]
impl PushTransport for WebSocketTransport {
    async fn connect(&mut self, url: &str) -> Result<(), ChannelError> {
        let (stream, _response) = connect_async(url).await?;
        tracing::info!(url, "push channel connected");
        self.stream = Some(stream);
        Ok(())
    }

    async fn next_frame(&mut self) -> Option<String> {
        let stream = self.stream.as_mut()?;

        loop {
            match stream.next().await {
                Some(Ok(WsMessage::Text(text))) => return Some(text.as_str().to_owned()),
                Some(Ok(WsMessage::Close(frame))) => {
                    tracing::info!(?frame, "push channel closed by server");
                    break;
                }
                // Pings are answered by tungstenite; binary frames carry nothing for us
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    tracing::warn!("Push channel read error: {}", e);
                    break;
                }
                None => break,
            }
        }

        self.stream = None;
        None
    }

    async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.close(None).await {
                tracing::debug!("Error closing push channel: {}", e);
            }
        }
    }
}

impl std::fmt::Debug for WebSocketTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSocketTransport")
            .field("open", &self.is_open())
            .finish()
    }
}
