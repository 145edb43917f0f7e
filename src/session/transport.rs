//! Realtime API transport
//!
//! Thin WebSocket driver: one task owns the socket, outbound client
//! events arrive over a channel, inbound server events are pushed to the
//! session's single-consumer queue in arrival order. The orchestrator
//! never touches the socket directly, so a slow tool dispatch cannot
//! stall outbound microphone audio.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use super::events::{ClientEvent, ServerEvent};
use crate::{Error, Result};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Outbound channel depth; mic frames arrive every 20ms so this buys
/// a couple seconds of slack before capture backpressures
const OUTBOUND_BUFFER: usize = 128;

/// Inbound channel depth
const INBOUND_BUFFER: usize = 256;

/// Per-attempt handshake timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Handles to a running transport driver
pub struct TransportChannels {
    /// Client events to the API (cloneable; mic forwarder holds one)
    pub outbound: mpsc::Sender<ClientEvent>,
    /// Server events in arrival order; closes when the socket closes
    pub inbound: mpsc::Receiver<ServerEvent>,
    /// The driver task itself
    pub driver: JoinHandle<()>,
}

/// A connected Realtime API WebSocket
pub struct RealtimeTransport {
    ws: WsStream,
}

impl RealtimeTransport {
    /// Connect to the Realtime API for the given model
    ///
    /// # Errors
    ///
    /// Returns error if the WebSocket handshake fails
    pub async fn connect(api_key: &str, model: &str) -> Result<Self> {
        let url = format!("wss://api.openai.com/v1/realtime?model={model}");
        let mut request = url
            .into_client_request()
            .map_err(|e| Error::Transport(format!("bad realtime url: {e}")))?;

        let auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| Error::Transport(format!("bad api key header: {e}")))?;
        request.headers_mut().insert("Authorization", auth);
        request
            .headers_mut()
            .insert("OpenAI-Beta", HeaderValue::from_static("realtime=v1"));

        let (ws, _) = tokio::time::timeout(CONNECT_TIMEOUT, connect_async(request))
            .await
            .map_err(|_| Error::Transport("realtime connect timed out".to_string()))??;
        tracing::info!(model, "connected to realtime API");
        Ok(Self { ws })
    }

    /// Connect with bounded retries and doubling backoff.
    ///
    /// # Errors
    ///
    /// Returns the last connect error once attempts are exhausted;
    /// callers treat that as fatal to the session.
    pub async fn connect_with_retry(
        api_key: &str,
        model: &str,
        attempts: u32,
        backoff: Duration,
    ) -> Result<Self> {
        let mut delay = backoff;
        let mut last_err = Error::Transport("no connect attempts configured".to_string());

        for attempt in 1..=attempts.max(1) {
            match Self::connect(api_key, model).await {
                Ok(transport) => return Ok(transport),
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "realtime connect failed");
                    last_err = e;
                    if attempt < attempts {
                        tokio::time::sleep(delay).await;
                        delay *= 2;
                    }
                }
            }
        }

        Err(last_err)
    }

    /// Spawn the driver task and hand back its channel ends
    #[must_use]
    pub fn start(self) -> TransportChannels {
        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_BUFFER);
        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_BUFFER);

        let driver = tokio::spawn(drive(self.ws, outbound_rx, inbound_tx));

        TransportChannels {
            outbound: outbound_tx,
            inbound: inbound_rx,
            driver,
        }
    }
}

/// Socket loop: forward outbound events, parse inbound frames.
///
/// Ends when the socket closes or errors, or when every outbound sender
/// is dropped. Dropping `inbound_tx` tells the orchestrator the
/// transport is gone.
async fn drive(
    mut ws: WsStream,
    mut outbound_rx: mpsc::Receiver<ClientEvent>,
    inbound_tx: mpsc::Sender<ServerEvent>,
) {
    loop {
        tokio::select! {
            maybe_cmd = outbound_rx.recv() => {
                let Some(event) = maybe_cmd else {
                    let _ = ws.close(None).await;
                    break;
                };
                let json = match serde_json::to_string(&event) {
                    Ok(json) => json,
                    Err(e) => {
                        tracing::error!(error = %e, "failed to encode client event");
                        continue;
                    }
                };
                if let Err(e) = ws.send(Message::Text(json)).await {
                    tracing::error!(error = %e, "realtime send failed");
                    break;
                }
            }
            maybe_msg = ws.next() => {
                match maybe_msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ServerEvent>(&text) {
                            Ok(event) => {
                                if inbound_tx.send(event).await.is_err() {
                                    // Consumer gone; shut the socket down
                                    let _ = ws.close(None).await;
                                    break;
                                }
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "unparseable server event");
                            }
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        tracing::info!(?frame, "realtime API closed the connection");
                        break;
                    }
                    // Ping/pong handled by tungstenite; binary unused
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!(error = %e, "realtime stream error");
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    tracing::debug!("transport driver stopped");
}
