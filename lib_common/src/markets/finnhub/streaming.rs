//! # Finnhub Trade Stream
//!
//! Cancellable WebSocket relay. [`connect`] opens the socket, sends the
//! subscribe frame and spawns a background task that pushes every text frame
//! onto a bounded channel. Cancelling the token closes the socket and drops
//! the sender, which closes the channel for the consumer.
//!
//! There is no reconnect loop: a read error ends the task and the channel.

use super::error::{FinnhubError, FinnhubResult};
use super::models::SubscribeMessage;
use crate::configs::config_finnhub::FinnhubConfig;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use tokio_util::sync::CancellationToken;

/// Capacity of the relay channel.
pub const STREAM_BUFFER: usize = 256;

/// Consumer side of a running trade stream.
pub struct FinnhubStream {
    rx: mpsc::Receiver<String>,
    handle: JoinHandle<()>,
    cancel: CancellationToken,
}

impl FinnhubStream {
    /// Next message, or `None` once the stream has been cancelled or closed upstream.
    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    /// Cancels the relay, discards anything still buffered and waits for the task to finish.
    pub async fn close(mut self) {
        self.cancel.cancel();
        self.rx.close();
        while self.rx.recv().await.is_some() {}
        if let Err(e) = self.handle.await {
            log::error!("Stream task ended abnormally: {}", e);
        }
    }
}

/// Connects to the trade stream and subscribes to `symbol`.
///
/// ## Logic:
/// 1. Connect to `<ws_url>?token=<key>`; a failure is returned to the caller.
/// 2. Send `{"type":"subscribe","symbol":"<symbol>"}`.
/// 3. Spawn the relay task and hand back the receiving end.
pub async fn connect(config: &FinnhubConfig, symbol: &str, cancel: CancellationToken) -> FinnhubResult<FinnhubStream> {
    log::info!("Connecting to Finnhub stream at {}", config.ws_url);
    let (ws_stream, _) = connect_async(config.ws_url_with_token()).await?;
    let (mut write, mut read) = ws_stream.split();

    let frame = serde_json::to_string(&SubscribeMessage::subscribe(symbol)).map_err(|source| {
        FinnhubError::Decode {
            path: "subscribe".to_string(),
            source,
        }
    })?;
    write.send(Message::Text(frame.into())).await?;
    log::info!("Subscribed to {}", symbol);

    let (tx, rx) = mpsc::channel::<String>(STREAM_BUFFER);
    let token = cancel.clone();
    let symbol = symbol.to_string();

    let handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    log::info!("Stream for {} cancelled, closing socket.", symbol);
                    let _ = write.send(Message::Close(None)).await;
                    break;
                }
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            // A full channel must not hold off cancellation.
                            tokio::select! {
                                biased;
                                _ = token.cancelled() => {
                                    log::info!("Stream for {} cancelled, closing socket.", symbol);
                                    let _ = write.send(Message::Close(None)).await;
                                    break;
                                }
                                sent = tx.send(text.to_string()) => {
                                    if sent.is_err() {
                                        log::debug!("Stream consumer dropped, stopping relay.");
                                        break;
                                    }
                                }
                            }
                        }
                        Some(Ok(Message::Ping(payload))) => {
                            let _ = write.send(Message::Pong(payload)).await;
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            log::warn!("Stream for {} closed by remote host.", symbol);
                            break;
                        }
                        Some(Err(e)) => {
                            log::error!("Stream read error: {}", e);
                            break;
                        }
                        Some(Ok(_)) => {}
                    }
                }
            }
        }
        // Dropping `tx` here closes the channel.
    });

    Ok(FinnhubStream { rx, handle, cancel })
}
