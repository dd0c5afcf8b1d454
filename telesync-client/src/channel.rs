//! Persistent WebSocket channel for async pages.
//!
//! Saves are fire-and-forget: a page queues its `* <url> <diff>` text on an
//! mpsc sender and returns. A writer task owns the socket sink and forwards
//! the queue in order.
//!
//! ```text
//!  AsyncPage::save ──▸ ChannelSender ──mpsc──▸ writer task ──▸ WebSocket
//!  AsyncPage::save ──▸ ChannelSender ──┘
//! ```
//!
//! [`Channel::close`] queues a close frame behind everything already sent,
//! then waits for the writer. Both steps together take at most
//! `shutdown_timeout`; a writer still running after that is aborted.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};
use tokio_tungstenite::tungstenite::Message;

use crate::config::DEFAULT_SHUTDOWN_TIMEOUT;
use crate::error::{ClientError, Result};

const OUTBOX_CAPACITY: usize = 256;

/// Cloneable handle for queueing text on a channel.
#[derive(Debug, Clone)]
pub struct ChannelSender(mpsc::Sender<Message>);

impl ChannelSender {
    pub async fn send(&self, text: impl Into<String>) -> Result<()> {
        self.0
            .send(Message::text(text.into()))
            .await
            .map_err(|_| ClientError::ChannelClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.0.is_closed()
    }
}

/// An open channel to the hub.
#[derive(Debug)]
pub struct Channel {
    sender: ChannelSender,
    writer: Option<JoinHandle<()>>,
    reader: Option<JoinHandle<()>>,
    shutdown_timeout: Duration,
}

impl Channel {
    /// Connect to `url` and start the writer task.
    pub async fn connect(url: &str) -> Result<Self> {
        let (ws, _) = tokio_tungstenite::connect_async(url).await?;
        log::info!("channel connected to {url}");
        let (mut sink, mut stream) = ws.split();
        let (tx, mut rx) = mpsc::channel::<Message>(OUTBOX_CAPACITY);

        let writer = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                let closing = msg.is_close();
                if let Err(e) = sink.send(msg).await {
                    log::warn!("channel write failed: {e}");
                    break;
                }
                if closing {
                    break;
                }
            }
            log::debug!("channel writer stopped");
        });

        // The hub does not reply on this channel; reading keeps control
        // frames flowing and notices a remote close.
        let reader = tokio::spawn(async move {
            while let Some(msg) = stream.next().await {
                match msg {
                    Ok(Message::Close(_)) | Err(_) => break,
                    Ok(other) => log::trace!("ignoring inbound message: {other:?}"),
                }
            }
            log::debug!("channel reader stopped");
        });

        Ok(Self {
            sender: ChannelSender(tx),
            writer: Some(writer),
            reader: Some(reader),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        })
    }

    /// Wrap an existing queue. Whoever holds the receiver plays the socket.
    pub fn from_sender(tx: mpsc::Sender<Message>) -> Self {
        Self {
            sender: ChannelSender(tx),
            writer: None,
            reader: None,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    pub fn sender(&self) -> ChannelSender {
        self.sender.clone()
    }

    pub async fn send(&self, text: impl Into<String>) -> Result<()> {
        self.sender.send(text).await
    }

    /// Close after queued messages are written. Queueing the close frame
    /// and waiting for the writer share one `shutdown_timeout` deadline.
    pub async fn close(&mut self) -> Result<()> {
        let deadline = Instant::now() + self.shutdown_timeout;

        // A send error means the receiver is already gone
        let queued = timeout_at(deadline, self.sender.0.send(Message::Close(None))).await;
        if queued.is_err() {
            log::warn!("close frame not queued within {:?}", self.shutdown_timeout);
        }

        if let Some(mut writer) = self.writer.take() {
            if timeout_at(deadline, &mut writer).await.is_err() {
                log::warn!(
                    "channel writer did not finish within {:?}",
                    self.shutdown_timeout
                );
                writer.abort();
            }
        }
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        log::info!("channel closed");
        Ok(())
    }
}

impl Drop for Channel {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.take() {
            writer.abort();
        }
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}
