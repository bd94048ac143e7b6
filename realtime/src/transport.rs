//! Transport adapters a delivery loop writes through.
//!
//! - SSE: every event becomes an `id` / `event` / `data` frame whose data is
//!   the payload JSON. Frames are handed to the response body through a
//!   single-slot channel, so a write completes once the body has taken it.
//! - WebSocket: every event becomes one text frame holding the JSON envelope.

use crate::error::Error;
use async_stream::stream;
use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use axum::response::sse::Event as SseEvent;
use events::Event;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, Stream, StreamExt};
use log::*;
use std::convert::Infallible;
use std::fmt;
use tokio::sync::mpsc;

/// Item type of an SSE response body stream.
pub type SseFrame = Result<SseEvent, Infallible>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    Sse,
    WebSocket,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Sse => write!(f, "SSE"),
            TransportKind::WebSocket => write!(f, "WebSocket"),
        }
    }
}

/// The write side of a live connection.
#[async_trait]
pub trait Transport: Send {
    /// Writes one event. An error means the connection is unusable.
    async fn send(&mut self, event: &Event) -> Result<(), Error>;

    /// Resolves once the peer has gone away.
    async fn closed(&mut self);

    /// Releases the underlying transport.
    async fn close(&mut self);
}

/// Builds the SSE frame for `event` with a freshly generated id.
pub fn sse_event(event: &Event) -> Result<SseEvent, Error> {
    let data = event.payload().data_json()?;
    Ok(SseEvent::default()
        .id(uuid::Uuid::new_v4().to_string())
        .event(event.event_type().as_str())
        .data(data))
}

pub struct SseTransport {
    sender: Option<mpsc::Sender<SseFrame>>,
}

impl SseTransport {
    /// Creates the transport together with the receiving end the response
    /// body reads from.
    pub fn channel() -> (Self, mpsc::Receiver<SseFrame>) {
        let (sender, receiver) = mpsc::channel(1);
        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }

    /// Turns the receiving end into a body stream that ends when the
    /// transport is closed.
    pub fn into_stream(mut receiver: mpsc::Receiver<SseFrame>) -> impl Stream<Item = SseFrame> {
        stream! {
            while let Some(frame) = receiver.recv().await {
                yield frame;
            }
        }
    }
}

#[async_trait]
impl Transport for SseTransport {
    async fn send(&mut self, event: &Event) -> Result<(), Error> {
        let frame = sse_event(event)?;
        match &self.sender {
            Some(sender) => sender
                .send(Ok(frame))
                .await
                .map_err(|_| Error::transport_closed()),
            None => Err(Error::transport_closed()),
        }
    }

    async fn closed(&mut self) {
        if let Some(sender) = &self.sender {
            sender.closed().await;
        }
    }

    async fn close(&mut self) {
        // Dropping the sender ends the response body.
        self.sender.take();
    }
}

pub struct WebSocketTransport {
    sink: SplitSink<WebSocket, Message>,
    stream: SplitStream<WebSocket>,
}

impl WebSocketTransport {
    pub fn new(socket: WebSocket) -> Self {
        let (sink, stream) = socket.split();
        Self { sink, stream }
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn send(&mut self, event: &Event) -> Result<(), Error> {
        let text = event.encode()?;
        self.sink.send(Message::Text(text)).await?;
        Ok(())
    }

    async fn closed(&mut self) {
        // Inbound messages carry nothing for us; only watch for the end of the stream.
        while let Some(message) = self.stream.next().await {
            match message {
                Ok(Message::Close(frame)) => {
                    debug!("WebSocket peer sent close: {frame:?}");
                    return;
                }
                Ok(_) => continue,
                Err(e) => {
                    debug!("WebSocket read failed: {e}");
                    return;
                }
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.sink.send(Message::Close(None)).await {
            trace!("Could not send WebSocket close frame: {e}");
        }
        if let Err(e) = self.sink.close().await {
            trace!("Could not close WebSocket sink: {e}");
        }
    }
}
