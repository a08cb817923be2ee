//! The duplex websocket connection to the remote tenhou server (§6 "Remote server (websocket)").
//!
//! [`RemoteConn::connect`] negotiates TLS, the fixed `Origin` header, and `permessage-deflate`
//! exactly as `websocket_client` in the original `main.py` does by hand via the `websockets`
//! library's `extra_headers`. The connection is split into a read half owned by the event router
//! and a cloneable [`RemoteSender`] write half shared with the keep-alive pinger, so both tasks
//! may write without racing (§5: "the underlying transport must serialize writes").

use std::sync::Arc;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use log::debug;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::error::BridgeError;
use crate::tenhou::TenhouMessage;

const REMOTE_URI: &str = "wss://b-ww.mjv.jp";
const ORIGIN: &str = "https://tenhou.net";

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// The read half of a connected remote session, owned exclusively by the event router.
pub struct RemoteConn {
    read: SplitStream<WsStream>,
    sender: RemoteSender,
}

/// A cloneable handle to the write half, serialized behind a mutex so the router and the pinger
/// can both hold one without racing frames on the wire.
#[derive(Clone)]
pub struct RemoteSender {
    write: Arc<Mutex<SplitSink<WsStream, Message>>>,
}

impl RemoteConn {
    /// Connects to the remote server over TLS, with the exact headers spec.md §6 names:
    /// `Origin`, `Accept-Encoding`, `Accept-Language`, `Cache-Control`, `Pragma`,
    /// `Sec-WebSocket-Extensions: permessage-deflate; client_max_window_bits`, `User-Agent`.
    pub async fn connect() -> Result<Self, BridgeError> {
        let mut request = REMOTE_URI.into_client_request()?;
        let headers = request.headers_mut();
        headers.insert("Origin", HeaderValue::from_static(ORIGIN));
        headers.insert("Accept-Encoding", HeaderValue::from_static("gzip, deflate, br"));
        headers.insert("Accept-Language", HeaderValue::from_static("ja,en-US;q=0.9,en;q=0.8"));
        headers.insert("Cache-Control", HeaderValue::from_static("no-cache"));
        headers.insert("Pragma", HeaderValue::from_static("no-cache"));
        headers.insert(
            "Sec-WebSocket-Extensions",
            HeaderValue::from_static("permessage-deflate; client_max_window_bits"),
        );
        headers.insert(
            "User-Agent",
            HeaderValue::from_static(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/99.0.4844.51 Safari/537.36",
            ),
        );

        let (stream, _response) = tokio_tungstenite::connect_async(request).await?;
        let (write, read) = stream.split();
        Ok(RemoteConn { read, sender: RemoteSender { write: Arc::new(Mutex::new(write)) } })
    }

    /// A cloneable sender sharing this connection's write half; give one to the pinger.
    pub fn sender(&self) -> RemoteSender {
        self.sender.clone()
    }

    /// Reads the next text frame and parses it as a tagged tenhou message. Returns `None` on a
    /// clean close.
    pub async fn recv(&mut self) -> Result<Option<TenhouMessage>, BridgeError> {
        loop {
            match self.read.next().await {
                None => return Ok(None),
                Some(Err(e)) => return Err(e.into()),
                Some(Ok(Message::Close(_))) => return Ok(None),
                Some(Ok(Message::Text(text))) => {
                    debug!("from remote: {text}");
                    let value: Value = serde_json::from_str(&text)?;
                    return Ok(Some(TenhouMessage::from_value(value)));
                }
                Some(Ok(_)) => continue, // ping/pong/binary frames carry no tenhou content
            }
        }
    }

    pub async fn send(&self, value: Value) -> Result<(), BridgeError> {
        self.sender.send(value).await
    }
}

impl RemoteSender {
    pub async fn send(&self, value: Value) -> Result<(), BridgeError> {
        self.send_raw(&value.to_string()).await
    }

    /// Sends a raw text frame, bypassing JSON serialization -- used for the `<Z/>` keep-alive,
    /// the one frame on this transport that isn't a JSON object.
    pub async fn send_raw(&self, text: &str) -> Result<(), BridgeError> {
        debug!("to remote: {text}");
        let mut write = self.write.lock().await;
        write.send(Message::Text(text.to_string())).await?;
        Ok(())
    }
}
