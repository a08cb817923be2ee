//! The local byte-stream connection to the AI process (§6 "AI (local byte stream)"): newline-
//! delimited JSON, half-duplex, strict lock-step. [`AiConn::send_to_mjai`] is the write-then-read
//! primitive every event forwarded to the AI goes through -- the direct analogue of
//! `sender_to_mjai` in the original `main.py`, and the reason exactly one AI request is ever
//! outstanding at a time (§5).

use log::debug;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use crate::error::BridgeError;
use crate::mjai::{ErrorReply, Event, Hello, HelloRequest, Reply};

/// One AI connection: a line-buffered reader half and a writer half of the same [`TcpStream`].
pub struct AiConn {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl AiConn {
    pub fn new(stream: TcpStream) -> Self {
        let (read_half, writer) = stream.into_split();
        AiConn { reader: BufReader::new(read_half), writer }
    }

    /// Exchanges the mjai opening handshake: sends `{type:"hello", protocol:"mjsonp",
    /// protocol_version:3}` and expects `{name, room}` back.
    pub async fn hello(&mut self) -> Result<Hello, BridgeError> {
        self.write_line(&HelloRequest::default()).await?;
        let line = self.read_line().await?;
        Ok(serde_json::from_str(&line)?)
    }

    /// Sends the handshake failure reply and closes the socket, per §7 "Validation failure":
    /// does not contact the remote.
    pub async fn send_error_and_close(mut self) -> Result<(), BridgeError> {
        self.write_line(&ErrorReply::default()).await?;
        self.writer.shutdown().await?;
        Ok(())
    }

    /// Writes one event line and reads one reply line, atomically from the router's point of
    /// view (no other call can interleave while this future is the only holder of `&mut self`).
    pub async fn send_to_mjai(&mut self, event: &Event) -> Result<Reply, BridgeError> {
        self.write_line(event).await?;
        let line = self.read_line().await?;
        Ok(serde_json::from_str(&line)?)
    }

    /// As [`AiConn::send_to_mjai`], but an end-of-stream on the read half is tolerated rather
    /// than surfaced as [`BridgeError::AiClosed`] -- per §7 "End-of-match", the AI is allowed to
    /// close first during the final `end_game` write.
    pub async fn send_to_mjai_tolerating_close(&mut self, event: &Event) -> Result<(), BridgeError> {
        self.write_line(event).await?;
        match self.read_line().await {
            Ok(_) | Err(BridgeError::AiClosed) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn write_line<T: serde::Serialize>(&mut self, value: &T) -> Result<(), BridgeError> {
        let mut line = serde_json::to_string(value)?;
        debug!("to AI: {line}");
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn read_line(&mut self) -> Result<String, BridgeError> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).await?;
        if n == 0 {
            return Err(BridgeError::AiClosed);
        }
        debug!("from AI: {}", line.trim_end());
        Ok(line)
    }
}
