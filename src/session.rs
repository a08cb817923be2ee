//! Session driver (§4.7 C7): the per-connection orchestrator run once per inbound AI socket.
//!
//! [`Session::run`] is the direct analogue of the original's one-shot `tcp_server` handler,
//! generalized (per the §9 process-lifetime resolution recorded in DESIGN.md) from "exactly one
//! connection, then exit" to "serve forever, one match per connection" -- `main`'s accept loop
//! spawns one [`Session::run`] per socket and keeps listening.

use log::{error, info};
use tokio::net::TcpStream;
use tokio::time::{interval, Duration};

use crate::error::BridgeError;
use crate::router;
use crate::state::GameState;
use crate::tenhou::{ROOM_CODE, PING};
use crate::transport::ai::AiConn;
use crate::transport::remote::RemoteConn;

const PING_INTERVAL: Duration = Duration::from_secs(10);

pub struct Session {
    sex: &'static str,
    debug: bool,
}

impl Session {
    pub fn new(sex: &'static str, debug: bool) -> Self {
        Session { sex, debug }
    }

    /// Runs one full match over `stream`: handshake, room validation, remote connect, then the
    /// event router until `owari` or a closed socket.
    pub async fn run(self, stream: TcpStream) -> Result<(), BridgeError> {
        let mut ai = AiConn::new(stream);
        let hello = ai.hello().await?;

        if !ROOM_CODE.is_match(&hello.room) {
            error!("rejecting connection: room {:?} fails the room-code grammar", hello.room);
            ai.send_error_and_close().await?;
            return Err(BridgeError::InvalidRoom(hello.room));
        }

        let mut state = GameState::new(hello.name.clone(), hello.room.clone());
        info!("{}: joining room {}", state.name, state.room);

        let mut remote = RemoteConn::connect().await?;
        let sender = remote.sender();
        sender.send(serde_json::json!({"tag": "HELO", "name": state.name, "sx": self.sex})).await?;

        let pinger = tokio::spawn({
            let sender = sender.clone();
            async move {
                let mut ticker = interval(PING_INTERVAL);
                loop {
                    ticker.tick().await;
                    if sender.send_raw(PING).await.is_err() {
                        break;
                    }
                }
            }
        });

        let result = self.drive(&mut state, &mut ai, &mut remote).await;
        pinger.abort();

        match &result {
            Ok(()) => info!("{}: match complete", state.name),
            Err(e) => error!("{}: session terminated: {e}", state.name),
        }
        result
    }

    async fn drive(
        &self,
        state: &mut GameState,
        ai: &mut AiConn,
        remote: &mut RemoteConn,
    ) -> Result<(), BridgeError> {
        let sender = remote.sender();
        loop {
            let Some(msg) = remote.recv().await? else {
                return Err(BridgeError::RemoteClosed);
            };
            let done = router::dispatch(&msg, state, ai, &sender, self.debug).await?;
            if done {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_interval_matches_the_ten_second_keepalive() {
        assert_eq!(PING_INTERVAL, Duration::from_secs(10));
    }

    #[test]
    fn new_carries_sex_and_debug_through_unchanged() {
        let session = Session::new("M", true);
        assert_eq!(session.sex, "M");
        assert!(session.debug);

        let session = Session::new("F", false);
        assert_eq!(session.sex, "F");
        assert!(!session.debug);
    }

    #[test]
    fn rejects_a_room_code_missing_the_underscore_separator() {
        assert!(!ROOM_CODE.is_match("0009"));
        assert!(ROOM_CODE.is_match("0_0"));
        assert!(ROOM_CODE.is_match("1234_1"));
    }
}
