//! mjai wire types (§4 C6/C7, §6 "AI (local byte stream)"): the newline-delimited JSON protocol
//! spoken to the AI process.
//!
//! Outbound messages ([`Event`]) are internally tagged on `type`, mirroring the dict literals
//! `main.py`/`responder.py` build by hand (`{'type': 'tsumo', ...}`). Inbound replies ([`Reply`])
//! are likewise tagged on `type`, covering every `received['type']` branch the original checks.

use serde::{Deserialize, Serialize};

use crate::tile::Label;

/// The AI's opening handshake reply, echoing its chosen player name and the room to join.
#[derive(Debug, Clone, Deserialize)]
pub struct Hello {
    pub name: String,
    pub room: String,
}

/// The bridge's half of the handshake: `{type:"hello", protocol:"mjsonp", protocol_version:3}`.
#[derive(Debug, Clone, Serialize)]
pub struct HelloRequest {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub protocol: &'static str,
    pub protocol_version: u32,
}

impl Default for HelloRequest {
    fn default() -> Self {
        HelloRequest { kind: "hello", protocol: "mjsonp", protocol_version: 3 }
    }
}

/// The handshake failure reply sent and the socket closed without contacting the remote.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReply {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl Default for ErrorReply {
    fn default() -> Self {
        ErrorReply { kind: "error" }
    }
}

/// One entry of a `possible_actions` list, in the wire shape the AI expects (label-based, not the
/// server-index-based [`crate::action::PossibleAction`] C5 produces internally).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum PossibleActionWire {
    Hora,
    Reach,
    Ryukyoku,
    Ankan { actor: u8, consumed: Vec<Label> },
    Kakan { actor: u8, pai: Label, consumed: Vec<Label> },
    Pon { actor: u8, target: u8, pai: Label, consumed: Vec<Label> },
    Daiminkan { actor: u8, target: u8, pai: Label, consumed: Vec<Label> },
    Chi { actor: u8, target: u8, pai: Label, consumed: Vec<Label> },
}

/// Every message the bridge can push to the AI, tagged on `type` exactly as the original dict
/// literals are (one variant per `sent = {'type': ..., ...}` site in `responder.py`).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum Event {
    StartGame {
        id: u32,
        names: Vec<String>,
    },
    StartKyoku {
        bakaze: &'static str,
        kyoku: u32,
        honba: u32,
        kyotaku: u32,
        oya: u32,
        dora_marker: Label,
        // Seat 0's entry carries its actual hand (13 tiles, or 14 for the dealer, who is dealt
        // their first draw as part of `hai`); every other seat is `["?"; 13]`.
        tehais: [Vec<Label>; 4],
    },
    Tsumo {
        actor: u8,
        pai: Label,
        possible_actions: Vec<PossibleActionWire>,
    },
    Dahai {
        actor: u8,
        pai: Label,
        tsumogiri: bool,
        possible_actions: Vec<PossibleActionWire>,
    },
    Pon {
        actor: u8,
        target: u8,
        pai: Label,
        consumed: Vec<Label>,
        #[serde(skip_serializing_if = "Option::is_none")]
        cannot_dahai: Option<Vec<Label>>,
    },
    Chi {
        actor: u8,
        target: u8,
        pai: Label,
        consumed: Vec<Label>,
        #[serde(skip_serializing_if = "Option::is_none")]
        cannot_dahai: Option<Vec<Label>>,
    },
    Daiminkan {
        actor: u8,
        target: u8,
        pai: Label,
        consumed: Vec<Label>,
        #[serde(skip_serializing_if = "Option::is_none")]
        cannot_dahai: Option<Vec<Label>>,
    },
    Ankan {
        actor: u8,
        target: u8,
        pai: Label,
        consumed: Vec<Label>,
        #[serde(skip_serializing_if = "Option::is_none")]
        cannot_dahai: Option<Vec<Label>>,
    },
    Kakan {
        actor: u8,
        target: u8,
        pai: Label,
        consumed: Vec<Label>,
        #[serde(skip_serializing_if = "Option::is_none")]
        cannot_dahai: Option<Vec<Label>>,
    },
    Reach {
        actor: u8,
        #[serde(skip_serializing_if = "Option::is_none")]
        cannot_dahai: Option<Vec<Label>>,
    },
    ReachAccepted {
        actor: u8,
        deltas: [i32; 4],
        scores: [i32; 4],
    },
    Dora {
        dora_marker: Label,
    },
    Hora {
        scores: [i32; 4],
    },
    Ryukyoku {
        scores: [i32; 4],
    },
    EndKyoku,
    EndGame {
        scores: [i32; 4],
    },
}

/// The AI's reply to an action request (`tsumo`, `dahai`, a call event, or `reach`). Every
/// `received['type']` check in `responder.py` becomes one variant here; fields the bridge doesn't
/// need for a given variant are simply absent from that variant.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum Reply {
    Dahai {
        pai: Label,
        tsumogiri: bool,
    },
    None,
    Hora,
    Reach,
    Ryukyoku,
    Ankan {
        consumed: Vec<Label>,
    },
    Kakan {
        pai: Label,
        #[serde(default)]
        consumed: Vec<Label>,
    },
    Pon {
        consumed: Vec<Label>,
    },
    Chi {
        consumed: Vec<Label>,
    },
    Daiminkan {
        #[serde(default)]
        consumed: Vec<Label>,
    },
}
