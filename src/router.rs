//! Event router (§4.6 C6): the state machine that classifies each server message, invokes C5 to
//! compute legal actions, forwards a translated event to the AI, awaits its reply, and emits the
//! translated server-side response.
//!
//! Dispatch is one function trying each message shape in the exact priority order spec.md §4.6
//! lists; the first match is exclusive, mirroring `router.processes`/`Base.main` in the original
//! `main.py`/`responder.py` (an abstract-base-plus-subclasses chain tried in declaration order).

use std::collections::HashSet;

use log::info;
use rand::Rng;
use serde_json::json;

use crate::action;
use crate::error::BridgeError;
use crate::meld::Meld;
use crate::mjai::{Event, PossibleActionWire, Reply};
use crate::state::GameState;
use crate::tenhou::{self, TenhouMessage, DAHAI_TAG, TSUMO_TAG};
use crate::tile::{self, decode_many, decode_one, encode_one, tsumogiri_one, ServerIndex};
use crate::transport::ai::AiConn;
use crate::transport::remote::RemoteSender;

const BAKAZE: [&str; 4] = ["E", "S", "W", "N"];

/// Sleeps a uniform random 1-2 seconds before an AI-originated action reaches the remote server,
/// approximating human timing (§4.6 "Pacing"). Skipped entirely under the debug flag -- not
/// shortened, per `utils.random_sleep` in the original.
async fn human_pace(debug: bool) {
    if debug {
        return;
    }
    let secs = rand::thread_rng().gen_range(1..=2);
    tokio::time::sleep(std::time::Duration::from_secs(secs)).await;
}

/// Dispatches one server message. Returns `true` if the match has ended (an `owari` was seen)
/// and the session should close.
pub async fn dispatch(
    msg: &TenhouMessage,
    state: &mut GameState,
    ai: &mut AiConn,
    remote: &RemoteSender,
    debug: bool,
) -> Result<bool, BridgeError> {
    let tag = msg.tag();

    if tag == "HELO" {
        // Room code grammar uses `_`; the server expects it as `,` on JOIN's `t` field (§6).
        let t = state.room.replace('_', ",");
        remote.send(json!({"tag": "JOIN", "t": t})).await?;
    } else if tag == "REJOIN" {
        let t = msg.str_field("t")?;
        remote.send(json!({"tag": "JOIN", "t": t})).await?;
    } else if tag == "GO" {
        remote.send(json!({"tag": "GOK"})).await?;
    } else if tag == "TAIKYOKU" {
        handle_taikyoku(msg, state, ai, remote).await?;
    } else if tag == "INIT" {
        handle_init(msg, state, ai).await?;
    } else if TSUMO_TAG.is_match(tag) {
        handle_draw(msg, state, ai, remote, debug).await?;
    } else if DAHAI_TAG.is_match(tag) {
        handle_discard(msg, state, ai, remote, debug).await?;
    } else if tag == "N" && msg.has_field("m") {
        handle_naki(msg, state, ai, remote, debug).await?;
    } else if tag == "REACH" && msg.str_field("step")? == "1" {
        handle_reach_step1(msg, state, ai, remote, debug).await?;
    } else if tag == "REACH" && msg.str_field("step")? == "2" {
        handle_reach_step2(msg, state, ai).await?;
    } else if tag == "DORA" {
        handle_dora(msg, ai).await?;
    } else if tag == "AGARI" && !msg.has_field("owari") {
        handle_round_end(msg, ai, remote, Event::Hora { scores: tenhou::parse_sc_tag(msg)? }).await?;
    } else if tag == "RYUUKYOKU" && !msg.has_field("owari") {
        handle_round_end(msg, ai, remote, Event::Ryukyoku { scores: tenhou::parse_sc_tag(msg)? }).await?;
    } else if msg.has_field("owari") {
        handle_match_end(msg, ai).await?;
        return Ok(true);
    } else {
        return Err(BridgeError::UnrecognizedTag(tag.to_string()));
    }

    Ok(false)
}

async fn handle_taikyoku(
    msg: &TenhouMessage,
    state: &GameState,
    ai: &mut AiConn,
    remote: &RemoteSender,
) -> Result<(), BridgeError> {
    if msg.has_field("log") {
        let oya: i64 = msg.int_field("oya")?;
        let log = msg.str_field("log")?;
        let seat = (4 - oya).rem_euclid(4);
        info!("log({}): https://tenhou.net/3/?log={}&tw={}", state.name, log, seat);
    }

    ai.send_to_mjai(&Event::StartGame { id: 0, names: Vec::new() }).await?;
    remote.send(json!({"tag": "NEXTREADY"})).await?;
    Ok(())
}

async fn handle_init(msg: &TenhouMessage, state: &mut GameState, ai: &mut AiConn) -> Result<(), BridgeError> {
    state.reset_round();
    state.hand = msg.csv_ints("hai")?.into_iter().map(|v| v as ServerIndex).collect();

    let oya = msg.int_field("oya")?;
    let seed = msg.csv_ints("seed")?;
    let bakaze = BAKAZE[(seed[0] / 4) as usize];
    let kyoku = (seed[0] % 4) as u32;
    let honba = seed[1] as u32;
    let kyotaku = seed[2] as u32;
    let dora_marker = encode_one(seed[5] as ServerIndex);

    let mut tehais: [Vec<tile::Label>; 4] =
        [vec!["?".to_string(); 13], vec!["?".to_string(); 13], vec!["?".to_string(); 13], vec!["?".to_string(); 13]];
    tehais[0] = state.hand.iter().map(|&t| encode_one(t)).collect();

    ai.send_to_mjai(&Event::StartKyoku {
        bakaze,
        kyoku,
        honba,
        kyotaku,
        oya: oya as u32,
        dora_marker,
        tehais,
    })
    .await?;
    Ok(())
}

async fn handle_draw(
    msg: &TenhouMessage,
    state: &mut GameState,
    ai: &mut AiConn,
    remote: &RemoteSender,
    debug: bool,
) -> Result<(), BridgeError> {
    let tag = msg.tag();
    let actor = (tag.as_bytes()[0] - b'T') as u8;
    state.live_wall -= 1;

    if actor != 0 {
        ai.send_to_mjai(&Event::Tsumo { actor, pai: "?".to_string(), possible_actions: Vec::new() }).await?;
        return Ok(());
    }

    let index: ServerIndex = tag[1..].parse().unwrap_or(0);
    let pai = encode_one(index);
    let t = msg.int_field_or("t", 0)? as u32;
    state.hand.push(index);

    let actions = action::draw_options(state, index, t);
    let possible_actions = actions_to_wire(&actions, 0, None, None);

    let received = ai.send_to_mjai(&Event::Tsumo { actor: 0, pai, possible_actions }).await?;
    match received {
        Reply::Dahai { pai, tsumogiri } => {
            let p = resolve_discard(&pai, tsumogiri, &state.hand)?;
            if !state.in_riichi {
                human_pace(debug).await;
            }
            remote.send(json!({"tag": "D", "p": p})).await?;
        }
        Reply::Hora => {
            human_pace(debug).await;
            remote.send(json!({"tag": "N", "type": 7})).await?;
        }
        Reply::Reach => {
            human_pace(debug).await;
            remote.send(json!({"tag": "REACH"})).await?;
        }
        Reply::Ryukyoku => {
            human_pace(debug).await;
            remote.send(json!({"tag": "N", "type": 9})).await?;
        }
        Reply::Ankan { consumed } => {
            human_pace(debug).await;
            let labels: Vec<&str> = consumed.iter().map(String::as_str).collect();
            let decoded = decode_many(&labels, &state.hand)?;
            let hai = (decoded[0] / 4) * 4;
            remote.send(json!({"tag": "N", "type": 4, "hai": hai})).await?;
        }
        Reply::Kakan { pai, .. } => {
            human_pace(debug).await;
            let hai = decode_one(&pai, &state.hand)?;
            remote.send(json!({"tag": "N", "type": 5, "hai": hai})).await?;
        }
        _ => {}
    }
    Ok(())
}

async fn handle_discard(
    msg: &TenhouMessage,
    state: &mut GameState,
    ai: &mut AiConn,
    remote: &RemoteSender,
    debug: bool,
) -> Result<(), BridgeError> {
    let tag = msg.tag();
    let first = tag.as_bytes()[0];
    let actor = (first.to_ascii_uppercase() - b'D') as u8;
    let index: ServerIndex = tag[1..].parse().unwrap_or(0);
    let pai = encode_one(index);
    // For our own seat, tsumogiri is "did we discard the tile we just drew", checked against the
    // hand's last element rather than the tag's case; every other seat is read off the tag case.
    let tsumogiri =
        if actor == 0 { state.hand.last() == Some(&index) } else { first.is_ascii_uppercase() };

    if actor == 0 {
        if let Some(pos) = state.hand.iter().position(|&t| t == index) {
            state.hand.remove(pos);
        }
    }

    let t = msg.int_field_or("t", 0)? as u32;
    let actions = action::discard_options(state, index, t);
    let possible_actions = actions_to_wire(&actions, 0, Some(actor), Some(&pai));

    let received =
        ai.send_to_mjai(&Event::Dahai { actor, pai: pai.clone(), tsumogiri, possible_actions }).await?;
    match received {
        Reply::Pon { consumed } => {
            let labels: Vec<&str> = consumed.iter().map(String::as_str).collect();
            let decoded = decode_many(&labels, &state.hand)?;
            human_pace(debug).await;
            remote.send(json!({"tag": "N", "type": 1, "hai0": decoded[0], "hai1": decoded[1]})).await?;
        }
        Reply::Daiminkan { .. } => {
            remote.send(json!({"tag": "N", "type": 2})).await?;
            human_pace(debug).await;
        }
        Reply::Chi { consumed } => {
            let labels: Vec<&str> = consumed.iter().map(String::as_str).collect();
            let decoded = decode_many(&labels, &state.hand)?;
            human_pace(debug).await;
            remote.send(json!({"tag": "N", "type": 3, "hai0": decoded[0], "hai1": decoded[1]})).await?;
        }
        Reply::Hora => {
            human_pace(debug).await;
            remote.send(json!({"tag": "N", "type": 6})).await?;
        }
        Reply::None if t != 0 => {
            remote.send(json!({"tag": "N"})).await?;
        }
        _ => {}
    }
    Ok(())
}

async fn handle_naki(
    msg: &TenhouMessage,
    state: &mut GameState,
    ai: &mut AiConn,
    remote: &RemoteSender,
    debug: bool,
) -> Result<(), BridgeError> {
    let actor = msg.int_field("who")? as u8;
    let m = msg.int_field("m")? as u16;
    let meld = Meld::decode(m);
    let target = (actor as i64 + meld.target() as i64).rem_euclid(4) as u8;
    let pai = meld.called_tile().map(encode_one).unwrap_or_else(|| encode_one(meld.all_tiles()[0]));
    let consumed: Vec<tile::Label> = match meld {
        Meld::Ankan { tiles } => tiles.iter().map(|&t| encode_one(t)).collect(),
        _ => meld.all_tiles()[1..].iter().map(|&t| encode_one(t)).collect(),
    };

    let cannot_dahai = if actor == 0 {
        let forbidden = action::cannot_dahai_after_call(state, &meld);
        let labels = kinds_to_labels(&forbidden);
        for t in meld.tiles_from_hand() {
            if let Some(pos) = state.hand.iter().position(|&h| h == t) {
                state.hand.remove(pos);
            }
        }
        state.melds.push(meld);
        Some(labels)
    } else {
        None
    };

    let event = match meld {
        Meld::Chi { .. } => Event::Chi { actor, target, pai, consumed, cannot_dahai },
        Meld::Pon { .. } => Event::Pon { actor, target, pai, consumed, cannot_dahai },
        Meld::Kakan { .. } => Event::Kakan { actor, target, pai, consumed, cannot_dahai },
        Meld::Daiminkan { .. } => Event::Daiminkan { actor, target, pai, consumed, cannot_dahai },
        Meld::Ankan { .. } => Event::Ankan { actor, target, pai, consumed, cannot_dahai },
    };

    let received = ai.send_to_mjai(&event).await?;
    if let Reply::Dahai { pai, tsumogiri } = received {
        let p = resolve_discard(&pai, tsumogiri, &state.hand)?;
        human_pace(debug).await;
        remote.send(json!({"tag": "D", "p": p})).await?;
    }
    Ok(())
}

async fn handle_reach_step1(
    msg: &TenhouMessage,
    state: &mut GameState,
    ai: &mut AiConn,
    remote: &RemoteSender,
    debug: bool,
) -> Result<(), BridgeError> {
    let actor = msg.int_field("who")? as u8;

    if actor == 0 {
        let forbidden = action::cannot_dahai_after_riichi_step1(state);
        let cannot_dahai = Some(kinds_to_labels(&forbidden));
        let received = ai.send_to_mjai(&Event::Reach { actor, cannot_dahai }).await?;
        if let Reply::Dahai { pai, tsumogiri } = received {
            let p = resolve_discard(&pai, tsumogiri, &state.hand)?;
            human_pace(debug).await;
            remote.send(json!({"tag": "D", "p": p})).await?;
        }
    } else {
        ai.send_to_mjai(&Event::Reach { actor, cannot_dahai: None }).await?;
    }
    Ok(())
}

async fn handle_reach_step2(msg: &TenhouMessage, state: &mut GameState, ai: &mut AiConn) -> Result<(), BridgeError> {
    let actor = msg.int_field("who")? as u8;
    if actor == 0 {
        state.in_riichi = true;
        state.recompute_wait();
    }

    let mut deltas = [0i32; 4];
    deltas[actor as usize] = -1000;
    let ten = msg.csv_ints("ten")?;
    let mut scores = [0i32; 4];
    for i in 0..4 {
        scores[i] = (ten[i] * 100) as i32;
    }

    ai.send_to_mjai(&Event::ReachAccepted { actor, deltas, scores }).await?;
    Ok(())
}

async fn handle_dora(msg: &TenhouMessage, ai: &mut AiConn) -> Result<(), BridgeError> {
    let hai = msg.int_field("hai")? as ServerIndex;
    ai.send_to_mjai(&Event::Dora { dora_marker: encode_one(hai) }).await?;
    Ok(())
}

async fn handle_round_end(
    _msg: &TenhouMessage,
    ai: &mut AiConn,
    remote: &RemoteSender,
    event: Event,
) -> Result<(), BridgeError> {
    ai.send_to_mjai(&event).await?;
    ai.send_to_mjai(&Event::EndKyoku).await?;
    remote.send(json!({"tag": "NEXTREADY"})).await?;
    Ok(())
}

async fn handle_match_end(msg: &TenhouMessage, ai: &mut AiConn) -> Result<(), BridgeError> {
    let scores = tenhou::parse_sc_tag(msg)?;
    let event = if msg.tag() == "AGARI" { Event::Hora { scores } } else { Event::Ryukyoku { scores } };
    ai.send_to_mjai(&event).await?;
    ai.send_to_mjai(&Event::EndKyoku).await?;

    let final_scores = tenhou::parse_owari_tag(msg)?;
    ai.send_to_mjai_tolerating_close(&Event::EndGame { scores: final_scores }).await?;
    Ok(())
}

/// `mjai_to_tenhou_one` equivalent: tsumogiri resolves to the last-drawn tile; otherwise the
/// label is decoded against the current hand.
fn resolve_discard(pai: &str, tsumogiri: bool, hand: &[ServerIndex]) -> Result<ServerIndex, BridgeError> {
    if tsumogiri {
        Ok(tsumogiri_one(hand).unwrap_or(0))
    } else {
        Ok(decode_one(pai, hand)?)
    }
}

fn kinds_to_labels(kinds: &HashSet<tile::KindIndex>) -> Vec<tile::Label> {
    kinds.iter().map(|&k| encode_one(4 * k)).collect()
}

/// Translates C5's [`action::PossibleAction`] list into the wire shape the AI expects, filling
/// in the `actor`/`target`/`pai` fields a bare server-index candidate doesn't carry.
fn actions_to_wire(
    actions: &[action::PossibleAction],
    actor: u8,
    target: Option<u8>,
    pai: Option<&str>,
) -> Vec<PossibleActionWire> {
    actions
        .iter()
        .map(|a| match a {
            action::PossibleAction::Hora => PossibleActionWire::Hora,
            action::PossibleAction::Reach => PossibleActionWire::Reach,
            action::PossibleAction::Ryukyoku => PossibleActionWire::Ryukyoku,
            action::PossibleAction::Ankan { tiles } => {
                PossibleActionWire::Ankan { actor, consumed: tiles.iter().map(|&t| encode_one(t)).collect() }
            }
            action::PossibleAction::Kakan { added, pon_tiles } => PossibleActionWire::Kakan {
                actor,
                pai: encode_one(*added),
                consumed: pon_tiles.iter().map(|&t| encode_one(t)).collect(),
            },
            action::PossibleAction::Pon { consumed } => PossibleActionWire::Pon {
                actor,
                target: target.unwrap_or(0),
                pai: pai.unwrap_or_default().to_string(),
                consumed: consumed.iter().map(|&t| encode_one(t)).collect(),
            },
            action::PossibleAction::Daiminkan { consumed } => PossibleActionWire::Daiminkan {
                actor,
                target: target.unwrap_or(0),
                pai: pai.unwrap_or_default().to_string(),
                consumed: consumed.iter().map(|&t| encode_one(t)).collect(),
            },
            action::PossibleAction::Chi { consumed } => PossibleActionWire::Chi {
                actor,
                target: target.unwrap_or(0),
                pai: pai.unwrap_or_default().to_string(),
                consumed: consumed.iter().map(|&t| encode_one(t)).collect(),
            },
        })
        .collect()
}
