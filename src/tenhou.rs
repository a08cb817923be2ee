//! Tenhou wire messages (§6 "Remote server (websocket)"): the server's JSON-over-websocket
//! protocol, keyed on a `tag` field with a grab-bag of auxiliary fields per tag.
//!
//! The original (`responder.py`) works directly on `dict[str, str]` and matches tags with
//! `re.match`; that shape is kept here as [`TenhouMessage`] (a thin wrapper over
//! `serde_json::Value`) rather than one Rust struct per tag, since most tags carry a different,
//! partially-overlapping field set and the router only ever needs a handful of fields out of any
//! one message.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::BridgeError;

/// Matches own/opponent draw tags: `T`, `U`, `V`, `W`, each optionally followed by a tile index.
pub static TSUMO_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[TUVW]\d*$").unwrap());

/// Matches discard tags: upper-case for tsumogiri, lower-case for tedashi (`D/E/F/G` own and
/// opponents', `d/e/f/g` likewise -- the case itself is orthogonal to which seat discarded).
pub static DAHAI_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[DEFGdefg]\d*$").unwrap());

/// Room-code grammar from §6: `("0"|[1-7][0-9]{3}) "_" ("0"|"1"|"9")`.
pub static ROOM_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(0|[1-7][0-9]{3})_(0|1|9)$").unwrap());

/// A single server message: `tag` plus whatever auxiliary JSON fields came with it.
#[derive(Debug, Clone)]
pub struct TenhouMessage {
    value: Value,
}

impl TenhouMessage {
    pub fn from_value(value: Value) -> Self {
        TenhouMessage { value }
    }

    pub fn tag(&self) -> &str {
        self.value.get("tag").and_then(Value::as_str).unwrap_or("")
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.value.get(field).is_some()
    }

    pub fn str_field(&self, field: &'static str) -> Result<&str, BridgeError> {
        self.value
            .get(field)
            .and_then(Value::as_str)
            .ok_or(BridgeError::MissingField(field, self.value.clone()))
    }

    pub fn int_field(&self, field: &'static str) -> Result<i64, BridgeError> {
        let s = self.str_field(field)?;
        s.parse::<i64>().map_err(|_| BridgeError::MissingField(field, self.value.clone()))
    }

    /// As [`TenhouMessage::int_field`], but a missing field yields `default` instead of an error
    /// (several tags, e.g. the `t` option bitmask, are only present when non-zero).
    pub fn int_field_or(&self, field: &'static str, default: i64) -> Result<i64, BridgeError> {
        if self.has_field(field) {
            self.int_field(field)
        } else {
            Ok(default)
        }
    }

    pub fn csv_ints(&self, field: &'static str) -> Result<Vec<i64>, BridgeError> {
        self.str_field(field)?
            .split(',')
            .map(|s| s.parse::<i64>().map_err(|_| BridgeError::MissingField(field, self.value.clone())))
            .collect()
    }

    pub fn raw(&self) -> &Value {
        &self.value
    }
}

/// The keep-alive ping, sent as the raw text frame `<Z/>` (not a JSON object) -- the one frame on
/// this transport that isn't JSON, per `main.py`'s `await send(websocket, '<Z/>')` and §6.
pub const PING: &str = "<Z/>";

/// Parses a `sc` field (`before_0,delta_0,before_1,delta_1,...`) into post-delta absolute scores,
/// each scaled by 100 (the server reports scores in units of 100 points). Ported from
/// `parse_sc_tag` in the original decoder.
pub fn parse_sc_tag(message: &TenhouMessage) -> Result<[i32; 4], BridgeError> {
    let sc = message.csv_ints("sc")?;
    let mut scores = [0i32; 4];
    for i in 0..4 {
        let before = sc[2 * i];
        let delta = sc[2 * i + 1];
        scores[i] = ((before + delta) * 100) as i32;
    }
    Ok(scores)
}

/// Parses an `owari` field (`score_0,rank_0,score_1,rank_1,...`) into final absolute scores, each
/// scaled by 100. Ported from `parse_owari_tag`: only the even-indexed (score) entries are kept.
pub fn parse_owari_tag(message: &TenhouMessage) -> Result<[i32; 4], BridgeError> {
    let all = message.csv_ints("owari")?;
    let mut scores = [0i32; 4];
    for i in 0..4 {
        scores[i] = (all[2 * i] * 100) as i32;
    }
    Ok(scores)
}
