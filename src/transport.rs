//! Transport scaffolding (§6 "External interfaces"): the two byte-stream collaborators the core
//! (C1-C7) treats as external per spec.md §1 -- a duplex websocket client to the remote tenhou
//! server, and a line-oriented TCP listener speaking newline-delimited JSON to the AI.

pub mod ai;
pub mod remote;
