//! Process configuration (§6 "Configuration"): listen address, player sex, and the debug flag
//! that disables pacing sleeps. Parsed once in `main` via `clap`, the way `tenhou-db`'s CLI
//! binary takes its options behind a `clap::Parser` derive.

use clap::Parser;

/// Player sex reported to the remote server's `HELO` frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn as_tenhou_str(self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
        }
    }
}

impl std::str::FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "M" | "m" => Ok(Sex::Male),
            "F" | "f" => Ok(Sex::Female),
            other => Err(format!("sex must be M or F, got {other:?}")),
        }
    }
}

/// mjai-bridge: a protocol-bridging proxy between the tenhou wire protocol and mjai.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Config {
    /// Host to listen on for the AI's byte-stream connection.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on for the AI's byte-stream connection.
    #[arg(long, default_value_t = 11600)]
    pub port: u16,

    /// Player sex reported to the remote server.
    #[arg(short = 's', long, default_value = "M")]
    pub sex: Sex,

    /// Disable the pacing sleep before every AI-originated action.
    #[arg(short = 'd', long)]
    pub debug: bool,
}

impl Config {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
