//! Process entry point: parses [`Config`], wires up logging to a per-run file under `logs/`
//! (mirroring `settings.py`'s `LOGGING['handlers']['file']`), then accepts AI connections forever,
//! spawning one [`Session`] per socket.

mod action;
mod config;
mod error;
mod meld;
mod mjai;
mod router;
mod session;
mod state;
mod tenhou;
mod tile;
mod transport;
mod win;

use std::fs::{self, OpenOptions};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use log::{error, info};
use tokio::net::TcpListener;

use crate::config::Config;
use crate::session::Session;

fn init_logging() {
    fs::create_dir_all("logs").expect("failed to create logs directory");
    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0);
    let path = format!("logs/mjai-bridge-{timestamp}.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .unwrap_or_else(|e| panic!("failed to open log file {path}: {e}"));

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let config = Config::parse();

    let listener = TcpListener::bind(config.listen_addr()).await?;
    info!("listening for AI connections on {}", config.listen_addr());

    loop {
        let (stream, peer) = listener.accept().await?;
        info!("accepted AI connection from {peer}");
        let session = Session::new(config.sex.as_tenhou_str(), config.debug);
        tokio::spawn(async move {
            if let Err(e) = session.run(stream).await {
                error!("session for {peer} ended with error: {e}");
            }
        });
    }
}
