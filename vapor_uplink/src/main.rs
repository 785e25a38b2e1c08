//! # Vapor Uplink Liaison
//!
//! Development consumer for the rig's publish channel: binds the feed
//! socket, decodes the JSON datagrams the control unit emits and logs
//! them. This module is read-only — it never sends anything back.
//!
//! # Wire Messages (one JSON object per datagram)
//!
//! | Message        | Cadence            | Content                      |
//! |----------------|--------------------|------------------------------|
//! | `Announcement` | once at startup    | device, version, feed list   |
//! | `FeedMessage`  | every Nth tick     | feed name + one value        |

use clap::Parser;
use std::net::UdpSocket;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::EnvFilter;

use vapor_common::telemetry::{Announcement, FeedMessage};

/// Vapor Uplink Liaison — publish-channel listener
#[derive(Parser, Debug)]
#[command(name = "vapor_uplink")]
#[command(author = "VaporSur Controls")]
#[command(version)]
#[command(about = "Receives and logs the vapor rig's telemetry feed")]
struct Args {
    /// UDP address to listen on for feed datagrams.
    #[arg(long, default_value = "127.0.0.1:9870")]
    listen: String,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    setup_tracing(&args);

    info!(
        "Vapor Uplink Liaison v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    if let Err(e) = run(&args) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Vapor Uplink Liaison shutdown complete");
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let socket = UdpSocket::bind(&args.listen)?;
    // Short read timeout so the shutdown flag is honored promptly.
    socket.set_read_timeout(Some(Duration::from_millis(500)))?;
    info!("Listening for feed datagrams on {}", args.listen);

    // Signal handler for graceful shutdown.
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    let mut feed_count: u64 = 0;
    let mut announcement_count: u64 = 0;
    let mut buf = [0u8; 1024];

    while running.load(Ordering::SeqCst) {
        let (len, peer) = match socket.recv_from(&mut buf) {
            Ok(received) => received,
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) =>
            {
                continue;
            }
            Err(e) => {
                warn!("recv error: {e}");
                continue;
            }
        };

        let payload = &buf[..len];
        // The feed is the high-rate message; try it first.
        if let Ok(msg) = serde_json::from_slice::<FeedMessage>(payload) {
            feed_count += 1;
            info!(feed = %msg.feed, value = msg.value[0], "feed update");
        } else if let Ok(hello) = serde_json::from_slice::<Announcement>(payload) {
            announcement_count += 1;
            info!(
                device = %hello.device,
                version = %hello.version,
                feeds = hello.feeds.len(),
                "device announcement"
            );
        } else {
            debug!(%peer, len, "unparseable datagram dropped");
        }
    }

    info!(
        "Received {} feed updates, {} announcements",
        feed_count, announcement_count
    );
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
