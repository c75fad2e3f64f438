//! Spin relay server binary.
//!
//! ```bash
//! PORT=3000 spin-relay
//! spin-relay --host 127.0.0.1 --port 4000 --strict-actions
//! ```

use std::sync::Arc;

use clap::Parser;
use spin_relay::{InvalidPayloadPolicy, RelayError, Server, ServerConfig};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Room relay for slot-machine spins
#[derive(Parser, Debug)]
#[command(name = "spin-relay")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Only relay spins from members of the target room
    #[arg(long, env = "RELAY_STRICT_ACTIONS")]
    strict_actions: bool,

    /// Forget rooms once their last member disconnects
    #[arg(long, env = "RELAY_PRUNE_EMPTY_ROOMS")]
    prune_empty_rooms: bool,

    /// Drop malformed events without sending an error back
    #[arg(long, env = "RELAY_SILENT_ERRORS")]
    silent_errors: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), RelayError> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let policy = if args.silent_errors {
        InvalidPayloadPolicy::Ignore
    } else {
        InvalidPayloadPolicy::Reply
    };

    let config = ServerConfig::builder()
        .addr(args.host)
        .port(args.port)
        .invalid_payload_policy(policy)
        .require_membership_for_actions(args.strict_actions)
        .prune_empty_rooms(args.prune_empty_rooms)
        .build()?;

    let listener = TcpListener::bind(config.bind_addr()).await?;
    let server = Arc::new(Mutex::new(Server::new(config)));

    spin_relay::run(listener, server).await
}
