//! lrukv Daemon - Redis-compatible RESP server over an LRU cache

use std::net::SocketAddr;

use anyhow::Result;
use clap::Parser;
use tokio::net::{TcpListener, TcpStream};
use tracing::info;
use tracing_subscriber::EnvFilter;

use lrukvd::ByteCache;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Bind address
    #[arg(short, long, default_value = "127.0.0.1:6380")]
    bind: String,

    /// Cache capacity (number of keys, must be positive)
    #[arg(short, long, default_value_t = 10000, allow_negative_numbers = true)]
    capacity: i64,

    /// Health check mode (for Docker)
    #[arg(long)]
    health: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .init();

    let args = Args::parse();

    if args.health {
        match TcpStream::connect(&args.bind).await {
            Ok(_) => {
                println!("OK");
                std::process::exit(0);
            }
            Err(_) => {
                eprintln!("FAILED");
                std::process::exit(1);
            }
        }
    }

    info!("Starting lrukv daemon v{}", env!("CARGO_PKG_VERSION"));

    let cache = ByteCache::new(args.capacity)?;
    info!("Cache capacity: {} keys", cache.capacity());

    let listener = TcpListener::bind(&args.bind).await?;
    let addr = listener.local_addr()?;
    info!("Server listening on {}", addr);
    println!("Connect with: {}", connect_hint(addr));

    tokio::select! {
        result = lrukvd::serve(listener, cache) => result?,
        _ = tokio::signal::ctrl_c() => info!("Shutting down"),
    }

    Ok(())
}

/// Directives from `RUST_LOG`, or `info` when unset or unparsable
fn env_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn connect_hint(addr: SocketAddr) -> String {
    format!("redis-cli -h {} -p {}", addr.ip(), addr.port())
}
