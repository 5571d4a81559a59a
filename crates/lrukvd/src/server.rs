//! TCP accept loop and per-connection request handling

use anyhow::Result;
use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

use crate::handler::{ByteCache, CommandHandler};
use crate::resp::RespValue;

/// Accept connections forever, one task per client
pub async fn serve(listener: TcpListener, cache: ByteCache) -> Result<()> {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("New connection from {}", addr);
                let handler = CommandHandler::new(cache.clone());

                tokio::spawn(async move {
                    if let Err(e) = handle_client(stream, handler).await {
                        error!("Error handling client {}: {}", addr, e);
                    }
                    info!("Connection closed: {}", addr);
                });
            }
            Err(e) => {
                error!("Error accepting connection: {}", e);
            }
        }
    }
}

async fn handle_client(mut stream: TcpStream, handler: CommandHandler) -> Result<()> {
    let mut buffer = BytesMut::with_capacity(4096);
    let mut replies = BytesMut::with_capacity(4096);

    loop {
        let n = stream.read_buf(&mut buffer).await?;
        if n == 0 {
            return Ok(());
        }

        // Answer every complete frame in the buffer, then flush once.
        loop {
            match RespValue::parse(&mut buffer) {
                Ok(Some(cmd)) => handler.handle(cmd).write_to(&mut replies),
                Ok(None) => break,
                Err(e) => {
                    warn!("Protocol error: {}", e);
                    RespValue::error(format!("ERR {}", e)).write_to(&mut replies);
                    buffer.clear();
                    break;
                }
            }
        }

        if !replies.is_empty() {
            debug!(bytes = replies.len(), "writing replies");
            stream.write_all(&replies).await?;
            replies.clear();
        }
    }
}
