//! # lrukvd
//!
//! Redis-compatible RESP2 server over a single in-memory [`lrukv::SharedCache`].
//! Values live only as long as the process; a full cache evicts its least
//! recently used key.

pub mod handler;
pub mod resp;
pub mod server;

pub use handler::{ByteCache, CommandHandler};
pub use resp::{ProtocolError, RespValue};
pub use server::serve;
