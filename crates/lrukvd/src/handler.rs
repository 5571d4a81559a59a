//! Command handler for the RESP server

use lrukv::SharedCache;

use crate::resp::RespValue;

/// Cache type served by the daemon: raw bytes in, raw bytes out
pub type ByteCache = SharedCache<Vec<u8>, Vec<u8>>;

/// Executes parsed commands against the shared cache
pub struct CommandHandler {
    cache: ByteCache,
}

fn wrong_arity(command: &str) -> RespValue {
    RespValue::error(format!(
        "ERR wrong number of arguments for '{}' command",
        command
    ))
}

fn bulk_arg(arg: &RespValue) -> Option<&[u8]> {
    match arg {
        RespValue::BulkString(Some(bytes)) => Some(bytes.as_slice()),
        _ => None,
    }
}

/// All arguments as byte strings, or `None` if any is not a bulk string
fn bulk_args(args: &[RespValue]) -> Option<Vec<&[u8]>> {
    args.iter().map(bulk_arg).collect()
}

impl CommandHandler {
    /// Create a handler over a shared cache
    pub fn new(cache: ByteCache) -> Self {
        Self { cache }
    }

    /// Execute one command frame and build its reply
    pub fn handle(&self, cmd: RespValue) -> RespValue {
        let arr = match cmd {
            RespValue::Array(Some(arr)) if !arr.is_empty() => arr,
            _ => return RespValue::error("ERR invalid command format"),
        };

        let command = match bulk_arg(&arr[0]) {
            Some(name) => String::from_utf8_lossy(name).to_uppercase(),
            None => return RespValue::error("ERR invalid command"),
        };

        let args = &arr[1..];
        match command.as_str() {
            "PING" => self.handle_ping(args),
            "ECHO" => self.handle_echo(args),
            "GET" => self.handle_get(args),
            "SET" => self.handle_set(args),
            "DEL" => self.handle_del(args),
            "EXISTS" => self.handle_exists(args),
            "KEYS" => self.handle_keys(args),
            "DBSIZE" => RespValue::Integer(self.cache.len() as i64),
            "FLUSHDB" => {
                self.cache.clear();
                RespValue::ok()
            }
            "INFO" => self.handle_info(),
            "COMMAND" => RespValue::Array(Some(vec![])),
            _ => RespValue::error(format!("ERR unknown command '{}'", command)),
        }
    }

    fn handle_ping(&self, args: &[RespValue]) -> RespValue {
        match args {
            [] => RespValue::SimpleString("PONG".to_string()),
            [message] => message.clone(),
            _ => wrong_arity("ping"),
        }
    }

    fn handle_echo(&self, args: &[RespValue]) -> RespValue {
        match args {
            [message] => message.clone(),
            _ => wrong_arity("echo"),
        }
    }

    fn handle_get(&self, args: &[RespValue]) -> RespValue {
        let [key] = args else {
            return wrong_arity("get");
        };
        let Some(key) = bulk_arg(key) else {
            return RespValue::error("ERR invalid key type");
        };

        match self.cache.get(key) {
            Some(value) => RespValue::bulk(value),
            None => RespValue::null(),
        }
    }

    fn handle_set(&self, args: &[RespValue]) -> RespValue {
        let [key, value] = args else {
            return wrong_arity("set");
        };
        let (Some(key), Some(value)) = (bulk_arg(key), bulk_arg(value)) else {
            return RespValue::error("ERR invalid key or value type");
        };

        self.cache.put(key.to_vec(), value.to_vec());
        RespValue::ok()
    }

    fn handle_del(&self, args: &[RespValue]) -> RespValue {
        if args.is_empty() {
            return wrong_arity("del");
        }
        let Some(keys) = bulk_args(args) else {
            return RespValue::error("ERR invalid key type");
        };

        let deleted = keys
            .into_iter()
            .filter(|key| self.cache.remove(*key).is_some())
            .count();

        RespValue::Integer(deleted as i64)
    }

    fn handle_exists(&self, args: &[RespValue]) -> RespValue {
        if args.is_empty() {
            return wrong_arity("exists");
        }
        let Some(keys) = bulk_args(args) else {
            return RespValue::error("ERR invalid key type");
        };

        let count = keys
            .into_iter()
            .filter(|key| self.cache.contains(*key))
            .count();

        RespValue::Integer(count as i64)
    }

    fn handle_keys(&self, args: &[RespValue]) -> RespValue {
        match args {
            [] => {}
            [pattern] if bulk_arg(pattern) == Some(&b"*"[..]) => {}
            [_] => return RespValue::error("ERR only the '*' pattern is supported"),
            _ => return wrong_arity("keys"),
        }

        let keys = self.cache.keys().into_iter().map(RespValue::bulk).collect();
        RespValue::Array(Some(keys))
    }

    fn handle_info(&self) -> RespValue {
        let stats = self.cache.stats().snapshot();
        let hit_ratio = self.cache.stats().hit_ratio();

        let info = format!(
            "# Server\r\n\
             lrukv_version:{}\r\n\
             \r\n\
             # Keyspace\r\n\
             keys:{}\r\n\
             capacity:{}\r\n\
             \r\n\
             # Stats\r\n\
             cache_hits:{}\r\n\
             cache_misses:{}\r\n\
             cache_hit_ratio:{:.2}\r\n\
             inserts:{}\r\n\
             updates:{}\r\n\
             evictions:{}\r\n\
             removals:{}\r\n",
            env!("CARGO_PKG_VERSION"),
            self.cache.len(),
            self.cache.capacity(),
            stats.hits,
            stats.misses,
            hit_ratio,
            stats.inserts,
            stats.updates,
            stats.evictions,
            stats.removals,
        );
        RespValue::bulk(info)
    }
}
