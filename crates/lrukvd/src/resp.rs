//! RESP2 (REdis Serialization Protocol) frames
//!
//! Parsing is incremental: a partial frame leaves the buffer untouched and
//! yields `Ok(None)` until the rest of it arrives.

use std::fmt;

use bytes::{Buf, BufMut, BytesMut};

/// Largest bulk string accepted from a client (512 MB)
const MAX_BULK_LEN: usize = 512 * 1024 * 1024;

/// Largest array accepted from a client (1M elements)
const MAX_ARRAY_LEN: usize = 1024 * 1024;

/// Longest header or simple-string line, CRLF excluded (64 KB)
const MAX_LINE_LEN: usize = 64 * 1024;

/// Deepest array nesting accepted; commands only need one level
const MAX_DEPTH: usize = 32;

/// A single RESP2 value
#[derive(Debug, Clone, PartialEq)]
pub enum RespValue {
    /// `+OK\r\n`
    SimpleString(String),
    /// `-ERR message\r\n`
    Error(String),
    /// `:1000\r\n`
    Integer(i64),
    /// `$6\r\nfoobar\r\n`, or `$-1\r\n` for null
    BulkString(Option<Vec<u8>>),
    /// `*2\r\n...`, or `*-1\r\n` for null
    Array(Option<Vec<RespValue>>),
}

/// Malformed input from a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// First byte of a frame is not a RESP2 type marker
    UnknownType(u8),
    /// Length or integer field is not a valid number
    InvalidInteger(String),
    /// Length is negative but not the null marker
    InvalidLength(i64),
    /// Bulk string exceeds `MAX_BULK_LEN`
    BulkTooLarge(usize),
    /// Array exceeds `MAX_ARRAY_LEN`
    ArrayTooLarge(usize),
    /// Bulk payload not followed by CRLF
    MissingTerminator,
    /// Simple string or error is not UTF-8
    InvalidUtf8,
    /// No CRLF within `MAX_LINE_LEN` bytes
    LineTooLong,
    /// Arrays nested deeper than `MAX_DEPTH`
    NestingTooDeep,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::UnknownType(b) => write!(f, "unknown RESP type byte 0x{:02x}", b),
            ProtocolError::InvalidInteger(s) => write!(f, "invalid integer '{}'", s),
            ProtocolError::InvalidLength(n) => write!(f, "invalid length {}", n),
            ProtocolError::BulkTooLarge(n) => {
                write!(f, "bulk string too large: {} bytes (max {})", n, MAX_BULK_LEN)
            }
            ProtocolError::ArrayTooLarge(n) => {
                write!(f, "array too large: {} elements (max {})", n, MAX_ARRAY_LEN)
            }
            ProtocolError::MissingTerminator => write!(f, "expected CRLF after bulk string"),
            ProtocolError::InvalidUtf8 => write!(f, "invalid UTF-8 in simple string"),
            ProtocolError::LineTooLong => {
                write!(f, "line too long: no CRLF within {} bytes", MAX_LINE_LEN)
            }
            ProtocolError::NestingTooDeep => {
                write!(f, "arrays nested deeper than {} levels", MAX_DEPTH)
            }
        }
    }
}

impl std::error::Error for ProtocolError {}

type ParseResult<T> = Result<Option<T>, ProtocolError>;

impl RespValue {
    /// `+OK`
    pub fn ok() -> Self {
        RespValue::SimpleString("OK".to_string())
    }

    /// `-<msg>`
    pub fn error(msg: impl Into<String>) -> Self {
        RespValue::Error(msg.into())
    }

    /// Non-null bulk string
    pub fn bulk(data: impl Into<Vec<u8>>) -> Self {
        RespValue::BulkString(Some(data.into()))
    }

    /// `$-1`
    pub fn null() -> Self {
        RespValue::BulkString(None)
    }

    /// Append the wire form of this value to `out`
    pub fn write_to(&self, out: &mut BytesMut) {
        match self {
            RespValue::SimpleString(s) => write_line(out, b'+', s.as_bytes()),
            RespValue::Error(e) => write_line(out, b'-', e.as_bytes()),
            RespValue::Integer(i) => write_line(out, b':', i.to_string().as_bytes()),
            RespValue::BulkString(None) => out.put_slice(b"$-1\r\n"),
            RespValue::BulkString(Some(data)) => {
                write_line(out, b'$', data.len().to_string().as_bytes());
                out.put_slice(data);
                out.put_slice(b"\r\n");
            }
            RespValue::Array(None) => out.put_slice(b"*-1\r\n"),
            RespValue::Array(Some(items)) => {
                write_line(out, b'*', items.len().to_string().as_bytes());
                for item in items {
                    item.write_to(out);
                }
            }
        }
    }

    /// Wire form of this value
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = BytesMut::new();
        self.write_to(&mut out);
        out.to_vec()
    }

    /// Take one complete frame off the front of `buf`
    ///
    /// Returns `Ok(None)` and consumes nothing when `buf` holds only part of
    /// a frame.
    pub fn parse(buf: &mut BytesMut) -> Result<Option<RespValue>, ProtocolError> {
        let mut pos = 0;
        match parse_frame(&buf[..], &mut pos, 0)? {
            Some(value) => {
                buf.advance(pos);
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }
}

fn write_line(out: &mut BytesMut, marker: u8, body: &[u8]) {
    out.put_u8(marker);
    out.put_slice(body);
    out.put_slice(b"\r\n");
}

fn parse_frame(buf: &[u8], pos: &mut usize, depth: usize) -> ParseResult<RespValue> {
    let Some(&marker) = buf.get(*pos) else {
        return Ok(None);
    };
    *pos += 1;

    match marker {
        b'+' => Ok(read_text(buf, pos)?.map(RespValue::SimpleString)),
        b'-' => Ok(read_text(buf, pos)?.map(RespValue::Error)),
        b':' => Ok(read_integer(buf, pos)?.map(RespValue::Integer)),
        b'$' => parse_bulk(buf, pos),
        b'*' => parse_array(buf, pos, depth + 1),
        other => Err(ProtocolError::UnknownType(other)),
    }
}

fn parse_bulk(buf: &[u8], pos: &mut usize) -> ParseResult<RespValue> {
    let Some(len) = read_length(buf, pos)? else {
        return Ok(None);
    };
    let Some(len) = len else {
        return Ok(Some(RespValue::BulkString(None)));
    };

    if len > MAX_BULK_LEN {
        return Err(ProtocolError::BulkTooLarge(len));
    }

    let end = *pos + len;
    if buf.len() < end + 2 {
        return Ok(None);
    }
    if &buf[end..end + 2] != b"\r\n" {
        return Err(ProtocolError::MissingTerminator);
    }

    let data = buf[*pos..end].to_vec();
    *pos = end + 2;
    Ok(Some(RespValue::BulkString(Some(data))))
}

fn parse_array(buf: &[u8], pos: &mut usize, depth: usize) -> ParseResult<RespValue> {
    if depth > MAX_DEPTH {
        return Err(ProtocolError::NestingTooDeep);
    }

    let Some(len) = read_length(buf, pos)? else {
        return Ok(None);
    };
    let Some(len) = len else {
        return Ok(Some(RespValue::Array(None)));
    };

    if len > MAX_ARRAY_LEN {
        return Err(ProtocolError::ArrayTooLarge(len));
    }

    let mut items = Vec::with_capacity(len.min(64));
    for _ in 0..len {
        match parse_frame(buf, pos, depth)? {
            Some(item) => items.push(item),
            None => return Ok(None),
        }
    }

    Ok(Some(RespValue::Array(Some(items))))
}

/// Length header; the inner `None` is the `-1` null marker
fn read_length(buf: &[u8], pos: &mut usize) -> ParseResult<Option<usize>> {
    let Some(n) = read_integer(buf, pos)? else {
        return Ok(None);
    };

    match n {
        -1 => Ok(Some(None)),
        n if n < 0 => Err(ProtocolError::InvalidLength(n)),
        n => Ok(Some(Some(n as usize))),
    }
}

fn read_integer(buf: &[u8], pos: &mut usize) -> ParseResult<i64> {
    let Some(line) = read_line(buf, pos)? else {
        return Ok(None);
    };

    let text = String::from_utf8_lossy(line);
    text.parse::<i64>()
        .map(Some)
        .map_err(|_| ProtocolError::InvalidInteger(text.into_owned()))
}

fn read_text(buf: &[u8], pos: &mut usize) -> ParseResult<String> {
    let Some(line) = read_line(buf, pos)? else {
        return Ok(None);
    };

    String::from_utf8(line.to_vec())
        .map(Some)
        .map_err(|_| ProtocolError::InvalidUtf8)
}

/// Scans at most `MAX_LINE_LEN + 2` bytes, so a client that never sends
/// CRLF costs a bounded amount of work per read.
fn read_line<'a>(buf: &'a [u8], pos: &mut usize) -> ParseResult<&'a [u8]> {
    let start = *pos;
    let window = &buf[start..buf.len().min(start + MAX_LINE_LEN + 2)];

    match window.windows(2).position(|w| w == b"\r\n") {
        Some(offset) => {
            *pos = start + offset + 2;
            Ok(Some(&buf[start..start + offset]))
        }
        None if window.len() >= MAX_LINE_LEN + 2 => Err(ProtocolError::LineTooLong),
        None => Ok(None),
    }
}
