//! RESP2 parser and encoder

use super::types::{RespValue, RespError};
use bytes::{Buf, BufMut, Bytes, BytesMut};

const CRLF: &[u8] = b"\r\n";

/// RESP2 Parser
pub struct RespParser;

impl RespParser {
    /// Parse one frame from the front of `buf`
    ///
    /// Returns Ok(Some(value)) and consumes the frame when it is complete,
    /// Ok(None) without consuming anything when more bytes are needed,
    /// Err(e) when the data is not valid RESP.
    pub fn parse(buf: &mut BytesMut) -> Result<Option<RespValue>, RespError> {
        let mut cursor = 0;
        match Self::decode(buf, &mut cursor)? {
            Some(value) => {
                buf.advance(cursor);
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Decode the frame starting at `*pos`, moving `*pos` past it
    fn decode(buf: &[u8], pos: &mut usize) -> Result<Option<RespValue>, RespError> {
        if *pos >= buf.len() {
            return Ok(None);
        }

        let prefix = buf[*pos];
        let line_end = match Self::find_crlf(buf, *pos + 1) {
            Some(end) => end,
            None => return Ok(None),
        };
        let line = &buf[*pos + 1..line_end];
        let body_start = line_end + 2;

        match prefix {
            b'+' => {
                *pos = body_start;
                Ok(Some(RespValue::SimpleString(Self::utf8(line)?)))
            }
            b'-' => {
                *pos = body_start;
                Ok(Some(RespValue::Error(Self::utf8(line)?)))
            }
            b':' => {
                *pos = body_start;
                Ok(Some(RespValue::Integer(Self::integer(line)?)))
            }
            b'$' => {
                let len = Self::integer(line)?;
                if len == -1 {
                    *pos = body_start;
                    return Ok(Some(RespValue::Null));
                }
                if len < 0 {
                    return Err(RespError::InvalidProtocol(
                        format!("Invalid bulk string length: {}", len)
                    ));
                }

                let body_end = body_start + len as usize;
                if buf.len() < body_end + 2 {
                    return Ok(None);
                }
                if &buf[body_end..body_end + 2] != CRLF {
                    return Err(RespError::InvalidProtocol(
                        "Missing CRLF after bulk string data".to_string()
                    ));
                }

                *pos = body_end + 2;
                Ok(Some(RespValue::BulkString(Bytes::copy_from_slice(&buf[body_start..body_end]))))
            }
            b'*' => {
                let count = Self::integer(line)?;
                if count == -1 {
                    *pos = body_start;
                    return Ok(Some(RespValue::Null));
                }
                if count < 0 {
                    return Err(RespError::InvalidProtocol(
                        format!("Invalid array count: {}", count)
                    ));
                }

                // Elements are decoded against a local cursor; the caller only
                // commits it once the whole array is present.
                let mut cursor = body_start;
                let mut elements = Vec::with_capacity(count.min(1024) as usize);
                for _ in 0..count {
                    match Self::decode(buf, &mut cursor)? {
                        Some(value) => elements.push(value),
                        None => return Ok(None),
                    }
                }

                *pos = cursor;
                Ok(Some(RespValue::Array(elements)))
            }
            other => Err(RespError::InvalidProtocol(
                format!("Unknown type prefix: {}", other as char)
            )),
        }
    }

    fn find_crlf(buf: &[u8], from: usize) -> Option<usize> {
        if from >= buf.len() {
            return None;
        }
        buf[from..]
            .windows(2)
            .position(|w| w == CRLF)
            .map(|i| from + i)
    }

    fn utf8(line: &[u8]) -> Result<String, RespError> {
        String::from_utf8(line.to_vec()).map_err(|_| RespError::InvalidUtf8)
    }

    fn integer(line: &[u8]) -> Result<i64, RespError> {
        let s = std::str::from_utf8(line).map_err(|_| RespError::InvalidUtf8)?;
        s.parse::<i64>()
            .map_err(|_| RespError::InvalidInteger(s.to_string()))
    }
}

/// RESP2 Encoder
pub struct RespEncoder;

impl RespEncoder {
    /// Encode a command (name followed by its arguments) as an array of
    /// bulk strings
    pub fn encode_command(buf: &mut BytesMut, args: &[Bytes]) {
        buf.put_u8(b'*');
        buf.put_slice(args.len().to_string().as_bytes());
        buf.put_slice(CRLF);
        for arg in args {
            Self::put_bulk(buf, arg);
        }
    }

    /// Encode a RESP value to bytes
    pub fn encode(value: &RespValue) -> Bytes {
        let mut buf = BytesMut::new();
        Self::encode_to(&mut buf, value);
        buf.freeze()
    }

    /// Encode a RESP value into an existing buffer
    pub fn encode_to(buf: &mut BytesMut, value: &RespValue) {
        match value {
            RespValue::SimpleString(s) => {
                buf.put_u8(b'+');
                buf.put_slice(s.as_bytes());
                buf.put_slice(CRLF);
            }
            RespValue::Error(e) => {
                buf.put_u8(b'-');
                buf.put_slice(e.as_bytes());
                buf.put_slice(CRLF);
            }
            RespValue::Integer(i) => {
                buf.put_u8(b':');
                buf.put_slice(i.to_string().as_bytes());
                buf.put_slice(CRLF);
            }
            RespValue::BulkString(bytes) => Self::put_bulk(buf, bytes),
            RespValue::Null => {
                buf.put_slice(b"$-1\r\n");
            }
            RespValue::Array(arr) => {
                buf.put_u8(b'*');
                buf.put_slice(arr.len().to_string().as_bytes());
                buf.put_slice(CRLF);
                for elem in arr {
                    Self::encode_to(buf, elem);
                }
            }
        }
    }

    fn put_bulk(buf: &mut BytesMut, bytes: &[u8]) {
        buf.put_u8(b'$');
        buf.put_slice(bytes.len().to_string().as_bytes());
        buf.put_slice(CRLF);
        buf.put_slice(bytes);
        buf.put_slice(CRLF);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalars() {
        let mut buf = BytesMut::from("+OK\r\n-ERR boom\r\n:1000\r\n");
        assert_eq!(RespParser::parse(&mut buf).unwrap(), Some(RespValue::ok()));
        assert_eq!(
            RespParser::parse(&mut buf).unwrap(),
            Some(RespValue::Error("ERR boom".to_string()))
        );
        assert_eq!(RespParser::parse(&mut buf).unwrap(), Some(RespValue::Integer(1000)));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_parse_bulk_and_nulls() {
        let mut buf = BytesMut::from("$6\r\nfoobar\r\n$-1\r\n*-1\r\n");
        assert_eq!(
            RespParser::parse(&mut buf).unwrap(),
            Some(RespValue::BulkString(Bytes::from("foobar")))
        );
        assert_eq!(RespParser::parse(&mut buf).unwrap(), Some(RespValue::Null));
        assert_eq!(RespParser::parse(&mut buf).unwrap(), Some(RespValue::Null));
    }

    #[test]
    fn test_partial_array_consumes_nothing() {
        let mut buf = BytesMut::from("*2\r\n$3\r\nfoo\r\n$3\r\nba");
        assert_eq!(RespParser::parse(&mut buf).unwrap(), None);
        assert_eq!(buf.len(), 19);

        buf.extend_from_slice(b"r\r\n");
        assert_eq!(
            RespParser::parse(&mut buf).unwrap(),
            Some(RespValue::Array(vec![
                RespValue::BulkString(Bytes::from("foo")),
                RespValue::BulkString(Bytes::from("bar")),
            ]))
        );
        assert!(buf.is_empty());
    }

    #[test]
    fn test_nested_array() {
        let mut buf = BytesMut::from("*2\r\n*1\r\n:1\r\n$-1\r\n");
        assert_eq!(
            RespParser::parse(&mut buf).unwrap(),
            Some(RespValue::Array(vec![
                RespValue::Array(vec![RespValue::Integer(1)]),
                RespValue::Null,
            ]))
        );
    }

    #[test]
    fn test_invalid_prefix() {
        let mut buf = BytesMut::from("?what\r\n");
        assert!(RespParser::parse(&mut buf).is_err());
    }

    #[test]
    fn test_encode_command() {
        let mut buf = BytesMut::new();
        RespEncoder::encode_command(&mut buf, &[Bytes::from("GET"), Bytes::from("k")]);
        assert_eq!(&buf[..], b"*2\r\n$3\r\nGET\r\n$1\r\nk\r\n");
    }

    #[test]
    fn test_encode_frames() {
        assert_eq!(RespEncoder::encode(&RespValue::ok()), Bytes::from("+OK\r\n"));
        assert_eq!(RespEncoder::encode(&RespValue::Null), Bytes::from("$-1\r\n"));
        assert_eq!(
            RespEncoder::encode(&RespValue::Array(vec![RespValue::Integer(7)])),
            Bytes::from("*1\r\n:7\r\n")
        );
    }
}
