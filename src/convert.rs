//! Value coercion
//!
//! Raw replies come back as byte strings, integers or arrays. This module
//! turns them into the types callers ask for and turns caller values into
//! the bytes that go on the wire.
//!
//! Numbers are read once into a [`Number`] and then narrowed to the target
//! type. Narrowing follows JVM rules so values written by other clients read
//! back the same way: integer to narrower integer wraps (two's complement),
//! float to integer truncates toward zero and saturates at the 32-bit range
//! before any further wrap, integer to float rounds to nearest.

use crate::error::{Error, Result};
use crate::protocol::{format_float, RespError, RespValue};
use bytes::Bytes;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::str::FromStr;

/// A number read from the store, before narrowing
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// Parse the decimal text of a value
    ///
    /// Integers stay exact; anything else that parses as a float (including
    /// `inf` and exponents) becomes `Float`.
    pub fn parse(raw: &[u8]) -> Result<Number> {
        let text = std::str::from_utf8(raw)
            .map_err(|_| Error::NotANumber(String::from_utf8_lossy(raw).into_owned()))?
            .trim();

        if let Ok(i) = text.parse::<i64>() {
            return Ok(Number::Int(i));
        }
        text.parse::<f64>()
            .map(Number::Float)
            .map_err(|_| Error::NotANumber(text.to_string()))
    }

    pub fn narrow<T: Narrow>(self) -> T {
        T::narrow(self)
    }
}

/// Numeric types a [`Number`] can be narrowed to
pub trait Narrow: Sized {
    fn narrow(n: Number) -> Self;
}

macro_rules! narrow_wide_integer {
    ($($t:ty),*) => {
        $(
            impl Narrow for $t {
                fn narrow(n: Number) -> Self {
                    match n {
                        Number::Int(i) => i as $t,
                        Number::Float(f) => f as $t,
                    }
                }
            }
        )*
    };
}

macro_rules! narrow_small_integer {
    ($($t:ty),*) => {
        $(
            impl Narrow for $t {
                fn narrow(n: Number) -> Self {
                    match n {
                        Number::Int(i) => i as $t,
                        Number::Float(f) => (f as i32) as $t,
                    }
                }
            }
        )*
    };
}

narrow_wide_integer!(i32, i64);
narrow_small_integer!(i8, i16);

impl Narrow for f64 {
    fn narrow(n: Number) -> Self {
        match n {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }
}

impl Narrow for f32 {
    fn narrow(n: Number) -> Self {
        match n {
            Number::Int(i) => i as f32,
            Number::Float(f) => f as f32,
        }
    }
}

impl Narrow for Decimal {
    fn narrow(n: Number) -> Self {
        match n {
            Number::Int(i) => Decimal::from(i),
            Number::Float(f) if f.is_nan() => Decimal::ZERO,
            Number::Float(f) => Decimal::from_str(&f.to_string())
                .ok()
                .or_else(|| Decimal::from_f64_retain(f))
                .unwrap_or(if f > 0.0 { Decimal::MAX } else { Decimal::MIN }),
        }
    }
}

/// Types a raw value can be decoded into
pub trait Decode: Sized {
    fn decode(raw: Bytes) -> Result<Self>;
}

impl Decode for Bytes {
    fn decode(raw: Bytes) -> Result<Self> {
        Ok(raw)
    }
}

impl Decode for Vec<u8> {
    fn decode(raw: Bytes) -> Result<Self> {
        Ok(raw.to_vec())
    }
}

impl Decode for String {
    fn decode(raw: Bytes) -> Result<Self> {
        String::from_utf8(raw.to_vec()).map_err(|_| Error::Protocol(RespError::InvalidUtf8))
    }
}

impl Decode for bool {
    fn decode(raw: Bytes) -> Result<Self> {
        match &raw[..] {
            b"1" | b"true" => Ok(true),
            b"0" | b"false" | b"" => Ok(false),
            other => Err(Error::UnexpectedReply(format!(
                "not a boolean: {:?}",
                String::from_utf8_lossy(other)
            ))),
        }
    }
}

macro_rules! decode_number {
    ($($t:ty),*) => {
        $(
            impl Decode for $t {
                fn decode(raw: Bytes) -> Result<Self> {
                    Number::parse(&raw).map(Number::narrow)
                }
            }
        )*
    };
}

decode_number!(i8, i16, i32, i64, f32, f64);

impl Decode for Decimal {
    /// Parsed from the text itself, so `0.1` stays exactly `0.1`
    fn decode(raw: Bytes) -> Result<Self> {
        let text = std::str::from_utf8(&raw)
            .map_err(|_| Error::NotANumber(String::from_utf8_lossy(&raw).into_owned()))?
            .trim();
        Decimal::from_str(text)
            .or_else(|_| Decimal::from_scientific(text))
            .map_err(|_| Error::NotANumber(text.to_string()))
    }
}

/// An object stored as JSON
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: DeserializeOwned> Decode for Json<T> {
    fn decode(raw: Bytes) -> Result<Self> {
        Ok(Json(serde_json::from_slice(&raw)?))
    }
}

/// Types that can be written as a value
pub trait Encode {
    fn encode(&self) -> Result<Bytes>;
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode(&self) -> Result<Bytes> {
        (**self).encode()
    }
}

impl Encode for str {
    fn encode(&self) -> Result<Bytes> {
        Ok(Bytes::copy_from_slice(self.as_bytes()))
    }
}

impl Encode for String {
    fn encode(&self) -> Result<Bytes> {
        Ok(Bytes::copy_from_slice(self.as_bytes()))
    }
}

impl Encode for [u8] {
    fn encode(&self) -> Result<Bytes> {
        Ok(Bytes::copy_from_slice(self))
    }
}

impl Encode for Vec<u8> {
    fn encode(&self) -> Result<Bytes> {
        Ok(Bytes::copy_from_slice(self))
    }
}

impl Encode for Bytes {
    fn encode(&self) -> Result<Bytes> {
        Ok(self.clone())
    }
}

impl Encode for bool {
    fn encode(&self) -> Result<Bytes> {
        Ok(Bytes::from_static(if *self { b"true" } else { b"false" }))
    }
}

macro_rules! encode_integer {
    ($($t:ty),*) => {
        $(
            impl Encode for $t {
                fn encode(&self) -> Result<Bytes> {
                    Ok(Bytes::from(self.to_string()))
                }
            }
        )*
    };
}

encode_integer!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

impl Encode for f64 {
    fn encode(&self) -> Result<Bytes> {
        Ok(Bytes::from(format_float(*self)))
    }
}

impl Encode for f32 {
    fn encode(&self) -> Result<Bytes> {
        if self.is_infinite() {
            return Ok(Bytes::from(format_float(f64::from(*self))));
        }
        Ok(Bytes::from(self.to_string()))
    }
}

impl Encode for Decimal {
    fn encode(&self) -> Result<Bytes> {
        Ok(Bytes::from(self.to_string()))
    }
}

impl<T: Serialize> Encode for Json<T> {
    fn encode(&self) -> Result<Bytes> {
        Ok(Bytes::from(serde_json::to_vec(&self.0)?))
    }
}

/// Build a score of the form `value.DDDDD`
///
/// `decimal` is left-padded with zeros to five digits, so `(12, 7)` gives
/// `12.00007`. Used to break ties between members with the same integral
/// score.
pub fn compose_score(value: i64, decimal: u64) -> f64 {
    format!("{}.{:0>5}", value, decimal)
        .parse()
        .unwrap_or(value as f64)
}

/// Turn an error frame into `Error::Server`, pass anything else through
pub(crate) fn checked(reply: RespValue) -> Result<RespValue> {
    match reply {
        RespValue::Error(msg) => Err(Error::Server(msg)),
        other => Ok(other),
    }
}

/// Scalar reply to an optional value; null means absent
pub(crate) fn optional<T: Decode>(reply: RespValue) -> Result<Option<T>> {
    match checked(reply)? {
        RespValue::Null => Ok(None),
        other => {
            let kind = other.kind();
            match other.into_payload() {
                Some(raw) => T::decode(raw).map(Some),
                None => Err(Error::UnexpectedReply(format!("expected a value, got {}", kind))),
            }
        }
    }
}

/// Integer reply; null counts as zero
pub(crate) fn integer(reply: RespValue) -> Result<i64> {
    match checked(reply)? {
        RespValue::Integer(i) => Ok(i),
        RespValue::Null => Ok(0),
        RespValue::BulkString(raw) => Number::parse(&raw).map(Number::narrow),
        other => Err(Error::UnexpectedReply(format!("expected an integer, got {}", other.kind()))),
    }
}

/// Reply of a write that either happened or did not (SET NX, EXPIRE, ...)
pub(crate) fn status(reply: RespValue) -> Result<bool> {
    match checked(reply)? {
        RespValue::Null => Ok(false),
        RespValue::Integer(i) => Ok(i > 0),
        RespValue::SimpleString(_) | RespValue::BulkString(_) => Ok(true),
        other => Err(Error::UnexpectedReply(format!("expected a status, got {}", other.kind()))),
    }
}

fn elements(reply: RespValue) -> Result<Vec<RespValue>> {
    let reply = checked(reply)?;
    let kind = reply.kind();
    reply
        .into_elements()
        .ok_or_else(|| Error::UnexpectedReply(format!("expected an array, got {}", kind)))
}

/// Array reply to a list of values; null elements are skipped
pub(crate) fn values<T: Decode>(reply: RespValue) -> Result<Vec<T>> {
    let mut out = Vec::new();
    for item in elements(reply)? {
        if let Some(value) = optional(item)? {
            out.push(value);
        }
    }
    Ok(out)
}

/// Array reply to one optional value per element
pub(crate) fn optional_values<T: Decode>(reply: RespValue) -> Result<Vec<Option<T>>> {
    elements(reply)?.into_iter().map(optional).collect()
}

/// Flat `[member, score, member, score, ...]` reply
pub(crate) fn scored<T: Decode>(reply: RespValue) -> Result<Vec<(T, f64)>> {
    flat_pairs(reply)?
        .into_iter()
        .map(|(member, score)| Ok((T::decode(member)?, f64::decode(score)?)))
        .collect()
}

/// Flat `[field, value, field, value, ...]` reply
pub(crate) fn pairs<T: Decode>(reply: RespValue) -> Result<Vec<(String, T)>> {
    flat_pairs(reply)?
        .into_iter()
        .map(|(field, value)| Ok((String::decode(field)?, T::decode(value)?)))
        .collect()
}

fn flat_pairs(reply: RespValue) -> Result<Vec<(Bytes, Bytes)>> {
    let items = elements(reply)?;
    if items.len() % 2 != 0 {
        return Err(Error::UnexpectedReply(format!(
            "expected an even number of elements, got {}",
            items.len()
        )));
    }

    let mut out = Vec::with_capacity(items.len() / 2);
    let mut iter = items.into_iter();
    while let (Some(a), Some(b)) = (iter.next(), iter.next()) {
        match (a.into_payload(), b.into_payload()) {
            (Some(a), Some(b)) => out.push((a, b)),
            _ => return Err(Error::UnexpectedReply("null inside a pair reply".to_string())),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_number_parse() {
        assert_eq!(Number::parse(b"42").unwrap(), Number::Int(42));
        assert_eq!(Number::parse(b"-7").unwrap(), Number::Int(-7));
        assert_eq!(Number::parse(b"2.5").unwrap(), Number::Float(2.5));
        assert_eq!(Number::parse(b"1e3").unwrap(), Number::Float(1000.0));
        assert_eq!(Number::parse(b"inf").unwrap(), Number::Float(f64::INFINITY));
        assert!(matches!(Number::parse(b"abc"), Err(Error::NotANumber(_))));
        assert!(matches!(Number::parse(b""), Err(Error::NotANumber(_))));
    }

    #[test]
    fn test_integer_narrowing_wraps() {
        assert_eq!(Number::Int(300).narrow::<i8>(), 44);
        assert_eq!(Number::Int(-129).narrow::<i8>(), 127);
        assert_eq!(Number::Int(70_000).narrow::<i16>(), 4_464);
        assert_eq!(Number::Int(1 << 32).narrow::<i32>(), 0);
        assert_eq!(Number::Int(i64::MAX).narrow::<i64>(), i64::MAX);
    }

    #[test]
    fn test_float_narrowing_truncates() {
        assert_eq!(Number::Float(2.9).narrow::<i64>(), 2);
        assert_eq!(Number::Float(-2.9).narrow::<i32>(), -2);
        assert_eq!(Number::Float(1e20).narrow::<i32>(), i32::MAX);
        assert_eq!(Number::Float(1e20).narrow::<i64>(), i64::MAX);
        assert_eq!(Number::Float(f64::NAN).narrow::<i64>(), 0);
        // Through the 32-bit range first, then wrapped
        assert_eq!(Number::Float(300.7).narrow::<i8>(), 44);
        assert_eq!(Number::Float(1e20).narrow::<i8>(), -1);
    }

    #[test]
    fn test_float_targets() {
        assert_eq!(Number::Int(3).narrow::<f64>(), 3.0);
        assert_eq!(Number::Float(0.5).narrow::<f32>(), 0.5f32);
    }

    #[test]
    fn test_decimal_narrowing() {
        assert_eq!(Number::Int(12).narrow::<Decimal>(), Decimal::from(12));
        assert_eq!(Number::Float(1.25).narrow::<Decimal>(), Decimal::new(125, 2));
        assert_eq!(Number::Float(f64::NAN).narrow::<Decimal>(), Decimal::ZERO);
    }

    #[test]
    fn test_decimal_decode_is_exact() {
        let d = Decimal::decode(Bytes::from("0.1")).unwrap();
        assert_eq!(d, Decimal::new(1, 1));
        assert_eq!(Decimal::decode(Bytes::from("1.5e2")).unwrap(), Decimal::from(150));
        assert!(Decimal::decode(Bytes::from("x")).is_err());
    }

    #[test]
    fn test_decode_text_and_bool() {
        assert_eq!(String::decode(Bytes::from("héllo")).unwrap(), "héllo");
        assert!(String::decode(Bytes::from_static(&[0xff, 0xfe])).is_err());
        assert!(bool::decode(Bytes::from("true")).unwrap());
        assert!(!bool::decode(Bytes::from("0")).unwrap());
        assert!(bool::decode(Bytes::from("maybe")).is_err());
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct User {
        name: String,
        age: u32,
    }

    #[test]
    fn test_json_values() {
        let user = Json(User { name: "ann".to_string(), age: 31 });
        let raw = user.encode().unwrap();
        assert_eq!(&raw[..], br#"{"name":"ann","age":31}"#);
        let back: Json<User> = Json::decode(raw).unwrap();
        assert_eq!(back, user);
        assert!(matches!(Json::<User>::decode(Bytes::from("{")), Err(Error::Json(_))));
    }

    #[test]
    fn test_encode_numbers_as_text() {
        assert_eq!(42i64.encode().unwrap(), Bytes::from("42"));
        assert_eq!(1.5f64.encode().unwrap(), Bytes::from("1.5"));
        assert_eq!(Decimal::new(1050, 2).encode().unwrap(), Bytes::from("10.50"));
        assert_eq!("abc".encode().unwrap(), Bytes::from("abc"));
    }

    #[test]
    fn test_compose_score() {
        assert_eq!(compose_score(12, 7), 12.00007);
        assert_eq!(compose_score(3, 12345), 3.12345);
        assert_eq!(compose_score(0, 0), 0.0);
        assert_eq!(compose_score(-3, 5), -3.00005);
    }

    #[test]
    fn test_optional_reply() {
        assert_eq!(optional::<i64>(RespValue::Null).unwrap(), None);
        assert_eq!(optional::<i64>(RespValue::bulk_string("9")).unwrap(), Some(9));
        assert_eq!(optional::<String>(RespValue::integer(9)).unwrap(), Some("9".to_string()));
        assert!(matches!(
            optional::<String>(RespValue::error("WRONGTYPE nope")),
            Err(Error::Server(msg)) if msg.starts_with("WRONGTYPE")
        ));
    }

    #[test]
    fn test_array_replies() {
        let reply = RespValue::array(vec![
            RespValue::bulk_string("a"),
            RespValue::Null,
            RespValue::bulk_string("b"),
        ]);
        assert_eq!(values::<String>(reply.clone()).unwrap(), vec!["a", "b"]);
        assert_eq!(
            optional_values::<String>(reply).unwrap(),
            vec![Some("a".to_string()), None, Some("b".to_string())]
        );
        assert!(values::<String>(RespValue::Null).unwrap().is_empty());
    }

    #[test]
    fn test_scored_reply() {
        let reply = RespValue::array(vec![
            RespValue::bulk_string("m1"),
            RespValue::bulk_string("1.5"),
            RespValue::bulk_string("m2"),
            RespValue::bulk_string("2"),
        ]);
        let members: Vec<(String, f64)> = scored(reply).unwrap();
        assert_eq!(members, vec![("m1".to_string(), 1.5), ("m2".to_string(), 2.0)]);

        let odd = RespValue::array(vec![RespValue::bulk_string("m1")]);
        assert!(scored::<String>(odd).is_err());
    }

    #[test]
    fn test_status_and_integer() {
        assert!(status(RespValue::ok()).unwrap());
        assert!(!status(RespValue::Null).unwrap());
        assert!(!status(RespValue::integer(0)).unwrap());
        assert_eq!(integer(RespValue::integer(5)).unwrap(), 5);
        assert_eq!(integer(RespValue::Null).unwrap(), 0);
    }
}
