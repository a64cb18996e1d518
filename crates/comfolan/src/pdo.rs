// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! PDO value codec and subscription registry.
//!
//! Process Data Objects are periodic sensor samples keyed by PDID. The
//! bridge streams raw little-endian values; the declared type tag of the
//! subscription decides how they decode. Dispatch to consumers happens
//! synchronously on the reader task, so consumers must not block — anything
//! that needs to await work should enqueue to its own channel.

use crate::error::DecodeError;
use crate::util::FirmwareVersion;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Elementary PDO value types, numbered per the ComfoNet schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PdoType {
    Bool = 0x00,
    UInt8 = 0x01,
    UInt16 = 0x02,
    UInt32 = 0x03,
    Int8 = 0x05,
    Int16 = 0x06,
    Int64 = 0x08,
    String = 0x09,
    Time = 0x10,
    Version = 0x11,
}

impl PdoType {
    /// Look up a type by its wire tag.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x00 => Some(Self::Bool),
            0x01 => Some(Self::UInt8),
            0x02 => Some(Self::UInt16),
            0x03 => Some(Self::UInt32),
            0x05 => Some(Self::Int8),
            0x06 => Some(Self::Int16),
            0x08 => Some(Self::Int64),
            0x09 => Some(Self::String),
            0x10 => Some(Self::Time),
            0x11 => Some(Self::Version),
            _ => None,
        }
    }

    /// The wire tag.
    pub fn tag(self) -> u8 {
        self as u8
    }
}

/// A decoded PDO or RMI property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PdoValue {
    Bool(bool),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    Int8(i8),
    Int16(i16),
    Int64(i64),
    String(String),
    /// Seconds since the ComfoNet epoch (2000-01-01 00:00 UTC).
    Time(u32),
    Version(FirmwareVersion),
}

impl PdoValue {
    /// The raw value as i64, when the value is numeric.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Bool(v) => Some(i64::from(*v)),
            Self::UInt8(v) => Some(i64::from(*v)),
            Self::UInt16(v) => Some(i64::from(*v)),
            Self::UInt32(v) => Some(i64::from(*v)),
            Self::Int8(v) => Some(i64::from(*v)),
            Self::Int16(v) => Some(i64::from(*v)),
            Self::Int64(v) => Some(*v),
            Self::Time(v) => Some(i64::from(*v)),
            Self::String(_) | Self::Version(_) => None,
        }
    }
}

impl fmt::Display for PdoValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{}", v),
            Self::UInt8(v) => write!(f, "{}", v),
            Self::UInt16(v) => write!(f, "{}", v),
            Self::UInt32(v) => write!(f, "{}", v),
            Self::Int8(v) => write!(f, "{}", v),
            Self::Int16(v) => write!(f, "{}", v),
            Self::Int64(v) => write!(f, "{}", v),
            Self::String(v) => write!(f, "{}", v),
            Self::Time(v) => write!(f, "{}", v),
            Self::Version(v) => write!(f, "{}", v),
        }
    }
}

fn expect_len(data: &[u8], expected: usize) -> Result<(), DecodeError> {
    if data.len() != expected {
        return Err(DecodeError::Truncated {
            expected,
            got: data.len(),
        });
    }
    Ok(())
}

/// Decode a raw value per its declared type. Values are little-endian,
/// signed where the type says signed; STRING is NUL-terminated UTF-8.
pub fn decode_value(pdo_type: PdoType, data: &[u8]) -> Result<PdoValue, DecodeError> {
    match pdo_type {
        PdoType::Bool => {
            expect_len(data, 1)?;
            Ok(PdoValue::Bool(data[0] == 1))
        }
        PdoType::UInt8 => {
            expect_len(data, 1)?;
            Ok(PdoValue::UInt8(data[0]))
        }
        PdoType::UInt16 => {
            expect_len(data, 2)?;
            Ok(PdoValue::UInt16(u16::from_le_bytes([data[0], data[1]])))
        }
        PdoType::UInt32 => {
            expect_len(data, 4)?;
            Ok(PdoValue::UInt32(u32::from_le_bytes([
                data[0], data[1], data[2], data[3],
            ])))
        }
        PdoType::Int8 => {
            expect_len(data, 1)?;
            Ok(PdoValue::Int8(data[0] as i8))
        }
        PdoType::Int16 => {
            expect_len(data, 2)?;
            Ok(PdoValue::Int16(i16::from_le_bytes([data[0], data[1]])))
        }
        PdoType::Int64 => {
            expect_len(data, 8)?;
            let mut buf = [0u8; 8];
            buf.copy_from_slice(data);
            Ok(PdoValue::Int64(i64::from_le_bytes(buf)))
        }
        PdoType::String => {
            let trimmed = match data.iter().position(|&b| b == 0) {
                Some(pos) => &data[..pos],
                None => data,
            };
            let s = std::str::from_utf8(trimmed).map_err(|_| DecodeError::InvalidString)?;
            Ok(PdoValue::String(s.to_string()))
        }
        PdoType::Time => {
            expect_len(data, 4)?;
            Ok(PdoValue::Time(u32::from_le_bytes([
                data[0], data[1], data[2], data[3],
            ])))
        }
        PdoType::Version => {
            expect_len(data, 4)?;
            let word = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
            Ok(PdoValue::Version(FirmwareVersion::from_word(word)))
        }
    }
}

/// Encode a numeric value to its raw little-endian form for property
/// writes. STRING, TIME and VERSION properties are not writable.
pub fn encode_value(pdo_type: PdoType, value: i64) -> Result<Vec<u8>, DecodeError> {
    match pdo_type {
        PdoType::Bool => Ok(vec![u8::from(value != 0)]),
        PdoType::UInt8 => Ok(vec![value as u8]),
        PdoType::Int8 => Ok(vec![(value as i8) as u8]),
        PdoType::UInt16 => Ok((value as u16).to_le_bytes().to_vec()),
        PdoType::Int16 => Ok((value as i16).to_le_bytes().to_vec()),
        PdoType::UInt32 => Ok((value as u32).to_le_bytes().to_vec()),
        PdoType::Int64 => Ok(value.to_le_bytes().to_vec()),
        PdoType::String | PdoType::Time | PdoType::Version => {
            Err(DecodeError::UnknownType(pdo_type.tag()))
        }
    }
}

// ---------------------------------------------------------------------------
// Subscription registry
// ---------------------------------------------------------------------------

/// Consumer callback invoked with (pdid, decoded value). Runs on the reader
/// task with no lock held; must not block.
pub type Consumer = Arc<dyn Fn(u32, PdoValue) + Send + Sync>;

/// Descriptor of an installed subscription (for re-install on reconnect).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    pub pdid: u32,
    pub pdo_type: PdoType,
    pub dedup: bool,
}

struct Entry {
    pdo_type: PdoType,
    dedup: bool,
    last: Option<PdoValue>,
    consumer: Consumer,
}

/// The set of currently-subscribed PDIDs with their consumers.
#[derive(Default)]
pub struct PdoRegistry {
    entries: Mutex<HashMap<u32, Entry>>,
}

impl PdoRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or replace the subscription for a PDID.
    pub fn insert(&self, pdid: u32, pdo_type: PdoType, dedup: bool, consumer: Consumer) {
        let mut entries = self.entries.lock().expect("pdo registry poisoned");
        entries.insert(
            pdid,
            Entry {
                pdo_type,
                dedup,
                last: None,
                consumer,
            },
        );
    }

    /// Remove a subscription. Returns whether one existed.
    pub fn remove(&self, pdid: u32) -> bool {
        let mut entries = self.entries.lock().expect("pdo registry poisoned");
        entries.remove(&pdid).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("pdo registry poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of installed subscriptions, for re-install after reconnect.
    pub fn snapshot(&self) -> Vec<Subscription> {
        let entries = self.entries.lock().expect("pdo registry poisoned");
        let mut subs: Vec<Subscription> = entries
            .iter()
            .map(|(&pdid, e)| Subscription {
                pdid,
                pdo_type: e.pdo_type,
                dedup: e.dedup,
            })
            .collect();
        subs.sort_by_key(|s| s.pdid);
        subs
    }

    /// Decode and deliver one notification.
    ///
    /// Deduplication (when enabled) suppresses a value equal to the last
    /// dispatched one. The consumer runs after the registry lock is
    /// released.
    pub fn dispatch(&self, pdid: u32, data: &[u8]) -> Result<(), DecodeError> {
        let (consumer, value) = {
            let mut entries = self.entries.lock().expect("pdo registry poisoned");
            let entry = entries.get_mut(&pdid).ok_or(DecodeError::UnknownPdid(pdid))?;

            let value = decode_value(entry.pdo_type, data)?;
            if entry.dedup && entry.last.as_ref() == Some(&value) {
                return Ok(());
            }
            entry.last = Some(value.clone());
            (Arc::clone(&entry.consumer), value)
        };

        consumer(pdid, value);
        Ok(())
    }
}
