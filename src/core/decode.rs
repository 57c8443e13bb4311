//! Decoder for the binary `strings` and `profile` blobs served by the
//! engine's profiling endpoint.
//!
//! Both blobs are little-endian. The string table maps ids to names:
//!
//! ```text
//! u32 header | u32 count | count * (u32 id, u16 len, len bytes)
//! ```
//!
//! The profile references those ids:
//!
//! ```text
//! u32 frame | u32 sample_count | sample_count * 20-byte samples
//!           | u32 scope_count  | scope_count * (u32 name, u32 elapsed, u32 count)
//!           | u32 counter_count | counter_count * (u32 name, u32 value)
//! ```
//!
//! A sample is `u32 name, u32 scope, u32 start, u32 elapsed, u16 thread` plus
//! two bytes of padding. Times are ticks of 1/1000 ms.

use crate::utils::error::{FetchError, Result};
use serde::Serialize;
use std::collections::HashMap;

pub const TICKS_PER_MS: f64 = 1000.0;
const SAMPLE_SIZE: usize = 20;

struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn take(&mut self, len: usize, field: &str) -> Result<&'a [u8]> {
        let end = self.offset.checked_add(len).filter(|end| *end <= self.data.len());
        match end {
            Some(end) => {
                let bytes = &self.data[self.offset..end];
                self.offset = end;
                Ok(bytes)
            }
            None => Err(FetchError::DecodeError {
                message: format!(
                    "truncated input reading {} at offset {} (need {} bytes, {} available)",
                    field,
                    self.offset,
                    len,
                    self.data.len().saturating_sub(self.offset)
                ),
            }),
        }
    }

    fn u32(&mut self, field: &str) -> Result<u32> {
        let bytes = self.take(4, field)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn u16(&mut self, field: &str) -> Result<u16> {
        let bytes = self.take(2, field)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Rejects counts that cannot possibly fit in the remaining input, so a
    /// corrupt header does not trigger a huge allocation.
    fn count(&mut self, field: &str, record_size: usize) -> Result<usize> {
        let count = self.u32(field)? as usize;
        let remaining = self.data.len() - self.offset;
        if count.saturating_mul(record_size) > remaining {
            return Err(FetchError::DecodeError {
                message: format!(
                    "{} of {} needs {} bytes but only {} remain",
                    field,
                    count,
                    count.saturating_mul(record_size),
                    remaining
                ),
            });
        }
        Ok(count)
    }
}

#[derive(Debug, Clone, Default)]
pub struct StringTable {
    pub header: u32,
    entries: HashMap<u32, String>,
}

impl StringTable {
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(data);
        let header = reader.u32("strings header")?;
        let count = reader.count("string count", 6)?;

        let mut entries = HashMap::with_capacity(count);
        for _ in 0..count {
            let id = reader.u32("string id")?;
            let len = reader.u16("string length")? as usize;
            let bytes = reader.take(len, "string bytes")?;
            entries.insert(id, String::from_utf8_lossy(bytes).into_owned());
        }

        Ok(Self { header, entries })
    }

    pub fn get(&self, id: u32) -> Option<&str> {
        self.entries.get(&id).map(String::as_str)
    }

    pub fn name(&self, id: u32) -> String {
        match self.get(id) {
            Some(name) => name.to_string(),
            None => format!("<unknown:{}>", id),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub name: String,
    pub scope: String,
    pub start_ms: f64,
    pub elapsed_ms: f64,
    pub thread_id: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopeStat {
    pub name: String,
    pub elapsed_ms: f64,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Counter {
    pub name: String,
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileData {
    pub frame: u32,
    pub samples: Vec<Sample>,
    pub frame_time_ms: f64,
    pub scopes: Vec<ScopeStat>,
    pub counters: Vec<Counter>,
}

impl ProfileData {
    pub fn decode(data: &[u8], strings: &StringTable) -> Result<Self> {
        let mut reader = Reader::new(data);
        let frame = reader.u32("frame number")?;

        let sample_count = reader.count("sample count", SAMPLE_SIZE)?;
        let mut samples = Vec::with_capacity(sample_count);
        let mut frame_time_ms: f64 = 0.0;
        for _ in 0..sample_count {
            let name_id = reader.u32("sample name")?;
            let scope_id = reader.u32("sample scope")?;
            let start = reader.u32("sample start")?;
            let elapsed = reader.u32("sample elapsed")?;
            let thread_id = reader.u16("sample thread")?;
            reader.take(2, "sample padding")?;

            let scope = strings.name(scope_id);
            let elapsed_ms = elapsed as f64 / TICKS_PER_MS;
            frame_time_ms = frame_time_ms.max(elapsed_ms);

            samples.push(Sample {
                name: format!("{}.{}", scope, strings.name(name_id)),
                scope,
                start_ms: start as f64 / TICKS_PER_MS,
                elapsed_ms,
                thread_id,
            });
        }

        let scope_count = reader.count("scope count", 12)?;
        let mut scopes = Vec::with_capacity(scope_count);
        for _ in 0..scope_count {
            let name_id = reader.u32("scope name")?;
            let elapsed = reader.u32("scope elapsed")?;
            let count = reader.u32("scope call count")?;
            scopes.push(ScopeStat {
                name: strings.name(name_id),
                elapsed_ms: elapsed as f64 / TICKS_PER_MS,
                count,
            });
        }

        let counter_count = reader.count("counter count", 8)?;
        let mut counters = Vec::with_capacity(counter_count);
        for _ in 0..counter_count {
            let name_id = reader.u32("counter name")?;
            let value = reader.u32("counter value")?;
            counters.push(Counter {
                name: strings.name(name_id),
                value,
            });
        }

        Ok(Self {
            frame,
            samples,
            frame_time_ms,
            scopes,
            counters,
        })
    }
}
