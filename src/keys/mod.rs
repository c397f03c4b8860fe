#![forbid(unsafe_code)]

//! Key derivation for line-oriented input.
//!
//! Records are newline-terminated byte strings; each one is hashed into a
//! `u64` ordering key with Bob Jenkins' one-at-a-time function.

use std::io::BufRead;

use tracing::{trace, warn};

use crate::types::Result;

/// Record separator.
pub const RECORD_SEPARATOR: u8 = b'\n';

/// One-at-a-time hash over `bytes`, computed in wrapping 64-bit arithmetic.
///
/// Each byte is sign-extended before it is mixed in and hashing stops at
/// the first NUL, so keys match those produced by C code hashing a
/// NUL-terminated `char` buffer on an LP64 target.
pub fn jenkins_one_at_a_time(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0;
    for &byte in bytes.iter().take_while(|b| **b != 0) {
        hash = hash.wrapping_add(byte as i8 as u64);
        hash = hash.wrapping_add(hash << 10);
        hash ^= hash >> 6;
    }
    hash = hash.wrapping_add(hash << 3);
    hash ^= hash >> 11;
    hash.wrapping_add(hash << 15)
}

/// A newline-terminated record with the separator stripped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    /// Raw record bytes.
    pub bytes: Vec<u8>,
}

impl Record {
    /// Ordering key for this record.
    pub fn key(&self) -> u64 {
        jenkins_one_at_a_time(&self.bytes)
    }

    /// Record text, with invalid UTF-8 replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Splits a byte stream into newline-terminated [`Record`]s.
///
/// Bytes after the last newline do not form a record. Their count is kept
/// in [`trailing_fragment`](Self::trailing_fragment).
pub struct RecordReader<R> {
    inner: R,
    buf: Vec<u8>,
    records: u64,
    trailing: usize,
    done: bool,
}

impl<R: BufRead> RecordReader<R> {
    /// Wraps a buffered reader.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::new(),
            records: 0,
            trailing: 0,
            done: false,
        }
    }

    /// Records yielded so far.
    pub fn records_read(&self) -> u64 {
        self.records
    }

    /// Length of the unterminated tail seen at end of input, 0 if none.
    pub fn trailing_fragment(&self) -> usize {
        self.trailing
    }

    /// Reads the next record, or `None` at end of input.
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        if self.done {
            return Ok(None);
        }
        self.buf.clear();
        let read = self.inner.read_until(RECORD_SEPARATOR, &mut self.buf)?;
        if read == 0 {
            self.done = true;
            return Ok(None);
        }
        if self.buf.last() != Some(&RECORD_SEPARATOR) {
            self.done = true;
            self.trailing = self.buf.len();
            warn!(
                bytes = self.trailing,
                "keys.trailing_fragment_ignored"
            );
            return Ok(None);
        }
        self.buf.pop();
        self.records += 1;
        trace!(len = self.buf.len(), "keys.record");
        Ok(Some(Record {
            bytes: self.buf.clone(),
        }))
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}
