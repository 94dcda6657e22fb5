// CLASSIFICATION: COMMUNITY
// Filename: buffer.rs v0.4
// Author: Lukas Bower
// Date Modified: 2027-08-02

//! Allocation-free field packing into a caller-owned buffer.
//!
//! Every variable-length field of a resolved record lives inside the byte
//! slice the caller hands in. [`FieldWriter`] owns the unwritten tail of that
//! slice and carves immutable fields off its front, so each field borrow is
//! disjoint from the writer and from every other field. No heap, no copies
//! out, no partial-write state: a failed append leaves the buffer and the
//! cursor untouched.

use std::ffi::{c_char, CStr};
use std::mem;

use thiserror::Error;

/// Size of one entry in a reserved pointer table.
pub const PTR_SLOT: usize = mem::size_of::<*mut c_char>();

/// Errors raised while appending fields.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// The remaining capacity cannot hold the requested field.
    #[error("field of {needed} bytes exceeds remaining capacity {available}")]
    Exhausted {
        /// Bytes the field would occupy, terminator and padding included.
        needed: usize,
        /// Bytes left in the buffer when the append was attempted.
        available: usize,
    },
    /// The source bytes contain an interior NUL and cannot form a C string.
    #[error("field contains an interior NUL byte")]
    InteriorNul,
}

/// Cursor over the unwritten tail of the caller's buffer.
pub struct FieldWriter<'a> {
    buf: &'a mut [u8],
}

impl<'a> FieldWriter<'a> {
    /// Wrap the caller's output buffer.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf }
    }

    /// Bytes still available for fields.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    fn take(&mut self) -> &'a mut [u8] {
        mem::take(&mut self.buf)
    }

    /// Append `bytes` plus a terminating NUL and return the field as a C
    /// string borrowing the buffer.
    ///
    /// A source of length `L` needs exactly `L + 1` bytes; with less than
    /// that the append fails without mutating anything. Capacities of 0 and 1
    /// take the same failure path.
    pub fn write_cstr(&mut self, bytes: &[u8]) -> Result<&'a CStr, BufferError> {
        // Checked before anything moves: a failed append must leave the
        // buffer and the cursor untouched.
        if bytes.contains(&0) {
            return Err(BufferError::InteriorNul);
        }
        let available = self.buf.len();
        // `len >= available` is `len + 1 > available` without the overflow.
        if bytes.len() >= available {
            return Err(BufferError::Exhausted {
                needed: bytes.len() + 1,
                available,
            });
        }
        let (field, rest) = self.take().split_at_mut(bytes.len() + 1);
        field[..bytes.len()].copy_from_slice(bytes);
        field[bytes.len()] = 0;
        self.buf = rest;
        // Interior NULs were rejected up front, so this cannot fail.
        CStr::from_bytes_with_nul(field).map_err(|_| BufferError::InteriorNul)
    }

    /// Append raw bytes with no terminator, returning the written field.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<&'a [u8], BufferError> {
        let available = self.buf.len();
        if bytes.len() > available {
            return Err(BufferError::Exhausted {
                needed: bytes.len(),
                available,
            });
        }
        let (field, rest) = self.take().split_at_mut(bytes.len());
        field.copy_from_slice(bytes);
        self.buf = rest;
        Ok(field)
    }

    /// Reserve a zeroed, pointer-aligned table of `entries` pointer slots.
    ///
    /// The chunk is handed back for the ABI layer to populate; zeroed slots
    /// double as NULL terminator entries. Alignment padding counts against
    /// capacity and is verified before any byte moves.
    pub fn reserve_ptr_table(&mut self, entries: usize) -> Result<&'a mut [u8], BufferError> {
        let align = mem::align_of::<*mut c_char>();
        let addr = self.buf.as_ptr() as usize;
        let pad = addr.wrapping_neg() % align;
        let needed = pad + entries * PTR_SLOT;
        let available = self.buf.len();
        if needed > available {
            return Err(BufferError::Exhausted { needed, available });
        }
        let (_pad, rest) = self.take().split_at_mut(pad);
        let (table, rest) = rest.split_at_mut(entries * PTR_SLOT);
        table.fill(0);
        self.buf = rest;
        Ok(table)
    }
}
