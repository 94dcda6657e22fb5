// CLASSIFICATION: COMMUNITY
// Filename: ident.rs v0.3
// Author: Lukas Bower
// Date Modified: 2027-08-04

//! Codec between numeric identities, canonical names, and home paths.
//!
//! The numeric-only parse is a security property, not a convenience: because
//! a name must parse fully as a non-negative decimal, path separators and
//! parent-directory sequences can never reach the derived path.

use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use crate::error::LookupError;

/// Lowest numeric identity this subsystem manages; everything below belongs
/// to a different, non-managed namespace.
pub const MIN_IDENTITY: u32 = 30_000;

/// Capacity of the call-local path buffer, terminator included.
pub const PATH_CAPACITY: usize = 1024;

const MAX_DIGITS: usize = 10; // u32::MAX is 4294967295

/// Strict full-string parse of a non-negative decimal identity.
///
/// Empty input, any non-digit byte (including a sign), and overflow past
/// `u32` all yield `None`.
#[must_use]
pub fn parse_identity(name: &str) -> Option<u32> {
    parse_decimal(name.as_bytes())
}

pub(crate) fn parse_decimal(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() {
        return None;
    }
    let mut value: u32 = 0;
    for &b in bytes {
        if !b.is_ascii_digit() {
            return None;
        }
        value = value
            .checked_mul(10)?
            .checked_add(u32::from(b - b'0'))?;
    }
    Some(value)
}

/// Canonical decimal text of an identity in a stack buffer.
///
/// No leading zeros, no sign, no heap.
#[derive(Debug, Clone, Copy)]
pub struct CanonicalName {
    buf: [u8; MAX_DIGITS],
    len: usize,
}

impl CanonicalName {
    /// Render an identity in canonical decimal form.
    #[must_use]
    pub fn render(identity: u32) -> Self {
        let mut buf = [0u8; MAX_DIGITS];
        let mut value = identity;
        let mut pos = MAX_DIGITS;
        loop {
            pos -= 1;
            buf[pos] = b'0' + (value % 10) as u8;
            value /= 10;
            if value == 0 {
                break;
            }
        }
        let len = MAX_DIGITS - pos;
        buf.copy_within(pos.., 0);
        Self { buf, len }
    }

    /// Digits of the canonical name.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

/// Call-local home path buffer: root concatenated with the canonical name.
///
/// Never static, never shared; every lookup assembles its own copy so
/// concurrent calls cannot alias.
#[derive(Debug, Clone, Copy)]
pub struct HomePath {
    buf: [u8; PATH_CAPACITY],
    len: usize,
}

impl HomePath {
    /// Concatenate `root` and `name`, bounding the combined length before
    /// any byte is copied. A path that reaches the capacity, terminator
    /// included, is rejected.
    pub fn assemble(root: &str, name: &[u8]) -> Result<Self, LookupError> {
        let root = root.as_bytes();
        if root.len() + name.len() + 1 >= PATH_CAPACITY {
            return Err(LookupError::PathTooLong {
                limit: PATH_CAPACITY,
            });
        }
        let mut buf = [0u8; PATH_CAPACITY];
        buf[..root.len()].copy_from_slice(root);
        buf[root.len()..root.len() + name.len()].copy_from_slice(name);
        Ok(Self {
            buf,
            len: root.len() + name.len(),
        })
    }

    /// Path bytes without the terminator.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Borrow the path for filesystem inspection.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        Path::new(OsStr::from_bytes(self.as_bytes()))
    }
}
