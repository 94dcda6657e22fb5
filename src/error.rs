// CLASSIFICATION: COMMUNITY
// Filename: error.rs v0.3
// Author: Lukas Bower
// Date Modified: 2027-07-28

//! Lookup failure taxonomy shared by every boundary operation.

use thiserror::Error;

use crate::buffer::BufferError;

/// Reasons a lookup yields no record.
///
/// The taxonomy matters to callers: rejected and unverified outcomes are
/// permanent for this call, while [`LookupError::InsufficientBuffer`] is
/// transient and invites a retry with a larger allocation.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LookupError {
    /// The numeric identity lies outside the managed range.
    #[error("identity {0} is outside the managed range")]
    OutsideManagedRange(u32),
    /// The supplied name is not a canonical decimal identity.
    #[error("name is not a canonical numeric identity")]
    NotNumeric,
    /// Root plus canonical name would overflow the path buffer.
    #[error("derived home path reaches the {limit}-byte bound")]
    PathTooLong {
        /// Capacity of the call-local path buffer, including the terminator.
        limit: usize,
    },
    /// The home path is missing or could not be inspected.
    #[error("home path missing or uninspectable")]
    HomeMissing,
    /// The home path exists but is not owned by the identity it names.
    #[error("home owned by {uid}:{gid}, expected {expected}:{expected}")]
    OwnershipMismatch {
        /// Identity the path is named after.
        expected: u32,
        /// Owning user observed on disk.
        uid: u32,
        /// Owning group observed on disk.
        gid: u32,
    },
    /// The caller's buffer cannot hold the assembled record.
    #[error("output buffer too small, at least {needed} more bytes required")]
    InsufficientBuffer {
        /// Bytes the failing write would have needed.
        needed: usize,
    },
    /// The requested address family is not serviced.
    #[error("address family is not serviced")]
    UnsupportedFamily,
    /// The host name does not carry the managed suffix.
    #[error("name does not end in the managed host suffix")]
    WrongSuffix,
    /// The active profile does not service credential records.
    #[error("credential records are not serviced by this profile")]
    ShadowNotServiced,
}

impl LookupError {
    /// True for outcomes a caller can clear by retrying with more space.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, LookupError::InsufficientBuffer { .. })
    }
}

impl From<BufferError> for LookupError {
    fn from(err: BufferError) -> Self {
        match err {
            BufferError::Exhausted { needed, .. } => LookupError::InsufficientBuffer { needed },
            // Canonical names and fixed markers are NUL-free; a NUL can only
            // arrive in a non-canonical caller string.
            BufferError::InteriorNul => LookupError::NotNumeric,
        }
    }
}
