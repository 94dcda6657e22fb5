// CLASSIFICATION: COMMUNITY
// Filename: gate.rs v0.3
// Author: Lukas Bower
// Date Modified: 2027-08-11

//! Ownership gate: the sole trust boundary of the resolver.
//!
//! A numeric identity is legitimate if and only if the path derived from it
//! exists and is owned, at both user and group granularity, by that same
//! numeric value. The gate assumes entries under the authority root cannot
//! be created or re-owned by unprivileged actors; that guarantee is an
//! external precondition.

use std::fs;
use std::io;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

use log::debug;

use crate::error::LookupError;

/// Owning user and group of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathOwner {
    /// Owning user id.
    pub uid: u32,
    /// Owning group id.
    pub gid: u32,
}

/// Source of ownership metadata for a path.
///
/// Production code stats the real filesystem; tests substitute their own
/// implementation to model missing, mismatched, or racing state.
pub trait OwnershipSource {
    /// Fetch the owner of `path` with a single metadata query.
    fn owner(&self, path: &Path) -> io::Result<PathOwner>;
}

/// [`OwnershipSource`] backed by `stat` via `std::fs::metadata`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsMetadata;

impl OwnershipSource for FsMetadata {
    fn owner(&self, path: &Path) -> io::Result<PathOwner> {
        let meta = fs::metadata(path)?;
        Ok(PathOwner {
            uid: meta.uid(),
            gid: meta.gid(),
        })
    }
}

/// Reject identities outside the managed range.
///
/// Runs before any path is derived or inspected, so sub-threshold lookups
/// never touch the filesystem.
pub fn require_managed(identity: u32, min_identity: u32) -> Result<(), LookupError> {
    if identity < min_identity {
        return Err(LookupError::OutsideManagedRange(identity));
    }
    Ok(())
}

/// Verify that `home` exists and is owned `identity:identity`.
///
/// A missing or uninspectable path is unverified rather than rejected; the
/// distinction keeps retry semantics honest upstream, since external state
/// may later provision the entry.
pub fn verify_home<S: OwnershipSource>(
    source: &S,
    identity: u32,
    home: &Path,
) -> Result<(), LookupError> {
    let owner = source.owner(home).map_err(|e| {
        debug!("home {} uninspectable: {e}", home.display());
        LookupError::HomeMissing
    })?;
    if owner.uid != identity || owner.gid != identity {
        debug!(
            "home {} owned {}:{}, expected {identity}",
            home.display(),
            owner.uid,
            owner.gid
        );
        return Err(LookupError::OwnershipMismatch {
            expected: identity,
            uid: owner.uid,
            gid: owner.gid,
        });
    }
    Ok(())
}
