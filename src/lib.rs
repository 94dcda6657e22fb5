// CLASSIFICATION: COMMUNITY
// Filename: lib.rs v0.5
// Author: Lukas Bower
// Date Modified: 2027-08-19

//! Filesystem-backed NSS resolver for Cohesix container identities.
//!
//! Managed identities are plain numbers at or above a configured threshold.
//! The directory `<root>/<identity>` is both the account's home and its
//! authority record: the lookup succeeds only when that directory exists and
//! is owned, user and group alike, by the identity it is named after.
//! `<identity>.local` host names resolve to synthetic `10.0.0.0/8`
//! addresses derived from the same number.
//!
//! Every lookup packs its record into a caller-owned buffer through
//! [`FieldWriter`]; nothing is heap-allocated and nothing outlives the call.
//! The `abi` module exports the `_nss_cohesix_*` symbols the host C
//! resolver dispatches to.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod buffer;
pub mod error;
pub mod gate;
pub mod hosts;
pub mod ident;
pub mod profile;
pub mod records;
pub mod resolve;

/// NSS plugin entry points; the only module containing unsafe code.
#[allow(unsafe_code)]
pub mod abi;

pub use buffer::{BufferError, FieldWriter};
pub use error::LookupError;
pub use gate::{FsMetadata, OwnershipSource, PathOwner};
pub use hosts::{AddressFamily, HostRecord};
pub use ident::{parse_identity, CanonicalName, HomePath, MIN_IDENTITY, PATH_CAPACITY};
pub use profile::Profile;
pub use records::{AccountRecord, GroupRecord, ShadowRecord};
pub use resolve::Resolver;
