// CLASSIFICATION: COMMUNITY
// Filename: resolve.rs v0.4
// Author: Lukas Bower
// Date Modified: 2027-08-16

//! Boundary operations: one lookup per identity-resolution kind.
//!
//! Every operation is synchronous, re-entrant, and stateless; the only
//! blocking point is the single stat behind the ownership gate. Rejection
//! always happens before the filesystem is touched, and buffer exhaustion is
//! always distinguishable from absence.

use log::trace;

use crate::buffer::FieldWriter;
use crate::error::LookupError;
use crate::gate::{self, FsMetadata, OwnershipSource};
use crate::hosts::{self, AddressFamily, HostRecord};
use crate::ident::{parse_identity, CanonicalName, HomePath};
use crate::profile::Profile;
use crate::records::{self, AccountRecord, GroupRecord, ShadowRecord};

/// Filesystem-backed identity resolver for one deployment profile.
pub struct Resolver<S = FsMetadata> {
    profile: Profile,
    source: S,
}

impl Resolver<FsMetadata> {
    /// Resolver over the real filesystem.
    #[must_use]
    pub fn new(profile: Profile) -> Self {
        Self::with_source(profile, FsMetadata)
    }
}

impl<S: OwnershipSource> Resolver<S> {
    /// Resolver with a substitute ownership source.
    #[must_use]
    pub fn with_source(profile: Profile, source: S) -> Self {
        Self { profile, source }
    }

    /// Active profile.
    #[must_use]
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Resolve an account by caller-supplied name.
    pub fn account_by_name<'a>(
        &self,
        name: &str,
        buf: &'a mut [u8],
    ) -> Result<AccountRecord<'a>, LookupError> {
        let (identity, home) = self.admit_name(name)?;
        let mut writer = FieldWriter::new(buf);
        records::assemble_account(identity, name.as_bytes(), home.as_bytes(), &mut writer)
    }

    /// Resolve an account by numeric identity.
    pub fn account_by_id<'a>(
        &self,
        identity: u32,
        buf: &'a mut [u8],
    ) -> Result<AccountRecord<'a>, LookupError> {
        let (name, home) = self.admit_identity(identity)?;
        let mut writer = FieldWriter::new(buf);
        records::assemble_account(identity, name.as_bytes(), home.as_bytes(), &mut writer)
    }

    /// Resolve a group by caller-supplied name.
    pub fn group_by_name<'a>(
        &self,
        name: &str,
        buf: &'a mut [u8],
    ) -> Result<GroupRecord<'a>, LookupError> {
        let (identity, _home) = self.admit_name(name)?;
        let mut writer = FieldWriter::new(buf);
        records::assemble_group(identity, name.as_bytes(), &mut writer)
    }

    /// Resolve a group by numeric identity.
    pub fn group_by_id<'a>(
        &self,
        identity: u32,
        buf: &'a mut [u8],
    ) -> Result<GroupRecord<'a>, LookupError> {
        let (name, _home) = self.admit_identity(identity)?;
        let mut writer = FieldWriter::new(buf);
        records::assemble_group(identity, name.as_bytes(), &mut writer)
    }

    /// Resolve credential metadata by caller-supplied name.
    ///
    /// Only serviced on profiles with shadow records enabled.
    pub fn shadow_by_name<'a>(
        &self,
        name: &str,
        buf: &'a mut [u8],
    ) -> Result<ShadowRecord<'a>, LookupError> {
        if !self.profile.serve_shadow {
            return Err(LookupError::ShadowNotServiced);
        }
        let (_identity, _home) = self.admit_name(name)?;
        let mut writer = FieldWriter::new(buf);
        records::assemble_shadow(name.as_bytes(), &mut writer)
    }

    /// Synthesize a host record for `name` in the given address family.
    ///
    /// Purely arithmetic; the filesystem is never consulted.
    pub fn host_by_name<'a>(
        &self,
        name: &str,
        family: AddressFamily,
        buf: &'a mut [u8],
    ) -> Result<HostRecord<'a>, LookupError> {
        let mut writer = FieldWriter::new(buf);
        hosts::synthesize(name, family, self.profile.min_identity, &mut writer)
    }

    /// Gate a caller-supplied name: strict parse, threshold, bounded path
    /// assembly, then the ownership check.
    fn admit_name(&self, name: &str) -> Result<(u32, HomePath), LookupError> {
        let identity = parse_identity(name).ok_or(LookupError::NotNumeric)?;
        gate::require_managed(identity, self.profile.min_identity)?;
        let home = HomePath::assemble(&self.profile.root, name.as_bytes())?;
        gate::verify_home(&self.source, identity, home.as_path())?;
        trace!("admitted identity {identity} by name");
        Ok((identity, home))
    }

    /// Gate a numeric identity, rendering its canonical name on the way.
    fn admit_identity(&self, identity: u32) -> Result<(CanonicalName, HomePath), LookupError> {
        gate::require_managed(identity, self.profile.min_identity)?;
        let name = CanonicalName::render(identity);
        let home = HomePath::assemble(&self.profile.root, name.as_bytes())?;
        gate::verify_home(&self.source, identity, home.as_path())?;
        trace!("admitted identity {identity} by id");
        Ok((name, home))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::PathOwner;
    use std::io;
    use std::path::Path;

    /// Ownership source that owns every path `id:id`, recording nothing.
    struct OwnedByName;

    impl OwnershipSource for OwnedByName {
        fn owner(&self, path: &Path) -> io::Result<PathOwner> {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))?;
            let id = crate::ident::parse_identity(name)
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))?;
            Ok(PathOwner { uid: id, gid: id })
        }
    }

    /// Ownership source that panics when consulted; used to prove a lookup
    /// was rejected before any stat.
    struct NoStatExpected;

    impl OwnershipSource for NoStatExpected {
        fn owner(&self, path: &Path) -> io::Result<PathOwner> {
            panic!("unexpected stat of {}", path.display());
        }
    }

    fn resolver() -> Resolver<OwnedByName> {
        Resolver::with_source(Profile::containers(), OwnedByName)
    }

    #[test]
    fn account_by_name_and_by_id_agree() {
        let r = resolver();
        let mut a = [0u8; 256];
        let mut b = [0u8; 256];
        let by_name = r.account_by_name("30002", &mut a).unwrap();
        let by_id = r.account_by_id(30_002, &mut b).unwrap();
        assert_eq!(by_name, by_id);
        assert_eq!(by_name.home.to_bytes(), b"/containers/30002");
    }

    #[test]
    fn repeated_lookups_are_bit_identical() {
        let r = resolver();
        let mut a = [0u8; 256];
        let mut b = [0u8; 256];
        let first = r.account_by_name("30002", &mut a).unwrap();
        let second = r.account_by_name("30002", &mut b).unwrap();
        assert_eq!(first, second);
        drop((first, second));
        assert_eq!(a, b);
    }

    #[test]
    fn sub_threshold_names_never_reach_the_filesystem() {
        let r = Resolver::with_source(Profile::containers(), NoStatExpected);
        let mut buf = [0u8; 256];
        assert_eq!(
            r.account_by_name("29999", &mut buf).unwrap_err(),
            LookupError::OutsideManagedRange(29_999)
        );
        assert_eq!(
            r.account_by_id(0, &mut buf).unwrap_err(),
            LookupError::OutsideManagedRange(0)
        );
        assert_eq!(
            r.group_by_name("not-a-number", &mut buf).unwrap_err(),
            LookupError::NotNumeric
        );
    }

    #[test]
    fn overlong_names_are_rejected_before_any_stat() {
        // A name this long cannot parse as u32, and a configured root long
        // enough to trip the bound must also reject without a stat.
        let long_root = "x".repeat(crate::ident::PATH_CAPACITY - 4);
        let profile: Profile = format!(r#"{{"root": "/{long_root}/", "min_identity": 30000}}"#)
            .parse()
            .unwrap();
        let r = Resolver::with_source(profile, NoStatExpected);
        let mut buf = [0u8; 256];
        assert_eq!(
            r.account_by_name("30002", &mut buf).unwrap_err(),
            LookupError::PathTooLong {
                limit: crate::ident::PATH_CAPACITY
            }
        );
    }

    #[test]
    fn group_records_match_the_account_identity() {
        let r = resolver();
        let mut buf = [0u8; 256];
        let group = r.group_by_id(30_002, &mut buf).unwrap();
        assert_eq!(group.identity, 30_002);
        assert_eq!(group.name.to_bytes(), b"30002");
        assert!(group.members.is_empty());
    }

    #[test]
    fn shadow_is_profile_gated() {
        let mut buf = [0u8; 64];
        let containers = resolver();
        assert!(containers.shadow_by_name("30002", &mut buf).is_ok());

        let accounts = Resolver::with_source(Profile::accounts(), OwnedByName);
        assert_eq!(
            accounts.shadow_by_name("30002", &mut buf).unwrap_err(),
            LookupError::ShadowNotServiced
        );
    }

    #[test]
    fn host_lookup_ignores_filesystem_state() {
        let r = Resolver::with_source(Profile::containers(), NoStatExpected);
        let mut buf = [0u8; 128];
        let rec = r
            .host_by_name("30002.local", AddressFamily::Inet, &mut buf)
            .unwrap();
        assert_eq!(rec.ipv4(), [10, 0, 0, 4]);
    }

    #[test]
    fn tight_buffer_yields_try_again_not_absence() {
        let r = resolver();
        let mut buf = [0u8; 16];
        let err = r.account_by_name("30002", &mut buf).unwrap_err();
        assert!(err.is_transient());
    }
}
