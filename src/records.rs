// CLASSIFICATION: COMMUNITY
// Filename: records.rs v0.4
// Author: Lukas Bower
// Date Modified: 2027-08-13

//! Assemblers for account, group, and shadow records.
//!
//! Each assembler consumes an already-verified identity and packs every
//! variable-length field through the [`FieldWriter`], so failure at any
//! point aborts the whole record with the buffer hint intact.

use std::ffi::{c_char, CStr};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::buffer::FieldWriter;
use crate::error::LookupError;

/// Fixed login shell for every managed account.
pub const SHELL: &str = "/bin/bash";

const PASSWORD_MARKER: &[u8] = b"x";
const LOCKED_MARKER: &[u8] = b"!";
const SECONDS_PER_DAY: u64 = 86_400;

/// Resolved account record; all fields borrow the caller's buffer.
#[derive(Debug, PartialEq, Eq)]
pub struct AccountRecord<'a> {
    /// Numeric identity, doubling as the group identity.
    pub identity: u32,
    /// Canonical name.
    pub name: &'a CStr,
    /// Password marker, always `"x"`.
    pub passwd: &'a CStr,
    /// Display field, holding the name.
    pub gecos: &'a CStr,
    /// Home directory, which is also the authority record.
    pub home: &'a CStr,
    /// Login shell.
    pub shell: &'a CStr,
}

impl AccountRecord<'_> {
    /// Owning user id.
    #[must_use]
    pub fn uid(&self) -> u32 {
        self.identity
    }

    /// Owning group id; always equal to [`AccountRecord::uid`].
    #[must_use]
    pub fn gid(&self) -> u32 {
        self.identity
    }
}

/// Empty, NULL-terminated member table reserved inside the caller's buffer.
#[derive(Debug)]
pub struct MemberTable<'a> {
    slots: &'a mut [u8],
}

impl MemberTable<'_> {
    /// True while no member pointer has been installed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|&b| b == 0)
    }

    /// Raw pointer table for the ABI layer. The chunk is pointer-aligned and
    /// zeroed, so the single slot is the NULL terminator.
    #[must_use]
    pub fn table_ptr(&mut self) -> *mut *mut c_char {
        self.slots.as_mut_ptr().cast()
    }
}

/// Resolved group record.
#[derive(Debug)]
pub struct GroupRecord<'a> {
    /// Numeric identity.
    pub identity: u32,
    /// Canonical name.
    pub name: &'a CStr,
    /// Password marker, always `"x"`.
    pub passwd: &'a CStr,
    /// Member list, always empty.
    pub members: MemberTable<'a>,
}

/// Resolved shadow (credential-metadata) record.
#[derive(Debug, PartialEq, Eq)]
pub struct ShadowRecord<'a> {
    /// Canonical name.
    pub name: &'a CStr,
    /// Password status, always locked (`"!"`).
    pub passwd: &'a CStr,
    /// Days between the epoch and the last password change.
    pub last_change: i64,
    /// Minimum days between changes; disabled.
    pub min_days: i64,
    /// Maximum password age in days; disabled.
    pub max_days: i64,
    /// Warning period in days; disabled.
    pub warn_days: i64,
    /// Inactivity period in days; disabled.
    pub inactive_days: i64,
    /// Account expiry day; disabled.
    pub expire_day: i64,
    /// Reserved flags.
    pub flags: u64,
}

/// Pack an account record: name, password marker, display name, home, shell.
pub fn assemble_account<'a>(
    identity: u32,
    name: &[u8],
    home: &[u8],
    writer: &mut FieldWriter<'a>,
) -> Result<AccountRecord<'a>, LookupError> {
    Ok(AccountRecord {
        identity,
        name: writer.write_cstr(name)?,
        passwd: writer.write_cstr(PASSWORD_MARKER)?,
        gecos: writer.write_cstr(name)?,
        home: writer.write_cstr(home)?,
        shell: writer.write_cstr(SHELL.as_bytes())?,
    })
}

/// Pack a group record: name, password marker, one-slot empty member table.
///
/// The slot capacity is verified before the table is written.
pub fn assemble_group<'a>(
    identity: u32,
    name: &[u8],
    writer: &mut FieldWriter<'a>,
) -> Result<GroupRecord<'a>, LookupError> {
    Ok(GroupRecord {
        identity,
        name: writer.write_cstr(name)?,
        passwd: writer.write_cstr(PASSWORD_MARKER)?,
        members: MemberTable {
            slots: writer.reserve_ptr_table(1)?,
        },
    })
}

/// Pack a shadow record: locked marker and disabled aging fields.
pub fn assemble_shadow<'a>(
    name: &[u8],
    writer: &mut FieldWriter<'a>,
) -> Result<ShadowRecord<'a>, LookupError> {
    Ok(ShadowRecord {
        name: writer.write_cstr(name)?,
        passwd: writer.write_cstr(LOCKED_MARKER)?,
        last_change: days_since_epoch() - 1,
        min_days: -1,
        max_days: -1,
        warn_days: -1,
        inactive_days: -1,
        expire_day: -1,
        flags: 0,
    })
}

fn days_since_epoch() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| (d.as_secs() / SECONDS_PER_DAY) as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_fields_are_fully_populated() {
        let mut buf = [0u8; 128];
        let mut writer = FieldWriter::new(&mut buf);
        let rec =
            assemble_account(30_002, b"30002", b"/containers/30002", &mut writer).unwrap();
        assert_eq!(rec.uid(), 30_002);
        assert_eq!(rec.gid(), 30_002);
        assert_eq!(rec.name.to_bytes(), b"30002");
        assert_eq!(rec.passwd.to_bytes(), b"x");
        assert_eq!(rec.gecos.to_bytes(), b"30002");
        assert_eq!(rec.home.to_bytes(), b"/containers/30002");
        assert_eq!(rec.shell.to_bytes(), b"/bin/bash");
    }

    #[test]
    fn account_assembly_aborts_when_a_late_field_overflows() {
        // Room for the name and markers but not the shell.
        let mut buf = [0u8; 32];
        let mut writer = FieldWriter::new(&mut buf);
        let err = assemble_account(30_002, b"30002", b"/containers/30002", &mut writer)
            .unwrap_err();
        assert!(err.is_transient());
    }

    #[test]
    fn group_member_table_is_empty_and_null_terminated() {
        let mut buf = [0u8; 64];
        let mut writer = FieldWriter::new(&mut buf);
        let mut rec = assemble_group(30_002, b"30002", &mut writer).unwrap();
        assert_eq!(rec.identity, 30_002);
        assert_eq!(rec.passwd.to_bytes(), b"x");
        assert!(rec.members.is_empty());
        assert!(!rec.members.table_ptr().is_null());
    }

    #[test]
    fn group_assembly_requires_room_for_the_table_slot() {
        // Name and marker fit; the pointer slot does not.
        let mut buf = [0u8; 8];
        let mut writer = FieldWriter::new(&mut buf);
        assert!(assemble_group(30_002, b"30002", &mut writer)
            .unwrap_err()
            .is_transient());
    }

    #[test]
    fn shadow_record_is_locked_with_aging_disabled() {
        let mut buf = [0u8; 32];
        let mut writer = FieldWriter::new(&mut buf);
        let rec = assemble_shadow(b"30002", &mut writer).unwrap();
        assert_eq!(rec.passwd.to_bytes(), b"!");
        assert_eq!(rec.last_change, days_since_epoch() - 1);
        assert_eq!(rec.min_days, -1);
        assert_eq!(rec.max_days, -1);
        assert_eq!(rec.warn_days, -1);
        assert_eq!(rec.inactive_days, -1);
        assert_eq!(rec.expire_day, -1);
        assert_eq!(rec.flags, 0);
    }
}
