// CLASSIFICATION: COMMUNITY
// Filename: hosts.rs v0.3
// Author: Lukas Bower
// Date Modified: 2027-08-14

//! Synthesizer mapping `<identity>.local` names to private IPv4 addresses.
//!
//! No filesystem is consulted: the address is derived arithmetically from
//! the numeric identity. Only IPv4 is serviced; every other family is a
//! permanent miss rather than an error.

use std::ffi::{c_char, CStr};
use std::mem;

use crate::buffer::{FieldWriter, PTR_SLOT};
use crate::error::LookupError;

/// Suffix a managed host name must carry.
pub const HOST_SUFFIX: &str = ".local";

/// Private network the synthesized addresses live in.
pub const ADDR_BASE: u32 = 0x0a00_0000; // 10.0.0.0/8

/// Bytes of an IPv4 address.
pub const ADDR_LEN: usize = 4;

// .0 is the network address and .1 the router, so identities start at .2.
const HOST_OFFSET: u32 = 2;

/// Address family of a host query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFamily {
    /// IPv4, the only serviced family.
    Inet,
    /// IPv6; never serviced.
    Inet6,
    /// No family given; never serviced.
    Unspecified,
    /// Any other raw family value.
    Other(i32),
}

impl AddressFamily {
    /// Classify a raw `AF_*` value.
    #[must_use]
    pub fn from_raw(af: i32) -> Self {
        match af {
            libc::AF_INET => AddressFamily::Inet,
            libc::AF_INET6 => AddressFamily::Inet6,
            libc::AF_UNSPEC => AddressFamily::Unspecified,
            other => AddressFamily::Other(other),
        }
    }
}

/// Synthesized host record; all fields borrow the caller's buffer.
#[derive(Debug)]
pub struct HostRecord<'a> {
    /// The queried name.
    pub name: &'a CStr,
    /// The single derived address in network byte order.
    pub address: &'a [u8],
    aliases: &'a mut [u8],
    addresses: &'a mut [u8],
}

impl HostRecord<'_> {
    /// The derived address as octets.
    #[must_use]
    pub fn ipv4(&self) -> [u8; ADDR_LEN] {
        let mut octets = [0u8; ADDR_LEN];
        octets.copy_from_slice(self.address);
        octets
    }

    /// Raw empty alias table (a single NULL entry) for the ABI layer.
    #[must_use]
    pub fn alias_table_ptr(&mut self) -> *mut *mut c_char {
        self.aliases.as_mut_ptr().cast()
    }

    /// Raw two-slot address table for the ABI layer; slot 0 is unset, slot 1
    /// is the NULL terminator.
    #[must_use]
    pub fn address_table_ptr(&mut self) -> *mut *mut c_char {
        self.addresses.as_mut_ptr().cast()
    }
}

/// Derive the synthetic address for identity `n` above `min_identity`.
///
/// The low 24 bits of `10.0.0.0` are replaced by `(n - min) + 2`, keeping
/// the network and router addresses reserved.
#[must_use]
pub fn derive_address(n: u32, min_identity: u32) -> [u8; ADDR_LEN] {
    let host = n.wrapping_sub(min_identity).wrapping_add(HOST_OFFSET) & 0x00ff_ffff;
    (ADDR_BASE | host).to_be_bytes()
}

/// Buffer capacity a host record for a name of `name_len` bytes needs,
/// worst-case alignment padding included.
#[must_use]
pub fn required_capacity(name_len: usize) -> usize {
    let align_slack = 2 * (mem::align_of::<*mut c_char>() - 1);
    PTR_SLOT + name_len + 1 + ADDR_LEN + 2 * PTR_SLOT + align_slack
}

/// Synthesize the record for `name`, or report why none exists.
///
/// Layout, in order: empty alias table, the queried name, the 4-byte
/// address, the 2-entry address table. Total space is verified before any
/// byte is written, so a shortfall surfaces as a clean try-again with the
/// required capacity as the hint.
pub fn synthesize<'a>(
    name: &str,
    family: AddressFamily,
    min_identity: u32,
    writer: &mut FieldWriter<'a>,
) -> Result<HostRecord<'a>, LookupError> {
    if family != AddressFamily::Inet {
        return Err(LookupError::UnsupportedFamily);
    }
    let prefix = name
        .strip_suffix(HOST_SUFFIX)
        .filter(|p| !p.is_empty())
        .ok_or(LookupError::WrongSuffix)?;
    let n = crate::ident::parse_identity(prefix).ok_or(LookupError::NotNumeric)?;
    // The threshold itself maps to the reserved offset 0 and is rejected.
    if n <= min_identity {
        return Err(LookupError::OutsideManagedRange(n));
    }

    let needed = required_capacity(name.len());
    if needed > writer.remaining() {
        return Err(LookupError::InsufficientBuffer { needed });
    }

    let aliases = writer.reserve_ptr_table(1)?;
    let name_c = writer.write_cstr(name.as_bytes())?;
    let address = writer.write_bytes(&derive_address(n, min_identity))?;
    let addresses = writer.reserve_ptr_table(2)?;
    Ok(HostRecord {
        name: name_c,
        address,
        aliases,
        addresses,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synth<'a>(
        name: &str,
        family: AddressFamily,
        buf: &'a mut [u8],
    ) -> Result<HostRecord<'a>, LookupError> {
        let mut writer = FieldWriter::new(buf);
        synthesize(name, family, 30_000, &mut writer)
    }

    #[test]
    fn identity_30002_maps_to_10_0_0_4() {
        let mut buf = [0u8; 128];
        let rec = synth("30002.local", AddressFamily::Inet, &mut buf).unwrap();
        assert_eq!(rec.ipv4(), [10, 0, 0, 4]);
        assert_eq!(rec.name.to_bytes(), b"30002.local");
    }

    #[test]
    fn threshold_identity_is_rejected() {
        let mut buf = [0u8; 128];
        assert_eq!(
            synth("30000.local", AddressFamily::Inet, &mut buf).unwrap_err(),
            LookupError::OutsideManagedRange(30_000)
        );
    }

    #[test]
    fn non_numeric_prefix_and_wrong_suffix_miss() {
        let mut buf = [0u8; 128];
        assert_eq!(
            synth("x.local", AddressFamily::Inet, &mut buf).unwrap_err(),
            LookupError::NotNumeric
        );
        assert_eq!(
            synth("30002.other", AddressFamily::Inet, &mut buf).unwrap_err(),
            LookupError::WrongSuffix
        );
        assert_eq!(
            synth(".local", AddressFamily::Inet, &mut buf).unwrap_err(),
            LookupError::WrongSuffix
        );
    }

    #[test]
    fn non_ipv4_families_miss() {
        let mut buf = [0u8; 128];
        assert_eq!(
            synth("30002.local", AddressFamily::Inet6, &mut buf).unwrap_err(),
            LookupError::UnsupportedFamily
        );
        assert_eq!(
            synth("30002.local", AddressFamily::Unspecified, &mut buf).unwrap_err(),
            LookupError::UnsupportedFamily
        );
    }

    #[test]
    fn short_buffer_reports_required_capacity() {
        let name = "30002.local";
        let needed = required_capacity(name.len());
        let mut buf = [0u8; 16];
        assert_eq!(
            synth(name, AddressFamily::Inet, &mut buf).unwrap_err(),
            LookupError::InsufficientBuffer { needed }
        );
        // The hint is sufficient.
        let mut buf = vec![0u8; needed];
        assert!(synth(name, AddressFamily::Inet, &mut buf).is_ok());
    }

    #[test]
    fn high_identities_wrap_inside_the_low_24_bits() {
        assert_eq!(derive_address(30_001, 30_000), [10, 0, 0, 3]);
        assert_eq!(derive_address(30_000 + 0x00ff_fffe, 30_000), [10, 0, 0, 0]);
    }

    #[test]
    fn tables_are_zeroed_until_the_abi_fills_them() {
        let mut buf = [0xffu8; 128];
        let mut rec = synth("30002.local", AddressFamily::Inet, &mut buf).unwrap();
        assert!(!rec.alias_table_ptr().is_null());
        assert!(!rec.address_table_ptr().is_null());
        assert!(rec.aliases.iter().all(|&b| b == 0));
        assert!(rec.addresses.iter().all(|&b| b == 0));
    }
}
