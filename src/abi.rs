// CLASSIFICATION: COMMUNITY
// Filename: abi.rs v0.5
// Author: Lukas Bower
// Date Modified: 2027-08-19

//! NSS plugin surface: the narrow extern interface the host C resolver
//! dispatches to. Everything here adapts raw pointers to the safe core and
//! copies nothing; populated structs reference only the caller's buffer or
//! the caller's own input. The host's dispatch table itself is out of scope.

use std::ffi::{c_char, c_int, CStr};
use std::slice;

use once_cell::sync::Lazy;

use crate::error::LookupError;
use crate::hosts::{AddressFamily, HostRecord, ADDR_LEN};
use crate::profile::Profile;
use crate::records::{AccountRecord, GroupRecord, ShadowRecord};
use crate::resolve::Resolver;

// glibc resolver error the caller sees alongside a host try-again.
const NO_RECOVERY: c_int = 3;

/// Lookup outcome in the host resolver's vocabulary.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NssStatus {
    /// Transient failure; retry with a larger buffer.
    TryAgain = -2,
    /// Permanent failure: validation or parse rejected the query.
    Unavail = -1,
    /// The identity does not exist in this namespace.
    NotFound = 0,
    /// Record populated.
    Success = 1,
}

// Resolved once per process; immutable afterwards, so per-call
// statelessness is preserved.
static RESOLVER: Lazy<Resolver> = Lazy::new(|| Resolver::new(Profile::from_env()));

fn db_status(err: &LookupError) -> NssStatus {
    match err {
        LookupError::InsufficientBuffer { .. } => NssStatus::TryAgain,
        LookupError::ShadowNotServiced => NssStatus::NotFound,
        _ => NssStatus::Unavail,
    }
}

fn host_status(err: &LookupError) -> NssStatus {
    match err {
        LookupError::InsufficientBuffer { .. } => NssStatus::TryAgain,
        _ => NssStatus::NotFound,
    }
}

unsafe fn db_failure(err: &LookupError, errnop: *mut c_int) -> NssStatus {
    let status = db_status(err);
    if status == NssStatus::TryAgain && !errnop.is_null() {
        *errnop = libc::ERANGE;
    }
    status
}

unsafe fn borrow_name<'a>(name: *const c_char) -> Option<&'a str> {
    if name.is_null() {
        return None;
    }
    CStr::from_ptr(name).to_str().ok()
}

unsafe fn borrow_buffer<'a>(buffer: *mut c_char, buflen: usize) -> Option<&'a mut [u8]> {
    if buffer.is_null() {
        return None;
    }
    Some(slice::from_raw_parts_mut(buffer.cast::<u8>(), buflen))
}

unsafe fn fill_passwd(rec: &AccountRecord<'_>, out: *mut libc::passwd) {
    (*out).pw_name = rec.name.as_ptr().cast_mut();
    (*out).pw_passwd = rec.passwd.as_ptr().cast_mut();
    (*out).pw_uid = rec.uid() as libc::uid_t;
    (*out).pw_gid = rec.gid() as libc::gid_t;
    (*out).pw_gecos = rec.gecos.as_ptr().cast_mut();
    (*out).pw_dir = rec.home.as_ptr().cast_mut();
    (*out).pw_shell = rec.shell.as_ptr().cast_mut();
}

unsafe fn fill_group(rec: &mut GroupRecord<'_>, out: *mut libc::group) {
    (*out).gr_name = rec.name.as_ptr().cast_mut();
    (*out).gr_passwd = rec.passwd.as_ptr().cast_mut();
    (*out).gr_gid = rec.identity as libc::gid_t;
    (*out).gr_mem = rec.members.table_ptr();
}

unsafe fn fill_shadow(rec: &ShadowRecord<'_>, out: *mut libc::spwd) {
    (*out).sp_namp = rec.name.as_ptr().cast_mut();
    (*out).sp_pwdp = rec.passwd.as_ptr().cast_mut();
    (*out).sp_lstchg = rec.last_change as libc::c_long;
    (*out).sp_min = rec.min_days as libc::c_long;
    (*out).sp_max = rec.max_days as libc::c_long;
    (*out).sp_warn = rec.warn_days as libc::c_long;
    (*out).sp_inact = rec.inactive_days as libc::c_long;
    (*out).sp_expire = rec.expire_day as libc::c_long;
    (*out).sp_flag = rec.flags as libc::c_ulong;
}

unsafe fn fill_hostent(rec: &mut HostRecord<'_>, out: *mut libc::hostent) {
    let table = rec.address_table_ptr();
    // Slot 0 points at the 4-byte address; slot 1 stays the NULL terminator.
    *table = rec.address.as_ptr().cast::<c_char>().cast_mut();
    (*out).h_name = rec.name.as_ptr().cast_mut();
    (*out).h_aliases = rec.alias_table_ptr();
    (*out).h_addrtype = libc::AF_INET;
    (*out).h_length = ADDR_LEN as c_int;
    (*out).h_addr_list = table;
}

/// Account lookup by name.
///
/// # Safety
/// `name`, `result`, `buffer`, and `errnop` follow the glibc NSS calling
/// convention; `buffer` must be valid for `buflen` bytes.
#[no_mangle]
pub unsafe extern "C" fn _nss_cohesix_getpwnam_r(
    name: *const c_char,
    result: *mut libc::passwd,
    buffer: *mut c_char,
    buflen: usize,
    errnop: *mut c_int,
) -> NssStatus {
    let (Some(name), Some(buf)) = (borrow_name(name), borrow_buffer(buffer, buflen)) else {
        return NssStatus::Unavail;
    };
    if result.is_null() {
        return NssStatus::Unavail;
    }
    match RESOLVER.account_by_name(name, buf) {
        Ok(rec) => {
            fill_passwd(&rec, result);
            NssStatus::Success
        }
        Err(err) => db_failure(&err, errnop),
    }
}

/// Account lookup by numeric identity.
///
/// # Safety
/// See [`_nss_cohesix_getpwnam_r`].
#[no_mangle]
pub unsafe extern "C" fn _nss_cohesix_getpwuid_r(
    uid: libc::uid_t,
    result: *mut libc::passwd,
    buffer: *mut c_char,
    buflen: usize,
    errnop: *mut c_int,
) -> NssStatus {
    let Some(buf) = borrow_buffer(buffer, buflen) else {
        return NssStatus::Unavail;
    };
    if result.is_null() {
        return NssStatus::Unavail;
    }
    match RESOLVER.account_by_id(uid, buf) {
        Ok(rec) => {
            fill_passwd(&rec, result);
            NssStatus::Success
        }
        Err(err) => db_failure(&err, errnop),
    }
}

/// Group lookup by name.
///
/// # Safety
/// See [`_nss_cohesix_getpwnam_r`].
#[no_mangle]
pub unsafe extern "C" fn _nss_cohesix_getgrnam_r(
    name: *const c_char,
    result: *mut libc::group,
    buffer: *mut c_char,
    buflen: usize,
    errnop: *mut c_int,
) -> NssStatus {
    let (Some(name), Some(buf)) = (borrow_name(name), borrow_buffer(buffer, buflen)) else {
        return NssStatus::Unavail;
    };
    if result.is_null() {
        return NssStatus::Unavail;
    }
    match RESOLVER.group_by_name(name, buf) {
        Ok(mut rec) => {
            fill_group(&mut rec, result);
            NssStatus::Success
        }
        Err(err) => db_failure(&err, errnop),
    }
}

/// Group lookup by numeric identity.
///
/// # Safety
/// See [`_nss_cohesix_getpwnam_r`].
#[no_mangle]
pub unsafe extern "C" fn _nss_cohesix_getgrgid_r(
    gid: libc::gid_t,
    result: *mut libc::group,
    buffer: *mut c_char,
    buflen: usize,
    errnop: *mut c_int,
) -> NssStatus {
    let Some(buf) = borrow_buffer(buffer, buflen) else {
        return NssStatus::Unavail;
    };
    if result.is_null() {
        return NssStatus::Unavail;
    }
    match RESOLVER.group_by_id(gid, buf) {
        Ok(mut rec) => {
            fill_group(&mut rec, result);
            NssStatus::Success
        }
        Err(err) => db_failure(&err, errnop),
    }
}

/// Credential-metadata lookup by name; NotFound on profiles without shadow
/// records.
///
/// # Safety
/// See [`_nss_cohesix_getpwnam_r`].
#[no_mangle]
pub unsafe extern "C" fn _nss_cohesix_getspnam_r(
    name: *const c_char,
    result: *mut libc::spwd,
    buffer: *mut c_char,
    buflen: usize,
    errnop: *mut c_int,
) -> NssStatus {
    let (Some(name), Some(buf)) = (borrow_name(name), borrow_buffer(buffer, buflen)) else {
        return NssStatus::Unavail;
    };
    if result.is_null() {
        return NssStatus::Unavail;
    }
    match RESOLVER.shadow_by_name(name, buf) {
        Ok(rec) => {
            fill_shadow(&rec, result);
            NssStatus::Success
        }
        Err(err) => db_failure(&err, errnop),
    }
}

/// Host lookup by name and address family.
///
/// # Safety
/// See [`_nss_cohesix_getpwnam_r`]; `h_errnop` follows the same convention.
#[no_mangle]
pub unsafe extern "C" fn _nss_cohesix_gethostbyname2_r(
    name: *const c_char,
    af: c_int,
    result: *mut libc::hostent,
    buffer: *mut c_char,
    buflen: usize,
    errnop: *mut c_int,
    h_errnop: *mut c_int,
) -> NssStatus {
    let (Some(name), Some(buf)) = (borrow_name(name), borrow_buffer(buffer, buflen)) else {
        return NssStatus::NotFound;
    };
    if result.is_null() {
        return NssStatus::NotFound;
    }
    match RESOLVER.host_by_name(name, AddressFamily::from_raw(af), buf) {
        Ok(mut rec) => {
            fill_hostent(&mut rec, result);
            NssStatus::Success
        }
        Err(err) => {
            let status = host_status(&err);
            if status == NssStatus::TryAgain {
                if !errnop.is_null() {
                    *errnop = libc::ERANGE;
                }
                if !h_errnop.is_null() {
                    *h_errnop = NO_RECOVERY;
                }
            }
            status
        }
    }
}

/// Host lookup without an address family; delegates with `AF_UNSPEC`, which
/// is never serviced.
///
/// # Safety
/// See [`_nss_cohesix_gethostbyname2_r`].
#[no_mangle]
pub unsafe extern "C" fn _nss_cohesix_gethostbyname_r(
    name: *const c_char,
    result: *mut libc::hostent,
    buffer: *mut c_char,
    buflen: usize,
    errnop: *mut c_int,
    h_errnop: *mut c_int,
) -> NssStatus {
    _nss_cohesix_gethostbyname2_r(
        name,
        libc::AF_UNSPEC,
        result,
        buffer,
        buflen,
        errnop,
        h_errnop,
    )
}
