// osenv: Process Environment Access
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! POSIX backend built on the C runtime's environment calls.
//!
//! ```text
//! get      --> getenv(name)            NULL -> NotFound
//! set      --> setenv(name, value, 1)  != 0 -> errno
//! unset    --> unsetenv(name)          != 0 -> errno
//! snapshot --> environ walk            entry split at first '='
//! ```
//!
//! `getenv` hands back a pointer into live environment storage, so every
//! value is copied out before the call returns.

use std::collections::BTreeMap;
use std::ffi::{CStr, CString};

use crate::error::{EnvError, EnvResult};

use super::parse;

fn to_c_name(name: &str) -> EnvResult<CString> {
    CString::new(name).map_err(|_| EnvError::InvalidName {
        name: name.to_string(),
        reason: "name contains a NUL byte",
    })
}

fn to_c_value(name: &str, value: &str) -> EnvResult<CString> {
    CString::new(value).map_err(|_| EnvError::InvalidValue {
        name: name.to_string(),
        reason: "value contains a NUL byte",
    })
}

pub(super) fn get(name: &str) -> EnvResult<String> {
    let key = to_c_name(name)?;

    // SAFETY: getenv only reads the environment. The returned pointer
    // aliases live environment storage, so the bytes are copied out right
    // away, before a later mutation can invalidate them.
    let bytes = unsafe {
        let ptr = libc::getenv(key.as_ptr());
        if ptr.is_null() {
            return Err(EnvError::NotFound {
                name: name.to_string(),
            });
        }
        CStr::from_ptr(ptr).to_bytes().to_vec()
    };

    String::from_utf8(bytes).map_err(|_| EnvError::NotUnicode {
        name: name.to_string(),
    })
}

pub(super) fn set(name: &str, value: &str) -> EnvResult<()> {
    let key = to_c_name(name)?;
    let val = to_c_value(name, value)?;

    // SAFETY: both strings are NUL-terminated and stay alive across the
    // call; setenv copies them into its own storage.
    let rc = unsafe { libc::setenv(key.as_ptr(), val.as_ptr(), 1) };
    if rc != 0 {
        return Err(EnvError::PlatformRejected {
            call: "setenv",
            source: std::io::Error::last_os_error(),
        });
    }
    Ok(())
}

pub(super) fn unset(name: &str) -> EnvResult<()> {
    let key = to_c_name(name)?;

    // SAFETY: the name is NUL-terminated and unsetenv only reads it.
    // Removing a variable that is not set already returns success.
    let rc = unsafe { libc::unsetenv(key.as_ptr()) };
    if rc != 0 {
        return Err(EnvError::PlatformRejected {
            call: "unsetenv",
            source: std::io::Error::last_os_error(),
        });
    }
    Ok(())
}

pub(super) fn snapshot() -> EnvResult<BTreeMap<String, String>> {
    let mut vars = BTreeMap::new();

    let mut cursor = environ_ptr();
    if cursor.is_null() {
        return Ok(vars);
    }

    // SAFETY: environ is a NULL-terminated array and every entry before the
    // terminator is a valid NUL-terminated C string. Entries are copied out
    // one by one; nothing borrows the array after the loop ends.
    unsafe {
        while !(*cursor).is_null() {
            let entry = CStr::from_ptr(*cursor).to_bytes();
            insert_entry(&mut vars, entry)?;
            cursor = cursor.add(1);
        }
    }

    Ok(vars)
}

fn insert_entry(vars: &mut BTreeMap<String, String>, entry: &[u8]) -> EnvResult<()> {
    let Ok(text) = std::str::from_utf8(entry) else {
        return Err(EnvError::NotUnicode {
            name: lossy_name(entry),
        });
    };

    if let Some((key, value)) = parse::split_entry(text) {
        vars.insert(key.to_string(), value.to_string());
    }
    Ok(())
}

/// Renders the name part of a raw entry for error reporting.
fn lossy_name(entry: &[u8]) -> String {
    let key_len = entry
        .iter()
        .position(|&b| b == b'=')
        .unwrap_or(entry.len());
    String::from_utf8_lossy(&entry[..key_len]).into_owned()
}

#[cfg(target_os = "macos")]
fn environ_ptr() -> *const *const libc::c_char {
    // SAFETY: _NSGetEnviron never fails; it returns the address of the
    // process's environ pointer.
    unsafe { (*libc::_NSGetEnviron()).cast::<*const libc::c_char>().cast_const() }
}

#[cfg(not(target_os = "macos"))]
fn environ_ptr() -> *const *const libc::c_char {
    unsafe extern "C" {
        static environ: *const *const libc::c_char;
    }

    // SAFETY: the C runtime provides environ for the life of the process.
    unsafe { environ }
}
