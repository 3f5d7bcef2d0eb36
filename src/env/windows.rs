// osenv: Process Environment Access
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Windows backend built on the wide-character environment API.
//!
//! ```text
//! get      --> GetEnvironmentVariableW into [u16; 256]
//!              reported >= capacity --> re-query at reported size
//!              reported == 0        --> last-error 0/203 -> NotFound
//! set      --> SetEnvironmentVariableW(name, value)
//! unset    --> SetEnvironmentVariableW(name, NULL)
//!              ERROR_ENVVAR_NOT_FOUND -> Ok
//! snapshot --> GetEnvironmentStringsW
//!              walk double-NUL block, FreeEnvironmentStringsW on drop
//! ```
//!
//! The query reports a variable set to the empty string the same way as a
//! missing one; both come out as `NotFound` here.

use std::collections::BTreeMap;

use windows::Win32::Foundation::{ERROR_ENVVAR_NOT_FOUND, GetLastError, SetLastError, WIN32_ERROR};
use windows::Win32::System::Environment::{
    FreeEnvironmentStringsW, GetEnvironmentStringsW, GetEnvironmentVariableW,
    SetEnvironmentVariableW,
};
use windows::core::{PCWSTR, PWSTR};

use crate::error::{EnvError, EnvResult};

use super::parse;

/// UTF-16 units in the stack buffer tried before any heap allocation.
const PROBE_CAPACITY: usize = 256;

/// Converts a Windows API error to a `std::io::Error` carrying the Win32 code.
fn windows_error_to_io(err: &windows::core::Error) -> std::io::Error {
    let hr = err.code().0;
    // Win32 failures surface as HRESULTs of the form 0x8007xxxx; peel the
    // original last-error code back out of the low word.
    let code = if hr.cast_unsigned() & 0xFFFF_0000 == 0x8007_0000 {
        hr & 0xFFFF
    } else {
        hr
    };
    std::io::Error::from_raw_os_error(code)
}

/// Builds a `PlatformRejected` from a raw last-error code.
fn rejected(call: &'static str, code: u32) -> EnvError {
    EnvError::PlatformRejected {
        call,
        source: std::io::Error::from_raw_os_error(code.cast_signed()),
    }
}

/// Encodes text as a NUL-terminated UTF-16 buffer for the wide-character API.
fn to_wide(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}

/// What one native query round reported.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum QueryRound {
    /// The value fit; `len` UTF-16 units were written.
    Fit { len: usize },
    /// The buffer was too small; the value needs `required` units.
    Grow { required: usize },
    /// The variable is not set, or is set to the empty string.
    Missing,
    /// The call failed with a Win32 error code.
    Failed { code: u32 },
}

/// Classifies the raw return of `GetEnvironmentVariableW`.
///
/// A successful copy always leaves room for the terminator, so a reported
/// length at or past `capacity` can only be a required-size report. A zero
/// report is a miss when the error slot holds `ERROR_ENVVAR_NOT_FOUND`, or
/// still holds the 0 it was cleared to (the empty-string case).
pub(super) fn classify_round(reported: u32, capacity: usize, last_error: u32) -> QueryRound {
    let len = reported as usize;
    if reported == 0 {
        if last_error == 0 || last_error == ERROR_ENVVAR_NOT_FOUND.0 {
            QueryRound::Missing
        } else {
            QueryRound::Failed { code: last_error }
        }
    } else if len >= capacity {
        QueryRound::Grow { required: len }
    } else {
        QueryRound::Fit { len }
    }
}

/// Runs one native query against `buffer` and classifies the outcome.
fn query_round(wide_name: &[u16], buffer: &mut [u16]) -> QueryRound {
    let capacity = buffer.len();
    // SAFETY: the name is NUL-terminated and both buffers stay alive across
    // the call. The error slot is cleared first so a zero-length result
    // classifies deterministically.
    unsafe {
        SetLastError(WIN32_ERROR(0));
        let reported = GetEnvironmentVariableW(PCWSTR(wide_name.as_ptr()), Some(buffer));
        classify_round(reported, capacity, GetLastError().0)
    }
}

pub(super) fn get(name: &str) -> EnvResult<String> {
    let wide_name = to_wide(name);

    let mut stack = [0_u16; PROBE_CAPACITY];
    let units = match query_round(&wide_name, stack.as_mut_slice()) {
        QueryRound::Fit { len } => stack[..len].to_vec(),
        QueryRound::Grow { required } => {
            requery_with(name, required, |buffer| query_round(&wide_name, buffer))?
        }
        QueryRound::Missing => {
            return Err(EnvError::NotFound {
                name: name.to_string(),
            });
        }
        QueryRound::Failed { code } => {
            return Err(rejected("GetEnvironmentVariableW", code));
        }
    };

    String::from_utf16(&units).map_err(|_| EnvError::NotUnicode {
        name: name.to_string(),
    })
}

/// Re-runs `query` with a heap buffer grown to each reported requirement,
/// until the value fits.
pub(super) fn requery_with<F>(name: &str, mut required: usize, mut query: F) -> EnvResult<Vec<u16>>
where
    F: FnMut(&mut [u16]) -> QueryRound,
{
    loop {
        let mut buffer = vec![0_u16; required];
        match query(buffer.as_mut_slice()) {
            QueryRound::Fit { len } => {
                buffer.truncate(len);
                return Ok(buffer);
            }
            // The value grew between the rounds; size up and go again.
            QueryRound::Grow { required: larger } => required = larger,
            QueryRound::Missing => {
                return Err(EnvError::NotFound {
                    name: name.to_string(),
                });
            }
            QueryRound::Failed { code } => {
                return Err(rejected("GetEnvironmentVariableW", code));
            }
        }
    }
}

pub(super) fn set(name: &str, value: &str) -> EnvResult<()> {
    let wide_name = to_wide(name);
    let wide_value = to_wide(value);

    // SAFETY: both buffers are NUL-terminated and stay alive across the
    // call; the platform copies them into the environment block.
    unsafe {
        SetEnvironmentVariableW(PCWSTR(wide_name.as_ptr()), PCWSTR(wide_value.as_ptr())).map_err(
            |e| EnvError::PlatformRejected {
                call: "SetEnvironmentVariableW",
                source: windows_error_to_io(&e),
            },
        )
    }
}

pub(super) fn unset(name: &str) -> EnvResult<()> {
    let wide_name = to_wide(name);

    // SAFETY: a NULL value removes the variable; the name buffer stays
    // alive across the call.
    let result = unsafe { SetEnvironmentVariableW(PCWSTR(wide_name.as_ptr()), PCWSTR::null()) };

    match result {
        Ok(()) => Ok(()),
        // Removing a variable that is not set is a no-op, matching unsetenv.
        Err(e) if e.code() == ERROR_ENVVAR_NOT_FOUND.to_hresult() => Ok(()),
        Err(e) => Err(EnvError::PlatformRejected {
            call: "SetEnvironmentVariableW",
            source: windows_error_to_io(&e),
        }),
    }
}

/// Owned environment block handed out by `GetEnvironmentStringsW`.
///
/// Freeing happens in `Drop`, so every walk outcome releases the block.
struct EnvironmentBlock(PWSTR);

impl EnvironmentBlock {
    fn capture() -> EnvResult<Self> {
        // SAFETY: GetEnvironmentStringsW takes no arguments; a NULL result
        // means the platform handed out no block.
        let block = unsafe { GetEnvironmentStringsW() };
        if block.is_null() {
            return Err(EnvError::BlockUnavailable {
                call: "GetEnvironmentStringsW",
            });
        }
        Ok(Self(block))
    }
}

impl Drop for EnvironmentBlock {
    fn drop(&mut self) {
        // SAFETY: the pointer came from GetEnvironmentStringsW and is freed
        // exactly once.
        unsafe {
            let _ = FreeEnvironmentStringsW(PCWSTR(self.0.as_ptr()));
        }
    }
}

pub(super) fn snapshot() -> EnvResult<BTreeMap<String, String>> {
    let block = EnvironmentBlock::capture()?;
    let mut vars = BTreeMap::new();

    let mut cursor = block.0.as_ptr().cast_const();
    // SAFETY: the block is a sequence of NUL-terminated UTF-16 strings with
    // an empty string marking the end; the guard keeps it alive for the
    // whole walk.
    unsafe {
        loop {
            let len = wide_len(cursor);
            if len == 0 {
                break;
            }
            let entry = std::slice::from_raw_parts(cursor, len);
            insert_entry(&mut vars, entry)?;
            cursor = cursor.add(len + 1);
        }
    }

    Ok(vars)
}

/// Length in UTF-16 units of the NUL-terminated string at `cursor`.
///
/// # Safety
/// `cursor` must point at a NUL-terminated sequence of UTF-16 units.
unsafe fn wide_len(cursor: *const u16) -> usize {
    let mut len = 0;
    // SAFETY: the caller guarantees a terminator is reachable.
    unsafe {
        while *cursor.add(len) != 0 {
            len += 1;
        }
    }
    len
}

fn insert_entry(vars: &mut BTreeMap<String, String>, entry: &[u16]) -> EnvResult<()> {
    let Ok(text) = String::from_utf16(entry) else {
        return Err(EnvError::NotUnicode {
            name: lossy_name(entry),
        });
    };

    if let Some((key, value)) = parse::split_entry(&text) {
        vars.insert(key.to_string(), value.to_string());
    }
    Ok(())
}

/// Renders the name part of a raw entry for error reporting.
fn lossy_name(entry: &[u16]) -> String {
    let key_len = entry
        .iter()
        .position(|&u| u == u16::from(b'='))
        .unwrap_or(entry.len());
    String::from_utf16_lossy(&entry[..key_len])
}
