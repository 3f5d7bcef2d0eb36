// osenv: Process Environment Access
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Process environment access.
//!
//! # Architecture
//!
//! ```text
//! get / set / unset / snapshot
//!   validate name, value
//!   --> ENV_LOCK (crate-internal)
//!       --> windows: GetEnvironmentVariableW [u16; 256] probe
//!                    SetEnvironmentVariableW (NULL removes)
//!                    GetEnvironmentStringsW  walk + free
//!       --> posix:   getenv / setenv / unsetenv / environ
//!   --> UTF-8 String out, KEY=VALUE split at first '='
//! ```
//!
//! - **No caching**: every call hits the platform's live environment
//! - **UTF-8 at the boundary**: non-Unicode data is an error, never lossy
//! - **Whole-or-nothing snapshot**: one bad entry fails the whole capture
//!
//! # Thread Safety
//!
//! The process environment is global mutable state. The calls in this module
//! serialize against each other through a crate-internal lock, but nothing
//! stops other code in the process (or a linked C library) from mutating the
//! environment concurrently through other routes. On POSIX systems such a
//! concurrent `setenv` while another thread reads is undefined behavior in
//! the C runtime itself; callers who need a hard guarantee must confine all
//! environment mutation to one place.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{Level, debug, enabled, trace};

use crate::error::{EnvError, EnvResult};

mod parse;

#[cfg(not(windows))]
mod posix;
#[cfg(windows)]
mod windows;

#[cfg(not(windows))]
use self::posix as platform;
#[cfg(windows)]
use self::windows as platform;

#[cfg(test)]
mod tests;

/// Serializes the crate's own environment calls against each other.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn lock_env() -> MutexGuard<'static, ()> {
    // A poisoned lock only means another thread panicked mid-call; the
    // guarded state lives in the OS, not behind the mutex.
    ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

fn validate_name(name: &str) -> EnvResult<()> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name.contains('=') {
        "name contains '='"
    } else if name.contains('\0') {
        "name contains a NUL byte"
    } else {
        return Ok(());
    };

    Err(EnvError::InvalidName {
        name: name.to_string(),
        reason,
    })
}

fn validate_value(name: &str, value: &str) -> EnvResult<()> {
    if value.contains('\0') {
        return Err(EnvError::InvalidValue {
            name: name.to_string(),
            reason: "value contains a NUL byte",
        });
    }
    Ok(())
}

/// Reads the variable `name` from the process environment.
///
/// The value is read through the platform's native query, not from any
/// cached copy, so a change made by a child-process launcher or a linked
/// library is visible on the next call.
///
/// # Errors
///
/// - [`EnvError::InvalidName`] if `name` is empty or contains `=` or NUL
/// - [`EnvError::NotFound`] if the variable is not set (on Windows this
///   includes a variable set to the empty string)
/// - [`EnvError::NotUnicode`] if the stored value is not valid Unicode
/// - [`EnvError::PlatformRejected`] if the platform query itself fails
pub fn get(name: &str) -> EnvResult<String> {
    validate_name(name)?;

    let _guard = lock_env();
    trace!(name = name, "reading environment variable");
    let value = platform::get(name)?;
    trace!(name = name, len = value.len(), "environment variable read");
    Ok(value)
}

/// Writes `value` into the process environment under `name`.
///
/// An existing variable is overwritten. The change affects this process and
/// every child spawned afterwards.
///
/// # Errors
///
/// - [`EnvError::InvalidName`] if `name` is empty or contains `=` or NUL
/// - [`EnvError::InvalidValue`] if `value` contains a NUL byte
/// - [`EnvError::PlatformRejected`] if the platform refuses the write, with
///   the `errno` / last-error code attached
pub fn set(name: &str, value: &str) -> EnvResult<()> {
    validate_name(name)?;
    validate_value(name, value)?;

    let _guard = lock_env();
    debug!(name = name, len = value.len(), "setting environment variable");
    if enabled!(Level::TRACE) {
        trace!(name = name, value = value, "environment variable payload");
    }
    platform::set(name, value)
}

/// Removes the variable `name` from the process environment.
///
/// Removing a variable that is not set succeeds; the operation is
/// idempotent on every platform.
///
/// # Errors
///
/// - [`EnvError::InvalidName`] if `name` is empty or contains `=` or NUL
/// - [`EnvError::PlatformRejected`] if the platform refuses the removal,
///   with the `errno` / last-error code attached
pub fn unset(name: &str) -> EnvResult<()> {
    validate_name(name)?;

    let _guard = lock_env();
    debug!(name = name, "removing environment variable");
    platform::unset(name)
}

/// Captures the entire process environment as a sorted name-to-value map.
///
/// Each entry of the platform's environment block is split at its first
/// `=`. Entries with an empty name (Windows keeps per-drive working
/// directories under names like `=C:`) and entries with no `=` at all carry
/// no addressable variable and are left out.
///
/// # Errors
///
/// - [`EnvError::BlockUnavailable`] if the platform hands out no
///   environment block ([`EnvError::code`] is `None`; the native call
///   reports no code for this)
/// - [`EnvError::NotUnicode`] if any entry holds non-Unicode data; no
///   partial map is returned
pub fn snapshot() -> EnvResult<BTreeMap<String, String>> {
    let _guard = lock_env();
    trace!("capturing environment snapshot");
    let vars = platform::snapshot()?;
    debug!(count = vars.len(), "captured environment snapshot");
    Ok(vars)
}
