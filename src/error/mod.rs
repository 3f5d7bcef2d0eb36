// osenv: Process Environment Access
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!                        EnvError
//!                           |
//!   +---------+---------+---+------+-----------+----------+
//!   v         v         v         v           v          v
//! NotFound  Invalid  Invalid  NotUnicode  Platform    Block
//!           Name     Value                Rejected  Unavailable
//!  get      any op   set      get/snap    set/unset  snapshot
//!                                         io::Error
//!
//! code():  PlatformRejected -> Some(errno / last-error)
//!          everything else  -> None ("no code available")
//! ```

use thiserror::Error;

/// Result type using [`EnvError`].
pub type EnvResult<T> = std::result::Result<T, EnvError>;

/// Failure of a single environment operation.
///
/// Every operation either succeeds or produces exactly one of these values;
/// nothing is retried or swallowed inside the crate, and no variant encodes
/// partial success.
#[derive(Debug, Error)]
pub enum EnvError {
    /// The variable is not present in the process environment.
    ///
    /// On Windows this also covers a variable set to the empty string: the
    /// native query reports both the same way, and the conflation is kept
    /// as-is rather than papered over.
    #[error("environment variable '{name}' is not set")]
    NotFound {
        /// The requested variable name.
        name: String,
    },

    /// The name was rejected before any platform call was made.
    ///
    /// Names must be non-empty and free of `=` and NUL bytes; the check runs
    /// identically on every platform.
    #[error("invalid environment variable name '{name}': {reason}")]
    InvalidName {
        /// The offending name.
        name: String,
        /// Which rule the name broke.
        reason: &'static str,
    },

    /// The value was rejected before any platform call was made.
    ///
    /// A NUL byte cannot cross the native string boundary on any platform.
    #[error("invalid value for environment variable '{name}': {reason}")]
    InvalidValue {
        /// The variable the value was meant for.
        name: String,
        /// Which rule the value broke.
        reason: &'static str,
    },

    /// The platform-reported data cannot be represented as a `String`.
    ///
    /// The crate never converts lossily; a variable holding non-UTF-8 bytes
    /// (POSIX) or unpaired surrogates (Windows) is surfaced as this error.
    #[error("environment variable '{name}' does not hold valid Unicode data")]
    NotUnicode {
        /// The variable name, rendered lossily if it was itself non-Unicode.
        name: String,
    },

    /// The OS refused the operation.
    #[error("platform call '{call}' failed: {source}")]
    PlatformRejected {
        /// The native entry point that failed.
        call: &'static str,
        /// The OS error, built from `errno` or the thread's last-error code.
        #[source]
        source: std::io::Error,
    },

    /// The platform did not hand out the environment block.
    ///
    /// The native snapshot call supplies no error code, so [`EnvError::code`]
    /// is `None` for this variant.
    #[error("platform call '{call}' returned no environment block")]
    BlockUnavailable {
        /// The native entry point that failed.
        call: &'static str,
    },
}

impl EnvError {
    /// The platform error code, when the platform supplied one.
    ///
    /// `Some(errno)` on POSIX and `Some(last_error)` on Windows for
    /// [`EnvError::PlatformRejected`]; `None` for every failure detected
    /// without a platform code (validation, lookup misses, a missing
    /// environment block).
    #[must_use]
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::PlatformRejected { source, .. } => source.raw_os_error(),
            _ => None,
        }
    }
}
