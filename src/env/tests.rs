// osenv: Process Environment Access
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for the environment module's pure logic.
//!
//! Everything here stays away from the live process environment; the
//! operations against real variables live in the integration tests.

use super::parse::split_entry;
use super::{get, set, unset};
use crate::error::EnvError;

#[cfg(windows)]
use super::windows::{QueryRound, classify_round, requery_with};
#[cfg(windows)]
use windows::Win32::Foundation::ERROR_ENVVAR_NOT_FOUND;

#[test]
fn test_split_entry_basic() {
    assert_eq!(split_entry("KEY=VALUE"), Some(("KEY", "VALUE")));
}

#[test]
fn test_split_entry_splits_at_first_equals() {
    assert_eq!(split_entry("LS_COLORS=di=34:ln=35"), Some(("LS_COLORS", "di=34:ln=35")));
}

#[test]
fn test_split_entry_empty_value() {
    assert_eq!(split_entry("KEY="), Some(("KEY", "")));
}

#[test]
fn test_split_entry_drive_cwd_entry() {
    // Windows keeps per-drive working directories under names like "=C:"
    assert_eq!(split_entry("=C:=C:\\Users\\dev"), None);
}

#[test]
fn test_split_entry_without_equals() {
    assert_eq!(split_entry("JUSTANAME"), None);
}

#[test]
fn test_split_entry_empty() {
    assert_eq!(split_entry(""), None);
}

#[test]
fn test_get_rejects_empty_name() {
    let err = get("").unwrap_err();
    match err {
        EnvError::InvalidName { name, reason } => {
            assert_eq!(name, "");
            assert_eq!(reason, "name is empty");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_get_rejects_name_with_equals() {
    let err = get("KEY=VALUE").unwrap_err();
    match err {
        EnvError::InvalidName { name, reason } => {
            assert_eq!(name, "KEY=VALUE");
            assert_eq!(reason, "name contains '='");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_set_rejects_name_with_nul() {
    let err = set("BAD\0NAME", "value").unwrap_err();
    assert!(matches!(err, EnvError::InvalidName { .. }));
}

#[test]
fn test_set_rejects_value_with_nul() {
    let err = set("OSENV_UNIT_NUL_VALUE", "a\0b").unwrap_err();
    match err {
        EnvError::InvalidValue { name, reason } => {
            assert_eq!(name, "OSENV_UNIT_NUL_VALUE");
            assert_eq!(reason, "value contains a NUL byte");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_unset_rejects_empty_name() {
    let err = unset("").unwrap_err();
    assert!(matches!(err, EnvError::InvalidName { .. }));
}

#[test]
fn test_validation_failures_carry_no_platform_code() {
    assert_eq!(get("").unwrap_err().code(), None);
    assert_eq!(set("A=B", "x").unwrap_err().code(), None);
    assert_eq!(unset("BAD\0").unwrap_err().code(), None);
}

#[test]
#[cfg(windows)]
fn test_classify_fit_below_capacity() {
    // 255 written units plus the terminator exactly fill the probe buffer
    assert_eq!(classify_round(255, 256, 0), QueryRound::Fit { len: 255 });
}

#[test]
#[cfg(windows)]
fn test_classify_grow_at_capacity() {
    assert_eq!(classify_round(256, 256, 0), QueryRound::Grow { required: 256 });
}

#[test]
#[cfg(windows)]
fn test_classify_grow_past_capacity() {
    assert_eq!(classify_round(257, 256, 0), QueryRound::Grow { required: 257 });
}

#[test]
#[cfg(windows)]
fn test_classify_missing_when_not_found_reported() {
    assert_eq!(
        classify_round(0, 256, ERROR_ENVVAR_NOT_FOUND.0),
        QueryRound::Missing
    );
}

#[test]
#[cfg(windows)]
fn test_classify_missing_when_error_slot_clear() {
    // An empty-string value reports zero length and leaves the cleared slot
    assert_eq!(classify_round(0, 256, 0), QueryRound::Missing);
}

#[test]
#[cfg(windows)]
fn test_classify_failed_with_other_code() {
    assert_eq!(classify_round(0, 256, 5), QueryRound::Failed { code: 5 });
}

#[test]
#[cfg(windows)]
fn test_requery_grows_until_the_value_fits() {
    // the value grows once between the rounds before it finally fits
    let mut rounds = [
        QueryRound::Grow { required: 320 },
        QueryRound::Fit { len: 319 },
    ]
    .into_iter();
    let mut capacities = Vec::new();

    let units = requery_with("OSENV_GROWN", 300, |buffer| {
        capacities.push(buffer.len());
        buffer.fill(0x41);
        rounds.next().unwrap()
    })
    .unwrap();

    assert_eq!(capacities, [300, 320]);
    assert_eq!(units.len(), 319);
    assert!(units.iter().all(|&u| u == 0x41));
}

#[test]
#[cfg(windows)]
fn test_requery_reports_a_vanished_variable() {
    let err = requery_with("OSENV_VANISHED", 300, |_| QueryRound::Missing).unwrap_err();
    match err {
        EnvError::NotFound { name } => assert_eq!(name, "OSENV_VANISHED"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
#[cfg(windows)]
fn test_requery_failure_carries_the_platform_code() {
    let err = requery_with("OSENV_DENIED", 300, |_| QueryRound::Failed { code: 5 }).unwrap_err();
    assert_eq!(err.code(), Some(5));
    match err {
        EnvError::PlatformRejected { call, source } => {
            assert_eq!(call, "GetEnvironmentVariableW");
            assert_eq!(source.raw_os_error(), Some(5));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
