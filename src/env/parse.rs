// osenv: Process Environment Access
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `KEY=VALUE` entry parsing shared by the platform backends.

/// Splits one environment block entry at its first `=`.
///
/// The value keeps any further `=` characters untouched, so
/// `LS_COLORS=di=34` splits into `LS_COLORS` and `di=34`. Entries with an
/// empty name (the Windows per-drive working directory entries such as
/// `=C:=C:\Users`) and entries with no `=` at all are reported as `None`.
pub(super) fn split_entry(entry: &str) -> Option<(&str, &str)> {
    let eq_pos = entry.find('=')?;
    if eq_pos == 0 {
        return None;
    }
    Some((&entry[..eq_pos], &entry[eq_pos + 1..]))
}
