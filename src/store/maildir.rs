//-
// Copyright (c) 2026, the Mailcheck authors
//
// This file is part of Mailcheck.
//
// Mailcheck is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// Mailcheck is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for
// more details.
//
// You should have received a copy of the GNU General Public License along
// with Mailcheck. If not, see <http://www.gnu.org/licenses/>.

//! Counting messages in a maildir.
//!
//! Messages in `new/` are new. Messages in `cur/` are read or unread
//! depending on the `S` flag in the `:2,FLAGS` suffix of their file names.
//! `tmp/` is never looked at.

use std::fs;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use log::warn;

use super::InspectionResult;
use crate::support::error::Error;

/// The state of one message in `cur/`, as encoded in its file name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryState {
    Read,
    Unread,
    /// The info part uses something other than version 2 semantics.
    Unsupported,
}

/// Classify a `cur/` file name by its info suffix.
pub fn entry_state(name: &[u8]) -> EntryState {
    let info = match memchr::memchr(b':', name) {
        Some(colon) => &name[colon + 1..],
        None => return EntryState::Unread,
    };

    let version_end = memchr::memchr(b',', info).unwrap_or_else(|| info.len());
    if b"2" != &info[..version_end] {
        return EntryState::Unsupported;
    }

    if info[version_end..].contains(&b'S') {
        EntryState::Read
    } else {
        EntryState::Unread
    }
}

/// Count the messages in the maildir at `path`.
///
/// Both `new/` and `cur/` must exist, or the directory is not a maildir.
pub fn inspect(path: &Path) -> Result<InspectionResult, Error> {
    let new_dir = path.join("new");
    let cur_dir = path.join("cur");

    let (new_entries, cur_entries) =
        match (fs::read_dir(&new_dir), fs::read_dir(&cur_dir)) {
            (Ok(n), Ok(c)) => (n, c),
            _ => return Err(Error::NotAMaildir(path.to_owned())),
        };

    let mut counts = InspectionResult::default();

    for entry in new_entries {
        let entry = entry.map_err(|e| Error::io(&new_dir, e))?;
        if is_message(&entry) {
            counts.new += 1;
        }
    }

    for entry in cur_entries {
        let entry = entry.map_err(|e| Error::io(&cur_dir, e))?;
        if !is_message(&entry) {
            continue;
        }

        let name = entry.file_name();
        match entry_state(name.as_bytes()) {
            EntryState::Read => counts.read += 1,
            EntryState::Unread => counts.unread += 1,
            EntryState::Unsupported => warn!(
                "{}: unsupported maildir info in '{}' -- not counted",
                path.display(),
                name.to_string_lossy()
            ),
        }
    }

    Ok(counts)
}

/// Whether `entry` is a message file: a regular file whose name does not
/// start with a dot.
fn is_message(entry: &fs::DirEntry) -> bool {
    if entry.file_name().as_bytes().starts_with(b".") {
        return false;
    }

    // The type usually comes for free with the directory listing. Symlinks
    // and file systems that don't report a type need a stat().
    match entry.file_type() {
        Ok(ft) if ft.is_file() => true,
        Ok(ft) if ft.is_dir() => false,
        _ => fs::metadata(entry.path())
            .map(|md| md.is_file())
            .unwrap_or(false),
    }
}
