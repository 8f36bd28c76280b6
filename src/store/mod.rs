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

//! Local mail stores and the classification of store specs.

use std::fs;
use std::path::Path;

use crate::remote::spec::Protocol;

pub mod dispatch;
pub mod maildir;
pub mod mbox;

/// Message counts for one store.
///
/// What "read" means depends on the kind of store: for mbox, maildir and
/// IMAP it means the message is marked as seen; for POP3 it means the
/// message is at or before the server's `LAST` marker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InspectionResult {
    pub new: usize,
    pub read: usize,
    pub unread: usize,
}

impl InspectionResult {
    /// Whether this store has anything the user hasn't dealt with yet.
    pub fn has_mail(&self) -> bool {
        self.new > 0 || self.unread > 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreKind {
    Mbox,
    Maildir,
    Pop3,
    Imap,
    Invalid,
}

/// Decide what kind of store `resolved` names.
///
/// Anything that exists locally wins over the scheme prefix, so a directory
/// literally named `imap:foo` is still treated as a maildir.
pub fn classify(resolved: &str) -> StoreKind {
    match fs::metadata(Path::new(resolved)) {
        Ok(md) if md.is_dir() => StoreKind::Maildir,
        Ok(md) if md.is_file() => StoreKind::Mbox,
        Ok(_) => StoreKind::Invalid,
        Err(_) => match Protocol::of_spec(resolved) {
            Some(Protocol::Pop3) => StoreKind::Pop3,
            Some(Protocol::Imap) => StoreKind::Imap,
            None => StoreKind::Invalid,
        },
    }
}
