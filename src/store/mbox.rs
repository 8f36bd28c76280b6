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

//! Counting messages in a single-file mbox mailbox.

use std::fs;
use std::io::{self, BufRead};
use std::path::Path;

use super::InspectionResult;
use crate::support::error::Error;

const FROM_LINE: &[u8] = b"From ";
const STATUS_HEADER: &[u8] = b"Status: ";

/// Count the new, read and unread messages in the mbox at `path`.
pub fn inspect(path: &Path) -> Result<InspectionResult, Error> {
    let file = fs::File::open(path).map_err(|e| Error::io(path, e))?;
    scan(io::BufReader::new(file)).map_err(|e| Error::io(path, e))
}

/// Count messages read from `reader`.
///
/// Every `From ` line starts a message, which is new until a `Status:`
/// header in its header block says otherwise. Lines are handled as raw
/// bytes since message bodies are under no obligation to be UTF-8.
pub fn scan(mut reader: impl BufRead) -> io::Result<InspectionResult> {
    let mut counts = InspectionResult::default();
    let mut in_header = false;
    // Whether the current message is still counted under `new`. A message
    // is reclassified at most once, which keeps `new` from going negative
    // when a message carries several Status headers.
    let mut provisional = false;
    let mut line = Vec::new();

    loop {
        line.clear();
        if 0 == reader.read_until(b'\n', &mut line)? {
            break;
        }

        if line.starts_with(FROM_LINE) {
            counts.new += 1;
            in_header = true;
            provisional = true;
            continue;
        }

        if !in_header {
            continue;
        }

        if line == b"\n" || line == b"\r\n" {
            in_header = false;
        } else if provisional && line.starts_with(STATUS_HEADER) {
            let flags = &line[STATUS_HEADER.len()..];
            let flags = &flags[..flags.len().min(2)];
            let seen = flags.contains(&b'R');
            let old = flags.contains(&b'O');

            if old {
                counts.new -= 1;
                provisional = false;
                if seen {
                    counts.read += 1;
                } else {
                    counts.unread += 1;
                }
            }
        }
    }

    Ok(counts)
}
