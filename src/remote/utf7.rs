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

//! IMAP's "modified UTF-7" (RFC 3501 section 5.1.3), encoding only.
//!
//! Mailbox names go out in this form so that servers which only accept
//! 7-bit quoted strings can still be asked about non-ASCII mailboxes.

use std::borrow::Cow;

const SHIFT_IN: u8 = b'&';

/// Encode `name` for use as an IMAP mailbox name.
///
/// Printable ASCII other than `&` is passed through. `&` becomes `&-` and
/// every other run of characters becomes `&<base64 of UTF-16BE>-`, with `,`
/// in place of `/`.
pub fn encode(name: &str) -> Cow<'_, str> {
    if name.bytes().all(|b| is_direct(b) && SHIFT_IN != b) {
        return Cow::Borrowed(name);
    }

    let mut encoded = String::with_capacity(name.len() + 8);
    let mut pending = String::new();
    for ch in name.chars() {
        if ch.is_ascii() && is_direct(ch as u8) {
            flush(&mut encoded, &mut pending);
            if SHIFT_IN == ch as u8 {
                encoded.push_str("&-");
            } else {
                encoded.push(ch);
            }
        } else {
            pending.push(ch);
        }
    }
    flush(&mut encoded, &mut pending);

    Cow::Owned(encoded)
}

fn flush(dst: &mut String, pending: &mut String) {
    if pending.is_empty() {
        return;
    }

    let mut utf16be = Vec::with_capacity(pending.len() * 2);
    for unit in pending.encode_utf16() {
        utf16be.extend_from_slice(&unit.to_be_bytes());
    }

    dst.push(SHIFT_IN as char);
    dst.push_str(&base64::encode_config(&utf16be, base64::IMAP_MUTF7));
    dst.push('-');
    pending.clear();
}

fn is_direct(byte: u8) -> bool {
    byte >= b' ' && byte < 0x7F
}
