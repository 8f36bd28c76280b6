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

//! Just enough IMAP to count messages: `LOGIN`, `STATUS`, `LOGOUT`.
//!
//! **THIS IS NOT A GENERAL-PURPOSE IMAP CLIENT.** Responses are handled a
//! line at a time; literals are not understood, which is fine for the three
//! commands used here.

use std::borrow::Cow;
use std::io::{self, BufRead, Write};

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use super::client::LineClient;
use super::utf7;
use crate::store::InspectionResult;
use crate::support::error::{AuthFailure, Endpoint, Error};

pub const DEFAULT_PORT: u16 = 143;

lazy_static! {
    /// An untagged STATUS response. The attribute list is the last
    /// parenthesised group, since the mailbox name before it may itself
    /// contain anything.
    static ref STATUS_RESPONSE: Regex =
        Regex::new(r"(?i)^\*\s+STATUS\s.*\(([^()]*)\)\s*$").unwrap();
}

/// Log in as `endpoint.user` and count the messages in `mailbox`.
///
/// Unseen messages are reported as both new and unread, since IMAP has
/// only the one notion; the rest are read.
pub fn inspect<R: BufRead, W: Write>(
    client: &mut LineClient<R, W>,
    endpoint: &Endpoint,
    mailbox: &str,
    password: &str,
) -> Result<InspectionResult, Error> {
    let mut session = Session {
        client,
        endpoint,
        next_tag: 1,
    };

    let greeting = session.client.read_line().map_err(|e| session.net(e))?;
    debug!("{}: greeting: {}", endpoint, greeting);

    let result = session
        .log_in(password)
        .and_then(|()| session.status(mailbox));
    session.log_out();
    result
}

struct Session<'a, R, W> {
    client: &'a mut LineClient<R, W>,
    endpoint: &'a Endpoint,
    next_tag: u32,
}

/// The responses to one tagged command.
struct Responses {
    tag: String,
    untagged: Vec<String>,
    completion: String,
}

impl Responses {
    fn is_ok(&self) -> bool {
        let rest = match self
            .completion
            .strip_prefix(self.tag.as_str())
            .and_then(|rest| rest.strip_prefix(' '))
        {
            Some(rest) => rest,
            None => return false,
        };

        rest.split(' ')
            .next()
            .map_or(false, |cond| cond.eq_ignore_ascii_case("OK"))
    }
}

impl<R: BufRead, W: Write> Session<'_, R, W> {
    fn net(&self, e: io::Error) -> Error {
        Error::protocol(self.endpoint, format!("Connection lost: {}", e))
    }

    /// Send `command` under a fresh tag and collect responses up to the
    /// first line which isn't untagged.
    ///
    /// Only the first `visible` bytes of `command` are traced.
    fn command(
        &mut self,
        command: &str,
        visible: usize,
    ) -> Result<Responses, Error> {
        let tag = format!("a{:03}", self.next_tag);
        self.next_tag += 1;

        let line = format!("{} {}", tag, command);
        self.client
            .send_censored(&line, tag.len() + 1 + visible)
            .map_err(|e| self.net(e))?;

        let mut untagged = Vec::new();
        loop {
            let response = self.client.read_line().map_err(|e| self.net(e))?;
            if response.starts_with('*') {
                untagged.push(response);
            } else {
                return Ok(Responses {
                    tag,
                    untagged,
                    completion: response,
                });
            }
        }
    }

    fn log_in(&mut self, password: &str) -> Result<(), Error> {
        let endpoint = self.endpoint;
        let user = astring(&endpoint.user);
        let command = format!("LOGIN {} {}", user, astring(password));
        let responses = self.command(&command, "LOGIN ".len() + user.len())?;

        if responses.is_ok() {
            Ok(())
        } else {
            Err(Error::Auth {
                endpoint: endpoint.clone(),
                reason: AuthFailure::LoginRejected,
                response: responses.completion,
            })
        }
    }

    fn status(&mut self, mailbox: &str) -> Result<InspectionResult, Error> {
        let command = format!(
            "STATUS {} (MESSAGES UNSEEN)",
            astring(&utf7::encode(mailbox))
        );
        let responses = self.command(&command, command.len())?;

        let counts = responses
            .untagged
            .iter()
            .find_map(|line| status_counts(line));

        let (total, unseen) = match counts {
            Some(counts) => counts,
            None => {
                return Err(Error::protocol(
                    self.endpoint,
                    format!(
                        "No STATUS data for {}: {}",
                        mailbox,
                        responses
                            .untagged
                            .first()
                            .unwrap_or(&responses.completion)
                    ),
                ))
            }
        };

        if unseen > total {
            return Err(Error::protocol(
                self.endpoint,
                format!("{} unseen of only {} messages", unseen, total),
            ));
        }

        Ok(InspectionResult {
            new: unseen,
            read: total - unseen,
            unread: unseen,
        })
    }

    fn log_out(&mut self) {
        let tag = format!("a{:03}", self.next_tag);
        self.next_tag += 1;
        let _ = self.client.send(&format!("{} LOGOUT", tag));
    }
}

/// Extract `(MESSAGES, UNSEEN)` from an untagged STATUS response.
fn status_counts(line: &str) -> Option<(usize, usize)> {
    let attributes = STATUS_RESPONSE.captures(line)?.get(1)?.as_str();

    let mut total = None;
    let mut unseen = None;
    let mut words = attributes.split_whitespace();
    while let (Some(name), Some(value)) = (words.next(), words.next()) {
        let value = value.parse::<usize>().ok();
        if name.eq_ignore_ascii_case("MESSAGES") {
            total = value;
        } else if name.eq_ignore_ascii_case("UNSEEN") {
            unseen = value;
        }
    }

    Some((total?, unseen?))
}

/// Format `s` as an IMAP astring: bare if it is a valid atom, quoted
/// otherwise.
fn astring(s: &str) -> Cow<'_, str> {
    let is_atom = !s.is_empty()
        && s.bytes().all(|b| {
            b > b' ' && b < 0x7F && !b"(){%*\"\\]".contains(&b)
        });

    if is_atom {
        return Cow::Borrowed(s);
    }

    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for ch in s.chars() {
        if '"' == ch || '\\' == ch {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    Cow::Owned(quoted)
}
