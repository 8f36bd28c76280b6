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

//! Password lookup in a netrc-format secrets file.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::os::unix::fs::MetadataExt;
use std::path::PathBuf;

use log::{debug, warn};

/// One `machine` (or `default`) block of a netrc file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NetrcEntry {
    /// `None` for the `default` entry.
    pub machine: Option<String>,
    pub login: Option<String>,
    pub password: Option<String>,
}

impl NetrcEntry {
    fn matches(&self, account: &str) -> bool {
        self.password.is_some()
            && self.login.as_deref().map_or(true, |login| login == account)
    }
}

/// Parse the text of a netrc file.
///
/// `account` values are ignored and `macdef` bodies are skipped without
/// being interpreted.
pub fn parse(text: &str) -> Vec<NetrcEntry> {
    let mut tokens = Tokens { rest: text };
    let mut entries = Vec::new();
    let mut current: Option<NetrcEntry> = None;

    while let Some(token) = tokens.next() {
        match &*token {
            "machine" => {
                entries.extend(current.take());
                current = Some(NetrcEntry {
                    machine: Some(tokens.next().unwrap_or_default()),
                    ..NetrcEntry::default()
                });
            }
            "default" => {
                entries.extend(current.take());
                current = Some(NetrcEntry::default());
            }
            "login" => {
                let login = tokens.next();
                if let Some(ref mut entry) = current {
                    entry.login = login;
                }
            }
            "password" => {
                let password = tokens.next();
                if let Some(ref mut entry) = current {
                    entry.password = password;
                }
            }
            "account" => {
                tokens.next();
            }
            "macdef" => {
                tokens.next();
                tokens.skip_macro_body();
            }
            _ => (),
        }
    }

    entries.extend(current);
    entries
}

/// Find the password for `account` on `host`.
///
/// The first `machine` block for `host` whose login matches wins; failing
/// that, a `default` block is used.
pub fn search<'a>(
    entries: &'a [NetrcEntry],
    host: &str,
    account: &str,
) -> Option<&'a str> {
    entries
        .iter()
        .find(|e| e.machine.as_deref() == Some(host) && e.matches(account))
        .or_else(|| {
            entries
                .iter()
                .find(|e| e.machine.is_none() && e.matches(account))
        })
        .and_then(|e| e.password.as_deref())
}

struct Tokens<'a> {
    rest: &'a str,
}

impl Tokens<'_> {
    fn next(&mut self) -> Option<String> {
        self.rest = self.rest.trim_start();
        if self.rest.is_empty() {
            return None;
        }

        if let Some(quoted) = self.rest.strip_prefix('"') {
            let mut token = String::new();
            let mut chars = quoted.char_indices();
            let mut consumed = quoted.len();
            while let Some((ix, ch)) = chars.next() {
                match ch {
                    '"' => {
                        consumed = ix + 1;
                        break;
                    }
                    '\\' => {
                        if let Some((_, escaped)) = chars.next() {
                            token.push(escaped);
                        }
                    }
                    ch => token.push(ch),
                }
            }

            self.rest = &quoted[consumed..];
            return Some(token);
        }

        let end = self
            .rest
            .find(char::is_whitespace)
            .unwrap_or_else(|| self.rest.len());
        let token = self.rest[..end].to_owned();
        self.rest = &self.rest[end..];
        Some(token)
    }

    /// Skip the rest of the `macdef` line, then the macro body up to and
    /// including the first line which is blank once trimmed.
    fn skip_macro_body(&mut self) {
        let mut rest = match self.rest.find('\n') {
            Some(nl) => &self.rest[nl + 1..],
            None => "",
        };

        while !rest.is_empty() {
            let (line, after) = match rest.find('\n') {
                Some(nl) => (&rest[..nl], &rest[nl + 1..]),
                None => (rest, ""),
            };
            rest = after;
            if line.trim().is_empty() {
                break;
            }
        }

        self.rest = rest;
    }
}

/// Lazily loaded, per-run view of the secrets file.
///
/// The file is read at most once, and each (host, account) pair is resolved
/// at most once.
pub struct Credentials {
    path: PathBuf,
    entries: Option<Vec<NetrcEntry>>,
    cache: HashMap<(String, String), Option<String>>,
    permission_warning_issued: bool,
    unreadable_warning_issued: bool,
}

impl Credentials {
    pub fn new(path: PathBuf) -> Self {
        Credentials {
            path,
            entries: None,
            cache: HashMap::new(),
            permission_warning_issued: false,
            unreadable_warning_issued: false,
        }
    }

    /// Look up the password for `account` on `host`.
    ///
    /// Any problem with the secrets file results in `None`; it is up to the
    /// caller to decide what a missing password means.
    pub fn lookup(&mut self, host: &str, account: &str) -> Option<String> {
        let key = (host.to_owned(), account.to_owned());
        if let Some(cached) = self.cache.get(&key) {
            return cached.clone();
        }

        let password = search(self.entries(), host, account).map(str::to_owned);
        debug!(
            "{} password for {}@{} in {}",
            if password.is_some() { "Found" } else { "No" },
            account,
            host,
            self.path.display()
        );

        self.cache.insert(key, password.clone());
        password
    }

    fn entries(&mut self) -> &[NetrcEntry] {
        if self.entries.is_none() {
            let loaded = self.load();
            self.entries = Some(loaded);
        }

        self.entries.as_deref().unwrap_or(&[])
    }

    fn load(&mut self) -> Vec<NetrcEntry> {
        let md = match fs::metadata(&self.path) {
            Ok(md) => md,
            Err(e) if io::ErrorKind::NotFound == e.kind() => return Vec::new(),
            Err(e) => {
                self.warn_unreadable(&e);
                return Vec::new();
            }
        };

        if 0 != md.mode() & 0o077 && !self.permission_warning_issued {
            self.permission_warning_issued = true;
            warn!(
                "WARNING! {path} may be readable by other users.\n\
                 Type \"chmod 0600 {path}\" to correct the permissions.",
                path = self.path.display()
            );
        }

        match fs::read_to_string(&self.path) {
            Ok(text) => parse(&text),
            Err(e) => {
                self.warn_unreadable(&e);
                Vec::new()
            }
        }
    }

    fn warn_unreadable(&mut self, e: &io::Error) {
        if !self.unreadable_warning_issued {
            self.unreadable_warning_issued = true;
            warn!(
                "WARNING! {} could not be read: {}",
                self.path.display(),
                e
            );
        }
    }
}

#[cfg(test)]
mod test {
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    use tempfile::TempDir;

    use super::*;

    fn chmod(path: &Path, mode: u32) -> io::Result<()> {
        fs::set_permissions(path, fs::Permissions::from_mode(mode))
    }

    #[test]
    fn parse_netrc() {
        let entries = parse(
            "machine pop.example.com login alice password s3cret\n\
             machine imap.example.com\n\
             \tlogin bob\n\
             \taccount ignored\n\
             \tpassword \"two words\"\n\
             macdef init\n\
             machine evil.example.com login alice password macro\n\
             \n\
             default login anonymous password guest\n",
        );

        assert_eq!(
            vec![
                NetrcEntry {
                    machine: Some("pop.example.com".to_owned()),
                    login: Some("alice".to_owned()),
                    password: Some("s3cret".to_owned()),
                },
                NetrcEntry {
                    machine: Some("imap.example.com".to_owned()),
                    login: Some("bob".to_owned()),
                    password: Some("two words".to_owned()),
                },
                NetrcEntry {
                    machine: None,
                    login: Some("anonymous".to_owned()),
                    password: Some("guest".to_owned()),
                },
            ],
            entries
        );
    }

    #[test]
    fn macro_body_ends_at_any_blank_line() {
        let crlf = parse(
            "macdef init\r\n\
             machine evil.example.com password macro\r\n\
             \r\n\
             machine mail.example.com login alice password pw\r\n",
        );
        assert_eq!(Some("pw"), search(&crlf, "mail.example.com", "alice"));
        assert_eq!(None, search(&crlf, "evil.example.com", "alice"));

        let spaces = parse(
            "macdef init\n\
             cd /pub\n   \t\n\
             machine mail.example.com login alice password pw\n",
        );
        assert_eq!(Some("pw"), search(&spaces, "mail.example.com", "alice"));

        let unterminated = parse(
            "machine mail.example.com login alice password pw\n\
             macdef init\n\
             machine evil.example.com password macro\n",
        );
        assert_eq!(1, unterminated.len());
    }

    #[test]
    fn search_prefers_matching_machine_and_login() {
        let entries = parse(
            "machine mail.example.com login alice password a1\n\
             machine mail.example.com login bob password b1\n\
             machine other.example.com password anyone\n\
             default password fallback\n",
        );

        assert_eq!(Some("a1"), search(&entries, "mail.example.com", "alice"));
        assert_eq!(Some("b1"), search(&entries, "mail.example.com", "bob"));
        assert_eq!(
            Some("anyone"),
            search(&entries, "other.example.com", "carol")
        );
        assert_eq!(
            Some("fallback"),
            search(&entries, "mail.example.com", "carol")
        );
        assert_eq!(None, search(&entries[..2], "mail.example.com", "carol"));
    }

    #[test]
    fn quoted_token_escapes() {
        let entries = parse(r#"machine h login u password "a\"b\\c""#);
        assert_eq!(Some("a\"b\\c"), search(&entries, "h", "u"));
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let mut credentials = Credentials::new(dir.path().join(".netrc"));
        assert_eq!(None, credentials.lookup("mail.example.com", "alice"));
        assert!(!credentials.permission_warning_issued);
        assert!(!credentials.unreadable_warning_issued);
    }

    #[test]
    fn lookup_reads_file_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".netrc");
        fs::write(&path, "machine mail.example.com login alice password pw\n")
            .unwrap();
        chmod(&path, 0o600).unwrap();

        let mut credentials = Credentials::new(path.clone());
        assert_eq!(
            Some("pw".to_owned()),
            credentials.lookup("mail.example.com", "alice")
        );
        assert!(!credentials.permission_warning_issued);

        // Later changes to the file are not seen within the same run.
        fs::write(&path, "machine mail.example.com login alice password new\n")
            .unwrap();
        assert_eq!(
            Some("pw".to_owned()),
            credentials.lookup("mail.example.com", "alice")
        );
        assert_eq!(None, credentials.lookup("other.example.com", "alice"));
    }

    #[test]
    fn exposed_file_warns_once_and_is_still_used() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".netrc");
        fs::write(
            &path,
            "machine a.example.com login alice password pa\n\
             machine b.example.com login alice password pb\n",
        )
        .unwrap();
        chmod(&path, 0o644).unwrap();

        let mut credentials = Credentials::new(path);
        assert_eq!(
            Some("pa".to_owned()),
            credentials.lookup("a.example.com", "alice")
        );
        assert!(credentials.permission_warning_issued);
        assert_eq!(
            Some("pb".to_owned()),
            credentials.lookup("b.example.com", "alice")
        );
    }
}
