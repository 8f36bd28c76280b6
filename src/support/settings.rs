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

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::warn;
use serde::Deserialize;

/// Optional user settings for Mailcheck.
///
/// These are read from `~/.mailcheck.toml` (or the file given by
/// `--settings`). The list of mailboxes itself lives in the run-control
/// file, not here.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Settings {
    /// Limits for POP3 and IMAP connections.
    #[serde(default)]
    pub network: NetworkConfig,

    /// Where to find passwords for remote mailboxes.
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// How long to wait for a TCP connection to be established, in seconds.
    pub connect_timeout_secs: u64,
    /// How long to wait for any single read or write on an established
    /// connection, in seconds.
    ///
    /// A server that stops responding would otherwise hold up every
    /// mailbox after it.
    pub read_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            connect_timeout_secs: 30,
            read_timeout_secs: 30,
        }
    }
}

impl NetworkConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(1))
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs.max(1))
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CredentialsConfig {
    /// The netrc-format secrets file. Relative paths are taken relative to
    /// the home directory.
    ///
    /// Defaults to `~/.netrc`.
    #[serde(default)]
    pub netrc: Option<PathBuf>,
}

impl CredentialsConfig {
    pub fn netrc_path(&self, home: &Path) -> PathBuf {
        match self.netrc {
            Some(ref path) => home.join(path),
            None => home.join(".netrc"),
        }
    }
}

impl Settings {
    /// Load the settings at `path`.
    ///
    /// A missing file yields the defaults. A file that cannot be read or
    /// parsed is reported and also yields the defaults, since bad settings
    /// must not keep the user from hearing about their mail.
    pub fn load(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if io::ErrorKind::NotFound == e.kind() => {
                return Settings::default()
            }
            Err(e) => {
                warn!("Error reading '{}': {}", path.display(), e);
                return Settings::default();
            }
        };

        match toml::from_str(&text) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(
                    "Error in settings file at '{}': {}; using defaults",
                    path.display(),
                    e
                );
                Settings::default()
            }
        }
    }
}
