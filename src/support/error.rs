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

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while inspecting a single store.
///
/// None of these is fatal to the run; the dispatcher reports the error and
/// moves on to the next store.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unable to expand '{0}': too many nested $(...) references")]
    MalformedPath(String),
    #[error("'{0}' is neither a local mailbox nor a pop3:/imap: mailbox")]
    NoSuchStore(String),
    #[error("{} is not a valid maildir -- skipping", .0.display())]
    NotAMaildir(PathBuf),
    #[error("Error reading {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Unable to get login information for {0}")]
    LoginInfo(String),
    #[error("Not connected to server '{host}:{port}': {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },
    #[error("{reason} '{endpoint}'; server said: {response}")]
    Auth {
        endpoint: Endpoint,
        reason: AuthFailure,
        response: String,
    },
    #[error("Error receiving stats '{endpoint}': {detail}")]
    Protocol { endpoint: Endpoint, detail: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub fn protocol(endpoint: &Endpoint, detail: impl Into<String>) -> Self {
        Error::Protocol {
            endpoint: endpoint.clone(),
            detail: detail.into(),
        }
    }
}

/// Identifies a remote login in diagnostics, as `user@host:port`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    pub user: String,
    pub host: String,
    pub port: u16,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}@{}:{}", self.user, self.host, self.port)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthFailure {
    /// POP3 rejected `USER`.
    BadUserName,
    /// POP3 rejected `PASS`.
    BadPassword,
    /// IMAP rejected `LOGIN`.
    LoginRejected,
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            AuthFailure::BadUserName => "Invalid user name",
            AuthFailure::BadPassword => "Incorrect password for user",
            AuthFailure::LoginRejected => "Unable to check IMAP mailbox",
        })
    }
}
