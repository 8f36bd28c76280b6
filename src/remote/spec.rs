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

use log::warn;

use crate::support::error::{Endpoint, Error};
use crate::support::expand::Environment;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Protocol {
    Pop3,
    Imap,
}

impl Protocol {
    /// Determine the protocol from the scheme prefix of `spec`.
    pub fn of_spec(spec: &str) -> Option<Self> {
        if spec.starts_with("pop3:") {
            Some(Protocol::Pop3)
        } else if spec.starts_with("imap:") {
            Some(Protocol::Imap)
        } else {
            None
        }
    }

    pub fn scheme(self) -> &'static str {
        match self {
            Protocol::Pop3 => "pop3",
            Protocol::Imap => "imap",
        }
    }

    pub fn default_port(self) -> u16 {
        match self {
            Protocol::Pop3 => super::pop3::DEFAULT_PORT,
            Protocol::Imap => super::imap::DEFAULT_PORT,
        }
    }
}

/// A parsed `pop3:` or `imap:` store.
///
/// The accepted form is
/// `scheme:[//][user[:password]@]host[:port][/mailbox]`.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteSpec {
    pub protocol: Protocol,
    pub host: String,
    pub port: u16,
    /// Only meaningful for IMAP.
    pub mailbox: String,
    pub user: String,
    /// A password given inline; otherwise the secrets file is consulted.
    pub password: Option<String>,
}

impl RemoteSpec {
    pub fn parse(spec: &str, env: &dyn Environment) -> Result<Self, Error> {
        let protocol = Protocol::of_spec(spec)
            .ok_or_else(|| Error::NoSuchStore(spec.to_owned()))?;

        let rest = spec[protocol.scheme().len() + 1..].trim_start_matches('/');
        let (authority, mailbox) = match rest.find('/') {
            Some(slash) => (&rest[..slash], &rest[slash + 1..]),
            None => (rest, ""),
        };

        // The last @ ends the user part, so that logins which are
        // themselves e-mail addresses need no escaping.
        let (userinfo, hostport) = match authority.rfind('@') {
            Some(at) => (Some(&authority[..at]), &authority[at + 1..]),
            None => (None, authority),
        };

        let login_info_error =
            || Error::LoginInfo(format!("{}://{}", protocol.scheme(), hostport));

        let (user, password) = match userinfo {
            Some(info) => match info.find(':') {
                Some(colon) => {
                    (info[..colon].to_owned(), Some(info[colon + 1..].to_owned()))
                }
                None => (info.to_owned(), None),
            },
            None => (env.login_name().unwrap_or_default(), None),
        };

        let (host, port) = match hostport.find(':') {
            Some(colon) => {
                let port_text = &hostport[colon + 1..];
                let port = match port_text.parse::<u16>() {
                    Ok(port) if port > 0 => port,
                    _ => {
                        warn!(
                            "Ignoring invalid port '{}' for {}; using {}",
                            port_text,
                            &hostport[..colon],
                            protocol.default_port()
                        );
                        protocol.default_port()
                    }
                };
                (&hostport[..colon], port)
            }
            None => (hostport, protocol.default_port()),
        };

        if user.is_empty() || host.is_empty() {
            return Err(login_info_error());
        }

        Ok(RemoteSpec {
            protocol,
            host: host.to_owned(),
            port,
            mailbox: if mailbox.is_empty() {
                "INBOX".to_owned()
            } else {
                mailbox.to_owned()
            },
            user,
            password,
        })
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint {
            user: self.user.clone(),
            host: self.host.clone(),
            port: self.port,
        }
    }
}

// Never shows the password, so specs can be logged and printed freely.
impl fmt::Display for RemoteSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}://{}@{}:{}",
            self.protocol.scheme(),
            self.user,
            self.host,
            self.port
        )?;
        if Protocol::Imap == self.protocol {
            write!(f, "/{}", self.mailbox)?;
        }
        Ok(())
    }
}

impl fmt::Debug for RemoteSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RemoteSpec")
            .field("protocol", &self.protocol)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("mailbox", &self.mailbox)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<censored>"))
            .finish()
    }
}
