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

use std::path::Path;

use log::{debug, error, warn};

use super::{classify, maildir, mbox, InspectionResult, StoreKind};
use crate::remote::client;
use crate::remote::imap;
use crate::remote::pop3;
use crate::remote::spec::{Protocol, RemoteSpec};
use crate::support::error::Error;
use crate::support::expand::{expand, Environment};
use crate::support::netrc::Credentials;
use crate::support::settings::{NetworkConfig, Settings};

/// The outcome of checking one store.
#[derive(Debug)]
pub struct StoreReport {
    /// How the store is shown to the user. Never contains a password.
    pub store: String,
    pub kind: StoreKind,
    pub outcome: Result<InspectionResult, Error>,
}

/// State shared by all the stores checked in one run.
///
/// Stores are checked one at a time, in the order given. A failure is
/// logged and recorded in that store's report; it has no effect on the
/// stores after it.
pub struct Run<'a> {
    env: &'a dyn Environment,
    network: NetworkConfig,
    credentials: Credentials,
    mail_found: bool,
}

impl<'a> Run<'a> {
    pub fn new(
        env: &'a dyn Environment,
        settings: &Settings,
        home: &Path,
    ) -> Self {
        Run {
            env,
            network: settings.network.clone(),
            credentials: Credentials::new(
                settings.credentials.netrc_path(home),
            ),
            mail_found: false,
        }
    }

    /// Whether any store checked so far has new or unread mail.
    pub fn mail_found(&self) -> bool {
        self.mail_found
    }

    /// Check the store named by the run-control line `raw`.
    pub fn check(&mut self, raw: &str) -> StoreReport {
        let resolved = match expand(raw, self.env) {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!("{}; using it verbatim", e);
                raw.to_owned()
            }
        };

        let kind = classify(&resolved);
        let (store, outcome) = match kind {
            StoreKind::Mbox => {
                let outcome = mbox::inspect(Path::new(&resolved));
                (resolved, outcome)
            }
            StoreKind::Maildir => {
                let outcome = maildir::inspect(Path::new(&resolved));
                (resolved, outcome)
            }
            StoreKind::Pop3 | StoreKind::Imap => {
                match RemoteSpec::parse(&resolved, self.env) {
                    Ok(spec) => (spec.to_string(), self.inspect_remote(&spec)),
                    Err(e) => (resolved, Err(e)),
                }
            }
            StoreKind::Invalid => {
                let e = Error::NoSuchStore(resolved.clone());
                (resolved, Err(e))
            }
        };

        match outcome {
            Ok(ref counts) => {
                debug!(
                    "{}: {} new, {} unread, {} read",
                    store, counts.new, counts.unread, counts.read
                );
                self.mail_found |= counts.has_mail();
            }
            Err(ref e) => error!("{}", e),
        }

        StoreReport {
            store,
            kind,
            outcome,
        }
    }

    fn inspect_remote(
        &mut self,
        spec: &RemoteSpec,
    ) -> Result<InspectionResult, Error> {
        let password = match spec.password {
            Some(ref password) => password.clone(),
            None => self
                .credentials
                .lookup(&spec.host, &spec.user)
                .unwrap_or_default(),
        };

        let endpoint = spec.endpoint();
        let mut client = client::connect(&endpoint, &self.network)?;
        match spec.protocol {
            Protocol::Pop3 => pop3::inspect(&mut client, &endpoint, &password),
            Protocol::Imap => {
                imap::inspect(&mut client, &endpoint, &spec.mailbox, &password)
            }
        }
    }
}
