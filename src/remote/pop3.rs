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

//! Just enough POP3 to count messages.
//!
//! POP3 has no notion of seen messages. The best available approximation is
//! the `LAST` command, which reports the highest message number the client
//! has already touched; everything after it is counted as new, everything
//! up to it as read.

use std::io::{self, BufRead, Write};

use log::debug;

use super::client::LineClient;
use crate::store::InspectionResult;
use crate::support::error::{AuthFailure, Endpoint, Error};

pub const DEFAULT_PORT: u16 = 110;

/// Log in as `endpoint.user` and count the messages in the maildrop.
///
/// The session is always ended with `QUIT` once the greeting has been read,
/// whether or not the inspection succeeded.
pub fn inspect<R: BufRead, W: Write>(
    client: &mut LineClient<R, W>,
    endpoint: &Endpoint,
    password: &str,
) -> Result<InspectionResult, Error> {
    let net = |e: io::Error| {
        Error::protocol(endpoint, format!("Connection lost: {}", e))
    };

    let greeting = client.read_line().map_err(net)?;
    debug!("{}: greeting: {}", endpoint, greeting);

    let result = session(client, endpoint, password, &net);
    // Best effort; the counts (or the error) are already known.
    let _ = client.send("QUIT");
    result
}

fn session<R: BufRead, W: Write>(
    client: &mut LineClient<R, W>,
    endpoint: &Endpoint,
    password: &str,
    net: &dyn Fn(io::Error) -> Error,
) -> Result<InspectionResult, Error> {
    client.send(&format!("USER {}", endpoint.user)).map_err(net)?;
    let response = client.read_line().map_err(net)?;
    if !response.starts_with('+') {
        return Err(Error::Auth {
            endpoint: endpoint.clone(),
            reason: AuthFailure::BadUserName,
            response,
        });
    }

    client
        .send_censored(&format!("PASS {}", password), "PASS ".len())
        .map_err(net)?;
    let response = client.read_line().map_err(net)?;
    if !response.starts_with('+') {
        return Err(Error::Auth {
            endpoint: endpoint.clone(),
            reason: AuthFailure::BadPassword,
            response,
        });
    }

    let total = count_command(client, endpoint, net, "STAT")?;
    let last_seen = count_command(client, endpoint, net, "LAST")?;
    if last_seen > total {
        return Err(Error::protocol(
            endpoint,
            format!("LAST reported {} of only {} messages", last_seen, total),
        ));
    }

    Ok(InspectionResult {
        new: total - last_seen,
        read: last_seen,
        unread: 0,
    })
}

/// Send `command` and extract the number following `+OK` in the reply.
fn count_command<R: BufRead, W: Write>(
    client: &mut LineClient<R, W>,
    endpoint: &Endpoint,
    net: &dyn Fn(io::Error) -> Error,
    command: &str,
) -> Result<usize, Error> {
    client.send(command).map_err(net)?;
    let response = client.read_line().map_err(net)?;
    if !response.starts_with('+') {
        return Err(Error::protocol(
            endpoint,
            format!("{} failed: {}", command, response),
        ));
    }

    response
        .split_whitespace()
        .nth(1)
        .and_then(|n| n.parse::<usize>().ok())
        .ok_or_else(|| {
            Error::protocol(
                endpoint,
                format!("Malformed {} response: {}", command, response),
            )
        })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::remote::client::test::{scripted, sent};

    fn endpoint() -> Endpoint {
        Endpoint {
            user: "alice".to_owned(),
            host: "pop.example.com".to_owned(),
            port: DEFAULT_PORT,
        }
    }

    #[test]
    fn counts_from_stat_and_last() {
        let mut client = scripted(
            "+OK POP3 server ready\r\n\
             +OK\r\n\
             +OK maildrop locked\r\n\
             +OK 10 500\r\n\
             +OK 7\r\n\
             +OK bye\r\n",
        );

        assert_eq!(
            InspectionResult {
                new: 3,
                read: 7,
                unread: 0,
            },
            inspect(&mut client, &endpoint(), "s3cret").unwrap()
        );
        assert_eq!(
            vec!["USER alice", "PASS s3cret", "STAT", "LAST", "QUIT"],
            sent(client)
        );
    }

    #[test]
    fn bad_user_name() {
        let mut client = scripted(
            "+OK POP3 server ready\r\n\
             -ERR no such mailbox\r\n",
        );

        assert_matches!(
            Err(Error::Auth {
                reason: AuthFailure::BadUserName,
                ..
            }),
            inspect(&mut client, &endpoint(), "s3cret")
        );
        assert_eq!(vec!["USER alice", "QUIT"], sent(client));
    }

    #[test]
    fn bad_password() {
        let mut client = scripted(
            "+OK POP3 server ready\r\n\
             +OK\r\n\
             -ERR invalid password\r\n",
        );

        match inspect(&mut client, &endpoint(), "") {
            Err(Error::Auth {
                reason: AuthFailure::BadPassword,
                endpoint: e,
                response,
            }) => {
                assert_eq!(endpoint(), e);
                assert_eq!("-ERR invalid password", response);
            }
            r => panic!("Unexpected result: {:?}", r),
        }
        assert_eq!(vec!["USER alice", "PASS ", "QUIT"], sent(client));
    }

    #[test]
    fn stat_failure() {
        let mut client = scripted(
            "+OK POP3 server ready\r\n\
             +OK\r\n\
             +OK\r\n\
             -ERR mailbox busy\r\n",
        );

        assert_matches!(
            Err(Error::Protocol { .. }),
            inspect(&mut client, &endpoint(), "pw")
        );
        assert_eq!(vec!["USER alice", "PASS pw", "STAT", "QUIT"], sent(client));
    }

    #[test]
    fn last_unsupported() {
        let mut client = scripted(
            "+OK POP3 server ready\r\n\
             +OK\r\n\
             +OK\r\n\
             +OK 3 1024\r\n\
             -ERR unknown command\r\n",
        );

        assert_matches!(
            Err(Error::Protocol { .. }),
            inspect(&mut client, &endpoint(), "pw")
        );
    }

    #[test]
    fn malformed_counts() {
        let mut client = scripted(
            "+OK POP3 server ready\r\n\
             +OK\r\n\
             +OK\r\n\
             +OK lots\r\n",
        );
        assert_matches!(
            Err(Error::Protocol { .. }),
            inspect(&mut client, &endpoint(), "pw")
        );

        let mut client = scripted(
            "+OK POP3 server ready\r\n\
             +OK\r\n\
             +OK\r\n\
             +OK 3 1024\r\n\
             +OK 4\r\n",
        );
        assert_matches!(
            Err(Error::Protocol { .. }),
            inspect(&mut client, &endpoint(), "pw")
        );
    }

    #[test]
    fn connection_dropped() {
        let mut client = scripted("+OK POP3 server ready\r\n+OK\r\n");
        match inspect(&mut client, &endpoint(), "pw") {
            Err(e @ Error::Protocol { .. }) => assert!(
                e.to_string().contains("alice@pop.example.com:110"),
                "{}",
                e
            ),
            r => panic!("Unexpected result: {:?}", r),
        }
        assert_eq!(vec!["USER alice", "PASS pw", "QUIT"], sent(client));
    }
}
