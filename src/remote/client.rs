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

//! The CRLF line transport shared by the POP3 and IMAP clients.
//!
//! `LineClient` is generic over its reader and writer so that tests can
//! drive the protocol code with a canned server script instead of a socket.

use std::io::{self, BufRead, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};

use log::{debug, log_enabled, trace, Level};

use crate::support::error::{Endpoint, Error};
use crate::support::settings::NetworkConfig;

/// Longest response line that will be read in one go. Anything beyond this
/// is returned as the following line.
const MAX_LINE: u64 = 8192;

pub type TcpClient = LineClient<io::BufReader<TcpStream>, TcpStream>;

pub struct LineClient<R, W> {
    read: R,
    write: W,
    buffer: Vec<u8>,
}

impl<R: BufRead, W: Write> LineClient<R, W> {
    pub fn new(read: R, write: W) -> Self {
        LineClient {
            read,
            write,
            buffer: Vec::new(),
        }
    }

    /// Read one response line, without its line ending.
    ///
    /// The server closing the connection is an `UnexpectedEof` error.
    pub fn read_line(&mut self) -> io::Result<String> {
        self.buffer.clear();
        let nread = (&mut self.read)
            .take(MAX_LINE)
            .read_until(b'\n', &mut self.buffer)?;
        if 0 == nread {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Connection closed by server",
            ));
        }

        trace_wire("<<", &self.buffer);

        let mut line = &self.buffer[..];
        if line.ends_with(b"\n") {
            line = &line[..line.len() - 1];
        }
        if line.ends_with(b"\r") {
            line = &line[..line.len() - 1];
        }

        Ok(String::from_utf8_lossy(line).into_owned())
    }

    /// Send `line` followed by CRLF.
    pub fn send(&mut self, line: &str) -> io::Result<()> {
        self.send_censored(line, line.len())
    }

    /// Send `line` followed by CRLF, only tracing its first `visible` bytes.
    pub fn send_censored(&mut self, line: &str, visible: usize) -> io::Result<()> {
        let mut data = Vec::with_capacity(line.len() + 2);
        data.extend_from_slice(line.as_bytes());
        data.extend_from_slice(b"\r\n");

        if visible < line.len() {
            if log_enabled!(Level::Trace) {
                trace!(
                    "WIRE >> {}<censored>",
                    visible_text(&line.as_bytes()[..visible])
                );
            }
        } else {
            trace_wire(">>", &data);
        }

        self.write.write_all(&data)?;
        self.write.flush()
    }

    #[cfg(test)]
    pub fn into_inner(self) -> (R, W) {
        (self.read, self.write)
    }
}

/// Open a connection to `host:port` within the configured timeouts.
pub fn connect(
    endpoint: &Endpoint,
    network: &NetworkConfig,
) -> Result<TcpClient, Error> {
    let connect_error = |source| Error::Connect {
        host: endpoint.host.clone(),
        port: endpoint.port,
        source,
    };

    let addresses = (endpoint.host.as_str(), endpoint.port)
        .to_socket_addrs()
        .map_err(connect_error)?;

    let mut last_error =
        io::Error::new(io::ErrorKind::NotFound, "Host not found");
    for address in addresses {
        debug!("Opening connection to {} ({})", endpoint, address);
        match TcpStream::connect_timeout(&address, network.connect_timeout()) {
            Ok(stream) => {
                return wrap_stream(stream, network).map_err(connect_error)
            }
            Err(e) => {
                debug!("Connection to {} failed: {}", address, e);
                last_error = e;
            }
        }
    }

    Err(connect_error(last_error))
}

fn wrap_stream(
    stream: TcpStream,
    network: &NetworkConfig,
) -> io::Result<TcpClient> {
    stream.set_read_timeout(Some(network.read_timeout()))?;
    stream.set_write_timeout(Some(network.read_timeout()))?;
    let read = io::BufReader::new(stream.try_clone()?);
    Ok(LineClient::new(read, stream))
}

fn trace_wire(what: &str, data: &[u8]) {
    if log_enabled!(Level::Trace) {
        trace!("WIRE {} {}", what, visible_text(data));
    }
}

fn visible_text(data: &[u8]) -> String {
    let mut vis = String::new();
    for &byte in data {
        match byte {
            b' '..=b'~' => vis.push(byte as char),
            b'\n' => vis.push_str("\\n"),
            b'\r' => vis.push_str("\\r"),
            b => vis.push_str(&format!("\\x{:02X}", b)),
        }
    }
    vis
}
