use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use super::error::TransportError;
use super::types::CommandReply;

/// One open protocol session. Commands run strictly one after another.
pub trait MailSession: Send {
    fn command(&mut self, verb: &str, argument: &str) -> Result<CommandReply, TransportError>;

    fn close(&mut self) -> Result<(), TransportError>;
}

/// Opens sessions against a mail exchanger. The returned session has already
/// consumed a positive greeting.
pub trait SessionConnector: Send + Sync {
    fn open(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<Box<dyn MailSession>, TransportError>;
}

/// Plain-TCP connector used outside of tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl SessionConnector for TcpConnector {
    fn open(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<Box<dyn MailSession>, TransportError> {
        let addrs: Vec<SocketAddr> = (host, port)
            .to_socket_addrs()
            .map_err(|source| TransportError::Resolve {
                host: host.to_string(),
                source,
            })?
            .collect();
        let mut session = SmtpSession::connect(host, &addrs, timeout)?;
        let greeting = session.read_reply(Instant::now())?;
        if !greeting.is_positive_completion() {
            return Err(TransportError::Refused {
                stage: "greeting",
                code: greeting.code,
                text: greeting.text,
            });
        }
        Ok(Box::new(session))
    }
}

/// Longest reply line accepted, CRLF included.
const MAX_REPLY_LINE: u64 = 4096;

pub(crate) struct SmtpSession {
    stream: TcpStream,
    reader: BufReader<TcpStream>,
    /// Bound on a whole reply, continuation lines included.
    timeout: Duration,
}

impl SmtpSession {
    pub(crate) fn connect(
        host: &str,
        addrs: &[SocketAddr],
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(addr, timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(timeout))?;
                    stream.set_write_timeout(Some(timeout))?;
                    let reader = BufReader::new(stream.try_clone()?);
                    return Ok(Self {
                        stream,
                        reader,
                        timeout,
                    });
                }
                Err(err) => last_err = Some(err),
            }
        }
        Err(TransportError::Connect {
            host: host.to_string(),
            source: last_err.unwrap_or_else(|| {
                io::Error::new(
                    io::ErrorKind::AddrNotAvailable,
                    "no socket address available",
                )
            }),
        })
    }

    fn send_line(&mut self, line: &str) -> Result<(), TransportError> {
        let mut data = line.as_bytes().to_vec();
        data.extend_from_slice(b"\r\n");
        self.stream.write_all(&data)?;
        self.stream.flush()?;
        Ok(())
    }

    fn read_reply(&mut self, started: Instant) -> Result<CommandReply, TransportError> {
        let mut code = None;
        let mut message_lines = Vec::new();
        loop {
            let remaining = self.timeout.saturating_sub(started.elapsed());
            if remaining.is_zero() {
                return Err(TransportError::Io {
                    source: io::Error::new(io::ErrorKind::TimedOut, "reply deadline exceeded"),
                });
            }
            // the reader shares this socket
            self.stream.set_read_timeout(Some(remaining))?;

            let mut raw = String::new();
            let bytes = self
                .reader
                .by_ref()
                .take(MAX_REPLY_LINE)
                .read_line(&mut raw)?;
            if bytes as u64 >= MAX_REPLY_LINE && !raw.ends_with('\n') {
                return Err(TransportError::protocol(format!(
                    "reply line longer than {MAX_REPLY_LINE} bytes"
                )));
            }
            if bytes == 0 {
                return Err(TransportError::Io {
                    source: io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "connection closed while reading reply",
                    ),
                });
            }
            let (parsed_code, text, continuation) = parse_reply_line(&raw)?;
            match code {
                Some(existing) if existing != parsed_code => {
                    return Err(TransportError::protocol(format!(
                        "inconsistent reply codes: {existing} vs {parsed_code}"
                    )));
                }
                Some(_) => {}
                None => code = Some(parsed_code),
            }
            message_lines.push(text);
            if !continuation {
                break;
            }
        }
        let code = code.ok_or_else(|| TransportError::protocol("reply missing status code"))?;
        Ok(CommandReply::new(
            code,
            message_lines.join("\n"),
            started.elapsed(),
        ))
    }
}

impl MailSession for SmtpSession {
    fn command(&mut self, verb: &str, argument: &str) -> Result<CommandReply, TransportError> {
        let line = if argument.is_empty() {
            verb.to_string()
        } else {
            format!("{verb} {argument}")
        };
        let started = Instant::now();
        self.send_line(&line)?;
        self.read_reply(started)
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.send_line("QUIT")?;
        // the 221 is informative only
        let _ = self.read_reply(Instant::now());
        Ok(())
    }
}

/// Split one reply line into code, text and the continuation flag.
pub(crate) fn parse_reply_line(raw: &str) -> Result<(u16, String, bool), TransportError> {
    let line = raw.trim_end_matches(['\r', '\n']);
    if line.len() < 3 || !line.is_char_boundary(3) {
        return Err(TransportError::protocol(format!("invalid reply: '{line}'")));
    }
    let code_part = &line[..3];
    let code = code_part
        .parse::<u16>()
        .map_err(|_| TransportError::protocol(format!("invalid status code: '{code_part}'")))?;
    let continuation = line.as_bytes().get(3).copied() == Some(b'-');
    let text = line.get(4..).unwrap_or_default().to_string();
    Ok((code, text, continuation))
}
