//! Scripted sessions for exercising the sequencer without a network.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use super::error::TransportError;
use super::session::{MailSession, SessionConnector};
use super::types::CommandReply;

type Responder = dyn Fn(&str, &str) -> Result<CommandReply, TransportError> + Send + Sync;

#[derive(Clone)]
pub(crate) struct ScriptedConnector {
    pub refuse: Option<u16>,
    pub respond: Arc<Responder>,
    pub log: Arc<Mutex<Vec<String>>>,
    pub opens: Arc<AtomicUsize>,
}

pub(crate) fn reply(code: u16, ms: u64) -> CommandReply {
    let text = match code {
        200..=299 => "2.1.5 Ok",
        400..=499 => "4.7.1 Try again later",
        _ => "5.1.1 User unknown",
    };
    CommandReply::new(code, text, Duration::from_millis(ms))
}

impl ScriptedConnector {
    pub(crate) fn with_responder<F>(f: F) -> Self
    where
        F: Fn(&str, &str) -> Result<CommandReply, TransportError> + Send + Sync + 'static,
    {
        Self {
            refuse: None,
            respond: Arc::new(f),
            log: Arc::new(Mutex::new(Vec::new())),
            opens: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Handshake succeeds; `RCPT` for `real_address` gets `real`, any other
    /// recipient gets `decoy`. Tuples are (code, elapsed ms).
    pub(crate) fn mailbox(real_address: &str, real: (u16, u64), decoy: (u16, u64)) -> Self {
        let marker = format!("<{real_address}>");
        Self::with_responder(move |verb, argument| {
            if verb != "RCPT" {
                return Ok(reply(250, 1));
            }
            let (code, ms) = if argument.contains(&marker) {
                real
            } else {
                decoy
            };
            Ok(reply(code, ms))
        })
    }

    pub(crate) fn refusing(code: u16) -> Self {
        Self {
            refuse: Some(code),
            ..Self::with_responder(|_, _| Ok(reply(250, 1)))
        }
    }

    pub(crate) fn commands(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    pub(crate) fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

impl SessionConnector for ScriptedConnector {
    fn open(
        &self,
        _host: &str,
        _port: u16,
        _timeout: Duration,
    ) -> Result<Box<dyn MailSession>, TransportError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if let Some(code) = self.refuse {
            return Err(TransportError::Refused {
                stage: "greeting",
                code,
                text: "5.7.1 Service unavailable".to_string(),
            });
        }
        Ok(Box::new(ScriptedSession {
            respond: Arc::clone(&self.respond),
            log: Arc::clone(&self.log),
        }))
    }
}

struct ScriptedSession {
    respond: Arc<Responder>,
    log: Arc<Mutex<Vec<String>>>,
}

impl MailSession for ScriptedSession {
    fn command(&mut self, verb: &str, argument: &str) -> Result<CommandReply, TransportError> {
        self.log.lock().push(format!("{verb} {argument}"));
        (self.respond)(verb, argument)
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.log.lock().push("QUIT".to_string());
        Err(TransportError::protocol("connection already closed"))
    }
}
