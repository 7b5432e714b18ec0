//! Recipient probing over a single mail-transfer session.
//!
//! [`probe`] opens one session, declares a sender and then asks the server
//! about a random decoy recipient, the real address and (usually) a second
//! decoy. All replies are timed; the comparison between them is what the
//! signal analyzer works on.

mod error;
mod options;
mod session;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use error::TransportError;
pub use options::ProbeOptions;
pub use session::{MailSession, SessionConnector, TcpConnector};
pub use types::{CommandReply, Probe, ProbeKind, ProbeSequence, is_accept_or_defer_code};
pub(crate) use types::duration_ms;

use std::thread;
use std::time::Duration;

use rand::{Rng, distributions::Alphanumeric};

use crate::address::ParsedAddress;

pub fn probe(
    connector: &dyn SessionConnector,
    options: &ProbeOptions,
    mx_host: &str,
    target: &ParsedAddress,
) -> ProbeSequence {
    let real_address = target.address();

    let mut session = match connector.open(mx_host, options.port, options.session_timeout) {
        Ok(session) => session,
        Err(err) => {
            tracing::warn!(target: "probe", mx_host, timeout = err.is_timeout(), error = %err, "session could not be opened");
            return ProbeSequence::blocked(real_address, err.code(), err.to_string());
        }
    };

    if let Err(err) = handshake(session.as_mut(), options) {
        tracing::warn!(target: "probe", mx_host, error = %err, "handshake refused");
        let _ = session.close();
        return ProbeSequence::blocked(real_address, err.code(), err.to_string());
    }

    let mut sequence = ProbeSequence::default();

    let first_decoy = recipient(session.as_mut(), ProbeKind::Decoy, &decoy_address(target));
    sequence.push(first_decoy.clone());

    if !options.pause.is_zero() {
        thread::sleep(options.pause);
    }

    let real = recipient(session.as_mut(), ProbeKind::Real, &real_address);
    let skip_trailing = clear_differential(&first_decoy, &real, options.skip_threshold);
    sequence.push(real);

    if skip_trailing {
        tracing::debug!(target: "probe", mx_host, "differential already visible, skipping trailing decoys");
    } else {
        for _ in 0..options.trailing_decoys() {
            let decoy = recipient(session.as_mut(), ProbeKind::Decoy, &decoy_address(target));
            sequence.push(decoy);
        }
    }

    if let Err(err) = session.close() {
        tracing::debug!(target: "probe", mx_host, error = %err, "QUIT failed");
    }
    sequence
}

fn handshake(session: &mut dyn MailSession, options: &ProbeOptions) -> Result<(), TransportError> {
    let helo = options.helo_domain();
    let ehlo = session.command("EHLO", &helo)?;
    if !ehlo.is_positive_completion() {
        let reply = session.command("HELO", &helo)?;
        if !reply.is_positive_completion() {
            return Err(TransportError::Refused {
                stage: "HELO",
                code: reply.code,
                text: reply.text,
            });
        }
    }

    let sender = format!("FROM:<{}>", options.envelope_sender());
    let reply = session.command("MAIL", &sender)?;
    if !reply.is_positive_completion() {
        return Err(TransportError::Refused {
            stage: "MAIL FROM",
            code: reply.code,
            text: reply.text,
        });
    }
    Ok(())
}

fn recipient(session: &mut dyn MailSession, kind: ProbeKind, address: &str) -> Probe {
    match session.command("RCPT", &format!("TO:<{address}>")) {
        Ok(reply) => {
            tracing::debug!(
                target: "probe",
                ?kind,
                code = reply.code,
                elapsed_ms = reply.elapsed.as_millis() as u64,
                "RCPT answered"
            );
            Probe::answered(kind, address, &reply)
        }
        Err(err) => {
            tracing::debug!(target: "probe", ?kind, error = %err, "RCPT failed");
            Probe::failed(kind, address, err.to_string())
        }
    }
}

/// True when the real probe was accepted or deferred and its latency already
/// differs from the first decoy by more than `threshold`.
fn clear_differential(decoy: &Probe, real: &Probe, threshold: Duration) -> bool {
    if !real.is_accept_or_defer() {
        return false;
    }
    match (decoy.elapsed_ms, real.elapsed_ms) {
        (Some(decoy_ms), Some(real_ms)) => {
            u128::from(real_ms.abs_diff(decoy_ms)) > threshold.as_millis()
        }
        _ => false,
    }
}

fn decoy_address(target: &ParsedAddress) -> String {
    format!("{}@{}", random_local_part(target.local.len()), target.domain)
}

pub(crate) fn random_local_part(len: usize) -> String {
    let length = len.clamp(12, 32);
    let mut local: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect();
    local.make_ascii_lowercase();
    local
}
