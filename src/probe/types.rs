use std::time::Duration;

/// Reply to a single command, with the time spent waiting for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    pub code: u16,
    pub text: String,
    pub elapsed: Duration,
}

impl CommandReply {
    pub fn new(code: u16, text: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            code,
            text: text.into(),
            elapsed,
        }
    }

    pub fn is_positive_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeKind {
    /// Randomly generated local part at the target domain.
    Decoy,
    /// The address being verified.
    Real,
    /// Stand-in for the whole sequence when the session could not be set up
    /// (connect, greeting, EHLO/HELO or MAIL FROM failed).
    ConnectionBlock,
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    pub kind: ProbeKind,
    pub address: String,
    pub code: Option<u16>,
    pub text: String,
    /// Absent when the command failed at the transport level.
    pub elapsed_ms: Option<u64>,
}

impl Probe {
    pub fn answered(kind: ProbeKind, address: impl Into<String>, reply: &CommandReply) -> Self {
        Self {
            kind,
            address: address.into(),
            code: Some(reply.code),
            text: reply.text.clone(),
            elapsed_ms: Some(duration_ms(reply.elapsed)),
        }
    }

    pub fn failed(kind: ProbeKind, address: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            address: address.into(),
            code: None,
            text: message.into(),
            elapsed_ms: None,
        }
    }

    pub fn is_accept_or_defer(&self) -> bool {
        self.code.is_some_and(is_accept_or_defer_code)
    }
}

/// Normal "accepted" (250/251) or temporary-defer (450/451/452) codes.
pub fn is_accept_or_defer_code(code: u16) -> bool {
    matches!(code, 250 | 251 | 450 | 451 | 452)
}

/// Probes issued within one session, in the order they were sent:
/// decoy, real, then zero or more trailing decoys.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(transparent))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProbeSequence {
    probes: Vec<Probe>,
}

impl ProbeSequence {
    pub fn new(probes: Vec<Probe>) -> Self {
        Self { probes }
    }

    pub fn blocked(address: impl Into<String>, code: Option<u16>, text: impl Into<String>) -> Self {
        Self {
            probes: vec![Probe {
                kind: ProbeKind::ConnectionBlock,
                address: address.into(),
                code,
                text: text.into(),
                elapsed_ms: None,
            }],
        }
    }

    pub(crate) fn push(&mut self, probe: Probe) {
        self.probes.push(probe);
    }

    pub fn probes(&self) -> &[Probe] {
        &self.probes
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    pub fn is_blocked(&self) -> bool {
        self.probes
            .iter()
            .any(|probe| probe.kind == ProbeKind::ConnectionBlock)
    }

    pub fn real(&self) -> Option<&Probe> {
        self.probes
            .iter()
            .find(|probe| matches!(probe.kind, ProbeKind::Real | ProbeKind::ConnectionBlock))
    }

    pub fn decoys(&self) -> impl Iterator<Item = &Probe> {
        self.probes
            .iter()
            .filter(|probe| probe.kind == ProbeKind::Decoy)
    }

    pub fn into_probes(self) -> Vec<Probe> {
        self.probes
    }
}

pub(crate) fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
