use std::borrow::Cow;
use std::time::Duration;

/// Controls how [`probe`](crate::probe::probe) interrogates a mail server.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOptions {
    pub port: u16,
    /// Connect and per-command read/write deadline.
    pub session_timeout: Duration,
    /// Pause before the real recipient command.
    pub pause: Duration,
    pub helo_domain: Option<String>,
    pub envelope_sender: Option<String>,
    /// Decoys issued after the real address (0..=2).
    pub trailing_decoys: u8,
    /// Trailing decoys are skipped when the real probe was accepted/deferred
    /// and its latency differs from the first decoy by more than this.
    pub skip_threshold: Duration,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            port: 25,
            session_timeout: Duration::from_secs(4),
            pause: Duration::from_millis(100),
            helo_domain: None,
            envelope_sender: None,
            trailing_decoys: 1,
            skip_threshold: Duration::from_millis(60),
        }
    }
}

impl ProbeOptions {
    pub const MAX_TRAILING_DECOYS: u8 = 2;

    /// Hostname announced in `EHLO`/`HELO`.
    pub fn helo_domain(&self) -> Cow<'_, str> {
        self.helo_domain
            .as_deref()
            .filter(|value| !value.is_empty())
            .map(Cow::Borrowed)
            .unwrap_or(Cow::Borrowed("localhost"))
    }

    /// Envelope sender for `MAIL FROM`, `verify@<helo domain>` when unset.
    pub fn envelope_sender(&self) -> String {
        self.envelope_sender
            .as_ref()
            .filter(|value| !value.is_empty())
            .cloned()
            .unwrap_or_else(|| format!("verify@{}", self.helo_domain()))
    }

    pub fn trailing_decoys(&self) -> u8 {
        self.trailing_decoys.min(Self::MAX_TRAILING_DECOYS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sender_falls_back_to_helo() {
        let options = ProbeOptions {
            helo_domain: Some("mail.example.net".to_string()),
            ..ProbeOptions::default()
        };
        assert_eq!(options.helo_domain(), "mail.example.net");
        assert_eq!(options.envelope_sender(), "verify@mail.example.net");
    }

    #[test]
    fn empty_identity_uses_defaults() {
        let options = ProbeOptions {
            helo_domain: Some(String::new()),
            envelope_sender: Some(String::new()),
            ..ProbeOptions::default()
        };
        assert_eq!(options.helo_domain(), "localhost");
        assert_eq!(options.envelope_sender(), "verify@localhost");
    }

    #[test]
    fn trailing_decoys_capped() {
        let options = ProbeOptions {
            trailing_decoys: 9,
            ..ProbeOptions::default()
        };
        assert_eq!(options.trailing_decoys(), 2);
    }
}
