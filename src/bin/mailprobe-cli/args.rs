use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mailprobe_lib::VerifierOptions;

#[derive(Parser)]
#[command(
    name = "mailprobe-cli",
    version,
    about = "Estimate e-mail deliverability from MX lookups and timed recipient probes."
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,

    /// format: human|json|ndjson|csv
    #[arg(long, global = true, default_value = "human")]
    pub format: String,

    /// write report to file (JSON/NDJSON/CSV selon --format)
    #[arg(long, global = true)]
    pub out: Option<String>,

    /// logs de debug sur stderr (RUST_LOG prend le pas)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// nom utilisé pour EHLO/HELO
    #[arg(long, global = true)]
    pub helo: Option<String>,

    /// enveloppe MAIL FROM (par défaut verify@<helo>)
    #[arg(long = "from", global = true)]
    pub mail_from: Option<String>,

    /// port SMTP des MX
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// timeout d'une session SMTP (ms)
    #[arg(long = "smtp-timeout", global = true)]
    pub smtp_timeout_ms: Option<u64>,

    /// timeout DNS (ms)
    #[arg(long = "dns-timeout", global = true)]
    pub dns_timeout_ms: Option<u64>,

    /// pause entre la sonde leurre et la sonde réelle (ms)
    #[arg(long = "pause", global = true)]
    pub pause_ms: Option<u64>,

    /// sonde aussi les domaines jetables connus
    #[arg(long, global = true)]
    pub probe_disposable: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// vérifie une adresse
    Verify { email: String },
    /// vérifie plusieurs adresses, ordre conservé
    Bulk {
        emails: Vec<String>,
        /// lit des adresses depuis stdin (une par ligne)
        #[arg(long)]
        stdin: bool,
        /// sessions simultanées (1..=50)
        #[arg(long)]
        concurrency: Option<usize>,
        /// délai global de la requête (ms)
        #[arg(long = "timeout")]
        timeout_ms: Option<u64>,
    },
    /// affiche les MX d'un domaine
    Mx { domain: String },
}

impl Cli {
    /// Environment configuration with command-line overrides applied.
    pub fn options(&self) -> Result<VerifierOptions> {
        let mut options = VerifierOptions::from_env().context("read MAILPROBE_* environment")?;

        if let Some(helo) = &self.helo {
            options.probe.helo_domain = Some(helo.clone());
        }
        if let Some(from) = &self.mail_from {
            options.probe.envelope_sender = Some(from.clone());
        }
        if let Some(port) = self.port {
            options.probe.port = port;
        }
        if let Some(ms) = self.smtp_timeout_ms {
            options.probe.session_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = self.dns_timeout_ms {
            options.dns_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = self.pause_ms {
            options.probe.pause = Duration::from_millis(ms);
        }
        if self.probe_disposable {
            options.reject_disposable = false;
        }
        if let Commands::Bulk {
            concurrency,
            timeout_ms,
            ..
        } = &self.cmd
        {
            if let Some(n) = concurrency {
                options.bulk_concurrency = *n;
            }
            if let Some(ms) = timeout_ms {
                options.request_timeout = Some(Duration::from_millis(*ms));
            }
        }

        options.validate()?;
        Ok(options)
    }
}
