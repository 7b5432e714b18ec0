use anyhow::{Context, Result, bail};

use mailprobe_lib::{BulkResult, DnsError, Status, VerificationResult};

use crate::args::Cli;

pub enum Report {
    Single(VerificationResult),
    Bulk(BulkResult),
}

impl Report {
    pub fn results(&self) -> &[VerificationResult] {
        match self {
            Self::Single(result) => std::slice::from_ref(result),
            Self::Bulk(bulk) => &bulk.results,
        }
    }
}

pub fn write_report(report: &Report, cli: &Cli) -> Result<()> {
    let data = match cli.format.as_str() {
        "human" => render_human(report),
        "json" => render_json(report)?,
        "ndjson" => render_ndjson(report.results())?,
        "csv" => render_csv(report.results())?,
        other => bail!("unknown --format '{other}', use: human|json|ndjson|csv"),
    };
    emit(&data, cli)
}

pub fn write_mx(domain: &str, lookup: &Result<Vec<String>, DnsError>, cli: &Cli) -> Result<()> {
    let data = match cli.format.as_str() {
        "human" => match lookup {
            Ok(hosts) => format!("[MX] {domain} :: {}\n", hosts.join(", ")),
            Err(err) => format!("[{}] {domain} :: {err}\n", err.reason_tag().to_uppercase()),
        },
        "json" | "ndjson" => render_mx_json(domain, lookup, cli.format == "json")?,
        "csv" => render_mx_csv(domain, lookup)?,
        other => bail!("unknown --format '{other}', use: human|json|ndjson|csv"),
    };
    emit(&data, cli)
}

/// 0 when every result is deliverable or risky, 2 otherwise.
pub fn exit_code(results: &[VerificationResult]) -> i32 {
    let any_bad = results
        .iter()
        .any(|r| matches!(r.status, Status::Undeliverable | Status::Invalid));
    if any_bad { 2 } else { 0 }
}

pub fn human_line(result: &VerificationResult) -> String {
    let mut line = format!(
        "[{}] {} score={} reason={}",
        result.status.as_str().to_uppercase(),
        result.address,
        result.score,
        result.reason
    );
    if let Some(mx) = &result.mx_host {
        line.push_str(&format!(" mx={mx}"));
    }
    if let Some(provider) = result.provider {
        line.push_str(&format!(" provider={provider}"));
    }
    line
}

fn render_human(report: &Report) -> String {
    let mut out = String::new();
    for result in report.results() {
        out.push_str(&human_line(result));
        out.push('\n');
    }
    if let Report::Bulk(bulk) = report {
        out.push_str(&format!(
            "total={} deliverable={} risky={} undeliverable={} invalid={} ({} ms)\n",
            bulk.total,
            bulk.counts.deliverable,
            bulk.counts.risky,
            bulk.counts.undeliverable,
            bulk.counts.invalid,
            bulk.processing_time_ms
        ));
    }
    out
}

#[cfg(feature = "with-serde")]
fn render_json(report: &Report) -> Result<String> {
    let mut s = match report {
        Report::Single(result) => serde_json::to_string_pretty(result)?,
        Report::Bulk(bulk) => serde_json::to_string_pretty(bulk)?,
    };
    s.push('\n');
    Ok(s)
}

#[cfg(not(feature = "with-serde"))]
fn render_json(_: &Report) -> Result<String> {
    bail!("format=json nécessite la feature 'with-serde'")
}

#[cfg(feature = "with-serde")]
fn render_ndjson(results: &[VerificationResult]) -> Result<String> {
    let mut out = String::new();
    for result in results {
        out.push_str(&serde_json::to_string(result)?);
        out.push('\n');
    }
    Ok(out)
}

#[cfg(not(feature = "with-serde"))]
fn render_ndjson(_: &[VerificationResult]) -> Result<String> {
    bail!("format=ndjson nécessite la feature 'with-serde'")
}

#[cfg(feature = "with-serde")]
fn render_mx_json(
    domain: &str,
    lookup: &Result<Vec<String>, DnsError>,
    pretty: bool,
) -> Result<String> {
    let value = match lookup {
        Ok(hosts) => serde_json::json!({ "domain": domain, "mx_records": hosts, "error": null }),
        Err(err) => serde_json::json!({
            "domain": domain,
            "mx_records": [],
            "error": err.reason_tag(),
            "detail": err.to_string(),
        }),
    };
    let mut s = if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    s.push('\n');
    Ok(s)
}

#[cfg(not(feature = "with-serde"))]
fn render_mx_json(_: &str, _: &Result<Vec<String>, DnsError>, _: bool) -> Result<String> {
    bail!("format=json nécessite la feature 'with-serde'")
}

#[cfg(feature = "with-csv")]
const CSV_HEADER: [&str; 12] = [
    "address",
    "domain",
    "status",
    "score",
    "reason",
    "mx_host",
    "provider",
    "email_type",
    "timing_delta_ms",
    "entropy",
    "confidence",
    "processing_time_ms",
];

#[cfg(feature = "with-csv")]
fn render_csv(results: &[VerificationResult]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(CSV_HEADER)?;
    for r in results {
        wtr.write_record([
            r.address.clone(),
            r.domain.clone().unwrap_or_default(),
            r.status.to_string(),
            r.score.to_string(),
            r.reason.to_string(),
            r.mx_host.clone().unwrap_or_default(),
            r.provider.map(|p| p.to_string()).unwrap_or_default(),
            r.classification
                .map(|kind| kind.email_type.as_str().to_string())
                .unwrap_or_default(),
            r.signals.timing_delta_ms.to_string(),
            r.signals.entropy.to_string(),
            r.signals.confidence.to_string(),
            r.processing_time_ms.to_string(),
        ])?;
    }
    let data = wtr.into_inner().context("flush csv")?;
    String::from_utf8(data).context("csv output is not UTF-8")
}

#[cfg(not(feature = "with-csv"))]
fn render_csv(_: &[VerificationResult]) -> Result<String> {
    bail!("format=csv nécessite la feature 'with-csv'")
}

#[cfg(feature = "with-csv")]
fn render_mx_csv(domain: &str, lookup: &Result<Vec<String>, DnsError>) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["domain", "preference_rank", "host", "error"])?;
    match lookup {
        Ok(hosts) => {
            for (index, host) in hosts.iter().enumerate() {
                let rank = (index + 1).to_string();
                wtr.write_record([domain, rank.as_str(), host.as_str(), ""])?;
            }
        }
        Err(err) => wtr.write_record([domain, "", "", err.reason_tag()])?,
    }
    let data = wtr.into_inner().context("flush csv")?;
    String::from_utf8(data).context("csv output is not UTF-8")
}

#[cfg(not(feature = "with-csv"))]
fn render_mx_csv(_: &str, _: &Result<Vec<String>, DnsError>) -> Result<String> {
    bail!("format=csv nécessite la feature 'with-csv'")
}

fn emit(data: &str, cli: &Cli) -> Result<()> {
    match &cli.out {
        Some(path) => write_all_atomically(path, data.as_bytes()),
        None => {
            print!("{data}");
            Ok(())
        }
    }
}

fn write_all_atomically(path: &str, bytes: &[u8]) -> Result<()> {
    use std::io::Write;

    let tmp = format!("{path}.tmp");
    {
        let mut f = std::fs::File::create(&tmp).with_context(|| format!("create {tmp}"))?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    std::fs::rename(&tmp, path).with_context(|| format!("rename {tmp} -> {path}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use mailprobe_lib::{ProviderId, Reason};

    use super::*;

    fn deliverable() -> VerificationResult {
        let mut result =
            VerificationResult::failed("jane@example.com", Reason::PatternAnalysis, Duration::ZERO);
        result.status = Status::Deliverable;
        result.score = 88;
        result.mx_host = Some("aspmx.l.google.com".to_string());
        result.provider = Some(ProviderId::Google);
        result
    }

    #[test]
    fn human_line_for_invalid_input() {
        let result = VerificationResult::invalid("not-an-address", Duration::ZERO);
        insta::assert_snapshot!(human_line(&result), @"[INVALID] not-an-address score=0 reason=bad_syntax");
    }

    #[test]
    fn human_line_for_probed_address() {
        insta::assert_snapshot!(
            human_line(&deliverable()),
            @"[DELIVERABLE] jane@example.com score=88 reason=pattern_analysis mx=aspmx.l.google.com provider=google"
        );
    }

    #[test]
    fn exit_code_flags_bad_results() {
        let good = deliverable();
        let bad = VerificationResult::invalid("x", Duration::ZERO);
        assert_eq!(exit_code(std::slice::from_ref(&good)), 0);
        assert_eq!(exit_code(&[good, bad]), 2);
        assert_eq!(exit_code(&[]), 0);
    }
}
