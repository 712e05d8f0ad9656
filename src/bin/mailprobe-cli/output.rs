#[cfg(any(feature = "with-serde", feature = "with-csv"))]
use anyhow::Context;
use anyhow::{Result, bail};

use crate::args::Cli;
use mailprobe_lib::{Status, VerificationVerdict};

pub fn write_reports(rows: &[VerificationVerdict], cli: &Cli) -> Result<()> {
    match cli.format.as_str() {
        "human" => write_human(rows),
        "json" => write_json(rows, cli),
        "ndjson" => write_ndjson(rows, cli),
        "csv" => write_csv(rows, cli),
        other => bail!("unknown --format '{other}', use: human|json|ndjson|csv"),
    }
}

/// `true` unless every verdict is deliverable.
pub fn any_not_deliverable(rows: &[VerificationVerdict]) -> bool {
    rows.iter().any(|row| row.status != Status::Deliverable)
}

fn write_human(rows: &[VerificationVerdict]) -> Result<()> {
    for row in rows {
        let tag = match row.status {
            Status::Deliverable => "[DELIVERABLE]  ",
            Status::Undeliverable => "[UNDELIVERABLE]",
            Status::Unknown => "[UNKNOWN]      ",
        };
        let bounce = if row.will_bounce { " (will bounce)" } else { "" };
        println!("{tag} {} :: {}{bounce}", row.email, row.reason);

        let checks = &row.subchecks;
        if !checks.format_reasons.is_empty() {
            println!("        format: {}", checks.format_reasons.join("; "));
        }
        if let Some(suggestion) = &checks.typo_suggestion {
            println!("        typo: did you mean {suggestion}?");
        }
        if !checks.disposable {
            println!("        disposable domain");
        }
        let smtp = &checks.smtp;
        if smtp.attempts > 0 {
            let mut line = format!("        smtp: {} attempt(s)", smtp.attempts);
            if let Some(last) = &smtp.last_reason {
                line.push_str(&format!(", last: {last}"));
            }
            if !smtp.exchangers_tried.is_empty() {
                line.push_str(&format!(", mx: {}", smtp.exchangers_tried.join(", ")));
            }
            println!("{line}");
        }
    }
    Ok(())
}

#[cfg(feature = "with-serde")]
fn write_json(rows: &[VerificationVerdict], cli: &Cli) -> Result<()> {
    let s = serde_json::to_string_pretty(rows)?;
    if let Some(path) = &cli.out {
        write_all_atomically(path, s.as_bytes())?;
    } else {
        println!("{s}");
    }
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn write_json(_: &[VerificationVerdict], _: &Cli) -> Result<()> {
    bail!("format=json nécessite la feature 'with-serde'")
}

#[cfg(feature = "with-serde")]
fn write_ndjson(rows: &[VerificationVerdict], cli: &Cli) -> Result<()> {
    if let Some(path) = &cli.out {
        let mut buf = Vec::new();
        for row in rows {
            let line = serde_json::to_string(row)?;
            buf.extend_from_slice(line.as_bytes());
            buf.push(b'\n');
        }
        write_all_atomically(path, &buf)?;
    } else {
        for row in rows {
            println!("{}", serde_json::to_string(row)?);
        }
    }
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn write_ndjson(_: &[VerificationVerdict], _: &Cli) -> Result<()> {
    bail!("format=ndjson nécessite la feature 'with-serde'")
}

#[cfg(feature = "with-csv")]
const CSV_HEADER: [&str; 12] = [
    "email",
    "status",
    "will_bounce",
    "reason",
    "format",
    "mx",
    "typo",
    "typo_suggestion",
    "disposable",
    "smtp_attempts",
    "smtp_last_reason",
    "exchangers_tried",
];

#[cfg(feature = "with-csv")]
fn write_csv(rows: &[VerificationVerdict], cli: &Cli) -> Result<()> {
    if let Some(path) = &cli.out {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(CSV_HEADER)?;
        for row in rows {
            wtr.write_record(csv_record(row))?;
        }
        let data = wtr.into_inner()?;
        write_all_atomically(path, &data)?;
    } else {
        let mut wtr = csv::Writer::from_writer(std::io::stdout());
        wtr.write_record(CSV_HEADER)?;
        for row in rows {
            wtr.write_record(csv_record(row))?;
        }
        wtr.flush()?;
    }
    Ok(())
}

#[cfg(not(feature = "with-csv"))]
fn write_csv(_: &[VerificationVerdict], _: &Cli) -> Result<()> {
    bail!("format=csv nécessite la feature 'with-csv'")
}

#[cfg(feature = "with-csv")]
fn csv_record(row: &VerificationVerdict) -> Vec<String> {
    let checks = &row.subchecks;
    vec![
        row.email.clone(),
        row.status.to_string(),
        row.will_bounce.to_string(),
        row.reason.clone(),
        checks.format.to_string(),
        checks.mx.map(|mx| mx.to_string()).unwrap_or_default(),
        checks.typo.to_string(),
        checks.typo_suggestion.clone().unwrap_or_default(),
        checks.disposable.to_string(),
        checks.smtp.attempts.to_string(),
        checks.smtp.last_reason.clone().unwrap_or_default(),
        checks.smtp.exchangers_tried.join("|"),
    ]
}

#[cfg(any(feature = "with-serde", feature = "with-csv"))]
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
