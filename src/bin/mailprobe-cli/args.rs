use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use mailprobe_lib::{ValidationMode, VerifierConfig};

#[derive(Parser)]
#[command(name = "mailprobe-cli", version, about = "Sonde SMTP de délivrabilité (sans DATA)")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Commands>,

    /// lit des adresses depuis stdin (une par ligne)
    #[arg(long)]
    pub stdin: bool,

    /// write report to file (JSON/NDJSON/CSV selon --format)
    #[arg(long)]
    pub out: Option<String>,

    /// format: human|json|ndjson|csv
    #[arg(long, default_value = "human")]
    pub format: String,

    /// fichier de configuration TOML (les options ci-dessous l'emportent)
    #[arg(long)]
    pub config: Option<String>,

    /// mode: strict|relaxed
    #[arg(long)]
    pub mode: Option<String>,

    /// port SMTP à sonder (répétable, dans l'ordre)
    #[arg(long = "port")]
    pub ports: Vec<u16>,

    /// tentatives par couple (MX, port)
    #[arg(long)]
    pub retries: Option<u32>,

    /// timeout par tentative (ms)
    #[arg(long = "timeout")]
    pub timeout_ms: Option<u64>,

    /// budget total de la sonde (ms)
    #[arg(long = "budget")]
    pub budget_ms: Option<u64>,

    /// timeout DNS (ms)
    #[arg(long = "dns-timeout")]
    pub dns_timeout_ms: Option<u64>,

    /// plafond global de tentatives
    #[arg(long = "max-attempts")]
    pub max_attempts: Option<u32>,

    /// enveloppe MAIL FROM
    #[arg(long = "from")]
    pub sender: Option<String>,

    /// nom utilisé pour HELO
    #[arg(long)]
    pub helo: Option<String>,

    /// domaine toujours délivrable (répétable)
    #[arg(long = "allow")]
    pub allow: Vec<String>,

    /// domaine toujours refusé (répétable)
    #[arg(long = "deny")]
    pub deny: Vec<String>,

    /// domaine jetable supplémentaire (répétable)
    #[arg(long = "disposable")]
    pub disposable: Vec<String>,

    /// considère un résultat inconnu comme un rebond
    #[arg(long)]
    pub unknown_means_bounce: bool,

    /// logs détaillés (debug) sur stderr
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// sonde une adresse
    Verify { email: String },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn clap_command() -> clap::Command {
        <Self as clap::CommandFactory>::command()
    }

    /// File configuration (or defaults) with command-line overrides applied.
    pub fn build_config(&self) -> Result<VerifierConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => VerifierConfig::default(),
        };

        if let Some(mode) = &self.mode {
            config.validation_mode = mode_from_str(mode)?;
        }
        if !self.ports.is_empty() {
            config.ports_to_try = self.ports.clone();
        }
        if let Some(retries) = self.retries {
            config.max_retries_per_target = retries;
        }
        if let Some(ms) = self.timeout_ms {
            config.per_attempt_timeout_ms = ms;
        }
        if let Some(ms) = self.budget_ms {
            config.total_budget_ms = ms;
        }
        if let Some(ms) = self.dns_timeout_ms {
            config.dns_timeout_ms = ms;
        }
        if let Some(cap) = self.max_attempts {
            config.max_total_attempts = Some(cap);
        }
        if let Some(sender) = &self.sender {
            config.probe_sender_address = sender.clone();
        }
        if let Some(helo) = &self.helo {
            config.helo_name = helo.clone();
        }
        config.allowlist_domains.extend(self.allow.iter().cloned());
        config.denylist_domains.extend(self.deny.iter().cloned());
        config
            .extra_disposable_domains
            .extend(self.disposable.iter().cloned());
        if self.unknown_means_bounce {
            config.unknown_means_bounce = true;
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

pub fn mode_from_str(s: &str) -> Result<ValidationMode> {
    match s {
        "strict" => Ok(ValidationMode::Strict),
        "relaxed" => Ok(ValidationMode::Relaxed),
        other => bail!("unknown --mode '{other}', use: strict|relaxed"),
    }
}

#[cfg(feature = "with-serde")]
fn load_config(path: &str) -> Result<VerifierConfig> {
    VerifierConfig::load(path).with_context(|| format!("load config {path}"))
}

#[cfg(not(feature = "with-serde"))]
fn load_config(_: &str) -> Result<VerifierConfig> {
    bail!("--config nécessite la feature 'with-serde'")
}
