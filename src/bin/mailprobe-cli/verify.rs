use anyhow::{Context, Result};
use mailprobe_lib::{CancellationToken, VerificationVerdict, Verifier, VerifierConfig};
use tracing::{info, warn};

/// Verifies `emails` in order. Ctrl-C cancels the request in flight and
/// stops the batch; verdicts collected so far are still returned.
pub async fn run(config: VerifierConfig, emails: &[String]) -> Result<Vec<VerificationVerdict>> {
    let verifier = Verifier::from_config(config).context("build verifier")?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    let mut verdicts = Vec::with_capacity(emails.len());
    for email in emails {
        let verdict = verifier
            .verify_email_with_cancel(email, &cancel)
            .await
            .with_context(|| format!("verify '{email}'"))?;
        verdicts.push(verdict);
        if cancel.is_cancelled() {
            info!(done = verdicts.len(), total = emails.len(), "batch stopped");
            break;
        }
    }
    Ok(verdicts)
}
