use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::{SchedulePolicy, ScheduleVerdict, plan, run_probes};
use crate::mx::MailExchanger;
use crate::smtp::{ProbeOutcome, ProbeTarget, TranscriptClient};

type Script = dyn Fn(&ProbeTarget, usize) -> ProbeOutcome + Send + Sync;

/// [`TranscriptClient`] answering from a script and recording every call as
/// `host:port`.
#[derive(Clone)]
pub(crate) struct ScriptedClient {
    script: Arc<Script>,
    delay: Option<Duration>,
    calls: Arc<Mutex<Vec<String>>>,
    recipients: Arc<Mutex<Vec<String>>>,
}

impl ScriptedClient {
    pub(crate) fn new<F>(script: F) -> Self
    where
        F: Fn(&ProbeTarget, usize) -> ProbeOutcome + Send + Sync + 'static,
    {
        Self {
            script: Arc::new(script),
            delay: None,
            calls: Arc::new(Mutex::new(Vec::new())),
            recipients: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn always(outcome: ProbeOutcome) -> Self {
        Self::new(move |_, _| outcome.clone())
    }

    /// Each attempt takes `delay` before answering.
    pub(crate) fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    /// Recipient of every call, as handed to the client.
    pub(crate) fn recipients(&self) -> Vec<String> {
        self.recipients.lock().expect("recipients lock").clone()
    }
}

impl TranscriptClient for ScriptedClient {
    async fn probe(&self, target: &ProbeTarget, recipient: &str) -> ProbeOutcome {
        self.recipients
            .lock()
            .expect("recipients lock")
            .push(recipient.to_string());
        let index = {
            let mut calls = self.calls.lock().expect("calls lock");
            calls.push(target.to_string());
            calls.len() - 1
        };
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.script)(target, index)
    }
}

struct HangingClient;

impl TranscriptClient for HangingClient {
    async fn probe(&self, _target: &ProbeTarget, _recipient: &str) -> ProbeOutcome {
        std::future::pending().await
    }
}

fn timeout() -> ProbeOutcome {
    ProbeOutcome::Indeterminate("timeout".to_string())
}

fn policy(ports: &[u16], attempts: u32) -> SchedulePolicy {
    SchedulePolicy {
        ports: ports.to_vec(),
        attempts_per_target: attempts,
        max_total_attempts: None,
        total_budget: Duration::from_secs(300),
    }
}

fn two_exchangers() -> Vec<MailExchanger> {
    vec![
        MailExchanger::new("mx1.example.com", 10),
        MailExchanger::new("mx2.example.com", 20),
    ]
}

const RECIPIENT: &str = "user@example.com";

#[test]
fn plan_is_priority_then_port_then_attempt() {
    let exchangers = vec![
        MailExchanger::new("h1", 10),
        MailExchanger::new("h2", 5),
    ];
    let steps: Vec<String> = plan(&exchangers, &policy(&[25, 587], 2))
        .into_iter()
        .map(|(target, attempt)| format!("{target}#{attempt}"))
        .collect();
    assert_eq!(
        steps,
        [
            "h2:25#1", "h2:25#2", "h2:587#1", "h2:587#2", "h1:25#1", "h1:25#2", "h1:587#1",
            "h1:587#2",
        ]
    );
}

#[test]
fn plan_treats_zero_attempts_as_one() {
    let exchangers = vec![MailExchanger::new("h1", 10)];
    assert_eq!(plan(&exchangers, &policy(&[25], 0)).len(), 1);
}

#[tokio::test]
async fn empty_exchanger_list_never_probes() {
    let client = ScriptedClient::always(ProbeOutcome::Accepted);
    let report = run_probes(
        &client,
        &[],
        RECIPIENT,
        &policy(&[25], 3),
        &CancellationToken::new(),
    )
    .await;
    assert_eq!(report.verdict, ScheduleVerdict::NoExchangers);
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn lower_priority_value_is_probed_first() {
    let client = ScriptedClient::always(timeout());
    let exchangers = vec![
        MailExchanger::new("h1", 10),
        MailExchanger::new("h2", 5),
    ];
    run_probes(
        &client,
        &exchangers,
        RECIPIENT,
        &policy(&[25], 1),
        &CancellationToken::new(),
    )
    .await;
    assert_eq!(client.calls(), ["h2:25", "h1:25"]);
}

#[tokio::test]
async fn accepted_stops_the_search() {
    let client = ScriptedClient::always(ProbeOutcome::Accepted);
    let report = run_probes(
        &client,
        &two_exchangers(),
        RECIPIENT,
        &policy(&[25, 587], 3),
        &CancellationToken::new(),
    )
    .await;
    assert_eq!(
        report.verdict,
        ScheduleVerdict::Decisive {
            outcome: ProbeOutcome::Accepted
        }
    );
    assert_eq!(client.calls(), ["mx1.example.com:25"]);
    assert_eq!(report.attempts.len(), 1);
}

#[tokio::test]
async fn rejection_on_backup_port_is_kept() {
    let client = ScriptedClient::new(|target, _| {
        if target.port == 25 {
            ProbeOutcome::Indeterminate("connection failed: refused".to_string())
        } else {
            ProbeOutcome::Rejected("550 5.1.1 unknown user".to_string())
        }
    });
    let report = run_probes(
        &client,
        &two_exchangers(),
        RECIPIENT,
        &policy(&[25, 587], 2),
        &CancellationToken::new(),
    )
    .await;
    assert_eq!(
        client.calls(),
        [
            "mx1.example.com:25",
            "mx1.example.com:25",
            "mx1.example.com:587"
        ]
    );
    assert!(matches!(
        report.verdict,
        ScheduleVerdict::Decisive {
            outcome: ProbeOutcome::Rejected(_)
        }
    ));
}

#[tokio::test]
async fn retries_same_target_before_moving_on() {
    let client = ScriptedClient::new(|_, index| {
        if index < 2 {
            timeout()
        } else {
            ProbeOutcome::Accepted
        }
    });
    let report = run_probes(
        &client,
        &two_exchangers(),
        RECIPIENT,
        &policy(&[25], 3),
        &CancellationToken::new(),
    )
    .await;
    assert_eq!(client.calls().len(), 3);
    assert!(client.calls().iter().all(|call| call == "mx1.example.com:25"));
    assert_eq!(report.attempts[2].attempt, 3);
}

#[tokio::test]
async fn all_inconclusive_exhausts_with_last_reason() {
    let client = ScriptedClient::new(|_, index| {
        ProbeOutcome::Indeterminate(format!("timeout #{index}"))
    });
    let report = run_probes(
        &client,
        &two_exchangers(),
        RECIPIENT,
        &policy(&[25, 587], 3),
        &CancellationToken::new(),
    )
    .await;
    assert_eq!(client.calls().len(), 12);
    assert_eq!(
        report.verdict,
        ScheduleVerdict::Exhausted {
            last_reason: "timeout #11".to_string()
        }
    );
    assert_eq!(
        report.exchangers_tried(),
        ["mx1.example.com", "mx2.example.com"]
    );
}

#[tokio::test]
async fn host_listed_twice_is_reported_once() {
    let client = ScriptedClient::always(timeout());
    let exchangers = vec![
        MailExchanger::new("mx1.example.com", 10),
        MailExchanger::new("mx2.example.com", 20),
        MailExchanger::new("mx1.example.com", 30),
    ];
    let report = run_probes(
        &client,
        &exchangers,
        RECIPIENT,
        &policy(&[25], 1),
        &CancellationToken::new(),
    )
    .await;
    assert_eq!(client.calls().len(), 3);
    assert_eq!(
        report.exchangers_tried(),
        ["mx1.example.com", "mx2.example.com"]
    );
}

#[tokio::test]
async fn attempt_cap_is_enforced() {
    let client = ScriptedClient::always(timeout());
    let mut limited = policy(&[25, 587], 3);
    limited.max_total_attempts = Some(4);
    let report = run_probes(
        &client,
        &two_exchangers(),
        RECIPIENT,
        &limited,
        &CancellationToken::new(),
    )
    .await;
    assert_eq!(client.calls().len(), 4);
    assert!(matches!(report.verdict, ScheduleVerdict::Exhausted { .. }));
}

#[tokio::test(start_paused = true)]
async fn wall_clock_budget_caps_the_loop() {
    let client = ScriptedClient::always(timeout()).slow(Duration::from_secs(10));
    let mut budgeted = policy(&[25, 587], 3);
    budgeted.total_budget = Duration::from_secs(25);

    let started = tokio::time::Instant::now();
    let report = run_probes(
        &client,
        &two_exchangers(),
        RECIPIENT,
        &budgeted,
        &CancellationToken::new(),
    )
    .await;

    assert!(started.elapsed() <= Duration::from_secs(25));
    assert_eq!(client.calls().len(), 3);
    assert_eq!(report.attempts.len(), 2);
    assert_eq!(
        report.verdict,
        ScheduleVerdict::DeadlineReached {
            last_reason: Some("timeout".to_string())
        }
    );
}

#[tokio::test]
async fn cancelled_before_start_makes_no_attempt() {
    let client = ScriptedClient::always(ProbeOutcome::Accepted);
    let cancel = CancellationToken::new();
    cancel.cancel();
    let report = run_probes(&client, &two_exchangers(), RECIPIENT, &policy(&[25], 1), &cancel).await;
    assert_eq!(report.verdict, ScheduleVerdict::Cancelled);
    assert!(client.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn cancellation_interrupts_running_attempt() {
    let cancel = CancellationToken::new();
    let exchangers = two_exchangers();
    let policy = policy(&[25], 1);
    let (report, ()) = tokio::join!(
        run_probes(&HangingClient, &exchangers, RECIPIENT, &policy, &cancel),
        async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            cancel.cancel();
        }
    );
    assert_eq!(report.verdict, ScheduleVerdict::Cancelled);
    assert!(report.attempts.is_empty());
}
