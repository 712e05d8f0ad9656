use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, trace};

use super::reply::ReplyAssembler;
use super::transcript::{Step, Transcript};
use super::types::connection_failed_reason;
use super::{ProbeOutcome, ProbeTarget};

const LOG_TARGET: &str = "mailprobe::smtp";

/// Longest reply line accepted before the peer is considered broken
/// (RFC 5321 allows 512 octets).
const MAX_LINE_LEN: u64 = 4096;

/// Plays one SMTP attempt against one target. Implementations never retry.
pub trait TranscriptClient {
    fn probe(
        &self,
        target: &ProbeTarget,
        recipient: &str,
    ) -> impl Future<Output = ProbeOutcome> + Send;
}

/// Identity and timing used by [`SmtpTranscriptClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptOptions {
    pub helo_name: String,
    pub sender: String,
    /// Bound on the whole attempt: connect, handshake and decisive reply.
    pub attempt_timeout: Duration,
}

/// [`TranscriptClient`] speaking plaintext SMTP over TCP.
#[derive(Debug, Clone)]
pub struct SmtpTranscriptClient {
    options: TranscriptOptions,
}

impl SmtpTranscriptClient {
    pub fn new(options: TranscriptOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &TranscriptOptions {
        &self.options
    }
}

impl TranscriptClient for SmtpTranscriptClient {
    async fn probe(&self, target: &ProbeTarget, recipient: &str) -> ProbeOutcome {
        let options = &self.options;
        let attempt = async {
            let host = target.exchanger.hostname.as_str();
            let stream = TcpStream::connect((host, target.port)).await?;
            debug!(target: LOG_TARGET, probe = %target, "connected");
            Ok(run_transcript(stream, &options.helo_name, &options.sender, recipient).await)
        };
        let outcome = bounded(options.attempt_timeout, attempt).await;
        debug!(target: LOG_TARGET, probe = %target, %outcome, "attempt finished");
        outcome
    }
}

/// Applies the single per-attempt deadline. The connection is owned by
/// `attempt`, so expiry drops and closes it.
pub(crate) async fn bounded<F>(timeout: Duration, attempt: F) -> ProbeOutcome
where
    F: Future<Output = io::Result<ProbeOutcome>>,
{
    match tokio::time::timeout(timeout, attempt).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(err)) => ProbeOutcome::connection_failed(err),
        Err(_) => ProbeOutcome::timeout(),
    }
}

/// Drives a [`Transcript`] over an already connected stream and closes the
/// stream before returning.
pub(crate) async fn run_transcript<S>(
    stream: S,
    helo_name: &str,
    sender: &str,
    recipient: &str,
) -> ProbeOutcome
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut stream = BufReader::new(stream);
    let mut transcript = Transcript::new(helo_name, sender, recipient);
    transcript.connected();

    let mut assembler = ReplyAssembler::default();
    let mut line = Vec::new();
    let mut classified_by_reply = false;

    loop {
        line.clear();
        let read = (&mut stream)
            .take(MAX_LINE_LEN)
            .read_until(b'\n', &mut line)
            .await;
        match read {
            Ok(0) => {
                transcript.fail(connection_failed_reason("connection closed by peer"));
                break;
            }
            Ok(_) => {}
            Err(err) => {
                transcript.fail(connection_failed_reason(err));
                break;
            }
        }

        let raw = String::from_utf8_lossy(&line);
        trace!(target: LOG_TARGET, line = %raw.trim_end(), "S:");
        let reply = match assembler.push(&raw) {
            Ok(Some(reply)) => reply,
            Ok(None) => continue,
            Err(malformed) => {
                debug!(target: LOG_TARGET, %malformed, "unclassifiable reply");
                transcript.fail(malformed.to_string());
                classified_by_reply = true;
                break;
            }
        };

        match transcript.on_reply(&reply) {
            Step::Send(command) => {
                trace!(target: LOG_TARGET, %command, "C:");
                if let Err(err) = send_command(stream.get_mut(), &command).await {
                    transcript.fail(connection_failed_reason(err));
                    break;
                }
            }
            Step::Done => {
                classified_by_reply = true;
                break;
            }
        }
    }

    let mut inner = stream.into_inner();
    if classified_by_reply {
        let _ = send_command(&mut inner, "QUIT").await;
    }
    let _ = inner.shutdown().await;
    transcript.into_outcome()
}

async fn send_command<W>(writer: &mut W, command: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut data = Vec::with_capacity(command.len() + 2);
    data.extend_from_slice(command.as_bytes());
    data.extend_from_slice(b"\r\n");
    writer.write_all(&data).await?;
    writer.flush().await
}
