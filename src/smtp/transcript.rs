use std::fmt;

use super::ProbeOutcome;
use super::reply::{ReplyClass, SmtpReply};

/// Step of the fixed dialogue whose reply is awaited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stage {
    Greeting,
    Helo,
    MailFrom,
    RcptTo,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Greeting => "greeting",
            Self::Helo => "HELO",
            Self::MailFrom => "MAIL FROM",
            Self::RcptTo => "RCPT TO",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum State {
    Connecting,
    Handshaking(Stage),
    Classified(ProbeOutcome),
}

/// What the I/O driver must do after feeding the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Step {
    Send(String),
    Done,
}

/// Single-attempt SMTP dialogue: `Connecting → Handshaking → Classified`.
///
/// Holds no I/O; the driver in `client` feeds it replies and writes the
/// commands it asks for.
#[derive(Debug)]
pub(crate) struct Transcript<'a> {
    helo_name: &'a str,
    sender: &'a str,
    recipient: &'a str,
    state: State,
}

impl<'a> Transcript<'a> {
    pub fn new(helo_name: &'a str, sender: &'a str, recipient: &'a str) -> Self {
        Self {
            helo_name,
            sender,
            recipient,
            state: State::Connecting,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn connected(&mut self) {
        if self.state == State::Connecting {
            self.state = State::Handshaking(Stage::Greeting);
        }
    }

    pub fn on_reply(&mut self, reply: &SmtpReply) -> Step {
        let State::Handshaking(stage) = self.state else {
            return Step::Done;
        };

        let (next, command) = match stage {
            Stage::RcptTo => {
                self.state = State::Classified(classify_rcpt(reply));
                return Step::Done;
            }
            _ if reply.class() != ReplyClass::Accepted => {
                self.fail(format!("{stage} refused: {}", reply.summary()));
                return Step::Done;
            }
            Stage::Greeting => (Stage::Helo, format!("HELO {}", self.helo_name)),
            Stage::Helo => (Stage::MailFrom, format!("MAIL FROM:<{}>", self.sender)),
            Stage::MailFrom => (Stage::RcptTo, format!("RCPT TO:<{}>", self.recipient)),
        };
        if command.contains(['\r', '\n']) {
            self.fail(format!("line break in {next} argument, not sent"));
            return Step::Done;
        }
        self.state = State::Handshaking(next);
        Step::Send(command)
    }

    /// Ends the dialogue as indeterminate unless it is already classified.
    pub fn fail(&mut self, reason: impl Into<String>) {
        if !matches!(self.state, State::Classified(_)) {
            self.state = State::Classified(ProbeOutcome::Indeterminate(reason.into()));
        }
    }

    pub fn into_outcome(self) -> ProbeOutcome {
        match self.state {
            State::Classified(outcome) => outcome,
            State::Connecting => ProbeOutcome::Indeterminate("not connected".to_string()),
            State::Handshaking(stage) => {
                ProbeOutcome::Indeterminate(format!("dialogue ended while awaiting {stage} reply"))
            }
        }
    }
}

/// The only reply that speaks about the mailbox itself.
fn classify_rcpt(reply: &SmtpReply) -> ProbeOutcome {
    match reply.class() {
        ReplyClass::Accepted => ProbeOutcome::Accepted,
        ReplyClass::Rejected => ProbeOutcome::Rejected(reply.summary()),
        ReplyClass::Transient => {
            ProbeOutcome::Indeterminate(format!("temporary failure: {}", reply.summary()))
        }
        ReplyClass::Unclassified => {
            ProbeOutcome::Indeterminate(format!("unexpected response: {}", reply.summary()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(code: u16, text: &str) -> SmtpReply {
        SmtpReply {
            code,
            lines: vec![text.to_string()],
        }
    }

    fn handshaken<'a>() -> Transcript<'a> {
        let mut transcript = Transcript::new("localhost", "probe@sender.test", "user@example.com");
        transcript.connected();
        assert_eq!(
            transcript.on_reply(&reply(220, "mx ready")),
            Step::Send("HELO localhost".to_string())
        );
        assert_eq!(
            transcript.on_reply(&reply(250, "hi")),
            Step::Send("MAIL FROM:<probe@sender.test>".to_string())
        );
        assert_eq!(
            transcript.on_reply(&reply(250, "sender ok")),
            Step::Send("RCPT TO:<user@example.com>".to_string())
        );
        assert_eq!(transcript.state(), &State::Handshaking(Stage::RcptTo));
        transcript
    }

    #[test]
    fn line_break_in_recipient_is_never_sent() {
        let recipient = "\"x\r\nDATA\r\n\"@example.com";
        let mut transcript = Transcript::new("localhost", "probe@sender.test", recipient);
        transcript.connected();
        transcript.on_reply(&reply(220, "mx ready"));
        transcript.on_reply(&reply(250, "hi"));
        assert_eq!(transcript.on_reply(&reply(250, "sender ok")), Step::Done);
        match transcript.into_outcome() {
            ProbeOutcome::Indeterminate(reason) => {
                assert!(reason.contains("RCPT TO"), "{reason}")
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn line_break_in_helo_stops_at_greeting() {
        let mut transcript = Transcript::new("host\nRSET", "probe@sender.test", "user@example.com");
        transcript.connected();
        assert_eq!(transcript.on_reply(&reply(220, "mx ready")), Step::Done);
        assert!(matches!(
            transcript.into_outcome(),
            ProbeOutcome::Indeterminate(_)
        ));
    }

    #[test]
    fn starts_connecting() {
        let transcript = Transcript::new("localhost", "a@b.test", "c@d.test");
        assert_eq!(transcript.state(), &State::Connecting);
    }

    #[test]
    fn rcpt_accepted() {
        let mut transcript = handshaken();
        assert_eq!(transcript.on_reply(&reply(250, "2.1.5 Ok")), Step::Done);
        assert_eq!(transcript.into_outcome(), ProbeOutcome::Accepted);
    }

    #[test]
    fn rcpt_rejected_carries_reply() {
        let mut transcript = handshaken();
        transcript.on_reply(&reply(550, "5.1.1 No such user"));
        assert_eq!(
            transcript.into_outcome(),
            ProbeOutcome::Rejected("550 5.1.1 No such user".to_string())
        );
    }

    #[test]
    fn rcpt_greylisted_is_indeterminate() {
        let mut transcript = handshaken();
        transcript.on_reply(&reply(450, "4.2.0 Greylisted"));
        match transcript.into_outcome() {
            ProbeOutcome::Indeterminate(reason) => assert!(reason.contains("450"), "{reason}"),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn rcpt_unlisted_code_is_indeterminate() {
        let mut transcript = handshaken();
        transcript.on_reply(&reply(252, "cannot verify"));
        assert!(matches!(
            transcript.into_outcome(),
            ProbeOutcome::Indeterminate(_)
        ));
    }

    #[test]
    fn refused_greeting_is_never_rejected() {
        let mut transcript = Transcript::new("localhost", "a@b.test", "c@d.test");
        transcript.connected();
        assert_eq!(
            transcript.on_reply(&reply(554, "no SMTP service here")),
            Step::Done
        );
        assert_eq!(
            transcript.into_outcome(),
            ProbeOutcome::Indeterminate("greeting refused: 554 no SMTP service here".to_string())
        );
    }

    #[test]
    fn refused_sender_is_indeterminate() {
        let mut transcript = Transcript::new("localhost", "a@b.test", "c@d.test");
        transcript.connected();
        transcript.on_reply(&reply(220, "ready"));
        transcript.on_reply(&reply(250, "hi"));
        transcript.on_reply(&reply(550, "sender rejected"));
        assert!(matches!(
            transcript.into_outcome(),
            ProbeOutcome::Indeterminate(reason) if reason.starts_with("MAIL FROM refused")
        ));
    }

    #[test]
    fn classified_state_is_terminal() {
        let mut transcript = handshaken();
        transcript.on_reply(&reply(250, "ok"));
        assert_eq!(transcript.on_reply(&reply(550, "late")), Step::Done);
        transcript.fail("late failure");
        assert_eq!(transcript.into_outcome(), ProbeOutcome::Accepted);
    }

    #[test]
    fn unfinished_dialogue_is_indeterminate() {
        let mut transcript = Transcript::new("localhost", "a@b.test", "c@d.test");
        transcript.connected();
        assert!(matches!(
            transcript.into_outcome(),
            ProbeOutcome::Indeterminate(_)
        ));
    }
}
