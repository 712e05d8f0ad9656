use std::fmt;

/// A complete SMTP reply: the status code shared by every line and the text
/// of each line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SmtpReply {
    pub code: u16,
    pub lines: Vec<String>,
}

impl SmtpReply {
    pub fn class(&self) -> ReplyClass {
        ReplyClass::of(self.code)
    }

    /// First line of the reply, prefixed by its code (`550 5.1.1 User unknown`).
    pub fn summary(&self) -> String {
        match self.lines.first().map(|line| line.trim()) {
            Some(text) if !text.is_empty() => format!("{} {text}", self.code),
            _ => self.code.to_string(),
        }
    }
}

impl fmt::Display for SmtpReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReplyClass {
    Accepted,
    Rejected,
    Transient,
    Unclassified,
}

impl ReplyClass {
    pub fn of(code: u16) -> Self {
        match code {
            220 | 250 => Self::Accepted,
            550 | 554 => Self::Rejected,
            400..=499 => Self::Transient,
            _ => Self::Unclassified,
        }
    }
}

/// One parsed reply line: `NNN<sep>text` where `<sep>` is `-` for a
/// continuation line and a space (or nothing) for the final line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReplyLine {
    pub code: u16,
    pub last: bool,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MalformedReply {
    MissingCode(String),
    BadSeparator(String),
    MixedCodes { first: u16, next: u16 },
}

impl fmt::Display for MalformedReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCode(line) => write!(f, "malformed response: {line:?}"),
            Self::BadSeparator(line) => write!(f, "malformed response: {line:?}"),
            Self::MixedCodes { first, next } => {
                write!(f, "malformed response: mixed codes {first} and {next}")
            }
        }
    }
}

pub(crate) fn parse_line(raw: &str) -> Result<ReplyLine, MalformedReply> {
    let line = raw.trim_end_matches(['\r', '\n']);
    let bytes = line.as_bytes();
    if bytes.len() < 3 || !bytes[..3].iter().all(u8::is_ascii_digit) {
        return Err(MalformedReply::MissingCode(line.to_string()));
    }
    let code = line[..3]
        .parse::<u16>()
        .map_err(|_| MalformedReply::MissingCode(line.to_string()))?;
    let (last, text) = match bytes.get(3) {
        None => (true, ""),
        Some(b' ') => (true, &line[4..]),
        Some(b'-') => (false, &line[4..]),
        Some(_) => return Err(MalformedReply::BadSeparator(line.to_string())),
    };
    Ok(ReplyLine {
        code,
        last,
        text: text.to_string(),
    })
}

/// Accumulates reply lines until the final line of a reply is seen.
#[derive(Debug, Default)]
pub(crate) struct ReplyAssembler {
    code: Option<u16>,
    lines: Vec<String>,
}

impl ReplyAssembler {
    /// Feeds one raw line; returns the complete reply once its last line
    /// arrives.
    pub fn push(&mut self, raw: &str) -> Result<Option<SmtpReply>, MalformedReply> {
        let line = parse_line(raw)?;
        match self.code {
            Some(first) if first != line.code => {
                return Err(MalformedReply::MixedCodes {
                    first,
                    next: line.code,
                });
            }
            Some(_) => {}
            None => self.code = Some(line.code),
        }
        self.lines.push(line.text);
        if !line.last {
            return Ok(None);
        }
        let reply = SmtpReply {
            code: line.code,
            lines: std::mem::take(&mut self.lines),
        };
        self.code = None;
        Ok(Some(reply))
    }
}
