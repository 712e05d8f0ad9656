//! Mail-exchanger resolution.
//!
//! [`resolve_exchangers`] never fails: timeouts, NXDOMAIN and empty answers
//! all come back as an empty list, which callers treat as "no exchangers".

mod error;
mod resolver;
mod types;

pub use error::MxError;
pub use resolver::{DnsMxResolver, LookupMx, resolve_exchangers};
pub use types::MailExchanger;
