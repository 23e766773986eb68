//! Recipient field validation.
//!
//! # Threat Model
//!
//! The recipient field is free text typed by a user. An attacker who gets a
//! CR or LF into it can append header lines (`BCC: victim@...`) once the
//! transport serializes the message. The guard therefore:
//!
//! 1. Rejects any input containing `\r` or `\n`, before parsing anything
//! 2. Parses a mail-header style address list (`"Name" <a@x.com>, b@x.com`)
//! 3. Drops malformed entries and rejects when none survive
//!
//! Rejection is final. Nothing here retries or repairs input.
//!
//! The raw field is held in a [`RecipientSpec`], which zeroizes its buffer on
//! drop and never prints its content through `Debug`.

use serde::Serialize;
use smallvec::SmallVec;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Maximum length of a full address.
const MAX_ADDRESS_LEN: usize = 254;
/// Maximum length of the local part.
const MAX_LOCAL_LEN: usize = 64;
/// Maximum length of the domain.
const MAX_DOMAIN_LEN: usize = 253;
/// Maximum length of one domain label.
const MAX_LABEL_LEN: usize = 63;

/// One parsed recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mailbox {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub address: String,
}

impl Mailbox {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            name: None,
            address: address.into(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => {
                f.write_str("\"")?;
                for c in name.chars() {
                    if c == '"' || c == '\\' {
                        f.write_str("\\")?;
                    }
                    write!(f, "{c}")?;
                }
                write!(f, "\" <{}>", self.address)
            }
            None => f.write_str(&self.address),
        }
    }
}

/// Accepted recipients, in input order.
pub type RecipientList = SmallVec<[Mailbox; 2]>;

/// Why a recipient field was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// CR or LF somewhere in the input.
    LineBreak,
    /// Nothing but whitespace and separators.
    Empty,
    /// Entries were present but none was a valid address.
    NoValidAddress,
}

impl RejectReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LineBreak => "recipient contains a line break",
            Self::Empty => "recipient is empty",
            Self::NoValidAddress => "recipient contains no valid address",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of validating a recipient field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationVerdict {
    Accepted(RecipientList),
    Rejected(RejectReason),
}

impl ValidationVerdict {
    #[inline]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    #[inline]
    pub fn reason(&self) -> Option<RejectReason> {
        match self {
            Self::Accepted(_) => None,
            Self::Rejected(reason) => Some(*reason),
        }
    }

    pub fn recipients(&self) -> Option<&[Mailbox]> {
        match self {
            Self::Accepted(list) => Some(list),
            Self::Rejected(_) => None,
        }
    }

    pub fn into_result(self) -> Result<RecipientList, RejectReason> {
        match self {
            Self::Accepted(list) => Ok(list),
            Self::Rejected(reason) => Err(reason),
        }
    }
}

/// Raw recipient field for one send call.
///
/// Owned copy of the user's input, wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct RecipientSpec {
    raw: String,
}

impl RecipientSpec {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn validate(&self) -> ValidationVerdict {
        validate_recipients(&self.raw)
    }

    /// Byte length of the raw field. The content itself is not exposed.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

impl From<&str> for RecipientSpec {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RecipientSpec {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl fmt::Debug for RecipientSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecipientSpec")
            .field("len", &self.raw.len())
            .field("raw", &"<REDACTED>")
            .finish()
    }
}

/// True when `value` holds a CR or LF anywhere.
#[inline]
pub fn contains_line_break(value: &str) -> bool {
    value.bytes().any(|b| b == b'\r' || b == b'\n')
}

/// Validate a free-text recipient field.
pub fn validate_recipients(spec: &str) -> ValidationVerdict {
    if contains_line_break(spec) {
        return ValidationVerdict::Rejected(RejectReason::LineBreak);
    }

    let entries = split_entries(spec);
    if entries.is_empty() {
        return ValidationVerdict::Rejected(RejectReason::Empty);
    }

    let total = entries.len();
    let list: RecipientList = entries.into_iter().filter_map(parse_mailbox).collect();
    if list.len() < total {
        tracing::debug!(
            entries = total,
            accepted = list.len(),
            "skipped malformed recipient entries"
        );
    }

    if list.is_empty() {
        ValidationVerdict::Rejected(RejectReason::NoValidAddress)
    } else {
        ValidationVerdict::Accepted(list)
    }
}

/// Split on commas that sit outside quotes.
///
/// Angle brackets do not protect commas: an address never contains one, and
/// an unclosed `<` must not swallow the entries after it.
fn split_entries(spec: &str) -> SmallVec<[&str; 4]> {
    let mut entries = SmallVec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (idx, c) in spec.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                push_entry(&mut entries, &spec[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    push_entry(&mut entries, &spec[start..]);
    entries
}

fn push_entry<'a>(entries: &mut SmallVec<[&'a str; 4]>, entry: &'a str) {
    let entry = entry.trim();
    if !entry.is_empty() {
        entries.push(entry);
    }
}

/// Parse `addr`, `Name <addr>` or `"Name" <addr>`.
fn parse_mailbox(entry: &str) -> Option<Mailbox> {
    let Some(open) = find_unquoted(entry, '<') else {
        return is_valid_address(entry).then(|| Mailbox::new(entry));
    };

    let rest = &entry[open + 1..];
    let close = rest.find('>')?;
    if !rest[close + 1..].trim().is_empty() {
        return None;
    }

    let address = rest[..close].trim();
    if !is_valid_address(address) {
        return None;
    }

    let name = parse_display_name(entry[..open].trim())?;
    Some(Mailbox {
        name,
        address: address.to_owned(),
    })
}

/// `Ok(None)`-style: outer `None` means invalid, inner `None` means no name.
fn parse_display_name(raw: &str) -> Option<Option<String>> {
    if raw.is_empty() {
        return Some(None);
    }

    let name = if let Some(quoted) = raw.strip_prefix('"') {
        let inner = quoted.strip_suffix('"')?;
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => out.push(chars.next()?),
                '"' => return None,
                other => out.push(other),
            }
        }
        out
    } else {
        if raw.contains('"') {
            return None;
        }
        raw.to_owned()
    };

    if name.chars().any(char::is_control) {
        return None;
    }
    let name = name.trim();
    Some((!name.is_empty()).then(|| name.to_owned()))
}

fn find_unquoted(entry: &str, needle: char) -> Option<usize> {
    let mut in_quotes = false;
    let mut escaped = false;
    for (idx, c) in entry.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            c if c == needle && !in_quotes => return Some(idx),
            _ => {}
        }
    }
    None
}

/// Syntactic address check: `local@domain.tld`.
pub fn is_valid_address(address: &str) -> bool {
    if address.len() > MAX_ADDRESS_LEN {
        return false;
    }
    let Some((local, domain)) = address.split_once('@') else {
        return false;
    };
    is_valid_local(local) && is_valid_domain(domain)
}

fn is_valid_local(local: &str) -> bool {
    const SPECIALS: &[u8] = b"!#$%&'*+-/=?^_`{|}~.";

    (1..=MAX_LOCAL_LEN).contains(&local.len())
        && !local.starts_with('.')
        && !local.ends_with('.')
        && !local.contains("..")
        && local
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || SPECIALS.contains(&b))
}

fn is_valid_domain(domain: &str) -> bool {
    if domain.is_empty() || domain.len() > MAX_DOMAIN_LEN {
        return false;
    }
    let mut labels = 0;
    for label in domain.split('.') {
        let valid = (1..=MAX_LABEL_LEN).contains(&label.len())
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-');
        if !valid {
            return false;
        }
        labels += 1;
    }
    labels >= 2
}
