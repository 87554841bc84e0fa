//! Author and committer signatures
//!
//! A signature line in a raw commit looks like
//! `Name <email@example.com> 1700000000 +0200`. Older tooling may also write
//! a human date after the email: `Mon Jan 2 15:04:05 2006 -0700`.

use crate::errors::{GitError, Result};
use chrono::{DateTime, FixedOffset};
use derive_new::new;

const HUMAN_DATE_FORMAT: &str = "%a %b %e %H:%M:%S %Y %z";

/// Author or committer information
///
/// Contains name, email, and timestamp with timezone information.
#[derive(Debug, Clone, Eq, PartialEq, new)]
pub struct Signature {
    name: String,
    email: String,
    when: DateTime<FixedOffset>,
}

impl Signature {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn when(&self) -> DateTime<FixedOffset> {
        self.when
    }

    /// Format author name and email for display
    ///
    /// # Returns
    ///
    /// String in format "Name <email@example.com>"
    pub fn display_name(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }

    /// Format complete signature the way it appears in a raw commit
    ///
    /// # Returns
    ///
    /// String in format "Name <email> timestamp timezone"
    pub fn display(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.when.timestamp(),
            self.when.format("%z")
        )
    }

    /// Format timestamp in human-readable form
    ///
    /// # Returns
    ///
    /// String like "Mon Jan 1 12:34:56 2024 +0000"
    pub fn readable_timestamp(&self) -> String {
        self.when.format("%a %b %-d %H:%M:%S %Y %z").to_string()
    }
}

impl TryFrom<&str> for Signature {
    type Error = GitError;

    fn try_from(value: &str) -> Result<Self> {
        let email_start = value
            .find('<')
            .ok_or_else(|| GitError::parse("signature", format!("missing '<' in {value:?}")))?;
        let email_end = value[email_start..]
            .find('>')
            .map(|offset| email_start + offset)
            .ok_or_else(|| GitError::parse("signature", format!("missing '>' in {value:?}")))?;

        let name = value[..email_start].trim_end().to_string();
        let email = value[email_start + 1..email_end].to_string();
        let date = value[email_end + 1..].trim();

        let when = if date.starts_with(|c: char| c.is_ascii_digit()) {
            parse_raw_date(date)?
        } else {
            DateTime::parse_from_str(date, HUMAN_DATE_FORMAT)
                .map_err(|e| GitError::parse("signature date", format!("{date:?}: {e}")))?
        };

        Ok(Signature { name, email, when })
    }
}

/// `<unix seconds> <+hhmm|-hhmm>`
fn parse_raw_date(date: &str) -> Result<DateTime<FixedOffset>> {
    let invalid = |reason: &str| GitError::parse("signature date", format!("{date:?}: {reason}"));

    let (seconds, offset) = date.split_once(' ').unwrap_or((date, "+0000"));
    let seconds = seconds
        .parse::<i64>()
        .map_err(|_| invalid("bad timestamp"))?;
    let offset = parse_offset(offset.trim()).ok_or_else(|| invalid("bad timezone"))?;

    DateTime::from_timestamp(seconds, 0)
        .map(|utc| utc.with_timezone(&offset))
        .ok_or_else(|| invalid("timestamp out of range"))
}

fn parse_offset(offset: &str) -> Option<FixedOffset> {
    let (sign, digits) = match offset.as_bytes().first()? {
        b'+' => (1, &offset[1..]),
        b'-' => (-1, &offset[1..]),
        _ => return None,
    };
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let hours = digits[..2].parse::<i32>().ok()?;
    let minutes = digits[2..].parse::<i32>().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
