//! Author/committer identity formatting, per data model §3 and external
//! interfaces §6: `<name> <email> <unix-seconds> <±HHMM>`.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use anyhow::{anyhow, Context};
use chrono::{FixedOffset, Local, TimeZone};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Time {
    pub seconds: i64,
    pub tz_offset_minutes: i32,
}

impl Time {
    /// The current local time, DST-aware, per §6's timestamp format.
    pub fn now() -> Self {
        let now = Local::now();
        Self { seconds: now.timestamp(), tz_offset_minutes: now.offset().local_minus_utc() / 60 }
    }
}

impl Display for Time {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let sign = if self.tz_offset_minutes < 0 { '-' } else { '+' };
        let abs = self.tz_offset_minutes.abs();
        write!(f, "{} {}{:02}{:02}", self.seconds, sign, abs / 60, abs % 60)
    }
}

impl FromStr for Time {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (secs, tz) =
            s.split_once(' ').ok_or_else(|| anyhow!("malformed timestamp `{}`", s))?;
        let seconds = secs.parse().with_context(|| format!("invalid unix timestamp `{}`", secs))?;
        if tz.len() != 5 {
            return Err(anyhow!("malformed timezone offset `{}`", tz));
        }
        let sign = match &tz[0..1] {
            "+" => 1,
            "-" => -1,
            _ => return Err(anyhow!("malformed timezone offset `{}`", tz)),
        };
        let hours: i32 = tz[1..3].parse().with_context(|| format!("invalid offset `{}`", tz))?;
        let minutes: i32 = tz[3..5].parse().with_context(|| format!("invalid offset `{}`", tz))?;
        Ok(Self { seconds, tz_offset_minutes: sign * (hours * 60 + minutes) })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub time: Time,
}

impl Signature {
    pub fn now(name: String, email: String) -> Self {
        Self { name, email, time: Time::now() }
    }

    /// Render `self.time` as a [`FixedOffset`] datetime, mostly useful for
    /// display/log formatting in collaborators.
    pub fn datetime(&self) -> anyhow::Result<chrono::DateTime<FixedOffset>> {
        let offset = FixedOffset::east_opt(self.time.tz_offset_minutes * 60)
            .ok_or_else(|| anyhow!("timezone offset out of range"))?;
        offset
            .timestamp_opt(self.time.seconds, 0)
            .single()
            .ok_or_else(|| anyhow!("timestamp out of range"))
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> {}", self.name, self.email, self.time)
    }
}

impl FromStr for Signature {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let email_start =
            s.find('<').ok_or_else(|| anyhow!("malformed signature `{}`: missing `<`", s))?;
        let email_end =
            s.find('>').ok_or_else(|| anyhow!("malformed signature `{}`: missing `>`", s))?;
        let name = s[..email_start].trim_end().to_owned();
        let email = s[email_start + 1..email_end].to_owned();
        let time = s[email_end + 1..].trim_start().parse()?;
        Ok(Self { name, email, time })
    }
}

/// Missing-identity fallback per §6's config table: `user.name`/`user.email`,
/// else the corresponding `GIT_AUTHOR_*` environment variable, else these.
pub const MISSING_IDENTITY_NAME: &str = "Unknown";
pub const MISSING_IDENTITY_EMAIL: &str = "unknown@example.com";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_round_trips() {
        let sig = Signature {
            name: "Alice Example".to_owned(),
            email: "alice@example.com".to_owned(),
            time: Time { seconds: 1234567890, tz_offset_minutes: -330 },
        };
        let text = sig.to_string();
        assert_eq!(text, "Alice Example <alice@example.com> 1234567890 -0530");
        assert_eq!(text.parse::<Signature>().unwrap(), sig);
    }

    #[test]
    fn positive_offset_formats_with_plus() {
        let time = Time { seconds: 0, tz_offset_minutes: 60 };
        assert_eq!(time.to_string(), "0 +0100");
    }

    #[test]
    fn rejects_malformed_signature() {
        assert!("no angle brackets here".parse::<Signature>().is_err());
    }
}
