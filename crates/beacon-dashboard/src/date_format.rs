//! Display formatting for the loosely-formatted UTC timestamps the backend emits.

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Offset, TimeZone, Utc};

pub const NOT_AVAILABLE: &str = "N/A";

const DATE_TIME_PATTERN: &str = "%b %-d, %Y, %-I:%M %p";
const DATE_ONLY_PATTERN: &str = "%b %-d, %Y";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Zone used to present timestamps: the viewer's local zone or a fixed offset.
pub enum DisplayZone {
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl DisplayZone {
    pub fn utc() -> Self {
        Self::Fixed(Utc.fix())
    }

    fn render(&self, timestamp: DateTime<Utc>, pattern: &str) -> String {
        match self {
            Self::Local => timestamp.with_timezone(&Local).format(pattern).to_string(),
            Self::Fixed(offset) => timestamp.with_timezone(offset).format(pattern).to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatOptions<'a> {
    pub prefix: &'a str,
    pub date_only: bool,
}

impl<'a> FormatOptions<'a> {
    pub fn with_prefix(prefix: &'a str) -> Self {
        Self {
            prefix,
            date_only: false,
        }
    }

    pub fn date_only() -> Self {
        Self {
            prefix: "",
            date_only: true,
        }
    }
}

fn has_explicit_offset(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    if bytes.len() < 6 {
        return false;
    }
    let suffix = &bytes[bytes.len() - 6..];
    matches!(suffix[0], b'+' | b'-')
        && suffix[1].is_ascii_digit()
        && suffix[2].is_ascii_digit()
        && suffix[3] == b':'
        && suffix[4].is_ascii_digit()
        && suffix[5].is_ascii_digit()
}

fn parse_offset_suffix(suffix: &str) -> Option<FixedOffset> {
    let sign = match suffix.as_bytes().first()? {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let hours = suffix.get(1..3)?.parse::<i32>().ok()?;
    let minutes = suffix.get(4..6)?.parse::<i32>().ok()?;
    FixedOffset::east_opt(sign * (hours * 3_600 + minutes * 60))
}

fn parse_minute_precision(normalized: &str) -> Option<DateTime<Utc>> {
    let (body, offset) = if let Some(body) = normalized.strip_suffix('Z') {
        (body, Utc.fix())
    } else if has_explicit_offset(normalized) {
        let split = normalized.len() - 6;
        (
            &normalized[..split],
            parse_offset_suffix(&normalized[split..])?,
        )
    } else {
        return None;
    };
    let naive = NaiveDateTime::parse_from_str(body, "%Y-%m-%dT%H:%M").ok()?;
    let zoned = offset.from_local_datetime(&naive).single()?;
    Some(zoned.with_timezone(&Utc))
}

/// Parses a backend timestamp, treating values without `Z` or `±HH:MM` as UTC.
pub fn parse_utc_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut normalized = trimmed.replacen(' ', "T", 1);
    if !normalized.ends_with('Z') && !has_explicit_offset(&normalized) {
        normalized.push('Z');
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(parsed.with_timezone(&Utc));
    }
    parse_minute_precision(&normalized)
}

/// Formats a backend timestamp for display in the viewer's local zone.
pub fn format_to_local(raw: Option<&str>, options: FormatOptions<'_>) -> String {
    format_in_zone(raw, options, DisplayZone::Local)
}

/// Formats a backend timestamp in `zone`.
///
/// Missing, blank, or `N/A` input yields `N/A`; unparseable input is returned
/// unchanged so the viewer still sees what the server sent.
pub fn format_in_zone(raw: Option<&str>, options: FormatOptions<'_>, zone: DisplayZone) -> String {
    let Some(input) = raw else {
        return NOT_AVAILABLE.to_string();
    };
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed == NOT_AVAILABLE {
        return NOT_AVAILABLE.to_string();
    }
    let Some(parsed) = parse_utc_timestamp(trimmed) else {
        return input.to_string();
    };
    let pattern = if options.date_only {
        DATE_ONLY_PATTERN
    } else {
        DATE_TIME_PATTERN
    };
    format!("{}{}", options.prefix, zone.render(parsed, pattern))
}
