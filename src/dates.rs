//! Date resolution for the date rules.
//!
//! A value is read as a date in this order: the explicit format (if any), then
//! a small free-form grammar (`now`, `today`, `+2 days`, RFC 3339, ISO dates).
//! Every failure is `None`; callers decide whether that is an error.

use chrono::{
    DateTime, Duration, FixedOffset, Local, Months, NaiveDate, NaiveDateTime, Offset, TimeZone,
};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static RELATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([+-]?\d+)\s*(sec|second|min|minute|hour|day|week|month|year)s?(\s+ago)?$")
        .expect("relative date pattern")
});

static OFFSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:utc|gmt)?([+-])(\d{1,2})(?::?(\d{2}))?$").expect("offset pattern")
});

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y", "%d %B %Y", "%B %d, %Y", "%d %b %Y"];

/// Where naive dates are anchored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Zone {
    Local,
    Fixed(FixedOffset),
    Named(Tz),
}

impl Zone {
    /// `None` for an unknown zone name. Absent names mean local time. IANA
    /// names (`Asia/Jakarta`) resolve through the tz database.
    pub fn parse(name: Option<&str>) -> Option<Zone> {
        let name = match name {
            None => return Some(Zone::Local),
            Some(n) => n.trim(),
        };
        if let Ok(tz) = name.parse::<Tz>() {
            return Some(Zone::Named(tz));
        }
        let name = name.to_ascii_lowercase();
        match name.as_str() {
            "" | "local" => Some(Zone::Local),
            "utc" | "gmt" | "z" => Some(Zone::Fixed(FixedOffset::east_opt(0)?)),
            other => {
                let caps = OFFSET.captures(other)?;
                let hours: i32 = caps[2].parse().ok()?;
                let minutes: i32 = caps.get(3).map_or(Some(0), |m| m.as_str().parse().ok())?;
                let secs = hours * 3600 + minutes * 60;
                let secs = if &caps[1] == "-" { -secs } else { secs };
                FixedOffset::east_opt(secs).map(Zone::Fixed)
            }
        }
    }

    pub fn now(self) -> DateTime<FixedOffset> {
        match self {
            Zone::Local => {
                let now = Local::now();
                now.with_timezone(&now.offset().fix())
            }
            Zone::Fixed(offset) => chrono::Utc::now().with_timezone(&offset),
            Zone::Named(tz) => {
                let now = chrono::Utc::now().with_timezone(&tz);
                now.with_timezone(&now.offset().fix())
            }
        }
    }

    pub fn localize(self, naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        match self {
            Zone::Local => {
                let dt = Local.from_local_datetime(&naive).earliest()?;
                Some(dt.with_timezone(&dt.offset().fix()))
            }
            Zone::Fixed(offset) => offset.from_local_datetime(&naive).single(),
            Zone::Named(tz) => {
                let dt = tz.from_local_datetime(&naive).earliest()?;
                Some(dt.with_timezone(&dt.offset().fix()))
            }
        }
    }

    fn midnight(self, date: NaiveDate) -> Option<DateTime<FixedOffset>> {
        self.localize(date.and_hms_opt(0, 0, 0)?)
    }
}

/// Resolve a document value to a date. Only strings are read.
pub fn resolve(value: &Value, format: Option<&str>, timezone: Option<&str>) -> Option<DateTime<FixedOffset>> {
    let text = value.as_str()?.trim();
    if text.is_empty() {
        return None;
    }
    let zone = Zone::parse(timezone)?;
    if let Some(format) = format {
        if let Some(date) = parse_with_format(text, format, zone) {
            return Some(date);
        }
    }
    parse_free_form(text, zone)
}

/// Free-form grammar: keywords, relative offsets, RFC 3339, common ISO layouts.
pub fn parse_free_form(text: &str, zone: Zone) -> Option<DateTime<FixedOffset>> {
    let lower = text.to_ascii_lowercase();
    let now = zone.now();
    match lower.as_str() {
        "now" => return Some(now),
        "today" | "midnight" => return zone.midnight(now.date_naive()),
        "yesterday" => return zone.midnight(now.date_naive().pred_opt()?),
        "tomorrow" => return zone.midnight(now.date_naive().succ_opt()?),
        _ => {}
    }
    if let Some(caps) = RELATIVE.captures(&lower) {
        let mut amount: i64 = caps[1].parse().ok()?;
        if caps.get(3).is_some() {
            amount = -amount;
        }
        return shift(now, amount, &caps[2]);
    }
    if let Some(ts) = lower.strip_prefix('@') {
        let secs: i64 = ts.parse().ok()?;
        return DateTime::from_timestamp(secs, 0).map(|dt| dt.with_timezone(&now.offset().fix()));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt);
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return zone.localize(naive);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return zone.midnight(date);
        }
    }
    None
}

fn shift(now: DateTime<FixedOffset>, amount: i64, unit: &str) -> Option<DateTime<FixedOffset>> {
    let seconds = match unit {
        "sec" | "second" => 1,
        "min" | "minute" => 60,
        "hour" => 3600,
        "day" => 86_400,
        "week" => 7 * 86_400,
        "month" | "year" => {
            let months = if unit == "year" { amount.checked_mul(12)? } else { amount };
            let step = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
            return if months >= 0 {
                now.checked_add_months(step)
            } else {
                now.checked_sub_months(step)
            };
        }
        _ => return None,
    };
    now.checked_add_signed(Duration::try_seconds(amount.checked_mul(seconds)?)?)
}

/// Parse with a caller-supplied format. `%`-style formats are used as-is;
/// otherwise the letter style (`Y-m-d H:i:s`) is translated first.
pub fn parse_with_format(text: &str, format: &str, zone: Zone) -> Option<DateTime<FixedOffset>> {
    let fmt = if format.contains('%') {
        format.to_string()
    } else {
        translate_format(format)
    };
    if fmt.contains("%z") || fmt.contains("%:z") {
        return DateTime::parse_from_str(text, &fmt).ok();
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, &fmt) {
        return zone.localize(naive);
    }
    NaiveDate::parse_from_str(text, &fmt)
        .ok()
        .and_then(|date| zone.midnight(date))
}

/// Translate letter-style date formats (`Y-m-d`) into chrono's `%` syntax.
pub fn translate_format(format: &str) -> String {
    let mut out = String::with_capacity(format.len() * 2);
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        let mapped = match c {
            'd' | 'j' => "%d",
            'm' | 'n' => "%m",
            'Y' => "%Y",
            'y' => "%y",
            'H' | 'G' => "%H",
            'h' | 'g' => "%I",
            'i' => "%M",
            's' => "%S",
            'A' | 'a' => "%p",
            'D' => "%a",
            'l' => "%A",
            'M' => "%b",
            'F' => "%B",
            'U' => "%s",
            'O' => "%z",
            'P' => "%:z",
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
                continue;
            }
            '%' => "%%",
            other => {
                out.push(other);
                continue;
            }
        };
        out.push_str(mapped);
    }
    out
}
