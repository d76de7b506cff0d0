//! String helpers shared by the metadata and format code.

use std::time::Duration;

/// Replace typographic characters with their ASCII counterparts.
pub fn clean_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\u{2019}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2026}' => out.push_str("..."),
            '\u{00A0}' | '\u{0085}' => out.push(' '),
            c => out.push(c),
        }
    }
    out
}

/// Convert `s` into a URL-friendly slug.
///
/// Every run of characters outside `[a-z0-9-]` collapses into one dash;
/// leading and trailing dashes are dropped.
pub fn slug(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut dash = true;
    for c in s.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() || (c == '-' && !dash) {
            out.push(c);
            dash = c == '-';
        } else if !dash {
            out.push('-');
            dash = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// Convert a human-written key such as `Feedback Link` or `analyticsAccount`
/// into `snake_case`.
pub fn snake_case(s: &str) -> String {
    let chars: Vec<char> = s.trim().chars().collect();
    let mut out = String::with_capacity(s.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }
        if c.is_uppercase() && i > 0 && !out.is_empty() && !out.ends_with('_') {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_lower) {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// Split a comma separated list, trimming entries and dropping empty and
/// repeated ones while keeping the first-seen order.
pub fn normalized_split(s: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for part in s.split(',') {
        let part = part.trim();
        if part.is_empty() || out.iter().any(|p| p == part) {
            continue;
        }
        out.push(part.to_string());
    }
    out
}

/// Same as [`normalized_split`], lower-casing every entry.
pub fn normalized_split_lower(s: &str) -> Vec<String> {
    normalized_split(&s.to_lowercase())
}

/// Sort and deduplicate in place.
pub fn sort_unique(v: &mut Vec<String>) {
    v.sort();
    v.dedup();
}

const DURATION_FACTORS: [u64; 3] = [3600, 60, 1];

/// Parse the leading run of digits and dots of `s`, as in `120.5px`.
pub fn leading_number(s: &str) -> Option<f32> {
    let end = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    s[..end].parse().ok()
}

/// Parse a step duration such as `5`, `1:30` or `1:02:03`.
///
/// Fields are right-aligned against hours, minutes and seconds, with a single
/// bare number meaning minutes. Fields that are not numbers are ignored, so
/// garbage yields zero. The result is rounded up to a whole minute.
pub fn parse_duration(value: &str) -> Duration {
    let mut parts: Vec<&str> = value.splitn(DURATION_FACTORS.len(), ':').collect();
    if parts.len() == 1 {
        parts.push("0");
    }
    let offset = DURATION_FACTORS.len() - parts.len();
    let mut secs = 0u64;
    for (i, part) in parts.iter().enumerate() {
        match part.trim().parse::<u64>() {
            Ok(v) => secs = secs.saturating_add(v.saturating_mul(DURATION_FACTORS[offset + i])),
            Err(_) => tracing::debug!(field = %part, "ignoring non-numeric duration field"),
        }
    }
    round_up_to_minute(Duration::from_secs(secs))
}

/// Round a duration up to the next whole minute.
pub fn round_up_to_minute(d: Duration) -> Duration {
    let minutes = d.as_secs().div_ceil(60);
    Duration::from_secs(minutes.saturating_mul(60))
}
