use std::fmt;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const UNIT_PREFIXES: [&str; 7] = ["", "K", "M", "G", "T", "P", "E"];

pub fn truncate_unicode(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width.saturating_sub(1) {
            result.push('\u{2026}');
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result
}

/// A byte count scaled to a 1024-based prefix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FormattedSize {
    pub magnitude: f64,
    /// One of `""`, `K`, `M`, `G`, `T`, `P`, `E`.
    pub unit_prefix: &'static str,
}

impl FormattedSize {
    /// The exponent is `floor(log1024(bytes))`, taken from the bit length so
    /// no logarithm of zero is ever evaluated. Anything at or beyond an
    /// exbibyte stays on the `E` prefix.
    pub fn from_bytes(bytes: u64) -> Self {
        if bytes < 1024 {
            return FormattedSize {
                magnitude: bytes as f64,
                unit_prefix: "",
            };
        }
        let exp = ((63 - bytes.leading_zeros()) / 10).min(UNIT_PREFIXES.len() as u32 - 1);
        FormattedSize {
            magnitude: bytes as f64 / 1024f64.powi(exp as i32),
            unit_prefix: UNIT_PREFIXES[exp as usize],
        }
    }
}

impl fmt::Display for FormattedSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit_prefix.is_empty() {
            write!(f, "{} B", self.magnitude)
        } else {
            write!(f, "{:.1} {}B", self.magnitude, self.unit_prefix)
        }
    }
}

/// Render a byte count with a 1024-based prefix, e.g. `1536 -> "1.5 KB"`.
pub fn format_bytes(bytes: u64) -> String {
    FormattedSize::from_bytes(bytes).to_string()
}

/// Render a fraction as a percentage with two decimals, rounding half away
/// from zero. Out-of-range values are rendered as given.
pub fn format_rate(fraction: f64) -> String {
    let percent = (fraction * 10_000.0).round() / 100.0;
    format!("{percent:.2}%")
}

pub fn format_uptime(days: u64, hours: u64, minutes: u64) -> String {
    format!("{days} days {hours} hours {minutes} minutes")
}
