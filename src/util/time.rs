use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};

const FALLBACK_FORMAT: &str = "%Y-%m-%d %H:%M";

/// How timestamps are displayed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DateFormat {
    #[default]
    Relative,
    /// A strftime pattern (already translated from Go layouts).
    Pattern(String),
}

impl DateFormat {
    /// Accepts `relative` (or an empty string), a strftime pattern such as
    /// `%Y-%m-%d`, or a Go reference layout such as `2006-01-02 15:04`.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("relative") {
            return DateFormat::Relative;
        }

        let pattern = if value.contains('%') {
            value.to_string()
        } else {
            go_layout_to_strftime(value)
        };

        if StrftimeItems::new(&pattern).any(|item| matches!(item, Item::Error)) {
            tracing::warn!(format = value, "invalid date format, using default");
            return DateFormat::Pattern(FALLBACK_FORMAT.to_string());
        }
        DateFormat::Pattern(pattern)
    }
}

pub fn format_time(dt: DateTime<Utc>, format: &DateFormat) -> String {
    match format {
        DateFormat::Relative => relative_time(dt),
        DateFormat::Pattern(pattern) => dt.format(pattern).to_string(),
    }
}

pub fn relative_time(dt: DateTime<Utc>) -> String {
    relative_time_from(dt, Utc::now())
}

fn relative_time_from(dt: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(dt);
    if duration.num_seconds() < 0 {
        return "just now".to_string();
    }

    let days = duration.num_days();
    if duration.num_minutes() < 1 {
        format!("{}s ago", duration.num_seconds())
    } else if duration.num_hours() < 1 {
        format!("{}m ago", duration.num_minutes())
    } else if days < 1 {
        format!("{}h ago", duration.num_hours())
    } else if days < 30 {
        format!("{}d ago", days)
    } else if days < 365 {
        format!("{}mo ago", days / 30)
    } else {
        format!("{}y ago", days / 365)
    }
}

// Longest tokens first so `2006` wins over `2` and `January` over `Jan`.
const GO_LAYOUT_TOKENS: &[(&str, &str)] = &[
    ("January", "%B"),
    ("Monday", "%A"),
    ("-07:00", "%:z"),
    ("-0700", "%z"),
    ("2006", "%Y"),
    (".000", "%.3f"),
    ("Jan", "%b"),
    ("Mon", "%a"),
    ("MST", "%Z"),
    ("_2", "%e"),
    ("01", "%m"),
    ("02", "%d"),
    ("03", "%I"),
    ("04", "%M"),
    ("05", "%S"),
    ("06", "%y"),
    ("15", "%H"),
    ("PM", "%p"),
    ("pm", "%P"),
    ("1", "%-m"),
    ("2", "%-d"),
    ("3", "%-I"),
    ("4", "%-M"),
    ("5", "%-S"),
];

fn go_layout_to_strftime(layout: &str) -> String {
    let mut out = String::with_capacity(layout.len() * 2);
    let mut rest = layout;

    'outer: while let Some(ch) = rest.chars().next() {
        for (token, strftime) in GO_LAYOUT_TOKENS {
            if let Some(tail) = rest.strip_prefix(token) {
                out.push_str(strftime);
                rest = tail;
                continue 'outer;
            }
        }
        if ch == '%' {
            out.push_str("%%");
        } else {
            out.push(ch);
        }
        rest = &rest[ch.len_utf8()..];
    }
    out
}
