//! Text helpers shared by the responders and the gateway logs.

use chrono::{DateTime, TimeZone};

/// `3:07:09 PM`
pub fn clock_time<Tz: TimeZone>(t: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    t.format("%-I:%M:%S %p").to_string()
}

/// `Sun Oct 18 2026`
pub fn calendar_date<Tz: TimeZone>(t: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    t.format("%a %b %d %Y").to_string()
}

/// Cut `s` to `max_chars` characters, appending `...` when something was cut.
pub fn preview(s: &str, max_chars: usize) -> String {
    let mut chars = s.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
