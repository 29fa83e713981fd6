//! Human-readable date and time for the invitation page.

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use rust_i18n::t;
use serde::Serialize;
use std::fmt::Write;
use tracing::error;

/// A supported display language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayLocale {
    /// Language code as used in links and translation tables
    pub code: &'static str,
    /// Full locale tag
    pub tag: &'static str,
    chrono: chrono::Locale,
}

const LOCALES: [DisplayLocale; 4] = [
    DisplayLocale {
        code: "en",
        tag: "en-US",
        chrono: chrono::Locale::en_US,
    },
    DisplayLocale {
        code: "fi",
        tag: "fi-FI",
        chrono: chrono::Locale::fi_FI,
    },
    DisplayLocale {
        code: "sv",
        tag: "sv-SE",
        chrono: chrono::Locale::sv_SE,
    },
    DisplayLocale {
        code: "de",
        tag: "de-DE",
        chrono: chrono::Locale::de_DE,
    },
];

fn find_locale(lang: &str) -> Option<&'static DisplayLocale> {
    let code = lang.split(['-', '_']).next().unwrap_or_default();
    LOCALES
        .iter()
        .find(|locale| locale.code.eq_ignore_ascii_case(code))
}

/// Pick the display locale for a language code, falling back to `default`
/// and then to English
pub fn resolve_locale(lang: Option<&str>, default: &str) -> &'static DisplayLocale {
    lang.and_then(find_locale)
        .or_else(|| find_locale(default))
        .unwrap_or(&LOCALES[0])
}

/// Date and time strings shown on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayDateTime {
    pub date: String,
    pub time: String,
}

impl DisplayDateTime {
    /// Placeholder pair used when formatting fails
    pub fn unavailable(locale: &DisplayLocale) -> Self {
        DisplayDateTime {
            date: t!("date_unavailable", locale = locale.code).to_string(),
            time: t!("time_unavailable", locale = locale.code).to_string(),
        }
    }
}

/// Format start and end in the given IANA timezone.
///
/// Events crossing midnight in that zone show a date range; others show one
/// date and a time range. An unknown timezone yields the placeholders.
pub fn format_event_date_time(
    start: &DateTime<Utc>,
    end: &DateTime<Utc>,
    timezone: &str,
    locale: &DisplayLocale,
) -> DisplayDateTime {
    let tz: Tz = match timezone.parse() {
        Ok(tz) => tz,
        Err(e) => {
            error!("Error formatting date/time for '{}': {}", timezone, e);
            return DisplayDateTime::unavailable(locale);
        }
    };

    match format_in_zone(start, end, &tz, locale) {
        Some(display) => display,
        None => {
            error!("Error formatting date/time in {}", timezone);
            DisplayDateTime::unavailable(locale)
        }
    }
}

fn format_in_zone(
    start: &DateTime<Utc>,
    end: &DateTime<Utc>,
    tz: &Tz,
    locale: &DisplayLocale,
) -> Option<DisplayDateTime> {
    let start = tz.from_utc_datetime(&start.naive_utc());
    let end = tz.from_utc_datetime(&end.naive_utc());

    let date_format = t!("date_format", locale = locale.code);
    let time_format = t!("time_format", locale = locale.code);
    let separator = t!("range_separator", locale = locale.code);

    let start_time = render(&start, &time_format, locale)?;
    let end_time = render(&end, &time_format, locale)?;
    let time = format!("{}{}{}", start_time, separator, end_time);

    let date = if start.date_naive() != end.date_naive() {
        format!(
            "{}{}{}",
            render(&start, &date_format, locale)?,
            separator,
            render(&end, &date_format, locale)?
        )
    } else {
        render(&start, &date_format, locale)?
    };

    Some(DisplayDateTime { date, time })
}

/// Render without panicking on a bad pattern
fn render(instant: &DateTime<Tz>, pattern: &str, locale: &DisplayLocale) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", instant.format_localized(pattern, locale.chrono)).ok()?;
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn en() -> &'static DisplayLocale {
        resolve_locale(Some("en"), "en")
    }

    #[test]
    fn test_resolve_locale() {
        assert_eq!(resolve_locale(Some("fi"), "en").tag, "fi-FI");
        assert_eq!(resolve_locale(Some("sv-SE"), "en").tag, "sv-SE");
        assert_eq!(resolve_locale(Some("DE"), "en").tag, "de-DE");
        assert_eq!(resolve_locale(Some("xx"), "fi").tag, "fi-FI");
        assert_eq!(resolve_locale(None, "xx").tag, "en-US");
    }

    #[test]
    fn test_single_day() {
        let start = Utc.with_ymd_and_hms(2025, 3, 10, 16, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 3, 10, 17, 30, 0).unwrap();
        let display = format_event_date_time(&start, &end, "Europe/Helsinki", en());

        assert_eq!(display.date, "Monday, March 10, 2025");
        assert_eq!(display.time, "6:00 PM – 7:30 PM");
    }

    #[test]
    fn test_multi_day_depends_on_timezone() {
        let start = Utc.with_ymd_and_hms(2025, 11, 23, 23, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 11, 24, 1, 0, 0).unwrap();

        let utc = format_event_date_time(&start, &end, "UTC", en());
        assert_eq!(
            utc.date,
            "Sunday, November 23, 2025 – Monday, November 24, 2025"
        );
        assert_eq!(utc.time, "11:00 PM – 1:00 AM");

        let new_york = format_event_date_time(&start, &end, "America/New_York", en());
        assert_eq!(new_york.date, "Sunday, November 23, 2025");
        assert_eq!(new_york.time, "6:00 PM – 8:00 PM");
    }

    #[test]
    fn test_unknown_timezone_gives_placeholders() {
        let start = Utc.with_ymd_and_hms(2025, 3, 10, 16, 0, 0).unwrap();
        let display = format_event_date_time(&start, &start, "Mars/Olympus", en());
        assert_eq!(display.date, "Date unavailable");
        assert_eq!(display.time, "Time unavailable");
    }

    #[test]
    fn test_localized_time_format() {
        let start = Utc.with_ymd_and_hms(2025, 3, 10, 16, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 3, 10, 17, 0, 0).unwrap();
        let fi = resolve_locale(Some("fi"), "en");
        let display = format_event_date_time(&start, &end, "Europe/Helsinki", fi);
        assert_eq!(display.time, "18.00 – 19.00");
    }
}
