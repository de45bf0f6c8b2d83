//! Date helper functions

use chrono::{DateTime, Locale, Utc};
use chrono_tz::Tz;

/// Format a UTC timestamp using a date-fns compatible pattern
///
/// # Examples
/// ```ignore
/// format_date(&date, "dd MMM yyyy", Locale::en_US, chrono_tz::UTC) // -> "15 Mar 2021"
/// ```
pub fn format_date(date: &DateTime<Utc>, pattern: &str, locale: Locale, tz: Tz) -> String {
    let chrono_format = date_fns_to_chrono_format(pattern);
    date.with_timezone(&tz)
        .format_localized(&chrono_format, locale)
        .to_string()
}

/// Format a date in ISO 8601 / XML format
pub fn date_xml(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string()
}

/// Convert a date-fns format string to a chrono format string
///
/// Letters are grouped into runs (`dd`, `MMM`, ...). Text between single
/// quotes is copied literally and `''` stands for one quote.
fn date_fns_to_chrono_format(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut result = String::with_capacity(pattern.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            if chars.get(i + 1) == Some(&'\'') {
                result.push('\'');
                i += 2;
                continue;
            }
            i += 1;
            while i < chars.len() {
                if chars[i] == '\'' {
                    if chars.get(i + 1) == Some(&'\'') {
                        result.push('\'');
                        i += 2;
                        continue;
                    }
                    break;
                }
                push_literal(&mut result, chars[i]);
                i += 1;
            }
            // skip the closing quote
            i += 1;
            continue;
        }

        if c.is_ascii_alphabetic() {
            let start = i;
            while i < chars.len() && chars[i] == c {
                i += 1;
            }
            let len = i - start;
            match token_to_chrono(c, len) {
                Some(spec) => result.push_str(spec),
                None => {
                    for _ in 0..len {
                        push_literal(&mut result, c);
                    }
                }
            }
            continue;
        }

        push_literal(&mut result, c);
        i += 1;
    }

    result
}

fn token_to_chrono(token: char, len: usize) -> Option<&'static str> {
    let spec = match (token, len) {
        // Year
        ('y', 2) => "%y",
        ('y', _) => "%Y",
        // Month
        ('M', 1) => "%-m",
        ('M', 2) => "%m",
        ('M', 3) => "%b",
        ('M', _) => "%B",
        // Day of month
        ('d', 1) => "%-d",
        ('d', _) => "%d",
        // Day of week
        ('E', 4) => "%A",
        ('E', _) => "%a",
        // Hour
        ('H', 1) => "%-H",
        ('H', _) => "%H",
        ('h', 1) => "%-I",
        ('h', _) => "%I",
        // Minute / second
        ('m', 1) => "%-M",
        ('m', _) => "%M",
        ('s', 1) => "%-S",
        ('s', _) => "%S",
        // AM/PM
        ('a', _) => "%p",
        _ => return None,
    };
    Some(spec)
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_listing_date() {
        let date = Utc.with_ymd_and_hms(2021, 3, 15, 0, 0, 0).unwrap();
        assert_eq!(
            format_date(&date, "dd MMM yyyy", Locale::en_US, chrono_tz::UTC),
            "15 Mar 2021"
        );
    }

    #[test]
    fn test_format_updated_annotation() {
        let date = Utc.with_ymd_and_hms(2021, 3, 15, 19, 25, 0).unwrap();
        assert_eq!(
            format_date(
                &date,
                "dd MMM yyyy, 'at' HH:mm",
                Locale::en_US,
                chrono_tz::UTC
            ),
            "15 Mar 2021, at 19:25"
        );
    }

    #[test]
    fn test_format_respects_timezone() {
        // 01:00 UTC is still the previous day in Sao Paulo
        let date = Utc.with_ymd_and_hms(2021, 3, 16, 1, 0, 0).unwrap();
        assert_eq!(
            format_date(
                &date,
                "dd MMM yyyy",
                Locale::en_US,
                chrono_tz::America::Sao_Paulo
            ),
            "15 Mar 2021"
        );
    }

    #[test]
    fn test_date_fns_to_chrono() {
        assert_eq!(date_fns_to_chrono_format("dd MMM yyyy"), "%d %b %Y");
        assert_eq!(date_fns_to_chrono_format("HH:mm"), "%H:%M");
        assert_eq!(
            date_fns_to_chrono_format("dd MMM yyyy, 'at' HH:mm"),
            "%d %b %Y, at %H:%M"
        );
        assert_eq!(date_fns_to_chrono_format("'it''s' d"), "it's %-d");
        assert_eq!(date_fns_to_chrono_format("100%"), "100%%");
    }

    #[test]
    fn test_date_xml() {
        let date = Utc.with_ymd_and_hms(2021, 3, 15, 10, 30, 0).unwrap();
        assert_eq!(date_xml(&date), "2021-03-15T10:30:00.000+00:00");
    }
}
