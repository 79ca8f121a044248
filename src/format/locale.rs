//! Locale tag parsing and the handful of conventions structured formats need.

use std::fmt::Write as _;

use chrono::{DateTime, Locale, Utc};

/// Order of the day, month and year fields in a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    MonthFirst,
    DayFirst,
    YearFirst,
}

/// Locale-dependent layout rules for structured display options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conventions {
    pub hour12: bool,
    pub order: DateOrder,
    pub numeric_separator: &'static str,
    /// The locale has AM/PM names to show after a 12-hour clock.
    pub day_period: bool,
}

/// Language-only tags whose default region is not the language code itself.
const DEFAULT_REGIONS: &[(&str, &str)] = &[
    ("en", "US"),
    ("ja", "JP"),
    ("zh", "CN"),
    ("ko", "KR"),
    ("sv", "SE"),
    ("da", "DK"),
    ("nb", "NO"),
    ("nn", "NO"),
    ("cs", "CZ"),
    ("el", "GR"),
    ("uk", "UA"),
    ("he", "IL"),
    ("hi", "IN"),
    ("ar", "EG"),
    ("et", "EE"),
    ("sl", "SI"),
    ("ca", "ES"),
];

/// Parses a locale tag such as `de`, `de-DE`, `de_DE` or `de_DE.UTF-8`.
pub fn parse_locale(tag: &str) -> Option<Locale> {
    let tag = tag.trim();
    let tag = tag.split(['.', '@']).next().unwrap_or(tag);
    if tag.is_empty() {
        return None;
    }
    if tag == "C" || tag == "POSIX" {
        return Some(Locale::POSIX);
    }

    let mut parts = tag.split(['-', '_']);
    let language = parts.next()?.to_ascii_lowercase();
    let region = match parts.next() {
        Some(region) => region.to_ascii_uppercase(),
        None => DEFAULT_REGIONS
            .iter()
            .find(|(lang, _)| *lang == language)
            .map(|(_, region)| (*region).to_string())
            .unwrap_or_else(|| language.to_ascii_uppercase()),
    };

    Locale::try_from(format!("{}_{}", language, region).as_str()).ok()
}

/// The process locale from `LC_ALL`, `LC_TIME` or `LANG`, else POSIX.
pub fn system_locale() -> Locale {
    ["LC_ALL", "LC_TIME", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .filter(|value| !value.is_empty())
        .find_map(|value| parse_locale(&value))
        .unwrap_or(Locale::POSIX)
}

pub fn conventions(locale: Locale) -> Conventions {
    let name = locale.to_string();
    let language = name.split('_').next().unwrap_or_default();

    let (hour12, order, numeric_separator) = match name.as_str() {
        "POSIX" => (false, DateOrder::MonthFirst, "/"),
        "en_US" | "en_PH" => (true, DateOrder::MonthFirst, "/"),
        "en_AU" | "en_CA" | "en_NZ" | "en_IN" | "hi_IN" => (true, DateOrder::DayFirst, "/"),
        _ => match language {
            "ja" | "zh" | "ko" | "hu" | "lt" => (false, DateOrder::YearFirst, "/"),
            "de" | "ru" | "pl" | "cs" | "fi" | "nb" | "nn" | "da" | "tr" | "uk" | "sk" | "et"
            | "lv" => (false, DateOrder::DayFirst, "."),
            _ => (false, DateOrder::DayFirst, "/"),
        },
    };

    Conventions {
        hour12,
        order,
        numeric_separator,
        day_period: has_day_period(locale),
    }
}

/// Whether the locale names AM and PM. Many 24-hour locales leave them empty.
fn has_day_period(locale: Locale) -> bool {
    let mut names = String::new();
    let rendered = write!(
        names,
        "{}",
        DateTime::<Utc>::UNIX_EPOCH.format_localized("%p", locale)
    );
    rendered.is_ok() && !names.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_locale_variants() {
        assert_eq!(parse_locale("de-DE"), Some(Locale::de_DE));
        assert_eq!(parse_locale("de_DE.UTF-8"), Some(Locale::de_DE));
        assert_eq!(parse_locale("de"), Some(Locale::de_DE));
        assert_eq!(parse_locale("en"), Some(Locale::en_US));
        assert_eq!(parse_locale("en-gb"), Some(Locale::en_GB));
        assert_eq!(parse_locale("ja"), Some(Locale::ja_JP));
        assert_eq!(parse_locale("C"), Some(Locale::POSIX));
    }

    #[test]
    fn test_parse_locale_rejects_unknown() {
        assert_eq!(parse_locale(""), None);
        assert_eq!(parse_locale("xx-YY"), None);
        assert_eq!(parse_locale("klingon"), None);
    }

    #[test]
    fn test_conventions() {
        assert!(conventions(Locale::en_US).hour12);
        assert_eq!(conventions(Locale::en_US).order, DateOrder::MonthFirst);
        assert_eq!(conventions(Locale::de_DE).order, DateOrder::DayFirst);
        assert_eq!(conventions(Locale::de_DE).numeric_separator, ".");
        assert!(!conventions(Locale::de_DE).hour12);
        assert_eq!(conventions(Locale::ja_JP).order, DateOrder::YearFirst);
        assert_eq!(conventions(Locale::fr_FR).numeric_separator, "/");
        assert!(!conventions(Locale::POSIX).hour12);
    }

    #[test]
    fn test_day_period_names() {
        assert!(conventions(Locale::en_US).day_period);
        assert!(conventions(Locale::POSIX).day_period);
        assert!(!conventions(Locale::de_DE).day_period);
    }
}
