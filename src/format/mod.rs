//! Date/time formatting service.
//!
//! [`DateFormatter`] turns an instant, a zone, a locale and a [`FormatSpec`]
//! into display text. [`ChronoFormatter`] is the implementation backed by
//! chrono and chrono-tz.

mod locale;
mod options;
mod pattern;

pub use locale::{conventions, parse_locale, system_locale, Conventions, DateOrder};
pub use options::{DisplayOptions, MonthWidth, NumericWidth, TextWidth};
pub use pattern::{compile as compile_pattern, Segment};

use std::fmt::{self, Write as _};

use chrono::format::Item;
use chrono::{DateTime, Local, Locale, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("format pattern is empty")]
    EmptyPattern,
    #[error("unsupported token `{token}` in pattern `{pattern}`")]
    UnsupportedToken { token: String, pattern: String },
    #[error("unterminated quoted literal in pattern `{0}`")]
    UnterminatedLiteral(String),
    #[error("date could not be rendered with the compiled format")]
    Render,
}

/// How one display line is formatted: a literal pattern or structured
/// display-unit options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FormatSpec {
    Pattern(String),
    Options(DisplayOptions),
}

impl FormatSpec {
    /// Checks that the format can be compiled, without rendering anything.
    pub fn check(&self) -> Result<(), FormatError> {
        match self {
            FormatSpec::Pattern(pattern) => compile_pattern(pattern).map(|_| ()),
            FormatSpec::Options(_) => Ok(()),
        }
    }
}

impl From<&str> for FormatSpec {
    fn from(pattern: &str) -> Self {
        FormatSpec::Pattern(pattern.to_string())
    }
}

impl From<DisplayOptions> for FormatSpec {
    fn from(options: DisplayOptions) -> Self {
        FormatSpec::Options(options)
    }
}

/// The zone wall-clock time is shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Zone {
    /// The system's local zone.
    #[default]
    Local,
    /// An IANA zone such as `Europe/Berlin`.
    Named(Tz),
}

impl Zone {
    /// Parses an IANA name; `local` and `system` select the system zone.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("local") || name.eq_ignore_ascii_case("system") {
            return Some(Zone::Local);
        }
        name.parse::<Tz>().ok().map(Zone::Named)
    }

    /// Seconds since midnight of `instant` in this zone, with sub-second
    /// precision.
    pub fn seconds_from_midnight(self, instant: DateTime<Utc>) -> f64 {
        match self {
            Zone::Local => seconds_from_midnight(&instant.with_timezone(&Local)),
            Zone::Named(tz) => seconds_from_midnight(&instant.with_timezone(&tz)),
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Local => f.write_str("local"),
            Zone::Named(tz) => f.write_str(tz.name()),
        }
    }
}

fn seconds_from_midnight<T: TimeZone>(dt: &DateTime<T>) -> f64 {
    // Leap seconds report nanoseconds above 1e9.
    let nanos = dt.nanosecond().min(999_999_999);
    f64::from(dt.num_seconds_from_midnight()) + f64::from(nanos) / 1e9
}

/// Converts an instant into text for one display line.
pub trait DateFormatter {
    fn format(
        &self,
        instant: DateTime<Utc>,
        zone: Zone,
        locale: Locale,
        spec: &FormatSpec,
    ) -> Result<String, FormatError>;
}

/// Formatter backed by chrono's localized formatting.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChronoFormatter;

impl DateFormatter for ChronoFormatter {
    fn format(
        &self,
        instant: DateTime<Utc>,
        zone: Zone,
        locale: Locale,
        spec: &FormatSpec,
    ) -> Result<String, FormatError> {
        let (segments, locale) = match spec {
            FormatSpec::Pattern(pattern) => (compile_pattern(pattern)?, locale),
            FormatSpec::Options(options) => {
                let locale = match options.locale.as_deref() {
                    Some(tag) => parse_locale(tag).unwrap_or_else(|| {
                        log::debug!("Unknown line locale '{}', using {}", tag, locale);
                        locale
                    }),
                    None => locale,
                };
                (vec![Segment::Macro(options.clone())], locale)
            }
        };

        match zone {
            Zone::Local => render(&instant.with_timezone(&Local), &segments, locale),
            Zone::Named(tz) => render(&instant.with_timezone(&tz), &segments, locale),
        }
    }
}

fn render<T>(dt: &DateTime<T>, segments: &[Segment], locale: Locale) -> Result<String, FormatError>
where
    T: TimeZone,
    T::Offset: fmt::Display,
{
    let conventions = conventions(locale);
    let mut out = String::new();
    let mut items: Vec<Item<'static>> = Vec::new();

    for segment in segments {
        match segment {
            Segment::Item(item) => items.push(item.clone()),
            Segment::Macro(options) => items.extend(options.items(&conventions)),
            Segment::Millisecond { padded } => {
                write_items(&mut out, dt, &items, locale)?;
                items.clear();
                // Leap seconds report 1000 and up.
                let millis = dt.timestamp_subsec_millis().min(999);
                let written = if *padded {
                    write!(out, "{:03}", millis)
                } else {
                    write!(out, "{}", millis)
                };
                written.map_err(|_| FormatError::Render)?;
            }
        }
    }
    write_items(&mut out, dt, &items, locale)?;

    Ok(out)
}

fn write_items<T>(
    out: &mut String,
    dt: &DateTime<T>,
    items: &[Item<'_>],
    locale: Locale,
) -> Result<(), FormatError>
where
    T: TimeZone,
    T::Offset: fmt::Display,
{
    if items.is_empty() {
        return Ok(());
    }
    write!(out, "{}", dt.format_localized_with_items(items.iter(), locale))
        .map_err(|_| FormatError::Render)
}
