use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::format::{parse_locale, FormatSpec, Zone};

/// Refresh interval used when none is configured.
pub const DEFAULT_INTERVAL_MS: u64 = 1000;

/// Intervals below this are clamped up to it.
pub const MIN_INTERVAL_MS: u64 = 100;

/// Settings for one clock card, as written by the host.
///
/// Field names follow the host object (`firstLineFormat`, `blinkDividers`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClockConfig {
    /// Refresh interval in milliseconds.
    pub interval: Option<u64>,
    /// Legacy name for `first_line_format`.
    pub time_format: Option<FormatSpec>,
    /// Legacy name for `second_line_format`.
    pub date_format: Option<FormatSpec>,
    /// IANA zone name, or `local`.
    pub time_zone: Option<String>,
    /// Locale tag such as `de-DE` or `en_US.UTF-8`.
    pub locale: Option<String>,
    pub first_line_format: Option<FormatSpec>,
    pub second_line_format: Option<FormatSpec>,
    /// Blink the separators of the first line.
    pub blink_dividers: bool,
}

impl ClockConfig {
    /// Promotes the legacy `timeFormat`/`dateFormat` fields into the line
    /// formats. Explicit line formats win when both are set.
    pub fn normalized(mut self) -> Self {
        if let Some(legacy) = self.time_format.take() {
            self.first_line_format.get_or_insert(legacy);
        }
        if let Some(legacy) = self.date_format.take() {
            self.second_line_format.get_or_insert(legacy);
        }
        self
    }

    /// The refresh interval, defaulted and clamped.
    pub fn interval(&self) -> Duration {
        let millis = self
            .interval
            .unwrap_or(DEFAULT_INTERVAL_MS)
            .max(MIN_INTERVAL_MS);
        Duration::from_millis(millis)
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        match self.interval {
            Some(0) => issues.push(ConfigIssue::error("interval", "must be greater than 0")),
            Some(ms) if ms < MIN_INTERVAL_MS => issues.push(ConfigIssue::warning(
                "interval",
                format!("{} ms is below {} ms and will be clamped", ms, MIN_INTERVAL_MS),
            )),
            _ => {}
        }

        if let Some(zone) = &self.time_zone {
            if Zone::parse(zone).is_none() {
                issues.push(ConfigIssue::warning(
                    "timeZone",
                    format!("unknown time zone '{}', falling back to the host zone", zone),
                ));
            }
        }

        if let Some(locale) = &self.locale {
            if parse_locale(locale).is_none() {
                issues.push(ConfigIssue::warning(
                    "locale",
                    format!("unknown locale '{}', falling back to the host locale", locale),
                ));
            }
        }

        if self.time_format.is_some() && self.first_line_format.is_some() {
            issues.push(ConfigIssue::warning(
                "timeFormat",
                "ignored because firstLineFormat is also set",
            ));
        }
        if self.date_format.is_some() && self.second_line_format.is_some() {
            issues.push(ConfigIssue::warning(
                "dateFormat",
                "ignored because secondLineFormat is also set",
            ));
        }

        let specs = [
            ("timeFormat", &self.time_format),
            ("dateFormat", &self.date_format),
            ("firstLineFormat", &self.first_line_format),
            ("secondLineFormat", &self.second_line_format),
        ];
        for (field, spec) in specs {
            let Some(spec) = spec else { continue };
            if let Err(err) = spec.check() {
                issues.push(ConfigIssue::error(field, err.to_string()));
            }
            if let FormatSpec::Options(options) = spec {
                if let Some(locale) = options.locale.as_deref() {
                    if parse_locale(locale).is_none() {
                        issues.push(ConfigIssue::warning(
                            field,
                            format!("unknown locale '{}'", locale),
                        ));
                    }
                }
            }
        }

        issues
    }
}

/// A problem found while validating a [`ClockConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub field: String,
    pub message: String,
    pub is_error: bool,
}

impl ConfigIssue {
    fn error(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
            is_error: true,
        }
    }

    fn warning(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
            is_error: false,
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}
